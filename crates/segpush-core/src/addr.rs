//! ISD-AS addressing.
//!
//! An `IA` pairs an isolation domain number with a 48-bit AS number. Text
//! form is `<isd>-<as>`, where the AS is either a decimal BGP number or three
//! colon-separated 16-bit hex groups (`1-ff00:0:110`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Largest representable AS number (48 bits).
pub const MAX_ASN: u64 = (1 << 48) - 1;
/// Largest AS number written in decimal (the BGP range).
pub const MAX_BGP_ASN: u64 = (1 << 32) - 1;

const AS_GROUPS: usize = 3;
const AS_GROUP_BITS: u32 = 16;
const AS_GROUP_MAX_DIGITS: usize = 4;

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Isolation domain number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Isd(pub u16);

impl Isd {
    /// Parse a decimal ISD number.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        if !all_digits(s) {
            return Err(CoreError::malformed(s, "ISD must be a decimal number"));
        }
        s.parse::<u16>()
            .map(Isd)
            .map_err(|e| CoreError::malformed(s, format!("invalid ISD: {}", e)))
    }

    /// Parse a trust-tree directory name of the form `ISD<n>`.
    pub fn from_dir_name(name: &str) -> Result<Self, CoreError> {
        let number = name
            .strip_prefix("ISD")
            .ok_or_else(|| CoreError::malformed(name, "missing ISD prefix"))?;
        Self::parse(number)
    }

    /// Directory name used for this ISD in the trust tree.
    pub fn dir_name(self) -> String {
        format!("ISD{}", self.0)
    }
}

impl fmt::Display for Isd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 48-bit AS number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Asn(u64);

impl Asn {
    /// Create an AS number, rejecting values wider than 48 bits.
    pub fn new(value: u64) -> Result<Self, CoreError> {
        if value > MAX_ASN {
            return Err(CoreError::malformed(
                &value.to_string(),
                "AS number exceeds 48 bits",
            ));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u64 {
        self.0
    }

    /// Parse either the decimal BGP form or the `hhhh:hhhh:hhhh` form.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        if !s.contains(':') {
            if !all_digits(s) {
                return Err(CoreError::malformed(s, "AS must be decimal or hex groups"));
            }
            let value = s
                .parse::<u64>()
                .map_err(|e| CoreError::malformed(s, format!("invalid AS: {}", e)))?;
            if value > MAX_BGP_ASN {
                return Err(CoreError::malformed(s, "decimal AS exceeds the BGP range"));
            }
            return Ok(Self(value));
        }

        let groups: Vec<&str> = s.split(':').collect();
        if groups.len() != AS_GROUPS {
            return Err(CoreError::malformed(
                s,
                format!("expected {} colon-separated groups, got {}", AS_GROUPS, groups.len()),
            ));
        }
        let mut value = 0u64;
        for group in groups {
            if group.is_empty()
                || group.len() > AS_GROUP_MAX_DIGITS
                || !group.bytes().all(|b| b.is_ascii_hexdigit())
            {
                return Err(CoreError::malformed(s, format!("invalid AS group {:?}", group)));
            }
            let part = u64::from_str_radix(group, 16)
                .map_err(|e| CoreError::malformed(s, format!("invalid AS group: {}", e)))?;
            value = (value << AS_GROUP_BITS) | part;
        }
        Ok(Self(value))
    }

    /// Parse the file-system form (`ASff00_0_110`, or `ff00_0_110` when
    /// `prefixed` is false).
    pub fn from_file_fmt(name: &str, prefixed: bool) -> Result<Self, CoreError> {
        let body = if prefixed {
            name.strip_prefix("AS")
                .ok_or_else(|| CoreError::malformed(name, "missing AS prefix"))?
        } else {
            name
        };
        Self::parse(&body.replace('_', ":"))
    }

    /// File-system form of this AS number.
    pub fn file_fmt(self, prefixed: bool) -> String {
        let body = self.to_string().replace(':', "_");
        if prefixed {
            format!("AS{}", body)
        } else {
            body
        }
    }
}

impl fmt::Display for Asn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 <= MAX_BGP_ASN {
            return write!(f, "{}", self.0);
        }
        write!(
            f,
            "{:x}:{:x}:{:x}",
            (self.0 >> 32) & 0xffff,
            (self.0 >> 16) & 0xffff,
            self.0 & 0xffff
        )
    }
}

/// ISD-AS identifier of a routing domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct IA {
    pub isd: Isd,
    pub asn: Asn,
}

impl IA {
    /// The `0-0` wildcard, used for the missing side of an edge hop.
    pub const WILDCARD: IA = IA {
        isd: Isd(0),
        asn: Asn(0),
    };

    pub fn new(isd: Isd, asn: Asn) -> Self {
        Self { isd, asn }
    }

    /// Packed 64-bit form: ISD in the top 16 bits, AS in the low 48.
    pub fn to_int(self) -> u64 {
        ((self.isd.0 as u64) << 48) | self.asn.0
    }

    pub fn from_int(value: u64) -> Self {
        Self {
            isd: Isd((value >> 48) as u16),
            asn: Asn(value & MAX_ASN),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        *self == Self::WILDCARD
    }
}

impl FromStr for IA {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (isd, asn) = s
            .split_once('-')
            .ok_or_else(|| CoreError::malformed(s, "expected <isd>-<as>"))?;
        if asn.contains('-') {
            return Err(CoreError::malformed(s, "too many '-' separators"));
        }
        Ok(Self {
            isd: Isd::parse(isd).map_err(|_| CoreError::malformed(s, "invalid ISD part"))?,
            asn: Asn::parse(asn).map_err(|_| CoreError::malformed(s, "invalid AS part"))?,
        })
    }
}

impl fmt::Display for IA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.isd, self.asn)
    }
}

impl From<IA> for String {
    fn from(ia: IA) -> Self {
        ia.to_string()
    }
}

impl TryFrom<String> for IA {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
