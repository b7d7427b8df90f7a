//! Fixed-width hop field encoding.
//!
//! Layout (8 bytes, big endian):
//!
//! ```text
//! | flags (1) | exp time (1) | ingress:12 egress:12 (3) | mac (3) |
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::CoreError;

/// Encoded length of a hop field.
pub const HOP_FIELD_LEN: usize = 8;
/// Length of the hop field MAC.
pub const MAC_LEN: usize = 3;

const IF_ID_BITS: u32 = 12;
const IF_ID_MASK: u32 = (1 << IF_ID_BITS) - 1;

/// Lifetime unit of one `ExpTime` step is `MAX_HOP_LIFETIME / 256`.
const MAX_HOP_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

/// Interface identifier as carried in a hop field (12 bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IfId(u16);

impl IfId {
    pub const MAX: u16 = IF_ID_MASK as u16;

    /// Range-check an interface id coming from external input.
    pub fn new(value: u64) -> Result<Self, CoreError> {
        if value > Self::MAX as u64 {
            return Err(CoreError::InterfaceOutOfRange {
                value,
                max: Self::MAX,
            });
        }
        Ok(Self(value as u16))
    }

    pub fn value(self) -> u16 {
        self.0
    }
}

impl fmt::Display for IfId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Relative expiry of a hop field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpTime(pub u8);

impl ExpTime {
    pub const MAX: ExpTime = ExpTime(u8::MAX);
    pub const DEFAULT: ExpTime = ExpTime(63);

    /// Lifetime relative to the segment's info timestamp.
    pub fn to_duration(self) -> Duration {
        MAX_HOP_LIFETIME * (self.0 as u32 + 1) / 256
    }
}

/// How long constructed hops stay valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryPolicy {
    /// Longest lifetime the field can express.
    #[default]
    Maximum,
    /// The lifetime beacon servers use by default.
    Default,
}

impl ExpiryPolicy {
    pub fn exp_time(self) -> ExpTime {
        match self {
            Self::Maximum => ExpTime::MAX,
            Self::Default => ExpTime::DEFAULT,
        }
    }
}

/// One directed hop: construction-direction ingress and egress interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HopField {
    pub flags: u8,
    pub exp_time: ExpTime,
    pub cons_ingress: IfId,
    pub cons_egress: IfId,
    pub mac: [u8; MAC_LEN],
}

impl HopField {
    /// A hop without flags or MAC.
    pub fn new(cons_ingress: IfId, cons_egress: IfId, expiry: ExpiryPolicy) -> Self {
        Self {
            flags: 0,
            exp_time: expiry.exp_time(),
            cons_ingress,
            cons_egress,
            mac: [0u8; MAC_LEN],
        }
    }

    /// Write the hop into a fixed-size buffer.
    pub fn write(&self, buf: &mut [u8; HOP_FIELD_LEN]) {
        let ifids = ((self.cons_ingress.0 as u32) << IF_ID_BITS) | self.cons_egress.0 as u32;
        buf[0] = self.flags;
        buf[1] = self.exp_time.0;
        buf[2..5].copy_from_slice(&ifids.to_be_bytes()[1..]);
        buf[5..].copy_from_slice(&self.mac);
    }

    pub fn encode(&self) -> [u8; HOP_FIELD_LEN] {
        let mut buf = [0u8; HOP_FIELD_LEN];
        self.write(&mut buf);
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CoreError> {
        if bytes.len() != HOP_FIELD_LEN {
            return Err(CoreError::InvalidHopField {
                expected: HOP_FIELD_LEN,
                actual: bytes.len(),
            });
        }
        let ifids = u32::from_be_bytes([0, bytes[2], bytes[3], bytes[4]]);
        let mut mac = [0u8; MAC_LEN];
        mac.copy_from_slice(&bytes[5..]);
        Ok(Self {
            flags: bytes[0],
            exp_time: ExpTime(bytes[1]),
            cons_ingress: IfId((ifids >> IF_ID_BITS) as u16),
            cons_egress: IfId((ifids & IF_ID_MASK) as u16),
            mac,
        })
    }
}
