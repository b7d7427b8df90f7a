use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::as_entry::AsEntry;
use crate::error::CoreError;
use crate::signer::SignedBlob;

/// Number of id bytes shown in the logging id.
const LOGGING_ID_LEN: usize = 12;

/// Segment header. Fixed when the segment is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoField {
    pub cons_dir: bool,
    pub shortcut: bool,
    pub peer: bool,
    /// Creation time, Unix seconds. 32 bits, so it runs out in 2106.
    pub timestamp: u32,
    pub isd: u16,
    /// Declared hop count. Not derived from the entries.
    pub hops: u8,
}

impl InfoField {
    pub const LEN: usize = 8;

    /// Header timestamp for a clock reading in Unix seconds.
    pub fn timestamp_from_unix(secs: i64) -> Result<u32, CoreError> {
        u32::try_from(secs).map_err(|_| CoreError::TimestampOutOfRange { secs })
    }

    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut flags = 0u8;
        if self.cons_dir {
            flags |= 0x01;
        }
        if self.shortcut {
            flags |= 0x02;
        }
        if self.peer {
            flags |= 0x04;
        }
        let mut out = [0u8; Self::LEN];
        out[0] = flags;
        out[1..5].copy_from_slice(&self.timestamp.to_be_bytes());
        out[5..7].copy_from_slice(&self.isd.to_be_bytes());
        out[7] = self.hops;
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentType {
    Up,
    Down,
    #[default]
    Core,
}

impl fmt::Display for SegmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
            Self::Core => write!(f, "core"),
        }
    }
}

impl FromStr for SegmentType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "core" => Ok(Self::Core),
            other => Err(CoreError::malformed(other, "unknown segment type")),
        }
    }
}

/// An AS entry with the signature made when it was appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedAsEntry {
    pub entry: AsEntry,
    pub sign: SignedBlob,
}

/// Content-derived segment identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SegmentId(pub [u8; 32]);

impl SegmentId {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Short hex form used in logs and for commit ordering.
    pub fn logging_id(&self) -> String {
        hex::encode(&self.0[..LOGGING_ID_LEN])
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// A path segment: header plus signed AS entries, origin AS first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSegment {
    pub info: InfoField,
    entries: Vec<SignedAsEntry>,
}

impl PathSegment {
    pub(crate) fn new(info: InfoField) -> Self {
        Self {
            info,
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[SignedAsEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn push(&mut self, entry: SignedAsEntry) {
        self.entries.push(entry);
    }

    /// Bytes signed on behalf of `next`: the header, every earlier entry
    /// with its signature, then `next` itself.
    pub fn signing_payload(&self, next: &AsEntry) -> Vec<u8> {
        let mut payload = self.payload_prefix(self.entries.len());
        payload.extend_from_slice(&next.canonical_bytes());
        payload
    }

    /// The payload the entry at `index` was signed over.
    pub fn entry_payload(&self, index: usize) -> Option<Vec<u8>> {
        let target = self.entries.get(index)?;
        let mut payload = self.payload_prefix(index);
        payload.extend_from_slice(&target.entry.canonical_bytes());
        Some(payload)
    }

    fn payload_prefix(&self, upto: usize) -> Vec<u8> {
        let mut payload = Vec::new();
        payload.extend_from_slice(&self.info.to_bytes());
        for signed in &self.entries[..upto] {
            payload.extend_from_slice(&signed.entry.canonical_bytes());
            payload.extend_from_slice(&signed.sign.signature);
        }
        payload
    }

    /// Identity over the ISD-AS and hop fields of every entry. Timestamps
    /// and signatures are excluded, so rebuilding the same path yields the
    /// same id.
    pub fn id(&self) -> SegmentId {
        let mut hasher = blake3::Hasher::new();
        for signed in &self.entries {
            hasher.update(&signed.entry.ia.to_int().to_be_bytes());
            for hop in &signed.entry.hop_entries {
                hasher.update(&hop.raw_hop_field);
            }
        }
        SegmentId(*hasher.finalize().as_bytes())
    }

    pub fn logging_id(&self) -> String {
        self.id().logging_id()
    }
}

/// A segment together with its registration type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentMeta {
    pub seg_type: SegmentType,
    pub segment: PathSegment,
}

impl SegmentMeta {
    pub fn id(&self) -> SegmentId {
        self.segment.id()
    }

    pub fn logging_id(&self) -> String {
        self.segment.logging_id()
    }
}
