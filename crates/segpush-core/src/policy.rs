use serde::{Deserialize, Serialize};

use crate::hop_field::ExpiryPolicy;
use crate::segment::SegmentType;

/// Version sentinel meaning "whatever is latest when the entry is checked".
pub const LATEST_VERSION: u64 = 0;

/// Trust material versions an AS entry claims to be authorized under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum TrustVersions {
    Latest,
    Explicit { cert_ver: u64, trc_ver: u64 },
}

impl TrustVersions {
    /// `(cert_ver, trc_ver)` as written into the AS entry.
    pub fn resolve(self) -> (u64, u64) {
        match self {
            Self::Latest => (LATEST_VERSION, LATEST_VERSION),
            Self::Explicit { cert_ver, trc_ver } => (cert_ver, trc_ver),
        }
    }
}

impl Default for TrustVersions {
    fn default() -> Self {
        Self::Explicit {
            cert_ver: 1,
            trc_ver: 1,
        }
    }
}

/// What to do with an AS entry whose domain has no loaded signer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsignedEntries {
    /// Attach an empty signature and keep going.
    #[default]
    Allow,
    /// Fail the segment with `SigningUnavailable`.
    Reject,
}

/// Construction policy shared by every segment of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentPolicy {
    /// MTU of AS entries and their ingress links.
    #[serde(default = "default_mtu")]
    pub mtu: u16,
    #[serde(default)]
    pub expiry: ExpiryPolicy,
    #[serde(default)]
    pub trust_versions: TrustVersions,
    #[serde(default)]
    pub segment_type: SegmentType,
    #[serde(default)]
    pub cons_dir: bool,
    #[serde(default)]
    pub shortcut: bool,
    #[serde(default)]
    pub peer: bool,
    #[serde(default)]
    pub unsigned_entries: UnsignedEntries,
}

fn default_mtu() -> u16 {
    1500
}

impl Default for SegmentPolicy {
    fn default() -> Self {
        Self {
            mtu: default_mtu(),
            expiry: ExpiryPolicy::default(),
            trust_versions: TrustVersions::default(),
            segment_type: SegmentType::default(),
            cons_dir: false,
            shortcut: false,
            peer: false,
            unsigned_entries: UnsignedEntries::default(),
        }
    }
}
