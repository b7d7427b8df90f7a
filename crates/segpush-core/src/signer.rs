//! The signing seam between segment construction and key material.

use serde::{Deserialize, Serialize};

use crate::addr::IA;

/// Errors a signing capability can report.
#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    #[error("signing key unavailable: {0}")]
    KeyUnavailable(String),

    #[error("signing failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignAlgorithm {
    None,
    Ed25519,
}

impl SignAlgorithm {
    fn tag(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Ed25519 => 1,
        }
    }
}

/// Identifies the key and trust material a signature was made with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignSource {
    pub ia: IA,
    pub cert_ver: u64,
    pub trc_ver: u64,
}

/// Signature attached to an AS entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedBlob {
    pub algorithm: SignAlgorithm,
    pub src: Option<SignSource>,
    /// Unix seconds at signing time.
    pub timestamp: u64,
    pub signature: Vec<u8>,
}

impl SignedBlob {
    pub fn unsigned() -> Self {
        Self {
            algorithm: SignAlgorithm::None,
            src: None,
            timestamp: 0,
            signature: Vec::new(),
        }
    }

    pub fn is_signed(&self) -> bool {
        self.algorithm != SignAlgorithm::None && !self.signature.is_empty()
    }

    /// Bytes actually passed to the signature algorithm: the payload followed
    /// by the blob's own metadata.
    pub fn signature_input(&self, payload: &[u8]) -> Vec<u8> {
        let mut input = Vec::with_capacity(payload.len() + 33);
        input.extend_from_slice(payload);
        input.push(self.algorithm.tag());
        if let Some(src) = &self.src {
            input.extend_from_slice(&src.ia.to_int().to_be_bytes());
            input.extend_from_slice(&src.cert_ver.to_be_bytes());
            input.extend_from_slice(&src.trc_ver.to_be_bytes());
        }
        input.extend_from_slice(&self.timestamp.to_be_bytes());
        input
    }
}

/// A capability that signs AS-entry payloads for one domain.
pub trait EntrySigner {
    fn sign(&self, payload: &[u8]) -> Result<SignedBlob, SignerError>;
}

/// Signer used for entries whose domain has no key material.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSigner;

impl EntrySigner for NullSigner {
    fn sign(&self, _payload: &[u8]) -> Result<SignedBlob, SignerError> {
        Ok(SignedBlob::unsigned())
    }
}

/// Resolves the signer for a domain. `None` means no signer is loaded.
pub trait SignerLookup {
    fn resolve(&self, ia: &IA) -> Option<&dyn EntrySigner>;
}

/// Lookup that never finds a signer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSigners;

impl SignerLookup for NoSigners {
    fn resolve(&self, _ia: &IA) -> Option<&dyn EntrySigner> {
        None
    }
}
