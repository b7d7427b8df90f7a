use segpush_core::IA;

/// Key, signing and trust-material errors.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("signature verification failed")]
    SignatureVerificationFailed,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("malformed trust tree at {path}: {reason}")]
    TrustTreeMalformed { path: String, reason: String },

    #[error("cannot construct signer for {ia}: {reason}")]
    SignerConstructionFailed { ia: IA, reason: String },

    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl CryptoError {
    pub(crate) fn malformed_tree(path: &std::path::Path, reason: impl Into<String>) -> Self {
        Self::TrustTreeMalformed {
            path: path.display().to_string(),
            reason: reason.into(),
        }
    }
}
