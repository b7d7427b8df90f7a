use crate::addr::IA;

/// Core construction errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("malformed identifier {input:?}: {reason}")]
    MalformedIdentifier { input: String, reason: String },

    #[error("interface id {value} exceeds the {max} limit of the hop field")]
    InterfaceOutOfRange { value: u64, max: u16 },

    #[error("segment is already sealed")]
    SegmentAlreadySealed,

    #[error("signing unavailable for {ia}: {reason}")]
    SigningUnavailable { ia: IA, reason: String },

    #[error("clock reading {secs} is outside the info-field timestamp range")]
    TimestampOutOfRange { secs: i64 },

    #[error("invalid hop field: expected {expected} bytes, got {actual}")]
    InvalidHopField { expected: usize, actual: usize },

    #[error("invalid topology description: {0}")]
    InvalidDescriptor(#[from] serde_json::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl CoreError {
    pub(crate) fn malformed(input: &str, reason: impl Into<String>) -> Self {
        Self::MalformedIdentifier {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
