/// Path store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("rocksdb error: {0}")]
    Rocks(#[from] rocksdb::Error),

    #[error("row serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("column family '{0}' not found")]
    MissingColumnFamily(&'static str),

    #[error("store schema version {found} is not supported (expected {expected})")]
    SchemaMismatch { expected: u32, found: String },

    #[error("invalid segment {segment}: {reason}")]
    InvalidSegment { segment: String, reason: String },

    #[error("{path} is a regular file, not a RocksDB store directory")]
    NotAStoreDirectory { path: String },

    #[error("transaction already finished")]
    TransactionFinished,

    #[error("batch aborted at segment {segment}, nothing was committed: {source}")]
    PartialBatchAborted {
        segment: String,
        #[source]
        source: Box<StoreError>,
    },

    #[error("committing {segments} segments failed, nothing was committed: {source}")]
    BatchCommitFailed {
        segments: usize,
        #[source]
        source: Box<StoreError>,
    },

    #[error("found {reason} files matching '{pattern}', please specify the path store explicitly")]
    AmbiguousStoreLocation {
        pattern: String,
        reason: &'static str,
        found: Vec<String>,
    },

    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
