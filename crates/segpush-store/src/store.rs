use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use segpush_core::{SegmentMeta, IA};

use crate::error::StoreError;

/// Qualifies a registration; the same segment can be registered under
/// several hidden-path configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HpCfgId {
    pub master_ia: IA,
    pub id: u64,
}

impl HpCfgId {
    /// The default, unqualified registration.
    pub const NULL: HpCfgId = HpCfgId {
        master_ia: IA::WILDCARD,
        id: 0,
    };
}

impl fmt::Display for HpCfgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.master_ia, self.id)
    }
}

/// Outcome of one insert-or-update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertStats {
    pub inserted: usize,
    pub updated: usize,
}

/// A persisted segment row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSegment {
    pub meta: SegmentMeta,
    pub hp_cfg_ids: BTreeSet<HpCfgId>,
    /// Unix milliseconds of the last write.
    pub last_updated: i64,
}

/// Store-side well-formedness of a registration.
pub(crate) fn check_registration(meta: &SegmentMeta, hp_cfg_ids: &[HpCfgId]) -> Result<(), StoreError> {
    if meta.segment.is_empty() {
        return Err(StoreError::InvalidSegment {
            segment: meta.logging_id(),
            reason: "segment has no AS entries".into(),
        });
    }
    if hp_cfg_ids.is_empty() {
        return Err(StoreError::InvalidSegment {
            segment: meta.logging_id(),
            reason: "at least one hidden-path configuration id is required".into(),
        });
    }
    Ok(())
}

/// A store of path segments that supports transactions.
pub trait PathStore {
    type Transaction<'a>: StoreTransaction
    where
        Self: 'a;

    fn begin_transaction(&self) -> Result<Self::Transaction<'_>, StoreError>;
}

/// An open store transaction.
///
/// Dropping an unfinished transaction rolls it back.
pub trait StoreTransaction {
    /// Insert `meta`, or update the row with the same segment id.
    fn insert_or_update(
        &mut self,
        meta: &SegmentMeta,
        hp_cfg_ids: &[HpCfgId],
    ) -> Result<InsertStats, StoreError>;

    fn commit(&mut self) -> Result<(), StoreError>;

    /// Discard all writes. A no-op once the transaction has finished.
    fn rollback(&mut self) -> Result<(), StoreError>;
}
