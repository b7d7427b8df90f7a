//! All-or-nothing registration of a batch of segments.

use segpush_core::SegmentMeta;

use crate::error::StoreError;
use crate::store::{HpCfgId, PathStore, StoreTransaction};

/// Segments waiting to be registered together.
#[derive(Debug, Clone, Default)]
pub struct RegistrationBatch {
    segments: Vec<SegmentMeta>,
}

impl RegistrationBatch {
    pub fn new(segments: Vec<SegmentMeta>) -> Self {
        Self { segments }
    }

    pub fn push(&mut self, meta: SegmentMeta) {
        self.segments.push(meta);
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Logging ids in the order the batch will be written.
    pub fn commit_order(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.segments.iter().map(SegmentMeta::logging_id).collect();
        ids.sort();
        ids
    }

    /// Segments in ascending logging-id order. The sort is stable, so
    /// duplicates keep their input order.
    pub fn into_sorted(self) -> Vec<SegmentMeta> {
        let mut keyed: Vec<(String, SegmentMeta)> = self
            .segments
            .into_iter()
            .map(|meta| (meta.logging_id(), meta))
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        keyed.into_iter().map(|(_, meta)| meta).collect()
    }
}

impl From<Vec<SegmentMeta>> for RegistrationBatch {
    fn from(segments: Vec<SegmentMeta>) -> Self {
        Self::new(segments)
    }
}

/// Result of a committed batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitSummary {
    pub inserted: usize,
    pub updated: usize,
    /// Logging ids, in write order.
    pub committed: Vec<String>,
}

/// Writes a batch inside a single store transaction.
///
/// Segments are written in ascending logging-id order so that concurrent
/// writers acquire row locks in the same order.
pub struct CommitOrchestrator<'s, S: PathStore> {
    store: &'s S,
    hp_cfg_ids: Vec<HpCfgId>,
}

impl<'s, S: PathStore> CommitOrchestrator<'s, S> {
    /// Registers every segment under [`HpCfgId::NULL`].
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            hp_cfg_ids: vec![HpCfgId::NULL],
        }
    }

    pub fn with_hp_cfg_ids(mut self, hp_cfg_ids: Vec<HpCfgId>) -> Self {
        self.hp_cfg_ids = hp_cfg_ids;
        self
    }

    /// Commit every segment of `batch`, or none of them.
    pub fn commit(&self, batch: RegistrationBatch) -> Result<CommitSummary, StoreError> {
        let ordered = batch.into_sorted();
        tracing::info!(segments = ordered.len(), "starting path store transaction");

        let mut tx = self.store.begin_transaction()?;
        let mut summary = CommitSummary::default();

        for meta in &ordered {
            let logging_id = meta.logging_id();
            match tx.insert_or_update(meta, &self.hp_cfg_ids) {
                Ok(stats) => {
                    if stats.inserted > 0 {
                        tracing::debug!(segment = %logging_id, "segment inserted");
                    } else {
                        tracing::debug!(segment = %logging_id, "segment updated");
                    }
                    summary.inserted += stats.inserted;
                    summary.updated += stats.updated;
                    summary.committed.push(logging_id);
                }
                Err(e) => {
                    tracing::error!(segment = %logging_id, error = %e, "insert failed, rolling back");
                    if let Err(rb) = tx.rollback() {
                        tracing::warn!(error = %rb, "rollback failed");
                    }
                    return Err(StoreError::PartialBatchAborted {
                        segment: logging_id,
                        source: Box::new(e),
                    });
                }
            }
        }

        if let Err(e) = tx.commit() {
            tracing::error!(segments = ordered.len(), error = %e, "commit failed, rolling back");
            if let Err(rb) = tx.rollback() {
                tracing::warn!(error = %rb, "rollback failed");
            }
            return Err(StoreError::BatchCommitFailed {
                segments: ordered.len(),
                source: Box::new(e),
            });
        }
        tracing::info!(
            inserted = summary.inserted,
            updated = summary.updated,
            "path store transaction committed"
        );
        Ok(summary)
    }
}
