//! RocksDB-backed path store.
//!
//! Uses a pessimistic `TransactionDB`: `insert_or_update` locks the segment's
//! row until the transaction finishes, so two writers touching the same
//! segments in different orders can deadlock. Batches are therefore always
//! written in logging-id order (see [`crate::batch`]).

use rocksdb::{
    ColumnFamily, ColumnFamilyDescriptor, IteratorMode, Options, Transaction, TransactionDB,
    TransactionDBOptions,
};
use std::path::Path;

use segpush_core::{SegmentId, SegmentMeta};

use crate::error::StoreError;
use crate::store::{check_registration, HpCfgId, InsertStats, PathStore, StoreTransaction, StoredSegment};

/// Column family names.
const CF_SEGMENTS: &str = "segments";
const CF_META: &str = "meta";

const SCHEMA_VERSION_KEY: &[u8] = b"schema_version";
const SCHEMA_VERSION: u32 = 1;

/// Create the directory of a store at `path`, refusing regular files.
pub(crate) fn ensure_store_dir(path: &Path) -> Result<(), StoreError> {
    if path.is_file() {
        return Err(StoreError::NotAStoreDirectory {
            path: path.display().to_string(),
        });
    }
    std::fs::create_dir_all(path)?;
    Ok(())
}

/// Transactional path store on RocksDB.
pub struct RocksPathStore {
    db: TransactionDB,
}

impl RocksPathStore {
    /// Open or create a store at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        ensure_store_dir(path)?;

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new(CF_SEGMENTS, Options::default()),
            ColumnFamilyDescriptor::new(CF_META, Options::default()),
        ];

        let db = TransactionDB::open_cf_descriptors(
            &opts,
            &TransactionDBOptions::default(),
            path,
            cf_descriptors,
        )?;
        let store = Self { db };
        store.check_schema()?;

        tracing::debug!(path = %path.display(), "path store opened");
        Ok(store)
    }

    fn cf(&self, name: &'static str) -> Result<&ColumnFamily, StoreError> {
        self.db
            .cf_handle(name)
            .ok_or(StoreError::MissingColumnFamily(name))
    }

    fn check_schema(&self) -> Result<(), StoreError> {
        let meta = self.cf(CF_META)?;
        match self.db.get_cf(meta, SCHEMA_VERSION_KEY)? {
            None => {
                self.db
                    .put_cf(meta, SCHEMA_VERSION_KEY, SCHEMA_VERSION.to_string())?;
                Ok(())
            }
            Some(raw) if raw == SCHEMA_VERSION.to_string().as_bytes() => Ok(()),
            Some(raw) => Err(StoreError::SchemaMismatch {
                expected: SCHEMA_VERSION,
                found: String::from_utf8_lossy(&raw).into_owned(),
            }),
        }
    }

    /// Read the stored row of a segment.
    pub fn get(&self, id: &SegmentId) -> Result<Option<StoredSegment>, StoreError> {
        let segments = self.cf(CF_SEGMENTS)?;
        match self.db.get_cf(segments, id.as_bytes())? {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            None => Ok(None),
        }
    }

    /// Number of stored segments.
    pub fn len(&self) -> Result<usize, StoreError> {
        let segments = self.cf(CF_SEGMENTS)?;
        let mut count = 0;
        for item in self.db.iterator_cf(segments, IteratorMode::Start) {
            item?;
            count += 1;
        }
        Ok(count)
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

impl PathStore for RocksPathStore {
    type Transaction<'a> = RocksTransaction<'a>;

    fn begin_transaction(&self) -> Result<RocksTransaction<'_>, StoreError> {
        Ok(RocksTransaction {
            segments: self.cf(CF_SEGMENTS)?,
            txn: Some(self.db.transaction()),
        })
    }
}

/// An open RocksDB transaction. `None` once committed or rolled back.
pub struct RocksTransaction<'a> {
    segments: &'a ColumnFamily,
    txn: Option<Transaction<'a, TransactionDB>>,
}

impl StoreTransaction for RocksTransaction<'_> {
    fn insert_or_update(
        &mut self,
        meta: &SegmentMeta,
        hp_cfg_ids: &[HpCfgId],
    ) -> Result<InsertStats, StoreError> {
        let txn = self.txn.as_ref().ok_or(StoreError::TransactionFinished)?;
        check_registration(meta, hp_cfg_ids)?;

        let id = meta.id();
        let now = chrono::Utc::now().timestamp_millis();
        let existing = txn.get_for_update_cf(self.segments, id.as_bytes(), true)?;

        let (row, stats) = match existing {
            Some(raw) => {
                let mut row: StoredSegment = serde_json::from_slice(&raw)?;
                row.meta = meta.clone();
                row.hp_cfg_ids.extend(hp_cfg_ids.iter().copied());
                row.last_updated = now;
                (row, InsertStats { inserted: 0, updated: 1 })
            }
            None => {
                let row = StoredSegment {
                    meta: meta.clone(),
                    hp_cfg_ids: hp_cfg_ids.iter().copied().collect(),
                    last_updated: now,
                };
                (row, InsertStats { inserted: 1, updated: 0 })
            }
        };

        txn.put_cf(self.segments, id.as_bytes(), serde_json::to_vec(&row)?)?;
        Ok(stats)
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        let txn = self.txn.take().ok_or(StoreError::TransactionFinished)?;
        txn.commit()?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        if let Some(txn) = self.txn.take() {
            txn.rollback()?;
        }
        Ok(())
    }
}

impl Drop for RocksTransaction<'_> {
    fn drop(&mut self) {
        if let Some(txn) = self.txn.take() {
            if let Err(e) = txn.rollback() {
                tracing::warn!(error = %e, "rollback of abandoned transaction failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use segpush_core::{
        build_segment, AsEntryDescriptor, HopDescriptor, NoSigners, SegmentDescriptor,
        SegmentPolicy,
    };
    use std::path::PathBuf;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("segpush-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn segment(out_if: u64) -> SegmentMeta {
        let entry = |ia: &str, in_ia: &str, in_if: u64, out_ia: &str, out_if: u64| AsEntryDescriptor {
            ia: ia.into(),
            latitude: None,
            longitude: None,
            hop: HopDescriptor {
                in_ia: in_ia.into(),
                in_if,
                out_ia: out_ia.into(),
                out_if,
            },
        };
        let desc = SegmentDescriptor {
            src_isd: 1,
            src_as: "ff00:0:110".into(),
            dst_isd: 1,
            dst_as: "ff00:0:111".into(),
            nb_hops: 2,
            latency: None,
            bandwidth: None,
            as_entries: vec![
                entry("1-ff00:0:110", "0-0", 0, "1-ff00:0:111", out_if),
                entry("1-ff00:0:111", "1-ff00:0:110", out_if, "0-0", 0),
            ],
        };
        build_segment(&desc, &NoSigners, &SegmentPolicy::default()).unwrap()
    }

    #[test]
    fn test_open_store() {
        let dir = temp_dir();
        let store = RocksPathStore::open(&dir).unwrap();
        assert!(store.is_empty().unwrap());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_open_regular_file_fails() {
        let dir = temp_dir();
        let file = dir.join("sd1-ff00_0_110.path.db");
        std::fs::write(&file, b"not a store").unwrap();

        match RocksPathStore::open(&file) {
            Err(StoreError::NotAStoreDirectory { path }) => {
                assert_eq!(path, file.display().to_string())
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("opened a regular file as a store"),
        }
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_reopen_keeps_schema() {
        let dir = temp_dir();
        drop(RocksPathStore::open(&dir).unwrap());
        assert!(RocksPathStore::open(&dir).is_ok());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_insert_then_update() {
        let dir = temp_dir();
        let store = RocksPathStore::open(&dir).unwrap();
        let meta = segment(5);

        let mut tx = store.begin_transaction().unwrap();
        let stats = tx.insert_or_update(&meta, &[HpCfgId::NULL]).unwrap();
        assert_eq!(stats, InsertStats { inserted: 1, updated: 0 });
        tx.commit().unwrap();

        let mut tx = store.begin_transaction().unwrap();
        let stats = tx.insert_or_update(&meta, &[HpCfgId::NULL]).unwrap();
        assert_eq!(stats, InsertStats { inserted: 0, updated: 1 });
        tx.commit().unwrap();

        assert_eq!(store.len().unwrap(), 1);
        let row = store.get(&meta.id()).unwrap().unwrap();
        assert_eq!(row.meta, meta);
        assert_eq!(row.hp_cfg_ids.len(), 1);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_qualifiers_are_merged() {
        let dir = temp_dir();
        let store = RocksPathStore::open(&dir).unwrap();
        let meta = segment(5);
        let other = HpCfgId {
            master_ia: "1-ff00:0:110".parse().unwrap(),
            id: 7,
        };

        let mut tx = store.begin_transaction().unwrap();
        tx.insert_or_update(&meta, &[HpCfgId::NULL]).unwrap();
        tx.insert_or_update(&meta, &[other]).unwrap();
        tx.commit().unwrap();

        let row = store.get(&meta.id()).unwrap().unwrap();
        assert!(row.hp_cfg_ids.contains(&HpCfgId::NULL));
        assert!(row.hp_cfg_ids.contains(&other));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_rollback_discards_writes() {
        let dir = temp_dir();
        let store = RocksPathStore::open(&dir).unwrap();

        let mut tx = store.begin_transaction().unwrap();
        tx.insert_or_update(&segment(5), &[HpCfgId::NULL]).unwrap();
        tx.rollback().unwrap();
        tx.rollback().unwrap();
        assert!(matches!(tx.commit(), Err(StoreError::TransactionFinished)));
        drop(tx);

        assert!(store.is_empty().unwrap());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_rollback_after_commit_is_noop() {
        let dir = temp_dir();
        let store = RocksPathStore::open(&dir).unwrap();

        let mut tx = store.begin_transaction().unwrap();
        tx.insert_or_update(&segment(5), &[HpCfgId::NULL]).unwrap();
        tx.commit().unwrap();
        assert!(tx.rollback().is_ok());
        drop(tx);

        assert_eq!(store.len().unwrap(), 1);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_drop_rolls_back() {
        let dir = temp_dir();
        let store = RocksPathStore::open(&dir).unwrap();
        {
            let mut tx = store.begin_transaction().unwrap();
            tx.insert_or_update(&segment(5), &[HpCfgId::NULL]).unwrap();
        }
        assert!(store.is_empty().unwrap());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_rejects_ill_formed_registrations() {
        let dir = temp_dir();
        let store = RocksPathStore::open(&dir).unwrap();
        let mut tx = store.begin_transaction().unwrap();

        let mut empty = segment(5);
        empty.segment = segpush_core::SegmentBuilder::new(empty.segment.info, empty.seg_type)
            .seal()
            .unwrap()
            .segment;
        assert!(matches!(
            tx.insert_or_update(&empty, &[HpCfgId::NULL]),
            Err(StoreError::InvalidSegment { .. })
        ));
        assert!(matches!(
            tx.insert_or_update(&segment(5), &[]),
            Err(StoreError::InvalidSegment { .. })
        ));
        std::fs::remove_dir_all(&dir).ok();
    }
}
