//! RocksDB-backed trust store.
//!
//! Keeps the certificate chains and TRCs a push run signed with next to the
//! path store, so the daemon can verify the segments it serves. Entries are
//! raw file bytes keyed by big-endian `(ia, version)` or `(isd, version)`.

use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, IteratorMode, Options, WriteBatch, DB};
use std::path::Path;

use segpush_core::{Isd, IA};

use crate::error::StoreError;
use crate::rocks::ensure_store_dir;

const CF_CHAINS: &str = "chains";
const CF_TRCS: &str = "trcs";

fn chain_key(ia: IA, version: u64) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&ia.to_int().to_be_bytes());
    key[8..].copy_from_slice(&version.to_be_bytes());
    key
}

fn trc_key(isd: Isd, version: u64) -> [u8; 10] {
    let mut key = [0u8; 10];
    key[..2].copy_from_slice(&isd.0.to_be_bytes());
    key[2..].copy_from_slice(&version.to_be_bytes());
    key
}

/// What one [`RocksTrustStore::insert_all`] wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrustInsertStats {
    pub chains: usize,
    pub trcs: usize,
}

/// Persistent certificate chains and TRCs.
pub struct RocksTrustStore {
    db: DB,
}

impl RocksTrustStore {
    /// Open or create a trust store at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        ensure_store_dir(path)?;

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new(CF_CHAINS, Options::default()),
            ColumnFamilyDescriptor::new(CF_TRCS, Options::default()),
        ];
        let db = DB::open_cf_descriptors(&opts, path, cf_descriptors)?;

        tracing::debug!(path = %path.display(), "trust store opened");
        Ok(Self { db })
    }

    fn cf(&self, name: &'static str) -> Result<&ColumnFamily, StoreError> {
        self.db
            .cf_handle(name)
            .ok_or(StoreError::MissingColumnFamily(name))
    }

    /// Write every chain and TRC in one atomic batch. Existing entries with
    /// the same key are overwritten.
    pub fn insert_all<'a>(
        &self,
        chains: impl IntoIterator<Item = (IA, u64, &'a [u8])>,
        trcs: impl IntoIterator<Item = (Isd, u64, &'a [u8])>,
    ) -> Result<TrustInsertStats, StoreError> {
        let chains_cf = self.cf(CF_CHAINS)?;
        let trcs_cf = self.cf(CF_TRCS)?;

        let mut batch = WriteBatch::default();
        let mut stats = TrustInsertStats::default();
        for (ia, version, raw) in chains {
            batch.put_cf(chains_cf, chain_key(ia, version), raw);
            stats.chains += 1;
        }
        for (isd, version, raw) in trcs {
            batch.put_cf(trcs_cf, trc_key(isd, version), raw);
            stats.trcs += 1;
        }
        self.db.write(batch)?;

        tracing::info!(chains = stats.chains, trcs = stats.trcs, "trust material stored");
        Ok(stats)
    }

    pub fn chain(&self, ia: IA, version: u64) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.db.get_cf(self.cf(CF_CHAINS)?, chain_key(ia, version))?)
    }

    pub fn trc(&self, isd: Isd, version: u64) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.db.get_cf(self.cf(CF_TRCS)?, trc_key(isd, version))?)
    }

    pub fn chain_count(&self) -> Result<usize, StoreError> {
        self.count(CF_CHAINS)
    }

    pub fn trc_count(&self) -> Result<usize, StoreError> {
        self.count(CF_TRCS)
    }

    fn count(&self, name: &'static str) -> Result<usize, StoreError> {
        let mut count = 0;
        for item in self.db.iterator_cf(self.cf(name)?, IteratorMode::Start) {
            item?;
            count += 1;
        }
        Ok(count)
    }
}
