//! segpush path store.
//!
//! - [`store`]: the `PathStore` / `StoreTransaction` seam and row types.
//! - [`rocks`]: RocksDB `TransactionDB` implementation.
//! - [`batch`]: ordered, all-or-nothing batch registration.
//! - [`trust_db`]: RocksDB store for the chains and TRCs segments are signed with.
//! - [`locate`]: finding the daemon's stores under the gen cache.

pub mod batch;
pub mod error;
pub mod locate;
pub mod rocks;
pub mod store;
pub mod trust_db;

pub use batch::{CommitOrchestrator, CommitSummary, RegistrationBatch};
pub use error::StoreError;
pub use locate::{default_store_path, DEFAULT_PATH_DB_PATTERN, DEFAULT_TRUST_DB_PATTERN};
pub use rocks::{RocksPathStore, RocksTransaction};
pub use store::{HpCfgId, InsertStats, PathStore, StoreTransaction, StoredSegment};
pub use trust_db::{RocksTrustStore, TrustInsertStats};
