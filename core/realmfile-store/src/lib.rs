//! File persistence for realm store records.
//!
//! # Architecture
//!
//! Two layers:
//! - [`FileLockManager`] — exclusive marker-file locks with
//!   randomized exponential backoff, per-thread reentrancy, and
//!   all-or-nothing batch acquisition
//! - [`FileStore`] — one file per record, mtime-based optimistic
//!   concurrency (create / update / conflict detection), writes
//!   staged to a temp file and renamed into place under the lock
//!
//! Reads are relaxed: the lock is held just long enough to capture a
//! version and open the file, and decoding happens after release. The
//! [`RecordFormat`] implementations in [`format`] encode records as
//! the block documents `realmfile-yaml` reads and writes.

pub mod format;

mod error;
mod lock;
mod store;

pub use error::{LockError, LockResult, StoreError, StoreResult};
pub use format::{ClientYamlFormat, GroupYamlFormat, RealmYamlFormat};
pub use lock::FileLockManager;
pub use store::{FileStore, FileStoreConfig, ReadHandle, RecordFormat, StoredRecord};
