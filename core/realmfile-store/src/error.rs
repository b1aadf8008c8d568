use realmfile_yaml::YamlError;
use thiserror::Error;

/// Errors from the marker-file lock manager.
#[derive(Debug, Error)]
pub enum LockError {
    #[error("timed out waiting for lock on {name}")]
    Timeout { name: String },

    #[error("lock on {name} is not held by this thread")]
    NotOwner { name: String },

    #[error("lock io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type LockResult<T> = Result<T, LockError>;

/// Errors from the record store. The three conflict variants carry
/// the record id and map one-to-one onto the optimistic-concurrency
/// outcomes of a write.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record {id} already exists")]
    AlreadyExists { id: String },

    #[error("record {id} was removed by another writer")]
    Removed { id: String },

    #[error("record {id} was changed by another writer")]
    Changed { id: String },

    #[error("record has no id")]
    MissingId,

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error("document error: {0}")]
    Format(#[from] YamlError),

    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
