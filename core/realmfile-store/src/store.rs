//! Record persistence, one file per record.
//!
//! Versions are the file's mtime in milliseconds. A write declares
//! the version it was based on and fails if the file moved on: version
//! zero means "create", anything newer on disk than the declared
//! version means another writer got there first. The store reports
//! the conflict and never retries; resolution belongs to the caller.

use std::fs::{self, File};
use std::io::Read;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::lock::FileLockManager;

/// A record the store can persist: an id to derive the file name from
/// and a version stamp the store maintains.
pub trait StoredRecord {
    fn id(&self) -> Option<&str>;
    fn version(&self) -> i64;
    fn set_version(&mut self, version: i64);
}

/// Encoding of one record kind to and from file bytes. `deserialize`
/// receives the id the file name carries and stamps it onto the
/// record when the document omits it.
pub trait RecordFormat<E> {
    fn extension(&self) -> &'static str;
    fn serialize(&self, entity: &E) -> StoreResult<Vec<u8>>;
    fn deserialize(&self, id: &str, bytes: &[u8]) -> StoreResult<E>;
}

#[derive(Debug, Clone)]
pub struct FileStoreConfig {
    /// How long reads and writes wait for the record's lock.
    pub lock_timeout: Duration,
}

impl Default for FileStoreConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(3),
        }
    }
}

/// A directory of records, one file per record, named `<id>.<ext>`.
pub struct FileStore<E, F> {
    dir: PathBuf,
    format: F,
    locks: Arc<FileLockManager>,
    config: FileStoreConfig,
    _entity: PhantomData<fn() -> E>,
}

/// A consistent snapshot taken under the lock: the version and an open
/// handle to the data. Decoding happens after the lock is gone, so a
/// handle stays readable even when a concurrent writer replaces the
/// file in the meantime.
pub struct ReadHandle {
    id: String,
    version: i64,
    file: File,
}

impl ReadHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn version(&self) -> i64 {
        self.version
    }
}

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

impl<E: StoredRecord, F: RecordFormat<E>> FileStore<E, F> {
    pub fn new(
        dir: impl Into<PathBuf>,
        locks: Arc<FileLockManager>,
        format: F,
    ) -> StoreResult<Self> {
        Self::with_config(dir, locks, format, FileStoreConfig::default())
    }

    pub fn with_config(
        dir: impl Into<PathBuf>,
        locks: Arc<FileLockManager>,
        format: F,
        config: FileStoreConfig,
    ) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            format,
            locks,
            config,
            _entity: PhantomData,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_name(&self, id: &str) -> String {
        format!("{id}.{}", self.format.extension())
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.dir.join(self.file_name(id))
    }

    pub fn exists(&self, id: &str) -> bool {
        self.record_path(id).exists()
    }

    /// Ids of every record currently on disk, in name order.
    pub fn list_ids(&self) -> StoreResult<Vec<String>> {
        let suffix = format!(".{}", self.format.extension());
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let name = entry?.file_name();
            if let Some(id) = name.to_str().and_then(|n| n.strip_suffix(&suffix)) {
                ids.push(id.to_owned());
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Take the version and an open handle under the record's lock.
    /// `None` when the record does not exist.
    pub fn begin_read(&self, id: &str) -> StoreResult<Option<ReadHandle>> {
        let path = self.record_path(id);
        if !path.exists() {
            return Ok(None);
        }
        let name = self.file_name(id);
        self.locks.acquire(&name, self.config.lock_timeout)?;
        let result = (|| {
            let meta = match fs::metadata(&path) {
                Ok(meta) => meta,
                // deleted between the existence probe and the lock
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
                Err(e) => return Err(e.into()),
            };
            let file = File::open(&path)?;
            Ok(Some(ReadHandle {
                id: id.to_owned(),
                version: mtime_millis(&meta),
                file,
            }))
        })();
        self.finish(&name, result)
    }

    /// Decode a snapshot, outside any lock.
    pub fn complete_read(&self, mut handle: ReadHandle) -> StoreResult<E> {
        let mut bytes = Vec::new();
        handle.file.read_to_end(&mut bytes)?;
        let mut entity = self.format.deserialize(&handle.id, &bytes)?;
        entity.set_version(handle.version);
        Ok(entity)
    }

    pub fn read(&self, id: &str) -> StoreResult<Option<E>> {
        match self.begin_read(id)? {
            Some(handle) => Ok(Some(self.complete_read(handle)?)),
            None => Ok(None),
        }
    }

    /// Persist the record and stamp its new version. The version the
    /// record carries decides the safety check: zero must create,
    /// non-zero must update a file that has not moved past it.
    pub fn write(&self, entity: &mut E) -> StoreResult<()> {
        let id = entity.id().ok_or(StoreError::MissingId)?.to_owned();
        let path = self.record_path(&id);
        // cheap pre-check before serializing or locking
        self.check_write_safety(&path, entity.version(), &id)?;
        let bytes = self.format.serialize(entity)?;
        let tmp = self.dir.join(format!(
            "{}.{}.tmp",
            self.file_name(&id),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        fs::write(&tmp, &bytes)?;

        let name = self.file_name(&id);
        self.locks.acquire(&name, self.config.lock_timeout)?;
        let result = (|| {
            self.check_write_safety(&path, entity.version(), &id)?;
            fs::rename(&tmp, &path)?;
            let version = mtime_millis(&fs::metadata(&path)?);
            entity.set_version(version);
            debug!(id = %id, version, "record written");
            Ok(())
        })();
        if result.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        self.finish(&name, result)
    }

    /// Remove the record. `Ok(false)` when there was nothing to
    /// remove.
    pub fn delete(&self, id: &str) -> StoreResult<bool> {
        let name = self.file_name(id);
        self.locks.acquire(&name, self.config.lock_timeout)?;
        let result = match fs::remove_file(self.record_path(id)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        };
        self.finish(&name, result)
    }

    /// Remove every record file. For tests and resets.
    pub fn clear(&self) -> StoreResult<()> {
        for id in self.list_ids()? {
            self.delete(&id)?;
        }
        Ok(())
    }

    fn check_write_safety(&self, path: &Path, version: i64, id: &str) -> StoreResult<()> {
        if version == 0 {
            if path.exists() {
                return Err(StoreError::AlreadyExists { id: id.to_owned() });
            }
            return Ok(());
        }
        match fs::metadata(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::Removed { id: id.to_owned() })
            }
            Err(e) => Err(e.into()),
            Ok(meta) if mtime_millis(&meta) > version => {
                Err(StoreError::Changed { id: id.to_owned() })
            }
            Ok(_) => Ok(()),
        }
    }

    /// Release the lock and fold a release failure into the outcome
    /// without masking an earlier error.
    fn finish<T>(&self, name: &str, result: StoreResult<T>) -> StoreResult<T> {
        match (result, self.locks.release(name)) {
            (Ok(value), Ok(())) => Ok(value),
            (Err(e), _) => Err(e),
            (Ok(_), Err(e)) => Err(e.into()),
        }
    }
}

fn mtime_millis(meta: &fs::Metadata) -> i64 {
    meta.modified()
        .ok()
        .and_then(|t| t.duration_since(SystemTime::UNIX_EPOCH).ok())
        .map_or(0, |d| d.as_millis() as i64)
}
