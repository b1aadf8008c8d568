//! Marker-file locks.
//!
//! A lock on `name` is an exclusively created `<name>.lock` file in
//! the lock directory, so locks exclude other processes as well as
//! other threads. Contenders retry on a randomized exponential
//! backoff until the caller's timeout runs out. Ownership is tracked
//! per thread in one table; a thread re-acquiring a name it holds
//! succeeds immediately, and only the owning thread may release.
//!
//! There is no fairness: a thread can starve under heavy contention,
//! and the caller's timeout is its only way out.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{debug, trace};

use crate::error::{LockError, LockResult};

const LOCK_EXTENSION: &str = "lock";
const BACKOFF_BASE: Duration = Duration::from_millis(50);
const BACKOFF_MAX_EXPONENT: u32 = 5;

pub struct FileLockManager {
    dir: PathBuf,
    owners: Mutex<HashMap<String, ThreadId>>,
}

impl FileLockManager {
    /// Create a manager over `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> LockResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            owners: Mutex::new(HashMap::new()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn marker_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{LOCK_EXTENSION}"))
    }

    fn owners(&self) -> std::sync::MutexGuard<'_, HashMap<String, ThreadId>> {
        self.owners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn owned_by_me(&self, name: &str) -> bool {
        self.owners().get(name) == Some(&thread::current().id())
    }

    /// Try to create the marker once. `Ok(true)` means the lock is
    /// ours on disk (not yet registered).
    fn try_create(&self, name: &str) -> LockResult<bool> {
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.marker_path(name))
        {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn backoff(attempt: u32) {
        let exponent = attempt.min(BACKOFF_MAX_EXPONENT);
        let ceiling = BACKOFF_BASE * 2u32.pow(exponent);
        let wait = rand::thread_rng().gen_range(Duration::ZERO..=ceiling);
        thread::sleep(wait);
    }

    /// Take the lock on `name`, waiting up to `timeout`. Reentrant:
    /// a thread that already holds the name returns immediately, and
    /// one `release` undoes any number of acquires.
    pub fn acquire(&self, name: &str, timeout: Duration) -> LockResult<()> {
        if self.owned_by_me(name) {
            trace!(name, "lock already held by this thread");
            return Ok(());
        }
        let start = Instant::now();
        let mut attempt = 0u32;
        loop {
            if self.try_create(name)? {
                self.owners()
                    .insert(name.to_owned(), thread::current().id());
                debug!(name, "lock acquired");
                return Ok(());
            }
            if start.elapsed() >= timeout {
                return Err(LockError::Timeout {
                    name: name.to_owned(),
                });
            }
            Self::backoff(attempt);
            attempt += 1;
        }
    }

    /// Take every named lock, or none. Each attempt creates the
    /// markers in order and rolls back the ones it created when any
    /// creation fails, then backs off; the timeout covers the whole
    /// batch. Names this thread already holds are skipped.
    pub fn acquire_multiple<S: AsRef<str>>(&self, names: &[S], timeout: Duration) -> LockResult<()> {
        let mut needed: Vec<&str> = Vec::new();
        for name in names {
            let name = name.as_ref();
            if !self.owned_by_me(name) && !needed.contains(&name) {
                needed.push(name);
            }
        }
        if needed.is_empty() {
            return Ok(());
        }
        let start = Instant::now();
        let mut attempt = 0u32;
        loop {
            let mut created: Vec<&str> = Vec::with_capacity(needed.len());
            let mut contended: Option<&str> = None;
            for &name in &needed {
                match self.try_create(name) {
                    Ok(true) => created.push(name),
                    Ok(false) => {
                        contended = Some(name);
                        break;
                    }
                    Err(e) => {
                        self.rollback(&created);
                        return Err(e);
                    }
                }
            }
            let Some(contended) = contended else {
                let me = thread::current().id();
                let mut owners = self.owners();
                for name in created {
                    owners.insert(name.to_owned(), me);
                }
                debug!(count = needed.len(), "lock batch acquired");
                return Ok(());
            };
            self.rollback(&created);
            if start.elapsed() >= timeout {
                return Err(LockError::Timeout {
                    name: contended.to_owned(),
                });
            }
            Self::backoff(attempt);
            attempt += 1;
        }
    }

    fn rollback(&self, created: &[&str]) {
        for name in created {
            // rollback markers were never registered; nothing else can
            // legitimately hold them yet
            let _ = fs::remove_file(self.marker_path(name));
        }
    }

    /// Release `name`. Fails with [`LockError::NotOwner`] when the
    /// calling thread does not hold it.
    pub fn release(&self, name: &str) -> LockResult<()> {
        let mut owners = self.owners();
        if owners.get(name) != Some(&thread::current().id()) {
            return Err(LockError::NotOwner {
                name: name.to_owned(),
            });
        }
        match fs::remove_file(self.marker_path(name)) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        owners.remove(name);
        debug!(name, "lock released");
        Ok(())
    }

    /// Release every named lock. Ownership of all names is checked
    /// before any marker is deleted; a deletion failure stops the
    /// batch and leaves the not-yet-released names held, so the
    /// caller can retry them.
    pub fn release_multiple<S: AsRef<str>>(&self, names: &[S]) -> LockResult<()> {
        let me = thread::current().id();
        let mut unique: Vec<&str> = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            if !unique.contains(&name) {
                unique.push(name);
            }
        }
        {
            let owners = self.owners();
            for &name in &unique {
                if owners.get(name) != Some(&me) {
                    return Err(LockError::NotOwner {
                        name: name.to_owned(),
                    });
                }
            }
        }
        for name in unique {
            self.release(name)?;
        }
        Ok(())
    }

    /// Administrative sweep: delete every marker in the lock
    /// directory and forget all ownership. For tests and recovery
    /// after a crash, never part of normal operation.
    pub fn release_all(&self) -> LockResult<()> {
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == LOCK_EXTENSION) {
                match fs::remove_file(&path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e.into()),
                }
            }
        }
        self.owners().clear();
        debug!("all locks released");
        Ok(())
    }
}
