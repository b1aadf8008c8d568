//! Shared test helpers for the store crates.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use realmfile_model::RealmEntity;
use realmfile_store::{FileLockManager, FileStore, RealmYamlFormat};
use tempfile::TempDir;

pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub struct StoreFixture {
    pub root: TempDir,
    pub locks: Arc<FileLockManager>,
    pub store: FileStore<RealmEntity, RealmYamlFormat>,
}

pub fn realm_store() -> StoreFixture {
    init_tracing();
    let root = TempDir::new().unwrap();
    let locks = Arc::new(FileLockManager::new(root.path().join("locks")).unwrap());
    let store = FileStore::new(
        root.path().join("realms"),
        Arc::clone(&locks),
        RealmYamlFormat,
    )
    .unwrap();
    StoreFixture { root, locks, store }
}

pub fn lock_manager() -> (TempDir, Arc<FileLockManager>) {
    init_tracing();
    let root = TempDir::new().unwrap();
    let locks = Arc::new(FileLockManager::new(root.path().join("locks")).unwrap());
    (root, locks)
}

pub fn sample_realm(id: &str) -> RealmEntity {
    let mut realm = RealmEntity::new(format!("realm-{id}"));
    realm.id = Some(id.to_string());
    realm.enabled = Some(true);
    realm.set_attribute("displayName", vec![format!("Realm {id}")]);
    realm
}

/// File mtimes are the version clock; put writes that must order on
/// opposite sides of a tick.
pub fn tick() {
    std::thread::sleep(Duration::from_millis(15));
}
