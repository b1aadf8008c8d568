mod common;

use pretty_assertions::assert_eq;
use realmfile_store::StoreError;

use common::{realm_store, sample_realm, tick};

// ── Create / read / delete ──────────────────────────────────────────

#[test]
fn create_and_read_round_trip() {
    let fx = realm_store();
    let mut realm = sample_realm("r1");
    assert_eq!(realm.version, 0);

    fx.store.write(&mut realm).unwrap();
    assert!(realm.version > 0, "write stamps the new version");
    assert!(fx.store.exists("r1"));

    let loaded = fx.store.read("r1").unwrap().unwrap();
    assert_eq!(loaded, realm);
}

#[test]
fn read_of_absent_record_is_none() {
    let fx = realm_store();
    assert!(fx.store.read("ghost").unwrap().is_none());
}

#[test]
fn file_name_is_the_id_authority() {
    let fx = realm_store();
    // a document with no id inside still comes back with one
    std::fs::write(fx.store.dir().join("r9.yaml"), "name: anon\n").unwrap();
    let loaded = fx.store.read("r9").unwrap().unwrap();
    assert_eq!(loaded.id.as_deref(), Some("r9"));
    assert_eq!(loaded.name.as_deref(), Some("anon"));
}

#[test]
fn delete_reports_presence() {
    let fx = realm_store();
    let mut realm = sample_realm("r1");
    fx.store.write(&mut realm).unwrap();

    assert!(fx.store.delete("r1").unwrap());
    assert!(!fx.store.delete("r1").unwrap());
    assert!(fx.store.read("r1").unwrap().is_none());
}

#[test]
fn list_ids_and_clear() {
    let fx = realm_store();
    for id in ["b", "a", "c"] {
        fx.store.write(&mut sample_realm(id)).unwrap();
    }
    assert_eq!(fx.store.list_ids().unwrap(), ["a", "b", "c"]);

    fx.store.clear().unwrap();
    assert!(fx.store.list_ids().unwrap().is_empty());
}

#[test]
fn record_without_id_is_rejected() {
    let fx = realm_store();
    let mut realm = sample_realm("r1");
    realm.id = None;
    assert!(matches!(
        fx.store.write(&mut realm).unwrap_err(),
        StoreError::MissingId
    ));
}

// ── Optimistic concurrency ──────────────────────────────────────────

#[test]
fn create_of_existing_record_fails() {
    let fx = realm_store();
    fx.store.write(&mut sample_realm("r1")).unwrap();

    // version zero declares "create"
    let err = fx.store.write(&mut sample_realm("r1")).unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists { .. }));
}

#[test]
fn stale_update_fails_as_changed() {
    let fx = realm_store();
    let mut realm = sample_realm("r1");
    fx.store.write(&mut realm).unwrap();

    let mut stale = fx.store.read("r1").unwrap().unwrap();
    tick();

    let mut fresh = fx.store.read("r1").unwrap().unwrap();
    fresh.set_attribute("winner", vec!["fresh".to_string()]);
    fx.store.write(&mut fresh).unwrap();

    stale.set_attribute("winner", vec!["stale".to_string()]);
    let err = fx.store.write(&mut stale).unwrap_err();
    assert!(matches!(err, StoreError::Changed { .. }));

    let loaded = fx.store.read("r1").unwrap().unwrap();
    assert_eq!(
        loaded.attribute("winner"),
        Some(&["fresh".to_string()][..])
    );
}

#[test]
fn update_of_removed_record_fails() {
    let fx = realm_store();
    let mut realm = sample_realm("r1");
    fx.store.write(&mut realm).unwrap();
    fx.store.delete("r1").unwrap();

    realm.set_attribute("late", vec!["x".to_string()]);
    let err = fx.store.write(&mut realm).unwrap_err();
    assert!(matches!(err, StoreError::Removed { .. }));
}

#[test]
fn successive_updates_advance_the_version() {
    let fx = realm_store();
    let mut realm = sample_realm("r1");
    fx.store.write(&mut realm).unwrap();
    let v1 = realm.version;

    tick();
    realm.set_attribute("touched", vec!["yes".to_string()]);
    fx.store.write(&mut realm).unwrap();
    assert!(realm.version > v1);
}

// ── Relaxed reads ───────────────────────────────────────────────────

#[test]
fn snapshot_survives_a_concurrent_overwrite() {
    let fx = realm_store();
    let mut realm = sample_realm("r1");
    fx.store.write(&mut realm).unwrap();

    let handle = fx.store.begin_read("r1").unwrap().unwrap();
    let snapshot_version = handle.version();
    tick();

    let mut fresh = fx.store.read("r1").unwrap().unwrap();
    fresh.set_attribute("generation", vec!["2".to_string()]);
    fx.store.write(&mut fresh).unwrap();

    // the handle still decodes the bytes it was opened on
    let old = fx.store.complete_read(handle).unwrap();
    assert_eq!(old.version, snapshot_version);
    assert_eq!(old.attribute("generation"), None);

    let new = fx.store.read("r1").unwrap().unwrap();
    assert_eq!(
        new.attribute("generation"),
        Some(&["2".to_string()][..])
    );
    assert!(new.version > old.version);
}
