mod common;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use realmfile_store::LockError;

use common::lock_manager;

const LONG: Duration = Duration::from_secs(30);

// ── Mutual exclusion ────────────────────────────────────────────────

#[test]
fn contended_lock_is_mutually_exclusive() {
    let (_root, locks) = lock_manager();
    let in_critical = Arc::new(AtomicBool::new(false));
    let entries = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..50 {
        let locks = Arc::clone(&locks);
        let in_critical = Arc::clone(&in_critical);
        let entries = Arc::clone(&entries);
        handles.push(thread::spawn(move || {
            locks.acquire("shared", LONG).unwrap();
            assert!(
                !in_critical.swap(true, Ordering::SeqCst),
                "two threads inside the critical section"
            );
            entries.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(1));
            in_critical.store(false, Ordering::SeqCst);
            locks.release("shared").unwrap();
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(entries.load(Ordering::SeqCst), 50);
}

#[test]
fn timeout_error_names_the_resource() {
    let (_root, locks) = lock_manager();
    locks.acquire("busy-realm", LONG).unwrap();

    let contender = {
        let locks = Arc::clone(&locks);
        thread::spawn(move || locks.acquire("busy-realm", Duration::from_millis(200)))
    };
    let err = contender.join().unwrap().unwrap_err();
    assert!(matches!(err, LockError::Timeout { .. }));
    assert!(err.to_string().contains("busy-realm"));

    locks.release("busy-realm").unwrap();
}

// ── Reentrancy and ownership ────────────────────────────────────────

#[test]
fn acquire_is_reentrant_within_a_thread() {
    let (_root, locks) = lock_manager();
    locks.acquire("again", Duration::from_millis(100)).unwrap();
    // no timeout: the second acquire sees our own ownership
    locks.acquire("again", Duration::from_millis(100)).unwrap();
    locks.release("again").unwrap();
    // one release ends the hold, no matter how many acquires
    let err = locks.release("again").unwrap_err();
    assert!(matches!(err, LockError::NotOwner { .. }));
}

#[test]
fn release_by_non_owner_is_rejected() {
    let (_root, locks) = lock_manager();
    locks.acquire("mine", LONG).unwrap();

    let intruder = {
        let locks = Arc::clone(&locks);
        thread::spawn(move || locks.release("mine"))
    };
    let err = intruder.join().unwrap().unwrap_err();
    assert!(matches!(err, LockError::NotOwner { .. }));

    // still held by the owner
    locks.release("mine").unwrap();
}

// ── Batch operations ────────────────────────────────────────────────

#[test]
fn acquire_multiple_takes_all_locks() {
    let (root, locks) = lock_manager();
    locks.acquire_multiple(&["a", "b", "c"], LONG).unwrap();
    for name in ["a", "b", "c"] {
        assert!(root.path().join("locks").join(format!("{name}.lock")).exists());
    }
    locks.release_multiple(&["a", "b", "c"]).unwrap();
    for name in ["a", "b", "c"] {
        assert!(!root.path().join("locks").join(format!("{name}.lock")).exists());
    }
}

#[test]
fn acquire_multiple_rolls_back_on_contention() {
    let (root, locks) = lock_manager();

    let holder = {
        let locks = Arc::clone(&locks);
        thread::spawn(move || {
            locks.acquire("b", LONG).unwrap();
            thread::sleep(Duration::from_millis(400));
            locks.release("b").unwrap();
        })
    };
    thread::sleep(Duration::from_millis(50));

    let err = locks
        .acquire_multiple(&["a", "b"], Duration::from_millis(150))
        .unwrap_err();
    assert!(matches!(err, LockError::Timeout { .. }));
    assert!(err.to_string().contains('b'));
    // the partial acquisition of `a` was rolled back
    assert!(!root.path().join("locks").join("a.lock").exists());

    holder.join().unwrap();
}

#[test]
fn release_multiple_validates_ownership_before_deleting() {
    let (root, locks) = lock_manager();
    locks.acquire("a", LONG).unwrap();

    let err = locks.release_multiple(&["a", "b"]).unwrap_err();
    assert!(matches!(err, LockError::NotOwner { .. }));
    // nothing was released
    assert!(root.path().join("locks").join("a.lock").exists());

    locks.release("a").unwrap();
}

#[test]
fn release_all_sweeps_the_lock_directory() {
    let (root, locks) = lock_manager();
    locks.acquire("a", LONG).unwrap();
    locks.acquire("b", LONG).unwrap();
    // a marker left behind by a crashed process
    std::fs::write(root.path().join("locks").join("stale.lock"), b"").unwrap();

    locks.release_all().unwrap();

    let remaining: Vec<_> = std::fs::read_dir(root.path().join("locks"))
        .unwrap()
        .collect();
    assert!(remaining.is_empty());
    // ownership table was cleared too: releasing now fails cleanly
    assert!(matches!(
        locks.release("a").unwrap_err(),
        LockError::NotOwner { .. }
    ));
    // and the names are free for anyone again
    locks.acquire("a", Duration::from_millis(100)).unwrap();
    locks.release("a").unwrap();
}
