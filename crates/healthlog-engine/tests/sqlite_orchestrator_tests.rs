mod common;

use std::sync::Arc;
use std::thread;

use common::{orchestrator, send, user};
use healthlog_core::ops::{read_current_meds, LogStore};
use healthlog_engine::MessageOutcome;
use healthlog_store::SqliteLogStore;

#[test]
fn test_concurrent_additions_do_not_lose_updates() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SqliteLogStore::open(dir.path().join("log.db")).unwrap());
    let o = Arc::new(orchestrator(store.clone()));

    let handles: Vec<_> = (0..6)
        .map(|i| {
            let o = Arc::clone(&o);
            thread::spawn(move || send(&o, &format!("1 2 3 4 5 +Med{}(1)", i)))
        })
        .collect();
    for h in handles {
        let outcome = h.join().unwrap();
        assert!(matches!(outcome, MessageOutcome::Recorded(_)));
    }

    let meds = read_current_meds(store.as_ref(), &user()).unwrap();
    assert_eq!(meds.len(), 6);
    assert_eq!(store.recent_entries(&user(), 10).unwrap().len(), 6);
}

#[test]
fn test_duplicate_addition_rejected_after_commit() {
    let store = Arc::new(SqliteLogStore::open_in_memory().unwrap());
    let o = orchestrator(store.clone());

    assert_eq!(send(&o, "1 2 3 4 5 +Iron(65mg)").reply(), "Response recorded!");
    assert_eq!(
        send(&o, "1 2 3 4 5 +Iron(65mg)").reply(),
        "Med to be added already listed, see your meds by replying 'see-meds'"
    );
    assert_eq!(
        send(&o, "see-meds").reply(),
        "Your current meds are: Iron(65mg)"
    );
}

#[test]
fn test_amend_on_empty_log_inserts() {
    let store = Arc::new(SqliteLogStore::open_in_memory().unwrap());
    let o = orchestrator(store.clone());

    assert_eq!(send(&o, "1 2 3 4 5 amend").reply(), "Response recorded!");
    assert_eq!(store.recent_entries(&user(), 10).unwrap().len(), 1);
}
