mod common;

use std::sync::Arc;

use common::{entry, orchestrator, send, today, user};
use healthlog_core::errors::Stage;
use healthlog_core::model::CommitMode;
use healthlog_core::ops::{LogStore, MemoryLogStore, StoreOp};
use healthlog_engine::MessageOutcome;

#[test]
fn test_amend_replaces_todays_entry() {
    let store = Arc::new(MemoryLogStore::new());
    let yesterday = today().pred_opt().unwrap();
    store
        .insert_entry(&user(), &entry(yesterday, [6, 6, 6, 6, 6], &["A(1)"], "old"))
        .unwrap();
    store
        .insert_entry(&user(), &entry(today(), [1, 1, 1, 1, 1], &["A(1)", "B(2)"], "x"))
        .unwrap();
    let o = orchestrator(store.clone());

    let outcome = send(&o, "7 4 4 8 6 amend");

    assert!(matches!(outcome, MessageOutcome::Recorded(CommitMode::Amend)));
    assert_eq!(outcome.reply(), "Response recorded!");
    let log = store.recent_entries(&user(), 10).unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0], entry(today(), [7, 4, 4, 8, 6], &["A(1)", "B(2)"], ""));
    assert_eq!(log[1].note, "old");
}

#[test]
fn test_append_revises_meds_and_note() {
    let store = Arc::new(MemoryLogStore::new());
    let yesterday = today().pred_opt().unwrap();
    store
        .insert_entry(&user(), &entry(yesterday, [6, 6, 6, 6, 6], &["A(1)", "B(2)"], ""))
        .unwrap();
    let o = orchestrator(store.clone());

    let outcome = send(&o, "8 3 2 9 5 -A(1) +C(3) Note(slept badly)");

    assert!(matches!(outcome, MessageOutcome::Recorded(CommitMode::Append)));
    let log = store.recent_entries(&user(), 10).unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(
        log[0],
        entry(today(), [8, 3, 2, 9, 5], &["B(2)", "C(3)"], "slept badly")
    );
}

#[test]
fn test_invalid_message_writes_nothing() {
    let store = Arc::new(MemoryLogStore::new());
    let o = orchestrator(store.clone());

    let outcome = send(&o, "8 3 2 9 5 -Ghost(1)");

    assert_eq!(
        outcome.reply(),
        "Med to remove \"Ghost(1)\" not found; see your meds by replying \"see-meds\""
    );
    assert!(store.recent_entries(&user(), 10).unwrap().is_empty());
}

#[test]
fn test_each_stage_has_its_diagnostic() {
    let cases = [
        ("see-meds", StoreOp::Read, Stage::SeeMeds, "issue with showing meds"),
        ("1 2 3 4 5", StoreOp::Read, Stage::Validate, "issue validating"),
        ("1 2 3 4 5", StoreOp::Insert, Stage::Record, "issue logging valid sms"),
        ("1 2 3 4 5 amend", StoreOp::Delete, Stage::Record, "issue logging valid sms"),
    ];

    for (text, failing, stage, diagnostic) in cases {
        let store = Arc::new(MemoryLogStore::new());
        store.fail_on(failing);
        let o = orchestrator(store);

        match send(&o, text) {
            MessageOutcome::Failed(err) => {
                assert_eq!(err.stage, stage, "wrong stage for {:?}", text);
                assert_eq!(err.stage.diagnostic(), diagnostic);
            }
            other => panic!("expected failure for {:?}, got {:?}", text, other),
        }
    }
}

#[test]
fn test_oversized_rating_is_recorded_saturated() {
    let store = Arc::new(MemoryLogStore::new());
    let o = orchestrator(store.clone());

    let outcome = send(&o, "4294967296 1 1 1 1");

    assert!(matches!(outcome, MessageOutcome::Recorded(CommitMode::Append)));
    let log = store.recent_entries(&user(), 1).unwrap();
    assert_eq!(log[0], entry(today(), [u32::MAX, 1, 1, 1, 1], &[], ""));
}

#[test]
fn test_see_meds_ignores_long_digit_runs() {
    let store = Arc::new(MemoryLogStore::new());
    store
        .insert_entry(&user(), &entry(today(), [1, 1, 1, 1, 1], &["A(1)"], ""))
        .unwrap();
    let o = orchestrator(store);

    assert_eq!(
        send(&o, "see-meds 12345678901").reply(),
        "Your current meds are: A(1)"
    );
}

#[test]
fn test_dose_containing_separator_keeps_log_usable() {
    let store = Arc::new(MemoryLogStore::new());
    let o = orchestrator(store.clone());

    let first = send(&o, "1 2 3 4 5 +Fish oil(1g, , daily) +B(2)");
    assert!(matches!(first, MessageOutcome::Recorded(CommitMode::Append)));

    let next = send(&o, "2 2 2 2 2");
    assert!(matches!(next, MessageOutcome::Recorded(CommitMode::Append)));
    assert_eq!(
        send(&o, "see-meds").reply(),
        "Your current meds are: Fish oil(1g, , daily), B(2)"
    );

    let amend = send(&o, "3 3 3 3 3 -Fish oil(1g, , daily) amend");
    assert!(matches!(amend, MessageOutcome::Recorded(CommitMode::Amend)));
    let log = store.recent_entries(&user(), 10).unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0], entry(today(), [3, 3, 3, 3, 3], &["B(2)"], ""));
}

#[test]
fn test_amend_without_atomic_store_can_lose_top_entry() {
    // MemoryLogStore keeps the default delete-then-insert sequence
    let store = Arc::new(MemoryLogStore::new());
    store
        .insert_entry(&user(), &entry(today(), [1, 1, 1, 1, 1], &[], ""))
        .unwrap();
    store.fail_on(StoreOp::Insert);
    let o = orchestrator(store.clone());

    let outcome = send(&o, "2 2 2 2 2 amend");

    assert_eq!(outcome.reply(), "issue logging valid sms");
    store.clear_failures();
    assert!(store.recent_entries(&user(), 10).unwrap().is_empty());
}

#[test]
fn test_help_text_lists_eleven_forms() {
    let o = orchestrator(Arc::new(MemoryLogStore::new()));
    let reply = send(&o, "HELP ME please").reply();

    assert!(reply.starts_with("Respond to messages with: "));
    assert!(reply.contains("\n11. "));
    assert!(reply.ends_with("*Optional values in response"));
}
