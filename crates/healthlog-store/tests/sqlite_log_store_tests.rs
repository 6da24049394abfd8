// Integration tests for the SQLite log store against files on disk

use chrono::NaiveDate;
use healthlog_core::model::{LogEntry, MedicationToken, Ratings, UserId};
use healthlog_core::ops::{read_current_meds, LogStore};
use healthlog_store::{db, migrations, SqliteLogStore};
use rusqlite::Connection;

fn entry(day: u32, note: &str) -> LogEntry {
    LogEntry {
        date: NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
        ratings: Ratings::from([1, 2, 3, 4, 5]),
        meds: [MedicationToken::from("Iron(65mg)")].into_iter().collect(),
        note: note.to_string(),
    }
}

fn setup_test_db() -> Connection {
    let mut conn = db::open_in_memory().unwrap();
    migrations::apply_migrations(&mut conn).unwrap();
    conn
}

#[test]
fn test_entries_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("log.db");
    let user = UserId::new("+15550100");

    {
        let store = SqliteLogStore::open(&path).unwrap();
        store.insert_entry(&user, &entry(1, "first")).unwrap();
    }

    let store = SqliteLogStore::open(&path).unwrap();
    let recent = store.recent_entries(&user, 5).unwrap();
    assert_eq!(recent, vec![entry(1, "first")]);
    assert_eq!(
        read_current_meds(&store, &user).unwrap().format(),
        "Iron(65mg)"
    );
}

#[test]
fn test_failed_amend_leaves_previous_entry() {
    let conn = setup_test_db();
    conn.execute_batch(
        "CREATE TRIGGER reject_boom BEFORE INSERT ON log_entries
         WHEN NEW.note = 'boom'
         BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
    )
    .unwrap();
    let store = SqliteLogStore::from_connection(conn);
    let user = UserId::new("+15550100");
    store.insert_entry(&user, &entry(1, "kept")).unwrap();

    let err = store.replace_top_entry(&user, &entry(1, "boom")).unwrap_err();
    assert_eq!(err.code(), "ERR_PERSISTENCE");

    let recent = store.recent_entries(&user, 5).unwrap();
    assert_eq!(recent, vec![entry(1, "kept")]);
}

#[test]
fn test_amend_on_empty_log_inserts() {
    let store = SqliteLogStore::from_connection(setup_test_db());
    let user = UserId::new("+15550100");

    store.replace_top_entry(&user, &entry(3, "only")).unwrap();

    assert_eq!(store.recent_entries(&user, 5).unwrap(), vec![entry(3, "only")]);
}

#[test]
fn test_recent_entries_respects_limit() {
    let store = SqliteLogStore::from_connection(setup_test_db());
    let user = UserId::new("+15550100");
    for day in 1..=4 {
        store.insert_entry(&user, &entry(day, "")).unwrap();
    }

    let recent = store.recent_entries(&user, 2).unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].date, NaiveDate::from_ymd_opt(2024, 6, 4).unwrap());
    assert_eq!(recent[1].date, NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
}

#[test]
fn test_migrations_recorded_once_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("log.db");
    drop(SqliteLogStore::open(&path).unwrap());
    drop(SqliteLogStore::open(&path).unwrap());

    let conn = db::open(&path).unwrap();
    assert_eq!(
        migrations::applied_migrations(&conn).unwrap(),
        vec!["001_log_entries".to_string()]
    );
}
