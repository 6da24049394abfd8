//! SQLite-backed `LogStore`
//!
//! Each user's log is the set of `log_entries` rows with their `user_id`;
//! the row with the highest id is the most recent entry.

#![allow(clippy::result_large_err)]

use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

use healthlog_core::errors::{ExError, Result};
use healthlog_core::model::{parse_entry_date, LogEntry, MedicationList, Ratings, UserId};
use healthlog_core::ops::{CellRef, LogStore};
use healthlog_core::{log_op_end, log_op_error, log_op_start};
use rusqlite::{Connection, OptionalExtension};

use crate::db;
use crate::errors::{from_rusqlite, lock_poisoned};
use crate::migrations::apply_migrations;

const ENTRY_COLUMNS: &str = "id, entry_date, sleep, stress, joints, energy, mood, meds, note";

/// A stored row before its text columns are parsed
struct EntryRow {
    id: i64,
    date: String,
    ratings: [u32; 5],
    meds: String,
    note: String,
}

impl EntryRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            date: row.get(1)?,
            ratings: [row.get(2)?, row.get(3)?, row.get(4)?, row.get(5)?, row.get(6)?],
            meds: row.get(7)?,
            note: row.get(8)?,
        })
    }

    fn into_entry(self) -> Result<LogEntry> {
        Ok(LogEntry {
            date: parse_entry_date(&self.date)?,
            ratings: Ratings::from(self.ratings),
            meds: MedicationList::parse_field(&self.meds),
            note: self.note,
        })
    }
}

/// Log store persisted in a single SQLite database
///
/// The connection is shared behind a mutex; every trait call holds it for
/// the whole statement or transaction.
pub struct SqliteLogStore {
    conn: Mutex<Connection>,
}

impl SqliteLogStore {
    /// Open (or create) the database at `path` and bring its schema up to date
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut conn = db::open(path)?;
        db::configure(&conn)?;
        apply_migrations(&mut conn)?;
        Ok(Self::from_connection(conn))
    }

    /// Fresh in-memory store with the schema applied
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = db::open_in_memory()?;
        apply_migrations(&mut conn)?;
        Ok(Self::from_connection(conn))
    }

    /// Wrap a connection whose migrations have already been applied
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn with_conn<T>(&self, f: impl FnOnce(&mut Connection) -> Result<T>) -> Result<T> {
        let mut conn = self.conn.lock().map_err(|_| lock_poisoned())?;
        f(&mut conn)
    }
}

fn top_row(conn: &Connection, user: &UserId) -> Result<Option<EntryRow>> {
    conn.query_row(
        &format!(
            "SELECT {} FROM log_entries WHERE user_id = ?1 ORDER BY id DESC LIMIT 1",
            ENTRY_COLUMNS
        ),
        [user.as_str()],
        EntryRow::from_row,
    )
    .optional()
    .map_err(from_rusqlite)
}

fn insert_row(conn: &Connection, user: &UserId, entry: &LogEntry) -> Result<()> {
    let r = entry.ratings.as_array();
    conn.execute(
        "INSERT INTO log_entries
            (user_id, entry_date, sleep, stress, joints, energy, mood, meds, note, recorded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        rusqlite::params![
            user.as_str(),
            entry.date_string(),
            r[0],
            r[1],
            r[2],
            r[3],
            r[4],
            entry.meds.format(),
            entry.note,
            chrono::Utc::now().timestamp(),
        ],
    )
    .map_err(from_rusqlite)?;
    Ok(())
}

fn delete_top_row(conn: &Connection, user: &UserId) -> Result<Option<EntryRow>> {
    let Some(row) = top_row(conn, user)? else {
        return Ok(None);
    };
    conn.execute("DELETE FROM log_entries WHERE id = ?1", [row.id])
        .map_err(from_rusqlite)?;
    Ok(Some(row))
}

fn traced<T>(op: &'static str, user: &UserId, f: impl FnOnce() -> Result<T>) -> Result<T> {
    let start = Instant::now();
    let user_id = user.masked();
    log_op_start!(op, user_id = %user_id);
    let result = f();
    let duration_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(_) => {
            log_op_end!(op, duration_ms = duration_ms, user_id = %user_id);
        }
        Err(e) => {
            log_op_error!(op, e.clone(), duration_ms = duration_ms, user_id = %user_id);
        }
    }
    result
}

impl LogStore for SqliteLogStore {
    fn read_cell(&self, user: &UserId, cell: CellRef) -> Result<Option<String>> {
        let column = match cell {
            CellRef::CurrentMeds => "meds",
            CellRef::LastEntryDate => "entry_date",
        };
        self.with_conn(|conn| {
            conn.query_row(
                &format!(
                    "SELECT {} FROM log_entries WHERE user_id = ?1 ORDER BY id DESC LIMIT 1",
                    column
                ),
                [user.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(from_rusqlite)
        })
    }

    fn insert_entry(&self, user: &UserId, entry: &LogEntry) -> Result<()> {
        traced("store_insert_entry", user, || {
            self.with_conn(|conn| insert_row(conn, user, entry))
        })
    }

    fn delete_top_entry(&self, user: &UserId) -> Result<Option<LogEntry>> {
        traced("store_delete_top_entry", user, || {
            self.with_conn(|conn| {
                let tx = conn.transaction().map_err(from_rusqlite)?;
                // An unreadable row rolls back with the transaction
                let removed = delete_top_row(&tx, user)?
                    .map(EntryRow::into_entry)
                    .transpose()?;
                tx.commit().map_err(from_rusqlite)?;
                Ok(removed)
            })
        })
    }

    /// Delete and insert in one transaction, so a failed insert leaves the
    /// previous top entry in place
    fn replace_top_entry(&self, user: &UserId, entry: &LogEntry) -> Result<()> {
        traced("store_replace_top_entry", user, || {
            self.with_conn(|conn| {
                let tx = conn.transaction().map_err(from_rusqlite)?;
                delete_top_row(&tx, user)?;
                insert_row(&tx, user, entry)?;
                tx.commit().map_err(from_rusqlite)
            })
        })
    }

    fn recent_entries(&self, user: &UserId, limit: usize) -> Result<Vec<LogEntry>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {} FROM log_entries WHERE user_id = ?1 ORDER BY id DESC LIMIT ?2",
                    ENTRY_COLUMNS
                ))
                .map_err(from_rusqlite)?;
            let limit = i64::try_from(limit).unwrap_or(i64::MAX);
            let rows = stmt
                .query_map(rusqlite::params![user.as_str(), limit], EntryRow::from_row)
                .map_err(from_rusqlite)?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(from_rusqlite)?;
            rows.into_iter()
                .map(EntryRow::into_entry)
                .collect::<std::result::Result<Vec<_>, ExError>>()
        })
    }
}
