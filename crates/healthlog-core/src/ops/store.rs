use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use chrono::NaiveDate;

use crate::errors::{ExError, ExErrorKind, Result};
use crate::model::{parse_entry_date, LogEntry, MedicationList, UserId};

/// Cells of the most recent entry that callers read directly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellRef {
    /// Medication field of the most recent entry
    CurrentMeds,
    /// Date field of the most recent entry
    LastEntryDate,
}

/// Ordered, most-recent-first log of entries, one log per user
///
/// The store does not deduplicate by date; one entry per day is a policy
/// of the callers.
#[allow(clippy::result_large_err)]
pub trait LogStore: Send + Sync {
    /// Read one cell of the most recent entry, `None` if the log is empty
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the backing store cannot be read.
    fn read_cell(&self, user: &UserId, cell: CellRef) -> Result<Option<String>>;

    /// Insert `entry` as the new most recent entry
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the write fails.
    fn insert_entry(&self, user: &UserId, entry: &LogEntry) -> Result<()>;

    /// Remove the most recent entry and return it, `None` if the log is empty
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the delete fails.
    fn delete_top_entry(&self, user: &UserId) -> Result<Option<LogEntry>>;

    /// Replace the most recent entry with `entry`
    ///
    /// The default is two separate calls with no atomicity: if the insert
    /// fails after the delete succeeded, the log is left one entry short.
    /// Stores that can do better override this.
    ///
    /// # Errors
    ///
    /// Returns the error of whichever step failed.
    fn replace_top_entry(&self, user: &UserId, entry: &LogEntry) -> Result<()> {
        self.delete_top_entry(user)?;
        self.insert_entry(user, entry)
    }

    /// Up to `limit` entries, most recent first
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the backing store cannot be read.
    fn recent_entries(&self, user: &UserId, limit: usize) -> Result<Vec<LogEntry>>;
}

/// Current medications, derived from the most recent entry
///
/// # Errors
///
/// Propagates store errors.
#[allow(clippy::result_large_err)]
pub fn read_current_meds(store: &dyn LogStore, user: &UserId) -> Result<MedicationList> {
    match store.read_cell(user, CellRef::CurrentMeds)? {
        Some(raw) => Ok(MedicationList::parse_field(&raw)),
        None => Ok(MedicationList::default()),
    }
}

/// Date of the most recent entry, `None` for an empty log
///
/// # Errors
///
/// Propagates store errors; returns `InvalidEntryDate` for a stored date that
/// is not `YYYY-MM-DD`.
#[allow(clippy::result_large_err)]
pub fn read_last_entry_date(store: &dyn LogStore, user: &UserId) -> Result<Option<NaiveDate>> {
    match store.read_cell(user, CellRef::LastEntryDate)? {
        Some(raw) => Ok(Some(parse_entry_date(&raw)?)),
        None => Ok(None),
    }
}

/// Store operation that can be made to fail in a [`MemoryLogStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Read,
    Insert,
    Delete,
}

/// In-memory log store
///
/// Index 0 of each user's log is the most recent entry. Individual
/// operations can be switched to fail, to exercise the error paths of
/// callers.
#[derive(Debug, Default)]
pub struct MemoryLogStore {
    logs: Mutex<HashMap<UserId, Vec<LogEntry>>>,
    failing: Mutex<HashSet<StoreOp>>,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later call of `op` fail with `Persistence`
    pub fn fail_on(&self, op: StoreOp) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.insert(op);
        }
    }

    pub fn clear_failures(&self) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.clear();
        }
    }

    #[allow(clippy::result_large_err)]
    fn check(&self, op: StoreOp) -> Result<()> {
        let failing = self.failing.lock().map_err(|_| poisoned())?;
        if failing.contains(&op) {
            return Err(ExError::new(ExErrorKind::Persistence)
                .with_op(format!("{:?}", op).to_lowercase())
                .with_message("injected failure"));
        }
        Ok(())
    }
}

fn poisoned() -> ExError {
    ExError::new(ExErrorKind::Concurrency).with_message("memory store lock poisoned")
}

impl LogStore for MemoryLogStore {
    fn read_cell(&self, user: &UserId, cell: CellRef) -> Result<Option<String>> {
        self.check(StoreOp::Read)?;
        let logs = self.logs.lock().map_err(|_| poisoned())?;
        let top = logs.get(user).and_then(|log| log.first());
        Ok(top.map(|entry| match cell {
            CellRef::CurrentMeds => entry.meds.format(),
            CellRef::LastEntryDate => entry.date_string(),
        }))
    }

    fn insert_entry(&self, user: &UserId, entry: &LogEntry) -> Result<()> {
        self.check(StoreOp::Insert)?;
        let mut logs = self.logs.lock().map_err(|_| poisoned())?;
        logs.entry(user.clone()).or_default().insert(0, entry.clone());
        Ok(())
    }

    fn delete_top_entry(&self, user: &UserId) -> Result<Option<LogEntry>> {
        self.check(StoreOp::Delete)?;
        let mut logs = self.logs.lock().map_err(|_| poisoned())?;
        Ok(logs
            .get_mut(user)
            .filter(|log| !log.is_empty())
            .map(|log| log.remove(0)))
    }

    fn recent_entries(&self, user: &UserId, limit: usize) -> Result<Vec<LogEntry>> {
        self.check(StoreOp::Read)?;
        let logs = self.logs.lock().map_err(|_| poisoned())?;
        Ok(logs
            .get(user)
            .map(|log| log.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}
