//! Per-user exclusive sections
//!
//! A read of the current medications and the commit that follows it must
//! not interleave with another message from the same user. Different users
//! never contend. A user's slot only lives while someone is using it.

#![allow(clippy::result_large_err)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use healthlog_core::errors::{ExError, ExErrorKind, Result};
use healthlog_core::model::UserId;

#[derive(Debug, Default)]
pub struct UserLocks {
    slots: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding `user`'s lock
    ///
    /// # Errors
    ///
    /// Returns `Concurrency` if a previous holder panicked.
    pub fn with_user<T>(&self, user: &UserId, f: impl FnOnce() -> T) -> Result<T> {
        let slot = self.slot(user)?;
        let out = {
            let _guard = slot.lock().map_err(|_| poisoned(user))?;
            f()
        };
        self.release(user, slot);
        Ok(out)
    }

    fn slot(&self, user: &UserId) -> Result<Arc<Mutex<()>>> {
        let mut slots = self.slots.lock().map_err(|_| poisoned(user))?;
        Ok(slots.entry(user.clone()).or_default().clone())
    }

    /// Drop the caller's handle and forget the slot once nobody else holds it
    ///
    /// Handles are only cloned and released under the map lock, so the
    /// count seen here is exact. A poisoned slot is never released and keeps
    /// reporting the panic.
    fn release(&self, user: &UserId, slot: Arc<Mutex<()>>) {
        let Ok(mut slots) = self.slots.lock() else {
            return;
        };
        drop(slot);
        if slots.get(user).is_some_and(|s| Arc::strong_count(s) == 1) {
            slots.remove(user);
        }
    }

    /// Number of users currently holding or waiting on a slot
    pub fn len(&self) -> usize {
        self.slots.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned(user: &UserId) -> ExError {
    ExError::new(ExErrorKind::Concurrency)
        .with_op("user_lock")
        .with_user_id(user.masked())
        .with_message("user lock poisoned")
}
