//! Scheduled reminder run
//!
//! Invoked by an external scheduler. Reads the clock and the recipient's
//! last entry date, and sends the reminder when the policy says so. Send
//! failures are returned to the caller, never retried.

#![allow(clippy::result_large_err)]

use std::time::Instant;

use healthlog_core::model::UserId;
use healthlog_core::ops::{read_last_entry_date, Clock, LogStore, Messenger};
use healthlog_core::reminder::{is_checkpoint, should_remind, DEFAULT_REMINDER_MESSAGE};
use healthlog_core::{log_op_end, log_op_error, log_op_start, Result};
use healthlog_core_types::RequestContext;

/// Who gets reminded, and with what
#[derive(Debug, Clone)]
pub struct ReminderSettings {
    pub recipient: UserId,
    pub message: String,
}

impl ReminderSettings {
    pub fn new(recipient: UserId) -> Self {
        Self {
            recipient,
            message: DEFAULT_REMINDER_MESSAGE.to_string(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderOutcome {
    Sent,
    /// Not one of the checkpoint hours
    OffCheckpoint,
    /// An entry already exists for today
    AlreadyLogged,
}

impl ReminderOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderOutcome::Sent => "sent",
            ReminderOutcome::OffCheckpoint => "off_checkpoint",
            ReminderOutcome::AlreadyLogged => "already_logged",
        }
    }
}

/// Evaluate the reminder policy once and send if due
///
/// # Errors
///
/// Returns the store error if the last entry date cannot be read, or the
/// messenger error if the send fails.
pub fn run_reminder(
    ctx: &RequestContext,
    store: &dyn LogStore,
    messenger: &dyn Messenger,
    clock: &dyn Clock,
    settings: &ReminderSettings,
) -> Result<ReminderOutcome> {
    let start = Instant::now();
    log_op_start!("run_reminder", request_id = %ctx.request_id);

    let result = evaluate_and_send(store, messenger, clock, settings);
    let duration_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(outcome) => {
            log_op_end!(
                "run_reminder",
                duration_ms = duration_ms,
                request_id = %ctx.request_id,
                outcome = outcome.as_str()
            );
        }
        Err(err) => {
            log_op_error!(
                "run_reminder",
                err.clone(),
                duration_ms = duration_ms,
                request_id = %ctx.request_id
            );
        }
    }
    result
}

fn evaluate_and_send(
    store: &dyn LogStore,
    messenger: &dyn Messenger,
    clock: &dyn Clock,
    settings: &ReminderSettings,
) -> Result<ReminderOutcome> {
    let now = clock.now_local();
    if !is_checkpoint(now) {
        return Ok(ReminderOutcome::OffCheckpoint);
    }

    let last_entry_date = read_last_entry_date(store, &settings.recipient)?;
    if !should_remind(now, last_entry_date) {
        return Ok(ReminderOutcome::AlreadyLogged);
    }

    messenger.send(&settings.message, settings.recipient.as_str())?;
    Ok(ReminderOutcome::Sent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use healthlog_core::model::{LogEntry, MedicationList, Ratings};
    use healthlog_core::ops::{FixedClock, MemoryLogStore, RecordingMessenger};

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn settings() -> ReminderSettings {
        ReminderSettings::new(UserId::new("+15550100"))
    }

    fn log_on(store: &MemoryLogStore, day: u32) {
        store
            .insert_entry(
                &settings().recipient,
                &LogEntry {
                    date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
                    ratings: Ratings::from([5, 5, 5, 5, 5]),
                    meds: MedicationList::default(),
                    note: String::new(),
                },
            )
            .unwrap();
    }

    #[test]
    fn test_sends_at_checkpoint_without_entry() {
        let store = MemoryLogStore::new();
        log_on(&store, 16);
        let messenger = RecordingMessenger::new();

        let outcome = run_reminder(
            &RequestContext::new(),
            &store,
            &messenger,
            &FixedClock(at(17, 14, 3)),
            &settings(),
        )
        .unwrap();

        assert_eq!(outcome, ReminderOutcome::Sent);
        let sent = messenger.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient, "+15550100");
        assert_eq!(sent[0].body, DEFAULT_REMINDER_MESSAGE);
    }

    #[test]
    fn test_silent_when_logged_today() {
        let store = MemoryLogStore::new();
        log_on(&store, 17);
        let messenger = RecordingMessenger::new();

        let outcome = run_reminder(
            &RequestContext::new(),
            &store,
            &messenger,
            &FixedClock(at(17, 20, 0)),
            &settings(),
        )
        .unwrap();

        assert_eq!(outcome, ReminderOutcome::AlreadyLogged);
        assert!(messenger.sent().is_empty());
    }

    #[test]
    fn test_silent_off_checkpoint() {
        let store = MemoryLogStore::new();
        let messenger = RecordingMessenger::new();

        let outcome = run_reminder(
            &RequestContext::new(),
            &store,
            &messenger,
            &FixedClock(at(17, 12, 0)),
            &settings(),
        )
        .unwrap();

        assert_eq!(outcome, ReminderOutcome::OffCheckpoint);
        assert!(messenger.sent().is_empty());
    }

    #[test]
    fn test_send_failure_is_returned() {
        let store = MemoryLogStore::new();
        let messenger = RecordingMessenger::unreachable();

        let err = run_reminder(
            &RequestContext::new(),
            &store,
            &messenger,
            &FixedClock(at(17, 11, 0)),
            &settings().with_message("ping"),
        )
        .unwrap_err();

        assert_eq!(err.code(), "ERR_EXTERNAL_SERVICE");
    }
}
