//! Reminder policy: should a nudge go out right now?

use chrono::{NaiveDate, NaiveDateTime, Timelike};

/// Local hours (24h clock) at which the reminder is evaluated
pub const CHECKPOINT_HOURS: [u32; 4] = [11, 14, 17, 20];

/// Text sent when no entry exists yet today
pub const DEFAULT_REMINDER_MESSAGE: &str = "I haven't heard from you today. How are you feeling? \
Reply with a # for: sleep, stress, joints, energy, and your mood.";

/// True at a checkpoint hour when nothing has been logged today
///
/// Matching is by hour only: a scheduler that fires at 14:07 still hits the
/// 2 PM checkpoint. `last_entry_date` is `None` for an empty log.
pub fn should_remind(now_local: NaiveDateTime, last_entry_date: Option<NaiveDate>) -> bool {
    is_checkpoint(now_local) && last_entry_date != Some(now_local.date())
}

pub fn is_checkpoint(now_local: NaiveDateTime) -> bool {
    CHECKPOINT_HOURS.contains(&now_local.hour())
}
