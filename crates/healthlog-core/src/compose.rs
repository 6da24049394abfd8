//! Record composer: validated command + current state to a [`RecordPlan`]

use chrono::NaiveDate;

use crate::errors::HealthLogError;
use crate::model::{CommitMode, LogEntry, MedicationList, ParsedCommand, Ratings, RecordPlan};

/// Build the entry to commit and decide how to commit it
///
/// The medication list is the current list with every removal filtered out
/// (original order kept), followed by the additions in message order.
///
/// # Errors
///
/// Returns `WrongRatingCount` if the command does not carry exactly five
/// ratings; callers are expected to have validated it first.
pub fn compose(
    cmd: &ParsedCommand,
    current: &MedicationList,
    today: NaiveDate,
) -> Result<RecordPlan, HealthLogError> {
    let ratings = Ratings::try_from(cmd.ratings.as_slice())?;
    let entry = LogEntry {
        date: today,
        ratings,
        meds: current.revise(&cmd.remove_meds, &cmd.add_meds),
        note: cmd.note.clone(),
    };
    let mode = if cmd.flags.amend {
        CommitMode::Amend
    } else {
        CommitMode::Append
    };
    Ok(RecordPlan { entry, mode })
}
