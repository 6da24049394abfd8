//! Domain models for the health log

pub mod command;
pub mod entry;
pub mod medication;
pub mod user;

pub use command::{CommandFlags, ParsedCommand};
pub use entry::{
    parse_entry_date, CommitMode, LogEntry, Ratings, RecordPlan, DATE_FORMAT, RATING_COUNT,
    RATING_NAMES,
};
pub use medication::{MedicationList, MedicationToken};
pub use user::UserId;
