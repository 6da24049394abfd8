//! HealthLog Core - message interpretation for a daily health log
//!
//! Turns a free-text message into a structured command, checks it against
//! the person's current medications, and plans the log mutation:
//!
//! - [`parser`]: text to [`ParsedCommand`]
//! - [`rules::validation`]: command + current meds to [`ValidationOutcome`]
//! - [`compose`]: command + current meds + today to a [`RecordPlan`]
//! - [`reminder`]: whether a reminder is due
//! - [`ops`]: the store, messenger and clock interfaces
//!
//! Nothing here performs I/O; the engine crate sequences these steps
//! against real collaborators.

pub mod compose;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod ops;
pub mod parser;
pub mod reminder;
pub mod render;
pub mod rules;

pub use healthlog_core_types::schema;

pub use compose::compose;
pub use errors::{ExError, ExErrorKind, HealthLogError, Result, Stage, StageError};
pub use model::{
    CommitMode, LogEntry, MedicationList, MedicationToken, ParsedCommand, RecordPlan, UserId,
};
pub use ops::{Clock, LogStore, Messenger};
pub use parser::parse;
pub use rules::{validate, ValidationOutcome};
