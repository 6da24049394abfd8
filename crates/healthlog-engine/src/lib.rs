//! HealthLog Engine - Orchestration layer
//!
//! Runs an inbound text message through the parse, help, see-meds,
//! validate and record/report stages against an injected log store, and
//! runs the scheduled reminder.

pub mod commands;
pub mod user_locks;

pub use commands::message::{MessageOutcome, Orchestrator};
pub use commands::reminder::{run_reminder, ReminderOutcome, ReminderSettings};
pub use user_locks::UserLocks;
