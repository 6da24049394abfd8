//! Collaborator interfaces the message pipeline talks through
//!
//! Each trait has an in-process implementation here; the SQLite store and
//! the SMS gateway live in their own crates.

pub mod clock;
pub mod messenger;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use messenger::{Messenger, RecordingMessenger, SentMessage};
pub use store::{
    read_current_meds, read_last_entry_date, CellRef, LogStore, MemoryLogStore, StoreOp,
};
