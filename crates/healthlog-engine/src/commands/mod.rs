//! Engine-level commands that touch the collaborators

pub mod message;
pub mod reminder;
