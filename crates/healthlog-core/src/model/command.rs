use serde::Serialize;

use super::medication::MedicationToken;

/// Keyword flags detected anywhere in the message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CommandFlags {
    pub help: bool,
    pub see_meds: bool,
    pub amend: bool,
}

/// Structured form of one inbound message
///
/// Produced once per message by [`crate::parser::parse`] and never mutated.
/// `ratings` holds at most five values in sleep, stress, joints, energy,
/// mood order; fewer is representable and rejected by validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedCommand {
    pub ratings: Vec<u32>,
    pub add_meds: Vec<MedicationToken>,
    pub remove_meds: Vec<MedicationToken>,
    pub note: String,
    pub flags: CommandFlags,
}
