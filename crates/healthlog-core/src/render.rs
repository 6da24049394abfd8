//! Reply text for the person texting in

use crate::errors::HealthLogError;
use crate::model::MedicationList;
use crate::rules::validation::REASON_SEPARATOR;

pub const RECORDED_REPLY: &str = "Response recorded!";

const HELP_LINES: [&str; 11] = [
    "Hours slept",
    "Stress level (1-9)",
    "Joints (1-9)",
    "Energy (1-9)",
    "Mood (1-9)",
    "Add a note with NOTE(YOUR NOTE)*",
    "Add a med with +MEDNAME(DOSE)*",
    "Remove a med with -MEDNAME(DOSE)*",
    "See all meds with 'see-meds'*",
    "See this menu with 'help-me'*",
    "Change today's values with 'amend'*",
];

/// The numbered menu of supported response forms
pub fn help_message() -> String {
    let mut text = String::from("Respond to messages with: ");
    for (i, line) in HELP_LINES.iter().enumerate() {
        text.push_str(&format!("\n{}. {} ", i + 1, line));
    }
    text.push_str("\n*Optional values in response");
    text
}

pub fn current_meds_message(meds: &MedicationList) -> String {
    format!("Your current meds are: {}", meds.format())
}

/// Join validation reasons into the single rejection reply
///
/// # Errors
///
/// Returns `EmptyRejection` when there is nothing to report.
pub fn rejection_message(reasons: &[String]) -> Result<String, HealthLogError> {
    if reasons.is_empty() {
        return Err(HealthLogError::EmptyRejection);
    }
    Ok(reasons.join(REASON_SEPARATOR))
}
