use serde::Serialize;

use crate::model::{MedicationList, MedicationToken, ParsedCommand, RATING_COUNT};

pub const REASON_RATING_COUNT: &str = "Invalid number of ratings (there should be five)";
pub const REASON_DUPLICATE_ADDITION: &str =
    "Med to be added already listed, see your meds by replying 'see-meds'";

/// Separator between reasons in the single reply
pub const REASON_SEPARATOR: &str = ", ";

fn missing_removal_reason(token: &MedicationToken) -> String {
    format!(
        "Med to remove \"{}\" not found; see your meds by replying \"see-meds\"",
        token
    )
}

/// Result of checking a command against the current medications
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ValidationOutcome {
    Valid,
    /// Never empty; in rating, removal, addition order
    Invalid(Vec<String>),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }

    pub fn reasons(&self) -> &[String] {
        match self {
            ValidationOutcome::Valid => &[],
            ValidationOutcome::Invalid(reasons) => reasons,
        }
    }
}

/// Check a command before it may be recorded
///
/// Rules, in reporting order:
///
/// 1. exactly five ratings;
/// 2. every removed medication must be current (one reason per distinct
///    missing token, first appearance first);
/// 3. no added medication may already be current (one aggregate reason,
///    however many collide).
///
/// Duplicates within the additions themselves are not checked.
pub fn validate(cmd: &ParsedCommand, current: &MedicationList) -> ValidationOutcome {
    let mut reasons = Vec::new();

    if cmd.ratings.len() != RATING_COUNT {
        reasons.push(REASON_RATING_COUNT.to_string());
    }

    let mut reported: Vec<&MedicationToken> = Vec::new();
    for token in &cmd.remove_meds {
        if !current.contains(token) && !reported.contains(&token) {
            reasons.push(missing_removal_reason(token));
            reported.push(token);
        }
    }

    if cmd.add_meds.iter().any(|token| current.contains(token)) {
        reasons.push(REASON_DUPLICATE_ADDITION.to_string());
    }

    if reasons.is_empty() {
        ValidationOutcome::Valid
    } else {
        ValidationOutcome::Invalid(reasons)
    }
}
