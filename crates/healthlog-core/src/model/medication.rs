//! Medication tokens and the ordered "current medications" list

use serde::{Deserialize, Serialize};

/// Separator used both when writing and when reading the medication field
pub const MEDICATION_SEPARATOR: &str = ", ";

const TOKEN_BOUNDARY: &str = "), ";

/// One `Name(Dose)` medication entry
///
/// Equality is exact string match: `Aspirin(100mg)` and `aspirin(100mg)`
/// are different medications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MedicationToken(String);

impl MedicationToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MedicationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MedicationToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Ordered medication list as stored on the most recent log entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MedicationList(Vec<MedicationToken>);

impl MedicationList {
    pub fn new(tokens: Vec<MedicationToken>) -> Self {
        Self(tokens)
    }

    /// Parse a stored medication field
    ///
    /// Accepts both the bracket-free form written by this crate
    /// (`A(1), B(2)`) and the bracketed form of older rows (`[A(1), B(2)]`).
    /// An empty field, or `[]`, is the empty list.
    ///
    /// Every token ends at its single `)`, so the field is only split where
    /// a `)` is followed by the separator. A dose may itself contain `", "`
    /// (`Fish oil(1g, , daily)`) and still reads back as one token.
    pub fn parse_field(raw: &str) -> Self {
        let trimmed = raw.trim();
        let inner = trimmed
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .unwrap_or(trimmed);
        if inner.trim().is_empty() {
            return Self::default();
        }

        let mut tokens = Vec::new();
        let mut rest = inner;
        while let Some(at) = rest.find(TOKEN_BOUNDARY) {
            let (token, tail) = rest.split_at(at + 1);
            tokens.push(MedicationToken::new(token));
            rest = &tail[MEDICATION_SEPARATOR.len()..];
        }
        tokens.push(MedicationToken::new(rest));
        Self(tokens)
    }

    /// Format for storage and replies: comma-separated, no quotes or brackets
    pub fn format(&self) -> String {
        self.0
            .iter()
            .map(MedicationToken::as_str)
            .collect::<Vec<_>>()
            .join(MEDICATION_SEPARATOR)
    }

    pub fn contains(&self, token: &MedicationToken) -> bool {
        self.0.contains(token)
    }

    /// Drop every token in `remove` (keeping order), then append `add`
    pub fn revise(&self, remove: &[MedicationToken], add: &[MedicationToken]) -> Self {
        let mut revised: Vec<MedicationToken> = self
            .0
            .iter()
            .filter(|token| !remove.contains(token))
            .cloned()
            .collect();
        revised.extend(add.iter().cloned());
        Self(revised)
    }

    pub fn tokens(&self) -> &[MedicationToken] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<MedicationToken> for MedicationList {
    fn from_iter<I: IntoIterator<Item = MedicationToken>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
