//! Log entries and the mutation plan used to commit them

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::medication::MedicationList;
use crate::errors::HealthLogError;

/// Number of daily ratings
pub const RATING_COUNT: usize = 5;

/// Rating names, in message order
pub const RATING_NAMES: [&str; RATING_COUNT] = ["sleep", "stress", "joints", "energy", "mood"];

/// The five daily self-report values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ratings {
    pub sleep: u32,
    pub stress: u32,
    pub joints: u32,
    pub energy: u32,
    pub mood: u32,
}

impl Ratings {
    pub fn as_array(&self) -> [u32; RATING_COUNT] {
        [self.sleep, self.stress, self.joints, self.energy, self.mood]
    }
}

impl From<[u32; RATING_COUNT]> for Ratings {
    fn from([sleep, stress, joints, energy, mood]: [u32; RATING_COUNT]) -> Self {
        Self {
            sleep,
            stress,
            joints,
            energy,
            mood,
        }
    }
}

impl TryFrom<&[u32]> for Ratings {
    type Error = HealthLogError;

    fn try_from(values: &[u32]) -> Result<Self, Self::Error> {
        let array: [u32; RATING_COUNT] =
            values
                .try_into()
                .map_err(|_| HealthLogError::WrongRatingCount {
                    found: values.len(),
                })?;
        Ok(array.into())
    }
}

/// One row of the health log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub date: NaiveDate,
    pub ratings: Ratings,
    pub meds: MedicationList,
    /// Empty when the message carried no note
    pub note: String,
}

impl LogEntry {
    /// Date in the stored `YYYY-MM-DD` form
    pub fn date_string(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}

/// Stored date format
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a stored `YYYY-MM-DD` date
///
/// # Errors
///
/// Returns `InvalidEntryDate` for anything else.
pub fn parse_entry_date(raw: &str) -> Result<NaiveDate, HealthLogError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| {
        HealthLogError::InvalidEntryDate {
            raw: raw.to_string(),
        }
    })
}

/// How a composed entry is committed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CommitMode {
    /// Insert as the new most recent entry
    Append,
    /// Replace the current most recent entry
    Amend,
}

impl CommitMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitMode::Append => "append",
            CommitMode::Amend => "amend",
        }
    }
}

/// Entry plus the way it must be committed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPlan {
    pub entry: LogEntry,
    pub mode: CommitMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratings_from_slice_requires_five() {
        let five: [u32; 5] = [8, 3, 2, 9, 5];
        let ok = Ratings::try_from(&five[..]).unwrap();
        assert_eq!(ok.as_array(), five);
        assert_eq!(ok.mood, 5);

        let three: [u32; 3] = [1, 2, 3];
        let err = Ratings::try_from(&three[..]).unwrap_err();
        assert_eq!(err, HealthLogError::WrongRatingCount { found: 3 });
    }

    #[test]
    fn test_entry_date_round_trip() {
        let date = parse_entry_date("2024-03-09").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert!(parse_entry_date("03/09/2024").is_err());
    }
}
