use chrono::{FixedOffset, NaiveDate, NaiveDateTime, Utc};

use crate::errors::{ExError, ExErrorKind, Result};

/// Wall clock in the log's fixed local timezone
pub trait Clock: Send + Sync {
    fn now_local(&self) -> NaiveDateTime;

    /// Calendar day entries are filed under
    fn today(&self) -> NaiveDate {
        self.now_local().date()
    }
}

/// System time shifted by a fixed UTC offset
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// # Errors
    ///
    /// Returns `Config` if the offset is a day or more.
    #[allow(clippy::result_large_err)]
    pub fn from_offset_minutes(minutes: i32) -> Result<Self> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(Self::new)
            .ok_or_else(|| {
                ExError::new(ExErrorKind::Config)
                    .with_op("clock")
                    .with_message(format!("UTC offset out of range: {} minutes", minutes))
            })
    }
}

impl Clock for SystemClock {
    fn now_local(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.offset).naive_local()
    }
}

/// Clock stuck at one instant, for tests and dry runs
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now_local(&self) -> NaiveDateTime {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_bounds() {
        assert!(SystemClock::from_offset_minutes(-360).is_ok());
        assert!(SystemClock::from_offset_minutes(0).is_ok());
        let err = SystemClock::from_offset_minutes(24 * 60).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Config);
    }

    #[test]
    fn test_fixed_clock_today() {
        let now = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(23, 59, 0)
            .unwrap();
        assert_eq!(FixedClock(now).today(), now.date());
    }
}
