//! Optional inclusive calendar-day range used by reporting and bulk updates.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::time_utils::start_of_day;
use crate::errors::{Result, ValidationError};

/// Inclusive range of calendar days. A missing bound leaves that side open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self> {
        let range = Self { start, end };
        range.validate()?;
        Ok(range)
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<()> {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(ValidationError::InvalidInput(format!(
                    "start date {} is after end date {}",
                    start, end
                ))
                .into());
            }
        }
        Ok(())
    }

    /// Lower bound, inclusive.
    pub fn lower_bound(&self) -> Option<NaiveDateTime> {
        self.start.map(start_of_day)
    }

    /// Upper bound, exclusive: midnight after the last included day.
    pub fn upper_bound_exclusive(&self) -> Option<NaiveDateTime> {
        self.end.map(|end| start_of_day(end + Duration::days(1)))
    }

    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.lower_bound().map_or(true, |lo| instant >= lo)
            && self.upper_bound_exclusive().map_or(true, |hi| instant < hi)
    }
}
