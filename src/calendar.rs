//! Calendar snapshot taken once per discovery session.

use std::fmt;

use chrono::{Datelike, Local};

use crate::types::{Month, Year};

/// Month from which next year's listings start to appear.
pub const DEFAULT_CUTOVER_MONTH: Month = 9;

/// Rejected calendar input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    /// Month outside `1..=12`.
    InvalidMonth(Month),
}

impl fmt::Display for CalendarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMonth(m) => write!(f, "invalid month {m}, expected 1..=12"),
        }
    }
}

impl std::error::Error for CalendarError {}

/// Year/month snapshot driving key generation.
///
/// Built once and never mutated; `next_year` is always `current_year + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CalendarState {
    current_year: Year,
    current_month: Month,
    cutover_month: Month,
}

impl CalendarState {
    /// Builds a calendar for an explicit year and month.
    pub fn new(current_year: Year, current_month: Month) -> Result<Self, CalendarError> {
        Self::with_cutover(current_year, current_month, DEFAULT_CUTOVER_MONTH)
    }

    /// Builds a calendar with a custom cutover month.
    pub fn with_cutover(
        current_year: Year,
        current_month: Month,
        cutover_month: Month,
    ) -> Result<Self, CalendarError> {
        validate_month(current_month)?;
        validate_month(cutover_month)?;
        Ok(Self {
            current_year,
            current_month,
            cutover_month,
        })
    }

    /// Reads the local wall clock.
    pub fn now(cutover_month: Month) -> Result<Self, CalendarError> {
        let today = Local::now().date_naive();
        Self::with_cutover(today.year(), today.month(), cutover_month)
    }

    /// Year of the snapshot.
    pub fn current_year(&self) -> Year {
        self.current_year
    }

    /// Always `current_year + 1`.
    pub fn next_year(&self) -> Year {
        self.current_year + 1
    }

    /// Month of the snapshot.
    pub fn current_month(&self) -> Month {
        self.current_month
    }

    /// Configured cutover month.
    pub fn cutover_month(&self) -> Month {
        self.cutover_month
    }

    /// Latest year for which listings are expected to exist.
    ///
    /// This is next year once the cutover month has been reached.
    pub fn last_listed_year(&self) -> Year {
        if self.current_month >= self.cutover_month {
            self.next_year()
        } else {
            self.current_year
        }
    }
}

fn validate_month(month: Month) -> Result<(), CalendarError> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(CalendarError::InvalidMonth(month))
    }
}
