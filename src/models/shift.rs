//! Shift model and related types.
//!
//! A shift is opened by a clock-in, closed once by a clock-out, or given an
//! administrative end when the employee forgot to clock out.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Coordinate;

/// The lifecycle state of a shift.
///
/// Serialized as `OPEN`, `CLOSED` or `ADJUSTED`; lowercase and capitalized
/// forms are also accepted on input, so query strings like `?status=open` work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftStatus {
    /// Clocked in, not yet clocked out.
    #[serde(alias = "open", alias = "Open")]
    Open,
    /// Clocked out normally.
    #[serde(alias = "closed", alias = "Closed")]
    Closed,
    /// Given an end time by an administrator.
    #[serde(alias = "adjusted", alias = "Adjusted")]
    Adjusted,
}

/// An administrative correction of a shift's end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftAdjustment {
    /// The end time set by the administrator.
    pub adjusted_end_time: DateTime<Utc>,
    /// Why the shift needed adjusting.
    pub reason: String,
    /// Identifier of the adjusting administrator.
    pub adjusted_by: String,
    /// When the adjustment was recorded.
    pub adjusted_at: DateTime<Utc>,
}

/// One continuous work period for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    /// Unique identifier for the shift.
    pub id: Uuid,
    /// The employee who worked the shift.
    pub employee_id: String,
    /// Clock-in time.
    pub start_time: DateTime<Utc>,
    /// Clock-in position.
    pub start: Coordinate,
    /// Clock-out time; `None` until the shift is closed normally.
    pub end_time: Option<DateTime<Utc>>,
    /// Clock-out position, set together with `end_time`.
    pub end: Option<Coordinate>,
    /// Administrative end, if any.
    #[serde(default)]
    pub adjustment: Option<ShiftAdjustment>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl Shift {
    /// Opens a new shift at the given time and position.
    pub fn open(employee_id: impl Into<String>, start: Coordinate, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id: employee_id.into(),
            start_time: now,
            start,
            end_time: None,
            end: None,
            adjustment: None,
            created_at: now,
        }
    }

    /// Returns the lifecycle state.
    ///
    /// An adjustment wins over everything else: a forgotten shift that an
    /// administrator ended is no longer open even though `end_time` is unset.
    pub fn status(&self) -> ShiftStatus {
        if self.adjustment.is_some() {
            ShiftStatus::Adjusted
        } else if self.end_time.is_some() {
            ShiftStatus::Closed
        } else {
            ShiftStatus::Open
        }
    }

    /// Returns true while the shift accepts clock-out and tracking.
    pub fn is_open(&self) -> bool {
        self.status() == ShiftStatus::Open
    }

    /// Returns true if an administrator adjusted the shift.
    pub fn was_adjusted(&self) -> bool {
        self.adjustment.is_some()
    }

    /// The end used for metrics: the adjusted end if present, else the
    /// normal end, else `None` for an open shift.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{Duration, TimeZone, Utc};
    /// use shift_guard::models::{Coordinate, Shift};
    ///
    /// let start = Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap();
    /// let mut shift = Shift::open("emp_001", Coordinate::from_degrees(10.0, 10.0).unwrap(), start);
    /// assert_eq!(shift.effective_end_time(), None);
    ///
    /// shift.end_time = Some(start + Duration::hours(8));
    /// assert_eq!(shift.effective_end_time(), Some(start + Duration::hours(8)));
    /// ```
    pub fn effective_end_time(&self) -> Option<DateTime<Utc>> {
        self.adjustment
            .as_ref()
            .map(|a| a.adjusted_end_time)
            .or(self.end_time)
    }

    /// Whole minutes between start and effective end, rounded down.
    pub fn duration_minutes(&self) -> Option<i64> {
        self.effective_end_time()
            .map(|end| (end - self.start_time).num_minutes())
    }
}

/// Filters for listing shifts. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftFilter {
    /// Only shifts starting on or after this date (UTC).
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Only shifts starting on or before this date (UTC).
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Only shifts in this state.
    #[serde(default)]
    pub status: Option<ShiftStatus>,
}

impl ShiftFilter {
    /// Returns true if the shift passes every set filter.
    pub fn matches(&self, shift: &Shift) -> bool {
        let date = shift.start_time.date_naive();
        if self.start_date.is_some_and(|from| date < from) {
            return false;
        }
        if self.end_date.is_some_and(|to| date > to) {
            return false;
        }
        if self.status.is_some_and(|status| status != shift.status()) {
            return false;
        }
        true
    }
}
