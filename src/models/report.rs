//! Shift report models.
//!
//! These carry the per-shift metrics and window totals produced by the
//! metrics calculator, both as raw minutes and as display strings.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Duration, delay and overtime for one shift.
///
/// All three are `None` for a shift without an effective end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShiftMetrics {
    /// Worked minutes, rounded down.
    pub duration_minutes: Option<i64>,
    /// Minutes short of the standard shift.
    pub delay_minutes: Option<i64>,
    /// Minutes beyond the standard shift.
    pub extra_minutes: Option<i64>,
}

/// One line of a shift report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    /// The shift this row describes.
    pub shift_id: Uuid,
    /// The employee who worked the shift.
    pub employee_id: String,
    /// Start date (UTC).
    pub date: NaiveDate,
    /// Start time of day (UTC).
    pub start_time: NaiveTime,
    /// Effective end time of day (UTC), if the shift has one.
    pub end_time: Option<NaiveTime>,
    /// Raw metrics.
    #[serde(flatten)]
    pub metrics: ShiftMetrics,
    /// Duration as `HH:MM`.
    pub duration: Option<String>,
    /// Delay as `HH:MM`.
    pub delay: Option<String>,
    /// Overtime as `HH:MM`.
    pub extra: Option<String>,
    /// Whether an administrator set the end.
    pub adjusted: bool,
}

/// Sums over every row of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTotals {
    /// Sum of worked minutes.
    pub total_duration_minutes: i64,
    /// Sum of delay minutes.
    pub total_delay_minutes: i64,
    /// Sum of overtime minutes.
    pub total_extra_minutes: i64,
    /// `total_duration_minutes` as `HH:MM`.
    pub total_duration: String,
    /// `total_delay_minutes` as `HH:MM`.
    pub total_delay: String,
    /// `total_extra_minutes` as `HH:MM`.
    pub total_extra: String,
}

/// A report over a window of shifts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftReport {
    /// Rows ordered by start time.
    pub rows: Vec<ReportRow>,
    /// Window totals.
    pub totals: ReportTotals,
    /// When the report was produced.
    pub generated_at: DateTime<Utc>,
}
