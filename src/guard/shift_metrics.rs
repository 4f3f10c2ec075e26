//! Shift duration, delay and overtime, and the reports built from them.
//!
//! A shift is measured against a standard length (480 minutes by default).
//! Worked minutes up to the standard are ordinary; minutes short of it are
//! delay and minutes beyond it are extra. Both are carried as non-negative
//! magnitudes.

use chrono::NaiveDate;
use tracing::info;

use crate::error::EngineResult;
use crate::models::{ReportRow, ReportTotals, Shift, ShiftFilter, ShiftMetrics, ShiftReport};

use super::service::GuardService;

/// Calculates the metrics of one shift.
///
/// A shift without an effective end (still open) has no metrics.
///
/// # Example
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use shift_guard::guard::calculate_shift_metrics;
/// use shift_guard::models::{Coordinate, Shift};
///
/// let start = Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap();
/// let mut shift = Shift::open("emp_001", Coordinate::from_degrees(10.0, 10.0).unwrap(), start);
/// shift.end_time = Some(start + Duration::minutes(500));
///
/// let metrics = calculate_shift_metrics(&shift, 480);
/// assert_eq!(metrics.duration_minutes, Some(500));
/// assert_eq!(metrics.delay_minutes, Some(0));
/// assert_eq!(metrics.extra_minutes, Some(20));
/// ```
pub fn calculate_shift_metrics(shift: &Shift, standard_minutes: i64) -> ShiftMetrics {
    match shift.duration_minutes() {
        Some(duration) => ShiftMetrics {
            duration_minutes: Some(duration),
            delay_minutes: Some((standard_minutes - duration).max(0)),
            extra_minutes: Some((duration - standard_minutes).max(0)),
        },
        None => ShiftMetrics::default(),
    }
}

/// Renders minutes as `HH:MM`, with a leading `-` for negative values.
///
/// Hours are not wrapped at 24.
///
/// ```
/// use shift_guard::guard::format_minutes;
///
/// assert_eq!(format_minutes(20), "00:20");
/// assert_eq!(format_minutes(960), "16:00");
/// assert_eq!(format_minutes(-75), "-01:15");
/// ```
pub fn format_minutes(minutes: i64) -> String {
    let sign = if minutes < 0 { "-" } else { "" };
    let m = minutes.abs();
    format!("{}{:02}:{:02}", sign, m / 60, m % 60)
}

/// Builds the report row of one shift.
pub fn build_report_row(shift: &Shift, standard_minutes: i64) -> ReportRow {
    let metrics = calculate_shift_metrics(shift, standard_minutes);
    ReportRow {
        shift_id: shift.id,
        employee_id: shift.employee_id.clone(),
        date: shift.start_time.date_naive(),
        start_time: shift.start_time.time(),
        end_time: shift.effective_end_time().map(|end| end.time()),
        metrics,
        duration: metrics.duration_minutes.map(format_minutes),
        delay: metrics.delay_minutes.map(format_minutes),
        extra: metrics.extra_minutes.map(format_minutes),
        adjusted: shift.was_adjusted(),
    }
}

/// Sums the metrics of every row that has them.
pub fn totalize_report(rows: &[ReportRow]) -> ReportTotals {
    let duration: i64 = rows.iter().filter_map(|r| r.metrics.duration_minutes).sum();
    let delay: i64 = rows.iter().filter_map(|r| r.metrics.delay_minutes).sum();
    let extra: i64 = rows.iter().filter_map(|r| r.metrics.extra_minutes).sum();

    ReportTotals {
        total_duration_minutes: duration,
        total_delay_minutes: delay,
        total_extra_minutes: extra,
        total_duration: format_minutes(duration),
        total_delay: format_minutes(delay),
        total_extra: format_minutes(extra),
    }
}

impl GuardService {
    /// Builds a report of an employee's shifts starting inside the window,
    /// ordered by start time.
    pub fn report(
        &self,
        employee_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> EngineResult<ShiftReport> {
        let filter = ShiftFilter {
            start_date,
            end_date,
            status: None,
        };
        let mut shifts: Vec<Shift> = self
            .store
            .shifts(Some(employee_id))?
            .into_iter()
            .filter(|s| filter.matches(s))
            .collect();
        shifts.sort_by_key(|s| s.start_time);

        let standard = self.policy.standard_shift_minutes;
        let rows: Vec<ReportRow> = shifts
            .iter()
            .map(|s| build_report_row(s, standard))
            .collect();
        let totals = totalize_report(&rows);

        info!(
            employee_id = %employee_id,
            rows = rows.len(),
            total_duration = %totals.total_duration,
            "Shift report generated"
        );

        Ok(ShiftReport {
            rows,
            totals,
            generated_at: self.clock.now(),
        })
    }
}
