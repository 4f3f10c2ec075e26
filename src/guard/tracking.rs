//! Live location tracking with a minimum reporting interval and a speed cap.

use chrono::Duration;
use tracing::debug;

use crate::error::{EngineResult, Rejection};
use crate::models::{
    Employee, FraudType, LivePosition, LocationSample, PositionReport, ScoreKey,
};

use super::fraud_scoring::FraudSignal;
use super::locks::with_lock;
use super::service::GuardService;

impl GuardService {
    /// Records a location ping for the employee's open shift.
    ///
    /// The first ping of a shift has nothing to compare against and is only
    /// checked for a usable position.
    ///
    /// # Rejections
    ///
    /// - [`Rejection::DeviceNotBound`] / [`Rejection::DeviceMismatch`]
    /// - [`Rejection::NoOpenShift`]
    /// - [`Rejection::InvalidCoordinate`]
    /// - [`Rejection::GpsInvalid`] for a `(0, 0)` fix, after a `TRACKING` alert
    /// - [`Rejection::TooFrequent`] within the reporting interval, after a `TRACKING` alert
    /// - [`Rejection::ImpossibleSpeed`] above the speed cap, after a `TRACKING` alert
    pub fn track(
        &self,
        employee: &Employee,
        report: &PositionReport,
    ) -> EngineResult<LocationSample> {
        with_lock(&self.locks, &employee.id, || {
            self.check_device(employee, &report.device_id, true)?;

            let shift = self
                .store
                .open_shift(&employee.id)?
                .ok_or(Rejection::NoOpenShift)?;

            let position = report.coordinate()?;
            if position.is_null_island() {
                return self.flag(
                    &employee.id,
                    Some(shift.id),
                    FraudSignal::new(FraudType::Tracking, "GPS invalid (0,0)")
                        .scored_as(ScoreKey::GpsInvalid),
                    Rejection::GpsInvalid,
                );
            }

            let now = self.clock.now();

            if let Some(last) = self.store.last_sample(shift.id)? {
                let elapsed = now - last.captured_at;
                let interval = Duration::seconds(self.policy.tracking_interval_seconds);
                if elapsed < interval {
                    let remaining_ms = (interval - elapsed).num_milliseconds();
                    return self.flag(
                        &employee.id,
                        Some(shift.id),
                        FraudSignal::new(FraudType::Tracking, "Excessive location reporting"),
                        Rejection::TooFrequent {
                            retry_after_secs: (remaining_ms + 999) / 1000,
                        },
                    );
                }

                let hours = elapsed.num_milliseconds() as f64 / 3_600_000.0;
                let speed_kmh = last.position.distance_km(&position) / hours;
                if speed_kmh > self.policy.max_speed_kmh {
                    return self.flag(
                        &employee.id,
                        Some(shift.id),
                        FraudSignal::new(
                            FraudType::Tracking,
                            format!("Unrealistic speed detected: {:.0} km/h", speed_kmh),
                        )
                        .scored_as(ScoreKey::SpeedImpossible),
                        Rejection::ImpossibleSpeed {
                            speed_kmh: speed_kmh as i64,
                        },
                    );
                }
            }

            let sample = LocationSample::new(shift.id, position, now);
            self.store.append_sample(&sample)?;
            debug!(
                employee_id = %employee.id,
                shift_id = %shift.id,
                sample_id = %sample.id,
                "Location recorded"
            );
            Ok(sample)
        })
    }

    /// The latest position of every employee on an open shift.
    ///
    /// Open shifts with no samples yet are left out.
    pub fn live_positions(&self) -> EngineResult<Vec<LivePosition>> {
        let mut board = Vec::new();
        for shift in self.store.shifts(None)?.into_iter().filter(|s| s.is_open()) {
            if let Some(sample) = self.store.last_sample(shift.id)? {
                board.push(LivePosition {
                    employee_id: shift.employee_id,
                    shift_id: shift.id,
                    position: sample.position,
                    last_update: sample.captured_at,
                });
            }
        }
        board.sort_by(|a, b| a.employee_id.cmp(&b.employee_id));
        Ok(board)
    }
}
