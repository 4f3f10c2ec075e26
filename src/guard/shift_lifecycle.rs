//! Shift state machine: clock-in, clock-out and administrative adjustment.
//!
//! ```text
//! NoShift --start--> Open --end--> Closed
//!                      \
//!                       +--adjust--> Adjusted
//! ```
//!
//! Start and end hold the employee's lock for their whole sequence, so two
//! concurrent clock-ins for the same employee cannot both succeed.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{EngineResult, Rejection};
use crate::models::{
    Actor, Employee, FraudType, PositionReport, ScoreKey, Shift, ShiftAdjustment, ShiftFilter,
};

use super::device_binding::BindingStatus;
use super::fraud_scoring::FraudSignal;
use super::locks::with_lock;
use super::service::GuardService;

impl GuardService {
    /// Clocks an employee in.
    ///
    /// # Rejections
    ///
    /// - [`Rejection::MissingDeviceId`] / [`Rejection::DeviceMismatch`] from the device check
    /// - [`Rejection::EmployeeInactive`], after a `DEVICE` alert
    /// - [`Rejection::AlreadyOpen`], after a `MULTI_SHIFT` alert
    /// - [`Rejection::InvalidCoordinate`]
    ///
    /// Starting more than the relocation distance away from the previous
    /// clock-out raises a `LOCATION` alert but does not block.
    pub fn start(&self, employee: &Employee, report: &PositionReport) -> EngineResult<Shift> {
        with_lock(&self.locks, &employee.id, || {
            let binding = self.check_device(employee, &report.device_id, false)?;

            if !employee.active {
                return self.flag(
                    &employee.id,
                    None,
                    FraudSignal::new(
                        FraudType::Device,
                        "Inactive employee attempted to start a shift",
                    ),
                    Rejection::EmployeeInactive,
                );
            }

            if let Some(open) = self.store.open_shift(&employee.id)? {
                return self.flag(
                    &employee.id,
                    Some(open.id),
                    FraudSignal::new(
                        FraudType::MultiShift,
                        "Attempt to open two simultaneous shifts",
                    )
                    .scored_as(ScoreKey::MultiShift),
                    Rejection::AlreadyOpen,
                );
            }

            let position = report.coordinate()?;
            let now = self.clock.now();

            if let Some(previous) = self.store.last_closed_shift(&employee.id)? {
                if let Some(previous_end) = previous.end {
                    let gap_km = previous_end.distance_km(&position);
                    if gap_km > self.policy.relocation_alert_km {
                        self.fraud.raise(
                            &employee.id,
                            FraudSignal::new(
                                FraudType::Location,
                                format!("Start {:.2}km from the last clock-out", gap_km),
                            ),
                            None,
                        )?;
                    }
                }
            }

            let shift = Shift::open(employee.id.clone(), position, now);
            self.store.insert_shift(&shift)?;

            if binding == BindingStatus::Unbound {
                self.store.bind(&employee.id, report.device_id.trim())?;
                info!(employee_id = %employee.id, device_id = %report.device_id.trim(), "Device bound");
            }

            info!(
                employee_id = %employee.id,
                shift_id = %shift.id,
                latitude = %position.latitude,
                longitude = %position.longitude,
                "Shift started"
            );
            Ok(shift)
        })
    }

    /// Clocks an employee out of their open shift.
    ///
    /// # Rejections
    ///
    /// - [`Rejection::DeviceNotBound`] / [`Rejection::DeviceMismatch`] from the device check
    /// - [`Rejection::NoOpenShift`]
    /// - [`Rejection::InvalidCoordinate`]
    /// - [`Rejection::MinimumDurationNotMet`], after a `TIME` alert
    /// - [`Rejection::OutOfGeofence`], after a `LOCATION` alert
    pub fn end(&self, employee: &Employee, report: &PositionReport) -> EngineResult<Shift> {
        with_lock(&self.locks, &employee.id, || {
            self.check_device(employee, &report.device_id, true)?;

            let shift = self
                .store
                .open_shift(&employee.id)?
                .ok_or(Rejection::NoOpenShift)?;

            let position = report.coordinate()?;
            let now = self.clock.now();

            let minimum = Duration::minutes(self.policy.min_shift_minutes);
            if now - shift.start_time < minimum {
                // TIME has no row in the score table, so this scores the default.
                return self.flag(
                    &employee.id,
                    Some(shift.id),
                    FraudSignal::new(
                        FraudType::Time,
                        "Attempt to end a shift before the minimum duration",
                    ),
                    Rejection::MinimumDurationNotMet {
                        minimum_minutes: self.policy.min_shift_minutes,
                    },
                );
            }

            let distance_m = shift.start.distance_km(&position) * 1000.0;
            if distance_m > self.policy.end_geofence_meters {
                return self.flag(
                    &employee.id,
                    Some(shift.id),
                    FraudSignal::new(
                        FraudType::Location,
                        format!("Outside the allowed radius ({}m)", distance_m as i64),
                    )
                    .scored_as(ScoreKey::OutOfRadius),
                    Rejection::OutOfGeofence {
                        distance_m: distance_m as i64,
                    },
                );
            }

            let closed = self.store.close_shift(shift.id, now, position)?;
            info!(
                employee_id = %employee.id,
                shift_id = %closed.id,
                duration_minutes = closed.duration_minutes().unwrap_or_default(),
                "Shift ended"
            );
            Ok(closed)
        })
    }

    /// Records an administrative end for a shift the employee failed to close.
    ///
    /// Only the adjustment fields are written; a normal `end_time` is never
    /// touched. A shift that already carries an adjustment may be corrected
    /// again.
    ///
    /// # Rejections
    ///
    /// - [`Rejection::NotAuthorized`]
    /// - [`Rejection::ShiftNotFound`]
    /// - [`Rejection::AlreadyProperlyClosed`]
    /// - [`Rejection::InvalidTimeRange`]
    /// - [`Rejection::DurationExceedsLimit`]
    /// - [`Rejection::MissingReason`]
    pub fn adjust(
        &self,
        shift_id: Uuid,
        adjusted_end_time: DateTime<Utc>,
        reason: &str,
        actor: &Actor,
    ) -> EngineResult<Shift> {
        if !actor.is_admin {
            return Err(Rejection::NotAuthorized.into());
        }

        let employee_id = self
            .store
            .shift(shift_id)?
            .ok_or(Rejection::ShiftNotFound)?
            .employee_id;

        with_lock(&self.locks, &employee_id, || {
            // Re-read under the lock; an end may have landed in between.
            let shift = self.store.shift(shift_id)?.ok_or(Rejection::ShiftNotFound)?;

            if shift.end_time.is_some() && !shift.was_adjusted() {
                return Err(Rejection::AlreadyProperlyClosed.into());
            }
            if adjusted_end_time <= shift.start_time {
                return Err(Rejection::InvalidTimeRange.into());
            }
            let max = Duration::hours(self.policy.max_adjustment_hours);
            if adjusted_end_time - shift.start_time > max {
                return Err(Rejection::DurationExceedsLimit {
                    max_hours: self.policy.max_adjustment_hours,
                }
                .into());
            }
            let reason = reason.trim();
            if reason.is_empty() {
                return Err(Rejection::MissingReason.into());
            }

            let adjustment = ShiftAdjustment {
                adjusted_end_time,
                reason: reason.to_string(),
                adjusted_by: actor.id.clone(),
                adjusted_at: self.clock.now(),
            };
            let adjusted = self.store.record_adjustment(shift_id, &adjustment)?;

            info!(
                shift_id = %shift_id,
                employee_id = %adjusted.employee_id,
                admin = %actor.id,
                adjusted_end_time = %adjusted_end_time,
                "Shift adjusted"
            );
            Ok(adjusted)
        })
    }

    /// An employee's shifts matching `filter`, newest first.
    pub fn shifts_for(&self, employee_id: &str, filter: &ShiftFilter) -> EngineResult<Vec<Shift>> {
        let mut shifts: Vec<Shift> = self
            .store
            .shifts(Some(employee_id))?
            .into_iter()
            .filter(|s| filter.matches(s))
            .collect();
        shifts.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        debug!(employee_id = %employee_id, count = shifts.len(), "Listed shifts");
        Ok(shifts)
    }

    /// Every employee's shifts matching `filter`, newest first. Admin only.
    pub fn all_shifts(&self, actor: &Actor, filter: &ShiftFilter) -> EngineResult<Vec<Shift>> {
        if !actor.is_admin {
            return Err(Rejection::NotAuthorized.into());
        }
        let mut shifts: Vec<Shift> = self
            .store
            .shifts(None)?
            .into_iter()
            .filter(|s| filter.matches(s))
            .collect();
        shifts.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(shifts)
    }

    /// Deletes a shift and its samples. Alerts that referenced it survive
    /// with the reference cleared. Admin only.
    pub fn delete_shift(&self, actor: &Actor, shift_id: Uuid) -> EngineResult<()> {
        if !actor.is_admin {
            return Err(Rejection::NotAuthorized.into());
        }
        if !self.store.delete_shift(shift_id)? {
            return Err(Rejection::ShiftNotFound.into());
        }
        info!(shift_id = %shift_id, admin = %actor.id, "Shift deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;

    use super::*;
    use crate::clock::ManualClock;
    use crate::config::GuardConfig;
    use crate::error::EngineError;
    use crate::models::{FraudAlert, ShiftStatus, Severity};
    use crate::store::{AlertStore, DeviceDirectory, InMemoryStore, ShiftStore};

    const DEVICE: &str = "PHONE-1";

    struct Fixture {
        service: GuardService,
        store: Arc<InMemoryStore>,
        clock: Arc<ManualClock>,
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap()
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(ManualClock::new(t0()));
        let service = GuardService::new(GuardConfig::default(), store.clone(), clock.clone());
        Fixture {
            service,
            store,
            clock,
        }
    }

    fn at(lat: f64, lon: f64) -> PositionReport {
        PositionReport::new(DEVICE, lat, lon)
    }

    fn alerts(store: &InMemoryStore) -> Vec<FraudAlert> {
        store.alerts().unwrap()
    }

    fn rejection(result: EngineResult<Shift>) -> Rejection {
        match result {
            Err(EngineError::Rejected(r)) => r,
            other => panic!("expected a rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_start_opens_shift_and_binds_device() {
        let f = fixture();
        let employee = Employee::new("emp_001");

        let shift = f.service.start(&employee, &at(10.0, 10.0)).unwrap();

        assert_eq!(shift.status(), ShiftStatus::Open);
        assert_eq!(shift.start_time, t0());
        assert_eq!(f.store.binding("emp_001").unwrap().as_deref(), Some(DEVICE));
        assert!(alerts(&f.store).is_empty());
    }

    #[test]
    fn test_start_from_other_device_is_flagged() {
        let f = fixture();
        let employee = Employee::new("emp_001");
        f.store.bind("emp_001", "PHONE-OTHER").unwrap();

        let result = f.service.start(&employee, &at(10.0, 10.0));

        assert_eq!(rejection(result), Rejection::DeviceMismatch);
        let alerts = alerts(&f.store);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].fraud_type, FraudType::Device);
        assert_eq!(alerts[0].shift_id, None);
    }

    #[test]
    fn test_start_without_device_id() {
        let f = fixture();
        let report = PositionReport::new("", 10.0, 10.0);
        let result = f.service.start(&Employee::new("emp_001"), &report);
        assert_eq!(rejection(result), Rejection::MissingDeviceId);
        assert!(alerts(&f.store).is_empty());
    }

    #[test]
    fn test_inactive_employee_is_flagged() {
        let f = fixture();
        let mut employee = Employee::new("emp_001");
        employee.active = false;

        let result = f.service.start(&employee, &at(10.0, 10.0));

        assert_eq!(rejection(result), Rejection::EmployeeInactive);
        let alerts = alerts(&f.store);
        assert_eq!(alerts[0].fraud_type, FraudType::Device);
        assert_eq!(alerts[0].shift_id, None);
        assert_eq!(f.store.binding("emp_001").unwrap(), None);
    }

    #[test]
    fn test_second_start_is_multi_shift() {
        let f = fixture();
        let employee = Employee::new("emp_001");
        let first = f.service.start(&employee, &at(10.0, 10.0)).unwrap();

        let result = f.service.start(&employee, &at(10.0, 10.0));

        assert_eq!(rejection(result), Rejection::AlreadyOpen);
        let alerts = alerts(&f.store);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].fraud_type, FraudType::MultiShift);
        assert_eq!(alerts[0].score, 30);
        assert_eq!(alerts[0].severity, Severity::Medium);
        assert_eq!(alerts[0].shift_id, Some(first.id));
    }

    #[test]
    fn test_start_with_bad_coordinates() {
        let f = fixture();
        let report = PositionReport {
            device_id: DEVICE.to_string(),
            latitude: Some("abc".into()),
            longitude: Some(10.0.into()),
        };
        let result = f.service.start(&Employee::new("emp_001"), &report);
        assert_eq!(rejection(result), Rejection::InvalidCoordinate);
        assert!(alerts(&f.store).is_empty());
    }

    #[test]
    fn test_start_far_from_last_end_is_informational() {
        let f = fixture();
        let employee = Employee::new("emp_001");
        f.service.start(&employee, &at(10.0, 10.0)).unwrap();
        f.clock.advance(Duration::hours(8));
        f.service.end(&employee, &at(10.0, 10.0)).unwrap();
        f.clock.advance(Duration::hours(16));

        let shift = f.service.start(&employee, &at(10.05, 10.0)).unwrap();

        assert!(shift.is_open());
        let alerts = alerts(&f.store);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].fraud_type, FraudType::Location);
        assert_eq!(alerts[0].shift_id, None);
        assert!(alerts[0].description.contains("5.56km"), "{}", alerts[0].description);
    }

    #[test]
    fn test_end_after_minimum_closes_shift() {
        let f = fixture();
        let employee = Employee::new("emp_001");
        f.service.start(&employee, &at(10.0, 10.0)).unwrap();
        f.clock.advance(Duration::minutes(5));

        let closed = f.service.end(&employee, &at(10.0005, 10.0)).unwrap();

        assert_eq!(closed.status(), ShiftStatus::Closed);
        assert_eq!(closed.end_time, Some(t0() + Duration::minutes(5)));
        assert!(closed.end.is_some());
    }

    #[test]
    fn test_end_before_minimum_is_time_alert() {
        let f = fixture();
        let employee = Employee::new("emp_001");
        let shift = f.service.start(&employee, &at(10.0, 10.0)).unwrap();
        f.clock.advance(Duration::seconds(4 * 60 + 59));

        let result = f.service.end(&employee, &at(10.0, 10.0));

        assert_eq!(
            rejection(result),
            Rejection::MinimumDurationNotMet { minimum_minutes: 5 }
        );
        let alerts = alerts(&f.store);
        assert_eq!(alerts[0].fraud_type, FraudType::Time);
        assert_eq!(alerts[0].score, 10);
        assert_eq!(alerts[0].shift_id, Some(shift.id));
        assert!(f.store.open_shift("emp_001").unwrap().is_some());
    }

    #[test]
    fn test_end_outside_geofence() {
        let f = fixture();
        let employee = Employee::new("emp_001");
        f.service.start(&employee, &at(10.0, 10.0)).unwrap();
        f.clock.advance(Duration::hours(1));

        let result = f.service.end(&employee, &at(10.01, 10.01));

        match rejection(result) {
            Rejection::OutOfGeofence { distance_m } => assert!(distance_m > 1500),
            other => panic!("unexpected {other:?}"),
        }
        let alerts = alerts(&f.store);
        assert_eq!(alerts[0].fraud_type, FraudType::Location);
        assert_eq!(alerts[0].score, 25);
        assert!(f.store.open_shift("emp_001").unwrap().is_some());
    }

    #[test]
    fn test_end_without_open_shift() {
        let f = fixture();
        f.store.bind("emp_001", DEVICE).unwrap();
        let result = f.service.end(&Employee::new("emp_001"), &at(10.0, 10.0));
        assert_eq!(rejection(result), Rejection::NoOpenShift);
    }

    #[test]
    fn test_end_without_binding() {
        let f = fixture();
        let result = f.service.end(&Employee::new("emp_001"), &at(10.0, 10.0));
        assert_eq!(rejection(result), Rejection::DeviceNotBound);
    }

    #[test]
    fn test_adjust_forgotten_shift() {
        let f = fixture();
        let employee = Employee::new("emp_001");
        let shift = f.service.start(&employee, &at(10.0, 10.0)).unwrap();
        f.clock.advance(Duration::days(1));

        let adjusted = f
            .service
            .adjust(
                shift.id,
                t0() + Duration::hours(8),
                "forgot to clock out",
                &Actor::admin("admin_001"),
            )
            .unwrap();

        assert_eq!(adjusted.status(), ShiftStatus::Adjusted);
        assert_eq!(adjusted.end_time, None);
        let adjustment = adjusted.adjustment.unwrap();
        assert_eq!(adjustment.adjusted_by, "admin_001");
        assert_eq!(adjustment.adjusted_at, t0() + Duration::days(1));

        // The adjusted shift no longer blocks a new clock-in.
        f.service.start(&employee, &at(10.0, 10.0)).unwrap();
    }

    #[test]
    fn test_adjust_rules() {
        let f = fixture();
        let employee = Employee::new("emp_001");
        let admin = Actor::admin("admin_001");
        let shift = f.service.start(&employee, &at(10.0, 10.0)).unwrap();

        assert_eq!(
            rejection(f.service.adjust(shift.id, t0() + Duration::hours(8), "r", &Actor::staff("x"))),
            Rejection::NotAuthorized
        );
        assert_eq!(
            rejection(f.service.adjust(Uuid::new_v4(), t0(), "r", &admin)),
            Rejection::ShiftNotFound
        );
        assert_eq!(
            rejection(f.service.adjust(shift.id, t0(), "r", &admin)),
            Rejection::InvalidTimeRange
        );
        assert_eq!(
            rejection(f.service.adjust(shift.id, t0() + Duration::minutes(16 * 60 + 1), "r", &admin)),
            Rejection::DurationExceedsLimit { max_hours: 16 }
        );
        assert_eq!(
            rejection(f.service.adjust(shift.id, t0() + Duration::hours(8), "  ", &admin)),
            Rejection::MissingReason
        );

        // Exactly 16 hours is allowed.
        f.service
            .adjust(shift.id, t0() + Duration::hours(16), "r", &admin)
            .unwrap();
    }

    #[test]
    fn test_adjust_properly_closed_shift_is_refused() {
        let f = fixture();
        let employee = Employee::new("emp_001");
        let shift = f.service.start(&employee, &at(10.0, 10.0)).unwrap();
        f.clock.advance(Duration::hours(8));
        f.service.end(&employee, &at(10.0, 10.0)).unwrap();

        let result = f.service.adjust(
            shift.id,
            t0() + Duration::hours(9),
            "late",
            &Actor::admin("admin_001"),
        );

        assert_eq!(rejection(result), Rejection::AlreadyProperlyClosed);
        let stored = f.store.shift(shift.id).unwrap().unwrap();
        assert_eq!(stored.end_time, Some(t0() + Duration::hours(8)));
        assert!(stored.adjustment.is_none());
    }

    #[test]
    fn test_adjusted_shift_cannot_be_ended() {
        let f = fixture();
        let employee = Employee::new("emp_001");
        let shift = f.service.start(&employee, &at(10.0, 10.0)).unwrap();
        f.service
            .adjust(shift.id, t0() + Duration::hours(8), "forgot", &Actor::admin("a"))
            .unwrap();
        f.clock.advance(Duration::hours(9));

        assert_eq!(
            rejection(f.service.end(&employee, &at(10.0, 10.0))),
            Rejection::NoOpenShift
        );

        let next = f.service.start(&employee, &at(10.0, 10.0)).unwrap();
        assert_eq!(f.store.open_shift("emp_001").unwrap().map(|s| s.id), Some(next.id));
    }

    #[test]
    fn test_shift_listing_newest_first() {
        let f = fixture();
        let employee = Employee::new("emp_001");
        let first = f.service.start(&employee, &at(10.0, 10.0)).unwrap();
        f.clock.advance(Duration::hours(8));
        f.service.end(&employee, &at(10.0, 10.0)).unwrap();
        f.clock.advance(Duration::hours(16));
        let second = f.service.start(&employee, &at(10.0, 10.0)).unwrap();

        let all = f
            .service
            .shifts_for("emp_001", &ShiftFilter::default())
            .unwrap();
        assert_eq!(all.iter().map(|s| s.id).collect::<Vec<_>>(), vec![second.id, first.id]);

        let open = f
            .service
            .shifts_for(
                "emp_001",
                &ShiftFilter {
                    status: Some(ShiftStatus::Open),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(open.len(), 1);

        assert!(f.service.all_shifts(&Actor::staff("x"), &ShiftFilter::default()).is_err());
        assert_eq!(
            f.service
                .all_shifts(&Actor::admin("a"), &ShiftFilter::default())
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn test_delete_shift_keeps_alerts() {
        let f = fixture();
        let employee = Employee::new("emp_001");
        let shift = f.service.start(&employee, &at(10.0, 10.0)).unwrap();
        let _ = f.service.end(&employee, &at(10.0, 10.0));

        f.service.delete_shift(&Actor::admin("a"), shift.id).unwrap();

        let alerts = alerts(&f.store);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].shift_id, None);
        assert!(matches!(
            f.service.delete_shift(&Actor::admin("a"), shift.id),
            Err(EngineError::Rejected(Rejection::ShiftNotFound))
        ));
    }
}
