//! In-memory implementations of the collaborator traits.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult, Rejection};
use crate::models::{
    Actor, Coordinate, Employee, FraudAlert, LocationSample, Shift, ShiftAdjustment,
};

use super::{AlertStore, DeviceDirectory, IdentityProvider, SampleStore, ShiftStore};

#[derive(Debug, Default)]
struct Tables {
    shifts: HashMap<Uuid, Shift>,
    samples: HashMap<Uuid, Vec<LocationSample>>,
    alerts: HashMap<Uuid, FraudAlert>,
    bindings: HashMap<String, String>,
}

/// A thread-safe store keeping every table behind one lock.
///
/// A single lock makes multi-table writes such as the cascade in
/// [`ShiftStore::delete_shift`] atomic.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> EngineResult<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| EngineError::Storage {
            message: "store lock poisoned".to_string(),
        })
    }

    fn write(&self) -> EngineResult<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|_| EngineError::Storage {
            message: "store lock poisoned".to_string(),
        })
    }
}

impl ShiftStore for InMemoryStore {
    fn insert_shift(&self, shift: &Shift) -> EngineResult<()> {
        let mut tables = self.write()?;
        let duplicate = tables
            .shifts
            .values()
            .any(|s| s.employee_id == shift.employee_id && s.is_open());
        if shift.is_open() && duplicate {
            return Err(Rejection::AlreadyOpen.into());
        }
        tables.shifts.insert(shift.id, shift.clone());
        Ok(())
    }

    fn close_shift(
        &self,
        shift_id: Uuid,
        end_time: DateTime<Utc>,
        end: Coordinate,
    ) -> EngineResult<Shift> {
        let mut tables = self.write()?;
        let shift = tables
            .shifts
            .get_mut(&shift_id)
            .ok_or(Rejection::ShiftNotFound)?;
        if !shift.is_open() {
            return Err(Rejection::NoOpenShift.into());
        }
        shift.end_time = Some(end_time);
        shift.end = Some(end);
        Ok(shift.clone())
    }

    fn record_adjustment(
        &self,
        shift_id: Uuid,
        adjustment: &ShiftAdjustment,
    ) -> EngineResult<Shift> {
        let mut tables = self.write()?;
        let shift = tables
            .shifts
            .get_mut(&shift_id)
            .ok_or(Rejection::ShiftNotFound)?;
        shift.adjustment = Some(adjustment.clone());
        Ok(shift.clone())
    }

    fn shift(&self, shift_id: Uuid) -> EngineResult<Option<Shift>> {
        Ok(self.read()?.shifts.get(&shift_id).cloned())
    }

    fn open_shift(&self, employee_id: &str) -> EngineResult<Option<Shift>> {
        Ok(self
            .read()?
            .shifts
            .values()
            .find(|s| s.employee_id == employee_id && s.is_open())
            .cloned())
    }

    fn last_closed_shift(&self, employee_id: &str) -> EngineResult<Option<Shift>> {
        Ok(self
            .read()?
            .shifts
            .values()
            .filter(|s| s.employee_id == employee_id && s.end_time.is_some())
            .max_by_key(|s| s.end_time)
            .cloned())
    }

    fn shifts(&self, employee_id: Option<&str>) -> EngineResult<Vec<Shift>> {
        Ok(self
            .read()?
            .shifts
            .values()
            .filter(|s| employee_id.is_none_or(|id| s.employee_id == id))
            .cloned()
            .collect())
    }

    fn delete_shift(&self, shift_id: Uuid) -> EngineResult<bool> {
        let mut tables = self.write()?;
        if tables.shifts.remove(&shift_id).is_none() {
            return Ok(false);
        }
        tables.samples.remove(&shift_id);
        for alert in tables.alerts.values_mut() {
            if alert.shift_id == Some(shift_id) {
                alert.shift_id = None;
            }
        }
        Ok(true)
    }
}

impl SampleStore for InMemoryStore {
    fn append_sample(&self, sample: &LocationSample) -> EngineResult<()> {
        let mut tables = self.write()?;
        if !tables.shifts.contains_key(&sample.shift_id) {
            return Err(Rejection::ShiftNotFound.into());
        }
        let samples = tables.samples.entry(sample.shift_id).or_default();
        // Keep capture order even if a sample arrives late.
        let index = samples.partition_point(|s| s.captured_at <= sample.captured_at);
        samples.insert(index, sample.clone());
        Ok(())
    }

    fn last_sample(&self, shift_id: Uuid) -> EngineResult<Option<LocationSample>> {
        Ok(self
            .read()?
            .samples
            .get(&shift_id)
            .and_then(|samples| samples.last())
            .cloned())
    }

    fn samples(&self, shift_id: Uuid) -> EngineResult<Vec<LocationSample>> {
        Ok(self
            .read()?
            .samples
            .get(&shift_id)
            .cloned()
            .unwrap_or_default())
    }
}

impl AlertStore for InMemoryStore {
    fn insert_alert(&self, alert: &FraudAlert) -> EngineResult<()> {
        self.write()?.alerts.insert(alert.id, alert.clone());
        Ok(())
    }

    fn alert(&self, alert_id: Uuid) -> EngineResult<Option<FraudAlert>> {
        Ok(self.read()?.alerts.get(&alert_id).cloned())
    }

    fn mark_resolved(
        &self,
        alert_id: Uuid,
        resolved_by: &str,
        resolved_at: DateTime<Utc>,
    ) -> EngineResult<FraudAlert> {
        let mut tables = self.write()?;
        let alert = tables
            .alerts
            .get_mut(&alert_id)
            .ok_or(Rejection::AlertNotFound)?;
        // Checked under the write lock so two admins cannot both succeed.
        if alert.resolved {
            return Err(Rejection::AlreadyResolved.into());
        }
        alert.resolved = true;
        alert.resolved_by = Some(resolved_by.to_string());
        alert.resolved_at = Some(resolved_at);
        Ok(alert.clone())
    }

    fn alerts(&self) -> EngineResult<Vec<FraudAlert>> {
        Ok(self.read()?.alerts.values().cloned().collect())
    }
}

impl DeviceDirectory for InMemoryStore {
    fn binding(&self, employee_id: &str) -> EngineResult<Option<String>> {
        Ok(self.read()?.bindings.get(employee_id).cloned())
    }

    fn bind(&self, employee_id: &str, device_id: &str) -> EngineResult<()> {
        self.write()?
            .bindings
            .entry(employee_id.to_string())
            .or_insert_with(|| device_id.to_string());
        Ok(())
    }

    fn clear(&self, employee_id: &str) -> EngineResult<bool> {
        Ok(self.write()?.bindings.remove(employee_id).is_some())
    }
}

/// A fixed directory of employees and administrative callers.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    employees: RwLock<HashMap<String, Employee>>,
    actors: RwLock<HashMap<String, Actor>>,
}

impl InMemoryDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an employee.
    pub fn add_employee(&self, employee: Employee) -> EngineResult<()> {
        let mut employees = self.employees.write().map_err(|_| EngineError::Storage {
            message: "directory lock poisoned".to_string(),
        })?;
        employees.insert(employee.id.clone(), employee);
        Ok(())
    }

    /// Adds or replaces a caller.
    pub fn add_actor(&self, actor: Actor) -> EngineResult<()> {
        let mut actors = self.actors.write().map_err(|_| EngineError::Storage {
            message: "directory lock poisoned".to_string(),
        })?;
        actors.insert(actor.id.clone(), actor);
        Ok(())
    }
}

impl IdentityProvider for InMemoryDirectory {
    fn employee(&self, employee_id: &str) -> EngineResult<Option<Employee>> {
        let employees = self.employees.read().map_err(|_| EngineError::Storage {
            message: "directory lock poisoned".to_string(),
        })?;
        Ok(employees.get(employee_id).cloned())
    }

    fn actor(&self, actor_id: &str) -> EngineResult<Option<Actor>> {
        let actors = self.actors.read().map_err(|_| EngineError::Storage {
            message: "directory lock poisoned".to_string(),
        })?;
        Ok(actors.get(actor_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FraudType, Severity};
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap()
    }

    fn here() -> Coordinate {
        Coordinate::from_degrees(10.0, 10.0).unwrap()
    }

    fn make_alert(shift_id: Option<Uuid>) -> FraudAlert {
        FraudAlert {
            id: Uuid::new_v4(),
            employee_id: "emp_001".to_string(),
            shift_id,
            fraud_type: FraudType::Time,
            severity: Severity::Low,
            score: 10,
            description: "test".to_string(),
            created_at: t0(),
            resolved: false,
            resolved_by: None,
            resolved_at: None,
        }
    }

    #[test]
    fn test_second_open_shift_is_refused() {
        let store = InMemoryStore::new();
        store.insert_shift(&Shift::open("emp_001", here(), t0())).unwrap();

        let result = store.insert_shift(&Shift::open("emp_001", here(), t0()));
        assert!(matches!(
            result,
            Err(EngineError::Rejected(Rejection::AlreadyOpen))
        ));

        // Other employees are independent.
        store.insert_shift(&Shift::open("emp_002", here(), t0())).unwrap();
    }

    #[test]
    fn test_close_then_open_again() {
        let store = InMemoryStore::new();
        let shift = Shift::open("emp_001", here(), t0());
        store.insert_shift(&shift).unwrap();

        let closed = store
            .close_shift(shift.id, t0() + Duration::hours(8), here())
            .unwrap();
        assert_eq!(closed.end_time, Some(t0() + Duration::hours(8)));
        assert!(store.open_shift("emp_001").unwrap().is_none());

        store.insert_shift(&Shift::open("emp_001", here(), t0())).unwrap();
    }

    #[test]
    fn test_close_twice_is_refused() {
        let store = InMemoryStore::new();
        let shift = Shift::open("emp_001", here(), t0());
        store.insert_shift(&shift).unwrap();
        store.close_shift(shift.id, t0(), here()).unwrap();

        assert!(store.close_shift(shift.id, t0(), here()).is_err());
    }

    #[test]
    fn test_last_closed_shift_uses_latest_end() {
        let store = InMemoryStore::new();
        let first = Shift::open("emp_001", here(), t0());
        store.insert_shift(&first).unwrap();
        store
            .close_shift(first.id, t0() + Duration::hours(8), here())
            .unwrap();
        let second = Shift::open("emp_001", here(), t0() + Duration::days(1));
        store.insert_shift(&second).unwrap();
        store
            .close_shift(second.id, t0() + Duration::days(1) + Duration::hours(8), here())
            .unwrap();

        let last = store.last_closed_shift("emp_001").unwrap().unwrap();
        assert_eq!(last.id, second.id);
    }

    #[test]
    fn test_samples_stay_ordered() {
        let store = InMemoryStore::new();
        let shift = Shift::open("emp_001", here(), t0());
        store.insert_shift(&shift).unwrap();

        let late = LocationSample::new(shift.id, here(), t0() + Duration::minutes(5));
        let early = LocationSample::new(shift.id, here(), t0() + Duration::minutes(2));
        store.append_sample(&late).unwrap();
        store.append_sample(&early).unwrap();

        let samples = store.samples(shift.id).unwrap();
        assert_eq!(samples[0].id, early.id);
        assert_eq!(store.last_sample(shift.id).unwrap().unwrap().id, late.id);
    }

    #[test]
    fn test_delete_cascades_samples_and_nulls_alerts() {
        let store = InMemoryStore::new();
        let shift = Shift::open("emp_001", here(), t0());
        store.insert_shift(&shift).unwrap();
        store
            .append_sample(&LocationSample::new(shift.id, here(), t0()))
            .unwrap();
        let alert = make_alert(Some(shift.id));
        store.insert_alert(&alert).unwrap();

        assert!(store.delete_shift(shift.id).unwrap());
        assert!(store.samples(shift.id).unwrap().is_empty());
        assert_eq!(store.alert(alert.id).unwrap().unwrap().shift_id, None);
        assert!(!store.delete_shift(shift.id).unwrap());
    }

    #[test]
    fn test_resolve_once() {
        let store = InMemoryStore::new();
        let alert = make_alert(None);
        store.insert_alert(&alert).unwrap();

        let resolved = store.mark_resolved(alert.id, "admin_001", t0()).unwrap();
        assert!(resolved.resolved);
        assert_eq!(resolved.resolved_by.as_deref(), Some("admin_001"));

        assert!(matches!(
            store.mark_resolved(alert.id, "admin_001", t0()),
            Err(EngineError::Rejected(Rejection::AlreadyResolved))
        ));
    }

    #[test]
    fn test_binding_is_first_use_only() {
        let store = InMemoryStore::new();
        store.bind("emp_001", "DEVICE_A").unwrap();
        store.bind("emp_001", "DEVICE_B").unwrap();
        assert_eq!(
            store.binding("emp_001").unwrap().as_deref(),
            Some("DEVICE_A")
        );

        assert!(store.clear("emp_001").unwrap());
        assert_eq!(store.binding("emp_001").unwrap(), None);
    }

    #[test]
    fn test_directory_lookup() {
        let directory = InMemoryDirectory::new();
        directory.add_employee(Employee::new("emp_001")).unwrap();
        directory.add_actor(Actor::admin("admin_001")).unwrap();

        assert!(directory.employee("emp_001").unwrap().is_some());
        assert!(directory.employee("emp_999").unwrap().is_none());
        assert!(directory.actor("admin_001").unwrap().unwrap().is_admin);
    }
}
