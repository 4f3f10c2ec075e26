//! Collaborator contracts: persistence, device directory and identity.
//!
//! The guard only talks to storage through these traits. Every method
//! returns [`EngineResult`] so an unavailable backend surfaces as
//! [`EngineError::Storage`](crate::error::EngineError::Storage) and is never
//! retried here. [`InMemoryStore`] and [`InMemoryDirectory`] implement them
//! for tests and embedding.

mod memory;

use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::{
    Actor, Coordinate, Employee, FraudAlert, LocationSample, Shift, ShiftAdjustment,
};
use chrono::{DateTime, Utc};

pub use memory::{InMemoryDirectory, InMemoryStore};

/// Durable storage for shifts.
pub trait ShiftStore: Send + Sync {
    /// Persists a new open shift.
    ///
    /// Implementations must refuse a second open shift for the same
    /// employee with [`Rejection::AlreadyOpen`](crate::error::Rejection::AlreadyOpen).
    fn insert_shift(&self, shift: &Shift) -> EngineResult<()>;

    /// Writes the normal end of a shift and returns the updated record.
    fn close_shift(
        &self,
        shift_id: Uuid,
        end_time: DateTime<Utc>,
        end: Coordinate,
    ) -> EngineResult<Shift>;

    /// Writes only the adjustment fields of a shift.
    fn record_adjustment(&self, shift_id: Uuid, adjustment: &ShiftAdjustment)
    -> EngineResult<Shift>;

    /// Fetches a shift by id.
    fn shift(&self, shift_id: Uuid) -> EngineResult<Option<Shift>>;

    /// The employee's open shift, if any.
    fn open_shift(&self, employee_id: &str) -> EngineResult<Option<Shift>>;

    /// The employee's normally closed shift with the latest end time.
    fn last_closed_shift(&self, employee_id: &str) -> EngineResult<Option<Shift>>;

    /// All shifts, or one employee's shifts, in no particular order.
    fn shifts(&self, employee_id: Option<&str>) -> EngineResult<Vec<Shift>>;

    /// Deletes a shift together with its samples. Alerts keep existing with
    /// their shift reference cleared. Returns false if the shift was absent.
    fn delete_shift(&self, shift_id: Uuid) -> EngineResult<bool>;
}

/// Append-only storage for tracking samples.
pub trait SampleStore: Send + Sync {
    /// Appends a sample to its shift.
    fn append_sample(&self, sample: &LocationSample) -> EngineResult<()>;

    /// The latest sample of a shift by capture time.
    fn last_sample(&self, shift_id: Uuid) -> EngineResult<Option<LocationSample>>;

    /// All samples of a shift, oldest first.
    fn samples(&self, shift_id: Uuid) -> EngineResult<Vec<LocationSample>>;
}

/// Storage for fraud alerts.
pub trait AlertStore: Send + Sync {
    /// Persists a new alert. Must be durable when this returns.
    fn insert_alert(&self, alert: &FraudAlert) -> EngineResult<()>;

    /// Fetches an alert by id.
    fn alert(&self, alert_id: Uuid) -> EngineResult<Option<FraudAlert>>;

    /// Writes only the resolution fields of an alert.
    fn mark_resolved(
        &self,
        alert_id: Uuid,
        resolved_by: &str,
        resolved_at: DateTime<Utc>,
    ) -> EngineResult<FraudAlert>;

    /// All alerts in no particular order.
    fn alerts(&self) -> EngineResult<Vec<FraudAlert>>;
}

/// The one-device-per-employee registry.
pub trait DeviceDirectory: Send + Sync {
    /// The device bound to an employee, if any.
    fn binding(&self, employee_id: &str) -> EngineResult<Option<String>>;

    /// Binds a device to an employee that has none.
    fn bind(&self, employee_id: &str, device_id: &str) -> EngineResult<()>;

    /// Removes an employee's binding. Returns false if there was none.
    fn clear(&self, employee_id: &str) -> EngineResult<bool>;
}

/// Everything the guard needs from persistence.
pub trait GuardStore: ShiftStore + SampleStore + AlertStore + DeviceDirectory {}

impl<T: ShiftStore + SampleStore + AlertStore + DeviceDirectory> GuardStore for T {}

/// Resolves authenticated callers.
pub trait IdentityProvider: Send + Sync {
    /// The employee record for an id.
    fn employee(&self, employee_id: &str) -> EngineResult<Option<Employee>>;

    /// The caller record for an id, for administrative actions.
    fn actor(&self, actor_id: &str) -> EngineResult<Option<Actor>>;
}
