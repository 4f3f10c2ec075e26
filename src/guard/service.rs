//! The guard service: shared state and the checks every action runs first.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::{GuardConfig, PolicyConfig};
use crate::error::{EngineError, EngineResult, Rejection};
use crate::models::{Actor, Employee, FraudType};
use crate::store::GuardStore;

use super::device_binding::{BindingStatus, DeviceBindingValidator};
use super::fraud_scoring::{FraudScoringEngine, FraudSignal};
use super::locks::KeyedLocks;

/// Entry point for clock-in, clock-out, tracking and administration.
///
/// The service is `Send + Sync`; share it behind an `Arc` across request
/// handlers.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use shift_guard::clock::SystemClock;
/// use shift_guard::config::GuardConfig;
/// use shift_guard::guard::GuardService;
/// use shift_guard::models::{Employee, PositionReport, ShiftStatus};
/// use shift_guard::store::InMemoryStore;
///
/// let service = GuardService::new(
///     GuardConfig::default(),
///     Arc::new(InMemoryStore::new()),
///     Arc::new(SystemClock),
/// );
/// let employee = Employee::new("emp_001");
/// let shift = service
///     .start(&employee, &PositionReport::new("PHONE-1", -23.5505, -46.6333))
///     .unwrap();
/// assert_eq!(shift.status(), ShiftStatus::Open);
/// ```
pub struct GuardService {
    pub(super) policy: PolicyConfig,
    pub(super) store: Arc<dyn GuardStore>,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) devices: DeviceBindingValidator,
    pub(super) fraud: FraudScoringEngine,
    pub(super) locks: KeyedLocks,
}

impl GuardService {
    /// Creates a service over the given collaborators.
    pub fn new(config: GuardConfig, store: Arc<dyn GuardStore>, clock: Arc<dyn Clock>) -> Self {
        let fraud = FraudScoringEngine::new(config.scores().clone(), store.clone(), clock.clone());
        Self {
            policy: config.policy().clone(),
            store,
            clock,
            devices: DeviceBindingValidator,
            fraud,
            locks: KeyedLocks::default(),
        }
    }

    /// The fraud scoring engine, for alert administration.
    pub fn fraud(&self) -> &FraudScoringEngine {
        &self.fraud
    }

    /// The active thresholds.
    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    /// Persists an alert for `signal`, then returns `rejection` as an error.
    ///
    /// If the alert cannot be written the storage error is returned instead,
    /// so a rejection is never reported without its alert.
    pub(super) fn flag<T>(
        &self,
        employee_id: &str,
        shift_id: Option<Uuid>,
        signal: FraudSignal,
        rejection: Rejection,
    ) -> EngineResult<T> {
        self.fraud.raise(employee_id, signal, shift_id)?;
        Err(EngineError::Rejected(rejection))
    }

    /// Runs the device check. A mismatch raises a `DEVICE` alert.
    ///
    /// With `require_bound` the action targets an existing shift, so the
    /// alert references the employee's open shift. A clock-in precedes any
    /// shift and its alert carries none.
    pub(super) fn check_device(
        &self,
        employee: &Employee,
        device_id: &str,
        require_bound: bool,
    ) -> EngineResult<BindingStatus> {
        let binding = self.store.binding(&employee.id)?;
        let outcome = if require_bound {
            self.devices
                .require_bound(binding.as_deref(), device_id)
                .map(|_| BindingStatus::Bound)
        } else {
            self.devices.validate(binding.as_deref(), device_id)
        };

        match outcome {
            Ok(status) => Ok(status),
            Err(Rejection::DeviceMismatch) => {
                let shift_id = if require_bound {
                    self.store.open_shift(&employee.id)?.map(|shift| shift.id)
                } else {
                    None
                };
                self.flag(
                    &employee.id,
                    shift_id,
                    FraudSignal::new(
                        FraudType::Device,
                        format!("Unauthorized device '{}'", device_id.trim()),
                    ),
                    Rejection::DeviceMismatch,
                )
            }
            Err(rejection) => Err(rejection.into()),
        }
    }

    /// Removes an employee's device binding so a new phone can register.
    pub fn clear_device_binding(&self, actor: &Actor, employee_id: &str) -> EngineResult<bool> {
        if !actor.is_admin {
            return Err(Rejection::NotAuthorized.into());
        }
        let cleared = self.store.clear(employee_id)?;
        info!(employee_id = %employee_id, admin = %actor.id, cleared, "Device binding cleared");
        Ok(cleared)
    }
}
