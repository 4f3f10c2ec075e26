//! Fraud alert scoring, persistence and resolution.
//!
//! Scores come from the injected [`ScoreTable`]; severity is derived from the
//! score. An alert is written before the triggering rejection is returned to
//! the caller, so the audit trail never misses a refused action.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::ScoreTable;
use crate::error::{EngineResult, Rejection};
use crate::models::{Actor, AlertFilter, FraudAlert, FraudType, ScoreKey, Severity};
use crate::store::GuardStore;

/// An anomaly detected by one of the guard's checks.
///
/// # Example
///
/// ```
/// use shift_guard::guard::FraudSignal;
/// use shift_guard::models::{FraudType, ScoreKey};
///
/// let signal = FraudSignal::new(FraudType::Tracking, "Unrealistic speed detected: 300 km/h")
///     .scored_as(ScoreKey::SpeedImpossible);
/// assert_eq!(signal.score_key, Some(ScoreKey::SpeedImpossible));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FraudSignal {
    /// What kind of anomaly this is.
    pub fraud_type: FraudType,
    /// The score table row to use; `None` takes the default score.
    pub score_key: Option<ScoreKey>,
    /// Human-readable detail.
    pub description: String,
}

impl FraudSignal {
    /// Creates a signal scored with the default score.
    pub fn new(fraud_type: FraudType, description: impl Into<String>) -> Self {
        Self {
            fraud_type,
            score_key: None,
            description: description.into(),
        }
    }

    /// Selects a score table row.
    pub fn scored_as(mut self, key: ScoreKey) -> Self {
        self.score_key = Some(key);
        self
    }
}

/// Turns signals into persisted, scored alerts.
pub struct FraudScoringEngine {
    scores: ScoreTable,
    store: Arc<dyn GuardStore>,
    clock: Arc<dyn Clock>,
}

impl FraudScoringEngine {
    /// Creates an engine over an immutable score table.
    pub fn new(scores: ScoreTable, store: Arc<dyn GuardStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            scores,
            store,
            clock,
        }
    }

    /// Returns the score and severity a signal would receive.
    pub fn assess(&self, signal: &FraudSignal) -> (u32, Severity) {
        let score = self.scores.score(signal.score_key);
        (score, Severity::from_score(score))
    }

    /// Scores and persists an alert.
    ///
    /// Returns only after the alert is stored.
    pub fn raise(
        &self,
        employee_id: &str,
        signal: FraudSignal,
        shift_id: Option<Uuid>,
    ) -> EngineResult<FraudAlert> {
        let (score, severity) = self.assess(&signal);
        let alert = FraudAlert {
            id: Uuid::new_v4(),
            employee_id: employee_id.to_string(),
            shift_id,
            fraud_type: signal.fraud_type,
            severity,
            score,
            description: signal.description,
            created_at: self.clock.now(),
            resolved: false,
            resolved_by: None,
            resolved_at: None,
        };
        self.store.insert_alert(&alert)?;

        warn!(
            alert_id = %alert.id,
            employee_id = %alert.employee_id,
            fraud_type = alert.fraud_type.as_str(),
            score = alert.score,
            severity = ?alert.severity,
            description = %alert.description,
            "Fraud alert raised"
        );
        Ok(alert)
    }

    /// Marks an alert resolved. A second call is rejected, not ignored.
    pub fn resolve(&self, alert_id: Uuid, actor: &Actor) -> EngineResult<FraudAlert> {
        if !actor.is_admin {
            return Err(Rejection::NotAuthorized.into());
        }
        let alert = self.store.mark_resolved(alert_id, &actor.id, self.clock.now())?;
        info!(alert_id = %alert_id, admin = %actor.id, "Fraud alert resolved");
        Ok(alert)
    }

    /// Lists alerts matching `filter`, newest first.
    pub fn alerts(&self, filter: &AlertFilter) -> EngineResult<Vec<FraudAlert>> {
        let mut alerts: Vec<FraudAlert> = self
            .store
            .alerts()?
            .into_iter()
            .filter(|a| filter.matches(a))
            .collect();
        alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(alerts)
    }

    /// Lists one employee's alerts, newest first.
    pub fn alerts_for(&self, employee_id: &str) -> EngineResult<Vec<FraudAlert>> {
        let mut alerts: Vec<FraudAlert> = self
            .store
            .alerts()?
            .into_iter()
            .filter(|a| a.employee_id == employee_id)
            .collect();
        alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(alerts)
    }

    /// Sum of all alert scores for an employee.
    pub fn risk_score(&self, employee_id: &str) -> EngineResult<u32> {
        Ok(self
            .store
            .alerts()?
            .iter()
            .filter(|a| a.employee_id == employee_id)
            .map(|a| a.score)
            .sum())
    }
}
