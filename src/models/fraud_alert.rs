//! Fraud alert model and its vocabularies.
//!
//! Two overlapping vocabularies exist: [`FraudType`] classifies what kind of
//! anomaly happened, [`ScoreKey`] selects a row in the score table. Callers
//! pick the score key explicitly; an alert without one gets the default score.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of anomaly an alert records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FraudType {
    /// Unauthorized device or inactive account.
    Device,
    /// Suspicious position.
    Location,
    /// Invalid shift timing.
    Time,
    /// Inconsistent tracking stream.
    Tracking,
    /// Duplicate open shift.
    MultiShift,
}

impl FraudType {
    /// Returns the wire name, e.g. `"MULTI_SHIFT"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            FraudType::Device => "DEVICE",
            FraudType::Location => "LOCATION",
            FraudType::Time => "TIME",
            FraudType::Tracking => "TRACKING",
            FraudType::MultiShift => "MULTI_SHIFT",
        }
    }
}

/// A row of the score table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoreKey {
    /// A second shift opened while one is open.
    MultiShift,
    /// Clock-out outside the allowed radius.
    OutOfRadius,
    /// Shift closed too early.
    ShortShift,
    /// Implausible travel speed between pings.
    SpeedImpossible,
    /// The (0, 0) GPS sentinel.
    GpsInvalid,
}

/// Alert severity, derived from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Score up to 15.
    Low,
    /// Score from 16 to 30.
    Medium,
    /// Score above 30.
    High,
}

impl Severity {
    /// Derives the severity for a score.
    ///
    /// # Examples
    ///
    /// ```
    /// use shift_guard::models::Severity;
    ///
    /// assert_eq!(Severity::from_score(15), Severity::Low);
    /// assert_eq!(Severity::from_score(30), Severity::Medium);
    /// assert_eq!(Severity::from_score(40), Severity::High);
    /// ```
    pub fn from_score(score: u32) -> Self {
        if score <= 15 {
            Severity::Low
        } else if score <= 30 {
            Severity::Medium
        } else {
            Severity::High
        }
    }
}

/// A recorded anomaly awaiting administrator review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FraudAlert {
    /// Unique identifier for the alert.
    pub id: Uuid,
    /// The employee whose action raised the alert.
    pub employee_id: String,
    /// The shift involved; `None` when the anomaly preceded shift creation
    /// or the shift was deleted later.
    pub shift_id: Option<Uuid>,
    /// What kind of anomaly this is.
    pub fraud_type: FraudType,
    /// Severity derived from `score`.
    pub severity: Severity,
    /// Points from the score table.
    pub score: u32,
    /// Human-readable detail.
    pub description: String,
    /// When the alert was raised.
    pub created_at: DateTime<Utc>,
    /// Set once by an administrator.
    pub resolved: bool,
    /// Who resolved the alert.
    #[serde(default)]
    pub resolved_by: Option<String>,
    /// When the alert was resolved.
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Filters for listing alerts. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertFilter {
    /// Only alerts with this severity.
    #[serde(default)]
    pub severity: Option<Severity>,
    /// Only resolved (or only unresolved) alerts.
    #[serde(default)]
    pub resolved: Option<bool>,
    /// Only alerts for employees whose id contains this text, ignoring case.
    #[serde(default)]
    pub employee: Option<String>,
}

impl AlertFilter {
    /// Returns true if the alert passes every set filter.
    pub fn matches(&self, alert: &FraudAlert) -> bool {
        if self.severity.is_some_and(|s| s != alert.severity) {
            return false;
        }
        if self.resolved.is_some_and(|r| r != alert.resolved) {
            return false;
        }
        if let Some(needle) = &self.employee {
            let needle = needle.to_lowercase();
            if !alert.employee_id.to_lowercase().contains(&needle) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_alert(employee_id: &str, score: u32, resolved: bool) -> FraudAlert {
        FraudAlert {
            id: Uuid::new_v4(),
            employee_id: employee_id.to_string(),
            shift_id: None,
            fraud_type: FraudType::Tracking,
            severity: Severity::from_score(score),
            score,
            description: "test".to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap(),
            resolved,
            resolved_by: None,
            resolved_at: None,
        }
    }

    #[test]
    fn test_severity_boundaries() {
        assert_eq!(Severity::from_score(0), Severity::Low);
        assert_eq!(Severity::from_score(16), Severity::Medium);
        assert_eq!(Severity::from_score(31), Severity::High);
    }

    #[test]
    fn test_fraud_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&FraudType::MultiShift).unwrap(),
            "\"MULTI_SHIFT\""
        );
        assert_eq!(FraudType::Tracking.as_str(), "TRACKING");
    }

    #[test]
    fn test_score_key_wire_names() {
        let key: ScoreKey = serde_json::from_str("\"SPEED_IMPOSSIBLE\"").unwrap();
        assert_eq!(key, ScoreKey::SpeedImpossible);
        assert_eq!(
            serde_json::to_string(&ScoreKey::OutOfRadius).unwrap(),
            "\"OUT_OF_RADIUS\""
        );
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let filter = AlertFilter::default();
        assert!(filter.matches(&make_alert("emp_001", 10, false)));
        assert!(filter.matches(&make_alert("emp_001", 40, true)));
    }

    #[test]
    fn test_filter_by_severity_and_resolved() {
        let filter = AlertFilter {
            severity: Some(Severity::High),
            resolved: Some(false),
            employee: None,
        };
        assert!(filter.matches(&make_alert("emp_001", 40, false)));
        assert!(!filter.matches(&make_alert("emp_001", 40, true)));
        assert!(!filter.matches(&make_alert("emp_001", 25, false)));
    }

    #[test]
    fn test_filter_by_employee_is_case_insensitive() {
        let filter = AlertFilter {
            employee: Some("SOUTH".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&make_alert("team-south-07", 10, false)));
        assert!(!filter.matches(&make_alert("team-north-02", 10, false)));
    }
}
