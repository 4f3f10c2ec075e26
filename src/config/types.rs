//! Configuration types for the shift guard.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use std::collections::HashMap;

use serde::Deserialize;

use crate::models::ScoreKey;

/// Thresholds of the fixed fraud checks.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PolicyConfig {
    /// A shift cannot be closed earlier than this, in minutes.
    pub min_shift_minutes: i64,
    /// Maximum distance between clock-in and clock-out, in metres.
    pub end_geofence_meters: f64,
    /// Distance from the previous clock-out that raises a relocation alert, in km.
    pub relocation_alert_km: f64,
    /// Minimum interval between tracking pings, in seconds.
    pub tracking_interval_seconds: i64,
    /// Highest plausible travel speed between pings, in km/h.
    pub max_speed_kmh: f64,
    /// Longest shift an administrator may record, in hours.
    pub max_adjustment_hours: i64,
    /// Length of a standard shift, in minutes.
    pub standard_shift_minutes: i64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            min_shift_minutes: 5,
            end_geofence_meters: 200.0,
            relocation_alert_km: 1.0,
            tracking_interval_seconds: 60,
            max_speed_kmh: 150.0,
            max_adjustment_hours: 16,
            standard_shift_minutes: 480,
        }
    }
}

/// Points awarded per score key.
///
/// The table is immutable once built and is handed to the scoring engine at
/// construction.
///
/// # Example
///
/// ```
/// use shift_guard::config::ScoreTable;
/// use shift_guard::models::ScoreKey;
///
/// let table = ScoreTable::default();
/// assert_eq!(table.score(Some(ScoreKey::SpeedImpossible)), 40);
/// assert_eq!(table.score(None), 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScoreTable {
    /// Points for each listed key.
    scores: HashMap<ScoreKey, u32>,
    /// Points for alerts without a listed key.
    default_score: u32,
}

impl ScoreTable {
    /// Creates a table from its parts.
    pub fn new(scores: HashMap<ScoreKey, u32>, default_score: u32) -> Self {
        Self {
            scores,
            default_score,
        }
    }

    /// Looks up the score for a key, falling back to the default.
    pub fn score(&self, key: Option<ScoreKey>) -> u32 {
        key.and_then(|k| self.scores.get(&k).copied())
            .unwrap_or(self.default_score)
    }

    /// Returns the fallback score.
    pub fn default_score(&self) -> u32 {
        self.default_score
    }
}

impl Default for ScoreTable {
    fn default() -> Self {
        let scores = HashMap::from([
            (ScoreKey::MultiShift, 30),
            (ScoreKey::OutOfRadius, 25),
            (ScoreKey::ShortShift, 20),
            (ScoreKey::SpeedImpossible, 40),
            (ScoreKey::GpsInvalid, 15),
        ]);
        Self::new(scores, 10)
    }
}

/// The complete guard configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GuardConfig {
    /// Fraud check thresholds.
    policy: PolicyConfig,
    /// Score table.
    scores: ScoreTable,
}

impl GuardConfig {
    /// Creates a new GuardConfig from its component parts.
    pub fn new(policy: PolicyConfig, scores: ScoreTable) -> Self {
        Self { policy, scores }
    }

    /// Returns the fraud check thresholds.
    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    /// Returns the score table.
    pub fn scores(&self) -> &ScoreTable {
        &self.scores
    }
}
