//! Request types for the shift guard API.
//!
//! Start, end and tracking bodies are plain [`PositionReport`]s; the types
//! here cover the remaining endpoints.
//!
//! [`PositionReport`]: crate::models::PositionReport

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Request body for `POST /shifts/{id}/adjust`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustRequest {
    /// The end time to record for the forgotten shift.
    pub adjusted_end_time: DateTime<Utc>,
    /// Why the shift is being adjusted.
    #[serde(default)]
    pub reason: String,
}

/// Query string for `GET /shifts/report`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportQuery {
    /// First start date to include.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Last start date to include.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}
