//! Live location samples recorded while a shift is open.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Coordinate;

/// One tracking ping, owned by exactly one shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSample {
    /// Unique identifier for the sample.
    pub id: Uuid,
    /// The shift the sample belongs to.
    pub shift_id: Uuid,
    /// The reported position.
    pub position: Coordinate,
    /// When the sample was captured.
    pub captured_at: DateTime<Utc>,
}

impl LocationSample {
    /// Creates a sample for a shift.
    pub fn new(shift_id: Uuid, position: Coordinate, captured_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            shift_id,
            position,
            captured_at,
        }
    }
}

/// The most recent position of an employee on an open shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivePosition {
    /// The employee on shift.
    pub employee_id: String,
    /// The open shift.
    pub shift_id: Uuid,
    /// Latest reported position.
    pub position: Coordinate,
    /// When that position was captured.
    pub last_update: DateTime<Utc>,
}
