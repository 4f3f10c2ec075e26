//! Employee and caller identity models.
//!
//! Both are owned by the directory collaborator; the guard only reads them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Coordinate;

/// A field employee who clocks shifts from a mobile device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// Whether the employee may clock shifts.
    #[serde(default = "default_active")]
    pub active: bool,
    /// Latitude of the employee's home geofence origin.
    #[serde(default)]
    pub base_latitude: Option<Decimal>,
    /// Longitude of the employee's home geofence origin.
    #[serde(default)]
    pub base_longitude: Option<Decimal>,
}

fn default_active() -> bool {
    true
}

impl Employee {
    /// Creates an active employee with no base coordinate.
    ///
    /// # Examples
    ///
    /// ```
    /// use shift_guard::models::Employee;
    ///
    /// let employee = Employee::new("emp_001");
    /// assert!(employee.active);
    /// assert!(employee.base().is_none());
    /// ```
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            active: true,
            base_latitude: None,
            base_longitude: None,
        }
    }

    /// Returns the base coordinate when both halves are set.
    pub fn base(&self) -> Option<Coordinate> {
        match (self.base_latitude, self.base_longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinate {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }
}

/// The authenticated caller of an administrative operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Identifier of the user.
    pub id: String,
    /// Whether the user holds the administrator role.
    #[serde(default)]
    pub is_admin: bool,
}

impl Actor {
    /// Creates an administrator.
    pub fn admin(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_admin: true,
        }
    }

    /// Creates a caller without administrative privileges.
    pub fn staff(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_admin: false,
        }
    }
}
