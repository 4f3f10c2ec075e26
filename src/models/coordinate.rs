//! Coordinate input parsing and the stored coordinate type.
//!
//! Devices send latitude and longitude either as JSON numbers or as decimal
//! strings. A missing or unparseable value is distinct from a valid `0`.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};

use crate::error::Rejection;

/// Number of decimal places kept for stored coordinates.
pub const COORDINATE_SCALE: u32 = 6;

/// A raw latitude or longitude as received from a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoordinateInput {
    /// A JSON number, e.g. `-23.5505`.
    Number(f64),
    /// A decimal string, e.g. `"-23.5505"`.
    Text(String),
}

impl CoordinateInput {
    fn to_decimal(&self) -> Option<Decimal> {
        match self {
            CoordinateInput::Number(value) => Decimal::from_f64(*value),
            CoordinateInput::Text(text) => Decimal::from_str(text.trim()).ok(),
        }
    }
}

impl From<f64> for CoordinateInput {
    fn from(value: f64) -> Self {
        CoordinateInput::Number(value)
    }
}

impl From<&str> for CoordinateInput {
    fn from(value: &str) -> Self {
        CoordinateInput::Text(value.to_string())
    }
}

/// A validated position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in [-90, 90].
    pub latitude: Decimal,
    /// Longitude in [-180, 180].
    pub longitude: Decimal,
}

impl Coordinate {
    /// Parses a pair of raw inputs into a coordinate.
    ///
    /// Returns [`Rejection::InvalidCoordinate`] when either value is
    /// missing, not a decimal number, or out of range. `(0, 0)` parses
    /// successfully; whether it is acceptable is a caller decision.
    ///
    /// # Examples
    ///
    /// ```
    /// use shift_guard::models::{Coordinate, CoordinateInput};
    ///
    /// let lat = CoordinateInput::from("-23.5505");
    /// let lon = CoordinateInput::from(-46.6333);
    /// let coordinate = Coordinate::parse(Some(&lat), Some(&lon)).unwrap();
    /// assert_eq!(coordinate.latitude.to_string(), "-23.5505");
    ///
    /// assert!(Coordinate::parse(Some(&lat), None).is_err());
    /// ```
    pub fn parse(
        latitude: Option<&CoordinateInput>,
        longitude: Option<&CoordinateInput>,
    ) -> Result<Self, Rejection> {
        let latitude = latitude
            .and_then(CoordinateInput::to_decimal)
            .ok_or(Rejection::InvalidCoordinate)?;
        let longitude = longitude
            .and_then(CoordinateInput::to_decimal)
            .ok_or(Rejection::InvalidCoordinate)?;

        if latitude.abs() > Decimal::from(90) || longitude.abs() > Decimal::from(180) {
            return Err(Rejection::InvalidCoordinate);
        }

        Ok(Self {
            latitude: latitude.round_dp(COORDINATE_SCALE),
            longitude: longitude.round_dp(COORDINATE_SCALE),
        })
    }

    /// Builds a coordinate from degrees without range checks.
    pub fn from_degrees(latitude: f64, longitude: f64) -> Option<Self> {
        Some(Self {
            latitude: Decimal::from_f64(latitude)?.round_dp(COORDINATE_SCALE),
            longitude: Decimal::from_f64(longitude)?.round_dp(COORDINATE_SCALE),
        })
    }

    /// Returns true for the `(0, 0)` position that broken GPS receivers report.
    pub fn is_null_island(&self) -> bool {
        self.latitude.is_zero() && self.longitude.is_zero()
    }

    /// Latitude as `f64` for distance math.
    pub fn lat(&self) -> f64 {
        self.latitude.to_f64().unwrap_or_default()
    }

    /// Longitude as `f64` for distance math.
    pub fn lon(&self) -> f64 {
        self.longitude.to_f64().unwrap_or_default()
    }

    /// Great-circle distance to another coordinate, in kilometres.
    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        crate::geo::distance_km(self.lat(), self.lon(), other.lat(), other.lon())
    }
}

/// A position report sent by a device for start, end and tracking actions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PositionReport {
    /// The identifier of the sending device.
    #[serde(default)]
    pub device_id: String,
    /// Raw latitude, if sent.
    #[serde(default)]
    pub latitude: Option<CoordinateInput>,
    /// Raw longitude, if sent.
    #[serde(default)]
    pub longitude: Option<CoordinateInput>,
}

impl PositionReport {
    /// Creates a report with numeric coordinates.
    pub fn new(device_id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            device_id: device_id.into(),
            latitude: Some(latitude.into()),
            longitude: Some(longitude.into()),
        }
    }

    /// Parses the reported coordinates.
    pub fn coordinate(&self) -> Result<Coordinate, Rejection> {
        Coordinate::parse(self.latitude.as_ref(), self.longitude.as_ref())
    }
}
