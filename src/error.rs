//! Error types for the shift guard.
//!
//! Every refused action is reported as a [`Rejection`] carrying the specific
//! reason, wrapped in [`EngineError::Rejected`]. Configuration and storage
//! problems are separate variants so callers can tell an expected outcome
//! from an infrastructure failure.

use thiserror::Error;

/// The class of a [`Rejection`], used by callers to pick a response.
///
/// Policy and rate-limit rejections are always preceded by a persisted
/// fraud alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionClass {
    /// Bad or missing input. No alert.
    Validation,
    /// A fraud rule was violated. Paired with an alert.
    Policy,
    /// The caller is reporting too often. Paired with an alert.
    RateLimit,
    /// The caller lacks the role or binding for this action. No alert.
    Authorization,
    /// The referenced entity does not exist.
    NotFound,
}

/// A typed reason for refusing a shift, tracking or administrative action.
///
/// # Example
///
/// ```
/// use shift_guard::error::{Rejection, RejectionClass};
///
/// let rejection = Rejection::TooFrequent { retry_after_secs: 42 };
/// assert_eq!(rejection.class(), RejectionClass::RateLimit);
/// assert_eq!(rejection.to_string(), "Location reported too frequently, retry in 42s");
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    /// The request carried no device identifier.
    #[error("A device identifier is required")]
    MissingDeviceId,

    /// The employee has no bound device and the action requires one.
    #[error("No device is registered for this employee")]
    DeviceNotBound,

    /// The request came from a device other than the bound one.
    #[error("Device is not authorized for this employee")]
    DeviceMismatch,

    /// The employee is flagged inactive.
    #[error("Employee is inactive, contact an administrator")]
    EmployeeInactive,

    /// The employee already has an open shift.
    #[error("A shift is already open for this employee")]
    AlreadyOpen,

    /// The employee has no open shift.
    #[error("No open shift found")]
    NoOpenShift,

    /// Latitude or longitude is missing, unparseable or out of range.
    #[error("Valid latitude and longitude are required")]
    InvalidCoordinate,

    /// The device reported the (0, 0) sentinel position.
    #[error("Invalid GPS position (0, 0)")]
    GpsInvalid,

    /// The shift is being closed before the minimum duration elapsed.
    #[error("Minimum shift duration of {minimum_minutes} minutes not reached")]
    MinimumDurationNotMet {
        /// The configured minimum, in minutes.
        minimum_minutes: i64,
    },

    /// The end position is too far from the start position.
    #[error("Outside the allowed radius ({distance_m}m)")]
    OutOfGeofence {
        /// Distance between start and end, in whole metres.
        distance_m: i64,
    },

    /// The ping arrived before the minimum interval elapsed.
    #[error("Location reported too frequently, retry in {retry_after_secs}s")]
    TooFrequent {
        /// Seconds until a new ping would be accepted.
        retry_after_secs: i64,
    },

    /// The implied travel speed since the previous ping is not plausible.
    #[error("Unrealistic movement detected: {speed_kmh} km/h")]
    ImpossibleSpeed {
        /// The implied speed, truncated to whole km/h.
        speed_kmh: i64,
    },

    /// The caller is not an administrator.
    #[error("Only administrators may perform this action")]
    NotAuthorized,

    /// No shift exists with the given id.
    #[error("Shift not found")]
    ShiftNotFound,

    /// The shift was closed normally and cannot be adjusted.
    #[error("This shift was already closed properly")]
    AlreadyProperlyClosed,

    /// An adjustment needs a reason.
    #[error("An adjustment reason is required")]
    MissingReason,

    /// The adjusted end time is not after the start time.
    #[error("End time must be after the start time")]
    InvalidTimeRange,

    /// The adjusted shift would be longer than allowed.
    #[error("Shift duration exceeds the {max_hours}h limit")]
    DurationExceedsLimit {
        /// The configured maximum, in hours.
        max_hours: i64,
    },

    /// No fraud alert exists with the given id.
    #[error("Fraud alert not found")]
    AlertNotFound,

    /// The fraud alert was already resolved.
    #[error("This fraud alert is already resolved")]
    AlreadyResolved,
}

impl Rejection {
    /// Returns the class of this rejection.
    pub fn class(&self) -> RejectionClass {
        match self {
            Rejection::MissingDeviceId
            | Rejection::InvalidCoordinate
            | Rejection::AlreadyProperlyClosed
            | Rejection::MissingReason
            | Rejection::InvalidTimeRange
            | Rejection::DurationExceedsLimit { .. }
            | Rejection::AlreadyResolved => RejectionClass::Validation,
            Rejection::DeviceMismatch
            | Rejection::EmployeeInactive
            | Rejection::AlreadyOpen
            | Rejection::GpsInvalid
            | Rejection::MinimumDurationNotMet { .. }
            | Rejection::OutOfGeofence { .. }
            | Rejection::ImpossibleSpeed { .. } => RejectionClass::Policy,
            Rejection::TooFrequent { .. } => RejectionClass::RateLimit,
            Rejection::DeviceNotBound | Rejection::NotAuthorized => RejectionClass::Authorization,
            Rejection::NoOpenShift | Rejection::ShiftNotFound | Rejection::AlertNotFound => {
                RejectionClass::NotFound
            }
        }
    }

    /// Returns a stable machine-readable code, e.g. `"OUT_OF_GEOFENCE"`.
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::MissingDeviceId => "MISSING_DEVICE_ID",
            Rejection::DeviceNotBound => "DEVICE_NOT_BOUND",
            Rejection::DeviceMismatch => "DEVICE_MISMATCH",
            Rejection::EmployeeInactive => "EMPLOYEE_INACTIVE",
            Rejection::AlreadyOpen => "ALREADY_OPEN",
            Rejection::NoOpenShift => "NO_OPEN_SHIFT",
            Rejection::InvalidCoordinate => "INVALID_COORDINATE",
            Rejection::GpsInvalid => "GPS_INVALID",
            Rejection::MinimumDurationNotMet { .. } => "MINIMUM_DURATION_NOT_MET",
            Rejection::OutOfGeofence { .. } => "OUT_OF_GEOFENCE",
            Rejection::TooFrequent { .. } => "TOO_FREQUENT",
            Rejection::ImpossibleSpeed { .. } => "IMPOSSIBLE_SPEED",
            Rejection::NotAuthorized => "NOT_AUTHORIZED",
            Rejection::ShiftNotFound => "SHIFT_NOT_FOUND",
            Rejection::AlreadyProperlyClosed => "ALREADY_PROPERLY_CLOSED",
            Rejection::MissingReason => "MISSING_REASON",
            Rejection::InvalidTimeRange => "INVALID_TIME_RANGE",
            Rejection::DurationExceedsLimit { .. } => "DURATION_EXCEEDS_LIMIT",
            Rejection::AlertNotFound => "ALERT_NOT_FOUND",
            Rejection::AlreadyResolved => "ALREADY_RESOLVED",
        }
    }
}

/// The main error type for the shift guard.
///
/// # Example
///
/// ```
/// use shift_guard::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/policy.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/policy.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// The action was refused for a known reason.
    #[error(transparent)]
    Rejected(#[from] Rejection),

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration values are inconsistent.
    #[error("Invalid configuration field '{field}': {message}")]
    InvalidConfig {
        /// The offending field.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// The storage collaborator failed.
    #[error("Storage error: {message}")]
    Storage {
        /// A description of the storage failure.
        message: String,
    },
}

impl EngineError {
    /// Returns the rejection if this error is one.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            EngineError::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
