//! Response types for the shift guard API.
//!
//! This module defines the error response structures and error handling
//! for the HTTP API.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Rejection, RejectionClass};
use crate::models::FraudAlert;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
    /// Seconds to send in a `Retry-After` header.
    pub retry_after_secs: Option<i64>,
}

impl ApiErrorResponse {
    /// A response with the given status and body.
    pub fn new(status: StatusCode, error: ApiError) -> Self {
        Self {
            status,
            error,
            retry_after_secs: None,
        }
    }

    /// 400 for a request body that could not be read.
    pub fn bad_request(error: ApiError) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    /// 401 for a missing or unknown `x-employee-id`.
    pub fn unauthenticated() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            ApiError::new("UNAUTHENTICATED", "A known x-employee-id header is required"),
        )
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.error)).into_response();
        if let Some(secs) = self.retry_after_secs {
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

fn status_for(class: RejectionClass) -> StatusCode {
    match class {
        RejectionClass::Validation => StatusCode::BAD_REQUEST,
        RejectionClass::Policy | RejectionClass::Authorization => StatusCode::FORBIDDEN,
        RejectionClass::RateLimit => StatusCode::TOO_MANY_REQUESTS,
        RejectionClass::NotFound => StatusCode::NOT_FOUND,
    }
}

impl From<Rejection> for ApiErrorResponse {
    fn from(rejection: Rejection) -> Self {
        let retry_after_secs = match rejection {
            Rejection::TooFrequent { retry_after_secs } => Some(retry_after_secs),
            _ => None,
        };
        ApiErrorResponse {
            status: status_for(rejection.class()),
            error: ApiError::new(rejection.code(), rejection.to_string()),
            retry_after_secs,
        }
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::Rejected(rejection) => rejection.into(),
            EngineError::ConfigNotFound { path } => ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration error",
                    format!("Configuration file not found: {}", path),
                ),
            ),
            EngineError::ConfigParseError { path, message } => ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    format!("Failed to parse {}: {}", path, message),
                ),
            ),
            EngineError::InvalidConfig { field, message } => ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details(
                    "CONFIG_ERROR",
                    "Invalid configuration",
                    format!("{}: {}", field, message),
                ),
            ),
            EngineError::Storage { message } => ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("STORAGE_ERROR", "Storage failure", message),
            ),
        }
    }
}

/// Response body for `GET /fraud-alerts/score/{employee_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskScoreResponse {
    /// The employee scored.
    pub employee_id: String,
    /// Sum of every alert score for the employee.
    pub risk_score: u32,
    /// The employee's alerts, newest first.
    pub alerts: Vec<FraudAlert>,
}

/// Response body for `DELETE /devices/{employee_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindingClearedResponse {
    /// The employee whose binding was targeted.
    pub employee_id: String,
    /// Whether a binding existed and was removed.
    pub cleared: bool,
}
