//! HTTP API module for the shift guard.
//!
//! This module provides the REST endpoints for clock-in, clock-out, live
//! tracking, shift reports and fraud alert administration.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::{create_router, EMPLOYEE_HEADER};
pub use request::{AdjustRequest, ReportQuery};
pub use response::{ApiError, ApiErrorResponse, BindingClearedResponse, RiskScoreResponse};
pub use state::AppState;
