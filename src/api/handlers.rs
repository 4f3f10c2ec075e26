//! HTTP request handlers for the shift guard API.
//!
//! Every request names its caller in the `x-employee-id` header. Employee
//! actions resolve it to an [`Employee`], administrative ones to an
//! [`Actor`]; either way an unknown id is a 401.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{EngineError, Rejection};
use crate::models::{
    Actor, AlertFilter, Employee, FraudAlert, LivePosition, LocationSample, PositionReport, Shift,
    ShiftFilter, ShiftReport,
};

use super::request::{AdjustRequest, ReportQuery};
use super::response::{ApiError, ApiErrorResponse, BindingClearedResponse, RiskScoreResponse};
use super::state::AppState;

/// Header carrying the caller's identifier.
pub const EMPLOYEE_HEADER: &str = "x-employee-id";

type ApiResult<T> = Result<T, ApiErrorResponse>;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/shifts", get(list_shifts_handler))
        .route("/shifts/start", post(start_shift_handler))
        .route("/shifts/end", post(end_shift_handler))
        .route("/shifts/track", post(track_handler))
        .route("/shifts/report", get(report_handler))
        .route("/shifts/:shift_id", delete(delete_shift_handler))
        .route("/shifts/:shift_id/adjust", post(adjust_shift_handler))
        .route("/admin/shifts", get(all_shifts_handler))
        .route("/tracking/live", get(live_tracking_handler))
        .route("/fraud-alerts", get(list_alerts_handler))
        .route("/fraud-alerts/:alert_id/resolve", post(resolve_alert_handler))
        .route("/fraud-alerts/score/:employee_id", get(risk_score_handler))
        .route("/devices/:employee_id", delete(clear_device_handler))
        .with_state(state)
}

fn caller_id(headers: &HeaderMap) -> ApiResult<String> {
    headers
        .get(EMPLOYEE_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(ApiErrorResponse::unauthenticated)
}

fn resolve_employee(state: &AppState, headers: &HeaderMap) -> ApiResult<Employee> {
    let id = caller_id(headers)?;
    state
        .identity()
        .employee(&id)?
        .ok_or_else(ApiErrorResponse::unauthenticated)
}

fn resolve_actor(state: &AppState, headers: &HeaderMap) -> ApiResult<Actor> {
    let id = caller_id(headers)?;
    state
        .identity()
        .actor(&id)?
        .ok_or_else(ApiErrorResponse::unauthenticated)
}

fn require_admin(actor: &Actor) -> ApiResult<()> {
    if actor.is_admin {
        Ok(())
    } else {
        Err(Rejection::NotAuthorized.into())
    }
}

/// Unwraps a JSON body, turning extractor failures into API errors.
fn read_json<T>(payload: Result<Json<T>, JsonRejection>, correlation_id: Uuid) -> ApiResult<T> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            let error = match rejection {
                JsonRejection::JsonDataError(err) => {
                    let body_text = err.body_text();
                    warn!(correlation_id = %correlation_id, error = %body_text, "JSON data error");
                    if body_text.contains("missing field") {
                        ApiError::new("VALIDATION_ERROR", body_text)
                    } else {
                        ApiError::malformed_json(body_text)
                    }
                }
                JsonRejection::JsonSyntaxError(err) => {
                    warn!(correlation_id = %correlation_id, error = %err, "JSON syntax error");
                    ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
                }
                JsonRejection::MissingJsonContentType(_) => {
                    ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
                }
                _ => ApiError::malformed_json("Failed to parse request body"),
            };
            Err(ApiErrorResponse::bad_request(error))
        }
    }
}

fn read_query<T>(query: Result<Query<T>, QueryRejection>) -> ApiResult<T> {
    query
        .map(|Query(q)| q)
        .map_err(|err| ApiErrorResponse::bad_request(ApiError::new("INVALID_QUERY", err.body_text())))
}

/// Logs a failed action and converts the error.
fn failed(correlation_id: Uuid, action: &'static str, error: EngineError) -> ApiErrorResponse {
    match &error {
        EngineError::Rejected(rejection) => {
            info!(
                correlation_id = %correlation_id,
                action,
                code = rejection.code(),
                "Action rejected"
            );
        }
        other => {
            warn!(correlation_id = %correlation_id, action, error = %other, "Action failed");
        }
    }
    error.into()
}

/// Handler for POST /shifts/start.
async fn start_shift_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<PositionReport>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Shift>)> {
    let correlation_id = Uuid::new_v4();
    let employee = resolve_employee(&state, &headers)?;
    let report = read_json(payload, correlation_id)?;
    info!(correlation_id = %correlation_id, employee_id = %employee.id, "Processing clock-in");

    let shift = state
        .guard()
        .start(&employee, &report)
        .map_err(|e| failed(correlation_id, "start", e))?;
    Ok((StatusCode::CREATED, Json(shift)))
}

/// Handler for POST /shifts/end.
async fn end_shift_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<PositionReport>, JsonRejection>,
) -> ApiResult<Json<Shift>> {
    let correlation_id = Uuid::new_v4();
    let employee = resolve_employee(&state, &headers)?;
    let report = read_json(payload, correlation_id)?;
    info!(correlation_id = %correlation_id, employee_id = %employee.id, "Processing clock-out");

    let shift = state
        .guard()
        .end(&employee, &report)
        .map_err(|e| failed(correlation_id, "end", e))?;
    Ok(Json(shift))
}

/// Handler for POST /shifts/track.
async fn track_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<PositionReport>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<LocationSample>)> {
    let correlation_id = Uuid::new_v4();
    let employee = resolve_employee(&state, &headers)?;
    let report = read_json(payload, correlation_id)?;

    let sample = state
        .guard()
        .track(&employee, &report)
        .map_err(|e| failed(correlation_id, "track", e))?;
    Ok((StatusCode::CREATED, Json(sample)))
}

/// Handler for GET /shifts.
async fn list_shifts_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<ShiftFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<Shift>>> {
    let correlation_id = Uuid::new_v4();
    let employee = resolve_employee(&state, &headers)?;
    let filter = read_query(query)?;

    let shifts = state
        .guard()
        .shifts_for(&employee.id, &filter)
        .map_err(|e| failed(correlation_id, "list_shifts", e))?;
    Ok(Json(shifts))
}

/// Handler for GET /shifts/report.
async fn report_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> ApiResult<Json<ShiftReport>> {
    let correlation_id = Uuid::new_v4();
    let employee = resolve_employee(&state, &headers)?;
    let window = read_query(query)?;

    let report = state
        .guard()
        .report(&employee.id, window.start_date, window.end_date)
        .map_err(|e| failed(correlation_id, "report", e))?;
    Ok(Json(report))
}

/// Handler for POST /shifts/{shift_id}/adjust.
async fn adjust_shift_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(shift_id): Path<Uuid>,
    payload: Result<Json<AdjustRequest>, JsonRejection>,
) -> ApiResult<Json<Shift>> {
    let correlation_id = Uuid::new_v4();
    let actor = resolve_actor(&state, &headers)?;
    let request = read_json(payload, correlation_id)?;
    info!(
        correlation_id = %correlation_id,
        shift_id = %shift_id,
        admin = %actor.id,
        "Processing shift adjustment"
    );

    let shift = state
        .guard()
        .adjust(shift_id, request.adjusted_end_time, &request.reason, &actor)
        .map_err(|e| failed(correlation_id, "adjust", e))?;
    Ok(Json(shift))
}

/// Handler for DELETE /shifts/{shift_id}.
async fn delete_shift_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(shift_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let correlation_id = Uuid::new_v4();
    let actor = resolve_actor(&state, &headers)?;

    state
        .guard()
        .delete_shift(&actor, shift_id)
        .map_err(|e| failed(correlation_id, "delete_shift", e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /admin/shifts.
async fn all_shifts_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<ShiftFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<Shift>>> {
    let correlation_id = Uuid::new_v4();
    let actor = resolve_actor(&state, &headers)?;
    let filter = read_query(query)?;

    let shifts = state
        .guard()
        .all_shifts(&actor, &filter)
        .map_err(|e| failed(correlation_id, "all_shifts", e))?;
    Ok(Json(shifts))
}

/// Handler for GET /tracking/live.
async fn live_tracking_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<LivePosition>>> {
    let correlation_id = Uuid::new_v4();
    let actor = resolve_actor(&state, &headers)?;
    require_admin(&actor)?;

    let board = state
        .guard()
        .live_positions()
        .map_err(|e| failed(correlation_id, "live_tracking", e))?;
    Ok(Json(board))
}

/// Handler for GET /fraud-alerts.
async fn list_alerts_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<AlertFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<FraudAlert>>> {
    let correlation_id = Uuid::new_v4();
    let actor = resolve_actor(&state, &headers)?;
    require_admin(&actor)?;
    let filter = read_query(query)?;

    let alerts = state
        .guard()
        .fraud()
        .alerts(&filter)
        .map_err(|e| failed(correlation_id, "list_alerts", e))?;
    Ok(Json(alerts))
}

/// Handler for POST /fraud-alerts/{alert_id}/resolve.
async fn resolve_alert_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(alert_id): Path<Uuid>,
) -> ApiResult<Json<FraudAlert>> {
    let correlation_id = Uuid::new_v4();
    let actor = resolve_actor(&state, &headers)?;

    let alert = state
        .guard()
        .fraud()
        .resolve(alert_id, &actor)
        .map_err(|e| failed(correlation_id, "resolve_alert", e))?;
    Ok(Json(alert))
}

/// Handler for GET /fraud-alerts/score/{employee_id}.
async fn risk_score_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(employee_id): Path<String>,
) -> ApiResult<Json<RiskScoreResponse>> {
    let correlation_id = Uuid::new_v4();
    let actor = resolve_actor(&state, &headers)?;
    require_admin(&actor)?;

    let fraud = state.guard().fraud();
    let risk_score = fraud
        .risk_score(&employee_id)
        .map_err(|e| failed(correlation_id, "risk_score", e))?;
    let alerts = fraud
        .alerts_for(&employee_id)
        .map_err(|e| failed(correlation_id, "risk_score", e))?;
    Ok(Json(RiskScoreResponse {
        employee_id,
        risk_score,
        alerts,
    }))
}

/// Handler for DELETE /devices/{employee_id}.
async fn clear_device_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(employee_id): Path<String>,
) -> ApiResult<Json<BindingClearedResponse>> {
    let correlation_id = Uuid::new_v4();
    let actor = resolve_actor(&state, &headers)?;

    let cleared = state
        .guard()
        .clear_device_binding(&actor, &employee_id)
        .map_err(|e| failed(correlation_id, "clear_device", e))?;
    Ok(Json(BindingClearedResponse {
        employee_id,
        cleared,
    }))
}
