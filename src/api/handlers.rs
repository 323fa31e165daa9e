//! HTTP request handlers for the Leave Entitlement Engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection, rejection::QueryRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::EngineError;

use super::request::{BalanceQuery, BalanceReportRequest, validate_year};
use super::response::{ApiError, ApiErrorResponse, BalanceDetailResponse, BalanceReportResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/balances", post(balances_handler))
        .route(
            "/employees/:employee_id/balances/:leave_type_id",
            get(balance_detail_handler),
        )
        .with_state(state)
}

/// Handler for POST /balances.
///
/// Builds one row per distinct employee with a balance or unavailable marker
/// per leave type.
async fn balances_handler(
    State(state): State<AppState>,
    payload: Result<Json<BalanceReportRequest>, JsonRejection>,
) -> Response {
    // Generate correlation ID for request tracking
    let report_id = Uuid::new_v4();
    info!(report_id = %report_id, "Processing balance report request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(report_id, rejection),
    };

    if let Err(err) = request.validate() {
        warn!(report_id = %report_id, error = %err, "Invalid balance report request");
        return error_response(err.into());
    }

    let start_time = Instant::now();
    match state
        .assembler()
        .build_report(&request.employee_ids, request.year, &request.selection())
        .await
    {
        Ok(rows) => {
            let degraded = rows.iter().filter(|row| row.has_errors()).count();
            info!(
                report_id = %report_id,
                year = request.year,
                rows = rows.len(),
                degraded_rows = degraded,
                duration_us = start_time.elapsed().as_micros(),
                "Balance report completed"
            );
            let body = BalanceReportResponse {
                report_id,
                year: request.year,
                rows,
            };
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                Json(body),
            )
                .into_response()
        }
        Err(err) => {
            warn!(report_id = %report_id, error = %err, "Balance report failed");
            error_response(err.into())
        }
    }
}

/// Handler for GET /employees/{employee_id}/balances/{leave_type_id}?year=.
///
/// Returns a single balance with its audit trace.
async fn balance_detail_handler(
    State(state): State<AppState>,
    Path((employee_id, leave_type_id)): Path<(String, String)>,
    query: Result<Query<BalanceQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(
        correlation_id = %correlation_id,
        employee_id = %employee_id,
        leave_type_id = %leave_type_id,
        "Processing balance request"
    );

    let year = match query {
        Ok(Query(query)) => query.year,
        Err(rejection) => {
            warn!(correlation_id = %correlation_id, error = %rejection, "Invalid query string");
            return error_response(
                EngineError::InvalidRequest {
                    field: "year".to_string(),
                    message: rejection.body_text(),
                }
                .into(),
            );
        }
    };

    if let Err(err) = validate_year(year) {
        return error_response(err.into());
    }

    match state
        .calculator()
        .calculate(&employee_id, &leave_type_id, year)
        .await
    {
        Ok(computation) => {
            info!(
                correlation_id = %correlation_id,
                remaining = computation.balance.remaining,
                "Balance calculated"
            );
            let body = BalanceDetailResponse {
                employee_id,
                leave_type_id,
                year,
                balance: computation.balance,
                audit_trace: computation.audit_trace,
            };
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                Json(body),
            )
                .into_response()
        }
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Balance calculation failed");
            error_response(err.into())
        }
    }
}

fn json_rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // Get the body text which contains the detailed error from serde
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::new("VALIDATION_ERROR", body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    error_response(ApiErrorResponse {
        status: StatusCode::BAD_REQUEST,
        error,
    })
}

fn error_response(api_error: ApiErrorResponse) -> Response {
    (
        api_error.status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(api_error.error),
    )
        .into_response()
}
