//! Response types for the Leave Entitlement Engine API.
//!
//! This module defines the success bodies, the error response structures
//! and the mapping from engine errors to HTTP statuses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{AuditTrace, Balance, EmployeeBalanceRow};

/// Response body for the `/balances` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceReportResponse {
    /// Identifier of this report, for correlation with logs.
    pub report_id: Uuid,
    /// The target year.
    pub year: i32,
    /// One row per distinct employee requested.
    pub rows: Vec<EmployeeBalanceRow>,
}

/// Response body for the single-balance endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceDetailResponse {
    /// The employee.
    pub employee_id: String,
    /// The leave type.
    pub leave_type_id: String,
    /// The target year.
    pub year: i32,
    /// The computed balance.
    pub balance: Balance,
    /// How the balance was derived.
    pub audit_trace: AuditTrace,
}

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
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let code = error.code();
        let (status, details) = match &error {
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "The engine configuration could not be loaded",
            ),
            EngineError::DataUnavailable { .. } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "A data store could not be reached; the balance is unavailable, not zero",
            ),
            EngineError::MalformedRecord { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Stored data could not be interpreted",
            ),
            EngineError::LeaveTypeNotFound { .. } => (
                StatusCode::NOT_FOUND,
                "The leave type is not in the catalog",
            ),
            EngineError::CalculationError { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "The balance could not be calculated",
            ),
            EngineError::InvalidRequest { .. } => (
                StatusCode::BAD_REQUEST,
                "The request contains invalid parameters",
            ),
            EngineError::Superseded { .. } => (
                StatusCode::CONFLICT,
                "A newer report request replaced this one",
            ),
        };

        ApiErrorResponse {
            status,
            error: ApiError::with_details(code, error.to_string(), details),
        }
    }
}
