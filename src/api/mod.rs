//! HTTP API module for the Leave Entitlement Engine.
//!
//! This module provides the REST API endpoints for balance reports and
//! single balance lookups.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{BalanceQuery, BalanceReportRequest, MAX_EMPLOYEES_PER_REPORT};
pub use response::{ApiError, BalanceDetailResponse, BalanceReportResponse};
pub use state::AppState;
