//! Request types for the Leave Entitlement Engine API.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::report::LeaveTypeSelection;

/// Earliest year accepted in requests.
pub const MIN_YEAR: i32 = 1900;

/// Latest year accepted in requests.
pub const MAX_YEAR: i32 = 9999;

/// Largest employee set a single report may cover.
pub const MAX_EMPLOYEES_PER_REPORT: usize = 5000;

/// Request body for the `/balances` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceReportRequest {
    /// The employees to report on.
    pub employee_ids: Vec<String>,
    /// The target year.
    pub year: i32,
    /// Restricts the report to these leave types. All types when omitted.
    #[serde(default)]
    pub leave_type_ids: Option<Vec<String>>,
}

impl BalanceReportRequest {
    /// Checks the request before any store is read.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` naming the offending field.
    pub fn validate(&self) -> EngineResult<()> {
        if self.employee_ids.is_empty() {
            return Err(invalid("employee_ids", "must not be empty"));
        }
        if self.employee_ids.len() > MAX_EMPLOYEES_PER_REPORT {
            return Err(invalid(
                "employee_ids",
                format!("must not exceed {} entries", MAX_EMPLOYEES_PER_REPORT),
            ));
        }
        if self.employee_ids.iter().any(|id| id.trim().is_empty()) {
            return Err(invalid("employee_ids", "must not contain blank ids"));
        }
        validate_year(self.year)?;
        if let Some(ids) = &self.leave_type_ids {
            if ids.is_empty() {
                return Err(invalid("leave_type_ids", "must not be empty when given"));
            }
        }
        Ok(())
    }

    /// Returns the leave type selection this request asks for.
    pub fn selection(&self) -> LeaveTypeSelection {
        match &self.leave_type_ids {
            Some(ids) => LeaveTypeSelection::Only(ids.clone()),
            None => LeaveTypeSelection::All,
        }
    }
}

/// Query string for the single-balance endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceQuery {
    /// The target year.
    pub year: i32,
}

/// Checks that a year lies in the accepted range.
pub fn validate_year(year: i32) -> EngineResult<()> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(invalid(
            "year",
            format!("must be between {} and {}", MIN_YEAR, MAX_YEAR),
        ));
    }
    Ok(())
}

fn invalid(field: &str, message: impl Into<String>) -> EngineError {
    EngineError::InvalidRequest {
        field: field.to_string(),
        message: message.into(),
    }
}
