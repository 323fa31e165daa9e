//! Quota-year attribution of leave requests.
//!
//! Requests are deducted from the allocation of their quota year. For a
//! target year `Y`, requests against `Y` consume the current allocation,
//! requests against `Y - 1` consume days deferred out of `Y - 1`, and
//! anything older draws on a quota that has expired and no longer exists.

use tracing::warn;

use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, AuditWarning, RequestRow, deferral_source_year};

/// The result of attributing requests to funding sources.
#[derive(Debug, Clone)]
pub struct RequestAttribution {
    /// Days drawn from the target year's allocation.
    pub used_current: i32,
    /// Days drawn from the previous year's allocation.
    pub used_deferred: i32,
    /// Number of requests counted towards either sum.
    pub counted_requests: usize,
    /// Number of requests excluded because their quota year is outside the
    /// target or previous year.
    pub excluded_requests: usize,
    /// Warnings for malformed rows that were skipped.
    pub warnings: Vec<AuditWarning>,
    /// The audit step recording this attribution.
    pub audit_step: AuditStep,
}

/// Splits request history into current-year and deferred consumption.
///
/// Malformed rows (negative days, non-numeric quota year) are skipped with a
/// warning rather than aborting the computation. Rows whose quota year is
/// neither `target_year` nor `target_year - 1` contribute to neither sum.
///
/// # Errors
///
/// Returns `CalculationError` if a sum overflows.
///
/// # Examples
///
/// ```
/// use leave_engine::calculation::attribute_requests;
/// use leave_engine::models::{RawQuotaYear, RequestRow};
/// use chrono::NaiveDate;
///
/// let request = |days, year| RequestRow {
///     id: None,
///     employee_id: "emp_001".to_string(),
///     leave_type_id: "annual".to_string(),
///     days_requested: days,
///     leave_quota_year: Some(RawQuotaYear::Year(year)),
///     start_date: NaiveDate::from_ymd_opt(2025, 2, 3).unwrap(),
/// };
///
/// let requests = vec![request(5, 2025), request(2, 2024), request(3, 2022)];
/// let result = attribute_requests(&requests, 2025, 1).unwrap();
/// assert_eq!(result.used_current, 5);
/// assert_eq!(result.used_deferred, 2);
/// assert_eq!(result.excluded_requests, 1);
/// ```
pub fn attribute_requests(
    requests: &[RequestRow],
    target_year: i32,
    step_number: u32,
) -> EngineResult<RequestAttribution> {
    let previous_year = deferral_source_year(target_year)?;
    let mut used_current: i32 = 0;
    let mut used_deferred: i32 = 0;
    let mut counted_requests = 0;
    let mut excluded_requests = 0;
    let mut warnings = Vec::new();

    for request in requests {
        let validated = request
            .quota_year()
            .and_then(|year| request.validated_days().map(|days| (year, days)));

        let (quota_year, days) = match validated {
            Ok(pair) => pair,
            Err(err) => {
                warn!(record = %request.describe(), error = %err, "Skipping malformed request");
                warnings.push(AuditWarning::malformed_record(err.to_string()));
                continue;
            }
        };

        let bucket = if quota_year == target_year {
            &mut used_current
        } else if quota_year == previous_year {
            &mut used_deferred
        } else {
            excluded_requests += 1;
            continue;
        };

        *bucket = bucket
            .checked_add(days)
            .ok_or_else(|| EngineError::CalculationError {
                message: format!(
                    "used days overflow while adding request '{}'",
                    request.describe()
                ),
            })?;
        counted_requests += 1;
    }

    let audit_step = AuditStep {
        step_number,
        rule_id: "quota_attribution".to_string(),
        rule_name: "Quota Year Attribution".to_string(),
        input: serde_json::json!({
            "target_year": target_year,
            "request_count": requests.len(),
        }),
        output: serde_json::json!({
            "used_current": used_current,
            "used_deferred": used_deferred,
            "counted_requests": counted_requests,
            "excluded_requests": excluded_requests,
            "skipped_requests": warnings.len(),
        }),
        reasoning: format!(
            "{} days against {}, {} days against {}, {} requests outside both years",
            used_current, target_year, used_deferred, previous_year, excluded_requests
        ),
    };

    Ok(RequestAttribution {
        used_current,
        used_deferred,
        counted_requests,
        excluded_requests,
        warnings,
        audit_step,
    })
}
