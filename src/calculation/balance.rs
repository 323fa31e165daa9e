//! Balance calculation.
//!
//! This module combines a leave type policy, an optional entitlement row, an
//! optional deferral ledger entry and the request history into one
//! [`Balance`]. The calculation is pure: identical inputs always produce
//! identical output.

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, AuditTrace, Balance, DeferralLog, EntitlementRow, LeaveType, RequestRow,
    deferral_source_year,
};

use super::allocation::{resolve_deferred, resolve_total};
use super::quota_attribution::attribute_requests;

/// Everything a balance is derived from, for one employee, leave type and year.
#[derive(Debug, Clone, Copy)]
pub struct BalanceInputs<'a> {
    /// The leave type policy.
    pub policy: &'a LeaveType,
    /// The year being computed.
    pub target_year: i32,
    /// The allocation override for the target year, if any.
    pub entitlement: Option<&'a EntitlementRow>,
    /// The deferral ledger entry arriving in the target year, if any.
    pub deferral: Option<&'a DeferralLog>,
    /// Request history since the previous year. `None` when no request
    /// ledger is available, in which case the entitlement's cached
    /// `used_days` is used instead.
    pub requests: Option<&'a [RequestRow]>,
}

/// A computed balance together with the trace explaining it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceComputation {
    /// The balance snapshot.
    pub balance: Balance,
    /// Every decision taken while computing it.
    pub audit_trace: AuditTrace,
}

/// Computes a balance snapshot.
///
/// `remaining = max(0, total + deferred - used_current - used_deferred)`.
/// The leave type's `max_days` is not applied.
///
/// # Errors
///
/// Returns `CalculationError` if any intermediate sum overflows, or if
/// `target_year` has no previous year.
///
/// # Examples
///
/// ```
/// use leave_engine::calculation::{BalanceInputs, calculate_balance};
/// use leave_engine::models::{DeferralLog, LeaveType, RawQuotaYear, RequestRow};
/// use chrono::NaiveDate;
///
/// let annual = LeaveType {
///     id: "annual".to_string(),
///     name: "Annual Leave".to_string(),
///     default_days: 12,
///     can_defer: true,
///     max_days: None,
/// };
/// let deferral = DeferralLog { id: "def_1".to_string(), days_deferred: 3 };
/// let request = |days, year| RequestRow {
///     id: None,
///     employee_id: "emp_001".to_string(),
///     leave_type_id: "annual".to_string(),
///     days_requested: days,
///     leave_quota_year: Some(RawQuotaYear::Year(year)),
///     start_date: NaiveDate::from_ymd_opt(2025, 4, 7).unwrap(),
/// };
/// let requests = vec![request(5, 2025), request(2, 2024)];
///
/// let result = calculate_balance(&BalanceInputs {
///     policy: &annual,
///     target_year: 2025,
///     entitlement: None,
///     deferral: Some(&deferral),
///     requests: Some(&requests),
/// })
/// .unwrap();
///
/// assert_eq!(result.balance.remaining, 8);
/// ```
pub fn calculate_balance(inputs: &BalanceInputs<'_>) -> EngineResult<BalanceComputation> {
    // Deferrals and quota attribution both look one year back.
    deferral_source_year(inputs.target_year)?;

    let mut steps: Vec<AuditStep> = Vec::new();
    let mut warnings = Vec::new();
    let mut step_number: u32 = 1;

    let total = resolve_total(inputs.policy, inputs.entitlement, step_number);
    steps.push(total.audit_step);
    step_number += 1;

    let (used_current, used_deferred) = match inputs.requests {
        Some(requests) => {
            let attribution = attribute_requests(requests, inputs.target_year, step_number)?;
            steps.push(attribution.audit_step);
            warnings.extend(attribution.warnings);
            (attribution.used_current, attribution.used_deferred)
        }
        None => {
            let cached = inputs.entitlement.map_or(0, |e| e.used_days);
            steps.push(AuditStep {
                step_number,
                rule_id: "legacy_used_days".to_string(),
                rule_name: "Legacy Used Days".to_string(),
                input: serde_json::json!({
                    "entitlement_used_days": inputs.entitlement.map(|e| e.used_days),
                }),
                output: serde_json::json!({
                    "used_current": cached,
                    "used_deferred": 0,
                }),
                reasoning: format!(
                    "No request ledger available, using cached used_days of {}",
                    cached
                ),
            });
            (cached, 0)
        }
    };
    step_number += 1;

    let deferred = resolve_deferred(
        inputs.policy,
        inputs.deferral,
        inputs.entitlement,
        step_number,
    );
    steps.push(deferred.audit_step);
    step_number += 1;

    let used = checked(used_current.checked_add(used_deferred), "used")?;
    let available = checked(total.total.checked_add(deferred.deferred), "available")?;
    let unclamped = checked(available.checked_sub(used), "remaining")?;
    let remaining = unclamped.max(0);

    steps.push(AuditStep {
        step_number,
        rule_id: "remaining_balance".to_string(),
        rule_name: "Remaining Balance".to_string(),
        input: serde_json::json!({
            "total": total.total,
            "deferred": deferred.deferred,
            "used": used,
        }),
        output: serde_json::json!({
            "remaining": remaining,
            "clamped": unclamped < 0,
        }),
        reasoning: format!(
            "max(0, {} + {} - {}) = {}",
            total.total, deferred.deferred, used, remaining
        ),
    });

    Ok(BalanceComputation {
        balance: Balance {
            total: total.total,
            deferred: deferred.deferred,
            used_current,
            used_deferred,
            used,
            remaining,
        },
        audit_trace: AuditTrace { steps, warnings },
    })
}

fn checked(value: Option<i32>, what: &str) -> EngineResult<i32> {
    value.ok_or_else(|| EngineError::CalculationError {
        message: format!("{} days overflow", what),
    })
}
