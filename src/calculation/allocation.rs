//! Allocation and deferral resolution.
//!
//! This module decides how many days an employee is allocated for a year
//! and how many days were carried in from the previous year.

use crate::models::{AuditStep, DeferralLog, EntitlementRow, LeaveType};

/// Where the allocation total came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalSource {
    /// An employee-specific entitlement override.
    EntitlementOverride,
    /// The leave type's default allocation.
    LeaveTypeDefault,
}

/// The result of resolving the allocation total.
#[derive(Debug, Clone)]
pub struct TotalResolution {
    /// Days allocated for the year.
    pub total: i32,
    /// Where the value came from.
    pub source: TotalSource,
    /// The audit step recording this decision.
    pub audit_step: AuditStep,
}

/// Resolves the allocation for a year.
///
/// An entitlement row with a positive `total_days` overrides the leave type
/// default. A missing row, or one with zero days, falls back to
/// `default_days`: the employee is newly eligible, not in error.
///
/// # Examples
///
/// ```
/// use leave_engine::calculation::{TotalSource, resolve_total};
/// use leave_engine::models::LeaveType;
///
/// let annual = LeaveType {
///     id: "annual".to_string(),
///     name: "Annual Leave".to_string(),
///     default_days: 12,
///     can_defer: true,
///     max_days: None,
/// };
///
/// let result = resolve_total(&annual, None, 1);
/// assert_eq!(result.total, 12);
/// assert_eq!(result.source, TotalSource::LeaveTypeDefault);
/// ```
pub fn resolve_total(
    policy: &LeaveType,
    entitlement: Option<&EntitlementRow>,
    step_number: u32,
) -> TotalResolution {
    let override_total = entitlement.and_then(EntitlementRow::override_total);

    let (total, source, reasoning) = match override_total {
        Some(total) => (
            total,
            TotalSource::EntitlementOverride,
            format!("Using entitlement override of {} days", total),
        ),
        None => (
            policy.default_days,
            TotalSource::LeaveTypeDefault,
            format!(
                "No usable entitlement override, using '{}' default of {} days",
                policy.name, policy.default_days
            ),
        ),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "entitlement_total".to_string(),
        rule_name: "Entitlement Total".to_string(),
        input: serde_json::json!({
            "leave_type_id": policy.id,
            "default_days": policy.default_days,
            "entitlement_total_days": entitlement.map(|e| e.total_days),
        }),
        output: serde_json::json!({
            "total": total,
            "source": match source {
                TotalSource::EntitlementOverride => "entitlement_override",
                TotalSource::LeaveTypeDefault => "leave_type_default",
            },
        }),
        reasoning,
    };

    TotalResolution {
        total,
        source,
        audit_step,
    }
}

/// Where the deferred days came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferralSource {
    /// The leave type does not allow deferral.
    NotDeferrable,
    /// The deferral ledger entry for the previous year.
    Ledger,
    /// The legacy `deferred_days` column of the entitlement row.
    EntitlementCache,
    /// Nothing was deferred.
    None,
}

/// The result of resolving deferred days.
#[derive(Debug, Clone)]
pub struct DeferralResolution {
    /// Days carried into the target year.
    pub deferred: i32,
    /// Where the value came from.
    pub source: DeferralSource,
    /// The audit step recording this decision.
    pub audit_step: AuditStep,
}

/// Resolves the days carried into the target year.
///
/// Non-deferrable leave types always resolve to zero, whatever the ledger
/// holds. Otherwise the ledger entry wins over the cached entitlement
/// column, which in turn wins over zero.
pub fn resolve_deferred(
    policy: &LeaveType,
    ledger: Option<&DeferralLog>,
    entitlement: Option<&EntitlementRow>,
    step_number: u32,
) -> DeferralResolution {
    let (deferred, source, reasoning) = if !policy.can_defer {
        (
            0,
            DeferralSource::NotDeferrable,
            format!("'{}' does not allow deferral", policy.name),
        )
    } else if let Some(log) = ledger {
        (
            log.days_deferred,
            DeferralSource::Ledger,
            format!(
                "Deferral ledger entry '{}' carries {} days",
                log.id, log.days_deferred
            ),
        )
    } else if let Some(row) = entitlement {
        (
            row.deferred_days,
            DeferralSource::EntitlementCache,
            format!(
                "No ledger entry, using cached entitlement value of {} days",
                row.deferred_days
            ),
        )
    } else {
        (
            0,
            DeferralSource::None,
            "No ledger entry or entitlement row, nothing deferred".to_string(),
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "deferral_resolution".to_string(),
        rule_name: "Deferral Resolution".to_string(),
        input: serde_json::json!({
            "can_defer": policy.can_defer,
            "ledger_days_deferred": ledger.map(|l| l.days_deferred),
            "entitlement_deferred_days": entitlement.map(|e| e.deferred_days),
        }),
        output: serde_json::json!({
            "deferred": deferred,
            "source": match source {
                DeferralSource::NotDeferrable => "not_deferrable",
                DeferralSource::Ledger => "ledger",
                DeferralSource::EntitlementCache => "entitlement_cache",
                DeferralSource::None => "none",
            },
        }),
        reasoning,
    };

    DeferralResolution {
        deferred,
        source,
        audit_step,
    }
}
