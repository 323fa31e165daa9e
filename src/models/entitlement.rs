//! Entitlement and deferral ledger records.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A per (employee, year, leave type) allocation override.
///
/// Absence of a row is a valid state meaning "use the leave type default,
/// nothing deferred yet".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementRow {
    /// The employee this allocation belongs to.
    pub employee_id: String,
    /// The year the allocation applies to.
    pub year: i32,
    /// The leave type the allocation applies to.
    pub leave_type_id: String,
    /// Allocated days. Zero or less means "no override".
    pub total_days: i32,
    /// Legacy cache of days received from the previous year.
    #[serde(default)]
    pub deferred_days: i32,
    /// Legacy cache of days consumed. Informational once a request ledger exists.
    #[serde(default)]
    pub used_days: i32,
}

impl EntitlementRow {
    /// Returns the override allocation, if this row carries a usable one.
    pub fn override_total(&self) -> Option<i32> {
        (self.total_days > 0).then_some(self.total_days)
    }
}

/// A deferral ledger entry.
///
/// Stored against the *source* year: a row with `year = 2024` carries days
/// into 2025.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferralRow {
    /// Unique identifier of the ledger entry.
    pub id: String,
    /// The employee whose days were deferred.
    pub employee_id: String,
    /// The source year the days were carried out of.
    pub year: i32,
    /// Number of days carried into `year + 1`.
    pub days_deferred: i32,
    /// Restricts the entry to one leave type. `None` applies to every
    /// deferrable leave type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leave_type_id: Option<String>,
}

impl DeferralRow {
    /// The year the deferred days arrive in, if representable.
    pub fn arrives_in(&self) -> Option<i32> {
        self.year.checked_add(1)
    }

    /// Returns true if this entry funds the given leave type.
    pub fn applies_to(&self, leave_type_id: &str) -> bool {
        self.leave_type_id
            .as_deref()
            .is_none_or(|id| id == leave_type_id)
    }

    /// Converts the row into the log entry exposed on reports.
    pub fn to_log(&self) -> DeferralLog {
        DeferralLog {
            id: self.id.clone(),
            days_deferred: self.days_deferred,
        }
    }
}

/// A deferral arriving in a target year, as exposed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeferralLog {
    /// The ledger entry id.
    pub id: String,
    /// Days carried in from the previous year.
    pub days_deferred: i32,
}

/// Returns the source year whose ledger rows fund `year`.
///
/// # Errors
///
/// Returns `CalculationError` if `year` has no predecessor in `i32`.
pub fn deferral_source_year(year: i32) -> EngineResult<i32> {
    year.checked_sub(1)
        .ok_or_else(|| EngineError::CalculationError {
            message: format!("year {} has no previous year", year),
        })
}

/// Picks the ledger entry funding `leave_type_id` out of candidate rows.
///
/// Type-specific rows win over untyped rows; ties break on the lowest id so
/// the choice does not depend on store ordering.
pub fn select_deferral<'a>(
    rows: impl IntoIterator<Item = &'a DeferralRow>,
    leave_type_id: &str,
) -> Option<&'a DeferralRow> {
    rows.into_iter()
        .filter(|row| row.applies_to(leave_type_id))
        .min_by(|a, b| {
            b.leave_type_id
                .is_some()
                .cmp(&a.leave_type_id.is_some())
                .then_with(|| a.id.cmp(&b.id))
        })
}
