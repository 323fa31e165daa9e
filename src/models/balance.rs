//! Balance snapshot and report row models.
//!
//! This module contains the derived [`Balance`] and the [`EmployeeBalanceRow`]
//! produced for reports. Neither is ever persisted by the engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{AuditWarning, DeferralLog};
use crate::error::EngineError;

/// The computed balance of one employee for one leave type and year.
///
/// # Example
///
/// ```
/// use leave_engine::models::Balance;
///
/// let balance = Balance {
///     total: 12,
///     deferred: 3,
///     used_current: 5,
///     used_deferred: 2,
///     used: 7,
///     remaining: 8,
/// };
/// assert_eq!(balance.used_current + balance.used_deferred, balance.used);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// Days allocated for the year.
    pub total: i32,
    /// Days carried in from the previous year.
    pub deferred: i32,
    /// Days consumed from the current year's allocation.
    pub used_current: i32,
    /// Days consumed from the previous year's allocation.
    pub used_deferred: i32,
    /// All consumed days.
    pub used: i32,
    /// Days left, never negative.
    pub remaining: i32,
}

/// One cell of a report row: a balance, or a marker explaining why none
/// could be computed.
///
/// Keeps "0 days remaining" distinguishable from "balance unavailable".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BalanceEntry {
    /// The balance was computed.
    Available(Balance),
    /// The balance could not be computed for this cell.
    Unavailable {
        /// Machine-readable error code.
        code: String,
        /// Human-readable explanation.
        message: String,
    },
}

impl BalanceEntry {
    /// Builds an unavailable marker from an engine error.
    pub fn unavailable(error: &EngineError) -> Self {
        BalanceEntry::Unavailable {
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }

    /// Returns the balance if it was computed.
    pub fn balance(&self) -> Option<&Balance> {
        match self {
            BalanceEntry::Available(balance) => Some(balance),
            BalanceEntry::Unavailable { .. } => None,
        }
    }

    /// Returns true if this cell carries an error marker.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, BalanceEntry::Unavailable { .. })
    }
}

/// The balances of one employee for a target year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeBalanceRow {
    /// The employee the row describes.
    pub employee_id: String,
    /// The target year.
    pub year: i32,
    /// Balances keyed by leave type id, in key order.
    pub balances: BTreeMap<String, BalanceEntry>,
    /// The deferral ledger entry arriving in `year`, if any.
    pub deferral_log: Option<DeferralLog>,
    /// Warnings about records skipped while computing the row.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<AuditWarning>,
}

impl EmployeeBalanceRow {
    /// Returns true if any cell of the row is an error marker.
    pub fn has_errors(&self) -> bool {
        self.balances.values().any(BalanceEntry::is_unavailable)
    }
}
