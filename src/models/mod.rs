//! Core data models for the Leave Entitlement Engine.
//!
//! This module contains the records read from the stores and the balances
//! derived from them.

mod audit;
mod balance;
mod entitlement;
mod leave_request;
mod leave_type;

pub use audit::{AuditStep, AuditTrace, AuditWarning};
pub use balance::{Balance, BalanceEntry, EmployeeBalanceRow};
pub use entitlement::{
    DeferralLog, DeferralRow, EntitlementRow, deferral_source_year, select_deferral,
};
pub use leave_request::{RawQuotaYear, RequestRow};
pub use leave_type::LeaveType;
