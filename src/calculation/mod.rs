//! Calculation logic for the Leave Entitlement Engine.
//!
//! This module contains the pure functions that derive a balance (allocation
//! resolution, deferral resolution, quota-year attribution of requests and
//! the remaining-balance clamp) and the [`BalanceCalculator`] that feeds them
//! from the stores.

mod allocation;
mod balance;
mod calculator;
mod quota_attribution;

pub use allocation::{
    DeferralResolution, DeferralSource, TotalResolution, TotalSource, resolve_deferred,
    resolve_total,
};
pub use balance::{BalanceComputation, BalanceInputs, calculate_balance};
pub use calculator::BalanceCalculator;
pub use quota_attribution::{RequestAttribution, attribute_requests};
