//! Leave Entitlement Engine
//!
//! This crate computes leave balances per employee, leave type and year:
//! allocations with per-employee overrides, days deferred from the previous
//! year, and consumption attributed to the quota year it was drawn from.
//! Balance reports over many employees batch their store reads and mark
//! uncomputable cells as unavailable rather than zero.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod report;
pub mod store;
