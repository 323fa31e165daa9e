//! Application state for the Leave Entitlement Engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::calculation::BalanceCalculator;
use crate::report::BalanceReportAssembler;
use crate::store::LeaveStores;

/// Shared application state.
///
/// Holds the calculator and report assembler, both reading from the same
/// set of stores.
#[derive(Clone)]
pub struct AppState {
    calculator: Arc<BalanceCalculator>,
    assembler: Arc<BalanceReportAssembler>,
}

impl AppState {
    /// Creates a new application state over the given stores.
    pub fn new(stores: LeaveStores) -> Self {
        Self {
            calculator: Arc::new(BalanceCalculator::new(stores.clone())),
            assembler: Arc::new(BalanceReportAssembler::new(stores)),
        }
    }

    /// Returns the single-balance calculator.
    pub fn calculator(&self) -> &BalanceCalculator {
        &self.calculator
    }

    /// Returns the report assembler.
    pub fn assembler(&self) -> &BalanceReportAssembler {
        &self.assembler
    }
}
