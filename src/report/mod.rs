//! Balance reports across many employees.
//!
//! [`BalanceReportAssembler`] fans the balance calculation out over an
//! employee set and a selection of leave types; [`ReportCoordinator`] makes
//! sure that only the most recently requested report is ever delivered.

mod assembler;
mod coordinator;

pub use assembler::{BalanceReportAssembler, LeaveTypeSelection};
pub use coordinator::ReportCoordinator;
