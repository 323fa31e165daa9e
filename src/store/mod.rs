//! Read interfaces to the data the engine derives balances from.
//!
//! The engine never writes: entitlement and deferral rows are created by an
//! external year-rollover process and requests by an external submission
//! workflow. Every store is therefore a read-only trait, and every call is
//! safe to retry or cache.
//!
//! Each trait offers a single-key lookup used by the
//! [`BalanceCalculator`](crate::calculation::BalanceCalculator) and a batch
//! lookup over a whole employee set used by the report assembler.

mod cache;
mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::EngineResult;
use crate::models::{DeferralLog, DeferralRow, EntitlementRow, LeaveType, RequestRow};

pub use cache::{CachedLeaveTypeCatalog, DEFAULT_TTL_SECS};
pub use memory::{InMemoryLeaveStore, LeaveSnapshot};

/// Exposes leave type policy records.
#[async_trait]
pub trait LeaveTypeCatalog: Send + Sync {
    /// Returns every known leave type.
    ///
    /// A missing type list is an error, never an empty catalog.
    async fn get_leave_types(&self) -> EngineResult<Vec<LeaveType>>;
}

/// Per (employee, year, leave type) allocation overrides.
#[async_trait]
pub trait EntitlementStore: Send + Sync {
    /// Looks up the override for one key. `None` is a valid answer.
    async fn get_entitlement(
        &self,
        employee_id: &str,
        year: i32,
        leave_type_id: &str,
    ) -> EngineResult<Option<EntitlementRow>>;

    /// Returns every row for `year` belonging to any of `employee_ids`.
    async fn get_entitlements(
        &self,
        employee_ids: &[String],
        year: i32,
    ) -> EngineResult<Vec<EntitlementRow>>;
}

/// The deferral ledger, keyed by source year.
#[async_trait]
pub trait DeferralLedger: Send + Sync {
    /// Returns the entry carrying days into `year` for the leave type.
    ///
    /// Implementations look up the row stored against `year - 1`.
    async fn get_deferral_into_year(
        &self,
        employee_id: &str,
        year: i32,
        leave_type_id: &str,
    ) -> EngineResult<Option<DeferralLog>>;

    /// Returns every source-year row carrying days into `year` for any of
    /// `employee_ids`.
    async fn get_deferrals_into_year(
        &self,
        employee_ids: &[String],
        year: i32,
    ) -> EngineResult<Vec<DeferralRow>>;
}

/// The append-mostly history of leave requests.
#[async_trait]
pub trait RequestLedger: Send + Sync {
    /// Returns requests for one employee and leave type whose quota year is
    /// `since_year` or later.
    ///
    /// Rows whose quota year cannot be interpreted are included so that the
    /// caller can report them.
    async fn get_requests(
        &self,
        employee_id: &str,
        leave_type_id: &str,
        since_year: i32,
    ) -> EngineResult<Vec<RequestRow>>;

    /// Returns requests of every leave type for any of `employee_ids`, with
    /// the same year filter as [`RequestLedger::get_requests`].
    async fn get_requests_for(
        &self,
        employee_ids: &[String],
        since_year: i32,
    ) -> EngineResult<Vec<RequestRow>>;
}

/// The set of stores a computation reads from.
///
/// The request ledger is optional: legacy deployments without one fall back
/// to the `used_days` cached on entitlement rows.
#[derive(Clone)]
pub struct LeaveStores {
    /// Leave type policies.
    pub catalog: Arc<dyn LeaveTypeCatalog>,
    /// Allocation overrides.
    pub entitlements: Arc<dyn EntitlementStore>,
    /// Deferral ledger.
    pub deferrals: Arc<dyn DeferralLedger>,
    /// Request history, when one exists.
    pub requests: Option<Arc<dyn RequestLedger>>,
}

impl LeaveStores {
    /// Creates a store set from individual stores.
    pub fn new(
        catalog: Arc<dyn LeaveTypeCatalog>,
        entitlements: Arc<dyn EntitlementStore>,
        deferrals: Arc<dyn DeferralLedger>,
        requests: Option<Arc<dyn RequestLedger>>,
    ) -> Self {
        Self {
            catalog,
            entitlements,
            deferrals,
            requests,
        }
    }

    /// Creates a store set where one value backs all four interfaces.
    pub fn from_shared<S>(store: Arc<S>) -> Self
    where
        S: LeaveTypeCatalog + EntitlementStore + DeferralLedger + RequestLedger + 'static,
    {
        Self {
            catalog: store.clone(),
            entitlements: store.clone(),
            deferrals: store.clone(),
            requests: Some(store),
        }
    }

    /// Replaces the leave type catalog, e.g. with a cached one.
    pub fn with_catalog(mut self, catalog: Arc<dyn LeaveTypeCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Detaches the request ledger.
    pub fn without_request_ledger(mut self) -> Self {
        self.requests = None;
        self
    }
}
