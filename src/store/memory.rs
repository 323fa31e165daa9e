//! Snapshot-backed store implementation.
//!
//! [`InMemoryLeaveStore`] serves all four read interfaces from a
//! [`LeaveSnapshot`] held in memory, loaded from a JSON export of the
//! hosted database or built directly in tests.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{
    DeferralLog, DeferralRow, EntitlementRow, LeaveType, RequestRow, deferral_source_year,
    select_deferral,
};

use super::{DeferralLedger, EntitlementStore, LeaveTypeCatalog, RequestLedger};

/// A point-in-time copy of every table the engine reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeaveSnapshot {
    /// Leave type policies. `None` when the export carried no type list.
    #[serde(default)]
    pub leave_types: Option<Vec<LeaveType>>,
    /// Allocation overrides.
    #[serde(default)]
    pub entitlements: Vec<EntitlementRow>,
    /// Deferral ledger entries.
    #[serde(default)]
    pub deferrals: Vec<DeferralRow>,
    /// Request history.
    #[serde(default)]
    pub requests: Vec<RequestRow>,
}

/// Serves the engine's read interfaces from a [`LeaveSnapshot`].
///
/// # Example
///
/// ```
/// use leave_engine::store::{InMemoryLeaveStore, LeaveSnapshot};
///
/// let store = InMemoryLeaveStore::new(LeaveSnapshot::default());
/// assert_eq!(store.snapshot().entitlements.len(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryLeaveStore {
    snapshot: LeaveSnapshot,
}

impl InMemoryLeaveStore {
    /// Creates a store over the given snapshot.
    pub fn new(snapshot: LeaveSnapshot) -> Self {
        Self { snapshot }
    }

    /// Loads a snapshot from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigNotFound` if the file cannot be read and
    /// `ConfigParseError` if it is not a valid snapshot.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        let snapshot =
            serde_json::from_str(&content).map_err(|e| EngineError::ConfigParseError {
                path: path_str,
                message: e.to_string(),
            })?;

        Ok(Self::new(snapshot))
    }

    /// Returns the underlying snapshot.
    pub fn snapshot(&self) -> &LeaveSnapshot {
        &self.snapshot
    }
}

fn id_set(employee_ids: &[String]) -> HashSet<&str> {
    employee_ids.iter().map(String::as_str).collect()
}

/// Keeps rows drawing on `since_year` or later, and rows whose quota year
/// cannot be read.
fn within_window(request: &RequestRow, since_year: i32) -> bool {
    request.quota_year().map_or(true, |year| year >= since_year)
}

#[async_trait]
impl LeaveTypeCatalog for InMemoryLeaveStore {
    async fn get_leave_types(&self) -> EngineResult<Vec<LeaveType>> {
        self.snapshot
            .leave_types
            .clone()
            .ok_or_else(|| EngineError::unavailable("leave_types", "snapshot has no leave type list"))
    }
}

#[async_trait]
impl EntitlementStore for InMemoryLeaveStore {
    async fn get_entitlement(
        &self,
        employee_id: &str,
        year: i32,
        leave_type_id: &str,
    ) -> EngineResult<Option<EntitlementRow>> {
        Ok(self
            .snapshot
            .entitlements
            .iter()
            .find(|row| {
                row.employee_id == employee_id
                    && row.year == year
                    && row.leave_type_id == leave_type_id
            })
            .cloned())
    }

    async fn get_entitlements(
        &self,
        employee_ids: &[String],
        year: i32,
    ) -> EngineResult<Vec<EntitlementRow>> {
        let ids = id_set(employee_ids);
        Ok(self
            .snapshot
            .entitlements
            .iter()
            .filter(|row| row.year == year && ids.contains(row.employee_id.as_str()))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl DeferralLedger for InMemoryLeaveStore {
    async fn get_deferral_into_year(
        &self,
        employee_id: &str,
        year: i32,
        leave_type_id: &str,
    ) -> EngineResult<Option<DeferralLog>> {
        let source_year = deferral_source_year(year)?;
        let candidates = self
            .snapshot
            .deferrals
            .iter()
            .filter(|row| row.employee_id == employee_id && row.year == source_year);

        Ok(select_deferral(candidates, leave_type_id).map(DeferralRow::to_log))
    }

    async fn get_deferrals_into_year(
        &self,
        employee_ids: &[String],
        year: i32,
    ) -> EngineResult<Vec<DeferralRow>> {
        let source_year = deferral_source_year(year)?;
        let ids = id_set(employee_ids);
        Ok(self
            .snapshot
            .deferrals
            .iter()
            .filter(|row| row.year == source_year && ids.contains(row.employee_id.as_str()))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RequestLedger for InMemoryLeaveStore {
    async fn get_requests(
        &self,
        employee_id: &str,
        leave_type_id: &str,
        since_year: i32,
    ) -> EngineResult<Vec<RequestRow>> {
        Ok(self
            .snapshot
            .requests
            .iter()
            .filter(|r| {
                r.employee_id == employee_id
                    && r.leave_type_id == leave_type_id
                    && within_window(r, since_year)
            })
            .cloned()
            .collect())
    }

    async fn get_requests_for(
        &self,
        employee_ids: &[String],
        since_year: i32,
    ) -> EngineResult<Vec<RequestRow>> {
        let ids = id_set(employee_ids);
        Ok(self
            .snapshot
            .requests
            .iter()
            .filter(|r| ids.contains(r.employee_id.as_str()) && within_window(r, since_year))
            .cloned()
            .collect())
    }
}
