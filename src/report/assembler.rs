//! Balance report assembly.
//!
//! The assembler reads each store once for the whole employee set, then
//! demultiplexes the rows per employee and leave type and runs the balance
//! calculation for every cell.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::calculation::{BalanceComputation, BalanceInputs, calculate_balance};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    BalanceEntry, DeferralRow, EmployeeBalanceRow, EntitlementRow, LeaveType, RequestRow,
    deferral_source_year, select_deferral,
};
use crate::store::LeaveStores;

const NO_REQUESTS: &[RequestRow] = &[];

/// Which leave types a report covers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveTypeSelection {
    /// Every leave type in the catalog.
    #[default]
    All,
    /// Only the listed leave type ids. Ids unknown to the catalog produce
    /// unavailable cells.
    Only(Vec<String>),
}

/// Builds balance reports across many employees.
#[derive(Clone)]
pub struct BalanceReportAssembler {
    stores: LeaveStores,
}

/// Store rows for the whole report, indexed for per-employee lookup.
struct ReportData<'a> {
    year: i32,
    entitlements: HashMap<&'a str, HashMap<&'a str, &'a EntitlementRow>>,
    deferrals: HashMap<&'a str, Vec<&'a DeferralRow>>,
    requests: Option<HashMap<String, HashMap<String, Vec<RequestRow>>>>,
}

/// One report column: a known leave type, or an id the catalog lacks.
enum Column<'a> {
    Known(&'a LeaveType),
    Unknown(&'a str),
}

impl BalanceReportAssembler {
    /// Creates an assembler over the given stores.
    pub fn new(stores: LeaveStores) -> Self {
        Self { stores }
    }

    /// Builds one row per distinct employee id, in order of first appearance.
    ///
    /// Every store is queried once for the whole employee set, concurrently.
    /// A cell that cannot be computed becomes an unavailable marker without
    /// affecting the other cells.
    ///
    /// # Errors
    ///
    /// Returns `DataUnavailable` if any store cannot be read, since an
    /// unreachable store would fail every row identically.
    pub async fn build_report(
        &self,
        employee_ids: &[String],
        year: i32,
        selection: &LeaveTypeSelection,
    ) -> EngineResult<Vec<EmployeeBalanceRow>> {
        let start_time = Instant::now();
        let employee_ids = distinct(employee_ids);
        if employee_ids.is_empty() {
            return Ok(Vec::new());
        }

        let since_year = deferral_source_year(year)?;
        let (leave_types, entitlements, deferrals, requests) = tokio::try_join!(
            self.stores.catalog.get_leave_types(),
            self.stores.entitlements.get_entitlements(&employee_ids, year),
            self.stores.deferrals.get_deferrals_into_year(&employee_ids, year),
            self.load_requests(&employee_ids, since_year),
        )?;

        let columns = select_columns(&leave_types, selection);
        let data = ReportData::index(year, since_year, &entitlements, &deferrals, requests);

        let rows: Vec<EmployeeBalanceRow> = employee_ids
            .iter()
            .map(|employee_id| data.build_row(employee_id, &columns))
            .collect();

        let unavailable_cells: usize = rows
            .iter()
            .map(|row| row.balances.values().filter(|e| e.is_unavailable()).count())
            .sum();

        info!(
            year,
            employees = rows.len(),
            leave_types = columns.len(),
            unavailable_cells,
            duration_us = start_time.elapsed().as_micros() as u64,
            "Balance report built"
        );

        Ok(rows)
    }

    async fn load_requests(
        &self,
        employee_ids: &[String],
        since_year: i32,
    ) -> EngineResult<Option<Vec<RequestRow>>> {
        match &self.stores.requests {
            Some(ledger) => ledger
                .get_requests_for(employee_ids, since_year)
                .await
                .map(Some),
            None => Ok(None),
        }
    }
}

impl<'a> ReportData<'a> {
    fn index(
        year: i32,
        source_year: i32,
        entitlements: &'a [EntitlementRow],
        deferrals: &'a [DeferralRow],
        requests: Option<Vec<RequestRow>>,
    ) -> Self {
        let mut entitlement_index: HashMap<&str, HashMap<&str, &EntitlementRow>> = HashMap::new();
        for row in entitlements.iter().filter(|row| row.year == year) {
            entitlement_index
                .entry(row.employee_id.as_str())
                .or_default()
                .entry(row.leave_type_id.as_str())
                .or_insert(row);
        }

        let mut deferral_index: HashMap<&str, Vec<&DeferralRow>> = HashMap::new();
        for row in deferrals.iter().filter(|row| row.year == source_year) {
            deferral_index
                .entry(row.employee_id.as_str())
                .or_default()
                .push(row);
        }

        let request_index = requests.map(|rows| {
            let mut index: HashMap<String, HashMap<String, Vec<RequestRow>>> = HashMap::new();
            for row in rows {
                index
                    .entry(row.employee_id.clone())
                    .or_default()
                    .entry(row.leave_type_id.clone())
                    .or_default()
                    .push(row);
            }
            index
        });

        Self {
            year,
            entitlements: entitlement_index,
            deferrals: deferral_index,
            requests: request_index,
        }
    }

    fn build_row(&self, employee_id: &str, columns: &[Column<'_>]) -> EmployeeBalanceRow {
        let employee_deferrals = self
            .deferrals
            .get(employee_id)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let mut balances = BTreeMap::new();
        let mut warnings = Vec::new();

        for column in columns {
            let (key, entry) = match column {
                Column::Unknown(id) => {
                    let error = EngineError::LeaveTypeNotFound { id: id.to_string() };
                    warn!(employee_id, leave_type_id = %id, "Leave type missing from catalog");
                    (id.to_string(), BalanceEntry::unavailable(&error))
                }
                Column::Known(policy) => {
                    let entry = match self.compute_cell(employee_id, policy, employee_deferrals) {
                        Ok(computation) => {
                            warnings.extend(computation.audit_trace.warnings);
                            BalanceEntry::Available(computation.balance)
                        }
                        Err(error) => {
                            warn!(
                                employee_id,
                                leave_type_id = %policy.id,
                                error = %error,
                                "Balance unavailable"
                            );
                            BalanceEntry::unavailable(&error)
                        }
                    };
                    (policy.id.clone(), entry)
                }
            };
            balances.insert(key, entry);
        }

        let deferral_log = employee_deferrals
            .iter()
            .copied()
            .min_by(|a, b| {
                a.leave_type_id
                    .is_some()
                    .cmp(&b.leave_type_id.is_some())
                    .then_with(|| a.id.cmp(&b.id))
            })
            .map(DeferralRow::to_log);

        EmployeeBalanceRow {
            employee_id: employee_id.to_string(),
            year: self.year,
            balances,
            deferral_log,
            warnings,
        }
    }

    fn compute_cell(
        &self,
        employee_id: &str,
        policy: &LeaveType,
        employee_deferrals: &[&DeferralRow],
    ) -> EngineResult<BalanceComputation> {
        let entitlement = self
            .entitlements
            .get(employee_id)
            .and_then(|by_type| by_type.get(policy.id.as_str()))
            .copied();

        let deferral = select_deferral(employee_deferrals.iter().copied(), &policy.id)
            .map(DeferralRow::to_log);

        let requests = self.requests.as_ref().map(|index| {
            index
                .get(employee_id)
                .and_then(|by_type| by_type.get(&policy.id))
                .map(Vec::as_slice)
                .unwrap_or(NO_REQUESTS)
        });

        calculate_balance(&BalanceInputs {
            policy,
            target_year: self.year,
            entitlement,
            deferral: deferral.as_ref(),
            requests,
        })
    }
}

fn distinct(employee_ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    employee_ids
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}

fn select_columns<'a>(
    leave_types: &'a [LeaveType],
    selection: &'a LeaveTypeSelection,
) -> Vec<Column<'a>> {
    match selection {
        LeaveTypeSelection::All => leave_types.iter().map(Column::Known).collect(),
        LeaveTypeSelection::Only(ids) => {
            let mut seen = HashSet::new();
            ids.iter()
                .filter(|id| seen.insert(id.as_str()))
                .map(|id| match LeaveType::find(leave_types, id) {
                    Some(policy) => Column::Known(policy),
                    None => Column::Unknown(id.as_str()),
                })
                .collect()
        }
    }
}
