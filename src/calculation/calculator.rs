//! Store-backed balance calculation for a single employee and leave type.

use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{LeaveType, RequestRow, deferral_source_year};
use crate::store::LeaveStores;

use super::balance::{BalanceComputation, BalanceInputs, calculate_balance};

/// Computes balances by reading the stores and running [`calculate_balance`].
///
/// All store lookups for one computation are issued concurrently and joined
/// before the calculation runs; a failure in any of them fails the whole
/// computation with the store's error.
#[derive(Clone)]
pub struct BalanceCalculator {
    stores: LeaveStores,
}

impl BalanceCalculator {
    /// Creates a calculator over the given stores.
    pub fn new(stores: LeaveStores) -> Self {
        Self { stores }
    }

    /// Computes the balance of `employee_id` for `leave_type_id` in `target_year`.
    ///
    /// # Errors
    ///
    /// - `DataUnavailable` if any store cannot be read
    /// - `LeaveTypeNotFound` if the catalog does not know `leave_type_id`
    /// - `CalculationError` if a sum overflows
    pub async fn calculate(
        &self,
        employee_id: &str,
        leave_type_id: &str,
        target_year: i32,
    ) -> EngineResult<BalanceComputation> {
        let since_year = deferral_source_year(target_year)?;

        let (leave_types, entitlement, deferral, requests) = tokio::try_join!(
            self.stores.catalog.get_leave_types(),
            self.stores
                .entitlements
                .get_entitlement(employee_id, target_year, leave_type_id),
            self.stores
                .deferrals
                .get_deferral_into_year(employee_id, target_year, leave_type_id),
            self.load_requests(employee_id, leave_type_id, since_year),
        )?;

        let policy = LeaveType::find(&leave_types, leave_type_id).ok_or_else(|| {
            EngineError::LeaveTypeNotFound {
                id: leave_type_id.to_string(),
            }
        })?;

        let computation = calculate_balance(&BalanceInputs {
            policy,
            target_year,
            entitlement: entitlement.as_ref(),
            deferral: deferral.as_ref(),
            requests: requests.as_deref(),
        })?;

        debug!(
            employee_id,
            leave_type_id,
            target_year,
            remaining = computation.balance.remaining,
            "Balance computed"
        );

        Ok(computation)
    }

    async fn load_requests(
        &self,
        employee_id: &str,
        leave_type_id: &str,
        since_year: i32,
    ) -> EngineResult<Option<Vec<RequestRow>>> {
        match &self.stores.requests {
            Some(ledger) => ledger
                .get_requests(employee_id, leave_type_id, since_year)
                .await
                .map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Balance, DeferralLog, DeferralRow, EntitlementRow, RawQuotaYear};
    use crate::store::{
        DeferralLedger, EntitlementStore, InMemoryLeaveStore, LeaveSnapshot, LeaveTypeCatalog,
    };
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn annual(can_defer: bool) -> LeaveType {
        LeaveType {
            id: "annual".to_string(),
            name: "Annual Leave".to_string(),
            default_days: 12,
            can_defer,
            max_days: None,
        }
    }

    fn request(days: i32, year: i32) -> RequestRow {
        RequestRow {
            id: None,
            employee_id: "emp_001".to_string(),
            leave_type_id: "annual".to_string(),
            days_requested: days,
            leave_quota_year: Some(RawQuotaYear::Year(year)),
            start_date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
        }
    }

    fn scenario_store(can_defer: bool) -> Arc<InMemoryLeaveStore> {
        Arc::new(InMemoryLeaveStore::new(LeaveSnapshot {
            leave_types: Some(vec![annual(can_defer)]),
            entitlements: vec![],
            deferrals: vec![DeferralRow {
                id: "def_2024".to_string(),
                employee_id: "emp_001".to_string(),
                year: 2024,
                days_deferred: 3,
                leave_type_id: None,
            }],
            requests: vec![request(5, 2025), request(2, 2024), request(3, 2022)],
        }))
    }

    struct OfflineEntitlements;

    #[async_trait]
    impl EntitlementStore for OfflineEntitlements {
        async fn get_entitlement(
            &self,
            _employee_id: &str,
            _year: i32,
            _leave_type_id: &str,
        ) -> EngineResult<Option<EntitlementRow>> {
            Err(EngineError::unavailable("entitlements", "connection refused"))
        }

        async fn get_entitlements(
            &self,
            _employee_ids: &[String],
            _year: i32,
        ) -> EngineResult<Vec<EntitlementRow>> {
            Err(EngineError::unavailable("entitlements", "connection refused"))
        }
    }

    struct OfflineDeferrals;

    #[async_trait]
    impl DeferralLedger for OfflineDeferrals {
        async fn get_deferral_into_year(
            &self,
            _employee_id: &str,
            _year: i32,
            _leave_type_id: &str,
        ) -> EngineResult<Option<DeferralLog>> {
            Err(EngineError::unavailable("deferrals", "timed out"))
        }

        async fn get_deferrals_into_year(
            &self,
            _employee_ids: &[String],
            _year: i32,
        ) -> EngineResult<Vec<DeferralRow>> {
            Err(EngineError::unavailable("deferrals", "timed out"))
        }
    }

    #[tokio::test]
    async fn test_calculates_from_stores() {
        let calculator = BalanceCalculator::new(LeaveStores::from_shared(scenario_store(true)));
        let result = calculator.calculate("emp_001", "annual", 2025).await.unwrap();

        assert_eq!(
            result.balance,
            Balance {
                total: 12,
                deferred: 3,
                used_current: 5,
                used_deferred: 2,
                used: 7,
                remaining: 8,
            }
        );
    }

    #[tokio::test]
    async fn test_non_deferrable_type_ignores_ledger() {
        let calculator = BalanceCalculator::new(LeaveStores::from_shared(scenario_store(false)));
        let result = calculator.calculate("emp_001", "annual", 2025).await.unwrap();
        assert_eq!(result.balance.deferred, 0);
    }

    #[tokio::test]
    async fn test_unknown_leave_type_is_an_error() {
        let calculator = BalanceCalculator::new(LeaveStores::from_shared(scenario_store(true)));
        let result = calculator.calculate("emp_001", "sabbatical", 2025).await;
        match result {
            Err(EngineError::LeaveTypeNotFound { id }) => assert_eq!(id, "sabbatical"),
            other => panic!("Expected LeaveTypeNotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_store_is_not_a_zero_balance() {
        let store = scenario_store(true);
        let stores = LeaveStores::new(
            store.clone() as Arc<dyn LeaveTypeCatalog>,
            Arc::new(OfflineEntitlements),
            store.clone() as Arc<dyn DeferralLedger>,
            Some(store),
        );
        let calculator = BalanceCalculator::new(stores);

        let result = calculator.calculate("emp_001", "annual", 2025).await;
        match result {
            Err(EngineError::DataUnavailable { store, .. }) => assert_eq!(store, "entitlements"),
            other => panic!("Expected DataUnavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_deferral_ledger_is_not_a_zero_deferral() {
        let store = scenario_store(true);
        let stores = LeaveStores::new(
            store.clone() as Arc<dyn LeaveTypeCatalog>,
            store.clone() as Arc<dyn EntitlementStore>,
            Arc::new(OfflineDeferrals),
            Some(store),
        );
        let calculator = BalanceCalculator::new(stores);

        let result = calculator.calculate("emp_001", "annual", 2025).await;
        match result {
            Err(EngineError::DataUnavailable { store, message }) => {
                assert_eq!(store, "deferrals");
                assert_eq!(message, "timed out");
            }
            other => panic!("Expected DataUnavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_minimum_target_year_is_a_calculation_error() {
        let calculator = BalanceCalculator::new(LeaveStores::from_shared(scenario_store(true)));
        let result = calculator.calculate("emp_001", "annual", i32::MIN).await;
        assert!(matches!(result, Err(EngineError::CalculationError { .. })));
    }

    #[tokio::test]
    async fn test_without_request_ledger_uses_cached_used_days() {
        let store = Arc::new(InMemoryLeaveStore::new(LeaveSnapshot {
            leave_types: Some(vec![annual(true)]),
            entitlements: vec![EntitlementRow {
                employee_id: "emp_001".to_string(),
                year: 2025,
                leave_type_id: "annual".to_string(),
                total_days: 14,
                deferred_days: 2,
                used_days: 4,
            }],
            deferrals: vec![],
            requests: vec![request(9, 2025)],
        }));
        let stores = LeaveStores::from_shared(store).without_request_ledger();
        let calculator = BalanceCalculator::new(stores);

        let result = calculator.calculate("emp_001", "annual", 2025).await.unwrap();
        assert_eq!(result.balance.used_current, 4);
        assert_eq!(result.balance.deferred, 2);
        assert_eq!(result.balance.remaining, 12);
    }
}
