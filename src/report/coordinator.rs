//! Last-request-wins coordination of report builds.
//!
//! When a caller changes its filter while a report is still loading, the
//! older build must not finish and overwrite the newer result.
//! [`ReportCoordinator`] numbers every build and cancels any build that has
//! been overtaken by a newer one.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};
use crate::models::EmployeeBalanceRow;

use super::assembler::{BalanceReportAssembler, LeaveTypeSelection};

/// Runs report builds so that only the most recent one completes.
///
/// Clones share the same generation counter, so one coordinator should be
/// used per independent consumer (e.g., one per UI session).
#[derive(Clone)]
pub struct ReportCoordinator {
    assembler: BalanceReportAssembler,
    latest: Arc<AtomicU64>,
    announce: Arc<watch::Sender<u64>>,
}

impl ReportCoordinator {
    /// Creates a coordinator around an assembler.
    pub fn new(assembler: BalanceReportAssembler) -> Self {
        let (announce, _) = watch::channel(0);
        Self {
            assembler,
            latest: Arc::new(AtomicU64::new(0)),
            announce: Arc::new(announce),
        }
    }

    /// Returns the generation number of the most recently started build.
    pub fn latest_generation(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// Builds a report, cancelling it if a newer build starts first.
    ///
    /// Starting a build immediately supersedes every build still in flight.
    ///
    /// # Errors
    ///
    /// Returns `Superseded` if a newer build started before this one
    /// completed, and otherwise whatever the assembler returns.
    pub async fn build_latest(
        &self,
        employee_ids: &[String],
        year: i32,
        selection: &LeaveTypeSelection,
    ) -> EngineResult<Vec<EmployeeBalanceRow>> {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let mut superseded = self.announce.subscribe();
        self.announce.send_if_modified(|announced| {
            let newer = generation > *announced;
            if newer {
                *announced = generation;
            }
            newer
        });
        debug!(generation, "Report build started");

        let result = tokio::select! {
            result = self.assembler.build_report(employee_ids, year, selection) => result,
            _ = wait_for_newer(&mut superseded, generation) => {
                info!(generation, "Report build cancelled by a newer request");
                return Err(EngineError::Superseded { generation });
            }
        };

        // A newer build may have started after the last poll of the watcher.
        if self.latest_generation() != generation {
            info!(generation, "Discarding result of superseded report build");
            return Err(EngineError::Superseded { generation });
        }

        result
    }
}

async fn wait_for_newer(receiver: &mut watch::Receiver<u64>, generation: u64) {
    loop {
        if *receiver.borrow_and_update() > generation {
            return;
        }
        if receiver.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DeferralLog, DeferralRow, EntitlementRow, LeaveType, RequestRow};
    use crate::store::{
        DeferralLedger, EntitlementStore, InMemoryLeaveStore, LeaveSnapshot, LeaveStores,
        LeaveTypeCatalog, RequestLedger,
    };
    use async_trait::async_trait;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;

    /// Delays only the first catalog read, making the first build slow.
    struct SlowFirstStore {
        inner: InMemoryLeaveStore,
        first: AtomicBool,
    }

    #[async_trait]
    impl LeaveTypeCatalog for SlowFirstStore {
        async fn get_leave_types(&self) -> EngineResult<Vec<LeaveType>> {
            if self.first.swap(false, Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_millis(300)).await;
            }
            self.inner.get_leave_types().await
        }
    }

    #[async_trait]
    impl EntitlementStore for SlowFirstStore {
        async fn get_entitlement(
            &self,
            employee_id: &str,
            year: i32,
            leave_type_id: &str,
        ) -> EngineResult<Option<EntitlementRow>> {
            self.inner
                .get_entitlement(employee_id, year, leave_type_id)
                .await
        }

        async fn get_entitlements(
            &self,
            employee_ids: &[String],
            year: i32,
        ) -> EngineResult<Vec<EntitlementRow>> {
            self.inner.get_entitlements(employee_ids, year).await
        }
    }

    #[async_trait]
    impl DeferralLedger for SlowFirstStore {
        async fn get_deferral_into_year(
            &self,
            employee_id: &str,
            year: i32,
            leave_type_id: &str,
        ) -> EngineResult<Option<DeferralLog>> {
            self.inner
                .get_deferral_into_year(employee_id, year, leave_type_id)
                .await
        }

        async fn get_deferrals_into_year(
            &self,
            employee_ids: &[String],
            year: i32,
        ) -> EngineResult<Vec<DeferralRow>> {
            self.inner.get_deferrals_into_year(employee_ids, year).await
        }
    }

    #[async_trait]
    impl RequestLedger for SlowFirstStore {
        async fn get_requests(
            &self,
            employee_id: &str,
            leave_type_id: &str,
            since_year: i32,
        ) -> EngineResult<Vec<RequestRow>> {
            self.inner
                .get_requests(employee_id, leave_type_id, since_year)
                .await
        }

        async fn get_requests_for(
            &self,
            employee_ids: &[String],
            since_year: i32,
        ) -> EngineResult<Vec<RequestRow>> {
            self.inner.get_requests_for(employee_ids, since_year).await
        }
    }

    fn coordinator(slow_first: bool) -> ReportCoordinator {
        let store = SlowFirstStore {
            inner: InMemoryLeaveStore::new(LeaveSnapshot {
                leave_types: Some(vec![LeaveType {
                    id: "annual".to_string(),
                    name: "Annual Leave".to_string(),
                    default_days: 12,
                    can_defer: true,
                    max_days: None,
                }]),
                ..LeaveSnapshot::default()
            }),
            first: AtomicBool::new(slow_first),
        };
        let assembler = BalanceReportAssembler::new(LeaveStores::from_shared(Arc::new(store)));
        ReportCoordinator::new(assembler)
    }

    #[tokio::test]
    async fn test_single_build_completes() {
        let coordinator = coordinator(false);
        let rows = coordinator
            .build_latest(&["emp_001".to_string()], 2025, &LeaveTypeSelection::All)
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(coordinator.latest_generation(), 1);
    }

    #[tokio::test]
    async fn test_newer_build_cancels_older_one() {
        let coordinator = coordinator(true);
        let first_ids = vec!["emp_001".to_string()];
        let second_ids = vec!["emp_002".to_string()];

        let first = coordinator.build_latest(&first_ids, 2025, &LeaveTypeSelection::All);
        let second = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            coordinator
                .build_latest(&second_ids, 2025, &LeaveTypeSelection::All)
                .await
        };

        let (first, second) = tokio::join!(first, second);

        match first {
            Err(EngineError::Superseded { generation }) => assert_eq!(generation, 1),
            other => panic!("Expected Superseded, got {:?}", other),
        }
        let rows = second.unwrap();
        assert_eq!(rows[0].employee_id, "emp_002");
        assert_eq!(coordinator.latest_generation(), 2);
    }

    #[tokio::test]
    async fn test_sequential_builds_both_complete() {
        let coordinator = coordinator(false);
        let ids = vec!["emp_001".to_string()];

        assert!(
            coordinator
                .build_latest(&ids, 2025, &LeaveTypeSelection::All)
                .await
                .is_ok()
        );
        assert!(
            coordinator
                .build_latest(&ids, 2025, &LeaveTypeSelection::All)
                .await
                .is_ok()
        );
    }
}
