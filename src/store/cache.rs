//! Leave type catalog caching using Moka.
//!
//! Leave types change rarely, while every balance computation reads them.
//! [`CachedLeaveTypeCatalog`] keeps the full type list for a bounded time in
//! front of any [`LeaveTypeCatalog`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::LeaveType;

use super::LeaveTypeCatalog;

/// Default time-to-live for the cached type list (5 minutes).
pub const DEFAULT_TTL_SECS: u64 = 300;

/// A [`LeaveTypeCatalog`] that caches its inner catalog's answer.
///
/// The cache holds a single entry: the whole type list. It is served for at
/// most `ttl` after it was loaded; [`invalidate`](Self::invalidate) drops it
/// immediately. Concurrent misses share one load of the inner catalog.
/// Errors from the inner catalog are returned as-is and never cached.
#[derive(Clone)]
pub struct CachedLeaveTypeCatalog {
    inner: Arc<dyn LeaveTypeCatalog>,
    cache: Cache<(), Arc<Vec<LeaveType>>>,
}

impl CachedLeaveTypeCatalog {
    /// Creates a cache with default settings (5 minute TTL).
    pub fn new(inner: Arc<dyn LeaveTypeCatalog>) -> Self {
        Self::with_ttl(inner, DEFAULT_TTL_SECS)
    }

    /// Creates a cache whose list expires `ttl_secs` after loading.
    pub fn with_ttl(inner: Arc<dyn LeaveTypeCatalog>, ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { inner, cache }
    }

    /// Drops the cached type list.
    pub fn invalidate(&self) {
        self.cache.invalidate_all();
    }

    /// Returns the number of entries currently in the cache.
    pub async fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }
}

#[async_trait]
impl LeaveTypeCatalog for CachedLeaveTypeCatalog {
    async fn get_leave_types(&self) -> EngineResult<Vec<LeaveType>> {
        let types = self
            .cache
            .try_get_with((), async {
                debug!("Leave type cache miss");
                self.inner.get_leave_types().await.map(Arc::new)
            })
            .await
            .map_err(|err: Arc<EngineError>| err.as_ref().clone())?;

        debug!(count = types.len(), "Leave types served");
        Ok(types.as_ref().clone())
    }
}
