use super::coupon::{Balance, Coupon};
use super::joblog::JobLog;
use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;

/// Permanent record store for coupons.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn find_by_id(&self, coupon_id: &str) -> Result<Option<Coupon>>;
    /// Active coupons whose expiry date lies strictly before `date`.
    async fn find_expired_before(&self, date: NaiveDate) -> Result<Vec<Coupon>>;
    async fn find_all(&self) -> Result<Vec<Coupon>>;
    async fn save(&self, coupon: Coupon) -> Result<()>;
    /// Persists the whole batch; either all records land or the call fails.
    async fn save_all(&self, coupons: Vec<Coupon>) -> Result<()>;
}

/// Proof of lock ownership handed out by [`LockService::try_acquire`].
///
/// The fencing token grows monotonically per key, so a release carrying a
/// stale token can never free a lock that was re-acquired after the holder's
/// lease ran out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockToken {
    pub key: String,
    pub fencing_token: u64,
}

/// Mutual exclusion keyed by coupon, with a bounded wait and a lease.
#[async_trait]
pub trait LockService: Send + Sync {
    /// Tries to take the lock, waiting at most `wait`. Returns `None` when the
    /// lock could not be acquired in time. A granted lock stays valid for
    /// `lease` unless released earlier.
    async fn try_acquire(
        &self,
        key: &str,
        wait: Duration,
        lease: Duration,
    ) -> Result<Option<LockToken>>;
    /// Releases the lock if `token` still matches the current holder.
    async fn release(&self, token: LockToken) -> Result<()>;
    /// Whether `token` still identifies the live holder of its key.
    async fn is_held(&self, token: &LockToken) -> Result<bool>;
}

/// Volatile balance store consulted during reservation.
#[async_trait]
pub trait BalanceCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Balance>>;
    async fn set(&self, key: &str, value: Balance, ttl: Duration) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Store for batch job run records.
#[async_trait]
pub trait JobLogStore: Send + Sync {
    async fn save(&self, log: JobLog) -> Result<()>;
    async fn find_by_id(&self, log_id: &str) -> Result<Option<JobLog>>;
}

pub type DynLedgerStore = Arc<dyn LedgerStore>;
pub type DynLockService = Arc<dyn LockService>;
pub type DynBalanceCache = Arc<dyn BalanceCache>;
pub type DynJobLogStore = Arc<dyn JobLogStore>;
