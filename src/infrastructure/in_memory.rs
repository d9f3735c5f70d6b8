use crate::domain::coupon::{Coupon, CouponStatus};
use crate::domain::joblog::JobLog;
use crate::domain::ports::{JobLogStore, LedgerStore};
use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory coupon ledger.
///
/// Uses `Arc<RwLock<HashMap<String, Coupon>>>` to allow shared concurrent access.
/// Ideal for testing or single-run batches where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryLedgerStore {
    coupons: Arc<RwLock<HashMap<String, Coupon>>>,
}

impl InMemoryLedgerStore {
    /// Creates a new, empty in-memory ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn find_by_id(&self, coupon_id: &str) -> Result<Option<Coupon>> {
        let coupons = self.coupons.read().await;
        Ok(coupons.get(coupon_id).cloned())
    }

    async fn find_expired_before(&self, date: NaiveDate) -> Result<Vec<Coupon>> {
        let coupons = self.coupons.read().await;
        Ok(coupons
            .values()
            .filter(|c| c.status == CouponStatus::Active && c.expiry_date < date)
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> Result<Vec<Coupon>> {
        let coupons = self.coupons.read().await;
        Ok(coupons.values().cloned().collect())
    }

    async fn save(&self, coupon: Coupon) -> Result<()> {
        let mut coupons = self.coupons.write().await;
        coupons.insert(coupon.coupon_id.clone(), coupon);
        Ok(())
    }

    async fn save_all(&self, batch: Vec<Coupon>) -> Result<()> {
        let mut coupons = self.coupons.write().await;
        for coupon in batch {
            coupons.insert(coupon.coupon_id.clone(), coupon);
        }
        Ok(())
    }
}

/// A thread-safe in-memory store for batch job run records.
#[derive(Default, Clone)]
pub struct InMemoryJobLogStore {
    logs: Arc<RwLock<HashMap<String, JobLog>>>,
}

impl InMemoryJobLogStore {
    /// Creates a new, empty in-memory job log store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record currently held, in no particular order.
    pub async fn all(&self) -> Vec<JobLog> {
        let logs = self.logs.read().await;
        logs.values().cloned().collect()
    }
}

#[async_trait]
impl JobLogStore for InMemoryJobLogStore {
    async fn save(&self, log: JobLog) -> Result<()> {
        let mut logs = self.logs.write().await;
        logs.insert(log.log_id.clone(), log);
        Ok(())
    }

    async fn find_by_id(&self, log_id: &str) -> Result<Option<JobLog>> {
        let logs = self.logs.read().await;
        Ok(logs.get(log_id).cloned())
    }
}
