use crate::domain::coupon::{Coupon, CouponStatus};
use crate::domain::joblog::JobLog;
use crate::domain::ports::{JobLogStore, LedgerStore};
use crate::error::{CouponError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use std::path::Path;
use std::sync::Arc;

/// Column Family for coupon ledger records.
pub const CF_COUPONS: &str = "coupons";
/// Column Family for batch job run records.
pub const CF_JOB_LOGS: &str = "job_logs";

/// A persistent store implementation using RocksDB.
///
/// Handles storage for both `Coupon` and `JobLog` records using separate
/// Column Families, with JSON values keyed by the record id.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families ("coupons" and "job_logs") exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_coupons = ColumnFamilyDescriptor::new(CF_COUPONS, Options::default());
        let cf_job_logs = ColumnFamilyDescriptor::new(CF_JOB_LOGS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_coupons, cf_job_logs])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            CouponError::StorageError(format!("{name} column family not found").into())
        })
    }
}

#[async_trait]
impl LedgerStore for RocksDBStore {
    async fn find_by_id(&self, coupon_id: &str) -> Result<Option<Coupon>> {
        let cf = self.cf(CF_COUPONS)?;
        match self.db.get_cf(cf, coupon_id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn find_expired_before(&self, date: NaiveDate) -> Result<Vec<Coupon>> {
        let cf = self.cf(CF_COUPONS)?;
        let mut expired = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            let coupon: Coupon = serde_json::from_slice(&value)?;
            if coupon.status == CouponStatus::Active && coupon.expiry_date < date {
                expired.push(coupon);
            }
        }
        Ok(expired)
    }

    async fn find_all(&self) -> Result<Vec<Coupon>> {
        let cf = self.cf(CF_COUPONS)?;
        let mut coupons = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            coupons.push(serde_json::from_slice(&value)?);
        }
        Ok(coupons)
    }

    async fn save(&self, coupon: Coupon) -> Result<()> {
        let cf = self.cf(CF_COUPONS)?;
        let value = serde_json::to_vec(&coupon)?;
        self.db.put_cf(cf, coupon.coupon_id.as_bytes(), value)?;
        Ok(())
    }

    async fn save_all(&self, coupons: Vec<Coupon>) -> Result<()> {
        let cf = self.cf(CF_COUPONS)?;
        // one write batch so the ledger never sees a half-persisted run
        let mut batch = WriteBatch::default();
        for coupon in &coupons {
            batch.put_cf(cf, coupon.coupon_id.as_bytes(), serde_json::to_vec(coupon)?);
        }
        self.db.write(batch)?;
        Ok(())
    }
}

#[async_trait]
impl JobLogStore for RocksDBStore {
    async fn save(&self, log: JobLog) -> Result<()> {
        let cf = self.cf(CF_JOB_LOGS)?;
        let value = serde_json::to_vec(&log)?;
        self.db.put_cf(cf, log.log_id.as_bytes(), value)?;
        Ok(())
    }

    async fn find_by_id(&self, log_id: &str) -> Result<Option<JobLog>> {
        let cf = self.cf(CF_JOB_LOGS)?;
        match self.db.get_cf(cf, log_id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}
