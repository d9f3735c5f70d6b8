use crate::application::coordinator::BalanceCoordinator;
use crate::application::joblog::JobLogService;
use crate::domain::coupon::{Balance, Coupon};
use crate::domain::expiry::ExpiryResult;
use crate::domain::joblog::JobKind;
use crate::domain::ports::DynLedgerStore;
use crate::error::{CouponError, Result};
use chrono::{NaiveDate, Utc};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Name under which expiry runs appear in the job log.
const JOB_NAME: &str = "coupon expiry";

/// Nightly sweep that retires coupons past their expiry date.
///
/// Eligible coupons are expired one by one so a single bad record cannot
/// block the rest of the batch; the mutated records are then persisted in a
/// single bulk save. Only that bulk save (or the initial query) can fail the
/// whole run.
pub struct ExpiryBatchProcessor {
    ledger: DynLedgerStore,
    balance: Arc<BalanceCoordinator>,
    job_log: JobLogService,
}

impl ExpiryBatchProcessor {
    pub fn new(
        ledger: DynLedgerStore,
        balance: Arc<BalanceCoordinator>,
        job_log: JobLogService,
    ) -> Self {
        Self {
            ledger,
            balance,
            job_log,
        }
    }

    /// Runs the sweep as of today (UTC).
    pub async fn process_expired_coupons(&self) -> Result<ExpiryResult> {
        self.process_expired_as_of(Utc::now().date_naive()).await
    }

    /// Runs the sweep as of an explicit date. Coupons whose expiry date lies
    /// strictly before `as_of` are eligible; the expiry day itself is not.
    pub async fn process_expired_as_of(&self, as_of: NaiveDate) -> Result<ExpiryResult> {
        info!(%as_of, "starting coupon expiry batch");
        let log = self
            .job_log
            .start_job(JobKind::CouponExpiry, JOB_NAME, json!({"as_of": as_of}))
            .await?;
        let log_id = log.log_id;

        let eligible = match self.ledger.find_expired_before(as_of).await {
            Ok(eligible) => eligible,
            Err(err) => {
                error!(%err, "expired coupon query failed");
                self.mark_failed(&log_id, &err).await;
                return Err(err);
            }
        };

        if eligible.is_empty() {
            info!("no expired coupons to process");
            self.job_log.complete_job(&log_id, 0, 0, 0).await?;
            return Ok(ExpiryResult::empty());
        }
        info!(count = eligible.len(), "retiring expired coupons");

        let result = match self.expire_all(eligible).await {
            Ok(result) => result,
            Err(err) => {
                self.mark_failed(&log_id, &err).await;
                return Err(err);
            }
        };

        self.job_log
            .complete_job(
                &log_id,
                result.total_count(),
                result.success_count(),
                result.error_count(),
            )
            .await?;
        self.log_statistics(&result);
        Ok(result)
    }

    /// Expires each coupon in isolation, then persists the whole batch.
    async fn expire_all(&self, coupons: Vec<Coupon>) -> Result<ExpiryResult> {
        let mut success_count = 0;
        let mut error_count = 0;
        let mut total_expired_amount = Balance::ZERO;
        let mut error_messages = Vec::new();
        let mut retired = Vec::new();

        for mut coupon in coupons {
            let coupon_id = coupon.coupon_id.clone();
            match coupon.force_expire("past expiry date") {
                Ok(forfeited) => {
                    // stale cache entries must not survive the coupon
                    if let Err(err) = self.balance.clear_balance(&coupon_id).await {
                        warn!(coupon_id, %err, "could not clear cached balance of expired coupon");
                    }
                    total_expired_amount += forfeited;
                    success_count += 1;
                    debug!(coupon_id, %forfeited, "retired expired coupon");
                    retired.push(coupon);
                }
                Err(err) => {
                    error_count += 1;
                    error!(coupon_id, %err, "could not expire coupon");
                    error_messages.push(format!("coupon {coupon_id}: {err}"));
                }
            }
        }

        if !retired.is_empty() {
            self.ledger.save_all(retired).await?;
        }

        Ok(ExpiryResult::new(
            success_count,
            error_count,
            total_expired_amount,
            error_messages,
        ))
    }

    async fn mark_failed(&self, log_id: &str, err: &CouponError) {
        if let Err(log_err) = self.job_log.fail_job(log_id, err.to_string()).await {
            warn!(log_id, %log_err, "could not record batch failure in job log");
        }
    }

    fn log_statistics(&self, result: &ExpiryResult) {
        if !result.has_processed_items() {
            return;
        }
        info!(
            total = result.total_count(),
            success = result.success_count(),
            errors = result.error_count(),
            forfeited = %result.total_expired_amount(),
            average = %result.average_expired_amount(),
            success_rate = result.success_rate(),
            "coupon expiry batch finished"
        );
        for message in result.error_messages() {
            warn!("{message}");
        }
    }
}
