use crate::domain::joblog::{JobKind, JobLog};
use crate::domain::ports::DynJobLogStore;
use crate::error::{CouponError, Result};
use tracing::debug;
use uuid::Uuid;

/// Records the lifecycle of batch job runs.
#[derive(Clone)]
pub struct JobLogService {
    store: DynJobLogStore,
}

impl JobLogService {
    pub fn new(store: DynJobLogStore) -> Self {
        Self { store }
    }

    /// Opens a new run record and persists it in the `Running` state.
    pub async fn start_job(
        &self,
        kind: JobKind,
        job_name: &str,
        parameters: serde_json::Value,
    ) -> Result<JobLog> {
        let log = JobLog::start(Uuid::new_v4().to_string(), job_name, kind, parameters)?;
        self.store.save(log.clone()).await?;
        debug!(log_id = %log.log_id, job_name, "batch job started");
        Ok(log)
    }

    /// Marks a run as completed with its final counters.
    pub async fn complete_job(
        &self,
        log_id: &str,
        processed: usize,
        success: usize,
        error: usize,
    ) -> Result<()> {
        let mut log = self.find(log_id).await?;
        log.complete(processed, success, error)?;
        self.store.save(log).await?;
        debug!(log_id, processed, success, error, "batch job completed");
        Ok(())
    }

    /// Marks a run as failed with the fatal error message.
    pub async fn fail_job(&self, log_id: &str, message: String) -> Result<()> {
        let mut log = self.find(log_id).await?;
        log.fail(message);
        self.store.save(log).await?;
        debug!(log_id, "batch job marked failed");
        Ok(())
    }

    async fn find(&self, log_id: &str) -> Result<JobLog> {
        self.store
            .find_by_id(log_id)
            .await?
            .ok_or_else(|| CouponError::ValidationError(format!("job log not found: {log_id}")))
    }
}
