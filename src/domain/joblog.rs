use crate::error::{CouponError, Result};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Kind of batch job a run log belongs to.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    CouponExpiry,
    Settlement,
    Cleanup,
    /// Catch-all for records written by newer deployments.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Running,
    Completed,
    Failed,
}

/// Run record of one batch job execution.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct JobLog {
    pub log_id: String,
    pub job_name: String,
    pub kind: JobKind,
    pub status: JobStatus,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub processed_count: usize,
    pub success_count: usize,
    pub error_count: usize,
    pub error_message: Option<String>,
    /// Free-form job parameters, recorded for auditability.
    pub parameters: serde_json::Value,
}

impl JobLog {
    /// Opens a run record in the `Running` state.
    pub fn start(
        log_id: impl Into<String>,
        job_name: impl Into<String>,
        kind: JobKind,
        parameters: serde_json::Value,
    ) -> Result<Self> {
        let job_name = job_name.into();
        if job_name.trim().is_empty() {
            return Err(CouponError::ValidationError(
                "job name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            log_id: log_id.into(),
            job_name,
            kind,
            status: JobStatus::Running,
            started_at: Utc::now(),
            ended_at: None,
            processed_count: 0,
            success_count: 0,
            error_count: 0,
            error_message: None,
            parameters,
        })
    }

    /// Closes the run as completed with its final counters.
    pub fn complete(&mut self, processed: usize, success: usize, error: usize) -> Result<()> {
        if success + error != processed {
            return Err(CouponError::ValidationError(format!(
                "job counters do not add up: processed={processed}, success={success}, error={error}"
            )));
        }
        self.status = JobStatus::Completed;
        self.ended_at = Some(Utc::now());
        self.processed_count = processed;
        self.success_count = success;
        self.error_count = error;
        Ok(())
    }

    /// Closes the run as failed.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = JobStatus::Failed;
        self.ended_at = Some(Utc::now());
        self.error_message = Some(message.into());
    }

    /// Wall-clock duration of the run, once it has ended.
    pub fn duration(&self) -> Option<TimeDelta> {
        self.ended_at.map(|ended| ended - self.started_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn running_log() -> JobLog {
        JobLog::start("log-1", "coupon expiry", JobKind::CouponExpiry, json!({})).unwrap()
    }

    #[test]
    fn test_start_opens_running_record() {
        let log = running_log();
        assert_eq!(log.status, JobStatus::Running);
        assert_eq!(log.processed_count, 0);
        assert!(log.ended_at.is_none());
        assert!(log.duration().is_none());
    }

    #[test]
    fn test_start_rejects_blank_name() {
        let result = JobLog::start("log-1", "  ", JobKind::Cleanup, json!({}));
        assert!(matches!(result, Err(CouponError::ValidationError(_))));
    }

    #[test]
    fn test_complete_records_counters() {
        let mut log = running_log();
        log.complete(10, 8, 2).unwrap();
        assert_eq!(log.status, JobStatus::Completed);
        assert_eq!(log.processed_count, 10);
        assert_eq!(log.success_count, 8);
        assert_eq!(log.error_count, 2);
        assert!(log.ended_at.is_some());
        assert!(log.duration().is_some());
    }

    #[test]
    fn test_complete_rejects_mismatched_counters() {
        let mut log = running_log();
        let result = log.complete(10, 8, 1);
        assert!(matches!(result, Err(CouponError::ValidationError(_))));
        assert_eq!(log.status, JobStatus::Running);
    }

    #[test]
    fn test_fail_records_message() {
        let mut log = running_log();
        log.fail("ledger unavailable");
        assert_eq!(log.status, JobStatus::Failed);
        assert_eq!(log.error_message.as_deref(), Some("ledger unavailable"));
        assert!(log.ended_at.is_some());
    }

    #[test]
    fn test_unknown_kind_is_tolerated() {
        let kind: JobKind = serde_json::from_str("\"points_accrual\"").unwrap();
        assert_eq!(kind, JobKind::Unknown);
        let kind: JobKind = serde_json::from_str("\"coupon_expiry\"").unwrap();
        assert_eq!(kind, JobKind::CouponExpiry);
    }
}
