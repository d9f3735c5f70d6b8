use chrono::{Datelike, Utc};
use std::sync::atomic::{AtomicI32, AtomicU64, Ordering};
use tracing::info;

/// Lock-free reservation counters, kept per process.
///
/// Lifetime totals grow forever; the daily counters reset the first time a
/// reservation is recorded on a new calendar day (UTC). `lock_failures` is a
/// subset of `failed`, split out because it points at contention rather than
/// spent coupons.
#[derive(Debug)]
pub struct ReservationStats {
    total: AtomicU64,
    successful: AtomicU64,
    failed: AtomicU64,
    lock_failures: AtomicU64,
    /// Day ordinal the daily counters belong to.
    today: AtomicI32,
    today_total: AtomicU64,
    today_successful: AtomicU64,
}

/// Point-in-time copy of the counters with derived rates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsSnapshot {
    pub total: u64,
    pub successful: u64,
    pub failed: u64,
    pub lock_failures: u64,
    pub success_rate: f64,
    pub today_total: u64,
    pub today_successful: u64,
    pub today_success_rate: f64,
}

fn current_day() -> i32 {
    Utc::now().date_naive().num_days_from_ce()
}

fn rate(successful: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    successful as f64 / total as f64 * 100.0
}

impl ReservationStats {
    pub fn new() -> Self {
        Self {
            total: AtomicU64::new(0),
            successful: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            lock_failures: AtomicU64::new(0),
            today: AtomicI32::new(current_day()),
            today_total: AtomicU64::new(0),
            today_successful: AtomicU64::new(0),
        }
    }

    pub fn record_success(&self) {
        self.record(true, current_day());
        self.successful.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.record(false, current_day());
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_lock_failure(&self) {
        self.record(false, current_day());
        self.failed.fetch_add(1, Ordering::Relaxed);
        self.lock_failures.fetch_add(1, Ordering::Relaxed);
    }

    fn record(&self, success: bool, day: i32) {
        self.total.fetch_add(1, Ordering::Relaxed);
        self.roll_day(day);
        self.today_total.fetch_add(1, Ordering::Relaxed);
        if success {
            self.today_successful.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Resets the daily counters when `day` differs from the recorded one.
    /// Increments racing the reset may land in either day's bucket.
    fn roll_day(&self, day: i32) {
        let recorded = self.today.load(Ordering::Relaxed);
        if recorded == day {
            return;
        }
        if self
            .today
            .compare_exchange(recorded, day, Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
        {
            self.today_total.store(0, Ordering::Relaxed);
            self.today_successful.store(0, Ordering::Relaxed);
            info!("daily reservation counters reset");
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let total = self.total.load(Ordering::Relaxed);
        let successful = self.successful.load(Ordering::Relaxed);
        let today_total = self.today_total.load(Ordering::Relaxed);
        let today_successful = self.today_successful.load(Ordering::Relaxed);
        StatsSnapshot {
            total,
            successful,
            failed: self.failed.load(Ordering::Relaxed),
            lock_failures: self.lock_failures.load(Ordering::Relaxed),
            success_rate: rate(successful, total),
            today_total,
            today_successful,
            today_success_rate: rate(today_successful, today_total),
        }
    }

    pub fn reset(&self) {
        self.total.store(0, Ordering::Relaxed);
        self.successful.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
        self.lock_failures.store(0, Ordering::Relaxed);
        self.today.store(current_day(), Ordering::Relaxed);
        self.today_total.store(0, Ordering::Relaxed);
        self.today_successful.store(0, Ordering::Relaxed);
    }
}

impl Default for ReservationStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let stats = ReservationStats::new();
        stats.record_success();
        stats.record_success();
        stats.record_failure();
        stats.record_lock_failure();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total, 4);
        assert_eq!(snapshot.successful, 2);
        assert_eq!(snapshot.failed, 2);
        assert_eq!(snapshot.lock_failures, 1);
        assert_eq!(snapshot.success_rate, 50.0);
        assert_eq!(snapshot.today_total, 4);
        assert_eq!(snapshot.today_successful, 2);
    }

    #[test]
    fn test_totals_add_up() {
        let stats = ReservationStats::new();
        stats.record_success();
        stats.record_failure();
        stats.record_lock_failure();
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total, snapshot.successful + snapshot.failed);
        assert!(snapshot.lock_failures <= snapshot.failed);
    }

    #[test]
    fn test_empty_snapshot_has_zero_rates() {
        let snapshot = ReservationStats::new().snapshot();
        assert_eq!(snapshot.success_rate, 0.0);
        assert_eq!(snapshot.today_success_rate, 0.0);
    }

    #[test]
    fn test_day_rollover_resets_daily_counters() {
        let stats = ReservationStats::new();
        let day = current_day();
        stats.record(true, day);
        stats.record(true, day);
        assert_eq!(stats.snapshot().today_total, 2);

        // next day: daily bucket starts over, lifetime total keeps growing
        stats.record(false, day + 1);
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total, 3);
        assert_eq!(snapshot.today_total, 1);
        assert_eq!(snapshot.today_successful, 0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let stats = ReservationStats::new();
        stats.record_success();
        stats.reset();
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total, 0);
        assert_eq!(snapshot.today_total, 0);
    }
}
