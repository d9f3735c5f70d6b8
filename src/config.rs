use std::time::Duration;

/// Default upper bound on waiting for a coupon lock.
pub const DEFAULT_LOCK_WAIT: Duration = Duration::from_secs(5);
/// Default lease after which a held coupon lock expires on its own.
pub const DEFAULT_LOCK_LEASE: Duration = Duration::from_secs(10);
/// Default TTL applied to cached balance entries.
pub const DEFAULT_BALANCE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Tunables for the balance coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// How long a caller may wait to acquire a coupon lock before giving up.
    pub lock_wait: Duration,
    /// How long an acquired lock stays valid if the holder never releases it.
    pub lock_lease: Duration,
    /// How long cached balance entries live after each write.
    pub balance_ttl: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            lock_wait: DEFAULT_LOCK_WAIT,
            lock_lease: DEFAULT_LOCK_LEASE,
            balance_ttl: DEFAULT_BALANCE_TTL,
        }
    }
}
