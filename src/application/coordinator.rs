use crate::application::stats::{ReservationStats, StatsSnapshot};
use crate::config::CoordinatorConfig;
use crate::domain::coupon::{Amount, Balance};
use crate::domain::keys;
use crate::domain::ports::{DynBalanceCache, DynLedgerStore, DynLockService, LockToken};
use crate::error::{CouponError, Result};
use tracing::{debug, error, info, warn};

/// Serializes concurrent balance mutations per coupon.
///
/// `BalanceCoordinator` owns the three backends the reservation protocol
/// spans: the volatile balance cache consulted while a payment is in flight,
/// the lock service that serializes mutations per coupon id, and the
/// permanent ledger that only changes once a payment is confirmed.
///
/// The boolean operations (`reserve_amount`, and `restore_amount` logging
/// instead of returning) fail closed: any lock or cache problem rejects the
/// attempt rather than risking an overspend.
pub struct BalanceCoordinator {
    ledger: DynLedgerStore,
    locks: DynLockService,
    cache: DynBalanceCache,
    config: CoordinatorConfig,
    stats: ReservationStats,
}

impl BalanceCoordinator {
    /// Creates a coordinator with the default tunables.
    pub fn new(ledger: DynLedgerStore, locks: DynLockService, cache: DynBalanceCache) -> Self {
        Self::with_config(ledger, locks, cache, CoordinatorConfig::default())
    }

    pub fn with_config(
        ledger: DynLedgerStore,
        locks: DynLockService,
        cache: DynBalanceCache,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            ledger,
            locks,
            cache,
            config,
            stats: ReservationStats::new(),
        }
    }

    /// Seeds the cached balance for a coupon, typically at issuance or when
    /// warming the cache from the ledger.
    pub async fn initialize_balance(&self, coupon_id: &str, amount: Balance) -> Result<()> {
        let key = keys::balance_key(coupon_id);
        self.cache.set(&key, amount, self.config.balance_ttl).await?;
        debug!(coupon_id, %amount, "initialized cached balance");
        Ok(())
    }

    /// Currently spendable balance as the cache sees it.
    ///
    /// Returns zero when no entry exists or the cache cannot be reached, so
    /// callers treat an unknown balance as nothing left to spend.
    pub async fn available_balance(&self, coupon_id: &str) -> Balance {
        let key = keys::balance_key(coupon_id);
        match self.cache.get(&key).await {
            Ok(Some(balance)) => balance,
            Ok(None) => {
                warn!(coupon_id, "no cached balance entry");
                Balance::ZERO
            }
            Err(err) => {
                error!(coupon_id, %err, "cache read failed");
                Balance::ZERO
            }
        }
    }

    /// Provisionally holds `amount` on the coupon by decrementing the cached
    /// balance under the coupon lock.
    ///
    /// Returns `true` only when the full amount was available and the
    /// decremented balance was written back. Insufficient funds, a missing
    /// cache entry, or any lock or cache failure all return `false`.
    pub async fn reserve_amount(&self, coupon_id: &str, amount: Amount) -> bool {
        let Some(token) = self.acquire_lock(coupon_id).await else {
            warn!(coupon_id, %amount, "reservation rejected: coupon lock unavailable");
            self.stats.record_lock_failure();
            return false;
        };
        let reserved = self.debit_cached(coupon_id, amount).await;
        self.release_lock(token).await;
        if reserved {
            self.stats.record_success();
        } else {
            self.stats.record_failure();
        }
        reserved
    }

    /// Returns a previously reserved `amount` to the cached balance after a
    /// failed payment. Failures are logged and swallowed; [`Self::sync_from_ledger`]
    /// can repair any cache drift this leaves behind.
    pub async fn restore_amount(&self, coupon_id: &str, amount: Amount) {
        let Some(token) = self.acquire_lock(coupon_id).await else {
            warn!(coupon_id, %amount, "restore skipped: coupon lock unavailable");
            return;
        };
        self.credit_cached(coupon_id, amount).await;
        self.release_lock(token).await;
    }

    /// Makes a reservation permanent by debiting the ledger record.
    ///
    /// The coupon flips to used exactly when its remaining amount reaches
    /// zero. The cached balance is untouched; it already reflects the
    /// reservation.
    pub async fn confirm_usage(&self, coupon_id: &str, amount: Amount) -> Result<()> {
        let mut coupon = self
            .ledger
            .find_by_id(coupon_id)
            .await?
            .ok_or_else(|| CouponError::LedgerNotFound(coupon_id.to_string()))?;
        coupon.debit(amount)?;
        let remaining = coupon.remaining_amount;
        let status = coupon.status;
        self.ledger.save(coupon).await?;
        info!(coupon_id, %amount, %remaining, %status, "confirmed coupon usage");
        Ok(())
    }

    /// Overwrites the cached balance with an authoritative ledger value.
    pub async fn sync_balance(&self, coupon_id: &str, ledger_amount: Balance) -> Result<()> {
        let key = keys::balance_key(coupon_id);
        self.cache
            .set(&key, ledger_amount, self.config.balance_ttl)
            .await?;
        debug!(coupon_id, %ledger_amount, "synced cached balance");
        Ok(())
    }

    /// Re-reads the ledger record and pushes its remaining amount into the
    /// cache. Used to repair drift left by crashed callers that reserved but
    /// never confirmed or restored.
    pub async fn sync_from_ledger(&self, coupon_id: &str) -> Result<Balance> {
        let coupon = self
            .ledger
            .find_by_id(coupon_id)
            .await?
            .ok_or_else(|| CouponError::LedgerNotFound(coupon_id.to_string()))?;
        self.sync_balance(coupon_id, coupon.remaining_amount).await?;
        Ok(coupon.remaining_amount)
    }

    /// Drops the cached balance entry entirely.
    pub async fn clear_balance(&self, coupon_id: &str) -> Result<()> {
        let key = keys::balance_key(coupon_id);
        self.cache.delete(&key).await?;
        debug!(coupon_id, "cleared cached balance");
        Ok(())
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    async fn acquire_lock(&self, coupon_id: &str) -> Option<LockToken> {
        let key = keys::lock_key(coupon_id);
        match self
            .locks
            .try_acquire(&key, self.config.lock_wait, self.config.lock_lease)
            .await
        {
            Ok(token) => token,
            Err(err) => {
                error!(coupon_id, %err, "coupon lock acquisition failed");
                None
            }
        }
    }

    async fn release_lock(&self, token: LockToken) {
        if let Err(err) = self.locks.release(token).await {
            warn!(%err, "failed to release coupon lock");
        }
    }

    // Runs under the coupon lock.
    async fn debit_cached(&self, coupon_id: &str, amount: Amount) -> bool {
        let key = keys::balance_key(coupon_id);
        let balance = match self.cache.get(&key).await {
            Ok(Some(balance)) => balance,
            Ok(None) => {
                warn!(coupon_id, %amount, "no cached balance to reserve against");
                return false;
            }
            Err(err) => {
                error!(coupon_id, %err, "cache read failed during reservation");
                return false;
            }
        };
        let requested: Balance = amount.into();
        if balance < requested {
            warn!(coupon_id, %amount, %balance, "insufficient coupon balance");
            return false;
        }
        let remaining = balance - requested;
        match self.cache.set(&key, remaining, self.config.balance_ttl).await {
            Ok(()) => {
                info!(coupon_id, %amount, %remaining, "reserved coupon amount");
                true
            }
            Err(err) => {
                error!(coupon_id, %err, "cache write failed during reservation");
                false
            }
        }
    }

    // Runs under the coupon lock.
    async fn credit_cached(&self, coupon_id: &str, amount: Amount) {
        let key = keys::balance_key(coupon_id);
        match self.cache.get(&key).await {
            Ok(Some(balance)) => {
                let restored = balance + amount.into();
                match self.cache.set(&key, restored, self.config.balance_ttl).await {
                    Ok(()) => info!(coupon_id, %amount, %restored, "restored coupon amount"),
                    Err(err) => error!(coupon_id, %err, "cache write failed during restore"),
                }
            }
            Ok(None) => warn!(coupon_id, %amount, "no cached balance to restore into"),
            Err(err) => error!(coupon_id, %err, "cache read failed during restore"),
        }
    }
}
