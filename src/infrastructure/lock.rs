use crate::domain::ports::{LockService, LockToken};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// How often a waiting acquirer re-checks a contended lock.
const ACQUIRE_POLL_INTERVAL: Duration = Duration::from_millis(10);

struct LockEntry {
    fencing_token: u64,
    lease_deadline: Instant,
}

/// In-process lock service with bounded waits and lease expiry.
///
/// Each key hands out monotonically growing fencing tokens, so a holder that
/// outlived its lease cannot release or shadow the next holder. A lock whose
/// lease ran out counts as free; no background reaper is needed.
#[derive(Default, Clone)]
pub struct InProcessLockService {
    locks: Arc<RwLock<HashMap<String, LockEntry>>>,
    next_token: Arc<AtomicU64>,
}

impl InProcessLockService {
    pub fn new() -> Self {
        Self::default()
    }

    async fn grab(&self, key: &str, lease: Duration) -> Option<LockToken> {
        let now = Instant::now();
        let mut locks = self.locks.write().await;
        match locks.get(key) {
            Some(entry) if now < entry.lease_deadline => None,
            _ => {
                let fencing_token = self.next_token.fetch_add(1, Ordering::Relaxed) + 1;
                locks.insert(
                    key.to_string(),
                    LockEntry {
                        fencing_token,
                        lease_deadline: now + lease,
                    },
                );
                Some(LockToken {
                    key: key.to_string(),
                    fencing_token,
                })
            }
        }
    }
}

#[async_trait]
impl LockService for InProcessLockService {
    async fn try_acquire(
        &self,
        key: &str,
        wait: Duration,
        lease: Duration,
    ) -> Result<Option<LockToken>> {
        let wait_deadline = Instant::now() + wait;
        loop {
            if let Some(token) = self.grab(key, lease).await {
                return Ok(Some(token));
            }
            let now = Instant::now();
            if now >= wait_deadline {
                return Ok(None);
            }
            tokio::time::sleep(ACQUIRE_POLL_INTERVAL.min(wait_deadline - now)).await;
        }
    }

    async fn release(&self, token: LockToken) -> Result<()> {
        let mut locks = self.locks.write().await;
        // a stale token must not free a lock someone else holds by now
        if locks
            .get(&token.key)
            .is_some_and(|entry| entry.fencing_token == token.fencing_token)
        {
            locks.remove(&token.key);
        }
        Ok(())
    }

    async fn is_held(&self, token: &LockToken) -> Result<bool> {
        let locks = self.locks.read().await;
        Ok(locks.get(&token.key).is_some_and(|entry| {
            entry.fencing_token == token.fencing_token && Instant::now() < entry.lease_deadline
        }))
    }
}
