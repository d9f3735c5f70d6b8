use crate::domain::coupon::Balance;
use crate::domain::ports::BalanceCache;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

struct CacheEntry {
    value: Balance,
    expires_at: Instant,
}

/// In-process balance cache with per-entry TTL.
///
/// Expired entries are evicted lazily on the next read of their key, which is
/// how the production cache behaves too: a balance that outlives its TTL
/// simply disappears and the coupon reads as empty until re-initialized.
#[derive(Default, Clone)]
pub struct InMemoryBalanceCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl InMemoryBalanceCache {
    /// Creates a new, empty cache.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BalanceCache for InMemoryBalanceCache {
    async fn get(&self, key: &str) -> Result<Option<Balance>> {
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if Instant::now() >= entry.expires_at => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Balance, ttl: Duration) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }
}
