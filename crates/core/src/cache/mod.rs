//! Durable cache with time-bounded validity.
//!
//! Every command runs in a fresh process, so entries are persisted through a
//! [`CacheStore`] and carry an absolute expiry instant. A stored entry is
//! valid while `now < expires_at`; anything else (expired, missing, or a
//! document that no longer decodes) is a miss and triggers a recompute.
//!
//! ```ignore
//! let cache = ExpiringCache::new(FileStore::in_user_cache_dir()?, SystemClock);
//! let token: String = cache
//!     .get_or_compute("auth-token", TimeDelta::seconds(1770), false, || authenticate())
//!     .await?;
//! ```

mod clock;
mod store;

use std::{future::Future, sync::Arc};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

pub use clock::{Clock, ManualClock, SystemClock};
pub use store::{CacheStore, FileStore, MemoryStore};

use crate::error::Result;

/// A cached value and the instant it stops being trusted
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    pub value: T,
    pub expires_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Get-or-compute cache over a pluggable store and clock
pub struct ExpiringCache {
    store: Box<dyn CacheStore>,
    clock: Arc<dyn Clock>,
}

impl ExpiringCache {
    pub fn new(store: impl CacheStore + 'static, clock: impl Clock + 'static) -> Self {
        Self {
            store: Box::new(store),
            clock: Arc::new(clock),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Return the stored value for `key` if it is still valid.
    pub fn lookup<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let document = self.store.load(key)?;
        let entry = match serde_json::from_str::<CacheEntry<T>>(&document) {
            Ok(entry) => entry,
            Err(e) => {
                debug!(key, error = %e, "Discarding malformed cache entry");
                return None;
            }
        };

        if entry.is_valid_at(self.now()) {
            Some(entry.value)
        } else {
            debug!(key, expired_at = %entry.expires_at, "Cache entry expired");
            None
        }
    }

    /// Return the cached value for `key`, or compute, store and return it.
    ///
    /// A valid entry short-circuits unless `force_invalidate` is set. When
    /// `compute` fails the error is returned and the store is left as it was.
    pub async fn get_or_compute<T, F, Fut>(
        &self,
        key: &str,
        ttl: TimeDelta,
        force_invalidate: bool,
        compute: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if !force_invalidate
            && let Some(value) = self.lookup(key)
        {
            debug!(key, "Cache hit");
            return Ok(value);
        }

        debug!(key, force_invalidate, "Cache miss, recomputing");
        let value = compute().await?;

        let entry = CacheEntry {
            value: &value,
            expires_at: self.now() + ttl,
        };
        match serde_json::to_string(&entry) {
            Ok(document) => {
                if let Err(e) = self.store.save(key, &document) {
                    warn!(key, error = %e, "Failed to persist cache entry");
                }
            }
            Err(e) => warn!(key, error = %e, "Failed to serialize cache entry"),
        }

        Ok(value)
    }
}
