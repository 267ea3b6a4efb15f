use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::HandlerError;
use crate::handler::FeeOption;

/// Default lifetime of a cached fee ladder.
pub const DEFAULT_FEE_TTL: Duration = Duration::from_secs(15 * 60);

type Entries = HashMap<String, (Instant, Vec<FeeOption>)>;

/// Per-coin cache of fee options, keyed by descriptor name.
pub struct FeeCache {
    ttl: Duration,
    entries: Mutex<Entries>,
}

impl FeeCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Every entry is written whole under the lock, so a panic elsewhere
    /// cannot leave a half-updated map behind.
    fn entries(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            warn!("fee cache lock poisoned, recovering");
            self.entries.clear_poison();
            PoisonError::into_inner(poisoned)
        })
    }

    /// Fresh cached options for `name`, if any.
    pub fn get(&self, name: &str) -> Option<Vec<FeeOption>> {
        self.entries()
            .get(name)
            .filter(|(stored_at, _)| stored_at.elapsed() < self.ttl)
            .map(|(_, fees)| fees.clone())
    }

    pub fn insert(&self, name: &str, fees: Vec<FeeOption>) {
        self.entries()
            .insert(name.to_string(), (Instant::now(), fees));
    }

    /// Returns cached options for `name` or runs `fetch` and caches its result.
    /// Failures are not cached.
    pub async fn get_or_fetch<F, Fut>(&self, name: &str, fetch: F) -> Result<Vec<FeeOption>, HandlerError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<FeeOption>, HandlerError>>,
    {
        if let Some(fees) = self.get(name) {
            debug!(coin = name, "fee cache hit");
            return Ok(fees);
        }
        let fees = fetch().await?;
        self.insert(name, fees.clone());
        Ok(fees)
    }
}

impl Default for FeeCache {
    fn default() -> Self {
        Self::new(DEFAULT_FEE_TTL)
    }
}
