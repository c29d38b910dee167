//! Profile store — single-slot TTL cache in front of the profile backend.
//!
//! DESIGN
//! ======
//! The cache slot is the only shared mutable resource in the engine. It has
//! one writer path (fetch/invalidate here) and many readers; writes are
//! whole-slot replacements, so the only hazard is a stale read, bounded by
//! the TTL and the explicit invalidation points (sign-out, signup
//! completion, profile mutations).
//!
//! ERROR HANDLING
//! ==============
//! Backend failures are swallowed to `None` with a log line. `NotFound` is
//! a normal state — a profile legitimately does not exist for the first
//! moments after signup — and is kept distinct from transient failure: it
//! clears the slot, while a transient error leaves the last value cached.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::profile::Profile;
use crate::provider::{ProfileBackend, StoreError};

struct CacheSlot {
    profile: Option<Profile>,
    fetched_at: Option<Instant>,
}

/// Cached view of the current identity's profile row.
pub struct ProfileStore {
    backend: Arc<dyn ProfileBackend>,
    ttl: std::time::Duration,
    slot: Mutex<CacheSlot>,
    current_tx: watch::Sender<Option<Profile>>,
}

impl ProfileStore {
    #[must_use]
    pub fn new(backend: Arc<dyn ProfileBackend>, config: &EngineConfig) -> Self {
        let (current_tx, _) = watch::channel(None);
        Self {
            backend,
            ttl: config.profile_ttl,
            slot: Mutex::new(CacheSlot { profile: None, fetched_at: None }),
            current_tx,
        }
    }

    /// Fetch the profile for `id`, serving from the cache slot when it is
    /// fresh and `use_cache` is set. Failures come back as `None`.
    pub async fn fetch(&self, id: Uuid, use_cache: bool) -> Option<Profile> {
        if use_cache {
            if let Some(cached) = self.cached(id) {
                return Some(cached);
            }
        }

        match self.backend.get_by_id(id).await {
            Ok(profile) => {
                self.store(profile.clone());
                Some(profile)
            }
            Err(StoreError::NotFound) => {
                debug!(%id, "no profile row for identity");
                self.clear_slot();
                None
            }
            Err(e) => {
                warn!(%id, error = %e, "profile fetch failed");
                None
            }
        }
    }

    /// Clear the cache slot so the next fetch goes to the backend.
    pub fn invalidate(&self) {
        self.clear_slot();
    }

    /// Adopt a row returned by a mutation: overwrite the slot and publish.
    pub fn adopt(&self, profile: Profile) {
        self.store(profile);
    }

    /// Drop the cached profile and publish the absence (sign-out path).
    pub fn reset(&self) {
        self.clear_slot();
        self.current_tx.send_replace(None);
    }

    /// The externally observable current profile.
    #[must_use]
    pub fn current(&self) -> Option<Profile> {
        self.current_tx.borrow().clone()
    }

    /// Watch the current profile for changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Profile>> {
        self.current_tx.subscribe()
    }

    fn cached(&self, id: Uuid) -> Option<Profile> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        let profile = slot.profile.as_ref()?;
        let fetched_at = slot.fetched_at?;
        if profile.id == id && fetched_at.elapsed() <= self.ttl {
            Some(profile.clone())
        } else {
            None
        }
    }

    fn store(&self, profile: Profile) {
        {
            let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
            slot.profile = Some(profile.clone());
            slot.fetched_at = Some(Instant::now());
        }
        self.current_tx.send_replace(Some(profile));
    }

    fn clear_slot(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.profile = None;
        slot.fetched_at = None;
    }
}

#[cfg(test)]
#[path = "profile_store_test.rs"]
mod tests;
