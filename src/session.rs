//! Session controller — identity lifecycle, auth-event loop, and guarded
//! redirect execution.
//!
//! ARCHITECTURE
//! ============
//! The controller owns the only pieces of mutable state in the engine: the
//! published `SessionSnapshot`, the profile cache (via [`ProfileStore`]),
//! and the redirect guard latch. It is the single subscriber to the
//! identity provider's session-change stream; page components and route
//! guards read snapshots through a watch channel and never mutate state
//! directly.
//!
//! ERROR HANDLING
//! ==============
//! Provider and backend failures never escape the event loop: passive
//! background work (session restore, profile refresh on auth events)
//! degrades to an unchanged or `None` profile plus a log line. Only the
//! user-initiated operations (`sign_in`, `sign_up`, `record_vote`,
//! `update_profile`) return normalized errors for the UI to display.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use time::OffsetDateTime;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::profile::{Profile, ProfilePatch, ProfileSeed};
use crate::profile_store::ProfileStore;
use crate::provider::{AuthError, AuthEvent, Identity, IdentityProvider, Navigator, ProfileBackend, StoreError};
use crate::redirect::{self, DecideOptions};
use crate::routes;

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Profile sub-state while authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfilePhase {
    /// Identity known, profile fetch still in flight.
    Pending,
    /// Profile fetch settled (possibly to "no row yet").
    Ready,
}

/// Lifecycle phase of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Uninitialized,
    Initializing,
    Unauthenticated,
    Authenticated(ProfilePhase),
}

/// Point-in-time view of the session, published through a watch channel.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub identity: Option<Identity>,
    pub profile: Option<Profile>,
}

impl SessionSnapshot {
    fn empty() -> Self {
        Self { phase: SessionPhase::Uninitialized, identity: None, profile: None }
    }

    /// Whether the engine has not yet reached a stable state.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(
            self.phase,
            SessionPhase::Uninitialized | SessionPhase::Initializing | SessionPhase::Authenticated(ProfilePhase::Pending)
        )
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self.phase, SessionPhase::Authenticated(_))
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Normalized errors surfaced to the UI by user-initiated operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("profile operation failed: {0}")]
    Store(String),
    #[error("no authenticated session")]
    NotSignedIn,
}

impl From<AuthError> for SessionError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => SessionError::InvalidCredentials,
            AuthError::Provider(detail) => SessionError::Auth(detail),
        }
    }
}

impl From<StoreError> for SessionError {
    fn from(e: StoreError) -> Self {
        SessionError::Store(e.to_string())
    }
}

// =============================================================================
// REDIRECT GUARD
// =============================================================================

/// Latch preventing two overlapping redirect executions from racing.
///
/// Armed immediately before a navigation is issued and cleared by elapsed
/// time, regardless of navigation outcome, so a burst of near-simultaneous
/// auth events yields at most one navigation per cooldown window.
pub(crate) struct RedirectGuard {
    armed_at: Mutex<Option<Instant>>,
    cooldown: Duration,
}

impl RedirectGuard {
    pub(crate) fn new(cooldown: Duration) -> Self {
        Self { armed_at: Mutex::new(None), cooldown }
    }

    /// Try to claim the latch. Non-forced requests inside the cooldown
    /// window are refused; forced requests always pass and re-arm.
    pub(crate) fn try_arm(&self, force: bool) -> bool {
        self.try_arm_at(force, Instant::now())
    }

    pub(crate) fn try_arm_at(&self, force: bool, now: Instant) -> bool {
        let mut armed_at = self.armed_at.lock().unwrap_or_else(PoisonError::into_inner);
        if !force {
            if let Some(armed) = *armed_at {
                if now.duration_since(armed) < self.cooldown {
                    return false;
                }
            }
        }
        *armed_at = Some(now);
        true
    }

    /// Clear the latch so the next evaluation is free to navigate.
    pub(crate) fn reset(&self) {
        *self.armed_at.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

// =============================================================================
// CONTROLLER
// =============================================================================

/// Owns the identity lifecycle and drives profile fetches and redirects.
pub struct SessionController {
    provider: Arc<dyn IdentityProvider>,
    backend: Arc<dyn ProfileBackend>,
    store: ProfileStore,
    navigator: Arc<dyn Navigator>,
    config: EngineConfig,
    snapshot_tx: watch::Sender<SessionSnapshot>,
    guard: RedirectGuard,
    /// Signup metadata parked between `sign_up` and the `SignedUp` event.
    pending_seed: Mutex<Option<ProfileSeed>>,
    /// Set on shutdown; checked before every state write after an await.
    closed: AtomicBool,
}

impl SessionController {
    #[must_use]
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        backend: Arc<dyn ProfileBackend>,
        navigator: Arc<dyn Navigator>,
        config: EngineConfig,
    ) -> Arc<Self> {
        let store = ProfileStore::new(backend.clone(), &config);
        let (snapshot_tx, _) = watch::channel(SessionSnapshot::empty());
        Arc::new(Self {
            provider,
            backend,
            store,
            navigator,
            config,
            snapshot_tx,
            guard: RedirectGuard::new(config.redirect_cooldown),
            pending_seed: Mutex::new(None),
            closed: AtomicBool::new(false),
        })
    }

    // -------------------------------------------------------------------------
    // snapshot access
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// Watch the session for changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_tx.subscribe()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<Identity> {
        self.snapshot_tx.borrow().identity.clone()
    }

    #[must_use]
    pub fn current_profile(&self) -> Option<Profile> {
        self.snapshot_tx.borrow().profile.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.snapshot_tx.borrow().is_loading()
    }

    /// Fetch a profile through the cache layer.
    pub async fn fetch_profile(&self, id: Uuid, use_cache: bool) -> Option<Profile> {
        self.store.fetch(id, use_cache).await
    }

    // -------------------------------------------------------------------------
    // lifecycle
    // -------------------------------------------------------------------------

    /// Restore any existing session, then start consuming session-change
    /// events. Returns the event-loop handle; abort it (after calling
    /// [`shutdown`](Self::shutdown)) when the host component unmounts.
    pub async fn start(self: Arc<Self>) -> JoinHandle<()> {
        self.set_phase(SessionPhase::Initializing);

        match self.provider.current_session().await {
            Ok(Some(identity)) => {
                self.enter_authenticated(identity.clone());
                let profile = self.store.fetch(identity.id, false).await;
                self.settle_profile(profile);
                // A restored session only redirects off the entry pages;
                // anywhere else the current location is intentional.
                let path = self.navigator.current_path();
                if path == routes::HOME || path == routes::LOGIN {
                    self.evaluate_redirect(true);
                }
            }
            Ok(None) => self.set_phase(SessionPhase::Unauthenticated),
            Err(e) => {
                warn!(error = %e, "session restore failed");
                self.set_phase(SessionPhase::Unauthenticated);
            }
        }

        let events = self.provider.take_events();
        let controller = Arc::clone(&self);
        tokio::spawn(async move {
            let Some(mut events) = events else {
                warn!("auth event stream already taken; session changes will not be observed");
                return;
            };
            while let Some(event) = events.recv().await {
                if controller.is_closed() {
                    break;
                }
                controller.handle_event(event).await;
            }
            debug!("auth event stream closed");
        })
    }

    /// Stop writing state. Call before aborting the event-loop handle.
    pub fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// React to one session-change event. Exposed for the event loop; also
    /// the single place where auth transitions are interpreted.
    pub async fn handle_event(&self, event: AuthEvent) {
        match event {
            AuthEvent::SignedIn(identity) => {
                info!(email = %identity.email, "signed in");
                self.enter_authenticated(identity.clone());
                let profile = self.store.fetch(identity.id, false).await;
                self.settle_profile(profile);
                self.evaluate_redirect(true);
            }
            AuthEvent::SignedUp(identity) => {
                info!(email = %identity.email, "signed up");
                self.enter_authenticated(identity.clone());
                self.store.invalidate();
                let profile = self.materialize_profile(&identity).await;
                self.settle_profile(profile);
                self.evaluate_redirect(true);
            }
            AuthEvent::InitialSession(identity) => {
                debug!(email = %identity.email, "session restored");
                self.enter_authenticated(identity.clone());
                let profile = self.store.fetch(identity.id, false).await;
                self.settle_profile(profile);
                // No redirect: the user's current location is intentional.
            }
            AuthEvent::SignedOut => {
                info!("signed out");
                self.reset_local_state();
            }
        }
    }

    // -------------------------------------------------------------------------
    // public operations
    // -------------------------------------------------------------------------

    /// Password sign-in. Navigation happens when the provider's
    /// `SignedIn` event arrives; success here only clears the redirect
    /// latch so that event is free to navigate.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, SessionError> {
        match self.provider.sign_in(email, password).await {
            Ok(identity) => {
                self.guard.reset();
                Ok(identity)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Create an account. Profile materialization (settling retries,
    /// fallback insert) runs when the `SignedUp` event arrives; a missing
    /// profile row never fails the signup itself.
    pub async fn sign_up(&self, email: &str, password: &str, seed: ProfileSeed) -> Result<Identity, SessionError> {
        *self.pending_seed.lock().unwrap_or_else(PoisonError::into_inner) = Some(seed.clone());
        match self.provider.sign_up(email, password, &seed).await {
            Ok(identity) => {
                self.guard.reset();
                Ok(identity)
            }
            Err(e) => {
                *self.pending_seed.lock().unwrap_or_else(PoisonError::into_inner) = None;
                Err(e.into())
            }
        }
    }

    /// End the session. Local state is reset even when the remote call
    /// fails; the failure is logged, not surfaced.
    pub async fn sign_out(&self) {
        if let Err(e) = self.provider.sign_out().await {
            warn!(error = %e, "remote sign-out failed; clearing local state anyway");
        }
        self.reset_local_state();
    }

    /// Record the logo vote, then refresh local state from the returned row.
    pub async fn record_vote(&self, choice_id: Uuid) -> Result<Profile, SessionError> {
        let identity = self.current_user().ok_or(SessionError::NotSignedIn)?;
        let profile = self.backend.record_vote(identity.id, choice_id).await?;
        self.adopt_mutation(profile.clone());
        Ok(profile)
    }

    /// Apply a profile patch, then refresh local state from the returned row.
    pub async fn update_profile(&self, patch: ProfilePatch) -> Result<Profile, SessionError> {
        let identity = self.current_user().ok_or(SessionError::NotSignedIn)?;
        let profile = self.backend.update(identity.id, &patch).await?;
        self.adopt_mutation(profile.clone());
        Ok(profile)
    }

    // -------------------------------------------------------------------------
    // redirect execution
    // -------------------------------------------------------------------------

    /// Evaluate the redirect policy against the current path and execute
    /// the resulting navigation, if any.
    pub fn evaluate_redirect(&self, force: bool) {
        if self.is_closed() {
            return;
        }
        let path = self.navigator.current_path();
        let profile = self.current_profile();
        let decision = redirect::decide(profile.as_ref(), &path, DecideOptions { force });
        if !decision.should_redirect {
            debug!(%path, reason = decision.reason, "staying put");
            return;
        }
        let Some(target) = decision.target_path else {
            return;
        };
        if !self.guard.try_arm(force) {
            info!(%target, reason = decision.reason, "redirect dropped: cooldown active");
            return;
        }
        info!(from = %path, to = %target, reason = decision.reason, "redirecting");
        self.navigator.navigate(&target);
    }

    // -------------------------------------------------------------------------
    // internals
    // -------------------------------------------------------------------------

    /// Retry-fetch the profile row the signup trigger should create; fall
    /// back to inserting it ourselves, treating a uniqueness conflict as
    /// "the trigger won" and re-fetching.
    async fn materialize_profile(&self, identity: &Identity) -> Option<Profile> {
        for attempt in 1..=self.config.profile_retry_attempts {
            tokio::time::sleep(self.config.profile_retry_backoff).await;
            if self.is_closed() {
                return None;
            }
            if let Some(profile) = self.store.fetch(identity.id, false).await {
                return Some(profile);
            }
            debug!(attempt, "profile row not materialized yet");
        }

        let seed = self
            .pending_seed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .unwrap_or_else(|| ProfileSeed::student(name_from_email(&identity.email)));
        let seeded = seeded_profile(identity, &seed);

        match self.backend.insert(&seeded).await {
            Ok(profile) => {
                info!(id = %profile.id, "profile created client-side");
                self.store.adopt(profile.clone());
                Some(profile)
            }
            Err(StoreError::UniqueConflict) => {
                debug!("concurrent trigger created the profile; fetching it");
                self.store.fetch(identity.id, false).await
            }
            Err(e) => {
                warn!(error = %e, "profile creation failed; continuing without a profile");
                None
            }
        }
    }

    fn adopt_mutation(&self, profile: Profile) {
        self.store.invalidate();
        self.store.adopt(profile.clone());
        self.set_snapshot(|snap| snap.profile = Some(profile));
    }

    fn enter_authenticated(&self, identity: Identity) {
        self.set_snapshot(|snap| {
            snap.phase = SessionPhase::Authenticated(ProfilePhase::Pending);
            snap.identity = Some(identity);
        });
    }

    fn settle_profile(&self, profile: Option<Profile>) {
        self.set_snapshot(|snap| {
            if snap.is_authenticated() {
                snap.phase = SessionPhase::Authenticated(ProfilePhase::Ready);
                snap.profile = profile;
            }
        });
    }

    fn reset_local_state(&self) {
        self.store.reset();
        self.pending_seed.lock().unwrap_or_else(PoisonError::into_inner).take();
        self.set_snapshot(|snap| {
            snap.phase = SessionPhase::Unauthenticated;
            snap.identity = None;
            snap.profile = None;
        });
    }

    fn set_phase(&self, phase: SessionPhase) {
        self.set_snapshot(|snap| snap.phase = phase);
    }

    fn set_snapshot(&self, mutate: impl FnOnce(&mut SessionSnapshot)) {
        if self.is_closed() {
            return;
        }
        self.snapshot_tx.send_modify(mutate);
    }
}

fn name_from_email(email: &str) -> String {
    email
        .split('@')
        .next()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or("user")
        .to_owned()
}

fn seeded_profile(identity: &Identity, seed: &ProfileSeed) -> Profile {
    Profile {
        id: identity.id,
        email: identity.email.clone(),
        full_name: seed.full_name.clone(),
        role: seed.role,
        instrument: seed.instrument.clone(),
        avatar_url: None,
        has_voted: false,
        created_at: OffsetDateTime::now_utc(),
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
