//! Seams to the external collaborators: identity provider, profile
//! backend, and the router's navigation primitive.
//!
//! DESIGN
//! ======
//! Both services are opaque to the engine and consumed as `Arc<dyn …>`
//! trait objects, so tests substitute hand-rolled mocks and production
//! wires in the REST adapter. Session-change delivery is a single-consumer
//! channel: the provider emits `AuthEvent`s in order, the controller owns
//! the one receiver, and dropping the receiver unsubscribes.

use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::profile::{Profile, ProfilePatch, ProfileSeed};

/// Externally-authenticated principal, independent of the business profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
}

/// Session-change notification emitted by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// Credentials accepted for an existing account.
    SignedIn(Identity),
    /// A brand-new account finished signing up.
    SignedUp(Identity),
    /// App reload found an existing session; the user's current location
    /// is assumed intentional.
    InitialSession(Identity),
    /// Session ended.
    SignedOut,
}

/// Identity-provider failures.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("auth provider error: {0}")]
    Provider(String),
}

/// Profile-backend failures. `NotFound` is a normal state for the first
/// moments after signup, not an outage.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("profile not found")]
    NotFound,
    #[error("profile already exists")]
    UniqueConflict,
    #[error("profile backend error: {0}")]
    Backend(String),
}

/// The external identity provider (authentication service SDK).
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Look up an existing session, if any.
    async fn current_session(&self) -> Result<Option<Identity>, AuthError>;

    /// Take the single session-change receiver. Returns `None` once taken;
    /// there is exactly one subscriber, the session controller.
    fn take_events(&self) -> Option<mpsc::UnboundedReceiver<AuthEvent>>;

    /// Password sign-in. Emits [`AuthEvent::SignedIn`] on success.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    /// Account creation. Emits [`AuthEvent::SignedUp`] on success.
    async fn sign_up(&self, email: &str, password: &str, seed: &ProfileSeed) -> Result<Identity, AuthError>;

    /// End the session. Emits [`AuthEvent::SignedOut`].
    async fn sign_out(&self) -> Result<(), AuthError>;
}

/// The profile-record backend.
#[async_trait]
pub trait ProfileBackend: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> Result<Profile, StoreError>;

    /// Insert a new row. Fails with [`StoreError::UniqueConflict`] when a
    /// concurrent trigger already created it.
    async fn insert(&self, profile: &Profile) -> Result<Profile, StoreError>;

    async fn update(&self, id: Uuid, patch: &ProfilePatch) -> Result<Profile, StoreError>;

    /// Record a logo vote; returns the updated row with `has_voted` set.
    async fn record_vote(&self, id: Uuid, choice_id: Uuid) -> Result<Profile, StoreError>;
}

/// Router integration: where the user is and how to move them.
pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;
    fn navigate(&self, path: &str);
}

#[cfg(test)]
#[path = "provider_test.rs"]
mod tests;
