//! REST adapter — production identity provider and profile backend over
//! the portal's hosted auth + REST service.
//!
//! ARCHITECTURE
//! ============
//! The hosted service exposes password-grant auth endpoints under
//! `/auth/v1` and the profile table under `/rest/v1/profiles` with
//! PostgREST-style filters. One client implements both engine traits and
//! doubles as the session-change event source: auth calls that succeed
//! emit the matching [`AuthEvent`] on a single-consumer channel.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::profile::{Profile, ProfilePatch, ProfileSeed};
use crate::provider::{AuthError, AuthEvent, Identity, IdentityProvider, ProfileBackend, StoreError};

/// Connection settings for the hosted backend.
#[derive(Debug, Clone)]
pub struct RestConfig {
    pub base_url: String,
    pub api_key: String,
}

impl RestConfig {
    /// Load from `PORTAL_API_URL` and `PORTAL_API_KEY`.
    /// Returns `None` if either is missing (the portal runs against mocks).
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("PORTAL_API_URL").ok()?;
        let api_key = std::env::var("PORTAL_API_KEY").ok()?;
        Some(Self { base_url: base_url.trim_end_matches('/').to_owned(), api_key })
    }
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: Uuid,
    email: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: AuthUser,
}

impl From<AuthUser> for Identity {
    fn from(user: AuthUser) -> Self {
        Identity { id: user.id, email: user.email }
    }
}

/// Client for the hosted auth + REST service.
pub struct RestClient {
    http: reqwest::Client,
    config: RestConfig,
    access_token: Mutex<Option<String>>,
    events_tx: mpsc::UnboundedSender<AuthEvent>,
    events_rx: Mutex<Option<mpsc::UnboundedReceiver<AuthEvent>>>,
}

impl RestClient {
    #[must_use]
    pub fn new(config: RestConfig) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            http: reqwest::Client::new(),
            config,
            access_token: Mutex::new(None),
            events_tx,
            events_rx: Mutex::new(Some(events_rx)),
        }
    }

    fn bearer(&self) -> String {
        self.access_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .unwrap_or_else(|| self.config.api_key.clone())
    }

    fn set_token(&self, token: Option<String>) {
        *self.access_token.lock().unwrap_or_else(PoisonError::into_inner) = token;
    }

    fn emit(&self, event: AuthEvent) {
        // The receiver may be gone during teardown; nothing left to notify.
        let _ = self.events_tx.send(event);
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.config.base_url)
    }

    fn auth_url(&self, endpoint: &str) -> String {
        format!("{}/auth/v1/{endpoint}", self.config.base_url)
    }
}

async fn profile_rows(resp: reqwest::Response) -> Result<Vec<Profile>, StoreError> {
    if resp.status() == reqwest::StatusCode::CONFLICT {
        return Err(StoreError::UniqueConflict);
    }
    if !resp.status().is_success() {
        return Err(StoreError::Backend(error_detail(resp).await));
    }
    resp.json::<Vec<Profile>>()
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))
}

/// Collapse a PostgREST row set to the single expected row.
fn single_row(rows: Vec<Profile>) -> Result<Profile, StoreError> {
    rows.into_iter().next().ok_or(StoreError::NotFound)
}

async fn error_detail(resp: reqwest::Response) -> String {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    format!("{status}: {body}")
}

fn is_credential_rejection(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 400 | 401 | 422)
}

#[async_trait]
impl IdentityProvider for RestClient {
    async fn current_session(&self) -> Result<Option<Identity>, AuthError> {
        if self.access_token.lock().unwrap_or_else(PoisonError::into_inner).is_none() {
            return Ok(None);
        }
        let resp = self
            .http
            .get(self.auth_url("user"))
            .header("apikey", &self.config.api_key)
            .bearer_auth(self.bearer())
            .send()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            debug!("stored access token no longer valid");
            self.set_token(None);
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(AuthError::Provider(error_detail(resp).await));
        }
        let user = resp
            .json::<AuthUser>()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;
        Ok(Some(user.into()))
    }

    fn take_events(&self) -> Option<mpsc::UnboundedReceiver<AuthEvent>> {
        self.events_rx.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let resp = self
            .http
            .post(format!("{}?grant_type=password", self.auth_url("token")))
            .header("apikey", &self.config.api_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        if is_credential_rejection(resp.status()) {
            return Err(AuthError::InvalidCredentials);
        }
        if !resp.status().is_success() {
            return Err(AuthError::Provider(error_detail(resp).await));
        }
        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;
        self.set_token(Some(token.access_token));
        let identity: Identity = token.user.into();
        self.emit(AuthEvent::SignedIn(identity.clone()));
        Ok(identity)
    }

    async fn sign_up(&self, email: &str, password: &str, seed: &ProfileSeed) -> Result<Identity, AuthError> {
        let resp = self
            .http
            .post(self.auth_url("signup"))
            .header("apikey", &self.config.api_key)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "data": seed,
            }))
            .send()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(AuthError::Provider(error_detail(resp).await));
        }
        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;
        self.set_token(Some(token.access_token));
        let identity: Identity = token.user.into();
        self.emit(AuthEvent::SignedUp(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let result = self
            .http
            .post(self.auth_url("logout"))
            .header("apikey", &self.config.api_key)
            .bearer_auth(self.bearer())
            .send()
            .await;
        // The local token is gone either way; a dangling server-side
        // session only shortens to its natural expiry.
        self.set_token(None);
        self.emit(AuthEvent::SignedOut);
        match result {
            Ok(resp) if resp.status().is_success() => Ok(()),
            Ok(resp) => Err(AuthError::Provider(error_detail(resp).await)),
            Err(e) => Err(AuthError::Provider(e.to_string())),
        }
    }
}

#[async_trait]
impl ProfileBackend for RestClient {
    async fn get_by_id(&self, id: Uuid) -> Result<Profile, StoreError> {
        let resp = self
            .http
            .get(self.rest_url("profiles"))
            .query(&[("id", format!("eq.{id}")), ("select", "*".to_owned())])
            .header("apikey", &self.config.api_key)
            .bearer_auth(self.bearer())
            .send()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        single_row(profile_rows(resp).await?)
    }

    async fn insert(&self, profile: &Profile) -> Result<Profile, StoreError> {
        let resp = self
            .http
            .post(self.rest_url("profiles"))
            .header("apikey", &self.config.api_key)
            .header("Prefer", "return=representation")
            .bearer_auth(self.bearer())
            .json(profile)
            .send()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        single_row(profile_rows(resp).await?)
    }

    async fn update(&self, id: Uuid, patch: &ProfilePatch) -> Result<Profile, StoreError> {
        let resp = self
            .http
            .patch(self.rest_url("profiles"))
            .query(&[("id", format!("eq.{id}"))])
            .header("apikey", &self.config.api_key)
            .header("Prefer", "return=representation")
            .bearer_auth(self.bearer())
            .json(patch)
            .send()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        single_row(profile_rows(resp).await?)
    }

    async fn record_vote(&self, id: Uuid, choice_id: Uuid) -> Result<Profile, StoreError> {
        let resp = self
            .http
            .post(self.rest_url("logo_votes"))
            .header("apikey", &self.config.api_key)
            .bearer_auth(self.bearer())
            .json(&serde_json::json!({ "profile_id": id, "choice_id": choice_id }))
            .send()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        // A duplicate vote row means the flag write below was what failed
        // last time; repeating it is harmless.
        if resp.status() != reqwest::StatusCode::CONFLICT && !resp.status().is_success() {
            return Err(StoreError::Backend(error_detail(resp).await));
        }

        self.update(id, &ProfilePatch { has_voted: Some(true), ..ProfilePatch::default() })
            .await
    }
}

#[cfg(test)]
#[path = "rest_test.rs"]
mod tests;
