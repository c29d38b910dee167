use super::*;

fn test_config() -> RestConfig {
    RestConfig { base_url: "https://portal.example.com".into(), api_key: "anon-key".into() }
}

// =============================================================================
// RestConfig
// =============================================================================

// Single test: these share process-global env vars and must not interleave.
#[test]
fn from_env_reads_and_normalizes() {
    unsafe {
        std::env::remove_var("PORTAL_API_URL");
        std::env::remove_var("PORTAL_API_KEY");
    }
    assert!(RestConfig::from_env().is_none(), "missing vars must disable the adapter");

    unsafe {
        std::env::set_var("PORTAL_API_URL", "https://portal.example.com/");
        std::env::set_var("PORTAL_API_KEY", "anon-key");
    }
    let config = RestConfig::from_env().unwrap();
    assert_eq!(config.base_url, "https://portal.example.com", "trailing slash is trimmed");
    assert_eq!(config.api_key, "anon-key");
    unsafe {
        std::env::remove_var("PORTAL_API_URL");
        std::env::remove_var("PORTAL_API_KEY");
    }
}

// =============================================================================
// URL building
// =============================================================================

#[test]
fn rest_url_targets_table() {
    let client = RestClient::new(test_config());
    assert_eq!(client.rest_url("profiles"), "https://portal.example.com/rest/v1/profiles");
}

#[test]
fn auth_url_targets_endpoint() {
    let client = RestClient::new(test_config());
    assert_eq!(client.auth_url("token"), "https://portal.example.com/auth/v1/token");
}

// =============================================================================
// row handling
// =============================================================================

#[test]
fn single_row_takes_first() {
    let profile = crate::profile::test_helpers::profile_with_role(crate::profile::Role::Student);
    let row = single_row(vec![profile.clone()]).unwrap();
    assert_eq!(row.id, profile.id);
}

#[test]
fn empty_row_set_is_not_found() {
    assert!(matches!(single_row(vec![]), Err(StoreError::NotFound)));
}

// =============================================================================
// status mapping
// =============================================================================

#[test]
fn credential_rejection_statuses() {
    for code in [400_u16, 401, 422] {
        let status = reqwest::StatusCode::from_u16(code).unwrap();
        assert!(is_credential_rejection(status), "{code} should read as bad credentials");
    }
    for code in [403_u16, 404, 500, 503] {
        let status = reqwest::StatusCode::from_u16(code).unwrap();
        assert!(!is_credential_rejection(status), "{code} is not a credential problem");
    }
}

// =============================================================================
// auth payload parsing
// =============================================================================

#[test]
fn token_response_parses() {
    let json = r#"{
        "access_token": "jwt-value",
        "token_type": "bearer",
        "user": { "id": "3fa85f64-5717-4562-b3fc-2c963f66afa6", "email": "ana@school.test", "role": "authenticated" }
    }"#;
    let token: TokenResponse = serde_json::from_str(json).unwrap();
    assert_eq!(token.access_token, "jwt-value");
    assert_eq!(token.user.email, "ana@school.test");
}

#[test]
fn auth_user_converts_to_identity() {
    let user = AuthUser { id: Uuid::nil(), email: "ana@school.test".into() };
    let identity: Identity = user.into();
    assert_eq!(identity.id, Uuid::nil());
    assert_eq!(identity.email, "ana@school.test");
}

// =============================================================================
// event channel
// =============================================================================

#[test]
fn events_receiver_is_single_consumer() {
    let client = RestClient::new(test_config());
    assert!(client.take_events().is_some());
    assert!(client.take_events().is_none());
}

#[tokio::test]
async fn emitted_events_reach_the_receiver() {
    let client = RestClient::new(test_config());
    let mut rx = client.take_events().unwrap();
    client.emit(AuthEvent::SignedOut);
    assert_eq!(rx.recv().await, Some(AuthEvent::SignedOut));
}

#[test]
fn emit_without_receiver_does_not_panic() {
    let client = RestClient::new(test_config());
    drop(client.take_events());
    client.emit(AuthEvent::SignedOut);
}

// =============================================================================
// token storage
// =============================================================================

#[test]
fn bearer_falls_back_to_api_key() {
    let client = RestClient::new(test_config());
    assert_eq!(client.bearer(), "anon-key");
    client.set_token(Some("user-jwt".into()));
    assert_eq!(client.bearer(), "user-jwt");
    client.set_token(None);
    assert_eq!(client.bearer(), "anon-key");
}
