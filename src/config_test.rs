use super::*;

// =============================================================================
// defaults
// =============================================================================

#[test]
fn default_profile_ttl_is_thirty_seconds() {
    let config = EngineConfig::default();
    assert_eq!(config.profile_ttl, Duration::from_secs(30));
}

#[test]
fn default_cooldown_is_one_second() {
    let config = EngineConfig::default();
    assert_eq!(config.redirect_cooldown, Duration::from_millis(1_000));
}

#[test]
fn default_retry_plan() {
    let config = EngineConfig::default();
    assert_eq!(config.profile_retry_attempts, 3);
    assert_eq!(config.profile_retry_backoff, Duration::from_millis(400));
}

// =============================================================================
// env_parse
// =============================================================================

#[test]
fn env_parse_falls_back_on_missing_var() {
    assert_eq!(env_parse("PORTALGUARD_TEST_MISSING_VAR", 42_u64), 42);
}

#[test]
fn env_parse_falls_back_on_garbage() {
    // SAFETY: test-local var name, no concurrent reader cares about it.
    unsafe { std::env::set_var("PORTALGUARD_TEST_GARBAGE_VAR", "not-a-number") };
    assert_eq!(env_parse("PORTALGUARD_TEST_GARBAGE_VAR", 7_u32), 7);
    unsafe { std::env::remove_var("PORTALGUARD_TEST_GARBAGE_VAR") };
}

#[test]
fn env_parse_reads_valid_value() {
    unsafe { std::env::set_var("PORTALGUARD_TEST_VALID_VAR", "1500") };
    assert_eq!(env_parse("PORTALGUARD_TEST_VALID_VAR", 0_u64), 1_500);
    unsafe { std::env::remove_var("PORTALGUARD_TEST_VALID_VAR") };
}

// =============================================================================
// test config
// =============================================================================

#[test]
fn test_config_does_not_sleep() {
    let config = EngineConfig::for_tests();
    assert_eq!(config.profile_retry_backoff, Duration::ZERO);
    assert_eq!(config.profile_retry_attempts, 2);
}
