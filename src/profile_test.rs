use super::*;

// =============================================================================
// Role
// =============================================================================

#[test]
fn role_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&Role::Student).unwrap(), "\"student\"");
    assert_eq!(serde_json::to_string(&Role::Pastor).unwrap(), "\"pastor\"");
}

#[test]
fn role_deserializes_lowercase() {
    let role: Role = serde_json::from_str("\"teacher\"").unwrap();
    assert_eq!(role, Role::Teacher);
}

#[test]
fn role_rejects_unknown_value() {
    let result = serde_json::from_str::<Role>("\"janitor\"");
    assert!(result.is_err());
}

#[test]
fn role_display_matches_as_str() {
    for role in [Role::Student, Role::Teacher, Role::Pastor, Role::Admin] {
        assert_eq!(role.to_string(), role.as_str());
    }
}

// =============================================================================
// Profile serde
// =============================================================================

#[test]
fn profile_round_trip() {
    let profile = test_helpers::profile_with_role(Role::Teacher);
    let json = serde_json::to_string(&profile).unwrap();
    let restored: Profile = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, profile);
}

#[test]
fn profile_created_at_is_rfc3339() {
    let profile = test_helpers::profile_with_role(Role::Student);
    let value: serde_json::Value = serde_json::to_value(&profile).unwrap();
    let created_at = value["created_at"].as_str().unwrap();
    assert!(created_at.contains('T'));
    assert!(created_at.ends_with('Z') || created_at.contains('+'));
}

#[test]
fn profile_parses_backend_row() {
    let json = r#"{
        "id": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
        "email": "ana@school.test",
        "full_name": "Ana Souza",
        "role": "student",
        "instrument": "violin",
        "avatar_url": null,
        "has_voted": false,
        "created_at": "2026-08-01T12:00:00Z"
    }"#;
    let profile: Profile = serde_json::from_str(json).unwrap();
    assert_eq!(profile.role, Role::Student);
    assert_eq!(profile.instrument.as_deref(), Some("violin"));
    assert!(!profile.has_voted);
}

// =============================================================================
// ProfileSeed / ProfilePatch
// =============================================================================

#[test]
fn student_seed_defaults() {
    let seed = ProfileSeed::student("Ana");
    assert_eq!(seed.role, Role::Student);
    assert_eq!(seed.full_name, "Ana");
    assert!(seed.instrument.is_none());
}

#[test]
fn patch_skips_none_fields() {
    let patch = ProfilePatch { has_voted: Some(true), ..ProfilePatch::default() };
    let json = serde_json::to_string(&patch).unwrap();
    assert_eq!(json, r#"{"has_voted":true}"#);
}

#[test]
fn empty_patch_serializes_to_empty_object() {
    let json = serde_json::to_string(&ProfilePatch::default()).unwrap();
    assert_eq!(json, "{}");
}

// =============================================================================
// test_helpers
// =============================================================================

#[test]
fn profile_aged_sets_age() {
    let p = test_helpers::profile_aged(Role::Student, false, 10);
    let age = OffsetDateTime::now_utc() - p.created_at;
    assert!(age >= time::Duration::days(10));
    assert!(age < time::Duration::days(11));
    assert!(!p.has_voted);
}
