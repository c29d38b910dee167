use super::*;

// =============================================================================
// is_public
// =============================================================================

#[test]
fn login_register_home_are_public() {
    assert!(is_public(HOME));
    assert!(is_public(LOGIN));
    assert!(is_public(REGISTER));
}

#[test]
fn dashboard_is_not_public() {
    assert!(!is_public(DASHBOARD));
}

#[test]
fn login_subpath_is_not_public() {
    assert!(!is_public("/login/reset"));
}

// =============================================================================
// starts_with_route
// =============================================================================

#[test]
fn exact_match() {
    assert!(starts_with_route(ADMIN, ADMIN));
}

#[test]
fn subpath_match() {
    assert!(starts_with_route("/admin/users/3", ADMIN));
}

#[test]
fn sibling_name_does_not_match() {
    assert!(!starts_with_route("/administration", ADMIN));
    assert!(!starts_with_route("/profilephotos", PROFILE));
}

#[test]
fn home_matches_only_itself() {
    assert!(starts_with_route("/", HOME));
    assert!(!starts_with_route("/anything", HOME));
}

// =============================================================================
// in_any
// =============================================================================

#[test]
fn feature_areas_contain_vote_subpath() {
    assert!(in_any("/vote/results", FEATURE_AREAS));
}

#[test]
fn student_area_is_not_a_listed_feature_area() {
    assert!(!in_any(STUDENT_AREA, FEATURE_AREAS));
}

#[test]
fn vote_exempt_covers_own_profile() {
    assert!(in_any("/profile", VOTE_EXEMPT));
    assert!(in_any("/profile/edit", VOTE_EXEMPT));
    assert!(!in_any("/instruments", VOTE_EXEMPT));
}
