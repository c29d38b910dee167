//! Logical route names and the fixed path sets the policies match against.
//!
//! Paths here are logical strings consumed by the router, not a wire
//! format. Prefix matching is segment-aware so `/profilephotos` does not
//! count as being inside `/profile`.

pub const HOME: &str = "/";
pub const LOGIN: &str = "/login";
pub const REGISTER: &str = "/register";
pub const LOGOUT: &str = "/logout";
pub const DASHBOARD: &str = "/dashboard";
pub const ADMIN: &str = "/admin";
pub const TEACHER_AREA: &str = "/teacher-area";
pub const STUDENT_AREA: &str = "/student-area";
pub const STUDENTS: &str = "/students";
pub const INSTRUMENTS: &str = "/instruments";
pub const MODULES: &str = "/modules";
pub const ACHIEVEMENTS: &str = "/achievements";
pub const DEVOTIONAL: &str = "/devotional";
pub const PROFILE: &str = "/profile";
pub const VOTE: &str = "/vote";

/// Routes reachable without a session.
pub const PUBLIC_ROUTES: &[&str] = &[HOME, LOGIN, REGISTER];

/// Feature-area namespaces where an authenticated user is left alone
/// (no post-login redirect fires once they are inside one of these).
pub const FEATURE_AREAS: &[&str] = &[
    TEACHER_AREA,
    ADMIN,
    INSTRUMENTS,
    MODULES,
    ACHIEVEMENTS,
    DEVOTIONAL,
    PROFILE,
    VOTE,
];

/// Routes exempt from the new-user vote gate.
pub const VOTE_EXEMPT: &[&str] = &[VOTE, PROFILE, LOGOUT];

/// Whether `path` is reachable without a session.
#[must_use]
pub fn is_public(path: &str) -> bool {
    PUBLIC_ROUTES.contains(&path)
}

/// Segment-aware prefix test: `/admin` matches `/admin` and `/admin/users`
/// but not `/administration`.
#[must_use]
pub fn starts_with_route(path: &str, prefix: &str) -> bool {
    if prefix == HOME {
        return path == HOME;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Whether `path` sits inside any of the given route prefixes.
#[must_use]
pub fn in_any(path: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|p| starts_with_route(path, p))
}

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;
