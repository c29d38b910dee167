//! Role permission policy — static decision table, one entry per role.
//!
//! DESIGN
//! ======
//! `has_permission` is pure and total: every `(profile, path)` pair yields a
//! deterministic boolean with no I/O, so the table can be exercised
//! exhaustively in unit tests. Evaluation order: public paths, admin
//! wildcard, forbidden prefixes, allowed prefixes, default deny.

use crate::profile::{Profile, Role};
use crate::routes;

/// Wildcard entry granting every path.
const ALL: &str = "*";

/// Paths every authenticated role may visit regardless of its allowed list.
/// The vote page must stay reachable for whichever role the vote gate sends
/// there, and logout must never be blocked.
const ALWAYS_ALLOWED: &[&str] = &[routes::VOTE, routes::LOGOUT];

const TEACHER_ALLOWED: &[&str] = &[
    routes::TEACHER_AREA,
    routes::STUDENTS,
    routes::INSTRUMENTS,
    routes::MODULES,
    routes::DASHBOARD,
    routes::ACHIEVEMENTS,
    routes::DEVOTIONAL,
    routes::PROFILE,
];

const STUDENT_ALLOWED: &[&str] = &[
    routes::STUDENT_AREA,
    routes::INSTRUMENTS,
    routes::MODULES,
    routes::DASHBOARD,
    routes::ACHIEVEMENTS,
    routes::DEVOTIONAL,
    routes::PROFILE,
];

/// Per-role route policy: allowed prefixes, forbidden prefixes, and the
/// default landing dashboard.
#[derive(Debug, Clone, Copy)]
pub struct RolePolicy {
    pub allowed: &'static [&'static str],
    pub forbidden: &'static [&'static str],
    pub dashboard: &'static str,
}

const ADMIN_POLICY: RolePolicy =
    RolePolicy { allowed: &[ALL], forbidden: &[], dashboard: routes::ADMIN };

const TEACHER_POLICY: RolePolicy = RolePolicy {
    allowed: TEACHER_ALLOWED,
    forbidden: &[routes::ADMIN],
    dashboard: routes::TEACHER_AREA,
};

// Pastors share the teacher surface; only the role label differs.
const PASTOR_POLICY: RolePolicy = RolePolicy {
    allowed: TEACHER_ALLOWED,
    forbidden: &[routes::ADMIN],
    dashboard: routes::TEACHER_AREA,
};

const STUDENT_POLICY: RolePolicy = RolePolicy {
    allowed: STUDENT_ALLOWED,
    forbidden: &[routes::ADMIN, routes::TEACHER_AREA],
    dashboard: routes::STUDENT_AREA,
};

/// Look up the static policy for a role.
#[must_use]
pub fn policy_for(role: Role) -> &'static RolePolicy {
    match role {
        Role::Admin => &ADMIN_POLICY,
        Role::Teacher => &TEACHER_POLICY,
        Role::Pastor => &PASTOR_POLICY,
        Role::Student => &STUDENT_POLICY,
    }
}

/// Default landing dashboard for a role.
#[must_use]
pub fn dashboard_for(role: Role) -> &'static str {
    policy_for(role).dashboard
}

/// Whether `profile` may visit `path`.
#[must_use]
pub fn has_permission(profile: &Profile, path: &str) -> bool {
    if routes::is_public(path) || routes::in_any(path, ALWAYS_ALLOWED) {
        return true;
    }
    if profile.role == Role::Admin {
        return true;
    }
    let policy = policy_for(profile.role);
    if routes::in_any(path, policy.forbidden) {
        return false;
    }
    if policy.allowed.contains(&ALL) {
        return true;
    }
    routes::in_any(path, policy.allowed)
}

#[cfg(test)]
#[path = "permission_test.rs"]
mod tests;
