//! Route guards — pure evaluations of the current session snapshot.
//!
//! DESIGN
//! ======
//! The router asks a guard what to do with a route subtree and renders the
//! answer: the children, a loading placeholder, or a navigation redirect.
//! Guards hold no state and perform no I/O; they are a UI-level convenience
//! layered on top of the permission policy, not a replacement for it.

use crate::permission;
use crate::profile::Role;
use crate::routes;
use crate::session::SessionSnapshot;

/// What the router should render for a guarded subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Session not settled yet; show a loading placeholder.
    Loading,
    /// Render the guarded children.
    Render,
    /// Navigate to the given path instead of rendering.
    Redirect(String),
}

/// Gate for routes that require a signed-in user.
#[must_use]
pub fn require_authenticated(snapshot: &SessionSnapshot) -> GuardOutcome {
    if snapshot.is_loading() {
        return GuardOutcome::Loading;
    }
    if !snapshot.is_authenticated() {
        return GuardOutcome::Redirect(routes::LOGIN.to_owned());
    }
    GuardOutcome::Render
}

/// Gate for routes restricted to specific roles. Users outside `roles`
/// are sent to their own dashboard; users with no profile row yet fall
/// back to the generic dashboard.
#[must_use]
pub fn require_role(snapshot: &SessionSnapshot, roles: &[Role]) -> GuardOutcome {
    match require_authenticated(snapshot) {
        GuardOutcome::Render => {}
        other => return other,
    }
    let Some(profile) = &snapshot.profile else {
        return GuardOutcome::Redirect(routes::DASHBOARD.to_owned());
    };
    if roles.contains(&profile.role) {
        GuardOutcome::Render
    } else {
        GuardOutcome::Redirect(permission::dashboard_for(profile.role).to_owned())
    }
}

/// Inverse gate for public-only pages (login, register): signed-in users
/// are sent straight to their dashboard.
#[must_use]
pub fn redirect_if_authenticated(snapshot: &SessionSnapshot) -> GuardOutcome {
    if snapshot.is_loading() {
        return GuardOutcome::Loading;
    }
    if snapshot.is_authenticated() {
        let target = snapshot
            .profile
            .as_ref()
            .map_or(routes::DASHBOARD, |p| permission::dashboard_for(p.role));
        return GuardOutcome::Redirect(target.to_owned());
    }
    GuardOutcome::Render
}

#[cfg(test)]
#[path = "guards_test.rs"]
mod tests;
