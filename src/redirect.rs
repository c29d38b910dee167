//! Redirect policy — ordered rule list turning (profile, path) into a
//! navigation decision.
//!
//! DESIGN
//! ======
//! Rules are evaluated top to bottom and the first match wins. The order is
//! load-bearing: permission enforcement dominates the vote gate, which
//! dominates post-login redirects, which dominate the stay-where-you-are
//! rules. Reordering either opens an access-control bypass or produces a
//! redirect loop.
//!
//! The public `decide` reads the clock itself; `decide_at` takes an explicit
//! `now` so the vote-gate age boundary is deterministic under test.

use time::{Duration, OffsetDateTime};

use crate::permission;
use crate::profile::Profile;
use crate::routes;

/// New accounts are forced to the logo vote for this many days after
/// creation, inclusive. Older unvoted accounts are left alone.
pub const VOTE_WINDOW_DAYS: i64 = 7;

/// Outcome of a redirect evaluation. Recomputed on every navigation and
/// auth event; carries no state of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectDecision {
    pub should_redirect: bool,
    pub target_path: Option<String>,
    pub reason: &'static str,
}

impl RedirectDecision {
    /// Stay on the current path.
    #[must_use]
    pub fn stay(reason: &'static str) -> Self {
        Self { should_redirect: false, target_path: None, reason }
    }

    /// Navigate to `target`.
    #[must_use]
    pub fn to(target: impl Into<String>, reason: &'static str) -> Self {
        Self { should_redirect: true, target_path: Some(target.into()), reason }
    }
}

/// Evaluation options for [`decide`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DecideOptions {
    /// Force a landing redirect even off the public pages (used right
    /// after sign-in and sign-up).
    pub force: bool,
}

/// Decide whether the user must be redirected away from `current_path`.
#[must_use]
pub fn decide(profile: Option<&Profile>, current_path: &str, opts: DecideOptions) -> RedirectDecision {
    decide_at(profile, current_path, opts, OffsetDateTime::now_utc())
}

/// [`decide`] with an explicit clock.
#[must_use]
pub fn decide_at(
    profile: Option<&Profile>,
    current_path: &str,
    opts: DecideOptions,
    now: OffsetDateTime,
) -> RedirectDecision {
    // Rule 1: without a profile there is nothing to decide against.
    let Some(profile) = profile else {
        return RedirectDecision::stay("no profile available");
    };

    let dashboard = permission::dashboard_for(profile.role);

    // Rule 2: access control dominates everything, including forced
    // redirects.
    if !permission::has_permission(profile, current_path) {
        return RedirectDecision::to(dashboard, "access denied");
    }

    // Rule 3: time-boxed vote gate for new accounts.
    if !profile.has_voted
        && now - profile.created_at <= Duration::days(VOTE_WINDOW_DAYS)
        && !routes::in_any(current_path, routes::VOTE_EXEMPT)
    {
        return RedirectDecision::to(routes::VOTE, "new user must vote first");
    }

    // Rule 4: explicit forced landing.
    if opts.force {
        return RedirectDecision::to(dashboard, "forced redirect");
    }

    // Rule 5: authenticated users do not linger on the public pages.
    if routes::is_public(current_path) {
        return RedirectDecision::to(dashboard, "post-login redirect");
    }

    // Rule 6: already inside a feature area.
    if routes::in_any(current_path, routes::FEATURE_AREAS) {
        return RedirectDecision::stay("already in specific route");
    }

    // Rule 7: the generic dashboard upgrades to the role-specific one.
    if current_path == routes::DASHBOARD {
        return RedirectDecision::to(dashboard, "upgrade to role dashboard");
    }

    // Rule 8: nothing applies.
    RedirectDecision::stay("no redirect needed")
}

#[cfg(test)]
#[path = "redirect_test.rs"]
mod tests;
