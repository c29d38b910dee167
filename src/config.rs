//! Engine tuning knobs, loaded from environment variables.
//!
//! The vote-gate window is deliberately NOT here: it is product policy,
//! not a tuning knob, and lives as a constant next to the redirect rules.

use std::time::Duration;

const DEFAULT_PROFILE_TTL_MS: u64 = 30_000;
const DEFAULT_REDIRECT_COOLDOWN_MS: u64 = 1_000;
const DEFAULT_PROFILE_RETRY_ATTEMPTS: u32 = 3;
const DEFAULT_PROFILE_RETRY_BACKOFF_MS: u64 = 400;

/// Timing configuration for the session engine.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// How long a cached profile stays fresh.
    pub profile_ttl: Duration,
    /// Window during which a second non-forced redirect is dropped.
    pub redirect_cooldown: Duration,
    /// Fetch attempts while waiting for the signup trigger to materialize
    /// the profile row.
    pub profile_retry_attempts: u32,
    /// Delay before each materialization fetch attempt.
    pub profile_retry_backoff: Duration,
}

impl EngineConfig {
    /// Load from `PORTALGUARD_*` environment variables, falling back to
    /// the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            profile_ttl: Duration::from_millis(env_parse("PORTALGUARD_PROFILE_TTL_MS", DEFAULT_PROFILE_TTL_MS)),
            redirect_cooldown: Duration::from_millis(env_parse(
                "PORTALGUARD_REDIRECT_COOLDOWN_MS",
                DEFAULT_REDIRECT_COOLDOWN_MS,
            )),
            profile_retry_attempts: env_parse("PORTALGUARD_PROFILE_RETRY_ATTEMPTS", DEFAULT_PROFILE_RETRY_ATTEMPTS),
            profile_retry_backoff: Duration::from_millis(env_parse(
                "PORTALGUARD_PROFILE_RETRY_BACKOFF_MS",
                DEFAULT_PROFILE_RETRY_BACKOFF_MS,
            )),
        }
    }

    /// Shrunk timings so tests never sleep meaningfully.
    #[cfg(test)]
    #[must_use]
    pub fn for_tests() -> Self {
        Self {
            profile_ttl: Duration::from_secs(60),
            redirect_cooldown: Duration::from_millis(1_000),
            profile_retry_attempts: 2,
            profile_retry_backoff: Duration::ZERO,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            profile_ttl: Duration::from_millis(DEFAULT_PROFILE_TTL_MS),
            redirect_cooldown: Duration::from_millis(DEFAULT_REDIRECT_COOLDOWN_MS),
            profile_retry_attempts: DEFAULT_PROFILE_RETRY_ATTEMPTS,
            profile_retry_backoff: Duration::from_millis(DEFAULT_PROFILE_RETRY_BACKOFF_MS),
        }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
