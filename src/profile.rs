//! Profile records — the authorization-relevant projection of a portal user.
//!
//! DESIGN
//! ======
//! `Profile` carries exactly what the policy layers need (role, vote flag,
//! account age) plus the display attributes the portal shows in headers and
//! cards. The role is immutable from this crate's point of view; role changes
//! are an out-of-band admin operation against the backing store.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Access-control role assigned to every profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Pastor,
    Admin,
}

impl Role {
    /// Stable lowercase name, matching the stored representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Pastor => "pastor",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Profile row for an authenticated identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Profile id; equal to the identity-provider user id.
    pub id: Uuid,
    /// Contact email, mirrored from the identity record.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Access-control role.
    pub role: Role,
    /// Primary instrument, if the user picked one.
    pub instrument: Option<String>,
    /// Avatar image URL, if uploaded.
    pub avatar_url: Option<String>,
    /// Whether the user has cast their logo vote.
    pub has_voted: bool,
    /// Account creation time; drives the new-user vote gate.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Signup metadata used to materialize a profile row when the backend
/// trigger has not created one yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSeed {
    pub full_name: String,
    pub role: Role,
    pub instrument: Option<String>,
}

impl ProfileSeed {
    /// Seed for a plain student signup.
    #[must_use]
    pub fn student(full_name: impl Into<String>) -> Self {
        Self { full_name: full_name.into(), role: Role::Student, instrument: None }
    }
}

/// Partial profile update. `None` fields are left untouched by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instrument: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_voted: Option<bool>,
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;
