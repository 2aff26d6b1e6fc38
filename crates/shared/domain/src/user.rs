//! User identity entities and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{
    GENERATED_DISPLAY_NAME_PREFIX, ROLE_ADMIN, ROLE_BOSS, ROLE_PLAYER, ROLE_REVIEWER,
};

/// User roles enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Player,
    Boss,
    Reviewer,
    Admin,
}

impl UserRole {
    /// Map an optional role hint to a role.
    ///
    /// Matching is case-insensitive. A missing or unrecognized hint
    /// silently falls back to [`UserRole::Player`].
    pub fn from_hint(hint: Option<&str>) -> Self {
        hint.map(UserRole::from).unwrap_or(UserRole::Player)
    }

    /// Canonical storage value
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Player => ROLE_PLAYER,
            UserRole::Boss => ROLE_BOSS,
            UserRole::Reviewer => ROLE_REVIEWER,
            UserRole::Admin => ROLE_ADMIN,
        }
    }
}

impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            ROLE_BOSS => UserRole::Boss,
            ROLE_REVIEWER => UserRole::Reviewer,
            ROLE_ADMIN => UserRole::Admin,
            _ => UserRole::Player,
        }
    }
}

impl From<String> for UserRole {
    fn from(s: String) -> Self {
        UserRole::from(s.as_str())
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.as_str().to_string()
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Internal user identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub display_name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

/// Display name given to a user created on first sight of an external id
pub fn generated_display_name(external_id: &str) -> String {
    format!("{}{}", GENERATED_DISPLAY_NAME_PREFIX, external_id)
}
