//! Acting-user types carried through mutating operations.
//!
//! User accounts live outside this crate. Services only need enough of the
//! actor to answer permission checks and stamp audit records.

use super::{ActorId, ParseUserRoleError};
use serde::{Deserialize, Serialize};

/// Role held by an acting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Full administrative access across all groups.
    SuperAdmin,
    /// Administrative access across all groups.
    Admin,
    /// Elevated access without group administration rights.
    Manager,
    /// Regular user; may only modify groups they own.
    User,
}

impl UserRole {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::User => "user",
        }
    }

    /// Whether the role grants modification rights over groups the actor
    /// does not own.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::SuperAdmin | Self::Admin)
    }
}

impl TryFrom<&str> for UserRole {
    type Error = ParseUserRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "super_admin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "user" => Ok(Self::User),
            _ => Err(ParseUserRoleError(value.to_owned())),
        }
    }
}

/// The user on whose behalf a mutating operation runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Actor identifier.
    pub id: ActorId,
    /// Display name recorded in audit entries.
    pub name: String,
    /// Role used for permission checks.
    pub role: UserRole,
}

impl Actor {
    /// Creates an actor descriptor.
    #[must_use]
    pub fn new(id: ActorId, name: impl Into<String>, role: UserRole) -> Self {
        Self {
            id,
            name: name.into(),
            role,
        }
    }
}
