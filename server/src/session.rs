//! Session context and role ranking.
//!
//! Every policy call receives the acting [`Session`] explicitly. Roles form a
//! total order (`user < admin < owner`) so privilege checks are plain
//! comparisons.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Chat role, ordered by rank.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular chat participant.
    #[default]
    User,
    /// Moderator: announcements, kicks, clearing rooms.
    Admin,
    /// Room owner: everything an admin can do plus managing admins.
    Owner,
}

impl Role {
    /// Numeric rank used for privilege comparisons.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::User => 0,
            Self::Admin => 1,
            Self::Owner => 2,
        }
    }

    /// Returns true when this role ranks at least as high as `required`.
    #[must_use]
    pub const fn satisfies(self, required: Self) -> bool {
        self.rank() >= required.rank()
    }

    /// Lowercase name, as stored in the `users.role` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::Owner => "owner",
        }
    }

    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::User, Self::Admin, Self::Owner]
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a role name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "owner" => Ok(Self::Owner),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// The acting user for a single command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Uuid,
    pub username: String,
    pub display_name: String,
    pub role: Role,
}

impl Session {
    #[must_use]
    pub fn new(
        user_id: Uuid,
        username: impl Into<String>,
        display_name: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            user_id,
            username: username.into(),
            display_name: display_name.into(),
            role,
        }
    }

    /// Case-insensitive comparison against this session's username.
    #[must_use]
    pub fn is_self(&self, username: &str) -> bool {
        self.username.to_lowercase() == username.to_lowercase()
    }
}
