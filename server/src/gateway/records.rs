//! Record shapes exchanged with the hosted backend.
//!
//! Field names match the backend's table columns exactly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::session::Role;

/// Backend tables touched by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Announcements,
    Messages,
    Users,
}

impl Table {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Announcements => "announcements",
            Self::Messages => "messages",
            Self::Users => "users",
        }
    }
}

/// Row selector for updates and lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `username = <value>` on `users`.
    Username(String),
    /// `room = <value>` on `messages`.
    Room(String),
}

impl Filter {
    #[must_use]
    pub const fn column(&self) -> &'static str {
        match self {
            Self::Username(_) => "username",
            Self::Room(_) => "room",
        }
    }

    #[must_use]
    pub const fn applies_to(&self, table: Table) -> bool {
        matches!(
            (self, table),
            (Self::Username(_), Table::Users) | (Self::Room(_), Table::Messages)
        )
    }

    /// Whether a record carries this filter's value.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        match (self, record) {
            (Self::Username(name), Record::User(user)) => user.username == *name,
            (Self::Room(room), Record::Message(msg)) => msg.room == *room,
            _ => false,
        }
    }
}

/// Single-column change applied by an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Patch {
    Online(bool),
    Role(Role),
    Deleted(bool),
}

impl Patch {
    #[must_use]
    pub const fn column(&self) -> &'static str {
        match self {
            Self::Online(_) => "online",
            Self::Role(_) => "role",
            Self::Deleted(_) => "deleted",
        }
    }

    #[must_use]
    pub const fn applies_to(&self, table: Table) -> bool {
        matches!(
            (self, table),
            (Self::Online(_) | Self::Role(_), Table::Users) | (Self::Deleted(_), Table::Messages)
        )
    }

    /// Apply the change to a record in place. Returns false when the patch
    /// does not fit the record.
    pub fn apply(&self, record: &mut Record) -> bool {
        match (self, record) {
            (Self::Online(online), Record::User(user)) => {
                user.online = *online;
                true
            }
            (Self::Role(role), Record::User(user)) => {
                user.role = *role;
                true
            }
            (Self::Deleted(deleted), Record::Message(msg)) => {
                msg.deleted = *deleted;
                true
            }
            _ => false,
        }
    }
}

/// `announcements` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AnnouncementRecord {
    pub text: String,
    pub created_by: Uuid,
    pub timestamp: DateTime<Utc>,
    pub read_by: Vec<Uuid>,
}

/// `messages` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct MessageRecord {
    pub text: String,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub room: String,
    pub timestamp: DateTime<Utc>,
    pub likes: Vec<Uuid>,
    pub dislikes: Vec<Uuid>,
    pub deleted: bool,
    /// Public URL of an attached image, set only on image messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl MessageRecord {
    /// A fresh, undeleted message with no reactions, stamped now.
    #[must_use]
    pub fn new(
        sender_id: Uuid,
        sender_name: impl Into<String>,
        room: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            sender_id,
            sender_name: sender_name.into(),
            room: room.into(),
            timestamp: Utc::now(),
            likes: Vec::new(),
            dislikes: Vec::new(),
            deleted: false,
            image_url: None,
        }
    }

    #[must_use]
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }
}

/// `users` row, as far as moderation cares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserRecord {
    pub username: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub online: bool,
}

/// Any record the gateway can insert or return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Announcement(AnnouncementRecord),
    Message(MessageRecord),
    User(UserRecord),
}

impl Record {
    #[must_use]
    pub const fn table(&self) -> Table {
        match self {
            Self::Announcement(_) => Table::Announcements,
            Self::Message(_) => Table::Messages,
            Self::User(_) => Table::Users,
        }
    }

    #[must_use]
    pub fn into_user(self) -> Option<UserRecord> {
        match self {
            Self::User(user) => Some(user),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_message(&self) -> Option<&MessageRecord> {
        match self {
            Self::Message(msg) => Some(msg),
            _ => None,
        }
    }
}
