//! External collaborator contracts.
//!
//! The core never talks to the hosted backend directly. It goes through these
//! traits so the policy code stays independent of PostgreSQL, S3 and whatever
//! surface renders feedback to the user.

mod records;

use async_trait::async_trait;
use thiserror::Error;

pub use records::{AnnouncementRecord, Filter, MessageRecord, Patch, Record, Table, UserRecord};

use crate::session::Session;

/// Structured-data backend failures.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Database driver error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The filter or patch does not apply to the table.
    #[error("Unsupported operation on {table}: {column}")]
    Unsupported {
        table: &'static str,
        column: &'static str,
    },

    /// Any other backend fault (network, permissions, ...).
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Remote structured-data backend.
#[async_trait]
pub trait DataGateway: Send + Sync {
    /// Insert one record and return it as stored.
    async fn insert(&self, record: Record) -> Result<Record, GatewayError>;

    /// Apply `patch` to every row of `table` matching `filter`. Returns the
    /// number of rows affected.
    async fn update(&self, table: Table, filter: &Filter, patch: &Patch)
        -> Result<u64, GatewayError>;

    /// Fetch at most one row of `table` matching `filter`.
    async fn select_one(&self, table: Table, filter: &Filter)
        -> Result<Option<Record>, GatewayError>;
}

/// Object store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Key already taken and overwriting was not allowed.
    #[error("Object already exists: {0}")]
    AlreadyExists(String),

    /// Failed to upload object.
    #[error("Failed to upload object: {0}")]
    Upload(String),

    /// Failed to resolve a public URL.
    #[error("Failed to resolve public URL: {0}")]
    Url(String),

    /// Store configuration error.
    #[error("Storage configuration error: {0}")]
    Config(String),
}

/// Options for a single object write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutOptions {
    /// Replace an existing object under the same key.
    pub overwrite: bool,
    pub content_type: String,
    pub cache_control: Option<String>,
}

/// Publicly reachable object URL.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct PublicUrl(pub String);

impl PublicUrl {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PublicUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Remote binary blob storage.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>, options: PutOptions)
        -> Result<(), StoreError>;

    fn public_url(&self, key: &str) -> Result<PublicUrl, StoreError>;
}

/// Message composer failures.
#[derive(Debug, Error)]
pub enum ComposerError {
    #[error("Empty message")]
    Empty,

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Persists user chat messages (text plus optional attachment).
#[async_trait]
pub trait MessageComposer: Send + Sync {
    async fn post(
        &self,
        session: &Session,
        room: &str,
        text: &str,
        attachment_url: Option<&str>,
    ) -> Result<(), ComposerError>;
}

/// Presentation-only feedback channel.
pub trait NotificationSink: Send + Sync {
    fn show_error(&self, message: &str);
    fn show_success(&self, message: &str);
    /// The action went through but part of it did not.
    fn show_warning(&self, message: &str);
}
