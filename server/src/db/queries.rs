//! Database Queries
//!
//! Runtime queries (no compile-time `DATABASE_URL` required).
//!
//! All query functions include error context logging to aid debugging.

use sqlx::PgPool;
use tracing::error;

use crate::gateway::{AnnouncementRecord, Filter, MessageRecord, Patch, Table, UserRecord};

/// Log and return a database error with context.
macro_rules! db_error {
    ($query:expr, $($field:tt)*) => {
        |e| {
            error!(query = $query, $($field)*, error = %e, "Database query failed");
            e
        }
    };
}

// ============================================================================
// Inserts
// ============================================================================

/// Insert an announcement.
pub async fn insert_announcement(
    pool: &PgPool,
    record: &AnnouncementRecord,
) -> sqlx::Result<AnnouncementRecord> {
    sqlx::query_as::<_, AnnouncementRecord>(
        r"
        INSERT INTO announcements (text, created_by, timestamp, read_by)
        VALUES ($1, $2, $3, $4)
        RETURNING text, created_by, timestamp, read_by
        ",
    )
    .bind(&record.text)
    .bind(record.created_by)
    .bind(record.timestamp)
    .bind(&record.read_by)
    .fetch_one(pool)
    .await
    .map_err(db_error!("insert_announcement", created_by = %record.created_by))
}

/// Insert a chat message.
pub async fn insert_message(pool: &PgPool, record: &MessageRecord) -> sqlx::Result<MessageRecord> {
    sqlx::query_as::<_, MessageRecord>(
        r"
        INSERT INTO messages (text, sender_id, sender_name, room, timestamp, likes, dislikes, deleted, image_url)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING text, sender_id, sender_name, room, timestamp, likes, dislikes, deleted, image_url
        ",
    )
    .bind(&record.text)
    .bind(record.sender_id)
    .bind(&record.sender_name)
    .bind(&record.room)
    .bind(record.timestamp)
    .bind(&record.likes)
    .bind(&record.dislikes)
    .bind(record.deleted)
    .bind(&record.image_url)
    .fetch_one(pool)
    .await
    .map_err(db_error!("insert_message", room = %record.room))
}

// ============================================================================
// Updates and lookups
// ============================================================================

/// Apply a single-column patch to the rows matching `filter`.
///
/// Table and column names come from closed enums, never from user input.
pub async fn update_rows(
    pool: &PgPool,
    table: Table,
    filter: &Filter,
    patch: &Patch,
) -> sqlx::Result<u64> {
    let sql = format!(
        "UPDATE {} SET {} = $1 WHERE {} = $2",
        table.as_str(),
        patch.column(),
        filter.column()
    );

    let query = sqlx::query(&sql);
    let query = match patch {
        Patch::Online(value) | Patch::Deleted(value) => query.bind(*value),
        Patch::Role(role) => query.bind(role.as_str()),
    };
    let query = match filter {
        Filter::Username(value) | Filter::Room(value) => query.bind(value),
    };

    let result = query
        .execute(pool)
        .await
        .map_err(db_error!("update_rows", table = table.as_str(), column = patch.column()))?;

    Ok(result.rows_affected())
}

/// Find user by username.
pub async fn find_user_by_username(
    pool: &PgPool,
    username: &str,
) -> sqlx::Result<Option<UserRecord>> {
    sqlx::query_as::<_, UserRecord>("SELECT username, role, online FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await
        .map_err(db_error!("find_user_by_username", username = %username))
}
