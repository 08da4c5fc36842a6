//! Database row types. These map directly to SQLite rows and stay separate
//! from the wire types in `jotter-types`.

use chrono::{DateTime, NaiveDateTime, Utc};
use jotter_types::api::{PostResponse, UserResponse};
use tracing::warn;

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub created_at: String,
}

pub struct PostRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub user_id: i64,
    pub author_username: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Outcome of a write that only the owner of a row may perform.
#[derive(Debug, PartialEq, Eq)]
pub enum OwnerCheck<T> {
    NotFound,
    NotOwner,
    Applied(T),
}

impl From<UserRow> for UserResponse {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
        }
    }
}

impl From<PostRow> for PostResponse {
    fn from(row: PostRow) -> Self {
        let created_at = parse_timestamp(&row.created_at, row.id);
        let updated_at = parse_timestamp(&row.updated_at, row.id);
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            user_id: row.user_id,
            author_username: row.author_username,
            created_at,
            updated_at,
        }
    }
}

/// SQLite's `datetime('now')` yields "YYYY-MM-DD HH:MM:SS" in UTC with no
/// offset, so parse as naive and attach UTC.
fn parse_timestamp(raw: &str, post_id: i64) -> DateTime<Utc> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|ndt| ndt.and_utc())
        .or_else(|_| raw.parse::<DateTime<Utc>>())
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}' on post {}: {}", raw, post_id, e);
            DateTime::default()
        })
}
