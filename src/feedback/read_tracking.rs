use async_graphql::SimpleObject;
use chrono::Utc;
use rusqlite::{params, Connection};
use serde::Serialize;

use crate::db::models::ReadMarker;
use crate::error::AppResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCount {
    /// Visible posts minus the viewer's read markers. Not clamped: markers
    /// on posts that have since been hidden can push this below zero.
    pub unread_count: i64,
    pub total_count: i64,
}

/// Number of read markers the user has left, on any post.
pub fn read_count(conn: &Connection, user_id: &str) -> AppResult<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM read_markers WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Number of posts that are not hidden.
pub fn visible_count(conn: &Connection) -> AppResult<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM posts WHERE hidden = 0", [], |row| {
        row.get(0)
    })?;
    Ok(count)
}

pub fn unread_count(conn: &Connection, user_id: &str) -> AppResult<UnreadCount> {
    let read = read_count(conn, user_id)?;
    let total = visible_count(conn)?;
    Ok(UnreadCount {
        unread_count: total - read,
        total_count: total,
    })
}

/// Record that `user_id` has read `post_id`.
///
/// A single upsert statement, so concurrent calls for the same pair cannot
/// produce two markers. An existing marker is returned unchanged. A missing
/// post fails the foreign key and the store error is returned as-is.
pub fn set_read(conn: &Connection, user_id: &str, post_id: &str) -> AppResult<ReadMarker> {
    let marker = conn.query_row(
        "INSERT INTO read_markers (user_id, post_id, created_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(user_id, post_id) DO UPDATE SET user_id = read_markers.user_id
         RETURNING user_id, post_id, created_at",
        params![user_id, post_id, Utc::now()],
        |row| {
            Ok(ReadMarker {
                user_id: row.get(0)?,
                post_id: row.get(1)?,
                created_at: row.get(2)?,
            })
        },
    )?;
    Ok(marker)
}
