//! Explicit column allow-lists for every read path over posts.
//!
//! Records here are the raw store shape and deliberately do not implement
//! `Serialize`: they still carry the true author id, so they must pass
//! through [`crate::feedback::anonymize`] before reaching a client.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

/// Which fields a read path is allowed to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// Post fields, author summary, read markers and a comment count.
    Default,
    /// `Default` plus the ordered comment list.
    WithComments,
}

/// Columns for the `Default` projection, selected from `posts p JOIN users u`.
pub const POST_COLUMNS: &str = "p.id, p.title, p.content, p.content_html, p.created_at, \
     p.updated_at, p.anonymous, p.author_id, u.name, u.image, \
     (SELECT COUNT(*) FROM comments cc WHERE cc.post_id = p.id)";

pub const POST_FROM: &str = "posts p JOIN users u ON u.id = p.author_id";

const READ_MARKERS_SQL: &str = "SELECT rm.user_id, rm.created_at, u.name, u.image
     FROM read_markers rm
     JOIN users u ON u.id = rm.user_id
     WHERE rm.post_id = ?1
     ORDER BY rm.created_at ASC, rm.user_id ASC";

const COMMENTS_SQL: &str = "SELECT c.id, c.content, c.created_at, u.name, u.image
     FROM comments c
     JOIN users u ON u.id = c.author_id
     WHERE c.post_id = ?1
     ORDER BY c.created_at ASC, c.id ASC";

/// Minimal public identity of a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorRecord {
    pub name: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadMarkerRecord {
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub user: AuthorRecord,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentRecord {
    pub id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author: AuthorRecord,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostRecord {
    pub id: String,
    pub title: String,
    pub content: String,
    pub content_html: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub anonymous: bool,
    pub author_id: String,
    pub author: AuthorRecord,
    pub read_markers: Vec<ReadMarkerRecord>,
    pub comment_count: i64,
    /// Present only under [`Projection::WithComments`].
    pub comments: Option<Vec<CommentRecord>>,
}

impl PostRecord {
    /// Map a row selected with [`POST_COLUMNS`]. Relations are loaded
    /// separately by [`load_relations`].
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(PostRecord {
            id: row.get(0)?,
            title: row.get(1)?,
            content: row.get(2)?,
            content_html: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
            anonymous: row.get(6)?,
            author_id: row.get(7)?,
            author: AuthorRecord {
                name: row.get(8)?,
                image: row.get(9)?,
            },
            read_markers: Vec::new(),
            comment_count: row.get(10)?,
            comments: None,
        })
    }
}

/// Fill in the relations a projection asks for.
pub fn load_relations(
    conn: &Connection,
    post: &mut PostRecord,
    projection: Projection,
) -> rusqlite::Result<()> {
    post.read_markers = read_markers(conn, &post.id)?;
    post.comments = match projection {
        Projection::Default => None,
        Projection::WithComments => Some(comments(conn, &post.id)?),
    };
    Ok(())
}

fn read_markers(conn: &Connection, post_id: &str) -> rusqlite::Result<Vec<ReadMarkerRecord>> {
    let mut stmt = conn.prepare_cached(READ_MARKERS_SQL)?;
    let rows = stmt.query_map(params![post_id], |row| {
        Ok(ReadMarkerRecord {
            user_id: row.get(0)?,
            created_at: row.get(1)?,
            user: AuthorRecord {
                name: row.get(2)?,
                image: row.get(3)?,
            },
        })
    })?;
    rows.collect()
}

fn comments(conn: &Connection, post_id: &str) -> rusqlite::Result<Vec<CommentRecord>> {
    let mut stmt = conn.prepare_cached(COMMENTS_SQL)?;
    let rows = stmt.query_map(params![post_id], |row| {
        Ok(CommentRecord {
            id: row.get(0)?,
            content: row.get(1)?,
            created_at: row.get(2)?,
            author: AuthorRecord {
                name: row.get(3)?,
                image: row.get(4)?,
            },
        })
    })?;
    rows.collect()
}

/// Load one post under `projection`, or `None` when absent.
pub fn find_post(
    conn: &Connection,
    id: &str,
    projection: Projection,
) -> rusqlite::Result<Option<PostRecord>> {
    let sql = format!("SELECT {} FROM {} WHERE p.id = ?1", POST_COLUMNS, POST_FROM);
    let post = conn.query_row(&sql, params![id], PostRecord::from_row);

    match post {
        Ok(mut post) => {
            load_relations(conn, &mut post, projection)?;
            Ok(Some(post))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}
