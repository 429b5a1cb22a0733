use async_graphql::InputObject;
use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::feedback::anonymize::{anonymize, AuthorView, CommentView, PostView};
use crate::feedback::filter::PostFilter;
use crate::feedback::markup::render_markdown;
use crate::feedback::pagination::{Page, PageRequest};
use crate::feedback::projection::{
    find_post, load_relations, PostRecord, Projection, POST_COLUMNS, POST_FROM,
};
use crate::feedback::read_tracking;

pub use crate::feedback::read_tracking::UnreadCount;
pub use crate::db::models::ReadMarker;

fn default_published() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 10000))]
    pub content: String,
    #[serde(default)]
    #[graphql(default)]
    pub anonymous: bool,
    #[serde(default = "default_published")]
    #[graphql(default = true)]
    pub published: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
pub struct NewComment {
    #[validate(length(min = 1, max = 2000))]
    pub content: String,
}

/// One page of posts matching `filter`, anonymized for `viewer`.
pub fn list(
    conn: &Connection,
    viewer: &CurrentUser,
    filter: PostFilter,
    page: &PageRequest,
) -> AppResult<Page<PostView>> {
    let predicate = filter.predicate(&viewer.id);
    let mut sql = format!(
        "SELECT {} FROM {} WHERE {}",
        POST_COLUMNS, POST_FROM, predicate.sql
    );
    let mut values = predicate.params;

    if let Some(cursor) = &page.cursor {
        sql.push_str(&format!(
            " AND (p.created_at, p.id) {} (SELECT cp.created_at, cp.id FROM posts cp WHERE cp.id = ?)",
            page.order.cursor_comparison()
        ));
        values.push(Value::Text(cursor.clone()));
    }

    let direction = page.order.keyword();
    sql.push_str(&format!(
        " ORDER BY p.created_at {}, p.id {} LIMIT ?",
        direction, direction
    ));
    values.push(Value::Integer(i64::from(page.fetch_size())));

    let rows = {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values), PostRecord::from_row)?;
        rows.collect::<Result<Vec<_>, _>>()?
    };

    let mut result = Page::from_overfetch(rows, page.limit, |post| post.id.as_str());
    for post in result.items.iter_mut() {
        load_relations(conn, post, Projection::Default)?;
    }

    tracing::debug!(
        "Listed {} posts for filter {:?} (more: {})",
        result.items.len(),
        filter,
        result.next_cursor.is_some()
    );

    Ok(result.map(|post| anonymize(post, &viewer.id)))
}

/// A single post with its comments.
pub fn by_id(conn: &Connection, viewer: &CurrentUser, id: &str) -> AppResult<PostView> {
    let post = find_post(conn, id, Projection::WithComments)?
        .ok_or_else(|| AppError::post_not_found(id))?;
    Ok(anonymize(post, &viewer.id))
}

pub fn add(conn: &Connection, viewer: &CurrentUser, input: NewPost) -> AppResult<PostView> {
    let input = NewPost {
        title: input.title.trim().to_string(),
        content: input.content.trim().to_string(),
        ..input
    };
    input.validate()?;

    let id = uuid::Uuid::now_v7().to_string();
    let now = Utc::now();
    let content_html = render_markdown(&input.content);

    conn.execute(
        "INSERT INTO posts (id, title, content, content_html, anonymous, published, author_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
        params![
            id,
            input.title,
            input.content,
            content_html,
            input.anonymous,
            input.published,
            viewer.id,
            now
        ],
    )?;
    tracing::info!("Post {} created by {}", id, viewer.id);

    let post = find_post(conn, &id, Projection::Default)?
        .ok_or_else(|| AppError::Internal(format!("post {} vanished after insert", id)))?;
    Ok(anonymize(post, &viewer.id))
}

pub fn add_comment(
    conn: &Connection,
    viewer: &CurrentUser,
    post_id: &str,
    input: NewComment,
) -> AppResult<CommentView> {
    let input = NewComment {
        content: input.content.trim().to_string(),
    };
    input.validate()?;

    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM posts WHERE id = ?1",
        params![post_id],
        |row| row.get(0),
    )?;
    if !exists {
        return Err(AppError::post_not_found(post_id));
    }

    let id = uuid::Uuid::now_v7().to_string();
    let now = Utc::now();
    conn.execute(
        "INSERT INTO comments (id, content, author_id, post_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, input.content, viewer.id, post_id, now],
    )?;

    Ok(CommentView {
        id,
        content: input.content,
        created_at: now,
        author: AuthorView {
            name: viewer.name.clone(),
            image: viewer.image.clone(),
        },
    })
}

pub fn unread_count(conn: &Connection, viewer: &CurrentUser) -> AppResult<UnreadCount> {
    read_tracking::unread_count(conn, &viewer.id)
}

pub fn set_read(conn: &Connection, viewer: &CurrentUser, post_id: &str) -> AppResult<ReadMarker> {
    read_tracking::set_read(conn, &viewer.id, post_id)
}
