use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::db::models::ReadMarker;
use crate::error::AppResult;
use crate::extractors::CurrentUser;
use crate::feedback::read_tracking::UnreadCount;
use crate::feedback::{
    service, CommentView, NewComment, NewPost, Page, PageRequest, PostFilter, PostView, SortOrder,
};
use crate::state::AppState;

// --- Query params ---

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
    pub filter: PostFilter,
    pub order: SortOrder,
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}

// --- Router ---

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/posts", get(list_posts).post(add_post))
        .route("/api/posts/unread-count", get(unread_count))
        .route("/api/posts/{id}", get(post_by_id))
        .route("/api/posts/{id}/read", post(set_read))
        .route("/api/posts/{id}/comments", post(add_comment))
}

// --- Handlers ---

async fn list_posts(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Page<PostView>>> {
    let page = PageRequest::new(params.limit, params.cursor, params.order, &state.config.feed)?;
    let conn = state.db.get()?;
    Ok(Json(service::list(&conn, &user, params.filter, &page)?))
}

async fn unread_count(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<UnreadCount>> {
    let conn = state.db.get()?;
    Ok(Json(service::unread_count(&conn, &user)?))
}

async fn post_by_id(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<PostView>> {
    let conn = state.db.get()?;
    Ok(Json(service::by_id(&conn, &user, &id)?))
}

async fn add_post(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<NewPost>,
) -> AppResult<Json<PostView>> {
    let conn = state.db.get()?;
    Ok(Json(service::add(&conn, &user, input)?))
}

async fn set_read(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ReadMarker>> {
    let conn = state.db.get()?;
    Ok(Json(service::set_read(&conn, &user, &id)?))
}

async fn add_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(input): Json<NewComment>,
) -> AppResult<Json<CommentView>> {
    let conn = state.db.get()?;
    Ok(Json(service::add_comment(&conn, &user, &id, input)?))
}
