use async_graphql::*;

use crate::db::models::ReadMarker;
use crate::feedback::{service, CommentView, NewComment, NewPost, PostView};
use crate::graphql::types::{pool, viewer};

/// GraphQL Mutation root
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Create a post owned by the viewer
    async fn add_post(&self, ctx: &Context<'_>, input: NewPost) -> Result<PostView> {
        let viewer = viewer(ctx)?;
        let conn = pool(ctx)?.get()?;
        Ok(service::add(&conn, viewer, input)?)
    }

    /// Mark a post as read by the viewer (idempotent)
    async fn set_read(&self, ctx: &Context<'_>, id: String) -> Result<ReadMarker> {
        let viewer = viewer(ctx)?;
        let conn = pool(ctx)?.get()?;
        Ok(service::set_read(&conn, viewer, &id)?)
    }

    /// Comment on a post
    async fn add_comment(
        &self,
        ctx: &Context<'_>,
        post_id: String,
        input: NewComment,
    ) -> Result<CommentView> {
        let viewer = viewer(ctx)?;
        let conn = pool(ctx)?.get()?;
        Ok(service::add_comment(&conn, viewer, &post_id, input)?)
    }
}
