use async_graphql::*;

use crate::extractors::CurrentUser;
use crate::feedback::read_tracking::UnreadCount;
use crate::feedback::{service, PageRequest, PostFilter, PostView, SortOrder};
use crate::graphql::types::{feed_config, pool, viewer, PostPage};

/// GraphQL Query root
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// List posts matching a filter, one page at a time
    async fn posts(
        &self,
        ctx: &Context<'_>,
        #[graphql(default)] filter: PostFilter,
        #[graphql(default)] order: SortOrder,
        limit: Option<u32>,
        cursor: Option<String>,
    ) -> Result<PostPage> {
        let viewer = viewer(ctx)?;
        let page = PageRequest::new(limit, cursor, order, &feed_config(ctx))?;
        let conn = pool(ctx)?.get()?;

        Ok(service::list(&conn, viewer, filter, &page)?.into())
    }

    /// Visible posts the viewer has not read yet
    async fn unread_count(&self, ctx: &Context<'_>) -> Result<UnreadCount> {
        let viewer = viewer(ctx)?;
        let conn = pool(ctx)?.get()?;
        Ok(service::unread_count(&conn, viewer)?)
    }

    /// A single post with its comments
    async fn post(&self, ctx: &Context<'_>, id: String) -> Result<PostView> {
        let viewer = viewer(ctx)?;
        let conn = pool(ctx)?.get()?;
        Ok(service::by_id(&conn, viewer, &id)?)
    }

    /// The signed-in user
    async fn me(&self, ctx: &Context<'_>) -> Result<CurrentUser> {
        Ok(viewer(ctx)?.clone())
    }
}
