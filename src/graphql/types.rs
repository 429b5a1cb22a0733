use async_graphql::{Context, Result, SimpleObject};

use crate::config::FeedConfig;
use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::feedback::{Page, PostView};
use crate::state::DbPool;

/// One page of posts
#[derive(SimpleObject)]
pub struct PostPage {
    pub items: Vec<PostView>,

    /// Id to pass as `cursor` for the following page; absent at the end
    pub next_cursor: Option<String>,
}

impl From<Page<PostView>> for PostPage {
    fn from(page: Page<PostView>) -> Self {
        PostPage {
            items: page.items,
            next_cursor: page.next_cursor,
        }
    }
}

pub(crate) fn pool<'c>(ctx: &'c Context<'_>) -> Result<&'c DbPool> {
    ctx.data::<DbPool>()
}

pub(crate) fn viewer<'c>(ctx: &'c Context<'_>) -> Result<&'c CurrentUser> {
    Ok(ctx
        .data::<CurrentUser>()
        .map_err(|_| AppError::Unauthorized)?)
}

pub(crate) fn feed_config(ctx: &Context<'_>) -> FeedConfig {
    ctx.data_opt::<FeedConfig>().cloned().unwrap_or_default()
}
