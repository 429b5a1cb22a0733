use async_graphql::{Json, SimpleObject};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::feedback::projection::{AuthorRecord, CommentRecord, PostRecord, ReadMarkerRecord};

pub const ANONYMOUS_NAME: &str = "Anonymous";
pub const SELF_MARKER: &str = " (you)";

/// Public author identity as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, SimpleObject)]
#[graphql(name = "Author")]
pub struct AuthorView {
    pub name: String,
    pub image: Option<String>,
}

impl From<AuthorRecord> for AuthorView {
    fn from(author: AuthorRecord) -> Self {
        AuthorView {
            name: author.name,
            image: author.image,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
#[graphql(name = "PostReadMarker")]
pub struct ReadMarkerView {
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub user: AuthorView,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
#[graphql(name = "Comment")]
pub struct CommentView {
    pub id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author: AuthorView,
}

impl From<CommentRecord> for CommentView {
    fn from(comment: CommentRecord) -> Self {
        CommentView {
            id: comment.id,
            content: comment.content,
            created_at: comment.created_at,
            author: comment.author.into(),
        }
    }
}

/// Read markers keyed by the marking user's id, in first-seen order.
pub type ReadMarkerMap = IndexMap<String, ReadMarkerView>;

/// A post as it may be sent to any client.
#[derive(Debug, Clone, PartialEq, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
#[graphql(name = "Post")]
pub struct PostView {
    pub id: String,
    pub title: String,
    pub content: String,
    pub content_html: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub anonymous: bool,
    pub author: AuthorView,
    pub read_markers: Json<ReadMarkerMap>,
    pub comment_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<CommentView>>,
}

#[cfg(test)]
impl PostView {
    pub(crate) fn is_read_by(&self, user_id: &str) -> bool {
        self.read_markers.0.contains_key(user_id)
    }
}

/// Strip or mask author identity for `viewer_id` and key read markers by user.
///
/// On an anonymous post the author's own read marker is only shown to the
/// author, since it would carry their id, name and image.
pub fn anonymize(post: PostRecord, viewer_id: &str) -> PostView {
    let mut read_markers = post.read_markers;
    if post.anonymous && post.author_id != viewer_id {
        read_markers.retain(|marker| marker.user_id != post.author_id);
    }

    let author = if post.anonymous {
        let name = if post.author_id == viewer_id {
            format!("{}{}", ANONYMOUS_NAME, SELF_MARKER)
        } else {
            ANONYMOUS_NAME.to_string()
        };
        AuthorView { name, image: None }
    } else {
        post.author.into()
    };

    PostView {
        id: post.id,
        title: post.title,
        content: post.content,
        content_html: post.content_html,
        created_at: post.created_at,
        updated_at: post.updated_at,
        anonymous: post.anonymous,
        author,
        read_markers: Json(key_by_user(read_markers)),
        comment_count: post.comment_count,
        comments: post
            .comments
            .map(|comments| comments.into_iter().map(CommentView::from).collect()),
    }
}

fn key_by_user(markers: Vec<ReadMarkerRecord>) -> ReadMarkerMap {
    let mut map = ReadMarkerMap::with_capacity(markers.len());
    for marker in markers {
        map.entry(marker.user_id.clone())
            .or_insert_with(|| ReadMarkerView {
                user_id: marker.user_id,
                created_at: marker.created_at,
                user: marker.user.into(),
            });
    }
    map
}
