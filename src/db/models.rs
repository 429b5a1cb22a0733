use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's assertion that they have viewed a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct ReadMarker {
    pub user_id: String,
    pub post_id: String,
    pub created_at: DateTime<Utc>,
}
