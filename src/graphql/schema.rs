use async_graphql::{EmptySubscription, Schema};

use super::mutations::MutationRoot;
use super::queries::QueryRoot;

/// GraphQL Schema type
pub type FeedbackSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the GraphQL schema. Each request must carry the `DbPool` and the
/// authenticated `CurrentUser` as request data; `FeedConfig` is optional.
pub fn build_schema() -> FeedbackSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription).finish()
}
