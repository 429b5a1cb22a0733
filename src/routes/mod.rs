pub mod api;
pub mod auth;
pub mod graphql;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// The full HTTP application.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(auth::router())
        .merge(api::router())
        .merge(graphql::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
