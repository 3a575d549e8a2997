pub mod analytics;
pub mod data;
pub mod legacy;
pub mod system;

#[cfg(test)]
mod tests;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(system::routes())
        .merge(data::routes())
        .merge(analytics::routes())
        .merge(legacy::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
