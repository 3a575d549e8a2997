use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use shared::MessageResponse;

use crate::error::ApiResult;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
}

async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new("Price bar API connected to the database successfully!"))
}

/// Liveness plus a round-trip to the store.
async fn health_check(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let records = state.bars.count().await?;
    Ok(Json(json!({ "status": "ok", "records": records })))
}
