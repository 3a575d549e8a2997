//! CRUD over individual price bars

use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use shared::{MessageResponse, PriceBar};
use tracing::info;

use crate::error::ApiResult;
use crate::extract::{AppJson, AppPath};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/data", post(create_bar).get(list_bars))
        .route("/data/:timestamp", put(update_bar).delete(delete_bar))
        .route("/import", post(import_csv))
        .route("/filter/:date", get(filter_by_date))
}

async fn create_bar(
    State(state): State<AppState>,
    AppJson(bar): AppJson<PriceBar>,
) -> ApiResult<Json<MessageResponse>> {
    state.bars.insert(&bar).await?;
    Ok(Json(MessageResponse::new("Record inserted successfully")))
}

pub(crate) async fn list_bars(State(state): State<AppState>) -> ApiResult<Json<Vec<PriceBar>>> {
    Ok(Json(state.bars.get_all().await?))
}

async fn update_bar(
    State(state): State<AppState>,
    AppPath(timestamp): AppPath<String>,
    AppJson(bar): AppJson<PriceBar>,
) -> ApiResult<Json<MessageResponse>> {
    state.bars.update(&timestamp, &bar).await?;
    Ok(Json(MessageResponse::new("Record updated successfully")))
}

async fn delete_bar(
    State(state): State<AppState>,
    AppPath(timestamp): AppPath<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.bars.delete(&timestamp).await?;
    Ok(Json(MessageResponse::new("Record deleted successfully")))
}

/// Replace the whole table with the CSV carried in the request body.
async fn import_csv(State(state): State<AppState>, body: Bytes) -> ApiResult<Response> {
    let records = shared::import::import_bars(&state.bars, body.as_ref()).await?;
    info!("Replace-import from request body: {} records", records);
    Ok(Json(serde_json::json!({
        "message": "Data imported successfully",
        "records": records,
    }))
    .into_response())
}

pub(crate) async fn filter_by_date(
    State(state): State<AppState>,
    AppPath(date): AppPath<String>,
) -> ApiResult<Response> {
    let bars = state.bars.get_by_date(&date).await?;
    if bars.is_empty() {
        return Ok(Json(MessageResponse::new("No data found for this date")).into_response());
    }
    Ok(Json(bars).into_response())
}
