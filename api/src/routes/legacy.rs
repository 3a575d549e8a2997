//! Deprecated paths kept for older clients

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::{info, warn};

use super::data::{filter_by_date, list_bars};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/get-all-data", get(list_bars))
        .route("/get-by-date/:date", get(filter_by_date))
        .route("/upload-my-csv", get(upload_my_csv))
}

/// Replace-import from the configured CSV file. Never fails the request;
/// errors come back as `{"error": ...}`.
async fn upload_my_csv(State(state): State<AppState>) -> Json<Value> {
    match shared::import::import_file(&state.bars, &state.csv_import_path).await {
        Ok(records) => {
            info!("Replace-import from {:?}: {} records", state.csv_import_path, records);
            Json(json!({
                "message": "CSV uploaded to database successfully",
                "records": records,
            }))
        }
        Err(e) => {
            warn!("CSV upload failed: {}", e);
            Json(json!({ "error": e.to_string() }))
        }
    }
}
