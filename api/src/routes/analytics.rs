use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use shared::analytics::{self, Spread, TrendPoint, VolatilityEntry};
use shared::MessageResponse;

use crate::error::ApiResult;
use crate::extract::{AppPath, AppQuery};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct VolatilityQuery {
    limit: Option<u64>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/analytics/trend", get(trend))
        .route("/analytics/summary", get(summary))
        .route("/analytics/spread/:timestamp", get(spread))
        .route("/analytics/correlation", get(correlation))
        .route("/analytics/volatility", get(volatility))
}

async fn trend(State(state): State<AppState>) -> ApiResult<Json<Vec<TrendPoint>>> {
    let bars = state.bars.get_all().await?;
    Ok(Json(analytics::trend_series(&bars)))
}

async fn summary(State(state): State<AppState>) -> ApiResult<Response> {
    let bars = state.bars.get_all().await?;
    Ok(match analytics::summary(&bars) {
        Some(s) => Json(s).into_response(),
        None => Json(MessageResponse::new("No data found")).into_response(),
    })
}

async fn spread(
    State(state): State<AppState>,
    AppPath(timestamp): AppPath<String>,
) -> ApiResult<Json<Spread>> {
    let bar = state.bars.get_by_timestamp(&timestamp).await?;
    Ok(Json(analytics::spread(&bar)))
}

async fn correlation(State(state): State<AppState>) -> ApiResult<Response> {
    let bars = state.bars.get_all().await?;
    Ok(match analytics::correlation(&bars) {
        Some(m) => Json(m).into_response(),
        None => Json(MessageResponse::new("No data available")).into_response(),
    })
}

async fn volatility(
    State(state): State<AppState>,
    AppQuery(q): AppQuery<VolatilityQuery>,
) -> ApiResult<Json<Vec<VolatilityEntry>>> {
    let limit = q.limit.unwrap_or(state.volatility_limit);
    let bars = state.bars.first_n(limit).await?;
    Ok(Json(analytics::volatility_report(&bars)))
}
