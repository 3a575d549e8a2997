use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use shared::{get_db_connection, run_migrations, PriceBarRepository};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

use super::app;
use crate::state::AppState;

async fn test_app(csv_import_path: PathBuf) -> Router {
    let db = get_db_connection("sqlite::memory:").await.unwrap();
    run_migrations(&db).await.unwrap();
    app(AppState {
        bars: PriceBarRepository::new(Arc::new(db)),
        csv_import_path,
        volatility_limit: 10,
    })
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };

    let resp = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn bar_json(ts: &str, dt: &str, open: f64, high: f64, low: f64, close: f64) -> Value {
    json!({
        "timestamp": ts,
        "open": open,
        "high": high,
        "low": low,
        "close": close,
        "dt": dt,
        "time": 915.0,
    })
}

/// Store holding bars A and B of the reference scenario.
async fn scenario_app() -> Router {
    let app = test_app(PathBuf::from("missing.csv")).await;
    for bar in [
        bar_json("A", "2024-01-02", 10.0, 12.0, 9.0, 11.0),
        bar_json("B", "2024-01-01", 11.0, 11.0, 11.0, 11.0),
    ] {
        let (status, _) = send(&app, Method::POST, "/data", Some(bar)).await;
        assert_eq!(status, StatusCode::OK);
    }
    app
}

#[tokio::test]
async fn test_root_and_health() {
    let app = test_app(PathBuf::from("missing.csv")).await;

    let (status, body) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok", "records": 0 }));

    send(&app, Method::POST, "/data", Some(bar_json("A", "2024-01-02", 1.0, 1.0, 1.0, 1.0))).await;
    let (_, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(body["records"], 1);
}

#[tokio::test]
async fn test_spread_scenario() {
    let app = scenario_app().await;

    let (status, body) = send(&app, Method::GET, "/analytics/spread/A", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "timestamp": "A", "spread": 3.0, "trend": "Up", "is_volatile": false })
    );

    let (_, body) = send(&app, Method::GET, "/analytics/spread/B", None).await;
    assert_eq!(body["spread"], 0.0);
    assert_eq!(body["trend"], "Down");

    let (status, body) = send(&app, Method::GET, "/analytics/spread/Z", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Timestamp not found");
}

#[tokio::test]
async fn test_summary_scenario() {
    let app = scenario_app().await;

    let (status, body) = send(&app, Method::GET, "/analytics/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "total_records": 2, "average_close": 11.0, "max_high": 12.0, "min_low": 9.0 })
    );
}

#[tokio::test]
async fn test_empty_store_messages() {
    let app = test_app(PathBuf::from("missing.csv")).await;

    let (status, body) = send(&app, Method::GET, "/analytics/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "No data found" }));

    let (_, body) = send(&app, Method::GET, "/analytics/correlation", None).await;
    assert_eq!(body, json!({ "message": "No data available" }));

    let (_, body) = send(&app, Method::GET, "/filter/2024-01-02", None).await;
    assert_eq!(body, json!({ "message": "No data found for this date" }));

    let (_, body) = send(&app, Method::GET, "/analytics/trend", None).await;
    assert_eq!(body, json!([]));

    let (_, body) = send(&app, Method::GET, "/data", None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_trend_ordered_by_date() {
    let app = scenario_app().await;

    let (_, body) = send(&app, Method::GET, "/analytics/trend", None).await;
    assert_eq!(
        body,
        json!([
            { "timestamp": "B", "close": 11.0 },
            { "timestamp": "A", "close": 11.0 },
        ])
    );
}

#[tokio::test]
async fn test_crud_lifecycle() {
    let app = test_app(PathBuf::from("missing.csv")).await;
    let bar = bar_json("2024-01-02 09:15", "2024-01-02", 100.0, 104.0, 99.0, 103.0);

    let (status, body) = send(&app, Method::POST, "/data", Some(bar.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Record inserted successfully");

    let (status, body) = send(&app, Method::POST, "/data", Some(bar.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Timestamp already exists");

    let (_, body) = send(&app, Method::GET, "/data", None).await;
    assert_eq!(body, json!([bar]));

    let updated = bar_json("2024-01-02 09:15", "2024-01-02", 100.0, 110.0, 98.0, 99.0);
    let (status, _) = send(&app, Method::PUT, "/data/2024-01-02%2009:15", Some(updated.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, "/filter/2024-01-02", None).await;
    assert_eq!(body, json!([updated]));

    let (_, body) = send(&app, Method::GET, "/analytics/spread/2024-01-02%2009:15", None).await;
    assert_eq!(body["spread"], 12.0);
    assert_eq!(body["is_volatile"], true);

    let (status, body) = send(&app, Method::DELETE, "/data/2024-01-02%2009:15", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Record deleted successfully");

    let (status, body) = send(&app, Method::DELETE, "/data/2024-01-02%2009:15", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Record not found");
}

#[tokio::test]
async fn test_update_missing_is_404() {
    let app = test_app(PathBuf::from("missing.csv")).await;
    let bar = bar_json("X", "2024-01-02", 1.0, 1.0, 1.0, 1.0);

    let (status, body) = send(&app, Method::PUT, "/data/X", Some(bar)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Record not found");
}

#[tokio::test]
async fn test_volatility_limit() {
    let app = test_app(PathBuf::from("missing.csv")).await;
    for i in 0..12 {
        let bar = bar_json(&format!("T{i:02}"), "2024-01-02", 10.0, 17.5, 10.0, 11.0);
        send(&app, Method::POST, "/data", Some(bar)).await;
    }

    let (_, body) = send(&app, Method::GET, "/analytics/volatility", None).await;
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 10);
    assert_eq!(entries[0]["range"], 7.5);
    assert_eq!(entries[0]["trend"], "Bullish");

    let (_, body) = send(&app, Method::GET, "/analytics/volatility?limit=3", None).await;
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (status, body) =
        send(&app, Method::GET, "/analytics/volatility?limit=18446744073709551615", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 12);
}

#[tokio::test]
async fn test_bad_limit_has_detail() {
    let app = test_app(PathBuf::from("missing.csv")).await;

    let (status, body) = send(&app, Method::GET, "/analytics/volatility?limit=-1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("query string"));
}

#[tokio::test]
async fn test_bad_body_has_detail() {
    let app = test_app(PathBuf::from("missing.csv")).await;

    let (status, body) = send(&app, Method::POST, "/data", Some(json!({ "timestamp": "Q" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("missing field `open`"));

    let (status, body) = send(&app, Method::PUT, "/data/Q", Some(json!({ "open": "high" }))).await;
    assert!(status.is_client_error());
    assert!(body["detail"].is_string());

    // Nothing was stored
    let (_, body) = send(&app, Method::GET, "/data", None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_correlation_shape() {
    let app = test_app(PathBuf::from("missing.csv")).await;
    for (i, (o, h, l, c)) in [(100.0, 104.0, 99.0, 103.0), (103.0, 108.0, 101.0, 102.0), (102.0, 103.0, 97.0, 98.0)]
        .into_iter()
        .enumerate()
    {
        send(&app, Method::POST, "/data", Some(bar_json(&i.to_string(), "2024-01-02", o, h, l, c))).await;
    }

    let (status, body) = send(&app, Method::GET, "/analytics/correlation", None).await;
    assert_eq!(status, StatusCode::OK);
    for col in ["open", "high", "low", "close"] {
        assert_eq!(body[col][col], 1.0);
        for other in ["open", "high", "low", "close"] {
            assert_eq!(body[col][other], body[other][col]);
        }
    }
}

#[tokio::test]
async fn test_legacy_aliases() {
    let app = scenario_app().await;

    let (_, all) = send(&app, Method::GET, "/data", None).await;
    let (_, legacy_all) = send(&app, Method::GET, "/get-all-data", None).await;
    assert_eq!(all, legacy_all);

    let (_, filtered) = send(&app, Method::GET, "/filter/2024-01-02", None).await;
    let (_, legacy_filtered) = send(&app, Method::GET, "/get-by-date/2024-01-02", None).await;
    assert_eq!(filtered, legacy_filtered);
    assert_eq!(filtered.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_upload_my_csv() {
    let path = std::env::temp_dir().join(format!("price_bars_upload_{}.csv", std::process::id()));
    std::fs::write(
        &path,
        "timestamp,open,high,low,close,dt,time\nC,1,2,0.5,1.5,2024-01-03,915\n",
    )
    .unwrap();

    let app = test_app(path.clone()).await;
    send(&app, Method::POST, "/data", Some(bar_json("A", "2024-01-02", 1.0, 1.0, 1.0, 1.0))).await;

    let (status, body) = send(&app, Method::GET, "/upload-my-csv", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["records"], 1);

    let (_, all) = send(&app, Method::GET, "/data", None).await;
    assert_eq!(all.as_array().unwrap().len(), 1);
    assert_eq!(all[0]["timestamp"], "C");

    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn test_upload_my_csv_reports_error() {
    let app = test_app(PathBuf::from("/nonexistent/bars.csv")).await;

    let (status, body) = send(&app, Method::GET, "/upload-my-csv", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["error"].as_str().unwrap().contains("bars.csv"));
}

#[tokio::test]
async fn test_import_body() {
    let app = scenario_app().await;

    let req = Request::builder()
        .method(Method::POST)
        .uri("/import")
        .header("content-type", "text/csv")
        .body(Body::from("timestamp,open,high,low,close,dt,time\nZ,1,2,0.5,1.5,2024-01-05,1\n"))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let (_, all) = send(&app, Method::GET, "/data", None).await;
    assert_eq!(all.as_array().unwrap().len(), 1);

    let req = Request::builder()
        .method(Method::POST)
        .uri("/import")
        .body(Body::from("timestamp,open\nZ,1\n"))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Rejected before anything was deleted
    let (_, all) = send(&app, Method::GET, "/data", None).await;
    assert_eq!(all.as_array().unwrap().len(), 1);
}
