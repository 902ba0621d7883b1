use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};

use scanguard_core::ServiceError;

use crate::model::{Cleared, DataQuery, Reading, StoreStats};

use super::{AppState, created, parse_body, query};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/radar/data", get(list_readings).post(record_reading))
        .route("/radar/latest", get(latest_readings))
        .route("/radar/clear", delete(clear_readings))
        .route("/radar/stats", get(store_stats))
}

// ---------------------------------------------------------------------------
// POST /radar/data
// ---------------------------------------------------------------------------

async fn record_reading(
    State(svc): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Reading>), ServiceError> {
    let body = parse_body(&body)?;
    let reading = svc.record_reading(&body)?;
    Ok(created(reading))
}

// ---------------------------------------------------------------------------
// GET /radar/data
// ---------------------------------------------------------------------------

async fn list_readings(
    State(svc): State<AppState>,
    q: Result<Query<DataQuery>, QueryRejection>,
) -> Result<Json<Vec<Reading>>, ServiceError> {
    let q = query(q)?;
    Ok(Json(svc.list_readings(&q)?))
}

// ---------------------------------------------------------------------------
// GET /radar/latest
// ---------------------------------------------------------------------------

async fn latest_readings(State(svc): State<AppState>) -> Result<Json<Vec<Reading>>, ServiceError> {
    Ok(Json(svc.latest_readings()?))
}

// ---------------------------------------------------------------------------
// DELETE /radar/clear
// ---------------------------------------------------------------------------

async fn clear_readings(State(svc): State<AppState>) -> Result<Json<Cleared>, ServiceError> {
    Ok(Json(svc.clear_readings()?))
}

// ---------------------------------------------------------------------------
// GET /radar/stats
// ---------------------------------------------------------------------------

async fn store_stats(State(svc): State<AppState>) -> Result<Json<StoreStats>, ServiceError> {
    Ok(Json(svc.store_stats()?))
}
