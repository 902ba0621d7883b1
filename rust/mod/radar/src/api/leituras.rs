use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use scanguard_core::ServiceError;

use crate::model::{DeviceStats, LeituraPage, LeituraQuery, StatsQuery};

use super::{AppState, created, parse_body, query};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/radar/leituras", get(list_leituras).post(record_leitura))
        .route("/radar/estatisticas", get(device_stats))
}

// ---------------------------------------------------------------------------
// POST /radar/leituras
// ---------------------------------------------------------------------------

async fn record_leitura(
    State(svc): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    let body = parse_body(&body)?;
    let leitura = svc.record_leitura(&body)?;

    let mut out = serde_json::to_value(&leitura)
        .map_err(|e| ServiceError::Internal(e.to_string()))?;
    if let Some(obj) = out.as_object_mut() {
        obj.insert("status".into(), "success".into());
    }
    Ok(created(out))
}

// ---------------------------------------------------------------------------
// GET /radar/leituras
// ---------------------------------------------------------------------------

async fn list_leituras(
    State(svc): State<AppState>,
    q: Result<Query<LeituraQuery>, QueryRejection>,
) -> Result<Json<LeituraPage>, ServiceError> {
    let q = query(q)?;
    Ok(Json(svc.list_leituras(&q)?))
}

// ---------------------------------------------------------------------------
// GET /radar/estatisticas
// ---------------------------------------------------------------------------

async fn device_stats(
    State(svc): State<AppState>,
    q: Result<Query<StatsQuery>, QueryRejection>,
) -> Result<Json<DeviceStats>, ServiceError> {
    let q = query(q)?;
    Ok(Json(svc.device_stats(&q)?))
}
