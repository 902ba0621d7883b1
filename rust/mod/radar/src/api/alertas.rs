use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use scanguard_core::ServiceError;

use crate::model::{Alert, AlertQuery};

use super::{AppState, created, parse_body, query};

pub fn routes() -> Router<AppState> {
    Router::new().route("/alertas", get(list_alerts).post(raise_alert))
}

async fn raise_alert(
    State(svc): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Alert>), ServiceError> {
    let body = parse_body(&body)?;
    Ok(created(svc.raise_alert(&body)?))
}

async fn list_alerts(
    State(svc): State<AppState>,
    q: Result<Query<AlertQuery>, QueryRejection>,
) -> Result<Json<Vec<Alert>>, ServiceError> {
    let q = query(q)?;
    Ok(Json(svc.list_alerts(&q)?))
}
