use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};

use scanguard_core::ServiceError;

use crate::model::{Session, SessionQuery};
use crate::service::sessions::SessionAction;

use super::{AppState, created, parse_body, query};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/radar/sessoes", get(list_sessions).post(start_session))
        .route("/radar/sessoes/{id}", put(update_session))
}

// ---------------------------------------------------------------------------
// POST /radar/sessoes
// ---------------------------------------------------------------------------

async fn start_session(State(svc): State<AppState>) -> Result<(StatusCode, Json<Session>), ServiceError> {
    Ok(created(svc.start_session()?))
}

// ---------------------------------------------------------------------------
// GET /radar/sessoes
// ---------------------------------------------------------------------------

async fn list_sessions(
    State(svc): State<AppState>,
    q: Result<Query<SessionQuery>, QueryRejection>,
) -> Result<Json<Vec<Session>>, ServiceError> {
    let q = query(q)?;
    Ok(Json(svc.list_sessions(q.limit)?))
}

// ---------------------------------------------------------------------------
// PUT /radar/sessoes/{id}
// ---------------------------------------------------------------------------

async fn update_session(
    State(svc): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Session>, ServiceError> {
    let action = SessionAction::from_body(&parse_body(&body)?)?;
    Ok(Json(svc.update_session(&id, action)?))
}
