use scanguard_core::{ServiceError, new_id, now_rfc3339};
use scanguard_sql::Value;
use scanguard_store::{Draft, FromRow, rows_into, storage_err};

use crate::model::Session;
use crate::schema::SESSIONS;

use super::{RadarService, commit};

pub const DEFAULT_SESSION_LIMIT: usize = 10;

/// Actions accepted by `PUT /radar/sessoes/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    Stop,
}

impl SessionAction {
    /// Parse the `action` member of a request body.
    pub fn from_body(body: &serde_json::Value) -> Result<Self, ServiceError> {
        match body.get("action").and_then(|a| a.as_str()) {
            Some("stop") => Ok(Self::Stop),
            Some(other) => Err(ServiceError::Validation(format!("unsupported action '{other}'"))),
            None => Err(ServiceError::Validation("missing required fields: action".into())),
        }
    }
}

impl RadarService {
    /// Start a new active session with a generated id.
    pub fn start_session(&self) -> Result<Session, ServiceError> {
        let mut draft = Draft::default();
        draft.set("session_id", new_id());
        draft.set("start_time", now_rfc3339());
        draft.set("is_active", true);

        let mut conn = self.connect()?;
        let row = SESSIONS.insert(conn.as_mut(), &draft)?;
        let session = Session::from_row(&row)?;
        commit(conn)?;

        tracing::info!(session = %session.session_id, "session started");
        Ok(session)
    }

    /// Newest sessions first.
    pub fn list_sessions(&self, limit: Option<usize>) -> Result<Vec<Session>, ServiceError> {
        let limit = super::readings::clamp_limit(limit, DEFAULT_SESSION_LIMIT);
        let mut conn = self.connect()?;
        let rows = SESSIONS.list(conn.as_mut(), &[], limit)?;
        rows_into(&rows)
    }

    /// Apply an action to a session.
    ///
    /// Stopping is idempotent: a stopped session comes back unchanged.
    pub fn update_session(&self, session_id: &str, action: SessionAction) -> Result<Session, ServiceError> {
        match action {
            SessionAction::Stop => self.stop_session(session_id),
        }
    }

    fn stop_session(&self, session_id: &str) -> Result<Session, ServiceError> {
        let mut conn = self.connect()?;
        let rows = conn
            .query(
                "UPDATE sessions SET end_time = ?1, is_active = 0 \
                 WHERE session_id = ?2 AND is_active = 1 RETURNING *",
                &[Value::from(now_rfc3339()), Value::from(session_id)],
            )
            .map_err(storage_err)?;

        if let Some(row) = rows.first() {
            let session = Session::from_row(row)?;
            commit(conn)?;
            tracing::info!(session = %session.session_id, "session stopped");
            return Ok(session);
        }

        match SESSIONS.find(conn.as_mut(), "session_id", Value::from(session_id))? {
            Some(row) => Session::from_row(&row),
            None => Err(ServiceError::NotFound(format!("session '{session_id}' not found"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use scanguard_core::StorageMode;
    use serde_json::json;

    use super::*;
    use crate::config::RadarConfig;
    use crate::service::testing::*;

    #[test]
    fn action_parsing() {
        assert_eq!(SessionAction::from_body(&json!({"action": "stop"})).unwrap(), SessionAction::Stop);
        assert!(SessionAction::from_body(&json!({"action": "pause"})).is_err());
        assert!(SessionAction::from_body(&json!({})).is_err());
    }

    #[test]
    fn start_then_list() {
        let dir = tempfile::tempdir().unwrap();
        let service = sqlite_service(&dir, StorageMode::Database, RadarConfig::default());

        let first = service.start_session().unwrap();
        let second = service.start_session().unwrap();
        assert!(first.is_active);
        assert_ne!(first.session_id, second.session_id);

        let sessions = service.list_sessions(None).unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].id, second.id);
    }

    #[test]
    fn stop_twice_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let service = sqlite_service(&dir, StorageMode::Database, RadarConfig::default());

        let s = service.start_session().unwrap();
        let stopped = service.update_session(&s.session_id, SessionAction::Stop).unwrap();
        assert!(!stopped.is_active);
        assert!(stopped.end_time.is_some());

        let again = service.update_session(&s.session_id, SessionAction::Stop).unwrap();
        assert_eq!(again, stopped);
    }

    #[test]
    fn stop_unknown_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let service = sqlite_service(&dir, StorageMode::Database, RadarConfig::default());

        let err = service.update_session("missing", SessionAction::Stop).unwrap_err();
        assert_eq!(err.error_code(), "NOT_FOUND");
    }

    #[test]
    fn readings_bump_active_session_counters() {
        let dir = tempfile::tempdir().unwrap();
        let service = sqlite_service(&dir, StorageMode::Database, RadarConfig::default());

        let s = service.start_session().unwrap();
        let id = s.session_id.as_str();
        service
            .record_reading(&json!({"angle": 1, "distance": 5, "session_id": id, "object_detected": true}))
            .unwrap();
        service
            .record_reading(&json!({"angle": 2, "distance": 6, "session_id": id}))
            .unwrap();
        service.update_session(id, SessionAction::Stop).unwrap();
        service
            .record_reading(&json!({"angle": 3, "distance": 7, "session_id": id}))
            .unwrap();

        let s = &service.list_sessions(None).unwrap()[0];
        assert_eq!(s.reading_count, 2);
        assert_eq!(s.detection_count, 1);
    }
}
