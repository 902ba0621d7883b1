use scanguard_core::{ServiceError, hours_ago_rfc3339, now_rfc3339};
use scanguard_sql::{SQLConnection, Value};
use scanguard_store::{Draft, Filter, FromRow, ResourceDef, rows_into, storage_err};

use crate::model::{Cleared, DataQuery, Leitura, LeituraPage, LeituraQuery, Reading};
use crate::schema::{LEITURAS, READINGS};

use super::{Backend, RadarService, commit};

pub const DEFAULT_LIMIT: usize = 50;
pub const MAX_LIMIT: usize = 1000;
pub const DEFAULT_WINDOW_HOURS: i64 = 24;

/// Clamp a client `limit` into `1..=MAX_LIMIT`.
pub(crate) fn clamp_limit(limit: Option<usize>, default: usize) -> usize {
    limit.unwrap_or(default).clamp(1, MAX_LIMIT)
}

pub(crate) fn window_hours(hours: Option<i64>) -> Result<i64, ServiceError> {
    match hours {
        None => Ok(DEFAULT_WINDOW_HOURS),
        Some(h) if h > 0 => Ok(h),
        Some(_) => Err(ServiceError::Validation("hours must be a positive integer".into())),
    }
}

/// Lower `created_at` bound for a trailing window of `hours`.
pub(crate) fn window_start(hours: i64) -> Result<String, ServiceError> {
    hours_ago_rfc3339(hours)
        .ok_or_else(|| ServiceError::Validation(format!("hours {hours} is out of range")))
}

impl RadarService {
    // ── Ingest ──

    /// `POST /radar/data`. Runs from memory when the mode allows it.
    pub fn record_reading(&self, body: &serde_json::Value) -> Result<Reading, ServiceError> {
        let draft = self.reading_draft(&READINGS, body)?;
        match self.backend()? {
            Backend::Sql(conn) => insert_reading(conn, &draft),
            Backend::Memory => {
                let row = draft.into_row(self.fallback.next_id());
                let reading = Reading::from_row(&row)?;
                self.fallback.push(reading.clone());
                tracing::debug!(id = reading.id, "reading buffered in memory");
                Ok(reading)
            }
        }
    }

    /// `POST /radar/leituras`. Always needs the database.
    pub fn record_leitura(&self, body: &serde_json::Value) -> Result<Leitura, ServiceError> {
        let draft = self.reading_draft(&LEITURAS, body)?;
        let conn = self.connect()?;
        insert_reading(conn, &draft).map(Leitura::from)
    }

    /// Validate a body against a column profile and fill server-side values.
    fn reading_draft(&self, def: &ResourceDef, body: &serde_json::Value) -> Result<Draft, ServiceError> {
        let mut draft = def.validate(body)?;
        draft.set_default("device_id", self.config.default_device.as_str());
        draft.set_default("session_id", self.config.default_session.as_str());
        draft.set_default("object_detected", false);
        draft.set("created_at", now_rfc3339());
        Ok(draft)
    }

    // ── Queries ──

    /// `GET /radar/data`: newest first over a trailing window, optional
    /// device filter.
    pub fn list_readings(&self, q: &DataQuery) -> Result<Vec<Reading>, ServiceError> {
        let limit = clamp_limit(q.limit, DEFAULT_LIMIT);
        let since = window_start(window_hours(q.hours)?)?;

        match self.backend()? {
            Backend::Sql(mut conn) => {
                let mut filters = vec![Filter::AtLeast("created_at", Value::from(since.as_str()))];
                if let Some(device) = &q.device_id {
                    filters.push(Filter::Eq("device_id", Value::from(device.as_str())));
                }
                let rows = READINGS.list(conn.as_mut(), &filters, limit)?;
                rows_into(&rows)
            }
            Backend::Memory => Ok(self.fallback.select(limit, |r| {
                q.device_id.as_ref().is_none_or(|d| &r.device_id == d)
                    && r.created_at >= since
            })),
        }
    }

    /// `GET /radar/leituras`: one device over a trailing window.
    pub fn list_leituras(&self, q: &LeituraQuery) -> Result<LeituraPage, ServiceError> {
        let device = q
            .dispositivo
            .clone()
            .unwrap_or_else(|| self.config.default_device.clone());
        let limit = clamp_limit(q.limit, DEFAULT_LIMIT);
        let since = window_start(window_hours(q.horas)?)?;

        let mut conn = self.connect()?;
        let rows = READINGS.list(
            conn.as_mut(),
            &[
                Filter::Eq("device_id", Value::from(device.as_str())),
                Filter::AtLeast("created_at", Value::from(since)),
            ],
            limit,
        )?;
        let leituras: Vec<Leitura> = rows_into::<Reading>(&rows)?
            .into_iter()
            .map(Leitura::from)
            .collect();

        Ok(LeituraPage {
            total: leituras.len(),
            leituras,
            dispositivo: device,
        })
    }

    /// `GET /radar/latest`: the most recent readings, newest first.
    pub fn latest_readings(&self) -> Result<Vec<Reading>, ServiceError> {
        let n = self.config.latest_count;
        match self.backend()? {
            Backend::Sql(mut conn) => {
                let rows = READINGS.list(conn.as_mut(), &[], n)?;
                rows_into(&rows)
            }
            Backend::Memory => Ok(self.fallback.latest(n)),
        }
    }

    // ── Retention ──

    /// `DELETE /radar/clear`.
    ///
    /// The database keeps its newest `retention` readings; the memory
    /// buffer is emptied.
    pub fn clear_readings(&self) -> Result<Cleared, ServiceError> {
        match self.backend()? {
            Backend::Sql(mut conn) => {
                let keep = self.config.retention;
                let deleted = READINGS.retain_newest(conn.as_mut(), keep)?;
                commit(conn)?;
                tracing::info!(deleted, keep, "reading retention applied");
                Ok(Cleared {
                    message: format!("kept the newest {keep} readings"),
                    deleted_count: deleted,
                })
            }
            Backend::Memory => {
                let deleted = self.fallback.clear() as u64;
                tracing::info!(deleted, "memory buffer cleared");
                Ok(Cleared {
                    message: "memory buffer cleared".to_string(),
                    deleted_count: deleted,
                })
            }
        }
    }
}

/// Insert one reading, bump its session's counters, and commit.
fn insert_reading(mut conn: Box<dyn SQLConnection>, draft: &Draft) -> Result<Reading, ServiceError> {
    let row = READINGS.insert(conn.as_mut(), draft)?;
    let reading = Reading::from_row(&row)?;

    conn.exec(
        "UPDATE sessions SET reading_count = reading_count + 1, \
         detection_count = detection_count + ?1 \
         WHERE session_id = ?2 AND is_active = 1",
        &[
            Value::from(reading.object_detected),
            Value::from(reading.session_id.as_str()),
        ],
    )
    .map_err(storage_err)?;

    commit(conn)?;
    tracing::debug!(id = reading.id, device = %reading.device_id, "reading stored");
    Ok(reading)
}

#[cfg(test)]
mod tests {
    use scanguard_core::StorageMode;
    use serde_json::json;

    use super::*;
    use crate::config::RadarConfig;
    use crate::service::testing::*;

    #[test]
    fn stored_reading_gets_defaults_and_server_time() {
        let dir = tempfile::tempdir().unwrap();
        let service = sqlite_service(&dir, StorageMode::Database, RadarConfig::default());

        let r = service
            .record_reading(&json!({"angle": 90, "distance": 25.5, "timestamp": 1700000000}))
            .unwrap();
        assert_eq!(r.id, 1);
        assert_eq!(r.device_id, "radar_01");
        assert_eq!(r.session_id, "default_session");
        assert!(!r.object_detected);
        assert!(r.created_at.ends_with('Z'));
        assert_eq!(r.timestamp, Some(1700000000.into()));
    }

    #[test]
    fn out_of_range_is_rejected_without_write() {
        let dir = tempfile::tempdir().unwrap();
        let service = sqlite_service(&dir, StorageMode::Database, RadarConfig::default());

        let err = service.record_reading(&json!({"angle": 200, "distance": 10})).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_FAILED");
        let err = service.record_reading(&json!({"angle": 10, "distance": 500})).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_FAILED");

        assert!(service.latest_readings().unwrap().is_empty());
    }

    #[test]
    fn leituras_accept_full_turn() {
        let dir = tempfile::tempdir().unwrap();
        let service = sqlite_service(&dir, StorageMode::Database, RadarConfig::default());

        let l = service
            .record_leitura(&json!({"angulo": 270, "distancia": 40, "objeto_detetado": true}))
            .unwrap();
        assert_eq!(l.angle, 270.0);
        assert!(l.object_detected);

        let page = service.list_leituras(&LeituraQuery::default()).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.dispositivo, "radar_01");

        let other = LeituraQuery { dispositivo: Some("radar_02".into()), ..Default::default() };
        assert_eq!(service.list_leituras(&other).unwrap().total, 0);
    }

    #[test]
    fn list_filters_by_device() {
        let dir = tempfile::tempdir().unwrap();
        let service = sqlite_service(&dir, StorageMode::Database, RadarConfig::default());

        service.record_reading(&json!({"angle": 1, "distance": 1, "device_id": "a"})).unwrap();
        service.record_reading(&json!({"angle": 2, "distance": 2, "device_id": "b"})).unwrap();
        service.record_reading(&json!({"angle": 3, "distance": 3, "device_id": "a"})).unwrap();

        let q = DataQuery { device_id: Some("a".into()), hours: Some(1), limit: None };
        let angles: Vec<f64> = service.list_readings(&q).unwrap().iter().map(|r| r.angle).collect();
        assert_eq!(angles, vec![3.0, 1.0]);

        let bad = DataQuery { hours: Some(0), ..Default::default() };
        assert!(service.list_readings(&bad).is_err());
        let huge = DataQuery { hours: Some(i64::MAX), ..Default::default() };
        let err = service.list_readings(&huge).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_FAILED");
    }

    #[test]
    fn list_defaults_to_a_day() {
        let dir = tempfile::tempdir().unwrap();
        let service = sqlite_service(&dir, StorageMode::Database, RadarConfig::default());

        service.record_reading(&json!({"angle": 1, "distance": 1})).unwrap();
        service.record_reading(&json!({"angle": 2, "distance": 2})).unwrap();
        let mut conn = service.connect().unwrap();
        conn.exec(
            "UPDATE readings SET created_at = ?1 WHERE id = 1",
            &[Value::from("2000-01-01T00:00:00.000000Z")],
        )
        .unwrap();
        commit(conn).unwrap();

        let ids: Vec<i64> = service
            .list_readings(&DataQuery::default())
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![2]);

        let wide = DataQuery { hours: Some(24 * 365 * 100), ..Default::default() };
        assert_eq!(service.list_readings(&wide).unwrap().len(), 2);
    }

    #[test]
    fn clear_keeps_newest_retention() {
        let dir = tempfile::tempdir().unwrap();
        let config = RadarConfig { retention: 3, ..Default::default() };
        let service = sqlite_service(&dir, StorageMode::Database, config);

        for i in 0..5 {
            service.record_reading(&json!({"angle": i, "distance": i})).unwrap();
        }
        let cleared = service.clear_readings().unwrap();
        assert_eq!(cleared.deleted_count, 2);

        let ids: Vec<i64> = service.latest_readings().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![5, 4, 3]);
    }

    #[test]
    fn memory_mode_buffers_and_clears() {
        let config = RadarConfig { fallback_capacity: 3, ..Default::default() };
        let service = RadarService::in_memory(config);

        for i in 0..5 {
            service.record_reading(&json!({"angle": i, "distance": i})).unwrap();
        }
        let ids: Vec<i64> = service.latest_readings().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![5, 4, 3]);

        assert_eq!(service.clear_readings().unwrap().deleted_count, 3);
        assert!(service.latest_readings().unwrap().is_empty());
    }

    #[test]
    fn leituras_need_the_database() {
        let service = RadarService::in_memory(RadarConfig::default());
        let err = service
            .record_leitura(&json!({"angulo": 1, "distancia": 1}))
            .unwrap_err();
        assert_eq!(err.error_code(), "STORE_UNAVAILABLE");
    }

    #[test]
    fn limit_is_clamped() {
        assert_eq!(clamp_limit(None, 50), 50);
        assert_eq!(clamp_limit(Some(0), 50), 1);
        assert_eq!(clamp_limit(Some(5000), 50), 1000);
    }
}
