use scanguard_core::{ServiceError, now_rfc3339};
use scanguard_sql::Value;
use scanguard_store::{Filter, FromRow, rows_into};

use crate::model::{Alert, AlertQuery};
use crate::schema::ALERTS;

use super::{RadarService, commit};

pub const DEFAULT_ALERT_LIMIT: usize = 20;

impl RadarService {
    /// Record an alert. Severity defaults to `info`.
    pub fn raise_alert(&self, body: &serde_json::Value) -> Result<Alert, ServiceError> {
        let mut draft = ALERTS.validate(body)?;
        draft.set_default("severity", "info");
        draft.set("timestamp", now_rfc3339());
        draft.set("resolved", false);

        let mut conn = self.connect()?;
        let row = ALERTS.insert(conn.as_mut(), &draft)?;
        let alert = Alert::from_row(&row)?;
        commit(conn)?;

        tracing::info!(id = alert.id, kind = %alert.alert_type, severity = %alert.severity, "alert raised");
        Ok(alert)
    }

    pub fn list_alerts(&self, q: &AlertQuery) -> Result<Vec<Alert>, ServiceError> {
        let limit = super::readings::clamp_limit(q.limit, DEFAULT_ALERT_LIMIT);
        let filters: Vec<Filter> = q
            .resolved_filter()
            .map(|resolved| Filter::Eq("resolved", Value::from(resolved)))
            .into_iter()
            .collect();

        let mut conn = self.connect()?;
        let rows = ALERTS.list(conn.as_mut(), &filters, limit)?;
        rows_into(&rows)
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
    fn raise_applies_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let service = sqlite_service(&dir, StorageMode::Database, RadarConfig::default());

        let alert = service
            .raise_alert(&json!({"tipo_alerta": "proximity", "mensagem": "object at 12cm"}))
            .unwrap();
        assert_eq!(alert.severity, "info");
        assert!(!alert.resolved);
        assert!(alert.timestamp.ends_with('Z'));
    }

    #[test]
    fn raise_requires_type_and_message() {
        let dir = tempfile::tempdir().unwrap();
        let service = sqlite_service(&dir, StorageMode::Database, RadarConfig::default());

        let err = service.raise_alert(&json!({"severidade": "high"})).unwrap_err();
        assert_eq!(err.to_string(), "missing required fields: tipo_alerta, mensagem");
        assert!(service.list_alerts(&AlertQuery::default()).unwrap().is_empty());
    }

    #[test]
    fn list_filters_on_resolved() {
        let dir = tempfile::tempdir().unwrap();
        let service = sqlite_service(&dir, StorageMode::Database, RadarConfig::default());

        service
            .raise_alert(&json!({"tipo_alerta": "a", "mensagem": "m1", "severidade": "warning"}))
            .unwrap();
        service.raise_alert(&json!({"tipo_alerta": "b", "mensagem": "m2"})).unwrap();

        let all = service.list_alerts(&AlertQuery::default()).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].alert_type, "b");

        let q = AlertQuery { limit: None, resolvido: Some("true".into()) };
        assert!(service.list_alerts(&q).unwrap().is_empty());
        let q = AlertQuery { limit: None, resolvido: Some("false".into()) };
        assert_eq!(service.list_alerts(&q).unwrap().len(), 2);
    }
}
