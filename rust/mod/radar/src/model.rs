use serde::{Deserialize, Serialize};

use scanguard_core::ServiceError;
use scanguard_sql::{Row, Value};
use scanguard_store::FromRow;

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// One angle/distance sample from the sensing device.
///
/// Serialized with English field names; `/radar/leituras` presents the same
/// record through [`Leitura`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub id: i64,
    pub angle: f64,
    pub distance: f64,
    /// Producer-supplied time (epoch integer or float), passed through.
    pub timestamp: Option<serde_json::Number>,
    /// Server-assigned, RFC 3339.
    pub created_at: String,
    pub device_id: String,
    pub session_id: String,
    pub object_detected: bool,
}

fn missing(column: &str) -> ServiceError {
    ServiceError::Storage(format!("missing or mistyped column '{column}'"))
}

fn producer_time(row: &Row) -> Option<serde_json::Number> {
    match row.get("timestamp")? {
        Value::Integer(i) => Some((*i).into()),
        Value::Real(f) => serde_json::Number::from_f64(*f),
        _ => None,
    }
}

impl FromRow for Reading {
    fn from_row(row: &Row) -> Result<Self, ServiceError> {
        Ok(Self {
            id: row.get_i64("id").ok_or_else(|| missing("id"))?,
            angle: row.get_f64("angle").ok_or_else(|| missing("angle"))?,
            distance: row.get_f64("distance").ok_or_else(|| missing("distance"))?,
            timestamp: producer_time(row),
            created_at: row.get_str("created_at").ok_or_else(|| missing("created_at"))?.to_string(),
            device_id: row.get_str("device_id").ok_or_else(|| missing("device_id"))?.to_string(),
            session_id: row.get_str("session_id").ok_or_else(|| missing("session_id"))?.to_string(),
            object_detected: row.get_bool("object_detected").unwrap_or(false),
        })
    }
}

/// Portuguese presentation of a [`Reading`], as the dashboard expects it.
/// `timestamp` here is the server time.
#[derive(Debug, Clone, Serialize)]
pub struct Leitura {
    pub id: i64,
    pub timestamp: String,
    #[serde(rename = "angulo")]
    pub angle: f64,
    #[serde(rename = "distancia")]
    pub distance: f64,
    #[serde(rename = "objeto_detetado")]
    pub object_detected: bool,
    #[serde(rename = "id_dispositivo")]
    pub device_id: String,
    #[serde(rename = "id_sessao")]
    pub session_id: String,
}

impl From<Reading> for Leitura {
    fn from(r: Reading) -> Self {
        Self {
            id: r.id,
            timestamp: r.created_at,
            angle: r.angle,
            distance: r.distance,
            object_detected: r.object_detected,
            device_id: r.device_id,
            session_id: r.session_id,
        }
    }
}

/// Response body for `GET /radar/leituras`.
#[derive(Debug, Serialize)]
pub struct LeituraPage {
    pub leituras: Vec<Leitura>,
    pub total: usize,
    pub dispositivo: String,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A monitoring interval grouping readings.
///
/// ```text
/// active ──stop──▶ stopped
/// ```
///
/// Stop is the only transition. Stopping a stopped session is a no-op.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub id: i64,
    #[serde(rename = "id_sessao")]
    pub session_id: String,
    #[serde(rename = "hora_inicio")]
    pub start_time: String,
    #[serde(rename = "hora_fim")]
    pub end_time: Option<String>,
    #[serde(rename = "total_leituras")]
    pub reading_count: i64,
    #[serde(rename = "objetos_detetados")]
    pub detection_count: i64,
    #[serde(rename = "esta_ativa")]
    pub is_active: bool,
}

impl FromRow for Session {
    fn from_row(row: &Row) -> Result<Self, ServiceError> {
        Ok(Self {
            id: row.get_i64("id").ok_or_else(|| missing("id"))?,
            session_id: row.get_str("session_id").ok_or_else(|| missing("session_id"))?.to_string(),
            start_time: row.get_str("start_time").ok_or_else(|| missing("start_time"))?.to_string(),
            end_time: row.get_str("end_time").map(str::to_string),
            reading_count: row.get_i64("reading_count").unwrap_or(0),
            detection_count: row.get_i64("detection_count").unwrap_or(0),
            is_active: row.get_bool("is_active").unwrap_or(false),
        })
    }
}

// ---------------------------------------------------------------------------
// Alert
// ---------------------------------------------------------------------------

/// A posted notification record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub id: i64,
    #[serde(rename = "tipo_alerta")]
    pub alert_type: String,
    #[serde(rename = "mensagem")]
    pub message: String,
    #[serde(rename = "severidade")]
    pub severity: String,
    pub timestamp: String,
    #[serde(rename = "resolvido")]
    pub resolved: bool,
}

impl FromRow for Alert {
    fn from_row(row: &Row) -> Result<Self, ServiceError> {
        Ok(Self {
            id: row.get_i64("id").ok_or_else(|| missing("id"))?,
            alert_type: row.get_str("alert_type").ok_or_else(|| missing("alert_type"))?.to_string(),
            message: row.get_str("message").ok_or_else(|| missing("message"))?.to_string(),
            severity: row.get_str("severity").unwrap_or("info").to_string(),
            timestamp: row.get_str("timestamp").ok_or_else(|| missing("timestamp"))?.to_string(),
            resolved: row.get_bool("resolved").unwrap_or(false),
        })
    }
}

// ---------------------------------------------------------------------------
// Statistics (derived, never stored)
// ---------------------------------------------------------------------------

/// Per-device statistics over a trailing window.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceStats {
    #[serde(rename = "total_leituras")]
    pub total: i64,
    #[serde(rename = "objetos_detetados")]
    pub detections: i64,
    /// Percentage, two decimals.
    #[serde(rename = "taxa_deteccao")]
    pub detection_rate: f64,
    /// Centimetres, two decimals, positive distances only.
    #[serde(rename = "media_distancia")]
    pub average_distance: f64,
    #[serde(rename = "ultima_leitura")]
    pub last_reading: Option<LastReading>,
    #[serde(rename = "periodo_horas")]
    pub window_hours: i64,
    #[serde(rename = "dispositivo")]
    pub device_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LastReading {
    #[serde(rename = "angulo")]
    pub angle: f64,
    #[serde(rename = "distancia")]
    pub distance: f64,
    #[serde(rename = "objeto_detetado")]
    pub object_detected: bool,
    pub timestamp: String,
}

impl From<Reading> for LastReading {
    fn from(r: Reading) -> Self {
        Self {
            angle: r.angle,
            distance: r.distance,
            object_detected: r.object_detected,
            timestamp: r.created_at,
        }
    }
}

/// Table-wide counters for `GET /radar/stats`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreStats {
    pub total_records: i64,
    pub today_records: i64,
    pub last_update: Option<String>,
}

/// Response body for `DELETE /radar/clear`.
#[derive(Debug, Clone, Serialize)]
pub struct Cleared {
    pub message: String,
    pub deleted_count: u64,
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub service: &'static str,
    pub timestamp: String,
    /// `connected`, `memory`, or `error: ...`.
    pub database: String,
    pub environment: String,
    pub version: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Status {
    pub status: &'static str,
    /// `connected`, `disconnected`, or `memory`.
    pub database: &'static str,
    pub mode: &'static str,
    pub timestamp: String,
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Query for `GET /radar/data`. Filters apply only when given.
#[derive(Debug, Default, Deserialize)]
pub struct DataQuery {
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default, alias = "dispositivo")]
    pub device_id: Option<String>,
    #[serde(default, alias = "horas")]
    pub hours: Option<i64>,
}

/// Query for the device-scoped `GET /radar/leituras`.
#[derive(Debug, Default, Deserialize)]
pub struct LeituraQuery {
    #[serde(default, alias = "device_id")]
    pub dispositivo: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default, alias = "hours")]
    pub horas: Option<i64>,
}

/// Query for `GET /radar/estatisticas`.
#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    #[serde(default, alias = "device_id")]
    pub dispositivo: Option<String>,
    #[serde(default, alias = "hours")]
    pub horas: Option<i64>,
}

/// Query for `GET /radar/sessoes`.
#[derive(Debug, Default, Deserialize)]
pub struct SessionQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Query for `GET /alertas`.
#[derive(Debug, Default, Deserialize)]
pub struct AlertQuery {
    #[serde(default)]
    pub limit: Option<usize>,
    /// `true` (any case) selects resolved alerts; any other value unresolved.
    #[serde(default)]
    pub resolvido: Option<String>,
}

impl AlertQuery {
    pub fn resolved_filter(&self) -> Option<bool> {
        self.resolvido
            .as_deref()
            .map(|v| v.eq_ignore_ascii_case("true"))
    }
}
