//! Table layout and per-resource column profiles.

use scanguard_store::{Column, ColumnKind, ResourceDef};

/// DDL for all radar tables. Safe to run on every start.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS readings (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    angle            REAL NOT NULL,
    distance         REAL NOT NULL,
    timestamp        NUMERIC,
    created_at       TEXT NOT NULL,
    device_id        TEXT NOT NULL,
    session_id       TEXT NOT NULL,
    object_detected  INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_readings_created_at ON readings(created_at DESC);
CREATE INDEX IF NOT EXISTS idx_readings_device ON readings(device_id, created_at);

CREATE TABLE IF NOT EXISTS sessions (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id       TEXT NOT NULL UNIQUE,
    start_time       TEXT NOT NULL,
    end_time         TEXT,
    reading_count    INTEGER NOT NULL DEFAULT 0,
    detection_count  INTEGER NOT NULL DEFAULT 0,
    is_active        INTEGER NOT NULL DEFAULT 1
);
CREATE INDEX IF NOT EXISTS idx_sessions_start_time ON sessions(start_time);

CREATE TABLE IF NOT EXISTS alerts (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    alert_type  TEXT NOT NULL,
    message     TEXT NOT NULL,
    severity    TEXT NOT NULL DEFAULT 'info',
    timestamp   TEXT NOT NULL,
    resolved    INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_alerts_timestamp ON alerts(timestamp);
";

/// Readings as posted to `/radar/data`: English field names, 0–180° sweep.
pub const READINGS: ResourceDef = ResourceDef {
    table: "readings",
    label: "reading",
    order_by: "created_at",
    columns: &[
        Column::new("angle", "angle", ColumnKind::Real).required().range(0.0, 180.0),
        Column::new("distance", "distance", ColumnKind::Real).required().range(0.0, 400.0),
        Column::new("timestamp", "timestamp", ColumnKind::Number),
        Column::new("device_id", "device_id", ColumnKind::Text),
        Column::new("session_id", "session_id", ColumnKind::Text),
        Column::new("object_detected", "object_detected", ColumnKind::Bool),
    ],
};

/// Readings as posted to `/radar/leituras`: Portuguese field names, full turn.
pub const LEITURAS: ResourceDef = ResourceDef {
    table: "readings",
    label: "reading",
    order_by: "created_at",
    columns: &[
        Column::new("angle", "angulo", ColumnKind::Real).required().range(0.0, 360.0),
        Column::new("distance", "distancia", ColumnKind::Real).required().range(0.0, 400.0),
        Column::new("timestamp", "timestamp", ColumnKind::Number),
        Column::new("device_id", "id_dispositivo", ColumnKind::Text),
        Column::new("session_id", "id_sessao", ColumnKind::Text),
        Column::new("object_detected", "objeto_detetado", ColumnKind::Bool),
    ],
};

/// Sessions take no client fields; every column is server-assigned.
pub const SESSIONS: ResourceDef = ResourceDef {
    table: "sessions",
    label: "session",
    order_by: "start_time",
    columns: &[],
};

pub const ALERTS: ResourceDef = ResourceDef {
    table: "alerts",
    label: "alert",
    order_by: "timestamp",
    columns: &[
        Column::new("alert_type", "tipo_alerta", ColumnKind::Text).required(),
        Column::new("message", "mensagem", ColumnKind::Text).required(),
        Column::new("severity", "severidade", ColumnKind::Text),
    ],
};
