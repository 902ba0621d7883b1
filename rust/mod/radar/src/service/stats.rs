use scanguard_core::{ServiceError, round2, start_of_today_rfc3339};
use scanguard_sql::Value;
use scanguard_store::{Filter, FromRow};

use crate::model::{DeviceStats, LastReading, Reading, StatsQuery, StoreStats};
use crate::schema::READINGS;

use super::readings::{window_hours, window_start};
use super::{Backend, RadarService};

/// Detections as a percentage of total, two decimals. Zero when empty.
pub fn detection_rate(total: i64, detections: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    round2(detections as f64 / total as f64 * 100.0)
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Integer(i) => Some(*i as f64),
        Value::Real(f) => Some(*f),
        _ => None,
    }
}

impl RadarService {
    /// `GET /radar/estatisticas`: one device over a trailing window.
    pub fn device_stats(&self, q: &StatsQuery) -> Result<DeviceStats, ServiceError> {
        let device = q
            .dispositivo
            .clone()
            .unwrap_or_else(|| self.config.default_device.clone());
        let hours = window_hours(q.horas)?;
        let since = window_start(hours)?;

        let by_device = Filter::Eq("device_id", Value::from(device.as_str()));
        let in_window = Filter::AtLeast("created_at", Value::from(since));

        let mut conn = self.connect()?;
        let conn = conn.as_mut();

        let window = [by_device.clone(), in_window.clone()];
        let total = READINGS.count(conn, &window)?;
        let detections = READINGS.count(
            conn,
            &[
                by_device.clone(),
                in_window.clone(),
                Filter::Eq("object_detected", Value::from(true)),
            ],
        )?;
        let average = READINGS.aggregate(
            conn,
            "AVG(distance)",
            &[by_device.clone(), in_window, Filter::GreaterThan("distance", Value::Real(0.0))],
        )?;
        let last = READINGS
            .latest(conn, &[by_device])?
            .map(|row| Reading::from_row(&row))
            .transpose()?;

        Ok(DeviceStats {
            total,
            detections,
            detection_rate: detection_rate(total, detections),
            average_distance: as_f64(&average).map(round2).unwrap_or(0.0),
            last_reading: last.map(LastReading::from),
            window_hours: hours,
            device_id: device,
        })
    }

    /// `GET /radar/stats`: table-wide counters.
    pub fn store_stats(&self) -> Result<StoreStats, ServiceError> {
        let today = start_of_today_rfc3339();
        match self.backend()? {
            Backend::Sql(mut conn) => {
                let conn = conn.as_mut();
                let total = READINGS.count(conn, &[])?;
                let today_count = READINGS.count(
                    conn,
                    &[Filter::AtLeast("created_at", Value::from(today))],
                )?;
                let last_update = match READINGS.aggregate(conn, "MAX(created_at)", &[])? {
                    Value::Text(s) => Some(s),
                    _ => None,
                };
                Ok(StoreStats {
                    total_records: total,
                    today_records: today_count,
                    last_update,
                })
            }
            Backend::Memory => {
                let all = self.fallback.latest(self.fallback.capacity());
                Ok(StoreStats {
                    total_records: all.len() as i64,
                    today_records: all.iter().filter(|r| r.created_at >= today).count() as i64,
                    last_update: all.first().map(|r| r.created_at.clone()),
                })
            }
        }
    }
}
