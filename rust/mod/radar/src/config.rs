use serde::Deserialize;

/// Tuning for the radar module. Read from the `[radar]` config table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RadarConfig {
    /// Device id stored when a reading names none, and the device the
    /// device-scoped endpoints report on by default.
    pub default_device: String,
    /// Session id stored when a reading names none.
    pub default_session: String,
    /// How many readings `DELETE /radar/clear` keeps in the database.
    pub retention: usize,
    /// Capacity of the in-memory fallback buffer.
    pub fallback_capacity: usize,
    /// How many readings `GET /radar/latest` returns.
    pub latest_count: usize,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            default_device: "radar_01".to_string(),
            default_session: "default_session".to_string(),
            retention: 1000,
            fallback_capacity: 100,
            latest_count: 10,
        }
    }
}

impl RadarConfig {
    /// Reject settings the handlers cannot work with.
    pub fn validate(&self) -> Result<(), String> {
        if self.default_device.trim().is_empty() {
            return Err("radar.default_device must not be empty".into());
        }
        if self.default_session.trim().is_empty() {
            return Err("radar.default_session must not be empty".into());
        }
        if self.retention == 0 {
            return Err("radar.retention must be at least 1".into());
        }
        if self.fallback_capacity == 0 {
            return Err("radar.fallback_capacity must be at least 1".into());
        }
        if self.latest_count == 0 {
            return Err("radar.latest_count must be at least 1".into());
        }
        Ok(())
    }
}
