//! Session configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config file.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, bail};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::TimeControl;

/// Environment variable naming a JSON config file
pub const CONFIG_ENV: &str = "CHESS_SESSION_CONFIG";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SessionConfig {
    pub time_control: TimeControl,
    /// Clock tick period
    pub tick_ms: u64,
    /// Pointer travel that turns a press into a drag
    pub drag_threshold_px: f32,
    /// How long a synthetic click after a release is ignored
    pub click_suppression_ms: u64,
    /// Delay between a decisive result and the game-over record appearing
    pub game_over_reveal_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            time_control: TimeControl::default(),
            tick_ms: 100,
            drag_threshold_px: 4.0,
            click_suppression_ms: 250,
            game_over_reveal_ms: 1500,
        }
    }
}

impl SessionConfig {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn click_suppression(&self) -> Duration {
        Duration::from_millis(self.click_suppression_ms)
    }

    pub fn game_over_reveal_delay(&self) -> Duration {
        Duration::from_millis(self.game_over_reveal_ms)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.tick_ms == 0 {
            bail!("tick_ms must be greater than zero");
        }
        if !(self.drag_threshold_px >= 0.0) {
            bail!("drag_threshold_px must be a non-negative number");
        }
        if self.time_control.base_ms == 0 {
            bail!("time_control.base_ms must be greater than zero");
        }
        if self.time_control.base_ms > TimeControl::MAX_MS
            || self.time_control.increment_ms > TimeControl::MAX_MS
        {
            bail!(
                "time_control values must not exceed {} ms",
                TimeControl::MAX_MS
            );
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(json).context("malformed session config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading session config {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("loading {}", path.display()))
    }

    /// Config from the file named by `CHESS_SESSION_CONFIG`, or defaults
    pub fn from_env() -> anyhow::Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(SessionConfig)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_default() {
        let config = SessionConfig::from_json("{}").unwrap();
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.tick_period(), Duration::from_millis(100));
        assert_eq!(config.game_over_reveal_delay(), Duration::from_millis(1500));
    }

    #[test]
    fn test_partial_override() {
        let config = SessionConfig::from_json(
            r#"{ "time_control": { "base_ms": 180000, "increment_ms": 2000 }, "tick_ms": 50 }"#,
        )
        .unwrap();
        assert_eq!(config.time_control, TimeControl::minutes(3, 2));
        assert_eq!(config.tick_ms, 50);
        assert_eq!(config.click_suppression_ms, 250);
    }

    #[test]
    fn test_rejects_zero_tick() {
        let err = SessionConfig::from_json(r#"{ "tick_ms": 0 }"#).unwrap_err();
        assert!(err.to_string().contains("tick_ms"));
    }

    #[test]
    fn test_rejects_oversized_time_control() {
        let err = SessionConfig::from_json(r#"{ "time_control": { "base_ms": 18446744073709551615 } }"#)
            .unwrap_err();
        assert!(err.to_string().contains("time_control"));
        assert!(SessionConfig::from_json(r#"{ "time_control": { "base_ms": 86400000 } }"#).is_ok());
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(SessionConfig::from_json("{ tick_ms: }").is_err());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = SessionConfig::load(Path::new("/nonexistent/session.json")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/session.json"));
    }

    #[test]
    fn test_schema_lists_fields() {
        let schema = serde_json::to_string(&SessionConfig::json_schema()).unwrap();
        assert!(schema.contains("drag_threshold_px"));
        assert!(schema.contains("time_control"));
    }
}
