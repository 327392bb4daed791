//! Engine configuration.
//!
//! The configuration is an explicit value built once at service start and
//! handed to [`crate::ScheduleEngine::new`]. It can be loaded from TOML:
//!
//! ```toml
//! default_project_start = "2025-01-06"
//! allow_negative_lag = true
//! milestone_weight_days = 1
//!
//! [calendar]
//! working_days = ["Mon", "Tue", "Wed", "Thu", "Fri"]
//! holidays = ["2025-12-25"]
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::calendar::WorkCalendarConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fallback start for projects whose store supplies none and whose tasks
    /// carry no pin or planned start.
    pub default_project_start: Option<NaiveDate>,
    /// Whether negative lag (lead time) is accepted on dependencies.
    pub allow_negative_lag: bool,
    /// Weight a milestone carries in the duration-weighted progress rollup.
    pub milestone_weight_days: i64,
    pub calendar: WorkCalendarConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_project_start: None,
            allow_negative_lag: true,
            milestone_weight_days: 1,
            calendar: WorkCalendarConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.milestone_weight_days < 0 {
            return Err(ConfigError::Invalid(format!(
                "milestone_weight_days must be >= 0 (got {})",
                self.milestone_weight_days
            )));
        }
        if self.calendar.working_days().is_empty() {
            return Err(ConfigError::Invalid(
                "[calendar].working_days must name at least one weekday".to_string(),
            ));
        }
        Ok(())
    }
}
