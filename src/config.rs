//! Engine configuration.
//!
//! Tuning knobs for the aggregation display, the loading threshold and the
//! animation timing, loadable from a YAML file with sensible defaults for
//! every field.

use std::fs;
use std::path::Path;
use std::time::Duration;

use color_eyre::eyre::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::diversity::types::SEGMENT_PALETTE;
use crate::view::animation::AnimationTiming;

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Advisory poll period for the external feed
    #[serde(with = "humantime_serde")]
    pub refresh_interval: Duration,
    /// Providers shown individually before folding into "Others"
    pub displayed_providers: usize,
    /// Fraction of public peers that must have a resolved geolocation
    /// before the view leaves the loading presentation
    pub geo_ready_fraction: f64,
    pub animation: AnimationConfig,
}

/// Segment transition tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
    /// Transitions older than duration * factor are snapped to target
    pub watchdog_factor: f64,
    /// Circle fraction the selected segment fills when expanded
    pub expanded_fraction: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(10),
            displayed_providers: 8,
            geo_ready_fraction: 0.5,
            animation: AnimationConfig::default(),
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(400),
            watchdog_factor: 5.0,
            expanded_fraction: 0.6,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid display configuration: {0}")]
    InvalidDisplay(String),
    #[error("Invalid refresh configuration: {0}")]
    InvalidRefresh(String),
    #[error("Invalid animation configuration: {0}")]
    InvalidAnimation(String),
}

impl EngineConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.refresh_interval.is_zero() {
            return Err(ValidationError::InvalidRefresh(
                "refresh_interval must be positive".to_string(),
            ));
        }

        // The palette's last entry is reserved for "Others".
        let max_displayed = SEGMENT_PALETTE.len() - 1;
        if self.displayed_providers == 0 || self.displayed_providers > max_displayed {
            return Err(ValidationError::InvalidDisplay(format!(
                "displayed_providers must be between 1 and {}",
                max_displayed
            )));
        }

        if !(0.0..=1.0).contains(&self.geo_ready_fraction) {
            return Err(ValidationError::InvalidDisplay(
                "geo_ready_fraction must be within [0, 1]".to_string(),
            ));
        }

        if self.animation.duration.is_zero() {
            return Err(ValidationError::InvalidAnimation(
                "duration must be positive".to_string(),
            ));
        }
        if self.animation.watchdog_factor < 1.0 {
            return Err(ValidationError::InvalidAnimation(
                "watchdog_factor must be at least 1.0".to_string(),
            ));
        }
        if self.animation.expanded_fraction <= 0.0 || self.animation.expanded_fraction >= 1.0 {
            return Err(ValidationError::InvalidAnimation(
                "expanded_fraction must be within (0, 1)".to_string(),
            ));
        }

        Ok(())
    }

    /// Timing block handed to the animation controller.
    pub fn animation_timing(&self) -> AnimationTiming {
        AnimationTiming {
            duration_ms: self.animation.duration.as_secs_f64() * 1000.0,
            watchdog_factor: self.animation.watchdog_factor,
            expanded_fraction: self.animation.expanded_fraction,
        }
    }
}

/// Load and validate an engine configuration from a YAML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: EngineConfig = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    config.validate()?;
    Ok(config)
}
