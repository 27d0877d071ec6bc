//! # Settings
//!
//! Loaded once at startup from TOML. Every field has a default, so an empty
//! file is a valid configuration.
//!
//! ```toml
//! time_step_multiplier = 1.0
//!
//! [stats]
//! timing_buffers = [5.0, 15.0, 60.0]
//! timing_bar_buffer = 5.0
//!
//! [worlds.overworld]
//! gravity = [0.0, -9.81, 0.0]
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Longest accepted timing window, in seconds (one hour).
pub const MAX_TIMING_BUFFER_SECS: f64 = 3600.0;

/// Converts a configured window to a [`Duration`], if it is in range.
pub(crate) fn timing_window(secs: f64) -> Option<Duration> {
    if secs > 0.0 && secs <= MAX_TIMING_BUFFER_SECS {
        Duration::try_from_secs_f64(secs).ok()
    } else {
        None
    }
}

/// Top-level settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Scales the base time step. 2.0 runs physics twice as fast as the host.
    pub time_step_multiplier: f64,
    /// Timing history settings.
    pub stats: StatsSettings,
    /// Per-world space settings, keyed by world key.
    pub worlds: HashMap<String, SpaceSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            time_step_multiplier: 1.0,
            stats: StatsSettings::default(),
            worlds: HashMap::new(),
        }
    }
}

impl Settings {
    /// Parses and validates settings from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed TOML and
    /// [`ConfigError::Invalid`] on out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads, parses and validates a settings file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.time_step_multiplier.is_finite() && self.time_step_multiplier > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "time_step_multiplier must be a positive number, got {}",
                self.time_step_multiplier
            )));
        }
        for buffer in self
            .stats
            .timing_buffers
            .iter()
            .chain(std::iter::once(&self.stats.timing_bar_buffer))
        {
            if timing_window(*buffer).is_none() {
                return Err(ConfigError::Invalid(format!(
                    "timing buffers must be positive seconds up to {MAX_TIMING_BUFFER_SECS}, got {buffer}"
                )));
            }
        }
        for (key, space) in &self.worlds {
            if space.gravity.iter().any(|g| !g.is_finite()) {
                return Err(ConfigError::Invalid(format!(
                    "worlds.{key}.gravity must be finite"
                )));
            }
        }
        Ok(())
    }

    /// Space settings for a world, or the defaults if it is not configured.
    #[must_use]
    pub fn space_settings_for(&self, world: &str) -> SpaceSettings {
        self.worlds.get(world).cloned().unwrap_or_default()
    }
}

/// Step timing history settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsSettings {
    /// Windows (seconds) that timing summaries are reported over.
    pub timing_buffers: Vec<f64>,
    /// Window (seconds) of the short live readout, see
    /// [`ServerPhysics::timing_bar_stats`](crate::ServerPhysics::timing_bar_stats).
    pub timing_bar_buffer: f64,
}

impl Default for StatsSettings {
    fn default() -> Self {
        Self {
            timing_buffers: vec![5.0, 15.0, 60.0],
            timing_bar_buffer: 5.0,
        }
    }
}

impl StatsSettings {
    /// How long tick timings are retained: the longest configured window.
    ///
    /// Out-of-range windows are ignored.
    #[must_use]
    pub fn retention(&self) -> Duration {
        self.timing_buffers
            .iter()
            .copied()
            .chain(std::iter::once(self.timing_bar_buffer))
            .filter_map(timing_window)
            .max()
            .unwrap_or_default()
    }
}

/// Settings for one physics space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceSettings {
    /// Gravity acceleration, m/s².
    pub gravity: [f64; 3],
}

impl Default for SpaceSettings {
    fn default() -> Self {
        Self {
            gravity: [0.0, -9.81, 0.0],
        }
    }
}
