use std::{fs, path::Path};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::normalize::Normalization;

pub const RESOLUTION_MIN: usize = 16;
pub const RESOLUTION_MAX: usize = 10_000;
pub const RESOLUTION_DEFAULT: usize = 3600;

pub const DB_FLOOR_MIN: f64 = -300.;
pub const DB_FLOOR_MAX: f64 = -10.;
pub const DB_FLOOR_DEFAULT: f64 = -30.;

pub const PRECISION_MIN: usize = 1;
pub const PRECISION_MAX: usize = 10;
pub const PRECISION_DEFAULT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AngleUnit {
    Degrees,
    Radians,
}

impl AngleUnit {
    pub fn to_radians(self, x: f64) -> f64 {
        match self {
            AngleUnit::Degrees => x.to_radians(),
            AngleUnit::Radians => x,
        }
    }

    pub fn from_radians(self, x: f64) -> f64 {
        match self {
            AngleUnit::Degrees => x.to_degrees(),
            AngleUnit::Radians => x,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum Scale {
    #[serde(rename = "dB")]
    #[value(name = "db")]
    Db,
    #[serde(rename = "linear")]
    Linear,
}

/// Settings the hosting application hands to the engine on every call.
///
/// Nothing here is read from process-wide state; two runs with the same config and parameters
/// produce the same result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub resolution_min: usize,
    pub resolution_max: usize,
    pub resolution_default: usize,
    /// Lower clamp applied to the dB pattern.
    pub db_floor: f64,
    pub precision_digits: usize,
    /// Unit in which angular inputs are given.
    pub angle_unit: AngleUnit,
    pub scale: Scale,
    pub normalize_array_factor: bool,
    pub excitation_normalization: Normalization,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            resolution_min: RESOLUTION_MIN,
            resolution_max: RESOLUTION_MAX,
            resolution_default: RESOLUTION_DEFAULT,
            db_floor: DB_FLOOR_DEFAULT,
            precision_digits: PRECISION_DEFAULT,
            angle_unit: AngleUnit::Degrees,
            scale: Scale::Db,
            normalize_array_factor: true,
            excitation_normalization: Normalization::Max,
        }
    }
}

impl EngineConfig {
    pub fn with_angle_unit(mut self, unit: AngleUnit) -> Self {
        self.angle_unit = unit;
        self
    }

    pub fn with_db_floor(mut self, floor: f64) -> Self {
        self.db_floor = floor;
        self
    }

    /// Reads a JSON config file. Absent keys take their defaults; the result is passed through
    /// [EngineConfig::validated].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<EngineConfig, ConfigError> {
        let text = fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&text)?;
        Ok(config.validated())
    }

    /// Replaces every out-of-range setting by its default.
    pub fn validated(mut self) -> Self {
        let defaults = EngineConfig::default();

        if self.resolution_min < RESOLUTION_MIN || self.resolution_min > self.resolution_max {
            warn!(
                value = self.resolution_min,
                "resolution_min out of range, using default"
            );
            self.resolution_min = defaults.resolution_min;
        }
        if self.resolution_max < self.resolution_min {
            warn!(
                value = self.resolution_max,
                "resolution_max below resolution_min, using default"
            );
            self.resolution_max = defaults.resolution_max.max(self.resolution_min);
        }
        if !(self.resolution_min..=self.resolution_max).contains(&self.resolution_default) {
            warn!(
                value = self.resolution_default,
                "resolution_default out of range, using default"
            );
            self.resolution_default = defaults
                .resolution_default
                .clamp(self.resolution_min, self.resolution_max);
        }
        if !(DB_FLOOR_MIN..=DB_FLOOR_MAX).contains(&self.db_floor) {
            warn!(value = self.db_floor, "db_floor out of range, using default");
            self.db_floor = defaults.db_floor;
        }
        if !(PRECISION_MIN..=PRECISION_MAX).contains(&self.precision_digits) {
            warn!(
                value = self.precision_digits,
                "precision_digits out of range, using default"
            );
            self.precision_digits = defaults.precision_digits;
        }

        self
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config file: {0}")]
    Json(#[from] serde_json::Error),
}
