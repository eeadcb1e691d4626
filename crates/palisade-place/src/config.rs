use std::error::Error;
use std::fs;
use std::path::Path;

use palisade_geom::TileSize;
use serde::Deserialize;

use crate::error::ConfigError;

/// Placement tuning as written in `placement.toml`. Every field is optional.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlacementConfig {
    /// Default grid step for templates without their own.
    pub tile_size: f64,
    /// Ticks between two rotations while a rotate key is held.
    pub rotation_delay: u32,
    /// Ticks a selection must live before the cancel key takes effect.
    pub cancel_delay: u32,
    /// Ticks between two placements of a standard building.
    pub placement_delay: u32,
    /// Minimum ground distance between consecutive wall segments.
    /// Absent means a held button places a segment every valid tick.
    pub chain_min_spacing: Option<f64>,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            tile_size: 0.5,
            rotation_delay: 60,
            cancel_delay: 60,
            placement_delay: 120,
            chain_min_spacing: None,
        }
    }
}

impl PlacementConfig {
    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        Ok(toml::from_str(toml_str)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    pub fn validate(&self) -> Result<PlacementSettings, ConfigError> {
        let tile_size = TileSize::new(self.tile_size)?;
        for (name, v) in [
            ("rotation_delay", self.rotation_delay),
            ("cancel_delay", self.cancel_delay),
            ("placement_delay", self.placement_delay),
        ] {
            if v == 0 {
                return Err(ConfigError::ZeroDelay(name));
            }
        }
        if let Some(s) = self.chain_min_spacing {
            if !s.is_finite() || s < 0.0 {
                return Err(ConfigError::InvalidSpacing(s));
            }
        }
        Ok(PlacementSettings {
            tile_size,
            rotation_delay: self.rotation_delay,
            cancel_delay: self.cancel_delay,
            placement_delay: self.placement_delay,
            chain_min_spacing: self.chain_min_spacing,
        })
    }
}

/// Validated tuning used by a running session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementSettings {
    pub tile_size: TileSize,
    pub rotation_delay: u32,
    pub cancel_delay: u32,
    pub placement_delay: u32,
    pub chain_min_spacing: Option<f64>,
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self {
            tile_size: TileSize::DEFAULT,
            rotation_delay: 60,
            cancel_delay: 60,
            placement_delay: 120,
            chain_min_spacing: None,
        }
    }
}
