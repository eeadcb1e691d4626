use std::error::Error;
use std::fmt;

use palisade_catalog::TemplateId;
use palisade_geom::InvalidTileSize;

/// Rejected placement tuning, reported once at startup.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    InvalidTileSize(InvalidTileSize),
    ZeroDelay(&'static str),
    InvalidSpacing(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidTileSize(e) => write!(f, "placement config: {}", e),
            ConfigError::ZeroDelay(which) => {
                write!(f, "placement config: {} must be at least one tick", which)
            }
            ConfigError::InvalidSpacing(v) => write!(
                f,
                "placement config: chain_min_spacing must be finite and >= 0 (got {})",
                v
            ),
        }
    }
}

impl Error for ConfigError {}

impl From<InvalidTileSize> for ConfigError {
    fn from(e: InvalidTileSize) -> Self {
        ConfigError::InvalidTileSize(e)
    }
}

/// Selection failures. The session is left idle when one of these is returned
/// after the previous selection was already discarded.
#[derive(Debug, PartialEq)]
pub enum PlacementError {
    UnknownTemplate(TemplateId),
    UnknownIndex(usize),
    MissingCollisionProbe(TemplateId),
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementError::UnknownTemplate(id) => write!(f, "no building template '{}'", id),
            PlacementError::UnknownIndex(i) => write!(f, "no building template at index {}", i),
            PlacementError::MissingCollisionProbe(id) => write!(
                f,
                "building '{}' has no collision probe; every placeable template needs one",
                id
            ),
        }
    }
}

impl Error for PlacementError {}
