use std::fmt;

use palisade_geom::TileSize;
use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateId(pub String);

impl TemplateId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TemplateId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// How a template behaves once placed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Repeatable placement gated by the placement cooldown.
    #[default]
    Standard,
    /// One placement per selection (townhall-class).
    Unique,
    /// Continuous placement of linked segments with axis locking.
    ChainWall,
}

/// Descriptor handed to the host collaborators when they build instances.
#[derive(Clone, Debug, PartialEq)]
pub struct Footprint {
    /// Opaque asset key (prefab/mesh name) understood by the host.
    pub asset: String,
    /// Extent across the building (local X).
    pub width: f64,
    /// Longitudinal extent (local Z); a wall segment's length.
    pub length: f64,
    pub collision_probe: bool,
    pub height_probe: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BuildingTemplate {
    pub id: TemplateId,
    pub name: String,
    pub category: Category,
    pub tile_size: Option<TileSize>,
    pub footprint: Footprint,
}

impl BuildingTemplate {
    /// Grid step used while this template is being placed.
    ///
    /// An explicit override wins. Chain walls otherwise snap by their own
    /// length so consecutive segments abut; everything else uses `default`.
    pub fn effective_tile_size(&self, default: TileSize) -> TileSize {
        if let Some(t) = self.tile_size {
            return t;
        }
        match self.category {
            Category::ChainWall => TileSize::new(self.footprint.length).unwrap_or(default),
            Category::Standard | Category::Unique => default,
        }
    }

    #[inline]
    pub fn is_chain_wall(&self) -> bool {
        self.category == Category::ChainWall
    }
}
