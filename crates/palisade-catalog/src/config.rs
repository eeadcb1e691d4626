use serde::Deserialize;

use crate::types::Category;

// Top-level catalog file
#[derive(Deserialize, Debug, Default)]
pub struct CatalogConfig {
    #[serde(default)]
    pub buildings: Vec<BuildingDef>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct BuildingDef {
    pub id: String,
    // Display name; falls back to the id.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub tile_size: Option<f64>,
    pub footprint: FootprintDef,
}

#[derive(Deserialize, Debug, Clone)]
pub struct FootprintDef {
    pub asset: String,
    #[serde(default = "default_extent")]
    pub width: f64,
    #[serde(default = "default_extent")]
    pub length: f64,
    #[serde(default = "default_true")]
    pub collision_probe: bool,
    #[serde(default = "default_true")]
    pub height_probe: bool,
}

fn default_extent() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}
