use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

use palisade_geom::{InvalidTileSize, TileSize};

use crate::config::{BuildingDef, CatalogConfig};
use crate::types::{BuildingTemplate, Footprint, TemplateId};

#[derive(Debug, PartialEq)]
pub enum CatalogError {
    Empty,
    DuplicateId(String),
    InvalidTileSize { id: String, source: InvalidTileSize },
    InvalidFootprint { id: String, field: &'static str, value: f64 },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Empty => write!(f, "building catalog has no entries"),
            CatalogError::DuplicateId(id) => write!(f, "duplicate building id '{}'", id),
            CatalogError::InvalidTileSize { id, source } => {
                write!(f, "building '{}': {}", id, source)
            }
            CatalogError::InvalidFootprint { id, field, value } => write!(
                f,
                "building '{}': footprint {} must be finite and > 0 (got {})",
                id, field, value
            ),
        }
    }
}

impl Error for CatalogError {}

/// Ordered, read-only list of placeable templates.
#[derive(Clone, Debug)]
pub struct BuildingCatalog {
    templates: Vec<BuildingTemplate>,
    by_id: HashMap<TemplateId, usize>,
}

impl BuildingCatalog {
    pub fn from_templates(templates: Vec<BuildingTemplate>) -> Result<Self, CatalogError> {
        if templates.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut by_id = HashMap::with_capacity(templates.len());
        for (i, t) in templates.iter().enumerate() {
            if by_id.insert(t.id.clone(), i).is_some() {
                return Err(CatalogError::DuplicateId(t.id.0.clone()));
            }
        }
        Ok(Self { templates, by_id })
    }

    pub fn from_config(cfg: CatalogConfig) -> Result<Self, CatalogError> {
        let templates = cfg
            .buildings
            .into_iter()
            .map(compile_def)
            .collect::<Result<Vec<_>, _>>()?;
        let catalog = Self::from_templates(templates)?;
        log::debug!("building catalog compiled: {} template(s)", catalog.len());
        Ok(catalog)
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: CatalogConfig = toml::from_str(toml_str)?;
        Ok(Self::from_config(cfg)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    pub fn get(&self, id: &TemplateId) -> Option<&BuildingTemplate> {
        self.by_id.get(id).map(|&i| &self.templates[i])
    }

    /// Template by its position in the catalog (button order in a build menu).
    #[inline]
    pub fn get_index(&self, index: usize) -> Option<&BuildingTemplate> {
        self.templates.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BuildingTemplate> {
        self.templates.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn positive(id: &str, field: &'static str, value: f64) -> Result<f64, CatalogError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(CatalogError::InvalidFootprint {
            id: id.to_owned(),
            field,
            value,
        })
    }
}

fn compile_def(def: BuildingDef) -> Result<BuildingTemplate, CatalogError> {
    let tile_size = match def.tile_size {
        Some(t) => Some(
            TileSize::new(t).map_err(|source| CatalogError::InvalidTileSize {
                id: def.id.clone(),
                source,
            })?,
        ),
        None => None,
    };
    let width = positive(&def.id, "width", def.footprint.width)?;
    let length = positive(&def.id, "length", def.footprint.length)?;
    Ok(BuildingTemplate {
        name: def.name.unwrap_or_else(|| def.id.clone()),
        id: TemplateId(def.id),
        category: def.category,
        tile_size,
        footprint: Footprint {
            asset: def.footprint.asset,
            width,
            length,
            collision_probe: def.footprint.collision_probe,
            height_probe: def.footprint.height_probe,
        },
    })
}
