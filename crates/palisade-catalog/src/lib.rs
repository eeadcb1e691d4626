//! Building templates and the catalog they are loaded into.
#![forbid(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod types;

pub use catalog::{BuildingCatalog, CatalogError};
pub use types::{BuildingTemplate, Category, Footprint, TemplateId};
