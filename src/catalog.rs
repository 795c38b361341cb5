//! Sprite category catalog
//!
//! Maps terrain ids to their sprite categories. Populated once from a JSON
//! definition file and read-only afterwards, so lookups are safe to share
//! across threads.

use std::collections::BTreeMap;
use std::path::Path;

use ahash::AHashMap;
use serde::Deserialize;

use crate::codec::TerrainId;
use crate::error::{Error, Result};
use crate::terrain::SpriteCategory;

/// Read-only lookup from terrain id to sprite category
pub trait SpriteCatalog {
    fn category_of(&self, terrain_id: TerrainId) -> Option<SpriteCategory>;
}

/// Catalog definition file: `{ "<terrain id>": "<category label>", ... }`
#[derive(Debug, Deserialize)]
#[serde(transparent)]
struct CatalogFile {
    entries: BTreeMap<String, String>,
}

/// In-memory catalog backed by a JSON definition file
#[derive(Debug, Default, Clone)]
pub struct TerrainCatalog {
    categories: AHashMap<TerrainId, SpriteCategory>,
}

impl TerrainCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, terrain_id: TerrainId, category: SpriteCategory) {
        self.categories.insert(terrain_id, category);
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: CatalogFile =
            serde_json::from_str(json).map_err(|e| Error::InvalidCatalog(e.to_string()))?;
        let mut catalog = Self::new();
        for (key, label) in file.entries {
            let terrain_id: TerrainId = key
                .parse()
                .map_err(|_| Error::InvalidCatalog(format!("bad terrain id {key:?}")))?;
            catalog.insert(terrain_id, SpriteCategory::parse(&label)?);
        }
        Ok(catalog)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

impl SpriteCatalog for TerrainCatalog {
    fn category_of(&self, terrain_id: TerrainId) -> Option<SpriteCategory> {
        self.categories.get(&terrain_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::{DoorPart, Orientation};

    #[test]
    fn test_load_from_json() {
        let catalog = TerrainCatalog::from_json_str(
            r#"{ "12": "door vertical open", "900": "floor stone" }"#,
        )
        .unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.category_of(12),
            Some(SpriteCategory::Door(Orientation::Vertical, DoorPart::Open))
        );
        assert_eq!(catalog.category_of(900), Some(SpriteCategory::Plain));
        assert_eq!(catalog.category_of(13), None);
    }

    #[test]
    fn test_rejects_bad_entries() {
        assert!(TerrainCatalog::from_json_str(r#"{ "x": "floor" }"#).is_err());
        assert!(TerrainCatalog::from_json_str(r#"{ "1": "door vertical opne" }"#).is_err());
        assert!(TerrainCatalog::from_json_str("not json").is_err());
    }
}
