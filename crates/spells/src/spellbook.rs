//! Spell definitions, collections and the player's spellbook

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::error::ClassifyError;
use crate::map::ClassificationMap;

#[derive(Debug, Error)]
pub enum SpellbookError {
    #[error("Can't learn spell at collection index {index}: out of range ({len} spells)")]
    OutOfRange { index: usize, len: usize },
    #[error("Spell '{0}' is already known")]
    AlreadyKnown(String),
    #[error("Failed to read manifest: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse manifest: {0}")]
    Manifest(#[from] serde_json::Error),
    #[error("Failed to load value map {}: {source}", path.display())]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("Invalid value map: {0}")]
    Map(#[from] ClassifyError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpellNature {
    #[default]
    None,
    Fire,
    Earth,
    Water,
    Wind,
    Light,
    Mixed,
}

/// A learnable spell and the pattern that casts it
#[derive(Debug, Clone, PartialEq)]
pub struct SpellData {
    pub name: String,
    pub description: String,
    pub nature: SpellNature,
    pub map: ClassificationMap,
}

impl SpellData {
    pub fn new(name: impl Into<String>, nature: SpellNature, map: ClassificationMap) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            nature,
            map,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// One entry of a collection manifest; `value_map` is relative to the
/// manifest file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpellEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub nature: SpellNature,
    pub value_map: PathBuf,
}

/// Ordered list of spells, checked front to back when scanning a drawing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpellCollection {
    spells: Vec<SpellData>,
}

impl SpellCollection {
    pub fn new(spells: Vec<SpellData>) -> Self {
        Self { spells }
    }

    /// Load a JSON manifest (an array of [`SpellEntry`]) and its value maps
    pub fn load_manifest(path: impl AsRef<Path>) -> Result<Self, SpellbookError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let entries: Vec<SpellEntry> = serde_json::from_str(&contents)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));

        let mut spells = Vec::with_capacity(entries.len());
        for entry in entries {
            let map_path = base.join(&entry.value_map);
            let value_image = image::open(&map_path)
                .map_err(|source| SpellbookError::Image {
                    path: map_path.clone(),
                    source,
                })?
                .to_rgba8();
            let map = ClassificationMap::from_value_image(&value_image)?;
            if let Err(e) = map.validate() {
                warn!("Spell '{}' cannot be classified: {}", entry.name, e);
            }
            spells.push(SpellData {
                name: entry.name,
                description: entry.description,
                nature: entry.nature,
                map,
            });
        }

        info!("Loaded {} spells from {}", spells.len(), path.display());
        Ok(Self { spells })
    }

    pub fn push(&mut self, spell: SpellData) {
        self.spells.push(spell);
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&SpellData> {
        self.spells.get(index)
    }

    #[inline]
    pub fn spells(&self) -> &[SpellData] {
        &self.spells
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.spells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.spells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpellData> {
        self.spells.iter()
    }
}

impl FromIterator<SpellData> for SpellCollection {
    fn from_iter<I: IntoIterator<Item = SpellData>>(iter: I) -> Self {
        Self {
            spells: iter.into_iter().collect(),
        }
    }
}

/// Spells a player has learned from a collection, in learning order
#[derive(Debug, Clone)]
pub struct Spellbook {
    collection: Arc<SpellCollection>,
    /// Collection indices of known spells
    known: Vec<usize>,
}

impl Spellbook {
    pub fn new(collection: Arc<SpellCollection>) -> Self {
        Self {
            collection,
            known: Vec::new(),
        }
    }

    /// Learn the spell at `collection_index`
    pub fn learn(&mut self, collection_index: usize) -> Result<&SpellData, SpellbookError> {
        let len = self.collection.len();
        let Some(spell) = self.collection.get(collection_index) else {
            return Err(SpellbookError::OutOfRange {
                index: collection_index,
                len,
            });
        };
        if self.known.contains(&collection_index) {
            return Err(SpellbookError::AlreadyKnown(spell.name.clone()));
        }

        self.known.push(collection_index);
        info!("Learned spell '{}'", spell.name);
        Ok(spell)
    }

    /// Known spell by learning order, None out of range
    pub fn known_spell(&self, index: usize) -> Option<&SpellData> {
        self.known
            .get(index)
            .and_then(|&collection_index| self.collection.get(collection_index))
    }

    pub fn knows(&self, collection_index: usize) -> bool {
        self.known.contains(&collection_index)
    }

    #[inline]
    pub fn known_count(&self) -> usize {
        self.known.len()
    }

    pub fn known_spells(&self) -> impl Iterator<Item = &SpellData> {
        self.known
            .iter()
            .filter_map(|&collection_index| self.collection.get(collection_index))
    }

    #[inline]
    pub fn collection(&self) -> &SpellCollection {
        &self.collection
    }
}
