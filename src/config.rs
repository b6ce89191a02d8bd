//! World configuration and table validation.
//!
//! Everything the generator needs besides the seed lives in [`WorldConfig`].
//! The defaults reproduce the built-in world; a JSON file can override any
//! field. Tables are validated once, before the first chunk is generated.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::affinity::AffinityTable;
use crate::biomes::BiomeTable;
use crate::chunk::ChunkLayout;
use crate::terrain::TerrainSymbol;

/// Default world size in pixels (both axes)
pub const DEFAULT_WORLD_SIZE: f64 = 1_000_000.0;

/// Default window size in pixels
pub const DEFAULT_VIEWPORT: (f64, f64) = (1200.0, 700.0);

/// Chunks generated per frame by the amortized queue
pub const DEFAULT_GENERATION_BUDGET: usize = 4;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Chunk dimensions in tiles and tile size in pixels
    pub layout: ChunkLayout,
    /// World bounds in pixels; the camera and point queries clamp to these
    pub world_width: f64,
    pub world_height: f64,
    /// Initial viewport size in pixels
    pub viewport_width: f64,
    pub viewport_height: f64,
    /// Evict chunks beyond this many. `None` keeps every chunk ever generated.
    pub max_cached_chunks: Option<usize>,
    /// Queued chunks generated per frame
    pub generation_budget: usize,
    pub biomes: BiomeTable,
    pub affinity: AffinityTable,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            layout: ChunkLayout::default(),
            world_width: DEFAULT_WORLD_SIZE,
            world_height: DEFAULT_WORLD_SIZE,
            viewport_width: DEFAULT_VIEWPORT.0,
            viewport_height: DEFAULT_VIEWPORT.1,
            max_cached_chunks: None,
            generation_budget: DEFAULT_GENERATION_BUDGET,
            biomes: BiomeTable::default(),
            affinity: AffinityTable::default(),
        }
    }
}

impl WorldConfig {
    /// Load a JSON config file and validate it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let config: WorldConfig =
            serde_json::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> String {
        // Every field is a plain number, string, list or map
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), TableError> {
        self.layout.validate()?;
        let valid_bounds = self.world_width.is_finite()
            && self.world_height.is_finite()
            && self.world_width >= self.layout.tile_size.max(1.0)
            && self.world_height >= self.layout.tile_size.max(1.0);
        if !valid_bounds {
            return Err(TableError::InvalidWorldBounds {
                width: self.world_width,
                height: self.world_height,
            });
        }
        self.biomes.validate()?;
        self.affinity.validate()?;
        Ok(())
    }
}

/// A generation table or layout that cannot produce a valid world.
#[derive(Debug, Clone, PartialEq)]
pub enum TableError {
    NoBiomes,
    EmptyBiomeName,
    DuplicateBiome(String),
    InvalidWeight { biome: String, weight: f64 },
    MissingFrequency { biome: String, terrain: TerrainSymbol },
    DuplicateFrequency { biome: String, terrain: TerrainSymbol },
    InvalidRange { biome: String, terrain: TerrainSymbol, min: f64, max: f64 },
    /// No terrain with `min >= 1.0`, so some cells could stay unset
    NoDominantTerrain { biome: String },
    MissingAffinity(TerrainSymbol),
    DuplicateAffinity(TerrainSymbol),
    InvalidConnectChance { terrain: TerrainSymbol, chance: f64 },
    InvalidLayout(String),
    InvalidWorldBounds { width: f64, height: f64 },
}

impl std::fmt::Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableError::NoBiomes => write!(f, "biome table is empty"),
            TableError::EmptyBiomeName => write!(f, "biome with an empty name"),
            TableError::DuplicateBiome(name) => write!(f, "biome '{}' defined twice", name),
            TableError::InvalidWeight { biome, weight } => {
                write!(f, "biome '{}' has invalid weight {}", biome, weight)
            }
            TableError::MissingFrequency { biome, terrain } => {
                write!(f, "biome '{}' has no frequency range for {}", biome, terrain)
            }
            TableError::DuplicateFrequency { biome, terrain } => {
                write!(f, "biome '{}' lists {} more than once", biome, terrain)
            }
            TableError::InvalidRange { biome, terrain, min, max } => write!(
                f,
                "biome '{}' has invalid range {}..{} for {}",
                biome, min, max, terrain
            ),
            TableError::NoDominantTerrain { biome } => write!(
                f,
                "biome '{}' needs at least one terrain with min frequency >= 1.0",
                biome
            ),
            TableError::MissingAffinity(terrain) => write!(f, "no affinity rule for {}", terrain),
            TableError::DuplicateAffinity(terrain) => {
                write!(f, "affinity rule for {} defined twice", terrain)
            }
            TableError::InvalidConnectChance { terrain, chance } => {
                write!(f, "invalid connect chance {} for {}", chance, terrain)
            }
            TableError::InvalidLayout(reason) => write!(f, "invalid chunk layout: {}", reason),
            TableError::InvalidWorldBounds { width, height } => {
                write!(f, "invalid world bounds {}x{}", width, height)
            }
        }
    }
}

impl std::error::Error for TableError {}

/// Errors that can occur while loading a config file.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(String),
    Table(TableError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Table(e) => write!(f, "Table error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<TableError> for ConfigError {
    fn from(e: TableError) -> Self {
        ConfigError::Table(e)
    }
}
