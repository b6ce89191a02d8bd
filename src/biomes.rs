//! Biome table for chunk generation.
//!
//! A biome is a named frequency profile: for every terrain symbol it gives a
//! range from which the chunk's base chance for that terrain is drawn. Each
//! chunk gets exactly one biome, picked by cumulative weight.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::TableError;
use crate::terrain::TerrainSymbol;

/// Upper bound for a frequency. Chances are compared against a roll in
/// `[0, 1)`, so anything above 1 already always qualifies.
pub const MAX_FREQUENCY: f64 = 1_000_000.0;

/// Range the per-chunk base chance of one terrain is drawn from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrequencyRange {
    pub terrain: TerrainSymbol,
    pub min: f64,
    pub max: f64,
}

impl FrequencyRange {
    pub fn new(terrain: TerrainSymbol, min: f64, max: f64) -> Self {
        Self { terrain, min, max }
    }
}

/// A named frequency profile with a selection weight.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Biome {
    pub name: String,
    pub weight: f64,
    pub frequencies: Vec<FrequencyRange>,
}

impl Biome {
    pub fn new(name: &str, weight: f64, frequencies: Vec<FrequencyRange>) -> Self {
        Self {
            name: name.to_string(),
            weight,
            frequencies,
        }
    }

    /// Frequency range configured for a terrain, if any
    pub fn range_for(&self, terrain: TerrainSymbol) -> Option<&FrequencyRange> {
        self.frequencies.iter().find(|r| r.terrain == terrain)
    }

    /// Terrain whose base chance can never fall below 1.0.
    ///
    /// Every draw in `[0, 1)` clears such a terrain, so cells never stay
    /// unset. Highest `min` wins; declaration order breaks ties.
    pub fn dominant_terrain(&self) -> Option<TerrainSymbol> {
        let mut best: Option<&FrequencyRange> = None;
        for range in self.frequencies.iter().filter(|r| r.min >= 1.0) {
            if best.map_or(true, |b| range.min > b.min) {
                best = Some(range);
            }
        }
        best.map(|r| r.terrain)
    }

    fn validate(&self) -> Result<(), TableError> {
        if self.name.trim().is_empty() {
            return Err(TableError::EmptyBiomeName);
        }
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(TableError::InvalidWeight {
                biome: self.name.clone(),
                weight: self.weight,
            });
        }

        for terrain in TerrainSymbol::ALL {
            let count = self.frequencies.iter().filter(|r| r.terrain == terrain).count();
            if count == 0 {
                return Err(TableError::MissingFrequency {
                    biome: self.name.clone(),
                    terrain,
                });
            }
            if count > 1 {
                return Err(TableError::DuplicateFrequency {
                    biome: self.name.clone(),
                    terrain,
                });
            }
        }

        for range in &self.frequencies {
            let valid = range.min.is_finite()
                && range.max.is_finite()
                && range.min >= 0.0
                && range.min <= range.max
                && (range.max - range.min).is_finite()
                && range.max <= MAX_FREQUENCY;
            if !valid {
                return Err(TableError::InvalidRange {
                    biome: self.name.clone(),
                    terrain: range.terrain,
                    min: range.min,
                    max: range.max,
                });
            }
        }

        if self.dominant_terrain().is_none() {
            return Err(TableError::NoDominantTerrain {
                biome: self.name.clone(),
            });
        }

        Ok(())
    }
}

/// Ordered list of biomes. Order matters: cumulative selection walks it
/// front to back and falls back to the last entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BiomeTable {
    pub biomes: Vec<Biome>,
}

impl Default for BiomeTable {
    fn default() -> Self {
        let profile = |ranges: [(f64, f64); 5]| -> Vec<FrequencyRange> {
            TerrainSymbol::ALL
                .iter()
                .zip(ranges)
                .map(|(&terrain, (min, max))| FrequencyRange::new(terrain, min, max))
                .collect()
        };

        Self {
            biomes: vec![
                // W, SW, LG, DG, S
                Biome::new(
                    "lakeland",
                    0.15,
                    profile([(0.6, 0.95), (0.1, 0.2), (1.0, 1.3), (0.2, 0.4), (0.05, 0.1)]),
                ),
                Biome::new(
                    "wetland",
                    0.20,
                    profile([(0.1, 0.3), (0.5, 0.9), (1.0, 1.2), (0.6, 0.95), (0.02, 0.05)]),
                ),
                Biome::new(
                    "farmland",
                    0.15,
                    profile([(0.05, 0.15), (0.02, 0.08), (1.0, 1.5), (0.2, 0.4), (0.3, 0.6)]),
                ),
                // Most common; also the fallback
                Biome::new(
                    "meadow",
                    0.50,
                    profile([(0.2, 0.5), (0.1, 0.3), (1.0, 1.5), (0.4, 0.8), (0.05, 0.1)]),
                ),
            ],
        }
    }
}

impl BiomeTable {
    pub fn new(biomes: Vec<Biome>) -> Self {
        Self { biomes }
    }

    pub fn len(&self) -> usize {
        self.biomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.biomes.is_empty()
    }

    pub fn get(&self, index: usize) -> &Biome {
        &self.biomes[index]
    }

    /// Index of the biome returned when no cumulative weight reaches the roll
    pub fn fallback_index(&self) -> usize {
        self.biomes.len().saturating_sub(1)
    }

    pub fn validate(&self) -> Result<(), TableError> {
        if self.biomes.is_empty() {
            return Err(TableError::NoBiomes);
        }
        for (i, biome) in self.biomes.iter().enumerate() {
            biome.validate()?;
            if self.biomes[..i].iter().any(|b| b.name == biome.name) {
                return Err(TableError::DuplicateBiome(biome.name.clone()));
            }
        }
        Ok(())
    }

    /// Pick a biome index for a roll in `[0, 1)`.
    ///
    /// Returns the first biome whose cumulative weight reaches the roll;
    /// the last biome if rounding (or weights summing below 1) leaves the
    /// roll unmatched.
    pub fn select_for_roll(&self, roll: f64) -> usize {
        let mut cumulative = 0.0;
        for (i, biome) in self.biomes.iter().enumerate() {
            cumulative += biome.weight;
            if cumulative >= roll {
                return i;
            }
        }
        self.fallback_index()
    }

    /// Draw one roll from the stream and select a biome index.
    pub fn select_biome<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let roll: f64 = rng.gen();
        self.select_for_roll(roll)
    }
}
