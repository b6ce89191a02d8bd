//! Terrain affinity model.
//!
//! Each terrain has a connect chance (how readily it spreads into a
//! neighbouring cell) and a list of terrains it attracts. Together they drive
//! the neighbour-propagation step of chunk generation.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::TableError;
use crate::terrain::TerrainSymbol;

/// Clustering behaviour of one terrain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AffinityRule {
    pub terrain: TerrainSymbol,
    /// Compared against the cell's roll; values above 1.0 always pass
    pub connect_chance: f64,
    /// Neighbouring terrains that make this terrain more likely to spread
    pub attracts: Vec<TerrainSymbol>,
}

impl AffinityRule {
    pub fn new(terrain: TerrainSymbol, connect_chance: f64, attracts: &[TerrainSymbol]) -> Self {
        Self {
            terrain,
            connect_chance,
            attracts: attracts.to_vec(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AffinityTable {
    pub rules: Vec<AffinityRule>,
}

impl Default for AffinityTable {
    fn default() -> Self {
        use TerrainSymbol::*;

        Self {
            rules: vec![
                AffinityRule::new(Water, 0.9, &[LightGrass, Soil]),
                AffinityRule::new(SwampWater, 0.3, &[DarkGrass]),
                AffinityRule::new(LightGrass, 1.5, &[Water, Soil]),
                AffinityRule::new(DarkGrass, 0.8, &[SwampWater]),
                AffinityRule::new(Soil, 0.2, &[LightGrass, Water]),
            ],
        }
    }
}

impl AffinityTable {
    pub fn rule(&self, terrain: TerrainSymbol) -> Option<&AffinityRule> {
        self.rules.iter().find(|r| r.terrain == terrain)
    }

    /// Every terrain needs exactly one rule with a finite connect chance.
    pub fn validate(&self) -> Result<(), TableError> {
        for terrain in TerrainSymbol::ALL {
            match self.rules.iter().filter(|r| r.terrain == terrain).count() {
                0 => return Err(TableError::MissingAffinity(terrain)),
                1 => {}
                _ => return Err(TableError::DuplicateAffinity(terrain)),
            }
        }
        for rule in &self.rules {
            if !rule.connect_chance.is_finite() || rule.connect_chance < 0.0 {
                return Err(TableError::InvalidConnectChance {
                    terrain: rule.terrain,
                    chance: rule.connect_chance,
                });
            }
        }
        Ok(())
    }

    /// Flatten into per-terrain arrays for the generator's inner loop.
    ///
    /// Call only on a validated table.
    pub fn compile(&self) -> CompiledAffinity {
        let mut connect = [0.0; TerrainSymbol::COUNT];
        let mut attracts = [[false; TerrainSymbol::COUNT]; TerrainSymbol::COUNT];
        for rule in &self.rules {
            connect[rule.terrain.index()] = rule.connect_chance;
            for other in &rule.attracts {
                attracts[rule.terrain.index()][other.index()] = true;
            }
        }
        CompiledAffinity { connect, attracts }
    }
}

/// Array form of an [`AffinityTable`].
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledAffinity {
    connect: [f64; TerrainSymbol::COUNT],
    attracts: [[bool; TerrainSymbol::COUNT]; TerrainSymbol::COUNT],
}

impl CompiledAffinity {
    pub fn connect_chance(&self, terrain: TerrainSymbol) -> f64 {
        self.connect[terrain.index()]
    }

    pub fn attracts(&self, terrain: TerrainSymbol, other: TerrainSymbol) -> bool {
        self.attracts[terrain.index()][other.index()]
    }

    /// Number of neighbours that `wanted` is attracted to.
    pub fn attracting_neighbors(&self, wanted: TerrainSymbol, neighbors: &[TerrainSymbol]) -> usize {
        neighbors.iter().filter(|&&n| self.attracts(wanted, n)).count()
    }

    /// Likeness score: `(1 + attracting neighbours) * u`, `u` uniform in `[0, 1)`.
    ///
    /// Consumes one draw per call.
    pub fn likeness<R: Rng + ?Sized>(
        &self,
        wanted: TerrainSymbol,
        neighbors: &[TerrainSymbol],
        rng: &mut R,
    ) -> f64 {
        let base = 1 + self.attracting_neighbors(wanted, neighbors);
        base as f64 * rng.gen::<f64>()
    }
}
