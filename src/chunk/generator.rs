//! Chunk generation.
//!
//! A chunk is built in two phases. The first fills a mutable grid cell by cell
//! in row-major order: a cell either copies an already-placed neighbour
//! (neighbour propagation) or falls back to the chunk's base chances. The
//! second phase (the blend pass) replaces cells that match none of their
//! neighbours. The grid is then frozen into an immutable [`Chunk`].
//!
//! All randomness, including the blend pass, comes from the chunk's own RNG
//! stream, so a chunk depends only on the world seed and its coordinates.

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::affinity::{AffinityTable, CompiledAffinity};
use crate::biomes::BiomeTable;
use crate::config::{TableError, WorldConfig};
use crate::seeds::{chunk_rng, WorldSeed};
use crate::terrain::TerrainSymbol;
use crate::tilemap::Tilemap;

use super::coords::{ChunkCoord, ChunkLayout};
use super::types::Chunk;

/// Anything that can produce the chunk for a coordinate.
///
/// Implementations must be deterministic: the same coordinate always yields
/// the same chunk.
pub trait ChunkSource {
    fn generate(&self, coord: ChunkCoord) -> Chunk;
}

/// Per-terrain base chances for one chunk, indexed by [`TerrainSymbol::index`]
pub type BaseChances = [f64; TerrainSymbol::COUNT];

/// Validated biome and affinity tables in array form.
#[derive(Clone, Debug)]
pub struct GenerationTables {
    biomes: BiomeTable,
    /// (min, max) per biome per terrain
    ranges: Vec<[(f64, f64); TerrainSymbol::COUNT]>,
    /// Terrain used for any cell that still has no symbol after blending
    dominant: Vec<TerrainSymbol>,
    affinity: CompiledAffinity,
}

impl GenerationTables {
    /// Validate both tables and flatten them.
    pub fn new(biomes: &BiomeTable, affinity: &AffinityTable) -> Result<Self, TableError> {
        biomes.validate()?;
        affinity.validate()?;

        let mut ranges = Vec::with_capacity(biomes.len());
        let mut dominant = Vec::with_capacity(biomes.len());
        for biome in &biomes.biomes {
            let mut row = [(0.0, 0.0); TerrainSymbol::COUNT];
            for terrain in TerrainSymbol::ALL {
                let range = biome.range_for(terrain).ok_or_else(|| TableError::MissingFrequency {
                    biome: biome.name.clone(),
                    terrain,
                })?;
                row[terrain.index()] = (range.min, range.max);
            }
            ranges.push(row);
            dominant.push(biome.dominant_terrain().ok_or_else(|| {
                TableError::NoDominantTerrain {
                    biome: biome.name.clone(),
                }
            })?);
        }

        Ok(Self {
            biomes: biomes.clone(),
            ranges,
            dominant,
            affinity: affinity.compile(),
        })
    }

    pub fn biomes(&self) -> &BiomeTable {
        &self.biomes
    }

    pub fn affinity(&self) -> &CompiledAffinity {
        &self.affinity
    }

    /// Draw one base chance per terrain, in stable terrain order.
    pub fn roll_base_chances<R: Rng + ?Sized>(&self, biome: usize, rng: &mut R) -> BaseChances {
        let mut chances = [0.0; TerrainSymbol::COUNT];
        for terrain in TerrainSymbol::ALL {
            let (min, max) = self.ranges[biome][terrain.index()];
            chances[terrain.index()] = rng.gen_range(min..=max);
        }
        chances
    }

    pub fn dominant_terrain(&self, biome: usize) -> TerrainSymbol {
        self.dominant[biome]
    }
}

/// Terrains sorted by ascending base chance; equal chances keep terrain order.
pub fn fallback_order(chances: &BaseChances) -> [TerrainSymbol; TerrainSymbol::COUNT] {
    let mut order = TerrainSymbol::ALL;
    order.sort_by(|a, b| chances[a.index()].total_cmp(&chances[b.index()]));
    order
}

/// Fill the grid in row-major order.
///
/// For every cell: one roll, then each placed neighbour (up, down, left,
/// right) is tried with its own likeness draw; the first whose connect chance
/// reaches the roll and whose likeness reaches 1.0 is copied. Otherwise the
/// rarest terrain whose base chance reaches the roll is used.
pub fn fill_cells<R: Rng + ?Sized>(
    grid: &mut Tilemap<Option<TerrainSymbol>>,
    tables: &GenerationTables,
    chances: &BaseChances,
    rng: &mut R,
) {
    let order = fallback_order(chances);
    let affinity = tables.affinity();

    for y in 0..grid.height {
        for x in 0..grid.width {
            let neighbors: Vec<TerrainSymbol> = grid
                .neighbors(x, y)
                .filter_map(|(nx, ny)| *grid.get(nx, ny))
                .collect();
            let random_chance: f64 = rng.gen();

            let mut chosen = None;
            for &candidate in &neighbors {
                let likeness = affinity.likeness(candidate, &neighbors, rng);
                if affinity.connect_chance(candidate) >= random_chance && likeness >= 1.0 {
                    chosen = Some(candidate);
                    break;
                }
            }

            if chosen.is_none() {
                chosen = order
                    .iter()
                    .copied()
                    .find(|t| chances[t.index()] >= random_chance);
            }

            grid.set(x, y, chosen);
        }
    }
}

/// Replace every cell whose terrain none of its neighbours share with a
/// uniformly chosen neighbour terrain. Works in place, row-major, so later
/// cells see earlier replacements. Returns the number of replaced cells.
pub fn blend_pass<R: Rng + ?Sized>(grid: &mut Tilemap<Option<TerrainSymbol>>, rng: &mut R) -> usize {
    let mut replaced = 0;

    for y in 0..grid.height {
        for x in 0..grid.width {
            let neighbors: Vec<TerrainSymbol> = grid
                .neighbors(x, y)
                .filter_map(|(nx, ny)| *grid.get(nx, ny))
                .collect();

            if let Some(current) = *grid.get(x, y) {
                if neighbors.contains(&current) {
                    continue;
                }
            }

            if let Some(&pick) = neighbors.choose(rng) {
                grid.set(x, y, Some(pick));
                replaced += 1;
            }
        }
    }

    replaced
}

/// Generate one chunk. Pure function of its inputs.
pub fn generate_chunk(
    tables: &GenerationTables,
    layout: ChunkLayout,
    world_seed: WorldSeed,
    coord: ChunkCoord,
) -> Chunk {
    let mut rng = chunk_rng(world_seed, coord.x, coord.y);

    let biome = tables.biomes().select_biome(&mut rng);
    let chances = tables.roll_base_chances(biome, &mut rng);

    let mut grid: Tilemap<Option<TerrainSymbol>> = Tilemap::new(layout.chunk_width, layout.chunk_height);
    fill_cells(&mut grid, tables, &chances, &mut rng);
    let blended = blend_pass(&mut grid, &mut rng);

    let fallback = tables.dominant_terrain(biome);
    let tiles = grid.map(|cell| cell.unwrap_or(fallback));
    let biome_name = tables.biomes().get(biome).name.clone();

    debug!(
        "Generated chunk {} [{}], {} cells blended",
        coord, biome_name, blended
    );

    Chunk::new(coord, biome_name, tiles)
}

/// The procedural chunk source used by the world map.
#[derive(Clone, Debug)]
pub struct ChunkGenerator {
    tables: GenerationTables,
    layout: ChunkLayout,
    seed: WorldSeed,
}

impl ChunkGenerator {
    /// Validate the config's tables and layout once, up front.
    pub fn new(config: &WorldConfig, seed: WorldSeed) -> Result<Self, TableError> {
        config.validate()?;
        Ok(Self {
            tables: GenerationTables::new(&config.biomes, &config.affinity)?,
            layout: config.layout,
            seed,
        })
    }

    pub fn seed(&self) -> WorldSeed {
        self.seed
    }

    pub fn layout(&self) -> ChunkLayout {
        self.layout
    }

    pub fn tables(&self) -> &GenerationTables {
        &self.tables
    }
}

impl ChunkSource for ChunkGenerator {
    fn generate(&self, coord: ChunkCoord) -> Chunk {
        generate_chunk(&self.tables, self.layout, self.seed, coord)
    }
}
