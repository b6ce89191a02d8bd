//! The finished, immutable chunk.

use crate::terrain::TerrainSymbol;
use crate::tilemap::Tilemap;

use super::coords::ChunkCoord;

/// A generated block of terrain. Every cell holds exactly one symbol.
#[derive(Clone, Debug, PartialEq)]
pub struct Chunk {
    pub coord: ChunkCoord,
    /// Name of the biome this chunk was generated with
    pub biome: String,
    tiles: Tilemap<TerrainSymbol>,
}

impl Chunk {
    pub fn new(coord: ChunkCoord, biome: String, tiles: Tilemap<TerrainSymbol>) -> Self {
        Self { coord, biome, tiles }
    }

    /// Width in tiles
    pub fn width(&self) -> usize {
        self.tiles.width
    }

    /// Height in tiles
    pub fn height(&self) -> usize {
        self.tiles.height
    }

    /// Terrain at a column/row inside the chunk
    pub fn get(&self, col: usize, row: usize) -> TerrainSymbol {
        *self.tiles.get(col, row)
    }

    pub fn tiles(&self) -> &Tilemap<TerrainSymbol> {
        &self.tiles
    }

    /// Number of cells per terrain, indexed by [`TerrainSymbol::index`]
    pub fn terrain_counts(&self) -> [usize; TerrainSymbol::COUNT] {
        let mut counts = [0; TerrainSymbol::COUNT];
        for (_, _, terrain) in self.tiles.iter() {
            counts[terrain.index()] += 1;
        }
        counts
    }

    /// One row of ASCII characters per tile row
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width() + 1) * self.height());
        for row in 0..self.height() {
            for col in 0..self.width() {
                out.push(self.get(col, row).ascii_char());
            }
            out.push('\n');
        }
        out
    }
}
