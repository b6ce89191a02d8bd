//! Chunk coordinates and world-to-chunk conversions.
//!
//! World positions are in pixels. A chunk covers
//! `chunk_width * tile_size` by `chunk_height * tile_size` pixels and chunk
//! coordinates come from floor division, so negative positions land in
//! negative chunks.

use serde::{Deserialize, Serialize};

use crate::config::TableError;

/// Tiles per chunk row
pub const CHUNK_WIDTH: usize = 30;
/// Tile rows per chunk
pub const CHUNK_HEIGHT: usize = 20;
/// Tile edge length in pixels
pub const TILE_SIZE: f64 = 100.0;

/// Cache key for a chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
}

impl ChunkCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance in chunks
    pub fn distance(&self, other: &ChunkCoord) -> u32 {
        let dx = (self.x as i64 - other.x as i64).unsigned_abs();
        let dy = (self.y as i64 - other.y as i64).unsigned_abs();
        dx.max(dy) as u32
    }
}

impl std::fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Chunk dimensions and tile size. Shared by generation, queries and the
/// visible-region math so they always agree on chunk boundaries.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkLayout {
    pub chunk_width: usize,
    pub chunk_height: usize,
    pub tile_size: f64,
}

impl Default for ChunkLayout {
    fn default() -> Self {
        Self {
            chunk_width: CHUNK_WIDTH,
            chunk_height: CHUNK_HEIGHT,
            tile_size: TILE_SIZE,
        }
    }
}

impl ChunkLayout {
    pub fn new(chunk_width: usize, chunk_height: usize, tile_size: f64) -> Self {
        Self {
            chunk_width,
            chunk_height,
            tile_size,
        }
    }

    pub fn validate(&self) -> Result<(), TableError> {
        if self.chunk_width == 0 || self.chunk_height == 0 {
            return Err(TableError::InvalidLayout(format!(
                "chunk size {}x{} tiles",
                self.chunk_width, self.chunk_height
            )));
        }
        if !self.tile_size.is_finite() || self.tile_size <= 0.0 {
            return Err(TableError::InvalidLayout(format!("tile size {}", self.tile_size)));
        }
        Ok(())
    }

    /// Chunk width in pixels
    pub fn chunk_pixel_width(&self) -> f64 {
        self.chunk_width as f64 * self.tile_size
    }

    /// Chunk height in pixels
    pub fn chunk_pixel_height(&self) -> f64 {
        self.chunk_height as f64 * self.tile_size
    }

    /// Chunk containing a world position (floor division by chunk pixel size).
    pub fn chunk_coords_of(&self, world_x: f64, world_y: f64) -> ChunkCoord {
        ChunkCoord::new(
            (world_x / self.chunk_pixel_width()).floor() as i32,
            (world_y / self.chunk_pixel_height()).floor() as i32,
        )
    }

    /// Column and row of a world position inside its chunk.
    pub fn local_cell_of(&self, world_x: f64, world_y: f64) -> (usize, usize) {
        let col = (world_x.rem_euclid(self.chunk_pixel_width()) / self.tile_size).floor() as usize;
        let row = (world_y.rem_euclid(self.chunk_pixel_height()) / self.tile_size).floor() as usize;
        // rem_euclid can round up to the divisor for tiny negative inputs
        (col.min(self.chunk_width - 1), row.min(self.chunk_height - 1))
    }

    /// World position of a chunk's top-left corner
    pub fn chunk_origin(&self, coord: ChunkCoord) -> (f64, f64) {
        (
            coord.x as f64 * self.chunk_pixel_width(),
            coord.y as f64 * self.chunk_pixel_height(),
        )
    }

    /// World position of the top-left corner of a cell
    pub fn cell_origin(&self, coord: ChunkCoord, col: usize, row: usize) -> (f64, f64) {
        let (ox, oy) = self.chunk_origin(coord);
        (ox + col as f64 * self.tile_size, oy + row as f64 * self.tile_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_coords_floor_division() {
        let layout = ChunkLayout::default();
        assert_eq!(layout.chunk_pixel_width(), 3000.0);
        assert_eq!(layout.chunk_pixel_height(), 2000.0);

        assert_eq!(layout.chunk_coords_of(0.0, 0.0), ChunkCoord::new(0, 0));
        assert_eq!(layout.chunk_coords_of(2999.0, 1999.0), ChunkCoord::new(0, 0));
        assert_eq!(layout.chunk_coords_of(3000.0, 2000.0), ChunkCoord::new(1, 1));
        assert_eq!(layout.chunk_coords_of(-1.0, -0.5), ChunkCoord::new(-1, -1));
        assert_eq!(layout.chunk_coords_of(-3000.0, 0.0), ChunkCoord::new(-1, 0));
        assert_eq!(layout.chunk_coords_of(-3000.5, 0.0), ChunkCoord::new(-2, 0));
    }

    #[test]
    fn test_local_cell() {
        let layout = ChunkLayout::default();
        assert_eq!(layout.local_cell_of(0.0, 0.0), (0, 0));
        assert_eq!(layout.local_cell_of(150.0, 250.0), (1, 2));
        assert_eq!(layout.local_cell_of(3150.0, 2050.0), (1, 0));
        assert_eq!(layout.local_cell_of(2999.9, 1999.9), (29, 19));
        // Negative positions count back from the chunk's right/bottom edge
        assert_eq!(layout.local_cell_of(-1.0, -1.0), (29, 19));
        assert_eq!(layout.local_cell_of(-1e-13, 0.0), (29, 0));
    }

    #[test]
    fn test_cell_round_trip() {
        let layout = ChunkLayout::default();
        for &(x, y) in &[(0.0, 0.0), (12345.0, 6789.0), (-4321.0, 99.5), (999_999.0, 999_999.0)] {
            let coord = layout.chunk_coords_of(x, y);
            let (col, row) = layout.local_cell_of(x, y);
            let (cx, cy) = layout.cell_origin(coord, col, row);
            assert!(cx <= x && x < cx + layout.tile_size, "x {} not in cell at {}", x, cx);
            assert!(cy <= y && y < cy + layout.tile_size, "y {} not in cell at {}", y, cy);
        }
    }

    #[test]
    fn test_invalid_layout() {
        assert!(ChunkLayout::new(0, 20, 100.0).validate().is_err());
        assert!(ChunkLayout::new(30, 20, 0.0).validate().is_err());
        assert!(ChunkLayout::new(30, 20, f64::NAN).validate().is_err());
        assert!(ChunkLayout::default().validate().is_ok());
    }

    #[test]
    fn test_distance() {
        let a = ChunkCoord::new(0, 0);
        assert_eq!(a.distance(&ChunkCoord::new(3, -2)), 3);
        assert_eq!(a.distance(&ChunkCoord::new(-1, 4)), 4);
        assert_eq!(a.distance(&a), 0);
    }
}
