//! Chunks: the unit of lazy generation and caching.
//!
//! # Example
//!
//! ```ignore
//! use chunkworld::chunk::{ChunkCoord, ChunkGenerator, ChunkSource};
//! use chunkworld::config::WorldConfig;
//!
//! let generator = ChunkGenerator::new(&WorldConfig::default(), 42)?;
//! let chunk = generator.generate(ChunkCoord::new(0, 0));
//! println!("{}", chunk.to_ascii());
//! ```

mod coords;
mod generator;
mod types;

pub use coords::{ChunkCoord, ChunkLayout, CHUNK_HEIGHT, CHUNK_WIDTH, TILE_SIZE};
pub use generator::{
    blend_pass, fallback_order, fill_cells, generate_chunk, BaseChances, ChunkGenerator,
    ChunkSource, GenerationTables,
};
pub use types::Chunk;
