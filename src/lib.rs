//! Chunk-based procedural terrain generation library
//!
//! Re-exports modules for use by the binary and tools.

pub mod affinity;
pub mod biomes;
pub mod camera;
pub mod chunk;
pub mod config;
pub mod explorer;
pub mod export;
pub mod seeds;
pub mod storage;
pub mod terrain;
pub mod tilemap;
pub mod viewport;
pub mod world;
