//! World map: the chunk cache and point queries over it.
//!
//! Chunks are generated lazily on first access and kept by coordinate. The
//! map never regenerates a chunk it still holds. When a cache limit is set,
//! chunks far from the visible region can be evicted; since a chunk depends
//! only on the seed and its coordinate, an evicted chunk comes back identical.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};

use log::{debug, warn};
use rayon::prelude::*;

use crate::camera::{Camera, Vec2};
use crate::chunk::{Chunk, ChunkCoord, ChunkGenerator, ChunkLayout, ChunkSource};
use crate::config::{TableError, WorldConfig};
use crate::seeds::WorldSeed;
use crate::terrain::TerrainSymbol;
use crate::viewport::{visible_region, VisibleRegion};

/// Cache statistics for monitoring
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CacheStats {
    /// Lookups served by a resident chunk
    pub hits: usize,
    /// Lookups that had to generate
    pub misses: usize,
    /// Chunks generated ahead of use (queue or parallel prefetch)
    pub prefetched: usize,
    pub evictions: usize,
    /// Chunks currently resident
    pub resident: usize,
    /// Chunks waiting in the generation queue
    pub queued: usize,
}

impl CacheStats {
    /// Calculate hit rate (0.0 to 1.0)
    pub fn hit_rate(&self) -> f32 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f32 / total as f32
        }
    }

    /// Format as human-readable string
    pub fn summary(&self) -> String {
        format!(
            "Chunks: {} | Queued: {} | Hits: {} | Misses: {} | Rate: {:.1}% | Evicted: {}",
            self.resident,
            self.queued,
            self.hits,
            self.misses,
            self.hit_rate() * 100.0,
            self.evictions
        )
    }
}

struct CachedChunk {
    chunk: Chunk,
    /// Access clock value of the last lookup
    last_accessed: u64,
}

/// Chunk cache plus world-coordinate queries.
pub struct WorldMap<S = ChunkGenerator> {
    source: S,
    layout: ChunkLayout,
    world_width: f64,
    world_height: f64,
    chunks: HashMap<ChunkCoord, CachedChunk>,
    max_cached: Option<usize>,
    pending: VecDeque<ChunkCoord>,
    /// Monotonic access counter for LRU ordering
    clock: u64,
    stats: CacheStats,
}

impl WorldMap<ChunkGenerator> {
    /// Create a world with the procedural generator. Tables are validated here.
    pub fn new(config: &WorldConfig, seed: WorldSeed) -> Result<Self, TableError> {
        let generator = ChunkGenerator::new(config, seed)?;
        Ok(Self::with_source(generator, config))
    }

    pub fn seed(&self) -> WorldSeed {
        self.source.seed()
    }
}

impl<S: ChunkSource> WorldMap<S> {
    /// Create a world around any chunk source. The source must produce
    /// chunks of `config.layout` dimensions.
    pub fn with_source(source: S, config: &WorldConfig) -> Self {
        Self {
            source,
            layout: config.layout,
            world_width: config.world_width,
            world_height: config.world_height,
            chunks: HashMap::new(),
            max_cached: config.max_cached_chunks,
            pending: VecDeque::new(),
            clock: 0,
            stats: CacheStats::default(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn layout(&self) -> ChunkLayout {
        self.layout
    }

    /// World size in pixels
    pub fn bounds(&self) -> (f64, f64) {
        (self.world_width, self.world_height)
    }

    /// Camera sized to a viewport over this world
    pub fn camera(&self, viewport_width: f64, viewport_height: f64) -> Camera {
        Camera::new(viewport_width, viewport_height, self.world_width, self.world_height)
    }

    /// Chunk containing a world position.
    pub fn chunk_coords_of(&self, world_x: f64, world_y: f64) -> ChunkCoord {
        self.layout.chunk_coords_of(world_x, world_y)
    }

    /// Chunks the camera needs resident.
    pub fn visible_region(&self, camera: &Camera) -> VisibleRegion {
        visible_region(camera, &self.layout)
    }

    /// Part of a region that lies inside the world, or None if it lies
    /// entirely outside.
    pub fn clip_region(&self, region: &VisibleRegion) -> Option<VisibleRegion> {
        let last = self.layout.chunk_coords_of(self.world_width - 1.0, self.world_height - 1.0);
        let clipped = VisibleRegion::new(
            region.start_x.max(0),
            region.end_x.min(last.x),
            region.start_y.max(0),
            region.end_y.min(last.y),
        );
        (clipped.chunk_count() > 0).then_some(clipped)
    }

    /// Clamp a position into `[0, world_w) x [0, world_h)`.
    pub fn clamp_position(&self, world_x: f64, world_y: f64) -> (f64, f64) {
        let max_x = (self.world_width - 1.0).max(0.0);
        let max_y = (self.world_height - 1.0).max(0.0);
        (world_x.clamp(0.0, max_x), world_y.clamp(0.0, max_y))
    }

    pub fn is_resident(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    pub fn resident_count(&self) -> usize {
        self.chunks.len()
    }

    /// Resident chunk, without generating or touching its access time
    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord).map(|c| &c.chunk)
    }

    /// Get a chunk, generating it on first access. Idempotent.
    pub fn ensure_resident(&mut self, coord: ChunkCoord) -> &Chunk {
        self.clock += 1;
        let clock = self.clock;
        let source = &self.source;
        let stats = &mut self.stats;

        let cached = match self.chunks.entry(coord) {
            Entry::Occupied(entry) => {
                stats.hits += 1;
                entry.into_mut()
            }
            Entry::Vacant(entry) => {
                stats.misses += 1;
                entry.insert(CachedChunk {
                    chunk: source.generate(coord),
                    last_accessed: clock,
                })
            }
        };
        cached.last_accessed = clock;
        &cached.chunk
    }

    /// Terrain at a world position. Out-of-range positions are clamped onto
    /// the world's edge.
    pub fn tile_at(&mut self, world_x: f64, world_y: f64) -> TerrainSymbol {
        let (x, y) = self.clamp_position(world_x, world_y);
        let coord = self.layout.chunk_coords_of(x, y);
        let (col, row) = self.layout.local_cell_of(x, y);
        self.ensure_resident(coord).get(col, row)
    }

    /// Terrain at a world position if its chunk is resident. Never generates
    /// and returns None outside the world.
    pub fn peek_tile(&self, world_x: f64, world_y: f64) -> Option<TerrainSymbol> {
        if world_x < 0.0 || world_y < 0.0 || world_x >= self.world_width || world_y >= self.world_height {
            return None;
        }
        let coord = self.layout.chunk_coords_of(world_x, world_y);
        let (col, row) = self.layout.local_cell_of(world_x, world_y);
        self.chunk(coord).map(|chunk| chunk.get(col, row))
    }

    /// Make every chunk in a region resident. Returns how many were generated.
    pub fn ensure_region(&mut self, region: &VisibleRegion) -> usize {
        let before = self.stats.misses;
        for coord in region.coords() {
            self.ensure_resident(coord);
        }
        self.stats.misses - before
    }

    /// Queue a chunk for amortized generation. No-op if resident or queued.
    pub fn request(&mut self, coord: ChunkCoord) {
        if !self.chunks.contains_key(&coord) && !self.pending.contains(&coord) {
            self.pending.push_back(coord);
        }
    }

    /// Queue every non-resident chunk of a region.
    pub fn request_region(&mut self, region: &VisibleRegion) {
        for coord in region.coords() {
            self.request(coord);
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Generate at most `budget` queued chunks, oldest request first.
    /// Chunks that became resident meanwhile are dropped from the queue
    /// without counting against the budget.
    pub fn pump_pending(&mut self, budget: usize) -> usize {
        let mut generated = 0;
        while generated < budget {
            let Some(coord) = self.pending.pop_front() else {
                break;
            };
            if self.chunks.contains_key(&coord) {
                continue;
            }
            self.clock += 1;
            let chunk = self.source.generate(coord);
            self.chunks.insert(
                coord,
                CachedChunk {
                    chunk,
                    last_accessed: self.clock,
                },
            );
            generated += 1;
        }
        if generated > 0 {
            self.stats.prefetched += generated;
            debug!("Generated {} queued chunks, {} still queued", generated, self.pending.len());
        }
        generated
    }

    /// Evict chunks outside `region` while above the cache limit.
    ///
    /// Farthest chunks go first, least recently used first among equals.
    /// Chunks inside the region are never evicted, so the limit can be
    /// exceeded when the region alone is larger than it.
    pub fn retain_near(&mut self, region: &VisibleRegion) -> usize {
        let Some(max_cached) = self.max_cached else {
            return 0;
        };
        if self.chunks.len() <= max_cached {
            return 0;
        }

        let mut candidates: Vec<(ChunkCoord, u32, u64)> = self
            .chunks
            .iter()
            .map(|(coord, cached)| (*coord, region.distance_to(*coord), cached.last_accessed))
            .filter(|(_, distance, _)| *distance > 0)
            .collect();

        // Furthest first, then oldest access first
        candidates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.2.cmp(&b.2)));

        let mut evicted = 0;
        for (coord, _, _) in candidates {
            if self.chunks.len() <= max_cached {
                break;
            }
            self.chunks.remove(&coord);
            evicted += 1;
        }

        if evicted > 0 {
            self.stats.evictions += evicted;
            debug!("Evicted {} chunks, {} resident", evicted, self.chunks.len());
        }
        evicted
    }

    /// Nearest dry tile to a position, searching square rings of tiles out to
    /// `max_radius` tiles. Returns the center of that tile.
    pub fn find_spawn(&mut self, world_x: f64, world_y: f64, max_radius: u32) -> Option<Vec2> {
        let tile = self.layout.tile_size;
        let (x, y) = self.clamp_position(world_x, world_y);
        let center_x = (x / tile).floor() * tile + tile / 2.0;
        let center_y = (y / tile).floor() * tile + tile / 2.0;

        for radius in 0..=max_radius as i64 {
            for dy in -radius..=radius {
                for dx in -radius..=radius {
                    if dx.abs() != radius && dy.abs() != radius {
                        continue;
                    }
                    let px = center_x + dx as f64 * tile;
                    let py = center_y + dy as f64 * tile;
                    if px < 0.0 || py < 0.0 || px >= self.world_width || py >= self.world_height {
                        continue;
                    }
                    if !self.tile_at(px, py).is_liquid() {
                        return Some(Vec2::new(px, py));
                    }
                }
            }
        }

        warn!(
            "No dry tile within {} tiles of ({:.0}, {:.0})",
            max_radius, world_x, world_y
        );
        None
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            resident: self.chunks.len(),
            queued: self.pending.len(),
            ..self.stats
        }
    }

    /// Drop every chunk and queued request.
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.pending.clear();
    }
}

impl<S: ChunkSource + Sync> WorldMap<S> {
    /// Generate all missing chunks of a region in parallel, then insert them.
    /// Produces exactly what sequential generation would.
    pub fn prefetch_parallel(&mut self, region: &VisibleRegion) -> usize {
        let missing: Vec<ChunkCoord> = region.coords().filter(|c| !self.chunks.contains_key(c)).collect();
        if missing.is_empty() {
            return 0;
        }

        let source = &self.source;
        let generated: Vec<Chunk> = missing.par_iter().map(|&coord| source.generate(coord)).collect();

        let count = generated.len();
        for chunk in generated {
            self.clock += 1;
            self.pending.retain(|c| *c != chunk.coord);
            self.chunks.insert(
                chunk.coord,
                CachedChunk {
                    chunk,
                    last_accessed: self.clock,
                },
            );
        }
        self.stats.prefetched += count;
        debug!("Prefetched {} chunks in parallel", count);
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tilemap::Tilemap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Uniform chunks of one terrain; counts how often it is asked to generate
    struct CountingSource {
        calls: AtomicUsize,
        layout: ChunkLayout,
        terrain: TerrainSymbol,
    }

    impl CountingSource {
        fn new(terrain: TerrainSymbol) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                layout: ChunkLayout::default(),
                terrain,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ChunkSource for CountingSource {
        fn generate(&self, coord: ChunkCoord) -> Chunk {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let tiles = Tilemap::new_with(self.layout.chunk_width, self.layout.chunk_height, self.terrain);
            Chunk::new(coord, "stub".to_string(), tiles)
        }
    }

    fn small_config() -> WorldConfig {
        WorldConfig {
            world_width: 100_000.0,
            world_height: 100_000.0,
            ..WorldConfig::default()
        }
    }

    #[test]
    fn test_ensure_resident_generates_once() {
        let mut world = WorldMap::with_source(CountingSource::new(TerrainSymbol::Soil), &small_config());
        let coord = ChunkCoord::new(3, 4);

        world.ensure_resident(coord);
        world.ensure_resident(coord);
        assert_eq!(world.source().calls(), 1);
        assert_eq!(world.resident_count(), 1);

        let stats = world.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn test_tile_queries_share_one_generation() {
        let mut world = WorldMap::with_source(CountingSource::new(TerrainSymbol::Water), &small_config());
        for i in 0..20 {
            assert_eq!(world.tile_at(100.0 + i as f64 * 50.0, 100.0), TerrainSymbol::Water);
        }
        assert_eq!(world.source().calls(), 1);
    }

    #[test]
    fn test_tile_at_matches_chunk_indexing() {
        let mut world = WorldMap::new(&small_config(), 4242).unwrap();
        let layout = world.layout();

        for &(x, y) in &[(0.0, 0.0), (150.0, 250.0), (2999.0, 1999.0), (45_678.9, 12_345.6), (99_999.0, 99_999.0)] {
            let first = world.tile_at(x, y);
            assert_eq!(world.tile_at(x, y), first);

            let coord = world.chunk_coords_of(x, y);
            let (col, row) = layout.local_cell_of(x, y);
            assert_eq!(world.ensure_resident(coord).get(col, row), first);
        }
    }

    #[test]
    fn test_tile_at_matches_every_cell_of_a_chunk() {
        let mut world = WorldMap::new(&small_config(), 99).unwrap();
        let layout = world.layout();
        let coord = ChunkCoord::new(2, 3);
        let chunk = world.ensure_resident(coord).clone();

        for row in 0..chunk.height() {
            for col in 0..chunk.width() {
                let (x, y) = layout.cell_origin(coord, col, row);
                let center = (x + layout.tile_size / 2.0, y + layout.tile_size / 2.0);
                assert_eq!(world.tile_at(center.0, center.1), chunk.get(col, row));
            }
        }
    }

    #[test]
    fn test_out_of_range_clamped() {
        let mut world = WorldMap::new(&small_config(), 7).unwrap();
        assert_eq!(world.tile_at(-500.0, -10.0), world.tile_at(0.0, 0.0));
        assert_eq!(world.tile_at(250_000.0, 50.0), world.tile_at(99_999.0, 50.0));
        assert!(!world.is_resident(ChunkCoord::new(-1, -1)));
    }

    #[test]
    fn test_clip_region() {
        // 100_000 px wide: chunks 0..=33 across, 0..=49 down
        let world = WorldMap::with_source(CountingSource::new(TerrainSymbol::Soil), &small_config());
        assert_eq!(
            world.clip_region(&VisibleRegion::new(-3, 2, -1, 60)),
            Some(VisibleRegion::new(0, 2, 0, 49))
        );
        assert_eq!(
            world.clip_region(&VisibleRegion::new(30, 40, 0, 0)),
            Some(VisibleRegion::new(30, 33, 0, 0))
        );
        assert_eq!(world.clip_region(&VisibleRegion::new(-5, -1, 0, 3)), None);
    }

    #[test]
    fn test_peek_tile_never_generates() {
        let mut world = WorldMap::with_source(CountingSource::new(TerrainSymbol::DarkGrass), &small_config());
        assert_eq!(world.peek_tile(10.0, 10.0), None);
        assert_eq!(world.source().calls(), 0);

        world.ensure_resident(ChunkCoord::new(0, 0));
        assert_eq!(world.peek_tile(10.0, 10.0), Some(TerrainSymbol::DarkGrass));
        assert_eq!(world.peek_tile(-1.0, 10.0), None);
        assert_eq!(world.peek_tile(100_000.0, 10.0), None);
    }

    #[test]
    fn test_tiny_world_clamps_without_panicking() {
        let config = WorldConfig {
            layout: ChunkLayout::new(30, 20, 0.5),
            world_width: 0.75,
            world_height: 0.75,
            ..WorldConfig::default()
        };
        let mut world = WorldMap::with_source(CountingSource::new(TerrainSymbol::Soil), &config);
        assert_eq!(world.clamp_position(0.1, 5.0), (0.1, 0.0));
        assert_eq!(world.tile_at(0.1, 0.1), TerrainSymbol::Soil);
        assert_eq!(world.tile_at(-3.0, 9.0), TerrainSymbol::Soil);
    }

    #[test]
    fn test_ensure_region() {
        let mut world = WorldMap::with_source(CountingSource::new(TerrainSymbol::Soil), &small_config());
        let region = VisibleRegion::new(0, 1, 0, 1);
        assert_eq!(world.ensure_region(&region), 4);
        assert_eq!(world.ensure_region(&region), 0);
        assert_eq!(world.source().calls(), 4);
    }

    #[test]
    fn test_queue_respects_budget() {
        let mut world = WorldMap::with_source(CountingSource::new(TerrainSymbol::Soil), &small_config());
        let region = VisibleRegion::new(0, 2, 0, 2);
        world.ensure_resident(ChunkCoord::new(1, 1));
        world.request_region(&region);
        world.request_region(&region);
        assert_eq!(world.pending_count(), 8);

        assert_eq!(world.pump_pending(3), 3);
        assert_eq!(world.pending_count(), 5);
        assert_eq!(world.pump_pending(10), 5);
        assert_eq!(world.pending_count(), 0);
        assert_eq!(world.source().calls(), 9);
        assert_eq!(world.stats().prefetched, 8);
    }

    #[test]
    fn test_queued_generation_matches_eager() {
        let config = small_config();
        let mut queued = WorldMap::new(&config, 31337).unwrap();
        let mut eager = WorldMap::new(&config, 31337).unwrap();
        let coord = ChunkCoord::new(5, 6);

        queued.request(coord);
        queued.pump_pending(1);
        let from_queue = queued.chunk(coord).cloned();
        assert_eq!(from_queue.as_ref(), Some(eager.ensure_resident(coord)));
    }

    #[test]
    fn test_parallel_prefetch_matches_sequential() {
        let config = small_config();
        let mut parallel = WorldMap::new(&config, 2718).unwrap();
        let mut sequential = WorldMap::new(&config, 2718).unwrap();
        let region = VisibleRegion::new(-2, 2, -1, 1);

        assert_eq!(parallel.prefetch_parallel(&region), 15);
        assert_eq!(parallel.prefetch_parallel(&region), 0);
        for coord in region.coords() {
            let expected = sequential.ensure_resident(coord).clone();
            assert_eq!(parallel.chunk(coord), Some(&expected));
        }
    }

    #[test]
    fn test_no_eviction_without_limit() {
        let mut world = WorldMap::with_source(CountingSource::new(TerrainSymbol::Soil), &small_config());
        world.ensure_region(&VisibleRegion::new(0, 9, 0, 9));
        assert_eq!(world.retain_near(&VisibleRegion::new(0, 0, 0, 0)), 0);
        assert_eq!(world.resident_count(), 100);
    }

    #[test]
    fn test_eviction_keeps_region_and_nearest() {
        let config = WorldConfig {
            max_cached_chunks: Some(6),
            ..small_config()
        };
        let mut world = WorldMap::with_source(CountingSource::new(TerrainSymbol::Soil), &config);
        world.ensure_region(&VisibleRegion::new(0, 9, 0, 0));
        assert_eq!(world.resident_count(), 10);

        let region = VisibleRegion::new(0, 1, 0, 0);
        assert_eq!(world.retain_near(&region), 4);
        assert_eq!(world.resident_count(), 6);
        for x in 0..6 {
            assert!(world.is_resident(ChunkCoord::new(x, 0)), "chunk {} evicted", x);
        }
        assert_eq!(world.stats().evictions, 4);

        // Evicted chunks regenerate on demand
        world.ensure_resident(ChunkCoord::new(9, 0));
        assert_eq!(world.source().calls(), 11);
    }

    #[test]
    fn test_eviction_never_touches_region() {
        let config = WorldConfig {
            max_cached_chunks: Some(2),
            ..small_config()
        };
        let mut world = WorldMap::with_source(CountingSource::new(TerrainSymbol::Soil), &config);
        let region = VisibleRegion::new(0, 1, 0, 1);
        world.ensure_region(&region);
        world.ensure_resident(ChunkCoord::new(5, 5));
        world.retain_near(&region);
        assert_eq!(world.resident_count(), 4);
        assert!(region.coords().all(|c| world.is_resident(c)));
    }

    #[test]
    fn test_eviction_prefers_least_recent_on_ties() {
        let config = WorldConfig {
            max_cached_chunks: Some(2),
            ..small_config()
        };
        let mut world = WorldMap::with_source(CountingSource::new(TerrainSymbol::Soil), &config);
        world.ensure_resident(ChunkCoord::new(3, 0));
        world.ensure_resident(ChunkCoord::new(-3, 0));
        world.ensure_resident(ChunkCoord::new(0, 0));
        world.ensure_resident(ChunkCoord::new(3, 0));

        world.retain_near(&VisibleRegion::new(0, 0, 0, 0));
        assert!(world.is_resident(ChunkCoord::new(3, 0)));
        assert!(!world.is_resident(ChunkCoord::new(-3, 0)));
    }

    #[test]
    fn test_find_spawn_on_dry_land() {
        let mut world = WorldMap::with_source(CountingSource::new(TerrainSymbol::LightGrass), &small_config());
        let spawn = world.find_spawn(650.0, 1300.0, 10).unwrap();
        assert_eq!(spawn, Vec2::new(650.0, 1350.0));

        let mut world = WorldMap::new(&small_config(), 5).unwrap();
        let spawn = world.find_spawn(50_000.0, 50_000.0, 50).unwrap();
        assert!(!world.tile_at(spawn.x, spawn.y).is_liquid());
    }

    #[test]
    fn test_find_spawn_all_water() {
        let mut world = WorldMap::with_source(CountingSource::new(TerrainSymbol::Water), &small_config());
        assert_eq!(world.find_spawn(500.0, 500.0, 3), None);
    }

    #[test]
    fn test_clear() {
        let mut world = WorldMap::with_source(CountingSource::new(TerrainSymbol::Soil), &small_config());
        world.ensure_resident(ChunkCoord::new(0, 0));
        world.request(ChunkCoord::new(1, 0));
        world.clear();
        assert_eq!(world.resident_count(), 0);
        assert_eq!(world.pending_count(), 0);
    }
}
