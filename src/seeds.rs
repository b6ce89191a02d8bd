//! Seed management for chunk generation
//!
//! A world has one 32-bit seed. Every chunk derives its own RNG stream from
//! that seed and its chunk coordinates, so chunks can be generated in any
//! order (or in parallel) and always come out the same.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// World seed. Drawn from the full 32-bit range when not supplied.
pub type WorldSeed = u32;

/// RNG stream used for everything seeded in the generator.
pub type RngStream = ChaCha8Rng;

/// Salt separating chunk streams from the world stream.
const CHUNK_SALT: u64 = 0x7E61_0741_C4A7_D00D;

/// Pick the world seed: the supplied one, or a fresh uniform draw over `[0, 2^32 - 1]`.
///
/// An unseeded run cannot be reproduced unless the returned value is stored,
/// so callers should log or persist it.
pub fn resolve_seed(chosen: Option<WorldSeed>) -> WorldSeed {
    chosen.unwrap_or_else(|| rand::random())
}

/// RNG stream for world-level decisions made outside any chunk.
///
/// Returns the seed actually used alongside the stream. Chunk content never
/// draws from this stream; it comes from [`chunk_rng`] only, so consuming the
/// world stream cannot change terrain.
pub fn world_rng(chosen: Option<WorldSeed>) -> (WorldSeed, RngStream) {
    let seed = resolve_seed(chosen);
    (seed, ChaCha8Rng::seed_from_u64(seed as u64))
}

/// Mix the world seed and a chunk coordinate into a 64-bit stream seed.
///
/// splitmix64-style finalisation after each input, so neighbouring chunks get
/// unrelated streams.
pub fn chunk_seed(world_seed: WorldSeed, chunk_x: i32, chunk_y: i32) -> u64 {
    let mut hash = (world_seed as u64) ^ CHUNK_SALT;

    hash = hash.wrapping_add(chunk_x as i64 as u64);
    hash ^= hash >> 30;
    hash = hash.wrapping_mul(0xbf58476d1ce4e5b9);

    hash = hash.wrapping_add(chunk_y as i64 as u64);
    hash ^= hash >> 27;
    hash = hash.wrapping_mul(0x94d049bb133111eb);

    hash ^= hash >> 31;
    hash = hash.wrapping_mul(0xbf58476d1ce4e5b9);
    hash ^= hash >> 33;

    hash
}

/// Independent RNG stream for one chunk.
pub fn chunk_rng(world_seed: WorldSeed, chunk_x: i32, chunk_y: i32) -> RngStream {
    ChaCha8Rng::seed_from_u64(chunk_seed(world_seed, chunk_x, chunk_y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_explicit_seed_is_kept() {
        let (seed, _) = world_rng(Some(12345));
        assert_eq!(seed, 12345);

        // Zero is a valid seed, not "absent"
        assert_eq!(resolve_seed(Some(0)), 0);
    }

    #[test]
    fn test_world_rng_reproducible() {
        let (_, mut a) = world_rng(Some(777));
        let (_, mut b) = world_rng(Some(777));
        let xs: Vec<u64> = (0..8).map(|_| a.gen()).collect();
        let ys: Vec<u64> = (0..8).map(|_| b.gen()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_world_stream_separate_from_chunks() {
        let (seed, mut world) = world_rng(Some(99));
        let before: Vec<u64> = {
            let mut rng = chunk_rng(seed, 0, 0);
            (0..4).map(|_| rng.gen()).collect()
        };
        let _: Vec<u64> = (0..100).map(|_| world.gen()).collect();
        let mut rng = chunk_rng(seed, 0, 0);
        let after: Vec<u64> = (0..4).map(|_| rng.gen()).collect();
        assert_eq!(before, after);

        let mut fresh = ChaCha8Rng::seed_from_u64(seed as u64);
        assert_ne!(fresh.gen::<u64>(), chunk_rng(seed, 0, 0).gen::<u64>());
    }

    #[test]
    fn test_chunk_rng_deterministic() {
        let mut a = chunk_rng(42, -3, 17);
        let mut b = chunk_rng(42, -3, 17);
        for _ in 0..16 {
            assert_eq!(a.gen::<f64>(), b.gen::<f64>());
        }
    }

    #[test]
    fn test_chunk_seeds_differ() {
        let base = chunk_seed(42, 0, 0);
        assert_ne!(base, chunk_seed(42, 1, 0));
        assert_ne!(base, chunk_seed(42, 0, 1));
        assert_ne!(base, chunk_seed(43, 0, 0));
        // Swapped axes must not collide
        assert_ne!(chunk_seed(42, 1, 2), chunk_seed(42, 2, 1));
        assert_ne!(chunk_seed(42, -1, 0), chunk_seed(42, 0, -1));
    }
}
