use std::error::Error;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::{error, info, warn};

use chunkworld::camera::Vec2;
use chunkworld::config::WorldConfig;
use chunkworld::explorer::run_explorer;
use chunkworld::export::export_region_image;
use chunkworld::seeds::resolve_seed;
use chunkworld::storage::{WorldDataStore, DEFAULT_WORLD_DATA_FILE};
use chunkworld::viewport::VisibleRegion;
use chunkworld::world::WorldMap;

/// Where the player is dropped when no position is given
const DEFAULT_START: (f64, f64) = (650.0, 1300.0);
/// How far (in tiles) to look for dry land around the start position
const SPAWN_SEARCH_RADIUS: u32 = 200;

#[derive(Parser, Debug)]
#[command(name = "chunkworld")]
#[command(about = "Explore an endless chunk-generated terrain world")]
struct Args {
    /// World seed (reuses the saved seed, or picks a random one, if not specified)
    #[arg(short, long)]
    seed: Option<u32>,

    /// JSON world configuration (biome and affinity tables, sizes)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// File the world seed is saved to and restored from
    #[arg(long, default_value = DEFAULT_WORLD_DATA_FILE)]
    world_data: PathBuf,

    /// Keep at most this many chunks in memory (default: never evict)
    #[arg(long)]
    max_chunks: Option<usize>,

    /// Export the area around the start position to a PNG instead of exploring
    #[arg(long)]
    export: Option<String>,

    /// Radius in chunks for export
    #[arg(long, default_value = "2")]
    export_radius: i32,

    /// Pixels per tile for export
    #[arg(long, default_value = "4")]
    export_scale: u32,

    /// Start X position in world pixels
    #[arg(long)]
    x: Option<f64>,

    /// Start Y position in world pixels
    #[arg(long)]
    y: Option<f64>,
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading world configuration from {}", path.display());
            WorldConfig::load(path)?
        }
        None => WorldConfig::default(),
    };
    if args.max_chunks.is_some() {
        config.max_cached_chunks = args.max_chunks;
    }

    let store = WorldDataStore::new(&args.world_data);
    let stored = match args.seed {
        Some(_) => None,
        None => store.load_seed()?,
    };
    let seed = resolve_seed(args.seed.or(stored));
    info!("World seed: {}", seed);
    if stored != Some(seed) {
        store.save_seed(seed)?;
    }

    let mut world = WorldMap::new(&config, seed)?;

    let start_x = args.x.unwrap_or(DEFAULT_START.0);
    let start_y = args.y.unwrap_or(DEFAULT_START.1);
    let start = match world.find_spawn(start_x, start_y, SPAWN_SEARCH_RADIUS) {
        Some(spawn) => spawn,
        None => {
            warn!("Starting in water at ({:.0}, {:.0})", start_x, start_y);
            let (x, y) = world.clamp_position(start_x, start_y);
            Vec2::new(x, y)
        }
    };

    if let Some(filename) = &args.export {
        let center = world.chunk_coords_of(start.x, start.y);
        let region = VisibleRegion::around(center, args.export_radius.max(0));
        export_region_image(&mut world, &region, args.export_scale, filename)?;
        info!("{}", world.stats().summary());
        return Ok(());
    }

    info!("Launching terminal explorer at ({:.0}, {:.0})", start.x, start.y);
    run_explorer(world, &config, start)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        error!("{}", e);
        process::exit(1);
    }
}
