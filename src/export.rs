//! PNG export of a block of chunks.

use std::error::Error;
use std::path::Path;

use image::{ImageBuffer, Rgb, RgbImage};
use log::info;

use crate::chunk::{Chunk, ChunkSource};
use crate::viewport::VisibleRegion;
use crate::world::WorldMap;

/// Largest image side we are willing to allocate
const MAX_IMAGE_SIDE: u64 = 16_384;

/// Paint one chunk into an image, `scale` x `scale` pixels per tile.
fn paint_chunk(img: &mut RgbImage, chunk: &Chunk, origin_x: u32, origin_y: u32, scale: u32) {
    for row in 0..chunk.height() {
        for col in 0..chunk.width() {
            let (r, g, b) = chunk.get(col, row).color();
            let px = origin_x + col as u32 * scale;
            let py = origin_y + row as u32 * scale;
            for dy in 0..scale {
                for dx in 0..scale {
                    img.put_pixel(px + dx, py + dy, Rgb([r, g, b]));
                }
            }
        }
    }
}

/// Render a region of the world to an image. Missing chunks are generated
/// in parallel first. Parts of the region outside the world are skipped.
pub fn render_region_image<S: ChunkSource + Sync>(
    world: &mut WorldMap<S>,
    region: &VisibleRegion,
    scale: u32,
) -> Result<RgbImage, Box<dyn Error>> {
    if scale == 0 {
        return Err("export scale must be at least 1".into());
    }
    let region = world
        .clip_region(region)
        .ok_or("export region lies outside the world")?;

    let layout = world.layout();
    let chunk_px_w = layout.chunk_width as u64 * scale as u64;
    let chunk_px_h = layout.chunk_height as u64 * scale as u64;
    let width = region.width() as u64 * chunk_px_w;
    let height = region.height() as u64 * chunk_px_h;
    if width > MAX_IMAGE_SIDE || height > MAX_IMAGE_SIDE {
        return Err(format!("export image would be {}x{} pixels; use a smaller radius or scale", width, height).into());
    }

    world.prefetch_parallel(&region);

    let mut img: RgbImage = ImageBuffer::new(width as u32, height as u32);
    for coord in region.coords() {
        let origin_x = ((coord.x - region.start_x) as u64 * chunk_px_w) as u32;
        let origin_y = ((coord.y - region.start_y) as u64 * chunk_px_h) as u32;
        let chunk = world.ensure_resident(coord);
        paint_chunk(&mut img, chunk, origin_x, origin_y, scale);
    }

    Ok(img)
}

/// Export a region of the world as a PNG image
pub fn export_region_image<S: ChunkSource + Sync, P: AsRef<Path>>(
    world: &mut WorldMap<S>,
    region: &VisibleRegion,
    scale: u32,
    path: P,
) -> Result<(), Box<dyn Error>> {
    let img = render_region_image(world, region, scale)?;
    img.save(path.as_ref())?;
    info!(
        "Exported {}x{} image of chunks x {}..={}, y {}..={} to {}",
        img.width(),
        img.height(),
        region.start_x,
        region.end_x,
        region.start_y,
        region.end_y,
        path.as_ref().display()
    );
    Ok(())
}
