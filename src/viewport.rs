//! Visible-region calculation: which chunks a camera can see.

use crate::camera::Camera;
use crate::chunk::{ChunkCoord, ChunkLayout};

/// Inclusive rectangle of chunk coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisibleRegion {
    pub start_x: i32,
    pub end_x: i32,
    pub start_y: i32,
    pub end_y: i32,
}

impl VisibleRegion {
    pub fn new(start_x: i32, end_x: i32, start_y: i32, end_y: i32) -> Self {
        Self {
            start_x,
            end_x,
            start_y,
            end_y,
        }
    }

    /// Region of chunks covering a pixel rectangle, with one extra chunk of
    /// overscan on the right and bottom edges.
    pub fn covering(layout: &ChunkLayout, x: f64, y: f64, w: f64, h: f64) -> Self {
        let cw = layout.chunk_pixel_width();
        let ch = layout.chunk_pixel_height();
        Self {
            start_x: (x / cw).floor() as i32,
            end_x: ((x + w) / cw).floor() as i32 + 1,
            start_y: (y / ch).floor() as i32,
            end_y: ((y + h) / ch).floor() as i32 + 1,
        }
    }

    /// Square region of `radius` chunks around a center chunk.
    pub fn around(center: ChunkCoord, radius: i32) -> Self {
        Self::new(
            center.x - radius,
            center.x + radius,
            center.y - radius,
            center.y + radius,
        )
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        (self.start_x..=self.end_x).contains(&coord.x) && (self.start_y..=self.end_y).contains(&coord.y)
    }

    pub fn width(&self) -> usize {
        (self.end_x - self.start_x + 1).max(0) as usize
    }

    pub fn height(&self) -> usize {
        (self.end_y - self.start_y + 1).max(0) as usize
    }

    pub fn chunk_count(&self) -> usize {
        self.width() * self.height()
    }

    /// All coordinates, row by row.
    pub fn coords(&self) -> impl Iterator<Item = ChunkCoord> {
        let (sx, ex) = (self.start_x, self.end_x);
        (self.start_y..=self.end_y).flat_map(move |y| (sx..=ex).map(move |x| ChunkCoord::new(x, y)))
    }

    /// The region grown by `margin` chunks on every side.
    pub fn expanded(&self, margin: i32) -> Self {
        Self::new(
            self.start_x - margin,
            self.end_x + margin,
            self.start_y - margin,
            self.end_y + margin,
        )
    }

    /// Chebyshev distance in chunks from the region; 0 inside it.
    pub fn distance_to(&self, coord: ChunkCoord) -> u32 {
        let dx = axis_gap(coord.x, self.start_x, self.end_x);
        let dy = axis_gap(coord.y, self.start_y, self.end_y);
        dx.max(dy)
    }
}

fn axis_gap(v: i32, start: i32, end: i32) -> u32 {
    if v < start {
        (start as i64 - v as i64) as u32
    } else if v > end {
        (v as i64 - end as i64) as u32
    } else {
        0
    }
}

/// Chunks that must be resident to draw the camera's viewport.
pub fn visible_region(camera: &Camera, layout: &ChunkLayout) -> VisibleRegion {
    VisibleRegion::covering(layout, camera.offset.x, camera.offset.y, camera.w, camera.h)
}
