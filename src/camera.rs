//! Camera tracking a viewport over the world.

/// A position or offset in world pixels.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Viewport over the world. `offset` is the world position of the
/// viewport's top-left corner.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub offset: Vec2,
    pub w: f64,
    pub h: f64,
    pub world_w: f64,
    pub world_h: f64,
}

impl Camera {
    pub fn new(w: f64, h: f64, world_w: f64, world_h: f64) -> Self {
        Self {
            offset: Vec2::default(),
            w,
            h,
            world_w,
            world_h,
        }
    }

    /// Center the viewport on `target`, then clamp so it stays inside the world.
    pub fn follow(&mut self, target: Vec2) {
        let x = target.x - (self.w / 2.0).floor();
        let y = target.y - (self.h / 2.0).floor();
        self.offset.x = x.min(self.world_w - self.w).max(0.0);
        self.offset.y = y.min(self.world_h - self.h).max(0.0);
    }

    /// Update viewport size, e.g. after the window was resized.
    pub fn resize(&mut self, w: f64, h: f64) {
        self.w = w;
        self.h = h;
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        Vec2::new(screen.x + self.offset.x, screen.y + self.offset.y)
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        Vec2::new(world.x - self.offset.x, world.y - self.offset.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_clamps_low() {
        let mut camera = Camera::new(1200.0, 700.0, 100_000.0, 100_000.0);
        camera.follow(Vec2::new(50.0, 50.0));
        assert_eq!(camera.offset, Vec2::new(0.0, 0.0));
    }

    #[test]
    fn test_follow_clamps_high() {
        let mut camera = Camera::new(1200.0, 700.0, 100_000.0, 100_000.0);
        camera.follow(Vec2::new(99_990.0, 99_990.0));
        assert_eq!(camera.offset.x, 98_800.0);
        assert_eq!(camera.offset.y, 99_300.0);
    }

    #[test]
    fn test_follow_centers() {
        let mut camera = Camera::new(1200.0, 700.0, 100_000.0, 100_000.0);
        camera.follow(Vec2::new(5000.0, 4000.0));
        assert_eq!(camera.offset, Vec2::new(4400.0, 3650.0));
    }

    #[test]
    fn test_follow_always_within_bounds() {
        let mut camera = Camera::new(1201.0, 701.0, 100_000.0, 50_000.0);
        let mut x = -5000.0;
        while x < 110_000.0 {
            camera.follow(Vec2::new(x, x / 2.0));
            assert!(camera.offset.x >= 0.0 && camera.offset.x <= 100_000.0 - 1201.0);
            assert!(camera.offset.y >= 0.0 && camera.offset.y <= 50_000.0 - 701.0);
            x += 777.0;
        }
    }

    #[test]
    fn test_viewport_larger_than_world() {
        let mut camera = Camera::new(2000.0, 2000.0, 1000.0, 1000.0);
        camera.follow(Vec2::new(500.0, 500.0));
        assert_eq!(camera.offset, Vec2::new(0.0, 0.0));
    }

    #[test]
    fn test_resize_changes_clamp() {
        let mut camera = Camera::new(1200.0, 700.0, 10_000.0, 10_000.0);
        camera.resize(2000.0, 1000.0);
        camera.follow(Vec2::new(9_999.0, 9_999.0));
        assert_eq!(camera.offset, Vec2::new(8000.0, 9000.0));
    }

    #[test]
    fn test_screen_world_conversion() {
        let mut camera = Camera::new(1200.0, 700.0, 100_000.0, 100_000.0);
        camera.follow(Vec2::new(5000.0, 4000.0));
        let world = camera.screen_to_world(Vec2::new(10.0, 20.0));
        assert_eq!(world, Vec2::new(4410.0, 3670.0));
        assert_eq!(camera.world_to_screen(world), Vec2::new(10.0, 20.0));
    }
}
