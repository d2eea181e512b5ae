use glam::Vec2;
use monster_couch_core::ProjectionSource;

/// Orthographic camera looking straight down at the arena plane.
///
/// The visible area does not depend on depth, so the camera's height above the
/// plane only matters to the reference-depth calculation.
#[derive(Clone, Copy, Debug)]
pub(crate) struct OrthographicCamera {
    center: Vec2,
    half_height: f32,
    aspect: f32,
    depth: f32,
}

impl OrthographicCamera {
    /// Height of the camera above the origin plane.
    pub(crate) const DEFAULT_DEPTH: f32 = 10.0;

    pub(crate) fn new(half_height: f32, aspect: f32) -> Self {
        Self {
            center: Vec2::ZERO,
            half_height,
            aspect,
            depth: Self::DEFAULT_DEPTH,
        }
    }

    fn half_extent(&self) -> Vec2 {
        Vec2::new(self.half_height * self.aspect, self.half_height)
    }
}

impl ProjectionSource for OrthographicCamera {
    fn viewport_to_world(&self, viewport: Vec2, _depth: f32) -> Vec2 {
        self.center + (viewport * 2.0 - Vec2::ONE) * self.half_extent()
    }

    fn depth(&self) -> f32 {
        self.depth
    }
}
