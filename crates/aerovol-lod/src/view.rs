//! The view contract needed for level-of-detail selection: where the eye is
//! and how large one pixel is at a given distance.

use glam::DVec3;

/// Minimal view interface for screen-size estimation.
pub trait View {
    fn eye_point(&self) -> DVec3;

    /// Size in meters of one pixel at `distance` meters from the eye.
    fn pixel_size_at_distance(&self, distance: f64) -> f64;
}

/// A symmetric perspective view.
#[derive(Clone, Copy, Debug)]
pub struct PerspectiveView {
    pub eye: DVec3,
    /// Vertical field of view, radians.
    pub fov_y: f64,
    /// Viewport height in pixels.
    pub viewport_height: f64,
}

impl View for PerspectiveView {
    fn eye_point(&self) -> DVec3 {
        self.eye
    }

    fn pixel_size_at_distance(&self, distance: f64) -> f64 {
        let frustum_height = 2.0 * distance.max(0.0) * (self.fov_y * 0.5).tan();
        frustum_height / self.viewport_height
    }
}

/// Projected size in pixels of an object of `diameter` meters at
/// `eye_distance` meters. Infinite when the eye touches the object; callers
/// treat that as the finest level.
#[must_use]
pub fn projected_screen_size(diameter: f64, eye_distance: f64, view: &dyn View) -> f64 {
    let pixel_size = view.pixel_size_at_distance(eye_distance);
    if pixel_size <= 0.0 {
        return f64::INFINITY;
    }
    diameter / pixel_size
}
