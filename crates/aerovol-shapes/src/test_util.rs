//! Shared test fixtures: a constant-elevation globe, a fixed view and
//! frustum over the equator/prime-meridian point, a seeded geometry context,
//! and a renderer that records its draw calls.

use aerovol_cache::{
    ExpiryJitter, GeometryContext, MeshCache, StreamRole, Topology,
};
use aerovol_geo::Frustum;
use aerovol_globe::{ConstantElevation, Globe, GlobeStateToken, SphericalGlobe};
use aerovol_lod::View;
use glam::{DMat4, DVec3};

use crate::frame::FrameContext;
use crate::render::{DrawCall, Renderer, UniformTransform};

pub(crate) const EARTH_RADIUS: f64 = 6_371_000.0;

pub(crate) fn flat_globe() -> SphericalGlobe<ConstantElevation> {
    SphericalGlobe::new(EARTH_RADIUS, ConstantElevation(0.0), GlobeStateToken(0))
}

pub(crate) struct FixedView {
    pub eye: DVec3,
    pub pixel_size: f64,
}

impl View for FixedView {
    fn eye_point(&self) -> DVec3 {
        self.eye
    }

    fn pixel_size_at_distance(&self, _distance: f64) -> f64 {
        self.pixel_size
    }
}

/// Eye 100 km above the equator/prime-meridian point, looking straight down.
pub(crate) fn overhead_view() -> FixedView {
    FixedView {
        eye: DVec3::new(EARTH_RADIUS + 100_000.0, 0.0, 0.0),
        pixel_size: 1.0,
    }
}

pub(crate) fn overhead_frustum() -> Frustum {
    let eye = DVec3::new(EARTH_RADIUS + 100_000.0, 0.0, 0.0);
    let proj = DMat4::perspective_rh(std::f64::consts::FRAC_PI_2, 1.0, 1.0, 10_000_000.0);
    let view = DMat4::look_at_rh(eye, DVec3::new(EARTH_RADIUS, 0.0, 0.0), DVec3::Z);
    Frustum::from_view_projection(&(proj * view))
}

pub(crate) fn frame<'a>(
    globe: &'a dyn Globe,
    view: &'a dyn View,
    frustum: &'a Frustum,
) -> FrameContext<'a> {
    FrameContext {
        globe,
        view,
        frustum,
        vertical_exaggeration: 1.0,
    }
}

pub(crate) fn seeded_context() -> GeometryContext {
    GeometryContext::new(MeshCache::new(), ExpiryJitter::from_seed(7))
}

#[derive(Debug)]
pub(crate) struct RecordedCall {
    pub role: StreamRole,
    pub topology: Topology,
    pub index_count: usize,
    pub transform: Option<UniformTransform>,
}

#[derive(Default)]
pub(crate) struct RecordingRenderer {
    pub calls: Vec<RecordedCall>,
}

impl RecordingRenderer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn count_role(&self, role: StreamRole) -> usize {
        self.calls.iter().filter(|c| c.role == role).count()
    }
}

impl Renderer for RecordingRenderer {
    fn draw(&mut self, call: &DrawCall<'_>) {
        let stream = &call.buffer.streams()[call.stream];
        self.calls.push(RecordedCall {
            role: stream.role,
            topology: stream.topology,
            index_count: stream.indices.len(),
            transform: call.transform,
        });
    }
}
