//! A sphere standing at a location. The mesh is a unit sphere shared by
//! every instance at the same resolution; the renderer positions and scales
//! it per draw, so the cache entry is globe-independent and never expires.

use aerovol_cache::{CacheKey, GeometryContext, Param, ShapeKind};
use aerovol_geo::{Aabb, Extent, LatLon};
use aerovol_lod::DetailParams;
use glam::DVec3;

use crate::airspace::{shift_location, Airspace};
use crate::base::AirspaceBase;
use crate::error::ParameterError;
use crate::frame::FrameContext;
use crate::geometry::sphere::unit_sphere_geometry;
use crate::render::{Renderer, UniformTransform};
use crate::shapes::{detail_ramp, draw_cached};

pub const DEFAULT_SUBDIVISIONS: u32 = 3;

const RAMP_SUBDIVISIONS: [u32; 5] = [0, 1, 2, 2, 3];

pub struct SphereAirspace {
    base: AirspaceBase,
    location: LatLon,
    radius: f64,
    subdivisions: u32,
}

impl SphereAirspace {
    #[must_use]
    pub fn new(location: LatLon, radius: f64) -> Self {
        let mut base = AirspaceBase::new();
        base.set_detail_levels(detail_ramp(|i| DetailParams {
            subdivisions: Some(RAMP_SUBDIVISIONS[i]),
            ..DetailParams::default()
        }));
        Self {
            base,
            location,
            radius,
            subdivisions: DEFAULT_SUBDIVISIONS,
        }
    }

    #[must_use]
    pub fn location(&self) -> LatLon {
        self.location
    }

    pub fn set_location(&mut self, location: LatLon) {
        self.location = location;
        self.base.invalidate();
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f64) -> Result<(), ParameterError> {
        if radius <= 0.0 {
            return Err(ParameterError::NotPositive {
                name: "radius",
                value: radius,
            });
        }
        self.radius = radius;
        self.base.invalidate();
        Ok(())
    }

    /// Sphere center in model coordinates. The lower altitude and datum
    /// place the center; the upper surface is ignored.
    fn center_point(&self, frame: &FrameContext) -> DVec3 {
        let (altitudes, conforming) = self
            .base
            .effective_altitudes(frame.globe, frame.vertical_exaggeration);
        let mut altitude = altitudes[0];
        if conforming[0] {
            altitude += frame.vertical_exaggeration * frame.globe.elevation(self.location);
        }
        frame.globe.point_from(self.location, altitude)
    }
}

impl Airspace for SphereAirspace {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Sphere
    }

    fn base(&self) -> &AirspaceBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AirspaceBase {
        &mut self.base
    }

    fn reference_location(&self) -> Option<LatLon> {
        Some(self.location)
    }

    fn compute_minimal_geometry(&mut self, frame: &FrameContext) -> Vec<DVec3> {
        let center = self.center_point(frame);
        let r = self.radius;
        vec![
            center + DVec3::X * r,
            center - DVec3::X * r,
            center + DVec3::Y * r,
            center - DVec3::Y * r,
            center + DVec3::Z * r,
            center - DVec3::Z * r,
        ]
    }

    fn compute_extent(&mut self, frame: &FrameContext) -> Option<Extent> {
        let center = self.center_point(frame);
        let half = DVec3::splat(self.radius);
        Some(Extent::Aabb(Aabb::new(center - half, center + half)))
    }

    fn render_geometry(
        &mut self,
        frame: &FrameContext,
        ctx: &mut GeometryContext,
        renderer: &mut dyn Renderer,
    ) {
        let mut subdivisions = self.subdivisions;
        if let Some(level) = self.detail_level(frame) {
            if let Some(s) = level.params.subdivisions {
                subdivisions = s;
            }
        }
        let attributes = self.base.active_attributes();
        let transform = Some(UniformTransform {
            translation: self.center_point(frame),
            scale: self.radius,
        });

        // Resolution-only key: no globe token, never expires.
        let params: Vec<Param> = vec![i64::from(subdivisions).into()];
        let key = CacheKey::new(self.kind(), "unit", None, params);
        draw_cached(
            ctx,
            renderer,
            key,
            [false, false],
            DVec3::ZERO,
            transform,
            attributes,
            || Ok(unit_sphere_geometry(subdivisions)),
        );
    }

    fn shift(&mut self, old_reference: LatLon, new_reference: LatLon) {
        self.location = shift_location(old_reference, new_reference, self.location);
    }
}

#[cfg(test)]
mod tests {
    use aerovol_cache::StreamRole;

    use super::*;
    use crate::test_util::{
        flat_globe, frame, overhead_frustum, overhead_view, seeded_context, RecordingRenderer,
        EARTH_RADIUS,
    };

    fn sphere() -> SphereAirspace {
        let mut shape = SphereAirspace::new(LatLon::from_degrees(0.0, 0.0), 5000.0);
        shape.base_mut().set_altitudes(1000.0, 1000.0);
        shape.base_mut().set_lod_enabled(false);
        shape
    }

    #[test]
    fn test_draw_carries_the_transform() {
        let globe = flat_globe();
        let view = overhead_view();
        let frustum = overhead_frustum();
        let f = frame(&globe, &view, &frustum);
        let mut ctx = seeded_context();
        let mut renderer = RecordingRenderer::new();
        let mut shape = sphere();
        shape.render_geometry(&f, &mut ctx, &mut renderer);
        assert_eq!(renderer.count_role(StreamRole::Fill), 1);
        let call = &renderer.calls[0];
        let transform = call.transform.unwrap();
        assert_eq!(transform.scale, 5000.0);
        assert!((transform.translation.length() - (EARTH_RADIUS + 1000.0)).abs() < 1e-6);
    }

    #[test]
    fn test_two_spheres_share_one_cache_entry() {
        let globe = flat_globe();
        let view = overhead_view();
        let frustum = overhead_frustum();
        let f = frame(&globe, &view, &frustum);
        let mut ctx = seeded_context();
        let mut renderer = RecordingRenderer::new();
        let mut a = sphere();
        let mut b = SphereAirspace::new(LatLon::from_degrees(20.0, 20.0), 999.0);
        b.base_mut().set_lod_enabled(false);
        a.render_geometry(&f, &mut ctx, &mut renderer);
        b.render_geometry(&f, &mut ctx, &mut renderer);
        assert_eq!(ctx.cache.len(), 1, "unit mesh shared across instances");
    }

    #[test]
    fn test_unit_mesh_never_expires() {
        let globe = flat_globe();
        let view = overhead_view();
        let frustum = overhead_frustum();
        let f = frame(&globe, &view, &frustum);
        let mut ctx = seeded_context();
        let mut renderer = RecordingRenderer::new();
        let mut shape = sphere();
        // Conforming surfaces normally produce jittered expiries; the shared
        // unit mesh must not.
        shape.base_mut().set_terrain_conforming(true, true);
        shape.render_geometry(&f, &mut ctx, &mut renderer);
        ctx.begin_frame(1_000_000);
        let params: Vec<Param> = vec![i64::from(DEFAULT_SUBDIVISIONS).into()];
        let key = CacheKey::new(ShapeKind::Sphere, "unit", None, params);
        assert!(ctx.cache.contains_valid(&key, ctx.now()));
    }
}
