//! A vertical cylinder (or annulus, with an inner radius) capped at both
//! altitude surfaces.

use aerovol_cache::{CacheKey, GeometryContext, Param, ShapeKind};
use aerovol_geo::{Angle, Extent, LatLon};
use aerovol_globe::ElevationSampleCache;
use aerovol_lod::DetailParams;
use glam::DVec3;
use std::f64::consts::TAU;

use crate::airspace::{shift_location, Airspace};
use crate::base::{extreme_points, AirspaceBase};
use crate::error::ParameterError;
use crate::frame::FrameContext;
use crate::geometry::cylinder::{disk_geometry, wall_geometry, DiskProfile, WallProfile};
use crate::geometry::Orientation;
use crate::render::Renderer;
use crate::shapes::{cylinder_fit, detail_ramp, draw_cached};

pub const DEFAULT_SLICES: u32 = 32;
pub const DEFAULT_STACKS: u32 = 1;
pub const DEFAULT_LOOPS: u32 = 8;

const MINIMAL_SLICES: u32 = 8;
const MINIMAL_LOOPS: u32 = 4;

/// Coarsest-first ramps; the coarsest level also drops terrain conformance.
const RAMP_SLICES: [u32; 5] = [8, 14, 20, 26, 32];
const RAMP_LOOPS: [u32; 5] = [1, 2, 4, 6, 8];

pub struct CappedCylinder {
    base: AirspaceBase,
    center: LatLon,
    inner_radius: f64,
    outer_radius: f64,
    slices: u32,
    stacks: u32,
    loops: u32,
}

impl CappedCylinder {
    #[must_use]
    pub fn new(center: LatLon, outer_radius: f64) -> Self {
        let mut base = AirspaceBase::new();
        base.set_detail_levels(detail_ramp(|i| DetailParams {
            slices: Some(RAMP_SLICES[i]),
            stacks: Some(DEFAULT_STACKS),
            loops: Some(RAMP_LOOPS[i]),
            disable_terrain_conformance: i == 0,
            ..DetailParams::default()
        }));
        Self {
            base,
            center,
            inner_radius: 0.0,
            outer_radius,
            slices: DEFAULT_SLICES,
            stacks: DEFAULT_STACKS,
            loops: DEFAULT_LOOPS,
        }
    }

    #[must_use]
    pub fn center(&self) -> LatLon {
        self.center
    }

    pub fn set_center(&mut self, center: LatLon) {
        self.center = center;
        self.base.invalidate();
    }

    #[must_use]
    pub fn radii(&self) -> (f64, f64) {
        (self.inner_radius, self.outer_radius)
    }

    pub fn set_radii(&mut self, inner: f64, outer: f64) -> Result<(), ParameterError> {
        if inner < 0.0 {
            return Err(ParameterError::Negative {
                name: "inner radius",
                value: inner,
            });
        }
        if outer <= 0.0 {
            return Err(ParameterError::NotPositive {
                name: "outer radius",
                value: outer,
            });
        }
        if inner > outer {
            return Err(ParameterError::RadiusOrder { inner, outer });
        }
        self.inner_radius = inner;
        self.outer_radius = outer;
        self.base.invalidate();
        Ok(())
    }

    pub fn set_slices(&mut self, slices: u32) -> Result<(), ParameterError> {
        if slices == 0 {
            return Err(ParameterError::NotPositive {
                name: "slices",
                value: 0.0,
            });
        }
        self.slices = slices;
        Ok(())
    }

    pub fn set_stacks(&mut self, stacks: u32) -> Result<(), ParameterError> {
        if stacks == 0 {
            return Err(ParameterError::NotPositive {
                name: "stacks",
                value: 0.0,
            });
        }
        self.stacks = stacks;
        Ok(())
    }

    pub fn set_loops(&mut self, loops: u32) -> Result<(), ParameterError> {
        if loops == 0 {
            return Err(ParameterError::NotPositive {
                name: "loops",
                value: 0.0,
            });
        }
        self.loops = loops;
        Ok(())
    }

    /// Coarse disk of sample locations under the cylinder's footprint.
    fn minimal_locations(&self, globe_radius: f64) -> Vec<LatLon> {
        let mut locations = Vec::with_capacity((MINIMAL_SLICES * MINIMAL_LOOPS + 1) as usize);
        locations.push(self.center);
        for ring in 1..=MINIMAL_LOOPS {
            let radius = self.outer_radius * f64::from(ring) / f64::from(MINIMAL_LOOPS);
            for slice in 0..MINIMAL_SLICES {
                let azimuth =
                    Angle::from_radians(TAU * f64::from(slice) / f64::from(MINIMAL_SLICES));
                locations.push(
                    self.center
                        .great_circle_endpoint(azimuth, radius / globe_radius),
                );
            }
        }
        locations
    }
}

impl Airspace for CappedCylinder {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Cylinder
    }

    fn base(&self) -> &AirspaceBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AirspaceBase {
        &mut self.base
    }

    fn reference_location(&self) -> Option<LatLon> {
        Some(self.center)
    }

    fn compute_minimal_geometry(&mut self, frame: &FrameContext) -> Vec<DVec3> {
        let (altitudes, conforming) = self
            .base
            .effective_altitudes(frame.globe, frame.vertical_exaggeration);
        extreme_points(
            frame.globe,
            frame.vertical_exaggeration,
            &self.minimal_locations(frame.globe.equatorial_radius()),
            altitudes,
            conforming,
        )
    }

    /// Rotational shapes fit a bounding cylinder around the local up axis;
    /// the box fallback covers degenerate footprints.
    fn compute_extent(&mut self, frame: &FrameContext) -> Option<Extent> {
        let points = self.compute_minimal_geometry(frame);
        cylinder_fit(frame.globe.surface_normal(self.center), &points)
    }

    fn render_geometry(
        &mut self,
        frame: &FrameContext,
        ctx: &mut GeometryContext,
        renderer: &mut dyn Renderer,
    ) {
        let (mut slices, mut stacks, mut loops) = (self.slices, self.stacks, self.loops);
        let mut drop_conformance = false;
        if let Some(level) = self.detail_level(frame) {
            slices = level.params.slices.unwrap_or(slices);
            stacks = level.params.stacks.unwrap_or(stacks);
            loops = level.params.loops.unwrap_or(loops);
            drop_conformance = level.params.disable_terrain_conformance;
        }

        let ve = frame.vertical_exaggeration;
        let (altitudes, mut conforming) = self.base.effective_altitudes(frame.globe, ve);
        if drop_conformance {
            conforming = [false, false];
        }
        let collapsed = altitudes[0] == altitudes[1] && conforming[0] == conforming[1];
        let token = frame.token();
        let reference_center = frame.globe.point_from(self.center, 0.0);
        let attributes = self.base.active_attributes();
        let mut sampler = ElevationSampleCache::new(frame.globe);

        let params: Vec<Param> = vec![
            self.center.into(),
            self.inner_radius.into(),
            self.outer_radius.into(),
            altitudes[0].into(),
            altitudes[1].into(),
            conforming[0].into(),
            conforming[1].into(),
            ve.into(),
            i64::from(slices).into(),
            i64::from(stacks).into(),
            i64::from(loops).into(),
            collapsed.into(),
        ];
        let key = |label: &'static str| CacheKey::new(self.kind(), label, Some(token), params.clone());

        if !collapsed {
            draw_cached(
                ctx,
                renderer,
                key("wall.outer"),
                conforming,
                reference_center,
                None,
                attributes,
                || {
                    wall_geometry(
                        &mut sampler,
                        ve,
                        reference_center,
                        &WallProfile {
                            center: self.center,
                            radius: self.outer_radius,
                            altitudes,
                            terrain_conforming: conforming,
                            slices,
                            stacks,
                            span: None,
                            orientation: Orientation::Outward,
                        },
                    )
                },
            );
            if self.inner_radius > 0.0 {
                draw_cached(
                    ctx,
                    renderer,
                    key("wall.inner"),
                    conforming,
                    reference_center,
                    None,
                    attributes,
                    || {
                        wall_geometry(
                            &mut sampler,
                            ve,
                            reference_center,
                            &WallProfile {
                                center: self.center,
                                radius: self.inner_radius,
                                altitudes,
                                terrain_conforming: conforming,
                                slices,
                                stacks,
                                span: None,
                                orientation: Orientation::Inward,
                            },
                        )
                    },
                );
            }
        }

        if self.outer_radius > self.inner_radius {
            draw_cached(
                ctx,
                renderer,
                key("cap.top"),
                conforming,
                reference_center,
                None,
                attributes,
                || {
                    disk_geometry(
                        &mut sampler,
                        ve,
                        reference_center,
                        &DiskProfile {
                            center: self.center,
                            inner_radius: self.inner_radius,
                            outer_radius: self.outer_radius,
                            altitude: altitudes[1],
                            terrain_conforming: conforming[1],
                            slices,
                            loops,
                            span: None,
                            orientation: Orientation::Outward,
                        },
                    )
                },
            );
            if !collapsed {
                draw_cached(
                    ctx,
                    renderer,
                    key("cap.bottom"),
                    conforming,
                    reference_center,
                    None,
                    attributes,
                    || {
                        disk_geometry(
                            &mut sampler,
                            ve,
                            reference_center,
                            &DiskProfile {
                                center: self.center,
                                inner_radius: self.inner_radius,
                                outer_radius: self.outer_radius,
                                altitude: altitudes[0],
                                terrain_conforming: conforming[0],
                                slices,
                                loops,
                                span: None,
                                orientation: Orientation::Inward,
                            },
                        )
                    },
                );
            }
        }
    }

    fn shift(&mut self, old_reference: LatLon, new_reference: LatLon) {
        self.center = shift_location(old_reference, new_reference, self.center);
    }
}

#[cfg(test)]
mod tests {
    use aerovol_cache::StreamRole;

    use super::*;
    use crate::test_util::{
        flat_globe, frame, overhead_frustum, overhead_view, seeded_context, RecordingRenderer,
    };

    fn cylinder() -> CappedCylinder {
        let mut shape = CappedCylinder::new(LatLon::from_degrees(0.0, 0.0), 10_000.0);
        shape.base_mut().set_altitudes(100.0, 3000.0);
        shape.base_mut().set_lod_enabled(false);
        shape
    }

    #[test]
    fn test_radius_validation() {
        let mut shape = cylinder();
        assert!(shape.set_radii(-1.0, 10.0).is_err());
        assert!(shape.set_radii(0.0, 0.0).is_err());
        assert_eq!(
            shape.set_radii(200.0, 100.0),
            Err(ParameterError::RadiusOrder {
                inner: 200.0,
                outer: 100.0
            })
        );
        assert!(shape.set_radii(100.0, 200.0).is_ok());
        assert_eq!(shape.radii(), (100.0, 200.0));
    }

    #[test]
    fn test_extent_is_a_cylinder_fit() {
        let globe = flat_globe();
        let view = overhead_view();
        let frustum = overhead_frustum();
        let f = frame(&globe, &view, &frustum);
        let mut shape = cylinder();
        match shape.extent(&f) {
            Some(Extent::Cylinder(c)) => {
                assert!(c.radius >= 10_000.0 * 0.99, "radius {}", c.radius);
                assert!(c.height() >= 2900.0 * 0.99, "height {}", c.height());
            }
            other => panic!("expected a cylinder extent, got {other:?}"),
        }
    }

    #[test]
    fn test_render_draws_wall_and_both_caps() {
        let globe = flat_globe();
        let view = overhead_view();
        let frustum = overhead_frustum();
        let f = frame(&globe, &view, &frustum);
        let mut ctx = seeded_context();
        let mut renderer = RecordingRenderer::new();
        let mut shape = cylinder();
        shape.render_geometry(&f, &mut ctx, &mut renderer);
        // Wall, top cap, bottom cap, each with a fill stream; outline is off
        // by default.
        assert_eq!(renderer.count_role(StreamRole::Fill), 3);
        assert_eq!(renderer.count_role(StreamRole::Outline), 0);
        assert_eq!(ctx.cache.len(), 3);
    }

    #[test]
    fn test_annulus_adds_inner_wall() {
        let globe = flat_globe();
        let view = overhead_view();
        let frustum = overhead_frustum();
        let f = frame(&globe, &view, &frustum);
        let mut ctx = seeded_context();
        let mut renderer = RecordingRenderer::new();
        let mut shape = cylinder();
        shape.set_radii(2000.0, 10_000.0).unwrap();
        shape.render_geometry(&f, &mut ctx, &mut renderer);
        assert_eq!(renderer.count_role(StreamRole::Fill), 4);
    }

    #[test]
    fn test_collapsed_cylinder_draws_top_cap_only() {
        let globe = flat_globe();
        let view = overhead_view();
        let frustum = overhead_frustum();
        let f = frame(&globe, &view, &frustum);
        let mut ctx = seeded_context();
        let mut renderer = RecordingRenderer::new();
        let mut shape = cylinder();
        shape.base_mut().set_altitudes(500.0, 500.0);
        shape.render_geometry(&f, &mut ctx, &mut renderer);
        assert_eq!(renderer.count_role(StreamRole::Fill), 1);
    }

    #[test]
    fn test_second_render_hits_the_cache() {
        let globe = flat_globe();
        let view = overhead_view();
        let frustum = overhead_frustum();
        let f = frame(&globe, &view, &frustum);
        let mut ctx = seeded_context();
        let mut renderer = RecordingRenderer::new();
        let mut shape = cylinder();
        shape.render_geometry(&f, &mut ctx, &mut renderer);
        let cached = ctx.cache.len();
        shape.render_geometry(&f, &mut ctx, &mut renderer);
        assert_eq!(ctx.cache.len(), cached, "no new entries on the second pass");
        assert_eq!(renderer.count_role(StreamRole::Fill), 6);
    }

    #[test]
    fn test_move_to_recenters_and_invalidates() {
        let globe = flat_globe();
        let view = overhead_view();
        let frustum = overhead_frustum();
        let f = frame(&globe, &view, &frustum);
        let mut shape = cylinder();
        let before = shape.extent(&f);
        shape.move_to(LatLon::from_degrees(10.0, 10.0));
        assert_eq!(shape.center(), LatLon::from_degrees(10.0, 10.0));
        let after = shape.extent(&f);
        assert_ne!(
            before.map(|e| e.center()),
            after.map(|e| e.center()),
            "extent follows the shape"
        );
    }

    #[test]
    fn test_visibility_requires_frustum_overlap() {
        let globe = flat_globe();
        let view = overhead_view();
        let frustum = overhead_frustum();
        let f = frame(&globe, &view, &frustum);
        let mut shape = cylinder();
        assert!(shape.is_airspace_visible(&f));
        // The antipode is far outside the overhead frustum.
        shape.move_to(LatLon::from_degrees(0.0, 180.0));
        assert!(!shape.is_airspace_visible(&f));
        shape.move_to(LatLon::from_degrees(0.0, 0.0));
        shape.base_mut().set_visible(false);
        assert!(!shape.is_airspace_visible(&f));
    }
}
