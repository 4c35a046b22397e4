//! A capped cylinder restricted to an azimuth wedge, closed by flat radial
//! walls at both ends of the span.

use aerovol_cache::{CacheKey, GeometryContext, Param, ShapeKind};
use aerovol_geo::{Angle, Extent, LatLon};
use aerovol_globe::ElevationSampleCache;
use aerovol_lod::DetailParams;
use glam::DVec3;
use std::f64::consts::FRAC_PI_2;

use crate::airspace::{shift_location, Airspace};
use crate::base::{extreme_points, AirspaceBase};
use crate::error::ParameterError;
use crate::frame::FrameContext;
use crate::geometry::cylinder::{
    disk_geometry, radial_wall_geometry, wall_geometry, DiskProfile, RadialWallProfile,
    WallProfile,
};
use crate::geometry::Orientation;
use crate::render::Renderer;
use crate::shapes::cylinder::{DEFAULT_LOOPS, DEFAULT_SLICES, DEFAULT_STACKS};
use crate::shapes::{cylinder_fit, detail_ramp, draw_cached};

const MINIMAL_SLICES: u32 = 8;
const MINIMAL_LOOPS: u32 = 4;

const RAMP_SLICES: [u32; 5] = [8, 14, 20, 26, 32];
const RAMP_LOOPS: [u32; 5] = [1, 2, 4, 6, 8];

pub struct PartialCappedCylinder {
    base: AirspaceBase,
    center: LatLon,
    inner_radius: f64,
    outer_radius: f64,
    /// Left and right azimuth of the wedge; the fill sweeps clockwise from
    /// left to right. Equal azimuths mean the full circle.
    azimuths: [Angle; 2],
    slices: u32,
    stacks: u32,
    loops: u32,
}

impl PartialCappedCylinder {
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
            azimuths: [Angle::ZERO, Angle::ZERO],
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

    #[must_use]
    pub fn azimuths(&self) -> [Angle; 2] {
        self.azimuths
    }

    pub fn set_azimuths(&mut self, left: Angle, right: Angle) {
        self.azimuths = [left, right];
        self.base.invalidate();
    }

    /// Sweep of the wedge, clockwise from the left azimuth. Zero means the
    /// full circle.
    fn sweep(&self) -> f64 {
        (self.azimuths[1] - self.azimuths[0])
            .normalized_azimuth()
            .radians()
    }

    fn is_full_circle(&self) -> bool {
        self.sweep() == 0.0
    }

    fn minimal_locations(&self, globe_radius: f64) -> Vec<LatLon> {
        let sweep = if self.is_full_circle() {
            std::f64::consts::TAU
        } else {
            self.sweep()
        };
        let start = self.azimuths[0].radians();
        let mut locations = Vec::with_capacity((MINIMAL_SLICES * MINIMAL_LOOPS + 1) as usize);
        locations.push(self.center);
        for ring in 1..=MINIMAL_LOOPS {
            let radius = self.outer_radius * f64::from(ring) / f64::from(MINIMAL_LOOPS);
            for slice in 0..=MINIMAL_SLICES {
                let azimuth = Angle::from_radians(
                    start + sweep * f64::from(slice) / f64::from(MINIMAL_SLICES),
                );
                locations.push(
                    self.center
                        .great_circle_endpoint(azimuth, radius / globe_radius),
                );
            }
        }
        locations
    }
}

impl Airspace for PartialCappedCylinder {
    fn kind(&self) -> ShapeKind {
        ShapeKind::PartialCylinder
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
        let full_circle = self.is_full_circle();
        let span = if full_circle {
            None
        } else {
            Some((self.azimuths[0], self.azimuths[1]))
        };
        let token = frame.token();
        let reference_center = frame.globe.point_from(self.center, 0.0);
        let attributes = self.base.active_attributes();
        let mut sampler = ElevationSampleCache::new(frame.globe);

        let params: Vec<Param> = vec![
            self.center.into(),
            self.inner_radius.into(),
            self.outer_radius.into(),
            self.azimuths[0].radians().into(),
            self.azimuths[1].radians().into(),
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
                            span,
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
                                span,
                                orientation: Orientation::Inward,
                            },
                        )
                    },
                );
            }
            if !full_circle {
                // Left wall faces away from the wedge interior; the wedge
                // sweeps clockwise from left to right.
                for (label, azimuth, normal_offset) in [
                    ("wall.left", self.azimuths[0], -FRAC_PI_2),
                    ("wall.right", self.azimuths[1], FRAC_PI_2),
                ] {
                    draw_cached(
                        ctx,
                        renderer,
                        key(label),
                        conforming,
                        reference_center,
                        None,
                        attributes,
                        || {
                            radial_wall_geometry(
                                &mut sampler,
                                ve,
                                reference_center,
                                &RadialWallProfile {
                                    center: self.center,
                                    azimuth,
                                    normal_azimuth: azimuth
                                        + Angle::from_radians(normal_offset),
                                    inner_radius: self.inner_radius,
                                    outer_radius: self.outer_radius,
                                    altitudes,
                                    terrain_conforming: conforming,
                                    loops,
                                    stacks,
                                },
                            )
                        },
                    );
                }
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
                            span,
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
                                span,
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

    fn wedge() -> PartialCappedCylinder {
        let mut shape = PartialCappedCylinder::new(LatLon::from_degrees(0.0, 0.0), 10_000.0);
        shape.base_mut().set_altitudes(100.0, 3000.0);
        shape.base_mut().set_lod_enabled(false);
        shape.set_azimuths(Angle::from_degrees(30.0), Angle::from_degrees(120.0));
        shape
    }

    #[test]
    fn test_wedge_draws_radial_walls() {
        let globe = flat_globe();
        let view = overhead_view();
        let frustum = overhead_frustum();
        let f = frame(&globe, &view, &frustum);
        let mut ctx = seeded_context();
        let mut renderer = RecordingRenderer::new();
        let mut shape = wedge();
        shape.render_geometry(&f, &mut ctx, &mut renderer);
        // Outer wall, two radial walls, two caps.
        assert_eq!(renderer.count_role(StreamRole::Fill), 5);
    }

    #[test]
    fn test_equal_azimuths_behave_as_full_circle() {
        let globe = flat_globe();
        let view = overhead_view();
        let frustum = overhead_frustum();
        let f = frame(&globe, &view, &frustum);
        let mut ctx = seeded_context();
        let mut renderer = RecordingRenderer::new();
        let mut shape = wedge();
        shape.set_azimuths(Angle::from_degrees(45.0), Angle::from_degrees(45.0));
        shape.render_geometry(&f, &mut ctx, &mut renderer);
        // No radial walls: outer wall plus two caps.
        assert_eq!(renderer.count_role(StreamRole::Fill), 3);
    }

    #[test]
    fn test_annular_wedge_adds_inner_wall() {
        let globe = flat_globe();
        let view = overhead_view();
        let frustum = overhead_frustum();
        let f = frame(&globe, &view, &frustum);
        let mut ctx = seeded_context();
        let mut renderer = RecordingRenderer::new();
        let mut shape = wedge();
        shape.set_radii(1000.0, 10_000.0).unwrap();
        shape.render_geometry(&f, &mut ctx, &mut renderer);
        assert_eq!(renderer.count_role(StreamRole::Fill), 6);
    }

    #[test]
    fn test_sweep_wraps_through_north() {
        let mut shape = wedge();
        shape.set_azimuths(Angle::from_degrees(300.0), Angle::from_degrees(60.0));
        assert!((shape.sweep().to_degrees() - 120.0).abs() < 1e-9);
    }
}
