//! A racetrack-shaped volume around a leg. The orbit type chooses whether
//! the given leg is the centerline or one edge of the stadium.

use aerovol_cache::{CacheKey, GeometryContext, Param, ShapeKind};
use aerovol_geo::{Angle, LatLon};
use aerovol_globe::ElevationSampleCache;
use aerovol_lod::DetailParams;
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

use crate::airspace::{shift_location, Airspace};
use crate::base::{extreme_points, AirspaceBase};
use crate::error::ParameterError;
use crate::frame::FrameContext;
use crate::geometry::orbit::{orbit_geometry, perimeter, OrbitProfile};
use crate::render::Renderer;
use crate::shapes::{detail_ramp, draw_cached};

pub const DEFAULT_ARC_SLICES: u32 = 16;
pub const DEFAULT_LENGTH_SLICES: u32 = 32;
pub const DEFAULT_LOOPS: u32 = 4;

const MINIMAL_ARC_SLICES: u32 = 4;
const MINIMAL_LENGTH_SLICES: u32 = 8;

const RAMP_ARC: [u32; 5] = [4, 7, 10, 13, 16];
const RAMP_LENGTH: [u32; 5] = [8, 14, 20, 26, 32];
const RAMP_LOOPS: [u32; 5] = [1, 1, 2, 3, 4];

/// How the leg relates to the stadium footprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrbitType {
    /// The leg is the centerline.
    Center,
    /// The leg is the right edge; the volume lies to its left.
    Left,
    /// The leg is the left edge; the volume lies to its right.
    Right,
}

pub struct Orbit {
    base: AirspaceBase,
    begin: LatLon,
    end: LatLon,
    width: f64,
    orbit_type: OrbitType,
    arc_slices: u32,
    length_slices: u32,
    loops: u32,
}

impl Orbit {
    #[must_use]
    pub fn new(begin: LatLon, end: LatLon, width: f64, orbit_type: OrbitType) -> Self {
        let mut base = AirspaceBase::new();
        base.set_detail_levels(detail_ramp(|i| DetailParams {
            arc_slices: Some(RAMP_ARC[i]),
            length_slices: Some(RAMP_LENGTH[i]),
            loops: Some(RAMP_LOOPS[i]),
            disable_terrain_conformance: i == 0,
            ..DetailParams::default()
        }));
        Self {
            base,
            begin,
            end,
            width,
            orbit_type,
            arc_slices: DEFAULT_ARC_SLICES,
            length_slices: DEFAULT_LENGTH_SLICES,
            loops: DEFAULT_LOOPS,
        }
    }

    #[must_use]
    pub fn locations(&self) -> (LatLon, LatLon) {
        (self.begin, self.end)
    }

    pub fn set_locations(&mut self, begin: LatLon, end: LatLon) {
        self.begin = begin;
        self.end = end;
        self.base.invalidate();
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn set_width(&mut self, width: f64) -> Result<(), ParameterError> {
        if width <= 0.0 {
            return Err(ParameterError::NotPositive {
                name: "width",
                value: width,
            });
        }
        self.width = width;
        self.base.invalidate();
        Ok(())
    }

    #[must_use]
    pub fn orbit_type(&self) -> OrbitType {
        self.orbit_type
    }

    pub fn set_orbit_type(&mut self, orbit_type: OrbitType) {
        self.orbit_type = orbit_type;
        self.base.invalidate();
    }

    /// Stadium centerline after the orbit type's sideways shift.
    fn spine(&self, globe_radius: f64) -> (LatLon, LatLon) {
        let offset = match self.orbit_type {
            OrbitType::Center => return (self.begin, self.end),
            OrbitType::Left => -FRAC_PI_2,
            OrbitType::Right => FRAC_PI_2,
        };
        let half_arc = self.width * 0.5 / globe_radius;
        let begin_heading = self.begin.great_circle_azimuth(self.end).radians();
        let end_heading = self.end.great_circle_azimuth(self.begin).radians() + std::f64::consts::PI;
        (
            self.begin
                .great_circle_endpoint(Angle::from_radians(begin_heading + offset), half_arc),
            self.end
                .great_circle_endpoint(Angle::from_radians(end_heading + offset), half_arc),
        )
    }

    fn profile(
        &self,
        globe_radius: f64,
        arc_slices: u32,
        length_slices: u32,
        loops: u32,
        altitudes: [f64; 2],
        conforming: [bool; 2],
        collapsed: bool,
    ) -> OrbitProfile {
        let (begin, end) = self.spine(globe_radius);
        OrbitProfile {
            begin,
            end,
            width: self.width,
            altitudes,
            terrain_conforming: conforming,
            arc_slices,
            length_slices,
            loops,
            collapsed,
        }
    }
}

impl Airspace for Orbit {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Orbit
    }

    fn base(&self) -> &AirspaceBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AirspaceBase {
        &mut self.base
    }

    fn reference_location(&self) -> Option<LatLon> {
        Some(self.begin)
    }

    fn compute_minimal_geometry(&mut self, frame: &FrameContext) -> Vec<DVec3> {
        let (altitudes, conforming) = self
            .base
            .effective_altitudes(frame.globe, frame.vertical_exaggeration);
        let globe_radius = frame.globe.equatorial_radius();
        let profile = self.profile(
            globe_radius,
            MINIMAL_ARC_SLICES,
            MINIMAL_LENGTH_SLICES,
            1,
            altitudes,
            conforming,
            false,
        );
        if profile.begin == profile.end {
            return Vec::new();
        }
        let (ring, _) = perimeter(&profile, self.width * 0.5 / globe_radius);
        extreme_points(
            frame.globe,
            frame.vertical_exaggeration,
            &ring,
            altitudes,
            conforming,
        )
    }

    fn render_geometry(
        &mut self,
        frame: &FrameContext,
        ctx: &mut GeometryContext,
        renderer: &mut dyn Renderer,
    ) {
        let (mut arc_slices, mut length_slices, mut loops) =
            (self.arc_slices, self.length_slices, self.loops);
        let mut drop_conformance = false;
        if let Some(level) = self.detail_level(frame) {
            arc_slices = level.params.arc_slices.unwrap_or(arc_slices);
            length_slices = level.params.length_slices.unwrap_or(length_slices);
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
        let reference_center = frame.globe.point_from(self.begin, 0.0);
        let attributes = self.base.active_attributes();
        let mut sampler = ElevationSampleCache::new(frame.globe);

        let orbit_type_tag = match self.orbit_type {
            OrbitType::Center => 0i64,
            OrbitType::Left => 1,
            OrbitType::Right => 2,
        };
        let params: Vec<Param> = vec![
            self.begin.into(),
            self.end.into(),
            self.width.into(),
            orbit_type_tag.into(),
            altitudes[0].into(),
            altitudes[1].into(),
            conforming[0].into(),
            conforming[1].into(),
            ve.into(),
            i64::from(arc_slices).into(),
            i64::from(length_slices).into(),
            i64::from(loops).into(),
            collapsed.into(),
        ];
        let key = CacheKey::new(self.kind(), "geometry", Some(token), params);
        let profile = self.profile(
            frame.globe.equatorial_radius(),
            arc_slices,
            length_slices,
            loops,
            altitudes,
            conforming,
            collapsed,
        );
        draw_cached(
            ctx,
            renderer,
            key,
            conforming,
            reference_center,
            None,
            attributes,
            || orbit_geometry(&mut sampler, ve, reference_center, &profile),
        );
    }

    fn shift(&mut self, old_reference: LatLon, new_reference: LatLon) {
        self.begin = shift_location(old_reference, new_reference, self.begin);
        self.end = shift_location(old_reference, new_reference, self.end);
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

    fn orbit(orbit_type: OrbitType) -> Orbit {
        let mut shape = Orbit::new(
            LatLon::from_degrees(0.0, 0.0),
            LatLon::from_degrees(0.3, 0.0),
            20_000.0,
            orbit_type,
        );
        shape.base_mut().set_altitudes(500.0, 4000.0);
        shape.base_mut().set_lod_enabled(false);
        shape
    }

    #[test]
    fn test_center_orbit_keeps_the_leg_as_spine() {
        let shape = orbit(OrbitType::Center);
        let (begin, end) = shape.spine(EARTH_RADIUS);
        assert_eq!(begin, shape.begin);
        assert_eq!(end, shape.end);
    }

    #[test]
    fn test_left_orbit_shifts_spine_west_of_a_north_leg() {
        let shape = orbit(OrbitType::Left);
        let (begin, end) = shape.spine(EARTH_RADIUS);
        assert!(begin.lon < shape.begin.lon, "spine west of the leg");
        assert!(end.lon < shape.end.lon);
        let d = shape.begin.great_circle_distance(begin) * EARTH_RADIUS;
        assert!((d - 10_000.0).abs() < 1.0, "shift is half the width, got {d}");
    }

    #[test]
    fn test_right_orbit_shifts_spine_east_of_a_north_leg() {
        let shape = orbit(OrbitType::Right);
        let (begin, end) = shape.spine(EARTH_RADIUS);
        assert!(begin.lon > shape.begin.lon);
        assert!(end.lon > shape.end.lon);
    }

    #[test]
    fn test_render_caches_one_entry() {
        let globe = flat_globe();
        let view = overhead_view();
        let frustum = overhead_frustum();
        let f = frame(&globe, &view, &frustum);
        let mut ctx = seeded_context();
        let mut renderer = RecordingRenderer::new();
        let mut shape = orbit(OrbitType::Center);
        shape.render_geometry(&f, &mut ctx, &mut renderer);
        assert_eq!(ctx.cache.len(), 1);
        assert_eq!(renderer.count_role(StreamRole::Fill), 1);
    }

    #[test]
    fn test_orbit_type_changes_the_cache_key() {
        let globe = flat_globe();
        let view = overhead_view();
        let frustum = overhead_frustum();
        let f = frame(&globe, &view, &frustum);
        let mut ctx = seeded_context();
        let mut renderer = RecordingRenderer::new();
        let mut shape = orbit(OrbitType::Center);
        shape.render_geometry(&f, &mut ctx, &mut renderer);
        shape.set_orbit_type(OrbitType::Left);
        shape.render_geometry(&f, &mut ctx, &mut renderer);
        assert_eq!(ctx.cache.len(), 2);
    }
}
