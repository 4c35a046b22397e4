//! A rectangular volume along a great-circle leg, the building block of
//! tracks and routes. Track joining adjusts the corner azimuths and cap
//! flags so adjacent legs meet cleanly.

use aerovol_cache::{CacheKey, GeometryContext, Param, ShapeKind};
use aerovol_geo::LatLon;
use aerovol_globe::ElevationSampleCache;
use aerovol_lod::DetailParams;
use glam::DVec3;

use crate::airspace::{shift_location, Airspace};
use crate::base::{extreme_points, AirspaceBase};
use crate::error::ParameterError;
use crate::frame::FrameContext;
use crate::geometry::boxgen::{box_geometry, compute_corners, BoxProfile, CornerAzimuths};
use crate::render::Renderer;
use crate::shapes::{detail_ramp, draw_cached};

pub const DEFAULT_PILLARS: u32 = 8;
pub const DEFAULT_STACKS: u32 = 2;

const RAMP_PILLARS: [u32; 5] = [1, 2, 4, 6, 8];
const RAMP_STACKS: [u32; 5] = [1, 1, 2, 2, 2];

pub struct BoxVolume {
    base: AirspaceBase,
    begin: LatLon,
    end: LatLon,
    left_width: f64,
    right_width: f64,
    corner_azimuths: CornerAzimuths,
    enable_start_cap: bool,
    enable_end_cap: bool,
    enable_center_line: bool,
    pillars: u32,
    stacks: u32,
}

impl BoxVolume {
    #[must_use]
    pub fn new(begin: LatLon, end: LatLon, left_width: f64, right_width: f64) -> Self {
        let mut base = AirspaceBase::new();
        base.set_detail_levels(detail_ramp(|i| DetailParams {
            pillars: Some(RAMP_PILLARS[i]),
            stacks: Some(RAMP_STACKS[i]),
            disable_terrain_conformance: i == 0,
            ..DetailParams::default()
        }));
        Self {
            base,
            begin,
            end,
            left_width,
            right_width,
            corner_azimuths: CornerAzimuths::default(),
            enable_start_cap: true,
            enable_end_cap: true,
            enable_center_line: false,
            pillars: DEFAULT_PILLARS,
            stacks: DEFAULT_STACKS,
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
    pub fn widths(&self) -> (f64, f64) {
        (self.left_width, self.right_width)
    }

    pub fn set_widths(&mut self, left: f64, right: f64) -> Result<(), ParameterError> {
        if left < 0.0 {
            return Err(ParameterError::Negative {
                name: "left width",
                value: left,
            });
        }
        if right < 0.0 {
            return Err(ParameterError::Negative {
                name: "right width",
                value: right,
            });
        }
        self.left_width = left;
        self.right_width = right;
        self.base.invalidate();
        Ok(())
    }

    #[must_use]
    pub fn corner_azimuths(&self) -> CornerAzimuths {
        self.corner_azimuths
    }

    pub fn set_corner_azimuths(&mut self, corner_azimuths: CornerAzimuths) {
        self.corner_azimuths = corner_azimuths;
        self.base.invalidate();
    }

    #[must_use]
    pub fn cap_flags(&self) -> (bool, bool) {
        (self.enable_start_cap, self.enable_end_cap)
    }

    pub fn set_enable_start_cap(&mut self, enabled: bool) {
        self.enable_start_cap = enabled;
        self.base.invalidate();
    }

    pub fn set_enable_end_cap(&mut self, enabled: bool) {
        self.enable_end_cap = enabled;
        self.base.invalidate();
    }

    #[must_use]
    pub fn enable_center_line(&self) -> bool {
        self.enable_center_line
    }

    pub fn set_enable_center_line(&mut self, enabled: bool) {
        self.enable_center_line = enabled;
        self.base.invalidate();
    }

    fn profile(&self, pillars: u32, stacks: u32, altitudes: [f64; 2], conforming: [bool; 2], collapsed: bool) -> BoxProfile {
        BoxProfile {
            begin: self.begin,
            end: self.end,
            left_width: self.left_width,
            right_width: self.right_width,
            altitudes,
            terrain_conforming: conforming,
            corner_azimuths: self.corner_azimuths,
            enable_start_cap: self.enable_start_cap,
            enable_end_cap: self.enable_end_cap,
            enable_center_line: self.enable_center_line,
            length_segments: pillars,
            width_segments: stacks,
            collapsed,
        }
    }
}

impl Airspace for BoxVolume {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Box
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
        let profile = self.profile(1, 1, altitudes, conforming, false);
        let corners = compute_corners(frame.globe.equatorial_radius(), &profile);
        let locations = [
            self.begin,
            self.end,
            corners.begin_left,
            corners.begin_right,
            corners.end_left,
            corners.end_right,
        ];
        extreme_points(
            frame.globe,
            frame.vertical_exaggeration,
            &locations,
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
        let (mut pillars, mut stacks) = (self.pillars, self.stacks);
        let mut drop_conformance = false;
        if let Some(level) = self.detail_level(frame) {
            pillars = level.params.pillars.unwrap_or(pillars);
            stacks = level.params.stacks.unwrap_or(stacks);
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

        // Overridden corner azimuths enter the key as radians; an untouched
        // corner encodes as NaN, which compares bitwise like any other value.
        let corner = |a: Option<aerovol_geo::Angle>| a.map_or(f64::NAN, |a| a.radians());
        let params: Vec<Param> = vec![
            self.begin.into(),
            self.end.into(),
            self.left_width.into(),
            self.right_width.into(),
            corner(self.corner_azimuths.begin_left).into(),
            corner(self.corner_azimuths.begin_right).into(),
            corner(self.corner_azimuths.end_left).into(),
            corner(self.corner_azimuths.end_right).into(),
            self.enable_start_cap.into(),
            self.enable_end_cap.into(),
            self.enable_center_line.into(),
            altitudes[0].into(),
            altitudes[1].into(),
            conforming[0].into(),
            conforming[1].into(),
            ve.into(),
            i64::from(pillars).into(),
            i64::from(stacks).into(),
            collapsed.into(),
        ];
        let key = CacheKey::new(self.kind(), "geometry", Some(token), params);
        let profile = self.profile(pillars, stacks, altitudes, conforming, collapsed);
        draw_cached(
            ctx,
            renderer,
            key,
            conforming,
            reference_center,
            None,
            attributes,
            || box_geometry(&mut sampler, ve, reference_center, &profile),
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
    use aerovol_geo::Angle;

    use super::*;
    use crate::test_util::{
        flat_globe, frame, overhead_frustum, overhead_view, seeded_context, RecordingRenderer,
    };

    fn leg() -> BoxVolume {
        let mut shape = BoxVolume::new(
            LatLon::from_degrees(0.0, 0.0),
            LatLon::from_degrees(0.5, 0.0),
            8000.0,
            8000.0,
        );
        shape.base_mut().set_altitudes(100.0, 2000.0);
        shape.base_mut().set_lod_enabled(false);
        shape
    }

    #[test]
    fn test_render_caches_one_entry() {
        let globe = flat_globe();
        let view = overhead_view();
        let frustum = overhead_frustum();
        let f = frame(&globe, &view, &frustum);
        let mut ctx = seeded_context();
        let mut renderer = RecordingRenderer::new();
        let mut shape = leg();
        shape.render_geometry(&f, &mut ctx, &mut renderer);
        assert_eq!(ctx.cache.len(), 1);
        assert_eq!(renderer.count_role(StreamRole::Fill), 1);
    }

    #[test]
    fn test_corner_azimuth_change_is_a_new_cache_entry() {
        let globe = flat_globe();
        let view = overhead_view();
        let frustum = overhead_frustum();
        let f = frame(&globe, &view, &frustum);
        let mut ctx = seeded_context();
        let mut renderer = RecordingRenderer::new();
        let mut shape = leg();
        shape.render_geometry(&f, &mut ctx, &mut renderer);
        let mut azimuths = shape.corner_azimuths();
        azimuths.end_left = Some(Angle::from_degrees(45.0));
        shape.set_corner_azimuths(azimuths);
        shape.render_geometry(&f, &mut ctx, &mut renderer);
        assert_eq!(ctx.cache.len(), 2);
    }

    #[test]
    fn test_minimal_geometry_covers_both_surfaces() {
        let globe = flat_globe();
        let view = overhead_view();
        let frustum = overhead_frustum();
        let f = frame(&globe, &view, &frustum);
        let mut shape = leg();
        let points = shape.compute_minimal_geometry(&f);
        // Six locations, one point per non-conforming surface.
        assert_eq!(points.len(), 12);
    }

    #[test]
    fn test_center_line_draws_with_outline_enabled() {
        let globe = flat_globe();
        let view = overhead_view();
        let frustum = overhead_frustum();
        let f = frame(&globe, &view, &frustum);
        let mut ctx = seeded_context();
        let mut renderer = RecordingRenderer::new();
        let mut shape = leg();
        shape.set_enable_center_line(true);
        let mut attributes = *shape.base().attributes();
        attributes.draw_outline = true;
        shape.base_mut().set_attributes(attributes);
        shape.render_geometry(&f, &mut ctx, &mut renderer);
        assert_eq!(renderer.count_role(StreamRole::Outline), 1);
        assert_eq!(renderer.count_role(StreamRole::CenterLine), 1);
    }
}
