//! A sequence of box legs rendered as one continuous corridor. Adjacent legs
//! that share an endpoint get their corner azimuths aligned so the joint is
//! seamless; pairs that don't line up are left as-is and simply show a seam.

use aerovol_cache::{GeometryContext, ShapeKind};
use aerovol_geo::{Angle, Extent, LatLon};
use glam::DVec3;

use crate::airspace::Airspace;
use crate::attributes::ShapeAttributes;
use crate::base::AirspaceBase;
use crate::frame::FrameContext;
use crate::geometry::boxgen::CornerAzimuths;
use crate::render::Renderer;
use crate::shapes::BoxVolume;

/// Joints whose back and forward azimuths lie within this angle of each
/// other fold back on themselves; only the turn side is aligned there.
pub const DEFAULT_SMALL_ANGLE_THRESHOLD: Angle = Angle::from_radians(22.5 * std::f64::consts::PI / 180.0);

pub struct TrackAirspace {
    base: AirspaceBase,
    legs: Vec<BoxVolume>,
    enable_inner_caps: bool,
    enable_center_line: bool,
    small_angle_threshold: Angle,
    legs_out_of_date: bool,
}

impl Default for TrackAirspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackAirspace {
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: AirspaceBase::new(),
            legs: Vec::new(),
            enable_inner_caps: true,
            enable_center_line: false,
            small_angle_threshold: DEFAULT_SMALL_ANGLE_THRESHOLD,
            legs_out_of_date: true,
        }
    }

    pub fn add_leg(&mut self, mut leg: BoxVolume) {
        leg.set_enable_center_line(self.enable_center_line);
        self.legs.push(leg);
        self.base.invalidate();
        self.legs_out_of_date = true;
    }

    pub fn clear_legs(&mut self) {
        self.legs.clear();
        self.base.invalidate();
        self.legs_out_of_date = true;
    }

    #[must_use]
    pub fn legs(&self) -> &[BoxVolume] {
        &self.legs
    }

    /// Mutable access re-arms the join pass; leg edits may change which
    /// joints line up.
    pub fn legs_mut(&mut self) -> &mut Vec<BoxVolume> {
        self.base.invalidate();
        self.legs_out_of_date = true;
        &mut self.legs
    }

    #[must_use]
    pub fn enable_inner_caps(&self) -> bool {
        self.enable_inner_caps
    }

    /// When disabled, wide-angle joints between same-width legs drop the
    /// caps on the shared edge and the corridor interior stays open.
    pub fn set_enable_inner_caps(&mut self, enabled: bool) {
        self.enable_inner_caps = enabled;
        self.base.invalidate();
        self.legs_out_of_date = true;
    }

    #[must_use]
    pub fn enable_center_line(&self) -> bool {
        self.enable_center_line
    }

    pub fn set_enable_center_line(&mut self, enabled: bool) {
        self.enable_center_line = enabled;
        for leg in &mut self.legs {
            leg.set_enable_center_line(enabled);
        }
    }

    #[must_use]
    pub fn small_angle_threshold(&self) -> Angle {
        self.small_angle_threshold
    }

    pub fn set_small_angle_threshold(&mut self, threshold: Angle) {
        self.small_angle_threshold = threshold;
        self.base.invalidate();
        self.legs_out_of_date = true;
    }

    /// Forwarded to every leg; joining requires adjacent legs to agree on
    /// their altitude band.
    pub fn set_altitudes(&mut self, lower: f64, upper: f64) {
        self.base.set_altitudes(lower, upper);
        for leg in &mut self.legs {
            leg.base_mut().set_altitudes(lower, upper);
        }
        self.legs_out_of_date = true;
    }

    pub fn set_terrain_conforming(&mut self, lower: bool, upper: bool) {
        self.base.set_terrain_conforming(lower, upper);
        for leg in &mut self.legs {
            leg.base_mut().set_terrain_conforming(lower, upper);
        }
        self.legs_out_of_date = true;
    }

    pub fn set_attributes(&mut self, attributes: ShapeAttributes) {
        self.base.set_attributes(attributes);
        for leg in &mut self.legs {
            leg.base_mut().set_attributes(attributes);
        }
    }

    pub fn set_lod_enabled(&mut self, enabled: bool) {
        self.base.set_lod_enabled(enabled);
        for leg in &mut self.legs {
            leg.base_mut().set_lod_enabled(enabled);
        }
    }

    /// Run the join pass if any mutation re-armed it. Every leg is first
    /// reset to independent caps and default corner azimuths, then each
    /// adjacent pair that lines up is joined.
    fn update_legs(&mut self) {
        if !self.legs_out_of_date {
            return;
        }
        for leg in &mut self.legs {
            leg.set_enable_start_cap(true);
            leg.set_enable_end_cap(true);
            leg.set_corner_azimuths(CornerAzimuths::default());
        }
        for i in 0..self.legs.len().saturating_sub(1) {
            let (head, tail) = self.legs.split_at_mut(i + 1);
            let leg = &mut head[i];
            let next = &mut tail[0];
            if must_join(leg, next) {
                join_legs(leg, next, self.enable_inner_caps, self.small_angle_threshold);
            }
        }
        self.legs_out_of_date = false;
    }
}

/// Adjacent legs are joined only when they share the common location and
/// agree on altitudes and terrain conformance there.
fn must_join(leg1: &BoxVolume, leg2: &BoxVolume) -> bool {
    leg1.locations().1 == leg2.locations().0
        && leg1.base().altitudes() == leg2.base().altitudes()
        && leg1.base().terrain_conforming() == leg2.base().terrain_conforming()
}

/// Align the corner azimuths at the shared edge of two joined legs. An
/// ordinary turn aligns both sides to the mean azimuth and its opposite; a
/// joint that folds back on itself aligns only the turn side, which avoids
/// the long spike the mean azimuth would otherwise produce on the outside of
/// such a tight turn.
fn join_legs(leg1: &mut BoxVolume, leg2: &mut BoxVolume, inner_caps: bool, threshold: Angle) {
    let (begin1, end1) = leg1.locations();
    let (begin2, end2) = leg2.locations();

    let azimuth1 = end1.great_circle_azimuth(begin1);
    let azimuth2 = begin2.great_circle_azimuth(end2);
    let angular_distance = azimuth1.angular_distance_to(azimuth2);
    let signed_distance = (azimuth2 - azimuth1).normalized_signed();
    let short_angle = Angle::mix(0.5, azimuth1, azimuth2);
    let long_angle = (short_angle + Angle::POS180).normalized_signed();
    let is_left_turn = signed_distance.radians() > 0.0;

    let mut azimuths1 = leg1.corner_azimuths();
    let mut azimuths2 = leg2.corner_azimuths();

    if angular_distance > threshold {
        let (left_azimuth, right_azimuth) = if is_left_turn {
            (short_angle, long_angle)
        } else {
            (long_angle, short_angle)
        };
        let widths_different = leg1.widths() != leg2.widths();
        leg1.set_enable_end_cap(widths_different || inner_caps);
        leg2.set_enable_start_cap(widths_different || inner_caps);
        azimuths1.end_left = Some(left_azimuth);
        azimuths1.end_right = Some(right_azimuth);
        azimuths2.begin_left = Some(left_azimuth);
        azimuths2.begin_right = Some(right_azimuth);
    } else if is_left_turn {
        azimuths1.end_left = Some(short_angle);
        azimuths2.begin_left = Some(short_angle);
    } else {
        azimuths1.end_right = Some(short_angle);
        azimuths2.begin_right = Some(short_angle);
    }

    leg1.set_corner_azimuths(azimuths1);
    leg2.set_corner_azimuths(azimuths2);
}

impl Airspace for TrackAirspace {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Track
    }

    fn base(&self) -> &AirspaceBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AirspaceBase {
        &mut self.base
    }

    fn reference_location(&self) -> Option<LatLon> {
        self.legs.first().map(|leg| leg.locations().0)
    }

    fn compute_minimal_geometry(&mut self, frame: &FrameContext) -> Vec<DVec3> {
        self.update_legs();
        let mut points = Vec::new();
        for leg in &mut self.legs {
            points.extend(leg.compute_minimal_geometry(frame));
        }
        points
    }

    fn compute_extent(&mut self, frame: &FrameContext) -> Option<Extent> {
        self.update_legs();
        let mut union: Option<Extent> = None;
        for leg in &mut self.legs {
            if let Some(extent) = leg.extent(frame) {
                union = Some(match union {
                    Some(current) => current.union(&extent),
                    None => extent,
                });
            }
        }
        union
    }

    /// A container is visible only when its own extent intersects the
    /// frustum and at least one leg is visible too.
    fn is_airspace_visible(&mut self, frame: &FrameContext) -> bool {
        if !self.base.is_visible() {
            return false;
        }
        let parent_visible = match self.extent(frame) {
            Some(extent) => frame.frustum.intersects_extent(&extent),
            None => false,
        };
        parent_visible
            && self
                .legs
                .iter_mut()
                .any(|leg| leg.is_airspace_visible(frame))
    }

    fn render_geometry(
        &mut self,
        frame: &FrameContext,
        ctx: &mut GeometryContext,
        renderer: &mut dyn Renderer,
    ) {
        self.update_legs();
        for leg in &mut self.legs {
            if leg.is_airspace_visible(frame) {
                leg.render_geometry(frame, ctx, renderer);
            }
        }
    }

    fn shift(&mut self, old_reference: LatLon, new_reference: LatLon) {
        for leg in &mut self.legs {
            leg.shift(old_reference, new_reference);
            leg.base_mut().invalidate();
        }
        self.legs_out_of_date = true;
    }
}

#[cfg(test)]
mod tests {
    use aerovol_cache::StreamRole;

    use super::*;
    use crate::test_util::{
        flat_globe, frame, overhead_frustum, overhead_view, seeded_context, RecordingRenderer,
    };

    fn leg(begin: (f64, f64), end: (f64, f64)) -> BoxVolume {
        let mut leg = BoxVolume::new(
            LatLon::from_degrees(begin.0, begin.1),
            LatLon::from_degrees(end.0, end.1),
            8000.0,
            8000.0,
        );
        leg.base_mut().set_altitudes(100.0, 2000.0);
        leg.base_mut().set_lod_enabled(false);
        leg
    }

    /// North then east: a right-angle right turn.
    fn right_angle_track() -> TrackAirspace {
        let mut track = TrackAirspace::new();
        track.add_leg(leg((0.0, 0.0), (0.5, 0.0)));
        track.add_leg(leg((0.5, 0.0), (0.5, 0.5)));
        track
    }

    #[test]
    fn test_wide_turn_aligns_both_corner_azimuths() {
        let mut track = right_angle_track();
        track.update_legs();

        // Back azimuth of the first leg is due south, forward azimuth of the
        // second is due east; the shared edge lands on their mean.
        let first = track.legs()[0].corner_azimuths();
        let second = track.legs()[1].corner_azimuths();
        let end_left = first.end_left.unwrap().degrees();
        let end_right = first.end_right.unwrap().degrees();
        assert!((end_right - 135.0).abs() < 0.01, "right side on the mean, got {end_right}");
        assert!((end_left - -45.0).abs() < 0.01, "left side opposite, got {end_left}");
        assert_eq!(first.end_left, second.begin_left);
        assert_eq!(first.end_right, second.begin_right);
        // Outer corners of the track are untouched.
        assert!(first.begin_left.is_none());
        assert!(second.end_right.is_none());
    }

    #[test]
    fn test_inner_caps_disabled_drops_the_shared_caps() {
        let mut track = right_angle_track();
        track.set_enable_inner_caps(false);
        track.update_legs();
        assert_eq!(track.legs()[0].cap_flags(), (true, false));
        assert_eq!(track.legs()[1].cap_flags(), (false, true));
    }

    #[test]
    fn test_differing_widths_keep_the_shared_caps() {
        let mut track = right_angle_track();
        track.set_enable_inner_caps(false);
        track.legs_mut()[1].set_widths(4000.0, 4000.0).unwrap();
        track.update_legs();
        assert_eq!(track.legs()[0].cap_flags(), (true, true));
        assert_eq!(track.legs()[1].cap_flags(), (true, true));
    }

    #[test]
    fn test_hairpin_turn_aligns_only_the_turn_side() {
        let mut track = TrackAirspace::new();
        track.add_leg(leg((0.0, 0.0), (0.5, 0.0)));
        // Folds back nearly due south, bending slightly to the right.
        track.add_leg(leg((0.5, 0.0), (0.05, 0.05)));
        track.update_legs();
        let first = track.legs()[0].corner_azimuths();
        let second = track.legs()[1].corner_azimuths();
        assert!(first.end_right.is_some());
        assert!(first.end_left.is_none());
        assert_eq!(first.end_right, second.begin_right);
        // Hairpin joints always keep the shared caps.
        assert_eq!(track.legs()[0].cap_flags(), (true, true));
    }

    #[test]
    fn test_mismatched_legs_are_not_joined() {
        let mut track = TrackAirspace::new();
        track.add_leg(leg((0.0, 0.0), (0.5, 0.0)));
        let mut detached = leg((0.5, 0.0), (0.5, 0.5));
        detached.base_mut().set_altitudes(100.0, 3000.0);
        track.add_leg(detached);
        track.update_legs();
        let first = track.legs()[0].corner_azimuths();
        assert!(first.end_left.is_none());
        assert!(first.end_right.is_none());
    }

    #[test]
    fn test_leg_mutation_rearms_the_join_pass() {
        let mut track = right_angle_track();
        track.update_legs();
        assert!(track.legs()[0].corner_azimuths().end_left.is_some());
        track.legs_mut()[1].set_locations(
            LatLon::from_degrees(0.6, 0.0),
            LatLon::from_degrees(0.6, 0.5),
        );
        track.update_legs();
        // Legs no longer share an endpoint, so the reset sticks.
        assert!(track.legs()[0].corner_azimuths().end_left.is_none());
    }

    #[test]
    fn test_render_draws_every_leg() {
        let globe = flat_globe();
        let view = overhead_view();
        let frustum = overhead_frustum();
        let f = frame(&globe, &view, &frustum);
        let mut ctx = seeded_context();
        let mut renderer = RecordingRenderer::new();
        let mut track = right_angle_track();
        track.render_geometry(&f, &mut ctx, &mut renderer);
        assert_eq!(renderer.count_role(StreamRole::Fill), 2);
    }

    #[test]
    fn test_empty_track_is_not_visible() {
        let globe = flat_globe();
        let view = overhead_view();
        let frustum = overhead_frustum();
        let f = frame(&globe, &view, &frustum);
        let mut track = TrackAirspace::new();
        assert!(!track.is_airspace_visible(&f));
    }
}
