//! A corridor along a waypoint polyline. Unlike a hand-assembled track, a
//! route applies one width and one altitude band to every leg, so adjacent
//! legs always join.

use aerovol_cache::{GeometryContext, ShapeKind};
use aerovol_geo::{Extent, LatLon};
use glam::DVec3;

use crate::airspace::{shift_location, Airspace};
use crate::attributes::ShapeAttributes;
use crate::base::AirspaceBase;
use crate::error::ParameterError;
use crate::frame::FrameContext;
use crate::render::Renderer;
use crate::shapes::{BoxVolume, TrackAirspace};

pub const DEFAULT_WIDTH: f64 = 1000.0;

pub struct Route {
    track: TrackAirspace,
    locations: Vec<LatLon>,
    width: f64,
}

impl Default for Route {
    fn default() -> Self {
        Self::new()
    }
}

impl Route {
    #[must_use]
    pub fn new() -> Self {
        Self {
            track: TrackAirspace::new(),
            locations: Vec::new(),
            width: DEFAULT_WIDTH,
        }
    }

    #[must_use]
    pub fn locations(&self) -> &[LatLon] {
        &self.locations
    }

    pub fn set_locations(&mut self, locations: Vec<LatLon>) -> Result<(), ParameterError> {
        if locations.len() < 2 {
            return Err(ParameterError::TooFewLocations {
                name: "route locations",
                min: 2,
                got: locations.len(),
            });
        }
        self.locations = locations;
        self.rebuild_legs();
        Ok(())
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
        self.rebuild_legs();
        Ok(())
    }

    #[must_use]
    pub fn legs(&self) -> &[BoxVolume] {
        self.track.legs()
    }

    pub fn set_altitudes(&mut self, lower: f64, upper: f64) {
        self.track.set_altitudes(lower, upper);
    }

    pub fn set_terrain_conforming(&mut self, lower: bool, upper: bool) {
        self.track.set_terrain_conforming(lower, upper);
    }

    pub fn set_attributes(&mut self, attributes: ShapeAttributes) {
        self.track.set_attributes(attributes);
    }

    pub fn set_enable_inner_caps(&mut self, enabled: bool) {
        self.track.set_enable_inner_caps(enabled);
    }

    pub fn set_enable_center_line(&mut self, enabled: bool) {
        self.track.set_enable_center_line(enabled);
    }

    pub fn set_lod_enabled(&mut self, enabled: bool) {
        self.track.set_lod_enabled(enabled);
    }

    /// One leg per waypoint pair, each carrying the route's width and the
    /// shared altitude band.
    fn rebuild_legs(&mut self) {
        let [lower, upper] = self.track.base().altitudes();
        let [conform_lower, conform_upper] = self.track.base().terrain_conforming();
        let attributes = *self.track.base().attributes();
        let lod_enabled = self.track.base().is_lod_enabled();
        let half_width = self.width / 2.0;

        self.track.clear_legs();
        for pair in self.locations.windows(2) {
            let mut leg = BoxVolume::new(pair[0], pair[1], half_width, half_width);
            leg.base_mut().set_altitudes(lower, upper);
            leg.base_mut()
                .set_terrain_conforming(conform_lower, conform_upper);
            leg.base_mut().set_attributes(attributes);
            leg.base_mut().set_lod_enabled(lod_enabled);
            self.track.add_leg(leg);
        }
    }
}

impl Airspace for Route {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Route
    }

    fn base(&self) -> &AirspaceBase {
        self.track.base()
    }

    fn base_mut(&mut self) -> &mut AirspaceBase {
        self.track.base_mut()
    }

    fn reference_location(&self) -> Option<LatLon> {
        self.locations.first().copied()
    }

    fn compute_minimal_geometry(&mut self, frame: &FrameContext) -> Vec<DVec3> {
        self.track.compute_minimal_geometry(frame)
    }

    fn compute_extent(&mut self, frame: &FrameContext) -> Option<Extent> {
        self.track.compute_extent(frame)
    }

    fn is_airspace_visible(&mut self, frame: &FrameContext) -> bool {
        self.track.is_airspace_visible(frame)
    }

    fn render_geometry(
        &mut self,
        frame: &FrameContext,
        ctx: &mut GeometryContext,
        renderer: &mut dyn Renderer,
    ) {
        self.track.render_geometry(frame, ctx, renderer);
    }

    fn shift(&mut self, old_reference: LatLon, new_reference: LatLon) {
        for location in &mut self.locations {
            *location = shift_location(old_reference, new_reference, *location);
        }
        self.rebuild_legs();
    }
}
