//! A vertical curtain hung along a polyline path. Curtains have no detail
//! ramp; their density comes from the path split threshold.

use aerovol_cache::{CacheKey, GeometryContext, Param, ShapeKind};
use aerovol_geo::{LatLon, PathType};
use aerovol_globe::ElevationSampleCache;
use glam::DVec3;

use crate::airspace::{shift_location, Airspace};
use crate::base::{extreme_points, AirspaceBase};
use crate::error::ParameterError;
use crate::frame::FrameContext;
use crate::geometry::curtain::{curtain_geometry, CurtainProfile, DEFAULT_SPLIT_THRESHOLD};
use crate::render::Renderer;
use crate::shapes::draw_cached;

pub struct Curtain {
    base: AirspaceBase,
    locations: Vec<LatLon>,
    path_type: PathType,
    split_threshold: f64,
}

impl Curtain {
    #[must_use]
    pub fn new(locations: Vec<LatLon>) -> Self {
        Self {
            base: AirspaceBase::new(),
            locations,
            path_type: PathType::GreatCircle,
            split_threshold: DEFAULT_SPLIT_THRESHOLD,
        }
    }

    #[must_use]
    pub fn locations(&self) -> &[LatLon] {
        &self.locations
    }

    pub fn set_locations(&mut self, locations: Vec<LatLon>) -> Result<(), ParameterError> {
        if locations.len() < 2 {
            return Err(ParameterError::TooFewLocations {
                name: "curtain path",
                min: 2,
                got: locations.len(),
            });
        }
        self.locations = locations;
        self.base.invalidate();
        Ok(())
    }

    #[must_use]
    pub fn path_type(&self) -> PathType {
        self.path_type
    }

    pub fn set_path_type(&mut self, path_type: PathType) {
        self.path_type = path_type;
        self.base.invalidate();
    }

    #[must_use]
    pub fn split_threshold(&self) -> f64 {
        self.split_threshold
    }

    pub fn set_split_threshold(&mut self, meters: f64) -> Result<(), ParameterError> {
        if meters <= 0.0 {
            return Err(ParameterError::NotPositive {
                name: "split threshold",
                value: meters,
            });
        }
        self.split_threshold = meters;
        self.base.invalidate();
        Ok(())
    }
}

impl Airspace for Curtain {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Curtain
    }

    fn base(&self) -> &AirspaceBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AirspaceBase {
        &mut self.base
    }

    fn reference_location(&self) -> Option<LatLon> {
        self.locations.first().copied()
    }

    fn compute_minimal_geometry(&mut self, frame: &FrameContext) -> Vec<DVec3> {
        let (altitudes, conforming) = self
            .base
            .effective_altitudes(frame.globe, frame.vertical_exaggeration);
        extreme_points(
            frame.globe,
            frame.vertical_exaggeration,
            &self.locations,
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
        if self.locations.len() < 2 {
            return;
        }
        let ve = frame.vertical_exaggeration;
        let (altitudes, conforming) = self.base.effective_altitudes(frame.globe, ve);
        let token = frame.token();
        let reference_center = frame.globe.point_from(self.locations[0], 0.0);
        let attributes = self.base.active_attributes();
        let mut sampler = ElevationSampleCache::new(frame.globe);

        let params: Vec<Param> = vec![
            self.locations.as_slice().into(),
            (self.path_type == PathType::RhumbLine).into(),
            self.split_threshold.into(),
            altitudes[0].into(),
            altitudes[1].into(),
            conforming[0].into(),
            conforming[1].into(),
            ve.into(),
        ];
        let key = CacheKey::new(self.kind(), "geometry", Some(token), params);
        let profile = CurtainProfile {
            locations: self.locations.clone(),
            path_type: self.path_type,
            altitudes,
            terrain_conforming: conforming,
            split_threshold: self.split_threshold,
        };
        draw_cached(
            ctx,
            renderer,
            key,
            conforming,
            reference_center,
            None,
            attributes,
            || curtain_geometry(&mut sampler, ve, reference_center, &profile),
        );
    }

    fn shift(&mut self, old_reference: LatLon, new_reference: LatLon) {
        for location in &mut self.locations {
            *location = shift_location(old_reference, new_reference, *location);
        }
    }
}
