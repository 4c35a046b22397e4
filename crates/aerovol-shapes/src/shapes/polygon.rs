//! An extruded polygon over an arbitrary boundary. A boundary the
//! tessellator cannot handle (self-intersecting, collinear) degrades the
//! shape to empty geometry instead of failing every frame.

use aerovol_cache::{CacheKey, GeometryContext, Param, ShapeKind};
use aerovol_geo::LatLon;
use aerovol_globe::ElevationSampleCache;
use aerovol_lod::DetailParams;
use glam::DVec3;
use tracing::warn;

use crate::airspace::{expiry_for, shift_location, Airspace};
use crate::base::{extreme_points, AirspaceBase};
use crate::error::ParameterError;
use crate::frame::FrameContext;
use crate::geometry::polygon::{polygon_geometry, PolygonProfile};
use crate::render::{draw_buffer, Renderer};
use crate::shapes::detail_ramp;

pub const DEFAULT_SUBDIVISIONS: u32 = 3;

const RAMP_SUBDIVISIONS: [u32; 5] = [1, 1, 2, 2, 3];

pub struct PolygonAirspace {
    base: AirspaceBase,
    locations: Vec<LatLon>,
    subdivisions: u32,
}

impl PolygonAirspace {
    #[must_use]
    pub fn new(locations: Vec<LatLon>) -> Self {
        let mut base = AirspaceBase::new();
        base.set_detail_levels(detail_ramp(|i| DetailParams {
            subdivisions: Some(RAMP_SUBDIVISIONS[i]),
            disable_terrain_conformance: i == 0,
            ..DetailParams::default()
        }));
        Self {
            base,
            locations,
            subdivisions: DEFAULT_SUBDIVISIONS,
        }
    }

    #[must_use]
    pub fn locations(&self) -> &[LatLon] {
        &self.locations
    }

    pub fn set_locations(&mut self, locations: Vec<LatLon>) -> Result<(), ParameterError> {
        if locations.len() < 3 {
            return Err(ParameterError::TooFewLocations {
                name: "polygon boundary",
                min: 3,
                got: locations.len(),
            });
        }
        self.locations = locations;
        self.base.invalidate();
        Ok(())
    }

    pub fn set_subdivisions(&mut self, subdivisions: u32) {
        self.subdivisions = subdivisions;
    }
}

impl Airspace for PolygonAirspace {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Polygon
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
        if self.locations.len() < 3 {
            return;
        }
        let mut subdivisions = self.subdivisions;
        let mut drop_conformance = false;
        if let Some(level) = self.detail_level(frame) {
            if let Some(s) = level.params.subdivisions {
                subdivisions = s;
            }
            drop_conformance = level.params.disable_terrain_conformance;
        }

        let ve = frame.vertical_exaggeration;
        let (altitudes, mut conforming) = self.base.effective_altitudes(frame.globe, ve);
        if drop_conformance {
            conforming = [false, false];
        }
        let collapsed = altitudes[0] == altitudes[1] && conforming[0] == conforming[1];
        let token = frame.token();
        let reference_center = frame.globe.point_from(self.locations[0], 0.0);
        let attributes = self.base.active_attributes();
        let mut sampler = ElevationSampleCache::new(frame.globe);

        let params: Vec<Param> = vec![
            self.locations.as_slice().into(),
            altitudes[0].into(),
            altitudes[1].into(),
            conforming[0].into(),
            conforming[1].into(),
            ve.into(),
            i64::from(subdivisions).into(),
            collapsed.into(),
        ];
        let key = CacheKey::new(self.kind(), "geometry", Some(token), params);

        let now = ctx.now();
        if !ctx.cache.contains_valid(&key, now) {
            let profile = PolygonProfile {
                locations: self.locations.clone(),
                altitudes,
                terrain_conforming: conforming,
                subdivisions,
                edge_flags: Vec::new(),
                collapsed,
            };
            match polygon_geometry(&mut sampler, ve, reference_center, &profile) {
                Ok(buffer) => {
                    let expiry = expiry_for(ctx, conforming);
                    ctx.cache.put(key.clone(), buffer, expiry);
                }
                Err(error) => {
                    // The boundary itself is bad; retrying cannot help.
                    warn!(%error, "polygon boundary rejected, degrading to empty geometry");
                    self.locations.clear();
                    self.base.invalidate();
                    return;
                }
            }
        }
        if let Some(buffer) = ctx.cache.get(&key, now) {
            draw_buffer(renderer, buffer, reference_center, None, attributes);
        }
    }

    fn shift(&mut self, old_reference: LatLon, new_reference: LatLon) {
        for location in &mut self.locations {
            *location = shift_location(old_reference, new_reference, *location);
        }
    }
}
