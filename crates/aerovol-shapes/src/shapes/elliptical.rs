//! A vertical elliptical cylinder (or elliptical annulus) capped at both
//! altitude surfaces. The major axis lies along the heading.

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
use crate::geometry::elliptical::{
    ellipse_location, elliptical_disk_geometry, elliptical_wall_geometry, EllipseRadii,
    EllipticalDiskProfile, EllipticalWallProfile,
};
use crate::geometry::Orientation;
use crate::render::Renderer;
use crate::shapes::{cylinder_fit, detail_ramp, draw_cached};

pub const DEFAULT_SLICES: u32 = 32;
pub const DEFAULT_STACKS: u32 = 1;
pub const DEFAULT_LOOPS: u32 = 8;

const MINIMAL_SLICES: u32 = 8;
const MINIMAL_LOOPS: u32 = 4;

const RAMP_SLICES: [u32; 5] = [8, 14, 20, 26, 32];
const RAMP_LOOPS: [u32; 5] = [1, 2, 4, 6, 8];

pub struct CappedEllipticalCylinder {
    base: AirspaceBase,
    center: LatLon,
    inner_radii: EllipseRadii,
    outer_radii: EllipseRadii,
    heading: Angle,
    slices: u32,
    stacks: u32,
    loops: u32,
}

impl CappedEllipticalCylinder {
    #[must_use]
    pub fn new(center: LatLon, outer_radii: EllipseRadii, heading: Angle) -> Self {
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
            inner_radii: EllipseRadii::ZERO,
            outer_radii,
            heading,
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

    /// The inner and outer semi-axis pairs, in that order.
    #[must_use]
    pub fn radii(&self) -> (EllipseRadii, EllipseRadii) {
        (self.inner_radii, self.outer_radii)
    }

    pub fn set_radii(
        &mut self,
        inner: EllipseRadii,
        outer: EllipseRadii,
    ) -> Result<(), ParameterError> {
        if inner.minor < 0.0 {
            return Err(ParameterError::Negative {
                name: "inner minor radius",
                value: inner.minor,
            });
        }
        if inner.major < 0.0 {
            return Err(ParameterError::Negative {
                name: "inner major radius",
                value: inner.major,
            });
        }
        if outer.minor <= 0.0 {
            return Err(ParameterError::NotPositive {
                name: "outer minor radius",
                value: outer.minor,
            });
        }
        if outer.major <= 0.0 {
            return Err(ParameterError::NotPositive {
                name: "outer major radius",
                value: outer.major,
            });
        }
        if inner.minor > outer.minor {
            return Err(ParameterError::RadiusOrder {
                inner: inner.minor,
                outer: outer.minor,
            });
        }
        if inner.major > outer.major {
            return Err(ParameterError::RadiusOrder {
                inner: inner.major,
                outer: outer.major,
            });
        }
        self.inner_radii = inner;
        self.outer_radii = outer;
        self.base.invalidate();
        Ok(())
    }

    #[must_use]
    pub fn heading(&self) -> Angle {
        self.heading
    }

    pub fn set_heading(&mut self, heading: Angle) {
        self.heading = heading;
        self.base.invalidate();
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

    fn has_inner_wall(&self) -> bool {
        self.inner_radii.minor > 0.0 && self.inner_radii.major > 0.0
    }

    /// Coarse elliptical disk of sample locations under the footprint.
    fn minimal_locations(&self, globe_radius: f64) -> Vec<LatLon> {
        let mut locations = Vec::with_capacity((MINIMAL_SLICES * MINIMAL_LOOPS + 1) as usize);
        locations.push(self.center);
        for ring in 1..=MINIMAL_LOOPS {
            let f = f64::from(ring) / f64::from(MINIMAL_LOOPS);
            let radii = EllipseRadii {
                minor: self.outer_radii.minor * f,
                major: self.outer_radii.major * f,
            };
            for slice in 0..MINIMAL_SLICES {
                let t = TAU * f64::from(slice) / f64::from(MINIMAL_SLICES);
                locations.push(ellipse_location(
                    self.center,
                    self.heading,
                    radii,
                    t,
                    globe_radius,
                ));
            }
        }
        locations
    }
}

impl Airspace for CappedEllipticalCylinder {
    fn kind(&self) -> ShapeKind {
        ShapeKind::EllipticalCylinder
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
        let token = frame.token();
        let reference_center = frame.globe.point_from(self.center, 0.0);
        let attributes = self.base.active_attributes();
        let mut sampler = ElevationSampleCache::new(frame.globe);

        let params: Vec<Param> = vec![
            self.center.into(),
            self.inner_radii.minor.into(),
            self.inner_radii.major.into(),
            self.outer_radii.minor.into(),
            self.outer_radii.major.into(),
            self.heading.radians().into(),
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
                    elliptical_wall_geometry(
                        &mut sampler,
                        ve,
                        reference_center,
                        &EllipticalWallProfile {
                            center: self.center,
                            radii: self.outer_radii,
                            heading: self.heading,
                            altitudes,
                            terrain_conforming: conforming,
                            slices,
                            stacks,
                            orientation: Orientation::Outward,
                        },
                    )
                },
            );
            if self.has_inner_wall() {
                draw_cached(
                    ctx,
                    renderer,
                    key("wall.inner"),
                    conforming,
                    reference_center,
                    None,
                    attributes,
                    || {
                        elliptical_wall_geometry(
                            &mut sampler,
                            ve,
                            reference_center,
                            &EllipticalWallProfile {
                                center: self.center,
                                radii: self.inner_radii,
                                heading: self.heading,
                                altitudes,
                                terrain_conforming: conforming,
                                slices,
                                stacks,
                                orientation: Orientation::Inward,
                            },
                        )
                    },
                );
            }
        }

        if self.outer_radii.minor > self.inner_radii.minor
            || self.outer_radii.major > self.inner_radii.major
        {
            draw_cached(
                ctx,
                renderer,
                key("cap.top"),
                conforming,
                reference_center,
                None,
                attributes,
                || {
                    elliptical_disk_geometry(
                        &mut sampler,
                        ve,
                        reference_center,
                        &EllipticalDiskProfile {
                            center: self.center,
                            inner_radii: self.inner_radii,
                            outer_radii: self.outer_radii,
                            heading: self.heading,
                            altitude: altitudes[1],
                            terrain_conforming: conforming[1],
                            slices,
                            loops,
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
                        elliptical_disk_geometry(
                            &mut sampler,
                            ve,
                            reference_center,
                            &EllipticalDiskProfile {
                                center: self.center,
                                inner_radii: self.inner_radii,
                                outer_radii: self.outer_radii,
                                heading: self.heading,
                                altitude: altitudes[0],
                                terrain_conforming: conforming[0],
                                slices,
                                loops,
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
