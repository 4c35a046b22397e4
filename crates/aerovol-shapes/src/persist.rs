//! Serde snapshots of shape configuration. A state captures the defining
//! scalar parameters and the shared base settings; caches, extents, and
//! generated geometry are rebuilt on restore. Mesh resolution settings are
//! deliberately not part of the state.

use aerovol_geo::{Angle, LatLon, PathType};
use serde::{Deserialize, Serialize};

use crate::airspace::Airspace;
use crate::attributes::ShapeAttributes;
use crate::base::{AirspaceBase, AltitudeDatum};
use crate::error::ParameterError;
use crate::geometry::boxgen::CornerAzimuths;
use crate::geometry::elliptical::EllipseRadii;
use crate::shapes::{
    BoxVolume, Cake, CappedCylinder, CappedEllipticalCylinder, Curtain, Orbit, OrbitType,
    PartialCappedCylinder, PolygonAirspace, Route, SphereAirspace, TrackAirspace,
};

/// The base settings every shape carries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaseState {
    pub altitudes: [f64; 2],
    pub datums: [AltitudeDatum; 2],
    pub ground_reference: Option<LatLon>,
    pub attributes: ShapeAttributes,
    pub highlight_attributes: Option<ShapeAttributes>,
    pub highlighted: bool,
    pub visible: bool,
    pub lod_enabled: bool,
}

impl BaseState {
    fn capture(base: &AirspaceBase) -> Self {
        Self {
            altitudes: base.altitudes(),
            datums: base.altitude_datums(),
            ground_reference: base.ground_reference(),
            attributes: *base.attributes(),
            highlight_attributes: base.highlight_attributes(),
            highlighted: base.is_highlighted(),
            visible: base.is_visible(),
            lod_enabled: base.is_lod_enabled(),
        }
    }

    fn apply(&self, base: &mut AirspaceBase) {
        base.set_altitudes(self.altitudes[0], self.altitudes[1]);
        // Datums carry the conformance flags with them.
        base.set_altitude_datum(0, self.datums[0]);
        base.set_altitude_datum(1, self.datums[1]);
        base.set_ground_reference(self.ground_reference);
        base.set_attributes(self.attributes);
        base.set_highlight_attributes(self.highlight_attributes);
        base.set_highlighted(self.highlighted);
        base.set_visible(self.visible);
        base.set_lod_enabled(self.lod_enabled);
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CylinderState {
    pub base: BaseState,
    pub center: LatLon,
    pub inner_radius: f64,
    pub outer_radius: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PartialCylinderState {
    pub base: BaseState,
    pub center: LatLon,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub azimuths: [Angle; 2],
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EllipticalCylinderState {
    pub base: BaseState,
    pub center: LatLon,
    pub inner_radii: EllipseRadii,
    pub outer_radii: EllipseRadii,
    pub heading: Angle,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoxState {
    pub base: BaseState,
    pub begin: LatLon,
    pub end: LatLon,
    pub left_width: f64,
    pub right_width: f64,
    pub corner_azimuths: CornerAzimuths,
    pub enable_start_cap: bool,
    pub enable_end_cap: bool,
    pub enable_center_line: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolygonState {
    pub base: BaseState,
    pub locations: Vec<LatLon>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurtainState {
    pub base: BaseState,
    pub locations: Vec<LatLon>,
    pub path_type: PathType,
    pub split_threshold: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrbitState {
    pub base: BaseState,
    pub begin: LatLon,
    pub end: LatLon,
    pub width: f64,
    pub orbit_type: OrbitType,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SphereState {
    pub base: BaseState,
    pub location: LatLon,
    pub radius: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CakeState {
    pub base: BaseState,
    pub layers: Vec<CylinderState>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackState {
    pub base: BaseState,
    pub legs: Vec<BoxState>,
    pub enable_inner_caps: bool,
    pub enable_center_line: bool,
    pub small_angle_threshold: Angle,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteState {
    pub base: BaseState,
    pub locations: Vec<LatLon>,
    pub width: f64,
}

/// One state per shape kind, for heterogeneous collections.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ShapeState {
    Cylinder(CylinderState),
    PartialCylinder(PartialCylinderState),
    EllipticalCylinder(EllipticalCylinderState),
    Box(BoxState),
    Polygon(PolygonState),
    Curtain(CurtainState),
    Orbit(OrbitState),
    Sphere(SphereState),
    Cake(CakeState),
    Track(TrackState),
    Route(RouteState),
}

impl CappedCylinder {
    #[must_use]
    pub fn state(&self) -> CylinderState {
        let (inner_radius, outer_radius) = self.radii();
        CylinderState {
            base: BaseState::capture(self.base()),
            center: self.center(),
            inner_radius,
            outer_radius,
        }
    }

    pub fn from_state(state: &CylinderState) -> Result<Self, ParameterError> {
        let mut shape = Self::new(state.center, state.outer_radius);
        shape.set_radii(state.inner_radius, state.outer_radius)?;
        state.base.apply(shape.base_mut());
        Ok(shape)
    }
}

impl PartialCappedCylinder {
    #[must_use]
    pub fn state(&self) -> PartialCylinderState {
        let (inner_radius, outer_radius) = self.radii();
        PartialCylinderState {
            base: BaseState::capture(self.base()),
            center: self.center(),
            inner_radius,
            outer_radius,
            azimuths: self.azimuths(),
        }
    }

    pub fn from_state(state: &PartialCylinderState) -> Result<Self, ParameterError> {
        let mut shape = Self::new(state.center, state.outer_radius);
        shape.set_radii(state.inner_radius, state.outer_radius)?;
        shape.set_azimuths(state.azimuths[0], state.azimuths[1]);
        state.base.apply(shape.base_mut());
        Ok(shape)
    }
}

impl CappedEllipticalCylinder {
    #[must_use]
    pub fn state(&self) -> EllipticalCylinderState {
        let (inner_radii, outer_radii) = self.radii();
        EllipticalCylinderState {
            base: BaseState::capture(self.base()),
            center: self.center(),
            inner_radii,
            outer_radii,
            heading: self.heading(),
        }
    }

    pub fn from_state(state: &EllipticalCylinderState) -> Result<Self, ParameterError> {
        let mut shape = Self::new(state.center, state.outer_radii, state.heading);
        shape.set_radii(state.inner_radii, state.outer_radii)?;
        state.base.apply(shape.base_mut());
        Ok(shape)
    }
}

impl BoxVolume {
    #[must_use]
    pub fn state(&self) -> BoxState {
        let (begin, end) = self.locations();
        let (left_width, right_width) = self.widths();
        let (enable_start_cap, enable_end_cap) = self.cap_flags();
        BoxState {
            base: BaseState::capture(self.base()),
            begin,
            end,
            left_width,
            right_width,
            corner_azimuths: self.corner_azimuths(),
            enable_start_cap,
            enable_end_cap,
            enable_center_line: self.enable_center_line(),
        }
    }

    pub fn from_state(state: &BoxState) -> Result<Self, ParameterError> {
        let mut shape = Self::new(state.begin, state.end, 0.0, 0.0);
        shape.set_widths(state.left_width, state.right_width)?;
        shape.set_corner_azimuths(state.corner_azimuths);
        shape.set_enable_start_cap(state.enable_start_cap);
        shape.set_enable_end_cap(state.enable_end_cap);
        shape.set_enable_center_line(state.enable_center_line);
        state.base.apply(shape.base_mut());
        Ok(shape)
    }
}

impl PolygonAirspace {
    #[must_use]
    pub fn state(&self) -> PolygonState {
        PolygonState {
            base: BaseState::capture(self.base()),
            locations: self.locations().to_vec(),
        }
    }

    pub fn from_state(state: &PolygonState) -> Result<Self, ParameterError> {
        let mut shape = Self::new(Vec::new());
        shape.set_locations(state.locations.clone())?;
        state.base.apply(shape.base_mut());
        Ok(shape)
    }
}

impl Curtain {
    #[must_use]
    pub fn state(&self) -> CurtainState {
        CurtainState {
            base: BaseState::capture(self.base()),
            locations: self.locations().to_vec(),
            path_type: self.path_type(),
            split_threshold: self.split_threshold(),
        }
    }

    pub fn from_state(state: &CurtainState) -> Result<Self, ParameterError> {
        let mut shape = Self::new(Vec::new());
        shape.set_locations(state.locations.clone())?;
        shape.set_path_type(state.path_type);
        shape.set_split_threshold(state.split_threshold)?;
        state.base.apply(shape.base_mut());
        Ok(shape)
    }
}

impl Orbit {
    #[must_use]
    pub fn state(&self) -> OrbitState {
        let (begin, end) = self.locations();
        OrbitState {
            base: BaseState::capture(self.base()),
            begin,
            end,
            width: self.width(),
            orbit_type: self.orbit_type(),
        }
    }

    pub fn from_state(state: &OrbitState) -> Result<Self, ParameterError> {
        let mut shape = Self::new(state.begin, state.end, state.width, state.orbit_type);
        shape.set_width(state.width)?;
        state.base.apply(shape.base_mut());
        Ok(shape)
    }
}

impl SphereAirspace {
    #[must_use]
    pub fn state(&self) -> SphereState {
        SphereState {
            base: BaseState::capture(self.base()),
            location: self.location(),
            radius: self.radius(),
        }
    }

    pub fn from_state(state: &SphereState) -> Result<Self, ParameterError> {
        let mut shape = Self::new(state.location, state.radius);
        shape.set_radius(state.radius)?;
        state.base.apply(shape.base_mut());
        Ok(shape)
    }
}

impl Cake {
    #[must_use]
    pub fn state(&self) -> CakeState {
        CakeState {
            base: BaseState::capture(self.base()),
            layers: self.layers().iter().map(CappedCylinder::state).collect(),
        }
    }

    pub fn from_state(state: &CakeState) -> Result<Self, ParameterError> {
        let mut shape = Self::new();
        state.base.apply(shape.base_mut());
        for layer in &state.layers {
            shape.add_layer(CappedCylinder::from_state(layer)?);
        }
        Ok(shape)
    }
}

impl TrackAirspace {
    #[must_use]
    pub fn state(&self) -> TrackState {
        TrackState {
            base: BaseState::capture(self.base()),
            legs: self.legs().iter().map(BoxVolume::state).collect(),
            enable_inner_caps: self.enable_inner_caps(),
            enable_center_line: self.enable_center_line(),
            small_angle_threshold: self.small_angle_threshold(),
        }
    }

    pub fn from_state(state: &TrackState) -> Result<Self, ParameterError> {
        let mut shape = Self::new();
        state.base.apply(shape.base_mut());
        shape.set_enable_inner_caps(state.enable_inner_caps);
        shape.set_small_angle_threshold(state.small_angle_threshold);
        for leg in &state.legs {
            shape.add_leg(BoxVolume::from_state(leg)?);
        }
        // After the legs, so it reaches them all.
        shape.set_enable_center_line(state.enable_center_line);
        Ok(shape)
    }
}

impl Route {
    #[must_use]
    pub fn state(&self) -> RouteState {
        RouteState {
            base: BaseState::capture(self.base()),
            locations: self.locations().to_vec(),
            width: self.width(),
        }
    }

    pub fn from_state(state: &RouteState) -> Result<Self, ParameterError> {
        let mut shape = Self::new();
        state.base.apply(shape.base_mut());
        shape.set_width(state.width)?;
        shape.set_locations(state.locations.clone())?;
        Ok(shape)
    }
}
