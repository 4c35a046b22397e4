//! Airspace volumes: procedurally generated 3-D shapes standing on a globe,
//! with cached geometry, adaptive level of detail, and terrain conformance.
//!
//! The crate is organized around one `Airspace` trait implemented by every
//! primitive shape and container, a family of pure geometry generators in
//! [`geometry`], and the frame/render contracts that keep the library free of
//! graphics-API calls.

pub mod airspace;
pub mod attributes;
pub mod base;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod persist;
pub mod render;
pub mod shapes;

#[cfg(test)]
pub(crate) mod test_util;

pub use airspace::Airspace;
pub use attributes::ShapeAttributes;
pub use base::{AirspaceBase, AltitudeDatum, ShapeInfo};
pub use error::{GenerationError, ParameterError};
pub use frame::FrameContext;
pub use geometry::elliptical::EllipseRadii;
pub use persist::ShapeState;
pub use render::{DrawCall, Renderer, UniformTransform};
pub use shapes::{
    BoxVolume, Cake, CappedCylinder, CappedEllipticalCylinder, Curtain, Orbit, OrbitType,
    PartialCappedCylinder, PolygonAirspace, Route, SphereAirspace, TrackAirspace,
};
