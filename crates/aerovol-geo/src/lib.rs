//! Geographic and geometric primitives shared by the airspace-volume crates:
//! angles, great-circle and rhumb-line math on the sphere, bounding volumes,
//! and the view frustum used for extent culling.

pub mod angle;
pub mod bounds;
pub mod frustum;
pub mod latlon;

pub use angle::Angle;
pub use bounds::{Aabb, BoundingCylinder, Extent};
pub use frustum::{Frustum, Plane};
pub use latlon::{LatLon, PathType};
