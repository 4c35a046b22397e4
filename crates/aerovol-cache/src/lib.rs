//! Geometry caching for airspace volumes: the shared vertex/index buffer
//! type, structural cache keys, a byte-bounded LRU mesh cache, and the
//! expiry policy that forces terrain-conforming meshes to refresh.

pub mod buffer;
pub mod context;
pub mod expiry;
pub mod key;
pub mod mesh_cache;

pub use buffer::{ElementStream, GeometryBuffer, StreamRole, Topology};
pub use context::GeometryContext;
pub use expiry::{Expiry, ExpiryJitter};
pub use key::{CacheKey, Param, ShapeKind};
pub use mesh_cache::MeshCache;
