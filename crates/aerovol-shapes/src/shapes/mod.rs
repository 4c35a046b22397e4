//! The concrete airspace shapes. Each one owns an [`AirspaceBase`], its
//! defining parameters, and a render path that caches generated geometry
//! per part under labeled keys.

use aerovol_cache::{CacheKey, GeometryBuffer, GeometryContext};
use aerovol_geo::{Aabb, BoundingCylinder, Extent};
use aerovol_lod::{screen_size_ramp, DetailLevel, DetailLevels, DetailParams};
use glam::DVec3;
use tracing::warn;

use crate::airspace::expiry_for;
use crate::attributes::ShapeAttributes;
use crate::error::GenerationError;
use crate::render::{draw_buffer, Renderer, UniformTransform};

mod boxshape;
mod cake;
mod curtain;
mod cylinder;
mod elliptical;
mod orbit;
mod partial;
mod polygon;
mod route;
mod sphere;
mod track;

pub use boxshape::BoxVolume;
pub use cake::Cake;
pub use curtain::Curtain;
pub use cylinder::CappedCylinder;
pub use elliptical::CappedEllipticalCylinder;
pub use orbit::{Orbit, OrbitType};
pub use partial::PartialCappedCylinder;
pub use polygon::PolygonAirspace;
pub use route::Route;
pub use sphere::SphereAirspace;
pub use track::TrackAirspace;

/// Generate-if-missing, then draw. One cache entry per shape part; a failed
/// generation logs and draws nothing, leaving the cache untouched.
#[allow(clippy::too_many_arguments)]
pub(crate) fn draw_cached<F>(
    ctx: &mut GeometryContext,
    renderer: &mut dyn Renderer,
    key: CacheKey,
    conforming: [bool; 2],
    reference_center: DVec3,
    transform: Option<UniformTransform>,
    attributes: ShapeAttributes,
    generate: F,
) where
    F: FnOnce() -> Result<GeometryBuffer, GenerationError>,
{
    let now = ctx.now();
    if !ctx.cache.contains_valid(&key, now) {
        match generate() {
            Ok(buffer) => {
                let expiry = expiry_for(ctx, conforming);
                ctx.cache.put(key.clone(), buffer, expiry);
            }
            Err(error) => {
                warn!(%error, label = key.label(), "geometry generation failed");
                return;
            }
        }
    }
    if let Some(buffer) = ctx.cache.get(&key, now) {
        draw_buffer(renderer, buffer, reference_center, transform, attributes);
    }
}

/// Fit a bounding cylinder along `axis` (through the model origin) around a
/// point set. Falls back to an axis-aligned box when the points have no
/// spread along the axis or no radius around it.
pub(crate) fn cylinder_fit(axis: DVec3, points: &[DVec3]) -> Option<Extent> {
    if points.is_empty() {
        return None;
    }
    let mut t_min = f64::MAX;
    let mut t_max = f64::MIN;
    let mut radius = 0.0f64;
    for p in points {
        let t = p.dot(axis);
        t_min = t_min.min(t);
        t_max = t_max.max(t);
        radius = radius.max((*p - axis * t).length());
    }
    if t_max > t_min && radius > 0.0 {
        Some(Extent::Cylinder(BoundingCylinder {
            bottom: axis * t_min,
            top: axis * t_max,
            radius,
        }))
    } else {
        Aabb::from_points(points).map(Extent::Aabb)
    }
}

/// Five-step detail ramp over the default screen-size window. `params_at`
/// receives the level index, 0 = coarsest (selected at the smallest screen
/// sizes).
pub(crate) fn detail_ramp<F>(params_at: F) -> DetailLevels
where
    F: Fn(usize) -> DetailParams,
{
    let levels = screen_size_ramp(5)
        .into_iter()
        .enumerate()
        .map(|(i, screen_size)| DetailLevel {
            screen_size,
            params: params_at(i),
        })
        .collect();
    DetailLevels::new(levels)
}
