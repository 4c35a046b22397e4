//! Elliptical sweeps around a center location: the wall and caps of a capped
//! elliptical cylinder. Columns sample the ellipse at uniform parametric
//! angle and are placed at the resulting polar azimuth and radius, so the
//! ring stays a true ellipse with the major axis along the heading.

use aerovol_cache::{GeometryBuffer, StreamRole, Topology};
use aerovol_geo::{Angle, LatLon};
use aerovol_globe::ElevationSampleCache;
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::error::GenerationError;
use crate::geometry::{
    grid_fill_indices, grid_outline_indices, ridge_normal, surface_point, winding_for,
    Orientation, VertexData,
};

/// Ellipse semi-axes, meters. The major axis lies along the heading, the
/// minor axis perpendicular to it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EllipseRadii {
    pub minor: f64,
    pub major: f64,
}

impl EllipseRadii {
    pub const ZERO: EllipseRadii = EllipseRadii {
        minor: 0.0,
        major: 0.0,
    };

    /// Ellipse point at parametric angle `t` from the major axis, as a polar
    /// offset: (angle from the heading, radius in meters).
    fn polar_at(self, t: f64) -> (f64, f64) {
        let x = self.major * t.cos();
        let y = self.minor * t.sin();
        (y.atan2(x), x.hypot(y))
    }
}

/// Location on the ellipse around `center` at parametric angle `t`.
pub(crate) fn ellipse_location(
    center: LatLon,
    heading: Angle,
    radii: EllipseRadii,
    t: f64,
    globe_radius: f64,
) -> LatLon {
    let (polar, radius) = radii.polar_at(t);
    let azimuth = heading + Angle::from_radians(polar);
    center.great_circle_endpoint(azimuth, radius / globe_radius)
}

/// Parameters of an elliptical cylinder wall between two surfaces.
#[derive(Clone, Debug)]
pub struct EllipticalWallProfile {
    pub center: LatLon,
    pub radii: EllipseRadii,
    pub heading: Angle,
    pub altitudes: [f64; 2],
    pub terrain_conforming: [bool; 2],
    pub slices: u32,
    pub stacks: u32,
    pub orientation: Orientation,
}

/// Parameters of a horizontal elliptical disk or annulus.
#[derive(Clone, Debug)]
pub struct EllipticalDiskProfile {
    pub center: LatLon,
    pub inner_radii: EllipseRadii,
    pub outer_radii: EllipseRadii,
    pub heading: Angle,
    pub altitude: f64,
    pub terrain_conforming: bool,
    pub slices: u32,
    pub loops: u32,
    pub orientation: Orientation,
}

/// Generate an elliptical wall: `slices+1` columns around the ellipse by
/// `stacks+1` rows between the two surfaces, with fill and outline streams.
pub fn elliptical_wall_geometry(
    sampler: &mut ElevationSampleCache<'_>,
    vertical_exaggeration: f64,
    reference_center: DVec3,
    profile: &EllipticalWallProfile,
) -> Result<GeometryBuffer, GenerationError> {
    if profile.radii.minor <= 0.0 || profile.radii.major <= 0.0 {
        return Err(GenerationError::Degenerate("elliptical wall radii"));
    }
    let globe_radius = sampler.globe().equatorial_radius();
    let cols = profile.slices.max(1) + 1;
    let rows = profile.stacks.max(1) + 1;

    // Ring data per column; rows share the column's location and normal.
    let mut ring = Vec::with_capacity(cols as usize);
    for col in 0..cols {
        let t = TAU * f64::from(col) / f64::from(cols - 1);
        let location = ellipse_location(
            profile.center,
            profile.heading,
            profile.radii,
            t,
            globe_radius,
        );
        let mut altitudes = profile.altitudes;
        for surface in 0..2 {
            if profile.terrain_conforming[surface] {
                altitudes[surface] += vertical_exaggeration * sampler.elevation(location);
            }
        }
        ring.push((location, altitudes));
    }

    let mut vertices = VertexData::with_capacity((cols * rows) as usize);
    for row in 0..rows {
        let f = f64::from(row) / f64::from(rows - 1);
        for (col, &(location, altitudes)) in ring.iter().enumerate() {
            let globe = sampler.globe();
            let up = globe.surface_normal(location);
            // The last column repeats the first, so its successor is column 1.
            let next = if col + 1 < ring.len() { col + 1 } else { 1 };
            // Columns advance clockwise seen from above; the backward chord
            // makes the ridge normal face away from the center.
            let chord =
                globe.point_from(location, 0.0) - globe.point_from(ring[next].0, 0.0);
            let normal = ridge_normal(up, chord, profile.orientation);
            let altitude = altitudes[0] + f * (altitudes[1] - altitudes[0]);
            vertices.push(globe.point_from(location, altitude) - reference_center, normal);
        }
    }

    let p = |i: u32| {
        DVec3::new(
            f64::from(vertices.positions[i as usize * 3]),
            f64::from(vertices.positions[i as usize * 3 + 1]),
            f64::from(vertices.positions[i as usize * 3 + 2]),
        )
    };
    let n0 = DVec3::new(
        f64::from(vertices.normals[0]),
        f64::from(vertices.normals[1]),
        f64::from(vertices.normals[2]),
    );
    let winding = winding_for(p(0), p(1), p(cols), n0);

    let mut buffer = GeometryBuffer::new(vertices.positions, vertices.normals);
    buffer.push_stream(
        Topology::Triangles,
        StreamRole::Fill,
        grid_fill_indices(cols, rows, winding),
    );
    buffer.push_stream(
        Topology::Lines,
        StreamRole::Outline,
        grid_outline_indices(cols, rows),
    );
    Ok(buffer)
}

/// Generate an elliptical disk or annulus at one altitude. Rings interpolate
/// each semi-axis from the inner to the outer radii. Degenerate when both
/// axes coincide; callers skip the cap instead.
pub fn elliptical_disk_geometry(
    sampler: &mut ElevationSampleCache<'_>,
    vertical_exaggeration: f64,
    reference_center: DVec3,
    profile: &EllipticalDiskProfile,
) -> Result<GeometryBuffer, GenerationError> {
    if profile.outer_radii.minor <= profile.inner_radii.minor
        && profile.outer_radii.major <= profile.inner_radii.major
    {
        return Err(GenerationError::Degenerate("elliptical disk radii"));
    }
    let globe_radius = sampler.globe().equatorial_radius();
    let cols = profile.slices.max(1) + 1;
    let rows = profile.loops.max(1) + 1;

    let mut vertices = VertexData::with_capacity((cols * rows) as usize);
    for row in 0..rows {
        let f = f64::from(row) / f64::from(rows - 1);
        let radii = EllipseRadii {
            minor: profile.inner_radii.minor
                + f * (profile.outer_radii.minor - profile.inner_radii.minor),
            major: profile.inner_radii.major
                + f * (profile.outer_radii.major - profile.inner_radii.major),
        };
        for col in 0..cols {
            let t = TAU * f64::from(col) / f64::from(cols - 1);
            let location =
                ellipse_location(profile.center, profile.heading, radii, t, globe_radius);
            let point = surface_point(
                sampler,
                vertical_exaggeration,
                location,
                profile.altitude,
                profile.terrain_conforming,
            ) - reference_center;
            let normal =
                sampler.globe().surface_normal(location) * profile.orientation.normal_sign();
            vertices.push(point, normal);
        }
    }

    let mut buffer = GeometryBuffer::new(vertices.positions, vertices.normals);
    buffer.push_stream(
        Topology::Triangles,
        StreamRole::Fill,
        grid_fill_indices(cols, rows, profile.orientation),
    );
    // Outline: outer rim, plus the inner rim of an annulus.
    let mut outline = Vec::new();
    let outer = (rows - 1) * cols;
    for col in 0..cols - 1 {
        outline.extend_from_slice(&[outer + col, outer + col + 1]);
    }
    if profile.inner_radii.minor > 0.0 || profile.inner_radii.major > 0.0 {
        for col in 0..cols - 1 {
            outline.extend_from_slice(&[col, col + 1]);
        }
    }
    buffer.push_stream(Topology::Lines, StreamRole::Outline, outline);
    Ok(buffer)
}
