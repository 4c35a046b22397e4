//! Rotational surfaces around a center location: cylinder walls, disks
//! (full or annular), and the radial end walls of partial cylinders. All
//! vertex placement is closed-form great-circle offsetting from the center;
//! an azimuth span of `None` closes the surface into a full ring.

use aerovol_cache::{GeometryBuffer, StreamRole, Topology};
use aerovol_geo::{Angle, LatLon};
use aerovol_globe::ElevationSampleCache;
use glam::DVec3;
use std::f64::consts::TAU;

use crate::error::GenerationError;
use crate::geometry::{
    grid_fill_indices, grid_outline_indices, surface_point, Orientation, VertexData,
};

/// Parameters of a cylinder wall between two surfaces.
#[derive(Clone, Debug)]
pub struct WallProfile {
    pub center: LatLon,
    /// Wall radius, meters.
    pub radius: f64,
    pub altitudes: [f64; 2],
    pub terrain_conforming: [bool; 2],
    /// Columns around the arc.
    pub slices: u32,
    /// Vertical subdivisions.
    pub stacks: u32,
    /// Azimuth range `(left, right)`; `None` or a zero sweep closes the
    /// full circle.
    pub span: Option<(Angle, Angle)>,
    pub orientation: Orientation,
}

/// Parameters of a horizontal disk or annulus.
#[derive(Clone, Debug)]
pub struct DiskProfile {
    pub center: LatLon,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub altitude: f64,
    pub terrain_conforming: bool,
    pub slices: u32,
    /// Radial subdivisions between the inner and outer radius.
    pub loops: u32,
    pub span: Option<(Angle, Angle)>,
    /// `Outward` faces up (top cap), `Inward` faces down (bottom cap).
    pub orientation: Orientation,
}

/// Parameters of the flat radial wall closing one azimuth end of a partial
/// cylinder.
#[derive(Clone, Debug)]
pub struct RadialWallProfile {
    pub center: LatLon,
    /// Azimuth of the wall plane from the center.
    pub azimuth: Angle,
    /// Azimuth the wall's outward normal points toward.
    pub normal_azimuth: Angle,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub altitudes: [f64; 2],
    pub terrain_conforming: [bool; 2],
    /// Radial subdivisions.
    pub loops: u32,
    /// Vertical subdivisions.
    pub stacks: u32,
}

/// Start azimuth and sweep of a span. Equal endpoints mean the full circle.
fn span_range(span: Option<(Angle, Angle)>) -> (f64, f64) {
    match span {
        None => (0.0, TAU),
        Some((left, right)) => {
            let start = left.normalized_azimuth().radians();
            let sweep = (right - left).normalized_azimuth().radians();
            if sweep == 0.0 {
                (start, TAU)
            } else {
                (start, sweep)
            }
        }
    }
}

/// Generate a cylinder wall: grid of `slices+1` columns around the arc by
/// `stacks+1` rows between the two surfaces, with fill and outline streams.
pub fn wall_geometry(
    sampler: &mut ElevationSampleCache<'_>,
    vertical_exaggeration: f64,
    reference_center: DVec3,
    profile: &WallProfile,
) -> Result<GeometryBuffer, GenerationError> {
    if profile.radius <= 0.0 {
        return Err(GenerationError::Degenerate("cylinder wall radius"));
    }
    let globe = sampler.globe();
    let arc_radius = profile.radius / globe.equatorial_radius();
    let (start, sweep) = span_range(profile.span);
    let cols = profile.slices.max(1) + 1;
    let rows = profile.stacks.max(1) + 1;

    let center_surface = globe.point_from(profile.center, 0.0);
    let mut vertices = VertexData::with_capacity((cols * rows) as usize);
    for col in 0..cols {
        let azimuth = Angle::from_radians(start + sweep * f64::from(col) / f64::from(cols - 1));
        let location = profile.center.great_circle_endpoint(azimuth, arc_radius);
        let up = globe.surface_normal(location);
        let radial = globe.point_from(location, 0.0) - center_surface;
        let horizontal = radial - up * radial.dot(up);
        let normal = if horizontal.length_squared() > 0.0 {
            horizontal.normalize() * profile.orientation.normal_sign()
        } else {
            up
        };

        let mut altitudes = profile.altitudes;
        for surface in 0..2 {
            if profile.terrain_conforming[surface] {
                altitudes[surface] += vertical_exaggeration * sampler.elevation(location);
            }
        }
        for row in 0..rows {
            let t = f64::from(row) / f64::from(rows - 1);
            let altitude = altitudes[0] + t * (altitudes[1] - altitudes[0]);
            let point = sampler.globe().point_from(location, altitude) - reference_center;
            vertices.push(point, normal);
        }
    }

    // Vertices above are column-major; re-express as a row-major grid for
    // the shared index helpers by swapping the roles of cols and rows.
    let mut buffer = column_major_buffer(vertices, cols, rows);
    // Columns advance clockwise seen from above, so the outward pattern on
    // this layout is the helper's inward one.
    let winding = match profile.orientation {
        Orientation::Outward => Orientation::Inward,
        Orientation::Inward => Orientation::Outward,
    };
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

/// Generate a disk or annulus at one altitude. The grid runs `loops+1` rings
/// from the inner to the outer radius, `slices+1` columns around the arc.
/// Degenerate when the radii coincide; callers skip the cap instead.
pub fn disk_geometry(
    sampler: &mut ElevationSampleCache<'_>,
    vertical_exaggeration: f64,
    reference_center: DVec3,
    profile: &DiskProfile,
) -> Result<GeometryBuffer, GenerationError> {
    if profile.outer_radius <= profile.inner_radius {
        return Err(GenerationError::Degenerate("disk radii"));
    }
    let globe = sampler.globe();
    let globe_radius = globe.equatorial_radius();
    let (start, sweep) = span_range(profile.span);
    let cols = profile.slices.max(1) + 1;
    let rows = profile.loops.max(1) + 1;

    let mut vertices = VertexData::with_capacity((cols * rows) as usize);
    for row in 0..rows {
        let f = f64::from(row) / f64::from(rows - 1);
        let radius = profile.inner_radius + f * (profile.outer_radius - profile.inner_radius);
        let arc_radius = radius / globe_radius;
        for col in 0..cols {
            let azimuth =
                Angle::from_radians(start + sweep * f64::from(col) / f64::from(cols - 1));
            let location = profile.center.great_circle_endpoint(azimuth, arc_radius);
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
    if profile.inner_radius > 0.0 {
        for col in 0..cols - 1 {
            outline.extend_from_slice(&[col, col + 1]);
        }
    }
    buffer.push_stream(Topology::Lines, StreamRole::Outline, outline);
    Ok(buffer)
}

/// Generate the flat wall closing one azimuth end of a partial cylinder or
/// annulus wedge.
pub fn radial_wall_geometry(
    sampler: &mut ElevationSampleCache<'_>,
    vertical_exaggeration: f64,
    reference_center: DVec3,
    profile: &RadialWallProfile,
) -> Result<GeometryBuffer, GenerationError> {
    if profile.outer_radius <= profile.inner_radius {
        return Err(GenerationError::Degenerate("radial wall radii"));
    }
    let globe = sampler.globe();
    let globe_radius = globe.equatorial_radius();
    let cols = profile.loops.max(1) + 1;
    let rows = profile.stacks.max(1) + 1;

    // One flat normal for the whole wall, from the center toward the
    // normal azimuth.
    let center_point = globe.point_from(profile.center, 0.0);
    let offset = profile
        .center
        .great_circle_endpoint(profile.normal_azimuth, 1e-4);
    let normal = (globe.point_from(offset, 0.0) - center_point).normalize();

    let mut vertices = VertexData::with_capacity((cols * rows) as usize);
    for row in 0..rows {
        for col in 0..cols {
            let f = f64::from(col) / f64::from(cols - 1);
            let radius = profile.inner_radius + f * (profile.outer_radius - profile.inner_radius);
            let location = profile
                .center
                .great_circle_endpoint(profile.azimuth, radius / globe_radius);
            let mut altitudes = profile.altitudes;
            for surface in 0..2 {
                if profile.terrain_conforming[surface] {
                    altitudes[surface] += vertical_exaggeration * sampler.elevation(location);
                }
            }
            let t = f64::from(row) / f64::from(rows - 1);
            let altitude = altitudes[0] + t * (altitudes[1] - altitudes[0]);
            let point = sampler.globe().point_from(location, altitude) - reference_center;
            vertices.push(point, normal);
        }
    }

    // Pick the winding that agrees with the wall normal.
    let positions = &vertices.positions;
    let p = |i: usize| {
        DVec3::new(
            f64::from(positions[i * 3]),
            f64::from(positions[i * 3 + 1]),
            f64::from(positions[i * 3 + 2]),
        )
    };
    let e1 = p(1) - p(0);
    let e2 = p(cols as usize + 1) - p(0);
    let winding = if e1.cross(e2).dot(normal) >= 0.0 {
        Orientation::Outward
    } else {
        Orientation::Inward
    };

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

/// Repack column-major vertex data (inner loop over rows) into a row-major
/// [`GeometryBuffer`] compatible with the grid index helpers.
fn column_major_buffer(vertices: VertexData, cols: u32, rows: u32) -> GeometryBuffer {
    let mut positions = vec![0.0f32; vertices.positions.len()];
    let mut normals = vec![0.0f32; vertices.normals.len()];
    for col in 0..cols as usize {
        for row in 0..rows as usize {
            let src = col * rows as usize + row;
            let dst = row * cols as usize + col;
            for k in 0..3 {
                positions[dst * 3 + k] = vertices.positions[src * 3 + k];
                normals[dst * 3 + k] = vertices.normals[src * 3 + k];
            }
        }
    }
    GeometryBuffer::new(positions, normals)
}
