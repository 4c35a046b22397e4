//! The polygon generator: an arbitrary simple boundary extruded between two
//! altitude surfaces. The boundary is flattened into a tangent plane at its
//! centroid, ear-clipped there, refined by midpoint subdivision so large
//! caps can follow the terrain, and reprojected onto the globe.

use aerovol_cache::{GeometryBuffer, StreamRole, Topology};
use aerovol_geo::LatLon;
use aerovol_globe::ElevationSampleCache;
use glam::DVec3;
use hashbrown::HashMap;

use crate::error::GenerationError;
use crate::geometry::{ridge_normal, winding_for, Orientation, VertexData};

#[derive(Clone, Debug)]
pub struct PolygonProfile {
    /// Boundary ring. A trailing duplicate of the first location is ignored.
    pub locations: Vec<LatLon>,
    pub altitudes: [f64; 2],
    pub terrain_conforming: [bool; 2],
    /// Midpoint subdivision passes applied to the tessellated caps. Each
    /// boundary segment gets `2^subdivisions` skirt columns to match.
    pub subdivisions: u32,
    /// Per-segment outline flags (segment `i` runs from location `i` to
    /// `i + 1`, wrapping). Empty means every edge is drawn.
    pub edge_flags: Vec<bool>,
    pub collapsed: bool,
}

/// Planar tessellation state: boundary ring and caps in tangent-plane
/// coordinates, plus the basis to reproject them.
struct TangentPlane {
    origin: DVec3,
    east: DVec3,
    north: DVec3,
}

impl TangentPlane {
    fn at(sampler: &ElevationSampleCache<'_>, locations: &[LatLon]) -> Self {
        let globe = sampler.globe();
        let n = locations.len() as f64;
        let centroid = LatLon::from_radians(
            locations.iter().map(|l| l.lat).sum::<f64>() / n,
            locations.iter().map(|l| l.lon).sum::<f64>() / n,
        );
        let up = globe.surface_normal(centroid);
        let east = DVec3::Z.cross(up);
        let east = if east.length_squared() > 1e-12 {
            east.normalize()
        } else {
            DVec3::X
        };
        let north = up.cross(east);
        Self {
            origin: globe.point_from(centroid, 0.0),
            east,
            north,
        }
    }

    fn project(&self, sampler: &ElevationSampleCache<'_>, location: LatLon) -> [f64; 2] {
        let d = sampler.globe().point_from(location, 0.0) - self.origin;
        [d.dot(self.east), d.dot(self.north)]
    }

    fn unproject(&self, sampler: &ElevationSampleCache<'_>, local: [f64; 2]) -> LatLon {
        let point = self.origin + self.east * local[0] + self.north * local[1];
        sampler.globe().location_from_point(point)
    }
}

fn shoelace_area(ring: &[[f64; 2]]) -> f64 {
    let mut sum = 0.0;
    for i in 0..ring.len() {
        let a = ring[i];
        let b = ring[(i + 1) % ring.len()];
        sum += a[0] * b[1] - b[0] * a[1];
    }
    sum * 0.5
}

/// One midpoint subdivision pass: each triangle splits into four, midpoints
/// shared across edges through the cache.
fn subdivide(vertices: &mut Vec<[f64; 2]>, triangles: &mut Vec<[u32; 3]>) {
    let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
    let mut midpoint = |vertices: &mut Vec<[f64; 2]>, a: u32, b: u32| -> u32 {
        let key = (a.min(b), a.max(b));
        *midpoints.entry(key).or_insert_with(|| {
            let pa = vertices[a as usize];
            let pb = vertices[b as usize];
            vertices.push([(pa[0] + pb[0]) * 0.5, (pa[1] + pb[1]) * 0.5]);
            (vertices.len() - 1) as u32
        })
    };
    let mut next = Vec::with_capacity(triangles.len() * 4);
    for tri in triangles.iter() {
        let m01 = midpoint(vertices, tri[0], tri[1]);
        let m12 = midpoint(vertices, tri[1], tri[2]);
        let m20 = midpoint(vertices, tri[2], tri[0]);
        next.push([tri[0], m01, m20]);
        next.push([m01, tri[1], m12]);
        next.push([m20, m12, tri[2]]);
        next.push([m01, m12, m20]);
    }
    *triangles = next;
}

/// Generate the polygon volume: tessellated caps at both altitudes and a
/// skirt wall along the boundary.
pub fn polygon_geometry(
    sampler: &mut ElevationSampleCache<'_>,
    vertical_exaggeration: f64,
    reference_center: DVec3,
    profile: &PolygonProfile,
) -> Result<GeometryBuffer, GenerationError> {
    let mut locations = profile.locations.clone();
    if locations.len() > 1 && locations.first() == locations.last() {
        locations.pop();
    }
    if locations.len() < 3 {
        return Err(GenerationError::Degenerate("polygon boundary"));
    }
    let mut edge_flags = if profile.edge_flags.is_empty() {
        vec![true; locations.len()]
    } else {
        profile.edge_flags.clone()
    };
    if edge_flags.len() != locations.len() {
        return Err(GenerationError::Degenerate("polygon edge flags"));
    }

    let plane = TangentPlane::at(sampler, &locations);
    let mut ring: Vec<[f64; 2]> = locations
        .iter()
        .map(|&l| plane.project(sampler, l))
        .collect();

    // Tessellation and the skirt both assume a counter-clockwise boundary.
    if shoelace_area(&ring) < 0.0 {
        locations.reverse();
        ring.reverse();
        edge_flags.reverse();
        edge_flags.rotate_left(1);
    }

    let flat: Vec<f64> = ring.iter().flat_map(|p| [p[0], p[1]]).collect();
    let indices = earcutr::earcut(&flat, &[], 2)
        .map_err(|err| GenerationError::Tessellation(format!("{err:?}")))?;
    if indices.is_empty() {
        return Err(GenerationError::Tessellation(
            "boundary produced no triangles".into(),
        ));
    }

    let mut cap_vertices = ring.clone();
    let mut cap_triangles: Vec<[u32; 3]> = indices
        .chunks_exact(3)
        .map(|tri| [tri[0] as u32, tri[1] as u32, tri[2] as u32])
        .collect();
    for _ in 0..profile.subdivisions {
        subdivide(&mut cap_vertices, &mut cap_triangles);
    }
    let cap_locations: Vec<LatLon> = cap_vertices
        .iter()
        .map(|&local| plane.unproject(sampler, local))
        .collect();

    let altitudes_at = |sampler: &mut ElevationSampleCache<'_>, location: LatLon| -> [f64; 2] {
        let mut altitudes = profile.altitudes;
        for surface in 0..2 {
            if profile.terrain_conforming[surface] {
                altitudes[surface] += vertical_exaggeration * sampler.elevation(location);
            }
        }
        altitudes
    };

    let mut vertices = VertexData::default();
    let mut fill = Vec::new();
    let mut outline = Vec::new();

    // Caps. The ring is counter-clockwise in the tangent plane, so the ear
    // clipping winds the top cap outward already; the bottom cap reverses.
    for (surface, orientation) in [(1usize, Orientation::Outward), (0usize, Orientation::Inward)] {
        if surface == 0 && profile.collapsed {
            continue;
        }
        let base = vertices.vertex_count() as u32;
        for &location in &cap_locations {
            let altitudes = altitudes_at(sampler, location);
            let globe = sampler.globe();
            let normal = globe.surface_normal(location) * orientation.normal_sign();
            vertices.push(
                globe.point_from(location, altitudes[surface]) - reference_center,
                normal,
            );
        }
        for tri in &cap_triangles {
            match orientation {
                Orientation::Outward => {
                    fill.extend_from_slice(&[base + tri[0], base + tri[1], base + tri[2]]);
                }
                Orientation::Inward => {
                    fill.extend_from_slice(&[base + tri[0], base + tri[2], base + tri[1]]);
                }
            }
        }
    }

    // Skirt: one wall run per boundary segment, subdivided in the tangent
    // plane to match the cap refinement.
    if !profile.collapsed {
        let columns = 1u32 << profile.subdivisions;
        for segment in 0..locations.len() {
            let a = ring[segment];
            let b = ring[(segment + 1) % ring.len()];
            let base = vertices.vertex_count() as u32;
            for column in 0..=columns {
                let t = f64::from(column) / f64::from(columns);
                let local = [a[0] + (b[0] - a[0]) * t, a[1] + (b[1] - a[1]) * t];
                let location = plane.unproject(sampler, local);
                let altitudes = altitudes_at(sampler, location);
                let globe = sampler.globe();
                let up = globe.surface_normal(location);
                let tangent =
                    plane.east * (b[0] - a[0]) + plane.north * (b[1] - a[1]);
                let normal = ridge_normal(up, tangent, Orientation::Outward);
                vertices.push(
                    globe.point_from(location, altitudes[0]) - reference_center,
                    normal,
                );
                vertices.push(
                    globe.point_from(location, altitudes[1]) - reference_center,
                    normal,
                );
            }

            let p = |i: u32| {
                DVec3::new(
                    f64::from(vertices.positions[i as usize * 3]),
                    f64::from(vertices.positions[i as usize * 3 + 1]),
                    f64::from(vertices.positions[i as usize * 3 + 2]),
                )
            };
            let n = |i: u32| {
                DVec3::new(
                    f64::from(vertices.normals[i as usize * 3]),
                    f64::from(vertices.normals[i as usize * 3 + 1]),
                    f64::from(vertices.normals[i as usize * 3 + 2]),
                )
            };
            let winding = winding_for(p(base), p(base + 2), p(base + 1), n(base));
            for column in 0..columns {
                let l0 = base + 2 * column;
                let u0 = l0 + 1;
                let l1 = l0 + 2;
                let u1 = l0 + 3;
                match winding {
                    Orientation::Outward => {
                        fill.extend_from_slice(&[l0, l1, u1, l0, u1, u0]);
                    }
                    Orientation::Inward => {
                        fill.extend_from_slice(&[l0, u1, l1, l0, u0, u1]);
                    }
                }
            }
            if edge_flags[segment] {
                for column in 0..columns {
                    let l0 = base + 2 * column;
                    outline.extend_from_slice(&[l0, l0 + 2]);
                    outline.extend_from_slice(&[l0 + 1, l0 + 3]);
                }
                outline.extend_from_slice(&[base, base + 1]);
            }
        }
    }

    let mut buffer = GeometryBuffer::new(vertices.positions, vertices.normals);
    buffer.push_stream(Topology::Triangles, StreamRole::Fill, fill);
    buffer.push_stream(Topology::Lines, StreamRole::Outline, outline);
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use aerovol_globe::{ConstantElevation, GlobeStateToken, SphericalGlobe};

    use super::*;

    fn globe() -> SphericalGlobe<ConstantElevation> {
        SphericalGlobe::new(6_371_000.0, ConstantElevation(0.0), GlobeStateToken(0))
    }

    fn square() -> Vec<LatLon> {
        vec![
            LatLon::from_degrees(0.0, 0.0),
            LatLon::from_degrees(0.0, 0.1),
            LatLon::from_degrees(0.1, 0.1),
            LatLon::from_degrees(0.1, 0.0),
        ]
    }

    fn profile(locations: Vec<LatLon>) -> PolygonProfile {
        PolygonProfile {
            locations,
            altitudes: [0.0, 1000.0],
            terrain_conforming: [false, false],
            subdivisions: 1,
            edge_flags: Vec::new(),
            collapsed: false,
        }
    }

    #[test]
    fn test_square_counts() {
        let globe = globe();
        let mut sampler = ElevationSampleCache::new(&globe);
        let buffer = polygon_geometry(&mut sampler, 1.0, DVec3::ZERO, &profile(square())).unwrap();

        // A square ear-clips into 2 triangles; one subdivision pass makes 8
        // per cap. The skirt adds 4 runs of 2 columns.
        let fill = buffer.stream(StreamRole::Fill).unwrap();
        assert_eq!(fill.indices.len(), (8 * 2 + 4 * 2 * 2) * 3);
        assert!(fill
            .indices
            .iter()
            .all(|&i| (i as usize) < buffer.vertex_count()));
    }

    #[test]
    fn test_clockwise_ring_is_normalized() {
        let globe = globe();
        let mut sampler = ElevationSampleCache::new(&globe);
        let mut reversed = square();
        reversed.reverse();
        let a = polygon_geometry(&mut sampler, 1.0, DVec3::ZERO, &profile(square())).unwrap();
        let mut sampler = ElevationSampleCache::new(&globe);
        let b = polygon_geometry(&mut sampler, 1.0, DVec3::ZERO, &profile(reversed)).unwrap();
        assert_eq!(a.vertex_count(), b.vertex_count());
        assert_eq!(
            a.stream(StreamRole::Fill).unwrap().indices.len(),
            b.stream(StreamRole::Fill).unwrap().indices.len()
        );
    }

    #[test]
    fn test_clockwise_cap_triangles_wind_outward() {
        let globe = globe();
        let mut sampler = ElevationSampleCache::new(&globe);
        let mut p = profile(square());
        p.locations.reverse();
        // Collapsed, so the fill stream holds top-cap triangles only.
        p.altitudes = [500.0, 500.0];
        p.collapsed = true;
        let buffer = polygon_geometry(&mut sampler, 1.0, DVec3::ZERO, &p).unwrap();
        let fill = buffer.stream(StreamRole::Fill).unwrap();
        let v = |i: u32| {
            DVec3::new(
                f64::from(buffer.positions[i as usize * 3]),
                f64::from(buffer.positions[i as usize * 3 + 1]),
                f64::from(buffer.positions[i as usize * 3 + 2]),
            )
        };
        for tri in fill.indices.chunks_exact(3) {
            let a = v(tri[0]);
            let face = (v(tri[1]) - a).cross(v(tri[2]) - a);
            assert!(face.dot(a) > 0.0, "cap triangle {tri:?} winds inward");
        }
    }

    #[test]
    fn test_degenerate_boundary_is_rejected() {
        let globe = globe();
        let mut sampler = ElevationSampleCache::new(&globe);
        let two = vec![LatLon::from_degrees(0.0, 0.0), LatLon::from_degrees(0.0, 0.1)];
        let result = polygon_geometry(&mut sampler, 1.0, DVec3::ZERO, &profile(two));
        assert!(matches!(result, Err(GenerationError::Degenerate(_))));
    }

    #[test]
    fn test_trailing_duplicate_location_is_dropped() {
        let globe = globe();
        let mut sampler = ElevationSampleCache::new(&globe);
        let mut closed = square();
        closed.push(closed[0]);
        let a = polygon_geometry(&mut sampler, 1.0, DVec3::ZERO, &profile(square())).unwrap();
        let mut sampler = ElevationSampleCache::new(&globe);
        let b = polygon_geometry(&mut sampler, 1.0, DVec3::ZERO, &profile(closed)).unwrap();
        assert_eq!(a.vertex_count(), b.vertex_count());
    }

    #[test]
    fn test_edge_flags_limit_outline() {
        let globe = globe();
        let mut sampler = ElevationSampleCache::new(&globe);
        let mut p = profile(square());
        p.edge_flags = vec![true, false, true, false];
        let buffer = polygon_geometry(&mut sampler, 1.0, DVec3::ZERO, &p).unwrap();
        let full = polygon_geometry(
            &mut ElevationSampleCache::new(&globe),
            1.0,
            DVec3::ZERO,
            &profile(square()),
        )
        .unwrap();
        let partial_outline = buffer.stream(StreamRole::Outline).unwrap().indices.len();
        let full_outline = full.stream(StreamRole::Outline).unwrap().indices.len();
        assert_eq!(partial_outline * 2, full_outline);
    }

    #[test]
    fn test_collapsed_polygon_is_single_cap() {
        let globe = globe();
        let mut sampler = ElevationSampleCache::new(&globe);
        let mut p = profile(square());
        p.altitudes = [500.0, 500.0];
        p.collapsed = true;
        let buffer = polygon_geometry(&mut sampler, 1.0, DVec3::ZERO, &p).unwrap();
        let fill = buffer.stream(StreamRole::Fill).unwrap();
        assert_eq!(fill.indices.len(), 8 * 3);
        assert!(buffer.stream(StreamRole::Outline).unwrap().indices.is_empty());
    }

    #[test]
    fn test_subdivision_shares_midpoints() {
        let mut vertices = vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
        let mut triangles = vec![[0u32, 1, 2], [2, 1, 3]];
        subdivide(&mut vertices, &mut triangles);
        // The shared edge 1-2 contributes one midpoint, not two.
        assert_eq!(vertices.len(), 4 + 5);
        assert_eq!(triangles.len(), 8);
    }
}
