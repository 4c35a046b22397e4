//! The orbit generator: a stadium-shaped volume around a leg, with
//! semicircular arcs at both ends joined by straight sides at half the
//! width. The caps triangulate from the spine outward, like a disk whose
//! rim is the stadium perimeter.

use aerovol_cache::{GeometryBuffer, StreamRole, Topology};
use aerovol_geo::{Angle, LatLon};
use aerovol_globe::ElevationSampleCache;
use glam::DVec3;
use std::f64::consts::{FRAC_PI_2, PI};

use crate::error::GenerationError;
use crate::geometry::{grid_fill_indices, ridge_normal, winding_for, Orientation, VertexData};

#[derive(Clone, Debug)]
pub struct OrbitProfile {
    pub begin: LatLon,
    pub end: LatLon,
    /// Full width of the stadium, meters; the arcs have half this radius.
    pub width: f64,
    pub altitudes: [f64; 2],
    pub terrain_conforming: [bool; 2],
    /// Segments per semicircular end arc.
    pub arc_slices: u32,
    /// Segments along each straight side.
    pub length_slices: u32,
    /// Radial rows per cap.
    pub loops: u32,
    pub collapsed: bool,
}

/// Perimeter ring and matching spine anchors, counter-clockwise seen from
/// above. Anchors are the spine points the cap rows interpolate from; arc
/// points anchor at their endpoint, side points at their spine projection.
pub(crate) fn perimeter(profile: &OrbitProfile, radius_arc: f64) -> (Vec<LatLon>, Vec<LatLon>) {
    let arc = profile.arc_slices.max(1);
    let ls = profile.length_slices.max(1);
    let heading_begin = profile.begin.great_circle_azimuth(profile.end).radians();
    let heading_end = profile.end.great_circle_azimuth(profile.begin).radians();

    let len = 2 * (arc as usize + 1) + 2 * (ls as usize - 1);
    let mut ring = Vec::with_capacity(len);
    let mut anchors = Vec::with_capacity(len);

    // Begin arc, sweeping from the left side around the back to the right.
    for i in 0..=arc {
        let azimuth = heading_begin - FRAC_PI_2 - PI * f64::from(i) / f64::from(arc);
        ring.push(
            profile
                .begin
                .great_circle_endpoint(Angle::from_radians(azimuth), radius_arc),
        );
        anchors.push(profile.begin);
    }
    // Right side toward the end.
    for i in 1..ls {
        let amount = f64::from(i) / f64::from(ls);
        let spine = LatLon::interpolate_great_circle(amount, profile.begin, profile.end);
        let azimuth = spine.great_circle_azimuth(profile.end).radians() + FRAC_PI_2;
        ring.push(spine.great_circle_endpoint(Angle::from_radians(azimuth), radius_arc));
        anchors.push(spine);
    }
    // End arc, right side around the far end to the left.
    for i in 0..=arc {
        let azimuth = heading_end - FRAC_PI_2 - PI * f64::from(i) / f64::from(arc);
        ring.push(
            profile
                .end
                .great_circle_endpoint(Angle::from_radians(azimuth), radius_arc),
        );
        anchors.push(profile.end);
    }
    // Left side back toward the begin.
    for i in 1..ls {
        let amount = f64::from(i) / f64::from(ls);
        let spine = LatLon::interpolate_great_circle(amount, profile.end, profile.begin);
        let azimuth = spine.great_circle_azimuth(profile.begin).radians() + FRAC_PI_2;
        ring.push(spine.great_circle_endpoint(Angle::from_radians(azimuth), radius_arc));
        anchors.push(spine);
    }
    (ring, anchors)
}

/// Generate the orbit volume: perimeter wall plus caps at both altitudes.
pub fn orbit_geometry(
    sampler: &mut ElevationSampleCache<'_>,
    vertical_exaggeration: f64,
    reference_center: DVec3,
    profile: &OrbitProfile,
) -> Result<GeometryBuffer, GenerationError> {
    if profile.begin == profile.end {
        return Err(GenerationError::Degenerate("orbit endpoints coincide"));
    }
    if profile.width <= 0.0 {
        return Err(GenerationError::Degenerate("orbit width"));
    }
    let globe_radius = sampler.globe().equatorial_radius();
    let radius_arc = profile.width * 0.5 / globe_radius;
    let (ring, anchors) = perimeter(profile, radius_arc);
    let n = ring.len();
    let loops = profile.loops.max(1);

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

    // Wall: (lower, upper) pairs per ring column, closed with a duplicated
    // first column.
    if !profile.collapsed {
        let base = vertices.vertex_count() as u32;
        for column in 0..=n {
            let location = ring[column % n];
            let globe = sampler.globe();
            let up = globe.surface_normal(location);
            let prev = ring[(column + n - 1) % n];
            let next = ring[(column + 1) % n];
            let tangent = globe.point_from(next, 0.0) - globe.point_from(prev, 0.0);
            let normal = ridge_normal(up, tangent, Orientation::Outward);
            let altitudes = altitudes_at(sampler, location);
            let globe = sampler.globe();
            vertices.push(
                globe.point_from(location, altitudes[0]) - reference_center,
                normal,
            );
            vertices.push(
                globe.point_from(location, altitudes[1]) - reference_center,
                normal,
            );
        }
        let p = |i: u32| vertex_point(&vertices, i);
        let winding = winding_for(p(base), p(base + 2), p(base + 1), vertex_normal(&vertices, base));
        for column in 0..n as u32 {
            let l0 = base + 2 * column;
            let u0 = l0 + 1;
            let l1 = l0 + 2;
            let u1 = l0 + 3;
            match winding {
                Orientation::Outward => fill.extend_from_slice(&[l0, l1, u1, l0, u1, u0]),
                Orientation::Inward => fill.extend_from_slice(&[l0, u1, l1, l0, u0, u1]),
            }
            outline.extend_from_slice(&[l0, l1]);
            outline.extend_from_slice(&[u0, u1]);
        }
    }

    // Caps: rows interpolate from the spine anchor out to the ring, closed
    // like the wall. The innermost row collapses onto the spine.
    let cols = n as u32 + 1;
    for (surface, orientation) in [(1usize, Orientation::Outward), (0usize, Orientation::Inward)] {
        if surface == 0 && profile.collapsed {
            continue;
        }
        let base = vertices.vertex_count() as u32;
        for row in 0..=loops {
            let amount = f64::from(row) / f64::from(loops);
            for column in 0..=n {
                let anchor = anchors[column % n];
                let rim = ring[column % n];
                let location = LatLon::interpolate_great_circle(amount, anchor, rim);
                let altitudes = altitudes_at(sampler, location);
                let globe = sampler.globe();
                let normal = globe.surface_normal(location) * orientation.normal_sign();
                vertices.push(
                    globe.point_from(location, altitudes[surface]) - reference_center,
                    normal,
                );
            }
        }
        // Pick the winding on an outer-row cell, where cells are not
        // degenerate.
        let outer = base + (loops - 1) * cols;
        let p = |i: u32| vertex_point(&vertices, i);
        let winding = winding_for(
            p(outer),
            p(outer + 1),
            p(outer + cols),
            vertex_normal(&vertices, outer),
        );
        for index in grid_fill_indices(cols, loops + 1, winding) {
            fill.push(base + index);
        }
    }

    let mut buffer = GeometryBuffer::new(vertices.positions, vertices.normals);
    buffer.push_stream(Topology::Triangles, StreamRole::Fill, fill);
    buffer.push_stream(Topology::Lines, StreamRole::Outline, outline);
    Ok(buffer)
}

fn vertex_point(vertices: &VertexData, index: u32) -> DVec3 {
    let base = index as usize * 3;
    DVec3::new(
        f64::from(vertices.positions[base]),
        f64::from(vertices.positions[base + 1]),
        f64::from(vertices.positions[base + 2]),
    )
}

fn vertex_normal(vertices: &VertexData, index: u32) -> DVec3 {
    let base = index as usize * 3;
    DVec3::new(
        f64::from(vertices.normals[base]),
        f64::from(vertices.normals[base + 1]),
        f64::from(vertices.normals[base + 2]),
    )
}

#[cfg(test)]
mod tests {
    use aerovol_globe::{ConstantElevation, Globe, GlobeStateToken, SphericalGlobe};

    use super::*;

    fn globe() -> SphericalGlobe<ConstantElevation> {
        SphericalGlobe::new(6_371_000.0, ConstantElevation(0.0), GlobeStateToken(0))
    }

    fn profile() -> OrbitProfile {
        OrbitProfile {
            begin: LatLon::from_degrees(0.0, 0.0),
            end: LatLon::from_degrees(0.5, 0.0),
            width: 20_000.0,
            altitudes: [0.0, 3000.0],
            terrain_conforming: [false, false],
            arc_slices: 16,
            length_slices: 32,
            loops: 4,
            collapsed: false,
        }
    }

    #[test]
    fn test_perimeter_is_counter_clockwise() {
        let globe = globe();
        let p = profile();
        let radius_arc = p.width * 0.5 / globe.equatorial_radius();
        let (ring, anchors) = perimeter(&p, radius_arc);
        assert_eq!(ring.len(), 2 * 17 + 2 * 31);
        assert_eq!(anchors.len(), ring.len());
        // Shoelace over lon/lat, positive for counter-clockwise.
        let mut area = 0.0;
        for i in 0..ring.len() {
            let a = ring[i];
            let b = ring[(i + 1) % ring.len()];
            area += a.lon * b.lat - b.lon * a.lat;
        }
        assert!(area > 0.0, "perimeter winds clockwise, area {area}");
    }

    #[test]
    fn test_ring_points_keep_half_width() {
        let globe = globe();
        let p = profile();
        let radius_arc = p.width * 0.5 / globe.equatorial_radius();
        let (ring, anchors) = perimeter(&p, radius_arc);
        for (rim, anchor) in ring.iter().zip(&anchors) {
            let d = anchor.great_circle_distance(*rim) * globe.equatorial_radius();
            assert!((d - p.width * 0.5).abs() < 1.0, "rim offset {d}");
        }
    }

    #[test]
    fn test_orbit_geometry_counts() {
        let globe = globe();
        let mut sampler = ElevationSampleCache::new(&globe);
        let p = profile();
        let buffer = orbit_geometry(&mut sampler, 1.0, DVec3::ZERO, &p).unwrap();
        let n = (2 * 17 + 2 * 31) as u32;
        let wall = 2 * (n + 1);
        let caps = 2 * 5 * (n + 1);
        assert_eq!(buffer.vertex_count() as u32, wall + caps);
        let fill = buffer.stream(StreamRole::Fill).unwrap();
        assert_eq!(fill.indices.len() as u32, (n + 2 * 4 * n) * 6);
        assert!(fill
            .indices
            .iter()
            .all(|&i| (i as usize) < buffer.vertex_count()));
    }

    #[test]
    fn test_collapsed_orbit_has_top_cap_only() {
        let globe = globe();
        let mut sampler = ElevationSampleCache::new(&globe);
        let mut p = profile();
        p.altitudes = [1000.0, 1000.0];
        p.collapsed = true;
        let buffer = orbit_geometry(&mut sampler, 1.0, DVec3::ZERO, &p).unwrap();
        let n = (2 * 17 + 2 * 31) as u32;
        assert_eq!(buffer.vertex_count() as u32, 5 * (n + 1));
        assert!(buffer.stream(StreamRole::Outline).unwrap().indices.is_empty());
    }

    #[test]
    fn test_degenerate_profiles_are_rejected() {
        let globe = globe();
        let mut sampler = ElevationSampleCache::new(&globe);
        let mut p = profile();
        p.end = p.begin;
        assert!(matches!(
            orbit_geometry(&mut sampler, 1.0, DVec3::ZERO, &p),
            Err(GenerationError::Degenerate(_))
        ));
        let mut p = profile();
        p.width = 0.0;
        assert!(matches!(
            orbit_geometry(&mut sampler, 1.0, DVec3::ZERO, &p),
            Err(GenerationError::Degenerate(_))
        ));
    }
}
