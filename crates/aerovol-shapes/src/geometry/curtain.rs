//! The curtain generator: a vertical ribbon hung between two altitude
//! surfaces along a polyline path. Each path section is split into pillars
//! so long legs follow the terrain and the globe curvature, and each section
//! becomes its own triangle strip so boundary locations keep independent
//! normals.

use aerovol_cache::{GeometryBuffer, StreamRole, Topology};
use aerovol_geo::{LatLon, PathType};
use aerovol_globe::ElevationSampleCache;
use glam::DVec3;

use crate::error::GenerationError;
use crate::geometry::normals::indexed_strip_normals;
use crate::geometry::{surface_point, VertexData};

/// Default section split threshold, meters of arc length per pillar.
pub const DEFAULT_SPLIT_THRESHOLD: f64 = 2000.0;

#[derive(Clone, Debug)]
pub struct CurtainProfile {
    pub locations: Vec<LatLon>,
    pub path_type: PathType,
    pub altitudes: [f64; 2],
    pub terrain_conforming: [bool; 2],
    /// Arc length per pillar, meters. Sections shorter than this get a
    /// single pillar.
    pub split_threshold: f64,
}

/// Pillar (column segment) count of each path section. Shared by the sizing
/// pass and the fill pass so the two always agree.
#[must_use]
pub(crate) fn section_pillars(profile: &CurtainProfile, globe_radius: f64) -> Vec<u32> {
    profile
        .locations
        .windows(2)
        .map(|pair| {
            let arc = pair[0].path_distance(profile.path_type, pair[1]);
            let length = arc * globe_radius;
            let split = (length / profile.split_threshold.max(1.0)).ceil() as u32;
            split.saturating_sub(1).max(1)
        })
        .collect()
}

/// Generate the curtain: one triangle strip per section plus a shared
/// outline tracing the top and bottom edges and the end verticals.
pub fn curtain_geometry(
    sampler: &mut ElevationSampleCache<'_>,
    vertical_exaggeration: f64,
    reference_center: DVec3,
    profile: &CurtainProfile,
) -> Result<GeometryBuffer, GenerationError> {
    if profile.locations.len() < 2 {
        return Err(GenerationError::Degenerate("curtain path"));
    }
    let globe_radius = sampler.globe().equatorial_radius();
    let pillars = section_pillars(profile, globe_radius);
    let total_columns: u32 = pillars.iter().map(|&p| p + 1).sum();

    let mut vertices = VertexData::with_capacity(2 * total_columns as usize);
    let mut strips: Vec<Vec<u32>> = Vec::with_capacity(pillars.len());
    let mut outline = Vec::new();

    for (section, &p) in pillars.iter().enumerate() {
        let begin = profile.locations[section];
        let end = profile.locations[section + 1];
        let base = vertices.vertex_count() as u32;
        for column in 0..=p {
            let amount = f64::from(column) / f64::from(p);
            let location = LatLon::interpolate(profile.path_type, amount, begin, end);
            for surface in 0..2 {
                let point = surface_point(
                    sampler,
                    vertical_exaggeration,
                    location,
                    profile.altitudes[surface],
                    profile.terrain_conforming[surface],
                );
                // Placeholder normal; reconstructed from the strips below.
                vertices.push(point - reference_center, DVec3::ZERO);
            }
        }

        let mut strip = Vec::with_capacity(2 * (p as usize + 1));
        for column in 0..=p {
            strip.push(base + 2 * column);
            strip.push(base + 2 * column + 1);
        }
        strips.push(strip);

        for column in 0..p {
            let lower = base + 2 * column;
            outline.extend_from_slice(&[lower, lower + 2]);
            outline.extend_from_slice(&[lower + 1, lower + 3]);
        }
        if section == 0 {
            outline.extend_from_slice(&[base, base + 1]);
        }
        if section == pillars.len() - 1 {
            let last = base + 2 * p;
            outline.extend_from_slice(&[last, last + 1]);
        }
    }

    let mut normals = vec![0.0f32; vertices.positions.len()];
    for strip in &strips {
        let section_normals = indexed_strip_normals(&vertices.positions, strip);
        for (n, s) in normals.iter_mut().zip(&section_normals) {
            if *s != 0.0 {
                *n = *s;
            }
        }
    }

    let mut buffer = GeometryBuffer::new(vertices.positions, normals);
    for strip in strips {
        buffer.push_stream(Topology::TriangleStrip, StreamRole::Fill, strip);
    }
    buffer.push_stream(Topology::Lines, StreamRole::Outline, outline);
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use aerovol_globe::{ConstantElevation, Globe, GlobeStateToken, SphericalGlobe};

    use super::*;

    fn globe() -> SphericalGlobe<ConstantElevation> {
        SphericalGlobe::new(6_371_000.0, ConstantElevation(0.0), GlobeStateToken(0))
    }

    fn profile(locations: Vec<LatLon>) -> CurtainProfile {
        CurtainProfile {
            locations,
            path_type: PathType::GreatCircle,
            altitudes: [100.0, 2000.0],
            terrain_conforming: [false, false],
            split_threshold: DEFAULT_SPLIT_THRESHOLD,
        }
    }

    #[test]
    fn test_short_section_gets_one_pillar() {
        let globe = globe();
        // Roughly 1 km section, well under the split threshold.
        let p = profile(vec![
            LatLon::from_degrees(0.0, 0.0),
            LatLon::from_degrees(0.009, 0.0),
        ]);
        let pillars = section_pillars(&p, globe.equatorial_radius());
        assert_eq!(pillars, vec![1]);
    }

    #[test]
    fn test_long_section_splits() {
        let globe = globe();
        // One degree of latitude is about 111 km; at a 2 km threshold that
        // splits into dozens of pillars.
        let p = profile(vec![
            LatLon::from_degrees(0.0, 0.0),
            LatLon::from_degrees(1.0, 0.0),
        ]);
        let pillars = section_pillars(&p, globe.equatorial_radius());
        assert!(pillars[0] > 30, "pillars {}", pillars[0]);
    }

    #[test]
    fn test_curtain_counts() {
        let globe = globe();
        let mut sampler = ElevationSampleCache::new(&globe);
        let p = profile(vec![
            LatLon::from_degrees(0.0, 0.0),
            LatLon::from_degrees(0.05, 0.0),
            LatLon::from_degrees(0.05, 0.05),
        ]);
        let pillars = section_pillars(&p, globe.equatorial_radius());
        let buffer = curtain_geometry(&mut sampler, 1.0, DVec3::ZERO, &p).unwrap();

        let columns: u32 = pillars.iter().map(|&n| n + 1).sum();
        assert_eq!(buffer.vertex_count() as u32, 2 * columns);
        // One strip per section, then the outline.
        assert_eq!(buffer.streams().len(), pillars.len() + 1);
        for (stream, &n) in buffer.streams().iter().zip(&pillars) {
            assert_eq!(stream.topology, Topology::TriangleStrip);
            assert_eq!(stream.indices.len() as u32, 2 * (n + 1));
        }
        let outline = buffer.stream(StreamRole::Outline).unwrap();
        let segments: u32 = pillars.iter().map(|&n| 2 * n).sum::<u32>() + 2;
        assert_eq!(outline.indices.len() as u32, 2 * segments);
    }

    #[test]
    fn test_degenerate_path_is_rejected() {
        let globe = globe();
        let mut sampler = ElevationSampleCache::new(&globe);
        let p = profile(vec![LatLon::from_degrees(0.0, 0.0)]);
        let result = curtain_geometry(&mut sampler, 1.0, DVec3::ZERO, &p);
        assert!(matches!(result, Err(GenerationError::Degenerate(_))));
    }

    #[test]
    fn test_reconstructed_normals_are_unit_length() {
        let globe = globe();
        let mut sampler = ElevationSampleCache::new(&globe);
        let p = profile(vec![
            LatLon::from_degrees(0.0, 0.0),
            LatLon::from_degrees(0.0, 0.02),
        ]);
        let buffer = curtain_geometry(&mut sampler, 1.0, DVec3::ZERO, &p).unwrap();
        for n in buffer.normals.chunks_exact(3) {
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-3, "unit normal, got {len}");
        }
    }
}
