//! The box (rectangular leg) generator: a great-circle leg extruded sideways
//! to a left and right width, with optional start/end cap walls and corner
//! azimuths that can shear the ends so adjacent legs in a track share an
//! edge. Corner placement is closed-form spherical trigonometry.

use aerovol_cache::{GeometryBuffer, StreamRole, Topology};
use aerovol_geo::{Angle, LatLon};
use aerovol_globe::ElevationSampleCache;
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

use crate::error::GenerationError;
use crate::geometry::{
    grid_fill_indices, ridge_normal, winding_for, Orientation, VertexData,
};

/// Overrides for the four corner azimuths. `None` keeps the default
/// perpendicular corner. Set by track joining; rarely by hand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CornerAzimuths {
    pub begin_left: Option<Angle>,
    pub begin_right: Option<Angle>,
    pub end_left: Option<Angle>,
    pub end_right: Option<Angle>,
}

/// Parameters of one box leg.
#[derive(Clone, Debug)]
pub struct BoxProfile {
    pub begin: LatLon,
    pub end: LatLon,
    /// Width left of the leg centerline, meters.
    pub left_width: f64,
    /// Width right of the leg centerline, meters.
    pub right_width: f64,
    pub altitudes: [f64; 2],
    pub terrain_conforming: [bool; 2],
    pub corner_azimuths: CornerAzimuths,
    pub enable_start_cap: bool,
    pub enable_end_cap: bool,
    pub enable_center_line: bool,
    /// Segments along the leg.
    pub length_segments: u32,
    /// Segments across each half width.
    pub width_segments: u32,
    pub collapsed: bool,
}

/// Resolved corner locations. The `*_proj` locations are the centerline
/// projections the sides interpolate between; they coincide with the leg
/// endpoints unless a corner azimuth shears the end.
#[derive(Clone, Debug)]
pub(crate) struct BoxCorners {
    pub begin_left: LatLon,
    pub begin_right: LatLon,
    pub end_left: LatLon,
    pub end_right: LatLon,
    pub begin_left_proj: LatLon,
    pub begin_right_proj: LatLon,
    pub end_left_proj: LatLon,
    pub end_right_proj: LatLon,
    pub left_arc: f64,
    pub right_arc: f64,
}

/// Place the four corners. An overridden corner azimuth slides the corner
/// along that azimuth so the perpendicular offset still equals the width;
/// the adjustment is skipped when it would reach past the opposite end
/// (including the NaN case of a degenerate azimuth, which fails the
/// comparison).
pub(crate) fn compute_corners(globe_radius: f64, profile: &BoxProfile) -> BoxCorners {
    let begin_azimuth = profile.begin.great_circle_azimuth(profile.end).radians();
    let end_azimuth = profile.end.great_circle_azimuth(profile.begin).radians();
    let center_arc = profile.begin.great_circle_distance(profile.end);
    let left_arc = profile.left_width / globe_radius;
    let right_arc = profile.right_width / globe_radius;

    let mut corners = BoxCorners {
        begin_left: profile
            .begin
            .great_circle_endpoint(Angle::from_radians(begin_azimuth - FRAC_PI_2), left_arc),
        begin_right: profile
            .begin
            .great_circle_endpoint(Angle::from_radians(begin_azimuth + FRAC_PI_2), right_arc),
        end_left: profile
            .end
            .great_circle_endpoint(Angle::from_radians(end_azimuth + FRAC_PI_2), left_arc),
        end_right: profile
            .end
            .great_circle_endpoint(Angle::from_radians(end_azimuth - FRAC_PI_2), right_arc),
        begin_left_proj: profile.begin,
        begin_right_proj: profile.begin,
        end_left_proj: profile.end,
        end_right_proj: profile.end,
        left_arc,
        right_arc,
    };

    if let Some(azimuth) = profile.corner_azimuths.begin_left {
        let arc_angle = begin_azimuth - azimuth.radians();
        if let Some((corner, proj)) = sheared_corner(
            profile.begin,
            azimuth,
            begin_azimuth,
            arc_angle,
            left_arc,
            center_arc,
        ) {
            corners.begin_left = corner;
            corners.begin_left_proj = proj;
        }
    }
    if let Some(azimuth) = profile.corner_azimuths.begin_right {
        let arc_angle = azimuth.radians() - begin_azimuth;
        if let Some((corner, proj)) = sheared_corner(
            profile.begin,
            azimuth,
            begin_azimuth,
            arc_angle,
            right_arc,
            center_arc,
        ) {
            corners.begin_right = corner;
            corners.begin_right_proj = proj;
        }
    }
    if let Some(azimuth) = profile.corner_azimuths.end_left {
        let arc_angle = azimuth.radians() - end_azimuth;
        if let Some((corner, proj)) = sheared_corner(
            profile.end,
            azimuth,
            end_azimuth,
            arc_angle,
            left_arc,
            center_arc,
        ) {
            corners.end_left = corner;
            corners.end_left_proj = proj;
        }
    }
    if let Some(azimuth) = profile.corner_azimuths.end_right {
        let arc_angle = end_azimuth - azimuth.radians();
        if let Some((corner, proj)) = sheared_corner(
            profile.end,
            azimuth,
            end_azimuth,
            arc_angle,
            right_arc,
            center_arc,
        ) {
            corners.end_right = corner;
            corners.end_right_proj = proj;
        }
    }
    corners
}

/// Spherical right-triangle solution for a sheared corner: the hypotenuse
/// along the corner azimuth whose perpendicular leg equals `width_arc`.
fn sheared_corner(
    origin: LatLon,
    corner_azimuth: Angle,
    heading_azimuth: f64,
    arc_angle: f64,
    width_arc: f64,
    center_arc: f64,
) -> Option<(LatLon, LatLon)> {
    let along = (arc_angle.cos() * width_arc.sin() / arc_angle.sin()).asin();
    let side = (width_arc.sin() / arc_angle.sin()).asin();
    // NaN from a degenerate angle fails the comparison and keeps the default.
    if along < center_arc {
        let corner = origin.great_circle_endpoint(corner_azimuth, side);
        let proj = origin.great_circle_endpoint(Angle::from_radians(heading_azimuth), along);
        Some((corner, proj))
    } else {
        None
    }
}

/// Great-circle interpolation from `begin` through `middle` to `end`,
/// `segments` per half, endpoints included once.
fn append_locations(
    begin: LatLon,
    middle: LatLon,
    end: LatLon,
    segments: u32,
    out: &mut Vec<LatLon>,
) {
    for i in 0..=segments {
        let amount = f64::from(i) / f64::from(segments);
        out.push(LatLon::interpolate_great_circle(amount, begin, middle));
    }
    for i in 1..=segments {
        let amount = f64::from(i) / f64::from(segments);
        out.push(LatLon::interpolate_great_circle(amount, middle, end));
    }
}

struct SideRun {
    locations: Vec<LatLon>,
    draw_fill: bool,
}

/// The four wall runs in perimeter order (begin cap, right side, end cap,
/// left side), counter-clockwise seen from above. Corner locations repeat
/// at run boundaries so each run has clean edge normals.
fn side_runs(profile: &BoxProfile, corners: &BoxCorners) -> Vec<SideRun> {
    let ws = profile.width_segments.max(1);
    let ls = profile.length_segments.max(1);
    let mut runs = Vec::with_capacity(4);

    let mut begin_side = Vec::new();
    append_locations(
        corners.begin_left,
        profile.begin,
        corners.begin_right,
        ws,
        &mut begin_side,
    );
    runs.push(SideRun {
        locations: begin_side,
        draw_fill: profile.enable_start_cap,
    });

    let mut right_side = vec![corners.begin_right];
    for i in 1..ls {
        let amount = f64::from(i) / f64::from(ls);
        let proj = LatLon::interpolate_great_circle(
            amount,
            corners.begin_right_proj,
            corners.end_right_proj,
        );
        let azimuth = proj.great_circle_azimuth(corners.end_right_proj).radians() + FRAC_PI_2;
        right_side.push(proj.great_circle_endpoint(Angle::from_radians(azimuth), corners.right_arc));
    }
    right_side.push(corners.end_right);
    runs.push(SideRun {
        locations: right_side,
        draw_fill: true,
    });

    let mut end_side = Vec::new();
    append_locations(
        corners.end_right,
        profile.end,
        corners.end_left,
        ws,
        &mut end_side,
    );
    runs.push(SideRun {
        locations: end_side,
        draw_fill: profile.enable_end_cap,
    });

    let mut left_side = vec![corners.end_left];
    for i in 1..ls {
        let amount = f64::from(i) / f64::from(ls);
        let proj = LatLon::interpolate_great_circle(
            amount,
            corners.end_left_proj,
            corners.begin_left_proj,
        );
        let azimuth = proj.great_circle_azimuth(corners.end_left_proj).radians() - FRAC_PI_2;
        left_side.push(proj.great_circle_endpoint(Angle::from_radians(azimuth), corners.left_arc));
    }
    left_side.push(corners.begin_left);
    runs.push(SideRun {
        locations: left_side,
        draw_fill: true,
    });

    runs
}

/// Cap grid locations: `length_segments+1` rows of `2*width_segments+1`
/// columns, each row interpolated left-to-right through the centerline.
fn cap_locations(profile: &BoxProfile, corners: &BoxCorners) -> (Vec<LatLon>, u32, u32) {
    let ws = profile.width_segments.max(1);
    let ls = profile.length_segments.max(1);
    let cols = 2 * ws + 1;
    let rows = ls + 1;
    let mut locations = Vec::with_capacity((cols * rows) as usize);

    append_locations(
        corners.begin_left,
        profile.begin,
        corners.begin_right,
        ws,
        &mut locations,
    );
    for i in 1..ls {
        let amount = f64::from(i) / f64::from(ls);
        let center = LatLon::interpolate_great_circle(amount, profile.begin, profile.end);
        let left_proj = LatLon::interpolate_great_circle(
            amount,
            corners.begin_left_proj,
            corners.end_left_proj,
        );
        let right_proj = LatLon::interpolate_great_circle(
            amount,
            corners.begin_right_proj,
            corners.end_right_proj,
        );
        let left_azimuth =
            left_proj.great_circle_azimuth(corners.end_left_proj).radians() - FRAC_PI_2;
        let right_azimuth =
            right_proj.great_circle_azimuth(corners.end_right_proj).radians() + FRAC_PI_2;
        let left =
            left_proj.great_circle_endpoint(Angle::from_radians(left_azimuth), corners.left_arc);
        let right =
            right_proj.great_circle_endpoint(Angle::from_radians(right_azimuth), corners.right_arc);
        append_locations(left, center, right, ws, &mut locations);
    }
    append_locations(
        corners.end_left,
        profile.end,
        corners.end_right,
        ws,
        &mut locations,
    );
    (locations, cols, rows)
}

/// Generate the complete box geometry: side walls, top and bottom caps, the
/// outline, and optionally the center line, in a single buffer.
pub fn box_geometry(
    sampler: &mut ElevationSampleCache<'_>,
    vertical_exaggeration: f64,
    reference_center: DVec3,
    profile: &BoxProfile,
) -> Result<GeometryBuffer, GenerationError> {
    if profile.begin == profile.end {
        return Err(GenerationError::Degenerate("box endpoints coincide"));
    }
    if profile.left_width + profile.right_width <= 0.0 {
        return Err(GenerationError::Degenerate("box width"));
    }
    let globe_radius = sampler.globe().equatorial_radius();
    let corners = compute_corners(globe_radius, profile);

    let mut vertices = VertexData::default();
    let mut fill = Vec::new();
    let mut outline = Vec::new();

    let altitudes_at = |sampler: &mut ElevationSampleCache<'_>, location: LatLon| -> [f64; 2] {
        let mut altitudes = profile.altitudes;
        for surface in 0..2 {
            if profile.terrain_conforming[surface] {
                altitudes[surface] += vertical_exaggeration * sampler.elevation(location);
            }
        }
        altitudes
    };

    // Side walls: (lower, upper) vertex pairs per run location.
    if !profile.collapsed {
        for run in side_runs(profile, &corners) {
            let base = vertices.vertex_count() as u32;
            let n = run.locations.len();
            for (i, &location) in run.locations.iter().enumerate() {
                let globe = sampler.globe();
                let up = globe.surface_normal(location);
                let prev = run.locations[i.saturating_sub(1)];
                let next = run.locations[(i + 1).min(n - 1)];
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
            let nrm = |i: u32| vertex_normal(&vertices, i);
            let winding = winding_for(p(base), p(base + 2), p(base + 1), nrm(base));
            if run.draw_fill {
                for i in 0..(n as u32 - 1) {
                    let l0 = base + 2 * i;
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
                for i in 0..(n as u32 - 1) {
                    let l0 = base + 2 * i;
                    outline.extend_from_slice(&[l0, l0 + 2]);
                    outline.extend_from_slice(&[l0 + 1, l0 + 3]);
                }
            }
            // Vertical corner segment at the run's first location.
            outline.extend_from_slice(&[base, base + 1]);
        }
    }

    // Caps.
    let (cap_locs, cols, rows) = cap_locations(profile, &corners);
    for (surface, orientation) in [(1usize, Orientation::Outward), (0usize, Orientation::Inward)] {
        if surface == 0 && profile.collapsed {
            continue;
        }
        let base = vertices.vertex_count() as u32;
        for &location in &cap_locs {
            let altitudes = altitudes_at(sampler, location);
            let globe = sampler.globe();
            let normal = globe.surface_normal(location) * orientation.normal_sign();
            vertices.push(
                globe.point_from(location, altitudes[surface]) - reference_center,
                normal,
            );
        }
        let p = |i: u32| vertex_point(&vertices, i);
        let winding = winding_for(
            p(base),
            p(base + 1),
            p(base + cols),
            vertex_normal(&vertices, base),
        );
        for index in grid_fill_indices(cols, rows, winding) {
            fill.push(base + index);
        }
    }

    let mut buffer_vertices = vertices;

    // Center line along the spine at both altitudes, with end verticals.
    let mut center_line = Vec::new();
    if profile.enable_center_line {
        let ls = profile.length_segments.max(1);
        let base = buffer_vertices.vertex_count() as u32;
        for i in 0..=ls {
            let amount = f64::from(i) / f64::from(ls);
            let location = LatLon::interpolate_great_circle(amount, profile.begin, profile.end);
            let altitudes = altitudes_at(sampler, location);
            let globe = sampler.globe();
            let up = globe.surface_normal(location);
            buffer_vertices.push(globe.point_from(location, altitudes[0]) - reference_center, up);
            buffer_vertices.push(globe.point_from(location, altitudes[1]) - reference_center, up);
        }
        for i in 0..ls {
            let l0 = base + 2 * i;
            center_line.extend_from_slice(&[l0, l0 + 2]);
            center_line.extend_from_slice(&[l0 + 1, l0 + 3]);
        }
        center_line.extend_from_slice(&[base, base + 1]);
        let last = base + 2 * ls;
        center_line.extend_from_slice(&[last, last + 1]);
    }

    let mut buffer = GeometryBuffer::new(buffer_vertices.positions, buffer_vertices.normals);
    buffer.push_stream(Topology::Triangles, StreamRole::Fill, fill);
    buffer.push_stream(Topology::Lines, StreamRole::Outline, outline);
    if profile.enable_center_line {
        buffer.push_stream(Topology::Lines, StreamRole::CenterLine, center_line);
    }
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

    fn profile() -> BoxProfile {
        BoxProfile {
            begin: LatLon::from_degrees(0.0, 0.0),
            end: LatLon::from_degrees(1.0, 0.0),
            left_width: 10_000.0,
            right_width: 10_000.0,
            altitudes: [0.0, 1000.0],
            terrain_conforming: [false, false],
            corner_azimuths: CornerAzimuths::default(),
            enable_start_cap: true,
            enable_end_cap: true,
            enable_center_line: false,
            length_segments: 8,
            width_segments: 2,
            collapsed: false,
        }
    }

    #[test]
    fn test_default_corners_are_perpendicular() {
        let globe = globe();
        let p = profile();
        let corners = compute_corners(globe.equatorial_radius(), &p);
        // Due-north leg: left corners west, right corners east.
        assert!(corners.begin_left.lon < p.begin.lon);
        assert!(corners.begin_right.lon > p.begin.lon);
        assert!(corners.end_left.lon < p.end.lon);
        assert!(corners.end_right.lon > p.end.lon);
        // Perpendicular offset equals the width.
        let d = p.begin.great_circle_distance(corners.begin_left) * globe.equatorial_radius();
        assert!((d - p.left_width).abs() < 1.0, "corner offset {d}");
        // Projections collapse onto the endpoints without azimuth overrides.
        assert_eq!(corners.begin_left_proj, p.begin);
        assert_eq!(corners.end_right_proj, p.end);
    }

    #[test]
    fn test_sheared_corner_keeps_width() {
        let globe = globe();
        let mut p = profile();
        // Shear the begin-right corner 45 degrees forward.
        p.corner_azimuths.begin_right = Some(Angle::from_degrees(45.0));
        let corners = compute_corners(globe.equatorial_radius(), &p);
        assert_ne!(corners.begin_right_proj, p.begin, "projection slides forward");
        // The corner is further from the endpoint than the width, but its
        // perpendicular offset from the projected point still matches it.
        let d = corners
            .begin_right_proj
            .great_circle_distance(corners.begin_right)
            * globe.equatorial_radius();
        assert!((d - p.right_width).abs() < 1.0, "perpendicular offset {d}");
    }

    #[test]
    fn test_shear_past_far_end_keeps_default() {
        let globe = globe();
        let mut p = profile();
        // Nearly parallel to the leg: the adjustment would run past the far
        // end and must be ignored.
        p.corner_azimuths.begin_right = Some(Angle::from_degrees(0.5));
        let corners = compute_corners(globe.equatorial_radius(), &p);
        assert_eq!(corners.begin_right_proj, p.begin);
    }

    #[test]
    fn test_box_geometry_counts() {
        let globe = globe();
        let mut sampler = ElevationSampleCache::new(&globe);
        let p = profile();
        let buffer = box_geometry(&mut sampler, 1.0, DVec3::ZERO, &p).unwrap();
        let ws = 2u32;
        let ls = 8u32;
        // Walls: two cap runs of 2*ws+1 and two sides of ls+1, paired.
        let wall_vertices = 2 * (2 * (2 * ws + 1) + 2 * (ls + 1));
        // Caps: two grids of (2*ws+1) x (ls+1).
        let cap_vertices = 2 * (2 * ws + 1) * (ls + 1);
        assert_eq!(buffer.vertex_count() as u32, wall_vertices + cap_vertices);
        let fill = buffer.stream(StreamRole::Fill).unwrap();
        // Wall quads: 2*ws per cap run, ls per side; cap cells: 2*ws * ls.
        let wall_quads = 2 * (2 * ws) + 2 * ls;
        let cap_cells = 2 * (2 * ws) * ls;
        assert_eq!(fill.indices.len() as u32, (wall_quads + cap_cells) * 6);
        assert!(fill
            .indices
            .iter()
            .all(|&i| (i as usize) < buffer.vertex_count()));
    }

    #[test]
    fn test_disabled_caps_drop_fill_but_keep_corners() {
        let globe = globe();
        let mut sampler = ElevationSampleCache::new(&globe);
        let mut p = profile();
        let full = box_geometry(&mut sampler, 1.0, DVec3::ZERO, &p).unwrap();
        p.enable_start_cap = false;
        p.enable_end_cap = false;
        let mut sampler = ElevationSampleCache::new(&globe);
        let open = box_geometry(&mut sampler, 1.0, DVec3::ZERO, &p).unwrap();
        let full_fill = full.stream(StreamRole::Fill).unwrap().indices.len();
        let open_fill = open.stream(StreamRole::Fill).unwrap().indices.len();
        // Each dropped cap wall removes 2*ws quads.
        assert_eq!(full_fill - open_fill, 2 * (2 * 2) * 6);
        // Corner verticals remain in the outline (4 runs x 1 segment).
        let outline = &open.stream(StreamRole::Outline).unwrap().indices;
        assert!(outline.len() >= 8);
    }

    #[test]
    fn test_collapsed_box_has_top_cap_only() {
        let globe = globe();
        let mut sampler = ElevationSampleCache::new(&globe);
        let mut p = profile();
        p.altitudes = [500.0, 500.0];
        p.collapsed = true;
        let buffer = box_geometry(&mut sampler, 1.0, DVec3::ZERO, &p).unwrap();
        let ws = 2u32;
        let ls = 8u32;
        assert_eq!(buffer.vertex_count() as u32, (2 * ws + 1) * (ls + 1));
        let fill = buffer.stream(StreamRole::Fill).unwrap();
        assert_eq!(fill.indices.len() as u32, (2 * ws) * ls * 6);
    }

    #[test]
    fn test_center_line_stream_present_when_enabled() {
        let globe = globe();
        let mut sampler = ElevationSampleCache::new(&globe);
        let mut p = profile();
        p.enable_center_line = true;
        let buffer = box_geometry(&mut sampler, 1.0, DVec3::ZERO, &p).unwrap();
        let center = buffer.stream(StreamRole::CenterLine).unwrap();
        // ls segments at two altitudes plus two end verticals.
        assert_eq!(center.indices.len() as u32, (8 * 2 + 2) * 2);
    }

    #[test]
    fn test_wall_winding_agrees_with_normals() {
        let globe = globe();
        let mut sampler = ElevationSampleCache::new(&globe);
        let buffer = box_geometry(&mut sampler, 1.0, DVec3::ZERO, &profile()).unwrap();
        let fill = buffer.stream(StreamRole::Fill).unwrap().clone();
        for tri in fill.indices.chunks_exact(3) {
            let p = |i: u32| {
                DVec3::new(
                    f64::from(buffer.positions[i as usize * 3]),
                    f64::from(buffer.positions[i as usize * 3 + 1]),
                    f64::from(buffer.positions[i as usize * 3 + 2]),
                )
            };
            let n = |i: u32| {
                DVec3::new(
                    f64::from(buffer.normals[i as usize * 3]),
                    f64::from(buffer.normals[i as usize * 3 + 1]),
                    f64::from(buffer.normals[i as usize * 3 + 2]),
                )
            };
            let face = (p(tri[1]) - p(tri[0])).cross(p(tri[2]) - p(tri[0]));
            let avg = (n(tri[0]) + n(tri[1]) + n(tri[2])) / 3.0;
            if avg.length_squared() > 1e-6 {
                assert!(face.dot(avg) >= 0.0, "triangle {tri:?} winds against normals");
            }
        }
    }
}
