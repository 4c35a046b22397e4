//! Pure geometry generators. Each produces vertex/normal/index data for one
//! parametric surface family; shapes assemble the pieces into cached
//! [`GeometryBuffer`](aerovol_cache::GeometryBuffer)s. Positions are emitted
//! relative to a caller-chosen reference center to keep f32 precision.

use aerovol_geo::LatLon;
use aerovol_globe::ElevationSampleCache;
use glam::DVec3;

pub mod boxgen;
pub mod curtain;
pub mod cylinder;
pub mod elliptical;
pub mod normals;
pub mod orbit;
pub mod polygon;
pub mod sphere;

/// Which side of the parametric surface faces the viewer. `Inward` flips
/// both winding order and normals, so the same surface can serve as the
/// inner wall of an annulus or the underside cap of a volume.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    Outward,
    Inward,
}

impl Orientation {
    #[must_use]
    pub(crate) fn normal_sign(self) -> f64 {
        match self {
            Orientation::Outward => 1.0,
            Orientation::Inward => -1.0,
        }
    }
}

/// Raw vertex output of a generator: xyz-interleaved f32 positions and
/// normals of equal length.
#[derive(Clone, Debug, Default)]
pub struct VertexData {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
}

impl VertexData {
    pub(crate) fn with_capacity(vertices: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices * 3),
            normals: Vec::with_capacity(vertices * 3),
        }
    }

    pub(crate) fn push(&mut self, position: DVec3, normal: DVec3) {
        self.positions.push(position.x as f32);
        self.positions.push(position.y as f32);
        self.positions.push(position.z as f32);
        self.normals.push(normal.x as f32);
        self.normals.push(normal.y as f32);
        self.normals.push(normal.z as f32);
    }

    pub(crate) fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub(crate) fn append(&mut self, other: &mut VertexData) {
        self.positions.append(&mut other.positions);
        self.normals.append(&mut other.normals);
    }
}

/// Model point of a location at `altitude`, with the exaggerated terrain
/// elevation added when the surface conforms.
pub(crate) fn surface_point(
    sampler: &mut ElevationSampleCache<'_>,
    vertical_exaggeration: f64,
    location: LatLon,
    altitude: f64,
    conforming: bool,
) -> DVec3 {
    let altitude = if conforming {
        altitude + vertical_exaggeration * sampler.elevation(location)
    } else {
        altitude
    };
    sampler.globe().point_from(location, altitude)
}

/// Triangle indices over a `cols` x `rows` vertex grid laid out row-major
/// (index = row * cols + col). Two triangles per cell; `Inward` reverses the
/// winding.
#[must_use]
pub(crate) fn grid_fill_indices(cols: u32, rows: u32, orientation: Orientation) -> Vec<u32> {
    let mut indices = Vec::with_capacity(((cols - 1) * (rows - 1) * 6) as usize);
    for row in 0..rows - 1 {
        for col in 0..cols - 1 {
            let a = row * cols + col;
            let b = a + 1;
            let c = a + cols;
            let d = c + 1;
            match orientation {
                Orientation::Outward => {
                    indices.extend_from_slice(&[a, b, d, a, d, c]);
                }
                Orientation::Inward => {
                    indices.extend_from_slice(&[a, d, b, a, c, d]);
                }
            }
        }
    }
    indices
}

/// Line indices tracing the first and last rows of a row-major grid.
#[must_use]
pub(crate) fn grid_outline_indices(cols: u32, rows: u32) -> Vec<u32> {
    let mut indices = Vec::with_capacity(((cols - 1) * 4) as usize);
    let top = (rows - 1) * cols;
    for col in 0..cols - 1 {
        indices.extend_from_slice(&[col, col + 1]);
        indices.extend_from_slice(&[top + col, top + col + 1]);
    }
    indices
}

/// Index pattern whose triangles face along `normal`, for a planar-ish grid
/// cell with corners `a` (row 0, col 0), `b` (row 0, col 1), `c` (row 1,
/// col 0).
pub(crate) fn winding_for(a: DVec3, b: DVec3, c: DVec3, normal: DVec3) -> Orientation {
    if (b - a).cross(c - a).dot(normal) >= 0.0 {
        Orientation::Outward
    } else {
        Orientation::Inward
    }
}

/// Horizontal outward normal of a wall ridge at `location`: the direction of
/// the ring tangent crossed with the surface up vector. `tangent` is the
/// chord toward the next ring location in model coordinates.
pub(crate) fn ridge_normal(up: DVec3, tangent: DVec3, orientation: Orientation) -> DVec3 {
    let n = tangent.cross(up);
    let n = if n.length_squared() > 0.0 {
        n.normalize()
    } else {
        up
    };
    n * orientation.normal_sign()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_fill_index_count_and_bounds() {
        let indices = grid_fill_indices(5, 3, Orientation::Outward);
        assert_eq!(indices.len(), 4 * 2 * 6);
        assert!(indices.iter().all(|&i| i < 15));
    }

    #[test]
    fn test_inward_reverses_winding() {
        let out = grid_fill_indices(2, 2, Orientation::Outward);
        let inw = grid_fill_indices(2, 2, Orientation::Inward);
        assert_eq!(out, vec![0, 1, 3, 0, 3, 2]);
        assert_eq!(inw, vec![0, 3, 1, 0, 2, 3]);
    }

    #[test]
    fn test_grid_outline_traces_first_and_last_rows() {
        let indices = grid_outline_indices(3, 4);
        assert_eq!(indices, vec![0, 1, 9, 10, 1, 2, 10, 11]);
    }

    #[test]
    fn test_ridge_normal_perpendicular_to_both() {
        let up = DVec3::Z;
        let tangent = DVec3::X;
        let n = ridge_normal(up, tangent, Orientation::Outward);
        assert!((n - DVec3::new(0.0, -1.0, 0.0)).length() < 1e-12);
        let flipped = ridge_normal(up, tangent, Orientation::Inward);
        assert!((flipped - DVec3::new(0.0, 1.0, 0.0)).length() < 1e-12);
    }
}
