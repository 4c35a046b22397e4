//! The unit sphere generator: an octahedron subdivided onto the unit sphere.
//! Every vertex doubles as its own normal, and the result is independent of
//! any globe state, so one mesh per resolution serves every sphere instance
//! through a translate-and-scale transform at draw time.

use aerovol_cache::{GeometryBuffer, StreamRole, Topology};
use hashbrown::{HashMap, HashSet};

/// Build a unit sphere with `subdivisions` refinement passes. Vertex count
/// is `4 * 4^subdivisions + 2`.
#[must_use]
pub fn unit_sphere_geometry(subdivisions: u32) -> GeometryBuffer {
    let mut vertices: Vec<[f32; 3]> = vec![
        [1.0, 0.0, 0.0],
        [-1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
    ];
    // Octahedron faces, wound counter-clockwise seen from outside.
    let mut triangles: Vec<[u32; 3]> = vec![
        [4, 0, 2],
        [4, 2, 1],
        [4, 1, 3],
        [4, 3, 0],
        [5, 2, 0],
        [5, 1, 2],
        [5, 3, 1],
        [5, 0, 3],
    ];

    for _ in 0..subdivisions {
        let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
        let mut midpoint = |vertices: &mut Vec<[f32; 3]>, a: u32, b: u32| -> u32 {
            let key = (a.min(b), a.max(b));
            *midpoints.entry(key).or_insert_with(|| {
                let pa = vertices[a as usize];
                let pb = vertices[b as usize];
                let m = [pa[0] + pb[0], pa[1] + pb[1], pa[2] + pb[2]];
                let len = (m[0] * m[0] + m[1] * m[1] + m[2] * m[2]).sqrt();
                vertices.push([m[0] / len, m[1] / len, m[2] / len]);
                (vertices.len() - 1) as u32
            })
        };
        let mut next = Vec::with_capacity(triangles.len() * 4);
        for tri in &triangles {
            let m01 = midpoint(&mut vertices, tri[0], tri[1]);
            let m12 = midpoint(&mut vertices, tri[1], tri[2]);
            let m20 = midpoint(&mut vertices, tri[2], tri[0]);
            next.push([tri[0], m01, m20]);
            next.push([m01, tri[1], m12]);
            next.push([m20, m12, tri[2]]);
            next.push([m01, m12, m20]);
        }
        triangles = next;
    }

    let mut fill = Vec::with_capacity(triangles.len() * 3);
    let mut edges: HashSet<(u32, u32)> = HashSet::new();
    for tri in &triangles {
        fill.extend_from_slice(tri);
        for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
            edges.insert((a.min(b), a.max(b)));
        }
    }
    let mut outline = Vec::with_capacity(edges.len() * 2);
    for (a, b) in edges {
        outline.push(a);
        outline.push(b);
    }

    let flat: Vec<f32> = vertices.iter().flat_map(|v| *v).collect();
    let mut buffer = GeometryBuffer::new(flat.clone(), flat);
    buffer.push_stream(Topology::Triangles, StreamRole::Fill, fill);
    buffer.push_stream(Topology::Lines, StreamRole::Outline, outline);
    buffer
}
