//! Normal reconstruction from index topology, for surfaces with no cheap
//! analytic normal (curtain strips, draped polygon caps). Face normals are
//! accumulated per vertex and normalized at the end, so shared vertices get
//! smooth shading.

/// Accumulate area-weighted face normals of an indexed triangle list into
/// `normals` (xyz-interleaved, same vertex count as `positions`).
pub fn accumulate_triangle_normals(positions: &[f32], indices: &[u32], normals: &mut [f32]) {
    for tri in indices.chunks_exact(3) {
        add_face_normal(positions, normals, tri[0], tri[1], tri[2]);
    }
}

/// Accumulate face normals of a triangle strip. Every second triangle in a
/// strip has reversed winding; the accumulation flips it back.
pub fn accumulate_strip_normals(positions: &[f32], indices: &[u32], normals: &mut [f32]) {
    for (i, window) in indices.windows(3).enumerate() {
        if i % 2 == 0 {
            add_face_normal(positions, normals, window[0], window[1], window[2]);
        } else {
            add_face_normal(positions, normals, window[1], window[0], window[2]);
        }
    }
}

/// Normalize accumulated normals in place. Vertices no face touched keep a
/// zero normal.
pub fn normalize_accumulated(normals: &mut [f32]) {
    for n in normals.chunks_exact_mut(3) {
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        if len > 0.0 {
            n[0] /= len;
            n[1] /= len;
            n[2] /= len;
        }
    }
}

/// Per-vertex normals of an indexed triangle list.
#[must_use]
pub fn indexed_triangle_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
    let mut normals = vec![0.0f32; positions.len()];
    accumulate_triangle_normals(positions, indices, &mut normals);
    normalize_accumulated(&mut normals);
    normals
}

/// Per-vertex normals of a triangle strip.
#[must_use]
pub fn indexed_strip_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
    let mut normals = vec![0.0f32; positions.len()];
    accumulate_strip_normals(positions, indices, &mut normals);
    normalize_accumulated(&mut normals);
    normals
}

fn add_face_normal(positions: &[f32], normals: &mut [f32], a: u32, b: u32, c: u32) {
    let pa = vertex(positions, a);
    let pb = vertex(positions, b);
    let pc = vertex(positions, c);
    let e1 = [pb[0] - pa[0], pb[1] - pa[1], pb[2] - pa[2]];
    let e2 = [pc[0] - pa[0], pc[1] - pa[1], pc[2] - pa[2]];
    // Cross product, unnormalized: the magnitude weights by face area.
    let n = [
        e1[1] * e2[2] - e1[2] * e2[1],
        e1[2] * e2[0] - e1[0] * e2[2],
        e1[0] * e2[1] - e1[1] * e2[0],
    ];
    for &v in &[a, b, c] {
        let base = v as usize * 3;
        normals[base] += n[0];
        normals[base + 1] += n[1];
        normals[base + 2] += n[2];
    }
}

fn vertex(positions: &[f32], index: u32) -> [f32; 3] {
    let base = index as usize * 3;
    [positions[base], positions[base + 1], positions[base + 2]]
}
