//! Homogeneous clip-space clipping and fan triangulation.
//!
//! Grounded on `spec.md`'s §4.6.1 description of Sutherland–Hodgman
//! clipping against the six canonical half-spaces, implemented the
//! way the teacher structures small, pure geometry helpers (e.g.
//! `buffers.rs`'s `find_memory_type`): a handful of free functions
//! operating on `glam` vectors, no shared state.

use glam::Vec4;

/// One of the six canonical clip-space half-spaces a triangle is
/// clipped against, expressed as a plane `dot(plane, v) >= 0`.
#[derive(Debug, Clone, Copy)]
struct ClipPlane {
    normal: Vec4,
}

impl ClipPlane {
    fn distance(&self, v: Vec4) -> f32 {
        self.normal.dot(v)
    }
}

/// Near(`z>=0`), far(`w-z>=0`), left(`w+x>=0`), right(`w-x>=0`),
/// bottom(`w+y>=0`), top(`w-y>=0`).
const CLIP_PLANES: [ClipPlane; 6] = [
    ClipPlane { normal: Vec4::new(0.0, 0.0, 1.0, 0.0) },
    ClipPlane { normal: Vec4::new(0.0, 0.0, -1.0, 1.0) },
    ClipPlane { normal: Vec4::new(1.0, 0.0, 0.0, 1.0) },
    ClipPlane { normal: Vec4::new(-1.0, 0.0, 0.0, 1.0) },
    ClipPlane { normal: Vec4::new(0.0, 1.0, 0.0, 1.0) },
    ClipPlane { normal: Vec4::new(0.0, -1.0, 0.0, 1.0) },
];

/// One vertex of the polygon clipping produces.
///
/// Every clip-plane intersection is an affine combination of the
/// *original* triangle's three vertices — composing two affine
/// combinations (one per plane crossed) is itself affine — so rather
/// than chain each new vertex to the two polygon-local vertices that
/// produced it (which stops referring to the original triangle once a
/// vertex crosses more than one plane), each [`ClipVertex`] carries
/// its barycentric weight against the original `(a, b, c)` directly.
/// The caller interpolates every per-vertex shader output with
/// `bary` against the original triangle's three output slots,
/// regardless of how many planes this vertex crossed.
#[derive(Debug, Clone, Copy)]
pub struct ClipVertex {
    /// Clip-space position of this vertex.
    pub position: Vec4,
    /// Barycentric weight against the original `(a, b, c)`, summing
    /// to 1. Original, unclipped vertices have a single `1.0` entry.
    pub bary: [f32; 3],
}

fn lerp_bary(a: [f32; 3], b: [f32; 3], w: f32) -> [f32; 3] {
    [a[0] * (1.0 - w) + b[0] * w, a[1] * (1.0 - w) + b[1] * w, a[2] * (1.0 - w) + b[2] * w]
}

/// Clips the triangle `[a, b, c]` (clip-space positions) against the
/// six canonical half-spaces using Sutherland–Hodgman with
/// double-buffered vertex lists.
///
/// Returns the clipped polygon's vertices in fan order. An empty
/// result means the triangle was entirely clipped away.
pub fn clip_triangle(a: Vec4, b: Vec4, c: Vec4) -> Vec<ClipVertex> {
    let mut polygon: Vec<ClipVertex> = vec![
        ClipVertex { position: a, bary: [1.0, 0.0, 0.0] },
        ClipVertex { position: b, bary: [0.0, 1.0, 0.0] },
        ClipVertex { position: c, bary: [0.0, 0.0, 1.0] },
    ];

    for plane in CLIP_PLANES.iter() {
        if polygon.is_empty() {
            break;
        }
        let mut output = Vec::with_capacity(polygon.len() + 1);
        let n = polygon.len();
        for i in 0..n {
            let curr = polygon[i];
            let next = polygon[(i + 1) % n];
            let curr_dist = plane.distance(curr.position);
            let next_dist = plane.distance(next.position);
            let curr_inside = curr_dist >= 0.0;
            let next_inside = next_dist >= 0.0;

            if curr_inside {
                output.push(curr);
            }
            if curr_inside != next_inside {
                let w = curr_dist / (curr_dist - next_dist);
                let position = curr.position * (1.0 - w) + next.position * w;
                let bary = lerp_bary(curr.bary, next.bary, w);
                output.push(ClipVertex { position, bary });
            }
        }
        polygon = output;
    }

    polygon
}

/// Fan-triangulates a convex polygon of `n` vertices (indices
/// `0..n`), pairing vertex 0 with each consecutive edge.
///
/// Returns up to `n - 2` triangles as `(i0, i1, i2)` index triples.
pub fn fan_triangulate(n: usize) -> Vec<(usize, usize, usize)> {
    if n < 3 {
        return Vec::new();
    }
    (1..n - 1).map(|i| (0, i, i + 1)).collect()
}
