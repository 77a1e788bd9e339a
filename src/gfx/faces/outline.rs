//! Face outlines.
//!
//! The outline of a face is the set of edges used by exactly one of its
//! triangles: the four sides of a wall quad, or the perimeter of a cap. Each
//! edge becomes a thin tube so it stays visible at any line-width limit.

use std::collections::HashMap;

use cgmath::Point3;

use super::classifier::{FaceLabel, FaceMap};
use crate::gfx::geometry::{generate_tube, MeshData};

pub const OUTLINE_RADIUS: f64 = 0.04;
pub const OUTLINE_RADIAL_SEGMENTS: u32 = 4;
/// Cyan
pub const OUTLINE_COLOR: [f32; 3] = [0.0, 1.0, 1.0];

/// Positions closer than this are the same corner
const CORNER_TOLERANCE: f32 = 1e-4;

type CornerKey = [i64; 3];

fn corner_key(p: [f32; 3]) -> CornerKey {
    [
        (p[0] / CORNER_TOLERANCE).round() as i64,
        (p[1] / CORNER_TOLERANCE).round() as i64,
        (p[2] / CORNER_TOLERANCE).round() as i64,
    ]
}

fn to_point(p: [f32; 3]) -> Point3<f64> {
    Point3::new(p[0] as f64, p[1] as f64, p[2] as f64)
}

/// Boundary edges of `label` in mesh-local coordinates, in first-seen order
pub fn boundary_edges(mesh: &MeshData, face_map: &FaceMap, label: FaceLabel) -> Vec<(Point3<f64>, Point3<f64>)> {
    // Undirected edge -> (use count, first-seen order, endpoints)
    let mut edges: HashMap<(CornerKey, CornerKey), (u32, usize, [f32; 3], [f32; 3])> = HashMap::new();

    for triangle in face_map.triangles_with(label) {
        let Some(corners) = mesh.triangle(triangle) else {
            continue;
        };
        for k in 0..3 {
            let (a, b) = (corners[k], corners[(k + 1) % 3]);
            let (ka, kb) = (corner_key(a), corner_key(b));
            if ka == kb {
                continue;
            }
            let key = if ka < kb { (ka, kb) } else { (kb, ka) };
            let order = edges.len();
            edges.entry(key).or_insert((0, order, a, b)).0 += 1;
        }
    }

    let mut boundary: Vec<_> = edges.into_values().filter(|(uses, ..)| *uses == 1).collect();
    boundary.sort_by_key(|(_, order, ..)| *order);
    boundary
        .into_iter()
        .map(|(_, _, a, b)| (to_point(a), to_point(b)))
        .collect()
}

/// One tube mesh per boundary edge of `label`, in mesh-local coordinates
pub fn build_outline(mesh: &MeshData, face_map: &FaceMap, label: FaceLabel) -> Vec<MeshData> {
    boundary_edges(mesh, face_map, label)
        .into_iter()
        .map(|(a, b)| generate_tube(a, b, OUTLINE_RADIUS, OUTLINE_RADIAL_SEGMENTS))
        .collect()
}
