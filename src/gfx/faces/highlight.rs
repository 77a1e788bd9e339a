//! Vertex-colour face highlighting.

use super::classifier::{FaceLabel, FaceMap};
use crate::gfx::geometry::MeshData;

/// Colour of every vertex when nothing is highlighted
pub const BASE_COLOR: [f32; 3] = [0.8, 0.8, 0.8];
pub const HIGHLIGHT_COLOR: [f32; 3] = [1.0, 0.0, 0.0];

/// Paint every vertex with [`BASE_COLOR`], allocating the colour buffer if needed
pub fn reset_colors(mesh: &mut MeshData) {
    mesh.colors.clear();
    mesh.colors.resize(mesh.positions.len(), BASE_COLOR);
}

/// Reset all colours, then paint the vertices of `label`'s triangles red.
///
/// `None` only resets.
pub fn highlight_label(mesh: &mut MeshData, face_map: &FaceMap, label: Option<FaceLabel>) {
    reset_colors(mesh);
    let Some(label) = label else {
        return;
    };
    for triangle in face_map.triangles_with(label) {
        let Some(corners) = mesh.triangle_indices(triangle) else {
            continue;
        };
        for vertex in corners {
            mesh.colors[vertex] = HIGHLIGHT_COLOR;
        }
    }
}
