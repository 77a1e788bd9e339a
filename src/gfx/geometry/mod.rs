//! # Mesh Geometry
//!
//! CPU-side mesh buffers and the procedures that build them: footprint
//! extrusion for building massing, vertex merging for triangle soups loaded from
//! files, and simple primitives.
//!
//! ## Usage
//!
//! ```rust
//! use massing::gfx::geometry::{extrude_footprint, FootprintParams};
//!
//! let square = [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]];
//! let mesh = extrude_footprint(&square, &FootprintParams { scale: 1.0, height: 5.0 }).unwrap();
//! assert_eq!(mesh.triangle_count(), 2 + 2 + 8);
//! ```

pub mod bounds;
pub mod extrude;
pub mod merge;
pub mod primitives;

use cgmath::Point3;
use serde::{Deserialize, Serialize};

use crate::error::{MassingError, Result};

pub use bounds::Aabb;
pub use extrude::{extrude_footprint, prepare_footprint, FootprintParams, SAMPLE_FOOTPRINT};
pub use merge::{ensure_indexed, merge_vertices};
pub use primitives::*;

/// Mesh buffers in the layout GPU and glTF consumers expect
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    /// Vertex positions (x, y, z)
    pub positions: Vec<[f32; 3]>,
    /// Per-vertex normals; empty when the source had none
    pub normals: Vec<[f32; 3]>,
    /// Texture coordinates (u, v); empty when the source had none
    pub tex_coords: Vec<[f32; 2]>,
    /// Per-vertex RGB colours; empty until a vertex-colour highlight is applied
    pub colors: Vec<[f32; 3]>,
    /// Triangle indices, or `None` for a plain triangle soup
    pub indices: Option<Vec<u32>>,
}

impl MeshData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_indexed(&self) -> bool {
        self.indices.is_some()
    }

    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty() && self.normals.len() == self.positions.len()
    }

    /// Number of triangles, whether or not the mesh is indexed
    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.positions.len() / 3,
        }
    }

    /// Vertex indices of triangle `triangle`; `None` when the triangle or one of
    /// its corners is out of range
    pub fn triangle_indices(&self, triangle: usize) -> Option<[usize; 3]> {
        let base = triangle.checked_mul(3)?;
        let corners = match &self.indices {
            Some(indices) => {
                let slice = indices.get(base..base.checked_add(3)?)?;
                [slice[0] as usize, slice[1] as usize, slice[2] as usize]
            }
            None => [base, base.checked_add(1)?, base.checked_add(2)?],
        };
        corners.iter().all(|&i| i < self.positions.len()).then_some(corners)
    }

    /// Corner positions of triangle `triangle`
    pub fn triangle(&self, triangle: usize) -> Option<[[f32; 3]; 3]> {
        let [a, b, c] = self.triangle_indices(triangle)?;
        Some([self.positions[a], self.positions[b], self.positions[c]])
    }

    /// Check that indices and per-vertex attributes agree with the positions.
    ///
    /// Meshes coming from files go through this before they reach a scene.
    pub fn validate(&self) -> Result<()> {
        let vertices = self.positions.len();
        match &self.indices {
            Some(indices) => {
                if indices.len() % 3 != 0 {
                    return Err(MassingError::UnsupportedGeometry(format!(
                        "{} indices do not form whole triangles",
                        indices.len()
                    )));
                }
                if let Some(bad) = indices.iter().find(|&&i| i as usize >= vertices) {
                    return Err(MassingError::UnsupportedGeometry(format!(
                        "index {} out of range for {} vertices",
                        bad, vertices
                    )));
                }
            }
            None if vertices % 3 != 0 => {
                return Err(MassingError::UnsupportedGeometry(format!(
                    "{} unindexed vertices do not form whole triangles",
                    vertices
                )));
            }
            None => {}
        }

        for (name, len) in [
            ("normals", self.normals.len()),
            ("tex_coords", self.tex_coords.len()),
            ("colors", self.colors.len()),
        ] {
            if len != 0 && len != vertices {
                return Err(MassingError::UnsupportedGeometry(format!(
                    "{} {} for {} vertices",
                    len, name, vertices
                )));
            }
        }
        Ok(())
    }

    /// Local axis-aligned bounds of all vertex positions
    pub fn bounding_box(&self) -> Aabb {
        Aabb::from_vertices(&self.positions)
    }

    /// Lowest vertex position after applying `matrix`; `None` for an empty mesh
    pub fn min_y_transformed(&self, matrix: &cgmath::Matrix4<f64>) -> Option<f64> {
        self.positions
            .iter()
            .map(|p| {
                crate::gfx::math::transform_point(
                    matrix,
                    Point3::new(p[0] as f64, p[1] as f64, p[2] as f64),
                )
                .y
            })
            .reduce(f64::min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> MeshData {
        MeshData {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
            indices: Some(vec![0, 1, 2, 0, 2, 3]),
            ..MeshData::default()
        }
    }

    #[test]
    fn test_out_of_range_triangles_are_none() {
        let mut mesh = quad();
        assert_eq!(mesh.triangle_indices(1), Some([0, 2, 3]));
        assert_eq!(mesh.triangle(2), None);

        mesh.indices = Some(vec![0, 1, 2, 0, 2, 9999]);
        assert!(mesh.triangle(0).is_some());
        assert_eq!(mesh.triangle(1), None);
    }

    #[test]
    fn test_validate_rejects_inconsistent_buffers() {
        assert!(quad().validate().is_ok());

        let mut bad_index = quad();
        bad_index.indices = Some(vec![0, 1, 2, 0, 2, 9999]);
        assert!(matches!(bad_index.validate(), Err(MassingError::UnsupportedGeometry(_))));

        let mut partial = quad();
        partial.indices = Some(vec![0, 1, 2, 0]);
        assert!(partial.validate().is_err());

        let mut short_normals = quad();
        short_normals.normals = vec![[0.0, 0.0, 1.0]];
        assert!(short_normals.validate().is_err());

        let soup = MeshData {
            positions: vec![[0.0; 3]; 4],
            ..MeshData::default()
        };
        assert!(soup.validate().is_err());
    }
}
