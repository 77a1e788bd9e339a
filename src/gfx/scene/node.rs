use cgmath::{Matrix4, SquareMatrix};
use serde::{Deserialize, Serialize};

use super::transform::TransformState;
use crate::error::{MassingError, Result};
use crate::gfx::faces::{FaceMap, FaceMaterials, Material};
use crate::gfx::geometry::{Aabb, MeshData};

/// What a node stands for. Only models are authored; the rest are helpers the
/// host renders but exports skip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NodeKind {
    Model,
    Outline,
    Grid { size: f64, divisions: u32 },
    AmbientLight { intensity: f64 },
    DirectionalLight { intensity: f64 },
    /// Wireframe box around the active model, 0xRRGGBB
    BoxHelper { color: u32 },
}

/// Face classification and per-face materials of a building mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceData {
    pub map: FaceMap,
    pub materials: FaceMaterials,
}

/// Geometry placed inside a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshNode {
    pub name: String,
    pub geometry: MeshData,
    /// Mesh-to-node matrix
    pub local: Matrix4<f64>,
    /// Material used when the mesh has no per-face materials
    pub material: Material,
    /// Present on pickable building meshes
    pub faces: Option<FaceData>,
}

impl MeshNode {
    pub fn new(name: impl Into<String>, geometry: MeshData) -> Self {
        Self {
            name: name.into(),
            geometry,
            local: Matrix4::identity(),
            material: Material::default(),
            faces: None,
        }
    }

    pub fn with_local(mut self, local: Matrix4<f64>) -> Self {
        self.local = local;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn with_faces(mut self, faces: FaceData) -> Self {
        self.faces = Some(faces);
        self
    }

    /// Bounds in node space
    pub fn bounds(&self) -> Aabb {
        self.geometry.bounding_box().transform(&self.local)
    }

    /// Buffers are consistent and face labels cover every triangle
    pub fn validate(&self) -> Result<()> {
        self.geometry.validate()?;
        if let Some(faces) = &self.faces {
            let triangles = self.geometry.triangle_count();
            if faces.map.len() != triangles {
                return Err(MassingError::UnsupportedGeometry(format!(
                    "mesh '{}' has {} face labels for {} triangles",
                    self.name,
                    faces.map.len(),
                    triangles
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub name: String,
    pub kind: NodeKind,
    pub transform: TransformState,
    pub meshes: Vec<MeshNode>,
    pub visible: bool,
    /// Left out of GLB and JSON exports
    pub skip_export: bool,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        let skip_export = !matches!(kind, NodeKind::Model);
        Self {
            name: name.into(),
            kind,
            transform: TransformState::default(),
            meshes: Vec::new(),
            visible: true,
            skip_export,
        }
    }

    pub fn model(name: impl Into<String>, meshes: Vec<MeshNode>) -> Self {
        let mut node = Self::new(name, NodeKind::Model);
        node.meshes = meshes;
        node
    }

    pub fn with_transform(mut self, transform: TransformState) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_mesh(mut self, mesh: MeshNode) -> Self {
        self.meshes.push(mesh);
        self
    }

    /// Bounds of all meshes in the node's untransformed space
    pub fn local_bounds(&self) -> Aabb {
        self.meshes
            .iter()
            .fold(Aabb::empty(), |acc, mesh| acc.union(&mesh.bounds()))
    }

    /// Bounds in world space under the current transform
    pub fn world_bounds(&self) -> Aabb {
        self.local_bounds().transform(&self.transform.matrix())
    }

    /// World matrix of mesh `index`
    pub fn mesh_world_matrix(&self, index: usize) -> Option<Matrix4<f64>> {
        self.meshes
            .get(index)
            .map(|mesh| self.transform.matrix() * mesh.local)
    }

    pub fn is_pickable(&self) -> bool {
        self.visible && self.meshes.iter().any(|m| m.faces.is_some())
    }
}
