//! Wavefront OBJ loading through `tobj`.

use std::path::Path;

use log::{debug, info, warn};

use crate::error::{MassingError, Result};
use crate::gfx::faces::Material;
use crate::gfx::geometry::MeshData;
use crate::gfx::scene::{MeshNode, SceneNode};

/// Load every model of an OBJ file as the meshes of one model node.
///
/// Missing or broken MTL files are not fatal; meshes then use the default material.
pub fn load_obj(path: impl AsRef<Path>) -> Result<SceneNode> {
    let path = path.as_ref();
    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|e| MassingError::AssetLoad {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let materials = match materials {
        Ok(materials) => materials,
        Err(e) => {
            warn!("no materials for {}: {}", path.display(), e);
            Vec::new()
        }
    };

    info!("{}: {} models, {} materials", path.display(), models.len(), materials.len());

    let mut meshes = Vec::with_capacity(models.len());
    for model in models {
        let mesh = &model.mesh;
        debug!(
            "model '{}': {} vertices, {} triangles",
            model.name,
            mesh.positions.len() / 3,
            mesh.indices.len() / 3
        );

        let mut data = MeshData {
            positions: mesh.positions.chunks_exact(3).map(|p| [p[0], p[1], p[2]]).collect(),
            normals: mesh.normals.chunks_exact(3).map(|n| [n[0], n[1], n[2]]).collect(),
            tex_coords: mesh.texcoords.chunks_exact(2).map(|t| [t[0], t[1]]).collect(),
            colors: Vec::new(),
            indices: Some(mesh.indices.clone()),
        };
        if !data.has_normals() {
            debug!("model '{}' has no usable normals, computing them", model.name);
            compute_vertex_normals(&mut data);
        }

        let material = mesh
            .material_id
            .and_then(|id| materials.get(id))
            .map(|m| Material::new(m.name.clone(), m.diffuse.unwrap_or([0.8, 0.8, 0.8])))
            .unwrap_or_default();

        meshes.push(MeshNode::new(model.name, data).with_material(material));
    }

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string());
    Ok(SceneNode::model(name, meshes))
}

/// Average the face normals around each vertex
pub fn compute_vertex_normals(mesh: &mut MeshData) {
    let mut normals = vec![[0.0f32; 3]; mesh.positions.len()];

    for triangle in 0..mesh.triangle_count() {
        let Some([i0, i1, i2]) = mesh.triangle_indices(triangle) else {
            continue;
        };
        let (v0, v1, v2) = (mesh.positions[i0], mesh.positions[i1], mesh.positions[i2]);

        let edge1 = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
        let edge2 = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];
        let face_normal = [
            edge1[1] * edge2[2] - edge1[2] * edge2[1],
            edge1[2] * edge2[0] - edge1[0] * edge2[2],
            edge1[0] * edge2[1] - edge1[1] * edge2[0],
        ];

        for i in [i0, i1, i2] {
            for axis in 0..3 {
                normals[i][axis] += face_normal[axis];
            }
        }
    }

    for n in normals.iter_mut() {
        let length = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        if length > f32::EPSILON {
            n.iter_mut().for_each(|c| *c /= length);
        } else {
            *n = [0.0, 1.0, 0.0];
        }
    }

    mesh.normals = normals;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const QUAD_OBJ: &str = "o quad\nv 0 0 0\nv 1 0 0\nv 1 0 1\nv 0 0 1\nf 1 3 2\nf 1 4 3\n";

    #[test]
    fn test_load_obj_computes_missing_normals() {
        let path = std::env::temp_dir().join(format!("massing-quad-{}.obj", std::process::id()));
        fs::write(&path, QUAD_OBJ).unwrap();

        let node = load_obj(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(node.meshes.len(), 1);
        let mesh = &node.meshes[0].geometry;
        assert_eq!(mesh.triangle_count(), 2);
        assert!(mesh.has_normals());
        // Counter-clockwise seen from above: normals point up.
        assert!(mesh.normals.iter().all(|n| (n[1] - 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_missing_file_is_asset_error() {
        let err = load_obj("/definitely/not/here.obj").unwrap_err();
        assert!(matches!(err, MassingError::AssetLoad { .. }));
    }
}
