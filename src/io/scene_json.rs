//! JSON scene documents: every exportable node, meshes and face data included.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::gfx::scene::{SceneGraph, SceneNode};

/// Document version written by [`export_json`]
pub const SCENE_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    pub version: u32,
    pub nodes: Vec<SceneNode>,
}

impl SceneDocument {
    /// Snapshot of the exportable nodes of `graph`, in attach order
    pub fn from_graph<G: SceneGraph + ?Sized>(graph: &G) -> Self {
        let nodes = graph
            .node_ids()
            .into_iter()
            .filter_map(|id| graph.get(id))
            .filter(|node| !node.skip_export)
            .cloned()
            .collect();
        Self {
            version: SCENE_FORMAT_VERSION,
            nodes,
        }
    }
}

pub fn export_json<G: SceneGraph + ?Sized>(graph: &G) -> Result<String> {
    let document = SceneDocument::from_graph(graph);
    debug!("exporting {} nodes as JSON", document.nodes.len());
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Parse a JSON scene document; every mesh must have consistent buffers
pub fn import_json(json: &str) -> Result<Vec<SceneNode>> {
    let document: SceneDocument = serde_json::from_str(json)?;
    for node in &document.nodes {
        for mesh in &node.meshes {
            mesh.validate()?;
        }
    }
    debug!("imported JSON scene v{} with {} nodes", document.version, document.nodes.len());
    Ok(document.nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MassingError;
    use crate::gfx::faces::{build_face_materials, classify_faces};
    use crate::gfx::geometry::{extrude_footprint, FootprintParams, SAMPLE_FOOTPRINT};
    use crate::gfx::scene::{FaceData, MeshNode, NodeKind, Scene, TransformState};
    use cgmath::Vector3;

    #[test]
    fn test_round_trip_keeps_models_and_drops_helpers() {
        let mesh = extrude_footprint(&SAMPLE_FOOTPRINT, &FootprintParams::default()).unwrap();
        let map = classify_faces(&mesh).unwrap();
        let materials = build_face_materials(&map, &[]);
        let building = SceneNode::model(
            "building",
            vec![MeshNode::new("faces", mesh).with_faces(FaceData { map, materials })],
        )
        .with_transform(TransformState::new().with_position(Vector3::new(1.0, 0.0, -2.0)));

        let mut scene = Scene::new();
        scene.attach(SceneNode::new("light", NodeKind::AmbientLight { intensity: 0.5 }));
        scene.attach(building.clone());

        let json = export_json(&scene).unwrap();
        let nodes = import_json(&json).unwrap();
        assert_eq!(nodes.len(), 1);

        let restored = &nodes[0];
        assert_eq!(restored.name, "building");
        assert_eq!(restored.kind, NodeKind::Model);
        assert_eq!(restored.transform, building.transform);

        let (a, b) = (&restored.meshes[0], &building.meshes[0]);
        assert_eq!(a.faces.as_ref().map(|f| &f.map), b.faces.as_ref().map(|f| &f.map));
        assert_eq!(a.geometry.indices, b.geometry.indices);
        for (p, q) in a.geometry.positions.iter().zip(&b.geometry.positions) {
            for axis in 0..3 {
                assert!((p[axis] - q[axis]).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(import_json("{\"nodes\": 3}"), Err(MassingError::Json(_))));
    }

    fn exported_building() -> SceneDocument {
        let mesh = extrude_footprint(&SAMPLE_FOOTPRINT, &FootprintParams::default()).unwrap();
        let map = classify_faces(&mesh).unwrap();
        let materials = build_face_materials(&map, &[]);
        let mut scene = Scene::new();
        scene.attach(SceneNode::model(
            "building",
            vec![MeshNode::new("faces", mesh).with_faces(FaceData { map, materials })],
        ));
        serde_json::from_str(&export_json(&scene).unwrap()).unwrap()
    }

    #[test]
    fn test_dangling_index_is_rejected() {
        let mut document = exported_building();
        let indices = document.nodes[0].meshes[0].geometry.indices.as_mut().unwrap();
        *indices.last_mut().unwrap() = 9999;

        let json = serde_json::to_string(&document).unwrap();
        assert!(matches!(import_json(&json), Err(MassingError::UnsupportedGeometry(_))));
    }

    #[test]
    fn test_partial_triangle_is_rejected() {
        let mut document = exported_building();
        document.nodes[0].meshes[0].geometry.indices.as_mut().unwrap().pop();

        let json = serde_json::to_string(&document).unwrap();
        assert!(matches!(import_json(&json), Err(MassingError::UnsupportedGeometry(_))));
    }

    #[test]
    fn test_face_labels_must_cover_triangles() {
        let mut document = exported_building();
        let mesh = &mut document.nodes[0].meshes[0];
        let geometry = &mut mesh.geometry;
        let indices = geometry.indices.as_mut().unwrap();
        let (a, b, c) = (indices[0], indices[1], indices[2]);
        indices.extend([a, b, c]);

        let json = serde_json::to_string(&document).unwrap();
        assert!(import_json(&json).is_err());
    }
}
