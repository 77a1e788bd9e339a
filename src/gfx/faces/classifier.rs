//! Per-triangle face labels for extruded footprints.

use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{MassingError, Result};
use crate::gfx::geometry::MeshData;

/// Triangles whose normal Z component is below this are walls
pub const SIDE_NORMAL_EPSILON: f32 = 0.01;

/// Logical face of an extruded footprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum FaceLabel {
    Top,
    Bottom,
    /// Side wall `n`, numbered in emission order
    Edge(u32),
}

impl fmt::Display for FaceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaceLabel::Top => write!(f, "top"),
            FaceLabel::Bottom => write!(f, "bottom"),
            FaceLabel::Edge(n) => write!(f, "edge_{}", n),
        }
    }
}

impl FromStr for FaceLabel {
    type Err = MassingError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "top" => Ok(FaceLabel::Top),
            "bottom" => Ok(FaceLabel::Bottom),
            _ => s
                .strip_prefix("edge_")
                .and_then(|n| n.parse().ok())
                .map(FaceLabel::Edge)
                .ok_or_else(|| MassingError::UnsupportedGeometry(format!("unknown face label '{}'", s))),
        }
    }
}

impl From<FaceLabel> for String {
    fn from(label: FaceLabel) -> Self {
        label.to_string()
    }
}

impl TryFrom<String> for FaceLabel {
    type Error = MassingError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// One label per triangle, in index-buffer order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceMap {
    labels: Vec<FaceLabel>,
}

impl FaceMap {
    pub fn new(labels: Vec<FaceLabel>) -> Self {
        Self { labels }
    }

    pub fn labels(&self) -> &[FaceLabel] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn label_of(&self, triangle: usize) -> Option<FaceLabel> {
        self.labels.get(triangle).copied()
    }

    /// Indices of the triangles carrying `label`
    pub fn triangles_with(&self, label: FaceLabel) -> impl Iterator<Item = usize> + '_ {
        self.labels
            .iter()
            .enumerate()
            .filter(move |(_, l)| **l == label)
            .map(|(i, _)| i)
    }

    /// Distinct labels in order of first appearance
    pub fn distinct(&self) -> Vec<FaceLabel> {
        let mut seen = Vec::new();
        for label in &self.labels {
            if !seen.contains(label) {
                seen.push(*label);
            }
        }
        seen
    }

    /// Number of distinct side walls
    pub fn edge_count(&self) -> usize {
        self.distinct()
            .iter()
            .filter(|l| matches!(l, FaceLabel::Edge(_)))
            .count()
    }
}

/// Label every triangle of an extruded mesh as `top`, `bottom` or `edge_<n>`.
///
/// Reads the normal Z of each triangle's first vertex. Consecutive wall
/// triangles are paired into one edge, which holds for meshes built by
/// [`extrude_footprint`](crate::gfx::geometry::extrude_footprint). Fails on
/// meshes without an index buffer or normals.
pub fn classify_faces(mesh: &MeshData) -> Result<FaceMap> {
    let indices = mesh
        .indices
        .as_ref()
        .ok_or_else(|| MassingError::UnsupportedGeometry("mesh has no index buffer".into()))?;
    if !indices.is_empty() && !mesh.has_normals() {
        return Err(MassingError::UnsupportedGeometry("mesh has no normals".into()));
    }

    let mut labels = Vec::with_capacity(indices.len() / 3);
    let mut edge_id = 0u32;
    let mut half_pair = false;

    for (triangle, tri) in indices.chunks_exact(3).enumerate() {
        let normal = mesh.normals.get(tri[0] as usize).ok_or_else(|| {
            MassingError::UnsupportedGeometry(format!("index {} out of range", tri[0]))
        })?;
        let nz = normal[2];

        if nz.abs() < SIDE_NORMAL_EPSILON {
            labels.push(FaceLabel::Edge(edge_id));
            if half_pair {
                edge_id += 1;
            }
            half_pair = !half_pair;
        } else {
            if half_pair {
                debug!("triangle {} interrupts wall pair edge_{}", triangle, edge_id);
                edge_id += 1;
                half_pair = false;
            }
            labels.push(if nz > 0.0 { FaceLabel::Top } else { FaceLabel::Bottom });
        }
    }

    Ok(FaceMap::new(labels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::{extrude_footprint, FootprintParams, SAMPLE_FOOTPRINT};

    #[test]
    fn test_label_display_and_parse() {
        assert_eq!(FaceLabel::Edge(12).to_string(), "edge_12");
        assert_eq!("top".parse::<FaceLabel>().unwrap(), FaceLabel::Top);
        assert_eq!("edge_3".parse::<FaceLabel>().unwrap(), FaceLabel::Edge(3));
        assert!("edge_x".parse::<FaceLabel>().is_err());
        assert_eq!(serde_json::to_string(&FaceLabel::Bottom).unwrap(), "\"bottom\"");
    }

    #[test]
    fn test_rectangle_has_four_edges_top_and_bottom() {
        let rect = [[0.0, 0.0], [20.0, 0.0], [20.0, 8.0], [0.0, 8.0]];
        let mesh = extrude_footprint(&rect, &FootprintParams { scale: 1.0, height: 3.0 }).unwrap();
        let map = classify_faces(&mesh).unwrap();

        assert_eq!(map.len(), mesh.triangle_count());
        assert_eq!(map.edge_count(), 4);
        assert_eq!(map.triangles_with(FaceLabel::Top).count(), 2);
        assert_eq!(map.triangles_with(FaceLabel::Bottom).count(), 2);
        for n in 0..4 {
            assert_eq!(map.triangles_with(FaceLabel::Edge(n)).count(), 2);
        }
    }

    #[test]
    fn test_sixteen_point_footprint() {
        let mesh = extrude_footprint(
            &SAMPLE_FOOTPRINT,
            &FootprintParams { scale: 1.0, height: 5.0 },
        )
        .unwrap();
        let map = classify_faces(&mesh).unwrap();

        let distinct = map.distinct();
        assert_eq!(distinct.iter().filter(|l| **l == FaceLabel::Top).count(), 1);
        assert_eq!(distinct.iter().filter(|l| **l == FaceLabel::Bottom).count(), 1);
        assert_eq!(map.edge_count(), 16);
        assert_eq!(distinct.len(), 18);
        assert_eq!(map.len(), mesh.triangle_count());
        assert_eq!(map.label_of(map.len() - 1), Some(FaceLabel::Edge(15)));
    }

    #[test]
    fn test_non_indexed_mesh_is_rejected() {
        let mesh = MeshData {
            positions: vec![[0.0; 3]; 3],
            normals: vec![[0.0, 0.0, 1.0]; 3],
            ..Default::default()
        };
        let err = classify_faces(&mesh).unwrap_err();
        assert!(matches!(err, MassingError::UnsupportedGeometry(_)));
        assert!(err.to_string().contains("index buffer"));
    }

    #[test]
    fn test_missing_normals_are_rejected() {
        let mesh = MeshData {
            positions: vec![[0.0; 3]; 3],
            indices: Some(vec![0, 1, 2]),
            ..Default::default()
        };
        assert!(classify_faces(&mesh).is_err());
    }

    #[test]
    fn test_interrupted_pair_closes_edge() {
        let wall = [1.0, 0.0, 0.0];
        let up = [0.0, 0.0, 1.0];
        // wall, cap, wall, wall: the lone wall triangle becomes its own edge.
        let mesh = MeshData {
            positions: vec![[0.0; 3]; 4],
            normals: vec![wall, up, wall, wall],
            indices: Some(vec![0, 0, 0, 1, 1, 1, 2, 2, 2, 3, 3, 3]),
            ..Default::default()
        };
        let map = classify_faces(&mesh).unwrap();
        assert_eq!(
            map.labels(),
            &[FaceLabel::Edge(0), FaceLabel::Top, FaceLabel::Edge(1), FaceLabel::Edge(1)]
        );
    }

    #[test]
    fn test_empty_mesh_yields_empty_map() {
        let mesh = MeshData {
            indices: Some(Vec::new()),
            ..Default::default()
        };
        let map = classify_faces(&mesh).unwrap();
        assert!(map.is_empty());
        assert_eq!(map.edge_count(), 0);
    }
}
