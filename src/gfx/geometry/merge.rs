//! Vertex deduplication for triangle soups.

use std::collections::HashMap;

use log::debug;

use super::MeshData;

/// Attribute values closer than this collapse into one vertex
const MERGE_TOLERANCE: f32 = 1e-4;

fn quantize(v: f32) -> i64 {
    (v / MERGE_TOLERANCE).round() as i64
}

/// Hash key over every attribute the mesh carries
fn vertex_key(mesh: &MeshData, i: usize) -> Vec<i64> {
    let mut key = Vec::with_capacity(11);
    key.extend(mesh.positions[i].iter().map(|&v| quantize(v)));
    if let Some(n) = mesh.normals.get(i) {
        key.extend(n.iter().map(|&v| quantize(v)));
    }
    if let Some(uv) = mesh.tex_coords.get(i) {
        key.extend(uv.iter().map(|&v| quantize(v)));
    }
    if let Some(c) = mesh.colors.get(i) {
        key.extend(c.iter().map(|&v| quantize(v)));
    }
    key
}

/// Merge vertices whose attributes match within tolerance and return an indexed
/// mesh. Triangle order is preserved.
pub fn merge_vertices(mesh: &MeshData) -> MeshData {
    let mut merged = MeshData::new();
    let mut lookup: HashMap<Vec<i64>, u32> = HashMap::new();
    let mut indices = Vec::with_capacity(mesh.triangle_count() * 3);

    for triangle in 0..mesh.triangle_count() {
        let Some(corners) = mesh.triangle_indices(triangle) else {
            continue;
        };
        for source in corners {
            let key = vertex_key(mesh, source);
            let index = *lookup.entry(key).or_insert_with(|| {
                let next = merged.positions.len() as u32;
                merged.positions.push(mesh.positions[source]);
                if let Some(n) = mesh.normals.get(source) {
                    merged.normals.push(*n);
                }
                if let Some(uv) = mesh.tex_coords.get(source) {
                    merged.tex_coords.push(*uv);
                }
                if let Some(c) = mesh.colors.get(source) {
                    merged.colors.push(*c);
                }
                next
            });
            indices.push(index);
        }
    }

    debug!(
        "merged {} vertices into {}",
        mesh.vertex_count(),
        merged.vertex_count()
    );
    merged.indices = Some(indices);
    merged
}

/// Return the mesh unchanged if it already has an index buffer, otherwise merge it
pub fn ensure_indexed(mesh: MeshData) -> MeshData {
    if mesh.is_indexed() {
        mesh
    } else {
        merge_vertices(&mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_soup() -> MeshData {
        let a = [0.0, 0.0, 0.0];
        let b = [1.0, 0.0, 0.0];
        let c = [1.0, 1.0, 0.0];
        // Within tolerance of the corner at (0, 1, 0).
        let d = [0.00001, 1.0, 0.0];
        MeshData {
            positions: vec![a, b, c, a, c, d],
            normals: vec![[0.0, 0.0, 1.0]; 6],
            ..Default::default()
        }
    }

    #[test]
    fn test_merge_collapses_shared_corners() {
        let merged = merge_vertices(&quad_soup());
        assert_eq!(merged.vertex_count(), 4);
        assert_eq!(merged.triangle_count(), 2);
        assert_eq!(merged.indices.as_deref(), Some(&[0, 1, 2, 0, 2, 3][..]));
    }

    #[test]
    fn test_differing_normals_stay_separate() {
        let mut soup = quad_soup();
        soup.normals[3] = [0.0, 1.0, 0.0];
        let merged = merge_vertices(&soup);
        assert_eq!(merged.vertex_count(), 5);
    }

    #[test]
    fn test_ensure_indexed_keeps_existing_indices() {
        let indexed = MeshData {
            positions: vec![[0.0; 3]; 3],
            indices: Some(vec![2, 1, 0]),
            ..Default::default()
        };
        assert_eq!(ensure_indexed(indexed.clone()), indexed);
        assert!(ensure_indexed(quad_soup()).is_indexed());
    }
}
