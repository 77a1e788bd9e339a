//! # Binary glTF
//!
//! A small GLB writer and reader covering what the session produces: triangle
//! meshes with positions, normals, texture coordinates and indices, node
//! transforms, base-colour materials and texture URIs.
//!
//! Every model node becomes a glTF node carrying its TRS; each of its meshes is
//! a child node carrying the mesh matrix. A mesh with face materials is split
//! into one primitive per material group, all sharing the same vertex
//! accessors. Face classification travels in the child node's `extras`, so an
//! exported building stays pickable after import.

use std::collections::{BTreeMap, HashSet};

use cgmath::{Matrix3, Matrix4, Quaternion, SquareMatrix, Vector3};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{MassingError, Result};
use crate::gfx::faces::{Material, TextureRef};
use crate::gfx::geometry::{Aabb, MeshData};
use crate::gfx::math::{decompose_matrix, euler_xyz_from_matrix, euler_xyz_matrix};
use crate::gfx::scene::{FaceData, MeshNode, SceneGraph, SceneNode, TransformState};

const GLB_MAGIC: u32 = 0x4654_6C67;
const GLB_VERSION: u32 = 2;
const CHUNK_JSON: u32 = 0x4E4F_534A;
const CHUNK_BIN: u32 = 0x004E_4942;

const COMPONENT_U16: u32 = 5123;
const COMPONENT_U32: u32 = 5125;
const COMPONENT_F32: u32 = 5126;

const TARGET_ARRAY_BUFFER: u32 = 34962;
const TARGET_ELEMENT_ARRAY_BUFFER: u32 = 34963;

const MODE_TRIANGLES: u32 = 4;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    asset: Asset,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scene: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    scenes: Vec<GltfScene>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    nodes: Vec<Node>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    meshes: Vec<Mesh>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    materials: Vec<GltfMaterial>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    textures: Vec<Texture>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    images: Vec<Image>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    accessors: Vec<Accessor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    buffer_views: Vec<BufferView>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    buffers: Vec<Buffer>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Asset {
    version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    generator: Option<String>,
}

impl Default for Asset {
    fn default() -> Self {
        Self {
            version: "2.0".to_string(),
            generator: Some(concat!("massing ", env!("CARGO_PKG_VERSION")).to_string()),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct GltfScene {
    #[serde(default)]
    nodes: Vec<usize>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Node {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mesh: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    translation: Option<[f64; 3]>,
    /// Quaternion `[x, y, z, w]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rotation: Option<[f64; 4]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scale: Option<[f64; 3]>,
    /// Column-major 4x4
    #[serde(default, skip_serializing_if = "Option::is_none")]
    matrix: Option<[f64; 16]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    extras: Option<NodeExtras>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct NodeExtras {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    faces: Option<FaceData>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Mesh {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    primitives: Vec<Primitive>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Primitive {
    attributes: BTreeMap<String, usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    indices: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    material: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mode: Option<u32>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GltfMaterial {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default)]
    pbr_metallic_roughness: Pbr,
    #[serde(default)]
    double_sided: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Pbr {
    #[serde(default = "white")]
    base_color_factor: [f32; 4],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_color_texture: Option<TextureInfo>,
    #[serde(default)]
    metallic_factor: f32,
    #[serde(default = "one")]
    roughness_factor: f32,
}

impl Default for Pbr {
    fn default() -> Self {
        Self {
            base_color_factor: white(),
            base_color_texture: None,
            metallic_factor: 0.0,
            roughness_factor: one(),
        }
    }
}

fn white() -> [f32; 4] {
    [1.0, 1.0, 1.0, 1.0]
}

fn one() -> f32 {
    1.0
}

#[derive(Debug, Serialize, Deserialize)]
struct TextureInfo {
    index: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct Texture {
    source: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct Image {
    uri: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Accessor {
    buffer_view: usize,
    #[serde(default)]
    byte_offset: usize,
    component_type: u32,
    count: usize,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max: Option<Vec<f32>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BufferView {
    buffer: usize,
    #[serde(default)]
    byte_offset: usize,
    byte_length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    byte_stride: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Buffer {
    byte_length: usize,
}

/// Accumulates the binary chunk and the views/accessors pointing into it
#[derive(Default)]
struct BinWriter {
    bin: Vec<u8>,
    views: Vec<BufferView>,
    accessors: Vec<Accessor>,
}

impl BinWriter {
    fn view(&mut self, bytes: &[u8], target: u32) -> usize {
        pad_to_four(&mut self.bin, 0);
        self.views.push(BufferView {
            buffer: 0,
            byte_offset: self.bin.len(),
            byte_length: bytes.len(),
            byte_stride: None,
            target: Some(target),
        });
        self.bin.extend_from_slice(bytes);
        self.views.len() - 1
    }

    fn accessor(&mut self, view: usize, component_type: u32, count: usize, kind: &str) -> usize {
        self.accessors.push(Accessor {
            buffer_view: view,
            byte_offset: 0,
            component_type,
            count,
            kind: kind.to_string(),
            min: None,
            max: None,
        });
        self.accessors.len() - 1
    }

    fn positions(&mut self, data: &[[f32; 3]]) -> usize {
        let view = self.view(bytemuck::cast_slice(data), TARGET_ARRAY_BUFFER);
        let index = self.accessor(view, COMPONENT_F32, data.len(), "VEC3");
        let bounds = Aabb::from_vertices(data);
        if !bounds.is_empty() {
            let accessor = &mut self.accessors[index];
            accessor.min = Some(vec![bounds.min.x as f32, bounds.min.y as f32, bounds.min.z as f32]);
            accessor.max = Some(vec![bounds.max.x as f32, bounds.max.y as f32, bounds.max.z as f32]);
        }
        index
    }

    fn vec3(&mut self, data: &[[f32; 3]]) -> usize {
        let view = self.view(bytemuck::cast_slice(data), TARGET_ARRAY_BUFFER);
        self.accessor(view, COMPONENT_F32, data.len(), "VEC3")
    }

    fn vec2(&mut self, data: &[[f32; 2]]) -> usize {
        let view = self.view(bytemuck::cast_slice(data), TARGET_ARRAY_BUFFER);
        self.accessor(view, COMPONENT_F32, data.len(), "VEC2")
    }

    fn indices(&mut self, data: &[u32]) -> usize {
        let view = self.view(bytemuck::cast_slice(data), TARGET_ELEMENT_ARRAY_BUFFER);
        self.accessor(view, COMPONENT_U32, data.len(), "SCALAR")
    }
}

fn pad_to_four(bytes: &mut Vec<u8>, fill: u8) {
    while bytes.len() % 4 != 0 {
        bytes.push(fill);
    }
}

/// Collects materials and deduplicated images
#[derive(Default)]
struct MaterialTable {
    materials: Vec<GltfMaterial>,
    textures: Vec<Texture>,
    images: Vec<Image>,
}

impl MaterialTable {
    fn add(&mut self, material: &Material) -> usize {
        let base_color_texture = material.texture.as_ref().map(|texture| {
            let image = match self.images.iter().position(|i| i.uri == texture.uri) {
                Some(existing) => existing,
                None => {
                    self.images.push(Image { uri: texture.uri.clone() });
                    self.images.len() - 1
                }
            };
            self.textures.push(Texture { source: image });
            TextureInfo {
                index: self.textures.len() - 1,
            }
        });

        let [r, g, b] = material.color;
        self.materials.push(GltfMaterial {
            name: Some(material.name.clone()),
            pbr_metallic_roughness: Pbr {
                base_color_factor: [r, g, b, 1.0],
                base_color_texture,
                ..Pbr::default()
            },
            double_sided: material.double_sided,
        });
        self.materials.len() - 1
    }
}

fn matrix_to_array(m: &Matrix4<f64>) -> [f64; 16] {
    let flat: &[f64; 16] = m.as_ref();
    *flat
}

fn array_to_matrix(a: &[f64; 16]) -> Matrix4<f64> {
    Matrix4::new(
        a[0], a[1], a[2], a[3], a[4], a[5], a[6], a[7], a[8], a[9], a[10], a[11], a[12], a[13], a[14], a[15],
    )
}

fn mesh_primitives(mesh: &MeshNode, bin: &mut BinWriter, table: &mut MaterialTable) -> Vec<Primitive> {
    let geometry = &mesh.geometry;

    let mut attributes = BTreeMap::new();
    attributes.insert("POSITION".to_string(), bin.positions(&geometry.positions));
    if geometry.has_normals() {
        attributes.insert("NORMAL".to_string(), bin.vec3(&geometry.normals));
    }
    if !geometry.tex_coords.is_empty() && geometry.tex_coords.len() == geometry.positions.len() {
        attributes.insert("TEXCOORD_0".to_string(), bin.vec2(&geometry.tex_coords));
    }

    let all_indices: Vec<u32> = match &geometry.indices {
        Some(indices) => indices.clone(),
        None => (0..geometry.positions.len() as u32).collect(),
    };

    let primitive = |indices: usize, material: usize| Primitive {
        attributes: attributes.clone(),
        indices: Some(indices),
        material: Some(material),
        mode: Some(MODE_TRIANGLES),
    };

    match &mesh.faces {
        Some(faces) if !faces.materials.groups.is_empty() => {
            let slots: Vec<usize> = faces.materials.materials.iter().map(|m| table.add(m)).collect();
            faces
                .materials
                .groups
                .iter()
                .filter_map(|group| {
                    let start = group.start as usize;
                    let end = start + group.count as usize;
                    let Some(range) = all_indices.get(start..end) else {
                        warn!("material group {}..{} outside index buffer", start, end);
                        return None;
                    };
                    let material = slots.get(group.slot).copied()?;
                    Some(primitive(bin.indices(range), material))
                })
                .collect()
        }
        _ => {
            let material = table.add(&mesh.material);
            vec![primitive(bin.indices(&all_indices), material)]
        }
    }
}

/// Write every exportable node of `graph` into a GLB blob.
///
/// Nodes flagged `skip_export` (helpers, outlines) are left out.
pub fn export_glb<G: SceneGraph + ?Sized>(graph: &G) -> Result<Vec<u8>> {
    let mut doc = Document::default();
    let mut bin = BinWriter::default();
    let mut table = MaterialTable::default();
    let mut roots = Vec::new();

    for id in graph.node_ids() {
        let Some(node) = graph.get(id) else {
            continue;
        };
        if node.skip_export {
            continue;
        }

        let mut children = Vec::with_capacity(node.meshes.len());
        for mesh in &node.meshes {
            let primitives = mesh_primitives(mesh, &mut bin, &mut table);
            doc.meshes.push(Mesh {
                name: Some(mesh.name.clone()),
                primitives,
            });
            doc.nodes.push(Node {
                name: Some(mesh.name.clone()),
                mesh: Some(doc.meshes.len() - 1),
                matrix: (mesh.local != Matrix4::identity()).then(|| matrix_to_array(&mesh.local)),
                extras: mesh.faces.as_ref().map(|faces| NodeExtras {
                    faces: Some(faces.clone()),
                }),
                ..Node::default()
            });
            children.push(doc.nodes.len() - 1);
        }

        let t = &node.transform;
        let q = Quaternion::from(euler_xyz_matrix(t.rotation));
        doc.nodes.push(Node {
            name: Some(node.name.clone()),
            children,
            translation: Some([t.position.x, t.position.y, t.position.z]),
            rotation: Some([q.v.x, q.v.y, q.v.z, q.s]),
            scale: Some([t.scale.x, t.scale.y, t.scale.z]),
            ..Node::default()
        });
        roots.push(doc.nodes.len() - 1);
    }

    doc.scene = Some(0);
    doc.scenes.push(GltfScene { nodes: roots });
    doc.materials = table.materials;
    doc.textures = table.textures;
    doc.images = table.images;
    pad_to_four(&mut bin.bin, 0);
    if !bin.bin.is_empty() {
        doc.buffers.push(Buffer {
            byte_length: bin.bin.len(),
        });
    }
    doc.accessors = bin.accessors;
    doc.buffer_views = bin.views;

    let out = write_glb(&doc, &bin.bin)?;
    debug!("exported GLB: {} nodes, {} bytes", doc.nodes.len(), out.len());
    Ok(out)
}

/// Lay out the GLB header, JSON chunk and (if non-empty) binary chunk
fn write_glb(doc: &Document, bin: &[u8]) -> Result<Vec<u8>> {
    let mut json = serde_json::to_vec(doc)?;
    pad_to_four(&mut json, b' ');

    let has_bin = !bin.is_empty();
    let total = 12 + 8 + json.len() + if has_bin { 8 + bin.len() } else { 0 };
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    out.extend_from_slice(&GLB_VERSION.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(json.len() as u32).to_le_bytes());
    out.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    out.extend_from_slice(&json);
    if has_bin {
        out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        out.extend_from_slice(&CHUNK_BIN.to_le_bytes());
        out.extend_from_slice(bin);
    }
    Ok(out)
}

fn read_u32(bytes: &[u8], offset: usize) -> Result<u32> {
    bytes
        .get(offset..offset + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or_else(|| MassingError::Gltf("unexpected end of file".into()))
}

/// Split a GLB blob into its JSON document and binary chunk
fn split_glb(bytes: &[u8]) -> Result<(Document, &[u8])> {
    if read_u32(bytes, 0)? != GLB_MAGIC {
        return Err(MassingError::Gltf("not a binary glTF file".into()));
    }
    let version = read_u32(bytes, 4)?;
    if version != GLB_VERSION {
        return Err(MassingError::Gltf(format!("unsupported GLB version {}", version)));
    }
    let length = (read_u32(bytes, 8)? as usize).min(bytes.len());

    let mut offset = 12;
    let mut json = None;
    let mut bin: &[u8] = &[];
    while offset + 8 <= length {
        let chunk_length = read_u32(bytes, offset)? as usize;
        let chunk_type = read_u32(bytes, offset + 4)?;
        let end = (offset + 8)
            .checked_add(chunk_length)
            .filter(|&end| end <= length)
            .ok_or_else(|| MassingError::Gltf("chunk runs past end of file".into()))?;
        let data = &bytes[offset + 8..end];
        match chunk_type {
            CHUNK_JSON => json = Some(data),
            CHUNK_BIN => bin = data,
            other => debug!("skipping unknown GLB chunk {:#x}", other),
        }
        offset = end;
    }

    let json = json.ok_or_else(|| MassingError::Gltf("missing JSON chunk".into()))?;
    Ok((serde_json::from_slice(json)?, bin))
}

struct Reader<'a> {
    doc: &'a Document,
    bin: &'a [u8],
}

impl Reader<'_> {
    fn accessor_bytes(&self, index: usize, element_size: usize) -> Result<(&Accessor, &[u8])> {
        let accessor = self
            .doc
            .accessors
            .get(index)
            .ok_or_else(|| MassingError::Gltf(format!("missing accessor {}", index)))?;
        let view = self
            .doc
            .buffer_views
            .get(accessor.buffer_view)
            .ok_or_else(|| MassingError::Gltf(format!("missing buffer view {}", accessor.buffer_view)))?;
        if view.byte_stride.is_some_and(|stride| stride != element_size) {
            return Err(MassingError::Gltf("interleaved buffer views are not supported".into()));
        }
        let outside = || MassingError::Gltf(format!("accessor {} outside buffer", index));
        let start = view.byte_offset.checked_add(accessor.byte_offset).ok_or_else(outside)?;
        let end = accessor
            .count
            .checked_mul(element_size)
            .and_then(|len| start.checked_add(len))
            .ok_or_else(outside)?;
        let bytes = self.bin.get(start..end).ok_or_else(outside)?;
        Ok((accessor, bytes))
    }

    fn floats<const N: usize>(&self, index: usize) -> Result<Vec<[f32; N]>> {
        let (accessor, bytes) = self.accessor_bytes(index, 4 * N)?;
        if accessor.component_type != COMPONENT_F32 {
            return Err(MassingError::Gltf(format!("accessor {} is not float", index)));
        }
        Ok(bytes
            .chunks_exact(4 * N)
            .map(|element| {
                let mut out = [0.0f32; N];
                for (i, component) in element.chunks_exact(4).enumerate() {
                    out[i] = bytemuck::pod_read_unaligned(component);
                }
                out
            })
            .collect())
    }

    fn indices(&self, index: usize) -> Result<Vec<u32>> {
        let component_type = self
            .doc
            .accessors
            .get(index)
            .map(|a| a.component_type)
            .ok_or_else(|| MassingError::Gltf(format!("missing accessor {}", index)))?;
        match component_type {
            COMPONENT_U32 => {
                let (_, bytes) = self.accessor_bytes(index, 4)?;
                Ok(bytes.chunks_exact(4).map(bytemuck::pod_read_unaligned::<u32>).collect())
            }
            COMPONENT_U16 => {
                let (_, bytes) = self.accessor_bytes(index, 2)?;
                Ok(bytes
                    .chunks_exact(2)
                    .map(|b| bytemuck::pod_read_unaligned::<u16>(b) as u32)
                    .collect())
            }
            other => Err(MassingError::Gltf(format!("unsupported index type {}", other))),
        }
    }

    fn material(&self, index: Option<usize>) -> Material {
        let Some(m) = index.and_then(|i| self.doc.materials.get(i)) else {
            return Material::default();
        };
        let [r, g, b, _] = m.pbr_metallic_roughness.base_color_factor;
        let texture = m
            .pbr_metallic_roughness
            .base_color_texture
            .as_ref()
            .and_then(|info| self.doc.textures.get(info.index))
            .and_then(|t| self.doc.images.get(t.source))
            .map(|image| TextureRef::new(image.uri.clone()));
        Material {
            name: m.name.clone().unwrap_or_else(|| "material".to_string()),
            color: [r, g, b],
            texture,
            double_sided: m.double_sided,
        }
    }

    /// Merge all primitives of a mesh; primitives sharing vertex accessors share vertices
    fn mesh(&self, index: usize) -> Result<(MeshData, Material)> {
        let mesh = self
            .doc
            .meshes
            .get(index)
            .ok_or_else(|| MassingError::Gltf(format!("missing mesh {}", index)))?;

        let mut data = MeshData::new();
        let mut indices = Vec::new();
        let mut current_positions = None;
        let mut base = 0u32;
        let mut normals_complete = true;

        for primitive in &mesh.primitives {
            if primitive.mode.is_some_and(|mode| mode != MODE_TRIANGLES) {
                warn!("skipping non-triangle primitive in mesh {}", index);
                continue;
            }
            let Some(&position) = primitive.attributes.get("POSITION") else {
                continue;
            };

            if current_positions != Some(position) {
                current_positions = Some(position);
                base = u32::try_from(data.positions.len())
                    .map_err(|_| MassingError::Gltf(format!("mesh {} has too many vertices", index)))?;
                let positions = self.floats::<3>(position)?;
                let count = positions.len();
                data.positions.extend(positions);
                match primitive.attributes.get("NORMAL") {
                    Some(&normal) if normals_complete => data.normals.extend(self.floats::<3>(normal)?),
                    _ => normals_complete = false,
                }
                if let Some(&uv) = primitive.attributes.get("TEXCOORD_0") {
                    data.tex_coords.extend(self.floats::<2>(uv)?);
                }
                if primitive.indices.is_none() {
                    indices.extend(base..base + count as u32);
                }
            }
            if let Some(accessor) = primitive.indices {
                for i in self.indices(accessor)? {
                    let rebased = i
                        .checked_add(base)
                        .ok_or_else(|| MassingError::Gltf(format!("index {} out of range in mesh {}", i, index)))?;
                    indices.push(rebased);
                }
            }
        }

        if !normals_complete || data.normals.len() != data.positions.len() {
            data.normals.clear();
        }
        if data.tex_coords.len() != data.positions.len() {
            data.tex_coords.clear();
        }
        data.indices = Some(indices);
        data.validate()
            .map_err(|e| MassingError::Gltf(format!("mesh {}: {}", index, e)))?;

        let material = self.material(mesh.primitives.first().and_then(|p| p.material));
        Ok((data, material))
    }

    fn node_transform(node: &Node) -> TransformState {
        if let Some(matrix) = &node.matrix {
            let (scale, rotation, position) = decompose_matrix(&array_to_matrix(matrix));
            let mut transform = TransformState {
                scale,
                rotation,
                position,
            };
            transform.clamp_scale();
            return transform;
        }
        let mut transform = TransformState::default();
        if let Some([x, y, z]) = node.translation {
            transform.position = Vector3::new(x, y, z);
        }
        if let Some([x, y, z]) = node.scale {
            transform.scale = Vector3::new(x, y, z);
        }
        if let Some([x, y, z, w]) = node.rotation {
            transform.rotation = euler_xyz_from_matrix(&Matrix3::from(Quaternion::new(w, x, y, z)));
        }
        transform.clamp_scale();
        transform
    }

    fn mesh_node(&self, node: &Node, local: Matrix4<f64>) -> Result<Option<MeshNode>> {
        let Some(mesh_index) = node.mesh else {
            return Ok(None);
        };
        let (geometry, material) = self.mesh(mesh_index)?;
        let mut mesh = MeshNode::new(node.name.clone().unwrap_or_else(|| "mesh".to_string()), geometry)
            .with_local(local)
            .with_material(material);
        if let Some(faces) = node.extras.as_ref().and_then(|e| e.faces.clone()) {
            if faces.map.len() == mesh.geometry.triangle_count() {
                mesh = mesh.with_faces(faces);
            } else {
                warn!("face labels of '{}' do not match its triangles, dropped", mesh.name);
            }
        }
        Ok(Some(mesh))
    }
}

/// Read the root nodes of a GLB blob as model nodes.
///
/// Direct mesh children become meshes of their root, positioned by their own
/// transform. Deeper hierarchies are flattened into the same root.
pub fn import_glb(bytes: &[u8]) -> Result<Vec<SceneNode>> {
    let (doc, bin) = split_glb(bytes)?;
    let reader = Reader { doc: &doc, bin };

    let roots: Vec<usize> = match doc.scene.and_then(|s| doc.scenes.get(s)).or(doc.scenes.first()) {
        Some(scene) => scene.nodes.clone(),
        None => (0..doc.nodes.len()).collect(),
    };

    let mut out = Vec::with_capacity(roots.len());
    for root in roots {
        let node = doc
            .nodes
            .get(root)
            .ok_or_else(|| MassingError::Gltf(format!("missing node {}", root)))?;

        let mut meshes = Vec::new();
        if let Some(mesh) = reader.mesh_node(node, Matrix4::identity())? {
            meshes.push(mesh);
        }

        let mut visited = HashSet::from([root]);
        let mut stack: Vec<(usize, Matrix4<f64>)> = node.children.iter().map(|&c| (c, Matrix4::identity())).collect();
        while let Some((index, parent)) = stack.pop() {
            if !visited.insert(index) {
                return Err(MassingError::Gltf("node hierarchy contains a cycle".into()));
            }
            let child = doc
                .nodes
                .get(index)
                .ok_or_else(|| MassingError::Gltf(format!("missing node {}", index)))?;
            let local = parent * Reader::node_transform(child).matrix();
            if let Some(mesh) = reader.mesh_node(child, local)? {
                meshes.push(mesh);
            }
            stack.extend(child.children.iter().rev().map(|&c| (c, local)));
        }
        meshes.reverse();

        let name = node.name.clone().unwrap_or_else(|| format!("node_{}", root));
        out.push(SceneNode::model(name, meshes).with_transform(Reader::node_transform(node)));
    }

    debug!("imported GLB: {} root nodes", out.len());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::faces::{build_face_materials, classify_faces};
    use crate::gfx::geometry::{extrude_footprint, generate_cube, FootprintParams};
    use crate::gfx::scene::{NodeKind, Scene, MIN_SCALE};
    use cgmath::Rad;

    fn building() -> MeshNode {
        let square = [[-5.0, -5.0], [5.0, -5.0], [5.0, 5.0], [-5.0, 5.0]];
        let mesh = extrude_footprint(&square, &FootprintParams { scale: 1.0, height: 5.0 }).unwrap();
        let map = classify_faces(&mesh).unwrap();
        let mut materials = build_face_materials(&map, &[Material::default()]);
        materials.apply_texture(map.labels()[0], TextureRef::new("textures/roof.png"));
        MeshNode::new("faces", mesh)
            .with_local(Matrix4::from_angle_x(Rad(-std::f64::consts::FRAC_PI_2)))
            .with_faces(FaceData { map, materials })
    }

    #[test]
    fn test_round_trip_preserves_counts_and_transforms() {
        let mut scene = Scene::new();
        let transform = TransformState {
            scale: Vector3::new(2.0, 1.5, 0.5),
            rotation: Vector3::new(0.1, 0.7, -0.3),
            position: Vector3::new(12.0, 0.0, -4.0),
        };
        scene.attach(SceneNode::model("building", vec![building()]).with_transform(transform));
        scene.attach(SceneNode::model("cube", vec![MeshNode::new("cube", generate_cube())]));
        scene.attach(SceneNode::new("grid", NodeKind::Grid { size: 10.0, divisions: 10 }));

        let bytes = export_glb(&scene).unwrap();
        assert_eq!(&bytes[0..4], b"glTF");
        assert_eq!(bytes.len() % 4, 0);

        let nodes = import_glb(&bytes).unwrap();
        assert_eq!(nodes.len(), 2);

        let original = scene.get(scene.find_by_name("building").unwrap()).unwrap();
        let imported = &nodes[0];
        assert_eq!(imported.name, "building");
        assert_eq!(imported.meshes.len(), 1);
        assert_eq!(
            imported.meshes[0].geometry.vertex_count(),
            original.meshes[0].geometry.vertex_count()
        );
        assert_eq!(
            imported.meshes[0].geometry.triangle_count(),
            original.meshes[0].geometry.triangle_count()
        );
        for axis in 0..3 {
            assert!((imported.transform.position[axis] - transform.position[axis]).abs() < 1e-9);
            assert!((imported.transform.scale[axis] - transform.scale[axis]).abs() < 1e-9);
            assert!((imported.transform.rotation[axis] - transform.rotation[axis]).abs() < 1e-9);
        }

        let faces = imported.meshes[0].faces.as_ref().unwrap();
        assert_eq!(faces.map, original.meshes[0].faces.as_ref().unwrap().map);
        let local = imported.meshes[0].local;
        let expected = original.meshes[0].local;
        for c in 0..4 {
            for r in 0..4 {
                assert!((local[c][r] - expected[c][r]).abs() < 1e-9);
            }
        }

        let cube = &nodes[1];
        assert_eq!(cube.meshes[0].geometry.triangle_count(), 12);
    }

    #[test]
    fn test_textures_become_images() {
        let mut scene = Scene::new();
        scene.attach(SceneNode::model("building", vec![building()]));
        let bytes = export_glb(&scene).unwrap();
        let (doc, _) = split_glb(&bytes).unwrap();

        assert_eq!(doc.images.len(), 1);
        assert_eq!(doc.images[0].uri, "textures/roof.png");
        // One primitive per material group.
        let groups = building().faces.unwrap().materials.groups.len();
        assert_eq!(doc.meshes[0].primitives.len(), groups);
        // POSITION accessors carry bounds.
        assert!(doc.accessors[0].min.is_some());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(import_glb(b"not a glb file"), Err(MassingError::Gltf(_))));
        assert!(import_glb(&[]).is_err());
    }

    fn cube_glb() -> (Document, Vec<u8>) {
        let mut scene = Scene::new();
        scene.attach(SceneNode::model("cube", vec![MeshNode::new("cube", generate_cube())]));
        let bytes = export_glb(&scene).unwrap();
        let (doc, bin) = split_glb(&bytes).unwrap();
        (doc, bin.to_vec())
    }

    fn index_accessor(doc: &Document) -> usize {
        doc.meshes[0].primitives[0].indices.unwrap()
    }

    #[test]
    fn test_dangling_index_is_rejected() {
        let (doc, mut bin) = cube_glb();
        let accessor = &doc.accessors[index_accessor(&doc)];
        let offset = doc.buffer_views[accessor.buffer_view].byte_offset + accessor.byte_offset;
        bin[offset..offset + 4].copy_from_slice(&9999u32.to_le_bytes());

        let bytes = write_glb(&doc, &bin).unwrap();
        assert!(matches!(import_glb(&bytes), Err(MassingError::Gltf(_))));
    }

    #[test]
    fn test_partial_triangle_is_rejected() {
        let (mut doc, bin) = cube_glb();
        let accessor = index_accessor(&doc);
        doc.accessors[accessor].count -= 1;

        let bytes = write_glb(&doc, &bin).unwrap();
        assert!(matches!(import_glb(&bytes), Err(MassingError::Gltf(_))));
    }

    #[test]
    fn test_huge_accessor_count_is_an_error() {
        let (mut doc, bin) = cube_glb();
        let position = doc.meshes[0].primitives[0].attributes["POSITION"];
        doc.accessors[position].count = usize::MAX / 2;

        let bytes = write_glb(&doc, &bin).unwrap();
        assert!(matches!(import_glb(&bytes), Err(MassingError::Gltf(_))));
    }

    #[test]
    fn test_oversized_chunk_length_is_an_error() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&GLB_MAGIC.to_le_bytes());
        bytes.extend_from_slice(&GLB_VERSION.to_le_bytes());
        bytes.extend_from_slice(&28u32.to_le_bytes());
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
        bytes.extend_from_slice(&CHUNK_JSON.to_le_bytes());
        bytes.extend_from_slice(b"{}  {}  ");
        assert!(matches!(import_glb(&bytes), Err(MassingError::Gltf(_))));
    }

    #[test]
    fn test_child_cycle_is_an_error() {
        let doc = Document {
            nodes: vec![
                Node {
                    children: vec![1],
                    ..Node::default()
                },
                Node {
                    children: vec![0],
                    ..Node::default()
                },
            ],
            scenes: vec![GltfScene { nodes: vec![0] }],
            ..Document::default()
        };
        let bytes = write_glb(&doc, &[]).unwrap();

        match import_glb(&bytes) {
            Err(MassingError::Gltf(message)) => assert!(message.contains("cycle")),
            other => panic!("expected a cycle error, got {:?}", other.map(|n| n.len())),
        }
    }

    #[test]
    fn test_tiny_scale_is_raised_to_minimum() {
        let (mut doc, bin) = cube_glb();
        let root = doc.scenes[0].nodes[0];
        doc.nodes[root].scale = Some([1.0, 0.01, -2.0]);

        let bytes = write_glb(&doc, &bin).unwrap();
        let nodes = import_glb(&bytes).unwrap();
        let scale = nodes[0].transform.scale;
        assert_eq!(scale, Vector3::new(1.0, MIN_SCALE, MIN_SCALE));
    }
}
