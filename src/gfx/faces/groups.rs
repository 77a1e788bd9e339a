//! Per-face material slots.
//!
//! Each face label gets its own material slot so a single face can be textured
//! on its own. The mesh's index buffer is split into contiguous runs of equal
//! label; each run becomes a [`MaterialGroup`] drawing with its label's slot.

use std::collections::BTreeMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::classifier::{FaceLabel, FaceMap};

/// An image referenced by URI; decoding is up to the renderer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureRef {
    pub uri: String,
}

impl TextureRef {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    /// Linear RGB base colour
    pub color: [f32; 3],
    pub texture: Option<TextureRef>,
    pub double_sided: bool,
}

impl Material {
    pub fn new(name: impl Into<String>, color: [f32; 3]) -> Self {
        Self {
            name: name.into(),
            color,
            texture: None,
            double_sided: false,
        }
    }

    pub fn textured(name: impl Into<String>, texture: TextureRef) -> Self {
        Self {
            name: name.into(),
            color: [1.0, 1.0, 1.0],
            texture: Some(texture),
            double_sided: true,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new("default", [0.8, 0.8, 0.8])
    }
}

/// A range of the index buffer drawn with one material slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialGroup {
    /// First index (not triangle) of the run
    pub start: u32,
    /// Number of indices in the run
    pub count: u32,
    pub slot: usize,
}

/// Materials and draw groups of one face-classified mesh
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceMaterials {
    pub materials: Vec<Material>,
    pub groups: Vec<MaterialGroup>,
    slots: BTreeMap<FaceLabel, usize>,
}

impl FaceMaterials {
    /// Material slot used by `label`
    pub fn slot_of(&self, label: FaceLabel) -> Option<usize> {
        self.slots.get(&label).copied()
    }

    pub fn material_for(&self, label: FaceLabel) -> Option<&Material> {
        self.slot_of(label).and_then(|slot| self.materials.get(slot))
    }

    /// Put `texture` on the material of `label`. Returns `false` for an unknown label.
    pub fn apply_texture(&mut self, label: FaceLabel, texture: TextureRef) -> bool {
        let Some(slot) = self.slot_of(label) else {
            warn!("no material slot for face {}", label);
            return false;
        };
        debug!("texturing face {} (slot {}) with {}", label, slot, texture.uri);
        self.materials[slot].texture = Some(texture);
        true
    }

    pub fn labels(&self) -> impl Iterator<Item = (&FaceLabel, &usize)> {
        self.slots.iter()
    }
}

/// Build one material slot per label and one draw group per contiguous run.
///
/// Slot `i` starts as a copy of `palette[i % palette.len()]` renamed after its
/// label; an empty palette falls back to [`Material::default`].
pub fn build_face_materials(face_map: &FaceMap, palette: &[Material]) -> FaceMaterials {
    let mut out = FaceMaterials::default();

    let mut run: Option<(FaceLabel, u32)> = None;
    let close_run = |out: &mut FaceMaterials, label: FaceLabel, start: u32, end: u32| {
        let slot = match out.slots.get(&label) {
            Some(&slot) => slot,
            None => {
                let slot = out.materials.len();
                let mut material = if palette.is_empty() {
                    Material::default()
                } else {
                    palette[slot % palette.len()].clone()
                };
                material.name = label.to_string();
                out.materials.push(material);
                out.slots.insert(label, slot);
                slot
            }
        };
        out.groups.push(MaterialGroup {
            start: start * 3,
            count: (end - start) * 3,
            slot,
        });
    };

    for (triangle, &label) in face_map.labels().iter().enumerate() {
        let triangle = triangle as u32;
        match run {
            Some((current, _)) if current == label => {}
            Some((current, start)) => {
                close_run(&mut out, current, start, triangle);
                run = Some((label, triangle));
            }
            None => run = Some((label, triangle)),
        }
    }
    if let Some((current, start)) = run {
        close_run(&mut out, current, start, face_map.len() as u32);
    }

    out
}
