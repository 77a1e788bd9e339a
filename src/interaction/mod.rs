//! # Face Interaction
//!
//! Turns pointer picks on building meshes into face highlights and click
//! effects. Hover and click keep independent [`LabelTracker`]s, so a face that
//! is both hovered and clicked is tracked twice, and both react only when their
//! face actually changes.
//!
//! Highlights come in two styles:
//!
//! - [`HighlightStyle::VertexColor`] repaints the mesh colour buffer
//! - [`HighlightStyle::Outline`] attaches a node of thin tubes along the face border
//!
//! Outlines are rebuilt from scratch on every change.

pub mod tracker;

use cgmath::Point3;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::gfx::camera::Camera;
use crate::gfx::faces::outline::OUTLINE_COLOR;
use crate::gfx::faces::{build_outline, highlight_label, Material, TextureRef};
use crate::gfx::geometry::Aabb;
use crate::gfx::picking::{pick, screen_to_ray, PickCandidate};
use crate::gfx::scene::{MeshNode, NodeId, NodeKind, SceneGraph, SceneNode};

pub use tracker::{FaceKey, LabelChange, LabelTracker};

/// How a hovered face is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HighlightStyle {
    /// Paint the face's vertices red
    VertexColor,
    /// Cyan tubes along the face border
    #[default]
    Outline,
}

/// One-shot side effect of clicking a new face
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ClickEffect {
    /// Put the texture on the clicked face's material slot
    ApplyTexture { uri: String },
    /// Frame the clicked model
    FlyTo,
    #[default]
    None,
}

/// A face under the pointer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceHit {
    pub key: FaceKey,
    pub point: Point3<f64>,
    pub distance: f64,
}

/// Cast a ray through pixel `(x, y)` and resolve the nearest classified face
pub fn pick_face<G, C>(graph: &G, camera: &C, x: f64, y: f64) -> Option<FaceHit>
where
    G: SceneGraph + ?Sized,
    C: Camera + ?Sized,
{
    let ray = screen_to_ray(x, y, camera);

    let mut candidates = Vec::new();
    for id in graph.node_ids() {
        let Some(node) = graph.get(id) else {
            continue;
        };
        if !node.is_pickable() {
            continue;
        }
        let world = node.transform.matrix();
        for (index, mesh) in node.meshes.iter().enumerate() {
            if mesh.faces.is_some() {
                candidates.push(PickCandidate {
                    target: (id, index),
                    mesh: &mesh.geometry,
                    world: world * mesh.local,
                });
            }
        }
    }

    let hit = pick(&ray, candidates)?;
    let (node, mesh) = hit.target;
    let label = graph
        .get(node)?
        .meshes
        .get(mesh)?
        .faces
        .as_ref()?
        .map
        .label_of(hit.triangle)?;

    Some(FaceHit {
        key: FaceKey { node, mesh, label },
        point: hit.point,
        distance: hit.distance,
    })
}

/// What a click did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickOutcome {
    /// Same face as the last click
    Unchanged,
    /// The click missed; the previous selection was dropped
    Cleared,
    /// A new face was selected; `fly_to` carries bounds to frame, if requested
    Selected { key: FaceKey, fly_to: Option<Aabb> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OutlineNode {
    outline: NodeId,
    owner: NodeId,
}

/// Hover and click state over classified faces
#[derive(Debug)]
pub struct FaceInteraction {
    hover_style: HighlightStyle,
    click_effect: ClickEffect,
    hover: LabelTracker,
    click: LabelTracker,
    hover_outline: Option<OutlineNode>,
    click_outline: Option<OutlineNode>,
}

impl FaceInteraction {
    pub fn new(hover_style: HighlightStyle, click_effect: ClickEffect) -> Self {
        Self {
            hover_style,
            click_effect,
            hover: LabelTracker::new(),
            click: LabelTracker::new(),
            hover_outline: None,
            click_outline: None,
        }
    }

    pub fn hovered(&self) -> Option<FaceKey> {
        self.hover.current()
    }

    pub fn clicked(&self) -> Option<FaceKey> {
        self.click.current()
    }

    /// Outline nodes currently attached (hover first, then click)
    pub fn outline_nodes(&self) -> Vec<NodeId> {
        self.hover_outline
            .iter()
            .chain(self.click_outline.iter())
            .map(|o| o.outline)
            .collect()
    }

    /// Update the hover highlight. Returns whether the highlight changed.
    pub fn hover<G: SceneGraph + ?Sized>(&mut self, graph: &mut G, hit: Option<FaceKey>) -> bool {
        let Some(change) = self.hover.update(hit) else {
            return false;
        };
        debug!(
            "hover {} -> {}",
            describe(change.previous),
            describe(change.current)
        );

        match self.hover_style {
            HighlightStyle::VertexColor => {
                if let Some(previous) = change.previous {
                    paint(graph, previous, false);
                }
                if let Some(current) = change.current {
                    paint(graph, current, true);
                }
            }
            HighlightStyle::Outline => {
                if let Some(old) = self.hover_outline.take() {
                    graph.detach(old.outline);
                }
                self.hover_outline = change.current.and_then(|key| attach_outline(graph, key, "hover"));
            }
        }
        true
    }

    /// Select the clicked face, outline it and run the click effect
    pub fn click<G: SceneGraph + ?Sized>(&mut self, graph: &mut G, hit: Option<FaceKey>) -> ClickOutcome {
        let Some(change) = self.click.update(hit) else {
            return ClickOutcome::Unchanged;
        };
        if let Some(old) = self.click_outline.take() {
            graph.detach(old.outline);
        }
        let Some(key) = change.current else {
            return ClickOutcome::Cleared;
        };

        debug!("clicked {}", describe(Some(key)));
        self.click_outline = attach_outline(graph, key, "selection");

        let fly_to = match &self.click_effect {
            ClickEffect::ApplyTexture { uri } => {
                let applied = graph
                    .get_mut(key.node)
                    .and_then(|node| node.meshes.get_mut(key.mesh))
                    .and_then(|mesh| mesh.faces.as_mut())
                    .is_some_and(|faces| faces.materials.apply_texture(key.label, TextureRef::new(uri.clone())));
                if !applied {
                    warn!("could not texture {}", describe(Some(key)));
                }
                None
            }
            ClickEffect::FlyTo => graph.get(key.node).map(|node| node.world_bounds()),
            ClickEffect::None => None,
        };

        ClickOutcome::Selected { key, fly_to }
    }

    /// Keep outline nodes on top of their model after the model moved
    pub fn follow_models<G: SceneGraph + ?Sized>(&self, graph: &mut G) {
        for outline in self.hover_outline.iter().chain(self.click_outline.iter()) {
            let Some(transform) = graph.get(outline.owner).map(|owner| owner.transform) else {
                continue;
            };
            if let Some(node) = graph.get_mut(outline.outline) {
                node.transform = transform;
            }
        }
    }

    /// Drop all highlights, detaching outlines and restoring vertex colours
    pub fn reset<G: SceneGraph + ?Sized>(&mut self, graph: &mut G) {
        if let Some(previous) = self.hover.current() {
            if self.hover_style == HighlightStyle::VertexColor {
                paint(graph, previous, false);
            }
        }
        for outline in [self.hover_outline.take(), self.click_outline.take()].into_iter().flatten() {
            graph.detach(outline.outline);
        }
        self.hover.reset();
        self.click.reset();
    }
}

impl Default for FaceInteraction {
    fn default() -> Self {
        Self::new(HighlightStyle::default(), ClickEffect::default())
    }
}

fn describe(key: Option<FaceKey>) -> String {
    match key {
        Some(key) => format!("{:?}/{}/{}", key.node, key.mesh, key.label),
        None => "nothing".to_string(),
    }
}

fn paint<G: SceneGraph + ?Sized>(graph: &mut G, key: FaceKey, on: bool) {
    let Some(mesh) = graph.get_mut(key.node).and_then(|node| node.meshes.get_mut(key.mesh)) else {
        return;
    };
    let MeshNode { geometry, faces, .. } = mesh;
    if let Some(faces) = faces {
        highlight_label(geometry, &faces.map, on.then_some(key.label));
    }
}

fn attach_outline<G: SceneGraph + ?Sized>(graph: &mut G, key: FaceKey, purpose: &str) -> Option<OutlineNode> {
    let node = graph.get(key.node)?;
    let mesh = node.meshes.get(key.mesh)?;
    let faces = mesh.faces.as_ref()?;

    let material = Material::new("outline", OUTLINE_COLOR);
    let tubes: Vec<MeshNode> = build_outline(&mesh.geometry, &faces.map, key.label)
        .into_iter()
        .enumerate()
        .map(|(i, tube)| {
            MeshNode::new(format!("edge_{}", i), tube)
                .with_local(mesh.local)
                .with_material(material.clone())
        })
        .collect();

    let mut outline = SceneNode::new(format!("{} {} {}", node.name, purpose, key.label), NodeKind::Outline)
        .with_transform(node.transform);
    outline.meshes = tubes;

    let owner = key.node;
    Some(OutlineNode {
        outline: graph.attach(outline),
        owner,
    })
}
