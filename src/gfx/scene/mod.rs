//! # Scene Graph
//!
//! Nodes the session attaches to the host's scene, the transform state the
//! handles edit, and the per-model anchor record.
//!
//! ## Key Components
//!
//! - [`SceneGraph`] - the attach/detach contract the host implements
//! - [`Scene`] - in-memory implementation used by the session and tests
//! - [`SceneNode`] / [`MeshNode`] - a node and the meshes placed in it
//! - [`TransformState`] - scale, Euler rotation and position of a model
//! - [`ModelAux`] - local bounding box and anchor points of the active model

pub mod model;
pub mod node;
pub mod scene;
pub mod transform;

// Re-export main types
pub use model::ModelAux;
pub use node::{FaceData, MeshNode, NodeKind, SceneNode};
pub use scene::{NodeId, Scene, SceneGraph};
pub use transform::{Axis, TransformState, MIN_SCALE};
