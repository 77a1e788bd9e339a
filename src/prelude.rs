//! # Massing Prelude
//!
//! Commonly used types in one import, for hosts that embed a session.
//!
//! ## Usage
//!
//! ```rust
//! use massing::prelude::*;
//!
//! let (mut session, input) = massing::default();
//! session
//!     .add_building(&SAMPLE_FOOTPRINT, &FootprintParams::default())
//!     .unwrap();
//! input.push(InputEvent::PointerMove(PointerEvent::left(400.0, 300.0)));
//! session.tick(1.0 / 60.0, &mut ());
//! ```

// Session and configuration
pub use crate::config::{Capabilities, SessionOptions};
pub use crate::error::{MassingError, Result};
pub use crate::session::{
    EventKind, InputEvent, InputSource, Listener, PointerButton, PointerEvent, QueuedInput, Renderer,
    SceneSession, ScopeId, SessionEvent, WinitInput,
};

// Scene and geometry
pub use crate::gfx::camera::{Camera, OrbitCamera};
pub use crate::gfx::faces::{FaceLabel, FaceMap, Material, TextureRef};
pub use crate::gfx::geometry::{Aabb, FootprintParams, MeshData, SAMPLE_FOOTPRINT};
pub use crate::gfx::gizmos::{HandleController, HandleKind, HandleSettings};
pub use crate::gfx::scene::{Axis, MeshNode, NodeId, Scene, SceneGraph, SceneNode, TransformState};

// Interaction
pub use crate::interaction::{ClickEffect, FaceKey, HighlightStyle};

// Re-export common external dependencies
pub use cgmath::{Point3, Vector3};
