use serde::{Deserialize, Serialize};

use crate::gfx::faces::FaceLabel;
use crate::gfx::scene::NodeId;

/// A logical face of a specific mesh in the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FaceKey {
    pub node: NodeId,
    /// Index of the mesh inside the node
    pub mesh: usize,
    pub label: FaceLabel,
}

/// A transition between two hovered (or clicked) faces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelChange {
    pub previous: Option<FaceKey>,
    pub current: Option<FaceKey>,
}

/// Remembers the last face seen and reports only real transitions.
///
/// Repeated updates with the same face (or repeated misses) yield nothing, so
/// highlight geometry is rebuilt once per transition and not once per event.
#[derive(Debug, Clone, Default)]
pub struct LabelTracker {
    current: Option<FaceKey>,
}

impl LabelTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<FaceKey> {
        self.current
    }

    pub fn update(&mut self, key: Option<FaceKey>) -> Option<LabelChange> {
        if key == self.current {
            return None;
        }
        let previous = std::mem::replace(&mut self.current, key);
        Some(LabelChange { previous, current: key })
    }

    /// Forget the current face without reporting a change
    pub fn reset(&mut self) {
        self.current = None;
    }
}
