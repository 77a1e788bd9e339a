//! # Drag Behaviour Trait
//!
//! The common interface every handle behaviour implements so the controller can
//! route pointer input without knowing which transform a handle edits.

use cgmath::Point3;

use super::handles::FixedAnchorSet;
use crate::gfx::geometry::Aabb;
use crate::gfx::picking::Ray;
use crate::gfx::scene::TransformState;

/// A pointer position with the world-space ray cast through it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    /// Pixels from the left edge of the viewport
    pub x: f64,
    /// Pixels from the top edge of the viewport
    pub y: f64,
    /// Ray through the pointer, when a camera was available
    pub ray: Option<Ray>,
}

impl PointerSample {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, ray: None }
    }

    pub fn with_ray(mut self, ray: Ray) -> Self {
        self.ray = Some(ray);
        self
    }
}

/// Everything captured at the moment a drag begins
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragStart {
    /// Transform of the model when the pointer went down
    pub baseline: TransformState,
    /// World anchors computed from `baseline`
    pub anchors: FixedAnchorSet,
    /// Untransformed bounds of the model
    pub local_box: Aabb,
    pub pointer: PointerSample,
    /// Where the pointer ray met the ground plane, if it did
    pub ground_hit: Option<Point3<f64>>,
}

/// Per-handle drag logic.
///
/// ## Lifecycle
///
/// 1. **begin** - called once with the drag snapshot; store whatever baseline
///    the behaviour measures from
/// 2. **update** - called for every pointer move while the drag lasts; writes
///    the new scale, rotation or position into `transform`
/// 3. **end** - called on pointer up; drop any per-drag state
///
/// A behaviour is never reused across drags without another `begin`.
pub trait DragBehaviour {
    fn begin(&mut self, start: &DragStart);

    /// Apply one pointer move to the model transform
    fn update(&mut self, pointer: &PointerSample, transform: &mut TransformState);

    fn end(&mut self) {}
}
