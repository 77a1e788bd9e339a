//! # Transform Handles
//!
//! On-screen markers bound to points of the active model. Dragging a marker
//! scales, rotates or moves the model; scale handles keep the opposite side of
//! the model fixed in world space while the dragged side follows the pointer.
//!
//! ## Architecture
//!
//! Each [`HandleKind`] selects a [`DragBehaviour`] implementation through
//! [`ActiveHandle::for_kind`]. The [`HandleController`] runs the
//! idle/dragging state machine, freezes a [`FixedAnchorSet`] when a drag
//! starts and reprojects the [`Marker`]s every frame.
//!
//! ## Key Components
//!
//! - [`HandleController`] - drag state machine and marker owner
//! - [`DragBehaviour`] - begin/update/end contract of a handle
//! - [`HandleKind`] / [`AnchorName`] - handles and the box points they pin
//! - [`compute_markers`] - screen layout of the handles
//!
//! ## Usage
//!
//! ```rust
//! use cgmath::Point3;
//! use massing::gfx::camera::OrbitCamera;
//! use massing::gfx::geometry::Aabb;
//! use massing::gfx::gizmos::{HandleController, HandleKind};
//! use massing::gfx::scene::{ModelAux, TransformState};
//!
//! let mut camera = OrbitCamera::new(Point3::new(0.0, 20.0, 30.0), Point3::new(0.0, 0.0, 0.0), 75.0, 0.1, 1000.0);
//! camera.resize_projection(800, 600);
//! let aux = ModelAux::from_bounds(Aabb::new(Point3::new(-1.0, 0.0, -1.0), Point3::new(1.0, 2.0, 1.0)));
//! let mut transform = TransformState::default();
//!
//! let mut controller = HandleController::default();
//! controller.begin_drag(HandleKind::ScaleRight, 400.0, 300.0, &transform, &aux, &camera);
//! controller.pointer_move(500.0, 300.0, &mut transform, &camera);
//! controller.pointer_up();
//! assert!(transform.scale.x > 1.0);
//! ```

pub mod behaviours;
pub mod controller;
pub mod handles;
pub mod markers;
pub mod traits;

// Re-export main types
pub use behaviours::{ActiveHandle, AxisScale, PlanarTranslate, Rotate, ScreenAxis, VerticalTranslate};
pub use controller::HandleController;
pub use handles::{pin_anchor, AnchorName, FixedAnchorSet, HandleKind, HandleSettings};
pub use markers::{compute_markers, hit_marker, marker_world_point, side_offset, Marker};
pub use traits::{DragBehaviour, DragStart, PointerSample};
