//! # Graphics Module
//!
//! Everything spatial in the massing core: cameras, mesh geometry, picking,
//! face classification, the scene graph and the transform handles.
//!
//! ## Architecture Overview
//!
//! - **Camera System** ([`camera`]) - Orbit camera and fly-to tweening
//! - **Geometry** ([`geometry`]) - Mesh buffers, footprint extrusion, primitives
//! - **Faces** ([`faces`]) - Face labels, per-face materials, highlights and outlines
//! - **Picking** ([`picking`]) - Screen rays and ray/triangle tests
//! - **Scene Management** ([`scene`]) - Nodes, transforms and the scene graph contract
//! - **Handles** ([`gizmos`]) - Markers and drag behaviours with fixed anchors
//!
//! No GPU code lives here; the host renders the [`scene::SceneGraph`] however it likes.
//!
//! ## Usage
//!
//! ```rust
//! use massing::gfx::{faces::classify_faces, geometry::extrude_footprint};
//! use massing::gfx::geometry::FootprintParams;
//!
//! let square = [[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0]];
//! let mesh = extrude_footprint(&square, &FootprintParams { scale: 1.0, height: 3.0 }).unwrap();
//! let faces = classify_faces(&mesh).unwrap();
//! assert_eq!(faces.edge_count(), 4);
//! ```

pub mod camera;
pub mod faces;
pub mod geometry;
pub mod gizmos;
pub mod math;
pub mod picking;
pub mod scene;

// Re-export commonly used types
pub use camera::OrbitCamera;
pub use scene::{Scene, SceneGraph};
