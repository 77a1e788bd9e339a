//! # Building Faces
//!
//! Logical faces of extruded footprints: classification of triangles into
//! `top`, `bottom` and `edge_<n>`, per-face materials, and the two highlight
//! styles (vertex colour and tube outlines).

pub mod classifier;
pub mod groups;
pub mod highlight;
pub mod outline;

pub use classifier::{classify_faces, FaceLabel, FaceMap};
pub use groups::{build_face_materials, FaceMaterials, Material, MaterialGroup, TextureRef};
pub use highlight::{highlight_label, reset_colors};
pub use outline::{boundary_edges, build_outline};
