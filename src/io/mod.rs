//! # Scene I/O
//!
//! Loading models from OBJ and GLB files, and exporting the authored scene as
//! binary glTF or a JSON document.
//!
//! Exports skip every node flagged `skip_export` (grid, lights, box helper and
//! outlines), so a saved scene only carries what the user built.

pub mod gltf;
pub mod obj;
pub mod scene_json;

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::Result;

pub use gltf::{export_glb, import_glb};
pub use obj::{compute_vertex_normals, load_obj};
pub use scene_json::{export_json, import_json, SceneDocument};

/// File name GLB exports are saved under
pub const MODEL_GLB: &str = "model.glb";
/// File name JSON exports are saved under
pub const MODEL_JSON: &str = "model.json";

/// Write `bytes` to `dir/name`, creating `dir` if needed
pub fn save_blob(dir: impl AsRef<Path>, name: &str, bytes: &[u8]) -> Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let path = dir.join(name);
    fs::write(&path, bytes)?;
    info!("saved {} ({} bytes)", path.display(), bytes.len());
    Ok(path)
}
