// src/lib.rs
//! Massing
//!
//! The interaction core of a building-massing editor: drag handles that scale,
//! rotate and move a model while keeping the opposite side fixed, face
//! classification and highlighting for extruded footprints, picking, an event
//! registry and a frame-driven scene session.

pub mod config;
pub mod error;
pub mod gfx;
pub mod interaction;
pub mod io;
pub mod prelude;
pub mod session;

// Re-export main types for convenience
pub use config::SessionOptions;
pub use error::{MassingError, Result};
pub use session::SceneSession;

/// Creates a session with default options over an in-memory scene, fed by the returned queue
pub fn default() -> (SceneSession, session::QueuedInput) {
    SceneSession::with_queued_input(SessionOptions::default())
}
