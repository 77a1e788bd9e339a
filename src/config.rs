//! # Session Configuration
//!
//! Construction-time options for a [`SceneSession`](crate::session::SceneSession).
//! Options deserialize from JSON using the camelCase keys of the viewer
//! configuration (`cameraFov`, `scaleFactor`, `boxHelperColor`, ...). Every key is
//! optional and falls back to the defaults below.
//!
//! ```rust
//! use massing::config::SessionOptions;
//!
//! let options = SessionOptions::from_json_str(r#"{ "cameraFov": 60, "scaleFactor": 0.01 }"#).unwrap();
//! assert_eq!(options.camera_fov, 60.0);
//! assert_eq!(options.move_speed, 0.05);
//! ```

use cgmath::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::gfx::gizmos::HandleSettings;
use crate::interaction::{ClickEffect, HighlightStyle};

/// A plain `{x, y, z}` triple as written in option files
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<Position3> for Vector3<f64> {
    fn from(p: Position3) -> Self {
        Vector3::new(p.x, p.y, p.z)
    }
}

/// Which optional features of the session are active.
///
/// Replaces the per-variant copies of the scene class: one session, switched by flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Capabilities {
    /// Create and reproject transform handles for the active model
    pub markers: bool,
    /// Re-pick classified faces on pointer move
    pub face_hover: bool,
    /// How a hovered face is shown
    pub hover_style: HighlightStyle,
    /// Outline the clicked face and run [`Capabilities::click_effect`]
    pub face_click: bool,
    /// One-shot side effect for a newly clicked face
    pub click_effect: ClickEffect,
    /// Fly the camera to a model on double click
    pub double_click_fly_to: bool,
    pub export_glb: bool,
    pub export_json: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            markers: true,
            face_hover: true,
            hover_style: HighlightStyle::Outline,
            face_click: true,
            click_effect: ClickEffect::None,
            double_click_fly_to: true,
            export_glb: true,
            export_json: true,
        }
    }
}

/// Tunable constants for the camera, scene bootstrap and transform handles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionOptions {
    /// Vertical field of view in degrees
    pub camera_fov: f64,
    pub camera_near: f64,
    pub camera_far: f64,
    pub ambient_light_intensity: f64,
    pub directional_light_intensity: f64,
    pub camera_position: Position3,
    pub grid_size: f64,
    pub grid_divisions: u32,
    /// Scale change per pixel for edge and height handles
    pub scale_factor: f64,
    /// Radians per pixel for the X rotation handle
    pub rotation_x_sensitivity: f64,
    /// Radians per pixel for the Y and Z rotation handles
    pub rotation_sensitivity: f64,
    /// World units per pixel for the vertical move handle
    pub move_speed: f64,
    /// Minimum world offset of the side handles from the model centre
    pub base_offset: f64,
    /// Side handle offset growth per unit of camera distance
    pub distance_factor: f64,
    /// 0xRRGGBB colour of the model box helper
    pub box_helper_color: u32,
    /// Pick radius of a marker in pixels
    pub marker_radius: f64,
    pub capabilities: Capabilities,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            camera_fov: 75.0,
            camera_near: 0.1,
            camera_far: 1000.0,
            ambient_light_intensity: 0.5,
            directional_light_intensity: 1.0,
            camera_position: Position3 {
                x: 0.0,
                y: 20.0,
                z: 30.0,
            },
            grid_size: 5000.0,
            grid_divisions: 5000,
            scale_factor: 0.003,
            rotation_x_sensitivity: 0.01,
            rotation_sensitivity: 0.01,
            move_speed: 0.05,
            base_offset: 0.02,
            distance_factor: 0.05,
            box_helper_color: 0x00ff00,
            marker_radius: 6.0,
            capabilities: Capabilities::default(),
        }
    }
}

impl SessionOptions {
    /// Parse options from a JSON object; missing keys keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The subset of options consumed by the handle controller
    pub fn handle_settings(&self) -> HandleSettings {
        HandleSettings {
            scale_factor: self.scale_factor,
            rotation_x_sensitivity: self.rotation_x_sensitivity,
            rotation_sensitivity: self.rotation_sensitivity,
            move_speed: self.move_speed,
            base_offset: self.base_offset,
            distance_factor: self.distance_factor,
            marker_radius: self.marker_radius,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_viewer() {
        let options = SessionOptions::default();
        assert_eq!(options.camera_fov, 75.0);
        assert_eq!(options.scale_factor, 0.003);
        assert_eq!(options.box_helper_color, 0x00ff00);
        assert!(options.capabilities.markers);
    }

    #[test]
    fn test_camel_case_keys_override_defaults() {
        let json = r#"{
            "cameraFov": 50,
            "cameraPosition": { "x": 1, "y": 2, "z": 3 },
            "gridDivisions": 10,
            "rotationXSensitivity": 0.02,
            "boxHelperColor": 16711680,
            "capabilities": { "faceHover": false, "clickEffect": { "kind": "flyTo" } }
        }"#;
        let options = SessionOptions::from_json_str(json).unwrap();

        assert_eq!(options.camera_fov, 50.0);
        assert_eq!(options.camera_position, Position3 { x: 1.0, y: 2.0, z: 3.0 });
        assert_eq!(options.grid_divisions, 10);
        assert_eq!(options.rotation_x_sensitivity, 0.02);
        assert_eq!(options.box_helper_color, 0xff0000);
        assert!(!options.capabilities.face_hover);
        assert_eq!(options.capabilities.click_effect, ClickEffect::FlyTo);
        // untouched keys keep defaults
        assert_eq!(options.camera_far, 1000.0);
        assert!(options.capabilities.face_click);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(SessionOptions::from_json_str("{ cameraFov: }").is_err());
    }
}
