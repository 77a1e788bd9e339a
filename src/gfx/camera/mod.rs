//! # Camera
//!
//! The camera is supplied by the host; the core only needs the view-projection,
//! the viewport and the camera frame to project markers, cast rays and plan
//! fly-to animations. [`OrbitCamera`] is the concrete camera used by the session.

pub mod fly_to;
pub mod orbit_camera;

use cgmath::{InnerSpace, Matrix4, Point3, Rad, Vector3};

pub use fly_to::{
    fly_to, plan_fly_to, Easing, FlyToPlan, FrameTweener, TweenCompletion, TweenTarget, Tweener,
};
pub use orbit_camera::OrbitCamera;

/// Pixel size of the drawing surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f64 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

pub trait Camera {
    /// Projection * view, OpenGL clip conventions (NDC depth in `[-1, 1]`)
    fn build_view_projection_matrix(&self) -> Matrix4<f64>;

    fn viewport(&self) -> Viewport;

    /// World-space camera position
    fn eye(&self) -> Point3<f64>;

    fn up(&self) -> Vector3<f64>;

    /// Normalized direction the camera looks along
    fn look_direction(&self) -> Vector3<f64>;

    /// Vertical field of view
    fn fovy(&self) -> Rad<f64>;

    /// Normalized screen-right direction in world space
    fn right_direction(&self) -> Vector3<f64> {
        let right = self.look_direction().cross(self.up());
        if right.magnitude2() > f64::EPSILON {
            right.normalize()
        } else {
            Vector3::unit_x()
        }
    }
}
