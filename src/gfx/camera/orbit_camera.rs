use cgmath::*;

use super::{Camera, Viewport};

/// Perspective camera looking at an orbit target.
///
/// Orbit controls live outside the core; the session only moves `eye` and
/// `target` (resize, fly-to).
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub eye: Point3<f64>,
    pub target: Point3<f64>,
    pub up: Vector3<f64>,
    pub aspect: f64,
    pub fovy: Rad<f64>,
    pub znear: f64,
    pub zfar: f64,
    pub viewport: Viewport,
}

impl Camera for OrbitCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f64> {
        let view = Matrix4::look_at_rh(self.eye, self.target, self.up);
        let proj = perspective(self.fovy, self.aspect, self.znear, self.zfar);
        proj * view
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn eye(&self) -> Point3<f64> {
        self.eye
    }

    fn up(&self) -> Vector3<f64> {
        self.up
    }

    fn look_direction(&self) -> Vector3<f64> {
        let forward = self.target - self.eye;
        if forward.magnitude2() > f64::EPSILON {
            forward.normalize()
        } else {
            -Vector3::unit_z()
        }
    }

    fn fovy(&self) -> Rad<f64> {
        self.fovy
    }
}

impl OrbitCamera {
    /// Create a camera at `eye` looking at `target` with a vertical FOV in degrees
    pub fn new(eye: Point3<f64>, target: Point3<f64>, fov_degrees: f64, znear: f64, zfar: f64) -> Self {
        Self {
            eye,
            target,
            up: Vector3::unit_y(),
            aspect: 1.0,
            fovy: Deg(fov_degrees).into(),
            znear,
            zfar,
            viewport: Viewport::default(),
        }
    }

    /// Distance from the eye to the orbit target
    pub fn distance(&self) -> f64 {
        self.eye.distance(self.target)
    }

    pub fn set_eye(&mut self, eye: Point3<f64>) {
        self.eye = eye;
    }

    pub fn look_at(&mut self, target: Point3<f64>) {
        self.target = target;
    }

    /// Update viewport size and aspect after a surface resize
    pub fn resize_projection(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::new(width as f64, height.max(1) as f64);
        self.aspect = self.viewport.aspect();
    }
}
