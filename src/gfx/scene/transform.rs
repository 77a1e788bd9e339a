use cgmath::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::gfx::math::{apply_transform, compose_matrix};

/// Smallest allowed scale on any axis
pub const MIN_SCALE: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Scale, Euler XYZ rotation (radians) and position of a model node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformState {
    pub scale: Vector3<f64>,
    pub rotation: Vector3<f64>,
    pub position: Vector3<f64>,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            scale: Vector3::new(1.0, 1.0, 1.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            position: Vector3::new(0.0, 0.0, 0.0),
        }
    }
}

impl TransformState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_position(mut self, position: Vector3<f64>) -> Self {
        self.position = position;
        self
    }

    /// Model matrix `T * R * S`
    pub fn matrix(&self) -> Matrix4<f64> {
        compose_matrix(self.scale, self.rotation, self.position)
    }

    /// World position of a point given in the node's local space
    pub fn apply(&self, local: Point3<f64>) -> Point3<f64> {
        apply_transform(local, self.scale, self.rotation, self.position)
    }

    pub fn set_position(&mut self, axis: Axis, value: f64) {
        self.position[axis.index()] = value;
    }

    /// Set one Euler angle, in radians
    pub fn set_rotation(&mut self, axis: Axis, radians: f64) {
        self.rotation[axis.index()] = radians;
    }

    /// Set one scale component, clamped to [`MIN_SCALE`]
    pub fn set_scale(&mut self, axis: Axis, value: f64) {
        self.scale[axis.index()] = value.max(MIN_SCALE);
    }

    /// Clamp every scale component to [`MIN_SCALE`]
    pub fn clamp_scale(&mut self) {
        self.scale.x = self.scale.x.max(MIN_SCALE);
        self.scale.y = self.scale.y.max(MIN_SCALE);
        self.scale.z = self.scale.z.max(MIN_SCALE);
    }
}
