//! # Geometric Utilities
//!
//! Footprint centroids, the scale → rotate → translate composition used by every
//! anchor computation, and projection of world points to pixel coordinates.
//!
//! The composition order matters: the handle controller freezes anchors with
//! [`apply_transform`] and later re-solves positions with the same function, so
//! any mismatch with the model matrix makes anchors drift.

use cgmath::{EuclideanSpace, InnerSpace, Matrix, Matrix3, Matrix4, Point3, Rad, SquareMatrix, Vector3, Vector4};

use crate::gfx::camera::Camera;

/// How [`centroid`] reduces a point list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CentroidMethod {
    /// Arithmetic mean of all points
    #[default]
    Average,
    /// Midpoint of the axis-aligned bounding rectangle
    BoundingBox,
}

/// Centre of a 2D point list. Empty input yields the origin.
pub fn centroid(points: &[[f64; 2]], method: CentroidMethod) -> [f64; 2] {
    if points.is_empty() {
        return [0.0, 0.0];
    }

    match method {
        CentroidMethod::Average => {
            let (sum_x, sum_y) = points
                .iter()
                .fold((0.0, 0.0), |(sx, sy), p| (sx + p[0], sy + p[1]));
            let n = points.len() as f64;
            [sum_x / n, sum_y / n]
        }
        CentroidMethod::BoundingBox => {
            let (min_x, max_x, min_y, max_y) = points.iter().fold(
                (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
                |(min_x, max_x, min_y, max_y), p| {
                    (min_x.min(p[0]), max_x.max(p[0]), min_y.min(p[1]), max_y.max(p[1]))
                },
            );
            [(min_x + max_x) / 2.0, (min_y + max_y) / 2.0]
        }
    }
}

/// Rotation matrix for intrinsic Euler angles in XYZ order (`Rx * Ry * Rz`)
pub fn euler_xyz_matrix(rotation: Vector3<f64>) -> Matrix3<f64> {
    Matrix3::from_angle_x(Rad(rotation.x))
        * Matrix3::from_angle_y(Rad(rotation.y))
        * Matrix3::from_angle_z(Rad(rotation.z))
}

/// Model matrix `T * R * S`
pub fn compose_matrix(
    scale: Vector3<f64>,
    rotation: Vector3<f64>,
    position: Vector3<f64>,
) -> Matrix4<f64> {
    Matrix4::from_translation(position)
        * Matrix4::from(euler_xyz_matrix(rotation))
        * Matrix4::from_nonuniform_scale(scale.x, scale.y, scale.z)
}

/// Map a local point to world space: scale, then rotate (Euler XYZ), then translate
pub fn apply_transform(
    local: Point3<f64>,
    scale: Vector3<f64>,
    rotation: Vector3<f64>,
    position: Vector3<f64>,
) -> Point3<f64> {
    let scaled = Vector3::new(local.x * scale.x, local.y * scale.y, local.z * scale.z);
    Point3::from_vec(euler_xyz_matrix(rotation) * scaled + position)
}

/// Exact inverse of [`apply_transform`] for non-zero scale
pub fn inverse_transform(
    world: Point3<f64>,
    scale: Vector3<f64>,
    rotation: Vector3<f64>,
    position: Vector3<f64>,
) -> Point3<f64> {
    // Rotation matrices are orthonormal: transpose == inverse.
    let unrotated = euler_xyz_matrix(rotation).transpose() * (world.to_vec() - position);
    Point3::new(
        unrotated.x / scale.x,
        unrotated.y / scale.y,
        unrotated.z / scale.z,
    )
}

/// Euler XYZ angles of a pure rotation matrix; inverse of [`euler_xyz_matrix`].
///
/// At gimbal lock (`|y| = 90°`) the Z angle is reported as zero.
pub fn euler_xyz_from_matrix(m: &Matrix3<f64>) -> Vector3<f64> {
    // cgmath is column-major: m.z.x is row 0, column 2.
    let m13 = m.z.x.clamp(-1.0, 1.0);
    let y = m13.asin();
    if m13.abs() < 0.999_999_9 {
        Vector3::new((-m.z.y).atan2(m.z.z), y, (-m.y.x).atan2(m.x.x))
    } else {
        Vector3::new(m.y.z.atan2(m.y.y), y, 0.0)
    }
}

/// Split an affine `T * R * S` matrix into scale, Euler XYZ rotation and position
pub fn decompose_matrix(matrix: &Matrix4<f64>) -> (Vector3<f64>, Vector3<f64>, Vector3<f64>) {
    let position = matrix.w.truncate();
    let columns = [matrix.x.truncate(), matrix.y.truncate(), matrix.z.truncate()];
    let scale = Vector3::new(columns[0].magnitude(), columns[1].magnitude(), columns[2].magnitude());

    let unit = |c: Vector3<f64>, s: f64| if s > f64::EPSILON { c / s } else { c };
    let rotation = Matrix3::from_cols(
        unit(columns[0], scale.x),
        unit(columns[1], scale.y),
        unit(columns[2], scale.z),
    );
    (scale, euler_xyz_from_matrix(&rotation), position)
}

/// Transform a point by an affine or projective matrix with perspective divide
pub fn transform_point(matrix: &Matrix4<f64>, point: Point3<f64>) -> Point3<f64> {
    let p = matrix * Vector4::new(point.x, point.y, point.z, 1.0);
    if p.w.abs() > f64::EPSILON {
        Point3::new(p.x / p.w, p.y / p.w, p.z / p.w)
    } else {
        Point3::new(p.x, p.y, p.z)
    }
}

/// Inverse of a matrix, falling back to identity for singular input
pub fn invert_or_identity(matrix: &Matrix4<f64>) -> Matrix4<f64> {
    matrix.invert().unwrap_or_else(Matrix4::identity)
}

/// A projected point in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    /// Pixels from the left edge of the viewport
    pub x: f64,
    /// Pixels from the top edge of the viewport (Y grows downward)
    pub y: f64,
    /// Normalized device depth; outside `[-1, 1]` means clipped
    pub ndc_z: f64,
}

impl ScreenPoint {
    /// Whether the point lies between the near and far planes
    pub fn in_depth_range(&self) -> bool {
        (-1.0..=1.0).contains(&self.ndc_z)
    }
}

/// Project a world point through the camera's view-projection onto the viewport
pub fn project_to_screen<C: Camera + ?Sized>(world: Point3<f64>, camera: &C) -> ScreenPoint {
    let ndc = transform_point(&camera.build_view_projection_matrix(), world);
    let viewport = camera.viewport();
    ScreenPoint {
        x: (ndc.x * 0.5 + 0.5) * viewport.width,
        y: (-ndc.y * 0.5 + 0.5) * viewport.height,
        ndc_z: ndc.z,
    }
}
