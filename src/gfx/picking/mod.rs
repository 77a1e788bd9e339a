//! # Face Picking
//!
//! Ray casting from the pointer into the scene. Picking resolves the nearest
//! triangle so the interaction layer can map it to a face label.
//!
//! ## How it works
//!
//! 1. **Pointer to Ray**: unproject the pointer through the camera's inverse
//!    view-projection into a world-space ray
//! 2. **Broad phase**: reject candidates whose world bounds the ray misses
//! 3. **Narrow phase**: double-sided ray/triangle test on every world-space
//!    triangle, keeping the closest hit
//!
//! ## Usage
//!
//! ```rust
//! use cgmath::{Matrix4, Point3, SquareMatrix};
//! use massing::gfx::camera::OrbitCamera;
//! use massing::gfx::geometry::generate_cube;
//! use massing::gfx::picking::{pick, screen_to_ray, PickCandidate};
//!
//! let mut camera = OrbitCamera::new(Point3::new(0.0, 0.0, 5.0), Point3::new(0.0, 0.0, 0.0), 75.0, 0.1, 100.0);
//! camera.resize_projection(800, 600);
//! let cube = generate_cube();
//! let ray = screen_to_ray(400.0, 300.0, &camera);
//! let hit = pick(&ray, [PickCandidate { target: 7, mesh: &cube, world: Matrix4::identity() }]);
//! assert_eq!(hit.map(|h| h.target), Some(7));
//! ```

use cgmath::{InnerSpace, Matrix4, Point3, Vector3};

use crate::gfx::camera::Camera;
use crate::gfx::geometry::MeshData;
use crate::gfx::math::{invert_or_identity, transform_point};

/// Determinants below this are treated as a ray parallel to the triangle
const PARALLEL_EPSILON: f64 = 1e-12;

/// A 3D ray for intersection testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Ray origin point in world space
    pub origin: Point3<f64>,
    /// Ray direction (normalized)
    pub direction: Vector3<f64>,
}

impl Ray {
    /// Create a new ray; the direction is normalized
    pub fn new(origin: Point3<f64>, direction: Vector3<f64>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f64) -> Point3<f64> {
        self.origin + self.direction * t
    }
}

/// Convert a pointer position in pixels to a world-space ray
pub fn screen_to_ray<C: Camera + ?Sized>(x: f64, y: f64, camera: &C) -> Ray {
    let viewport = camera.viewport();

    // Convert screen coordinates to normalized device coordinates (-1 to 1)
    let ndc_x = (2.0 * x) / viewport.width - 1.0;
    let ndc_y = 1.0 - (2.0 * y) / viewport.height; // Flip Y axis

    let inv_view_proj = invert_or_identity(&camera.build_view_projection_matrix());
    let near = transform_point(&inv_view_proj, Point3::new(ndc_x, ndc_y, -1.0));
    let far = transform_point(&inv_view_proj, Point3::new(ndc_x, ndc_y, 1.0));

    Ray::new(near, far - near)
}

/// Möller–Trumbore intersection, hitting both front and back faces.
///
/// Returns the distance along the ray, or `None` for a miss or a hit behind the origin.
pub fn intersect_triangle(ray: &Ray, a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Option<f64> {
    let edge1 = b - a;
    let edge2 = c - a;
    let p = ray.direction.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < PARALLEL_EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = ray.origin - a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = ray.direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    (t >= 0.0).then_some(t)
}

/// Where the ray crosses the ground plane `y = 0`, if it does so in front of the origin
pub fn intersect_ground_plane(ray: &Ray) -> Option<Point3<f64>> {
    if ray.direction.y.abs() < PARALLEL_EPSILON {
        return None;
    }
    let t = -ray.origin.y / ray.direction.y;
    (t >= 0.0).then(|| ray.point_at(t))
}

/// A mesh that may be hit, with its local-to-world matrix
#[derive(Debug, Clone, Copy)]
pub struct PickCandidate<'a, T> {
    /// Caller's identifier, echoed back in the hit
    pub target: T,
    pub mesh: &'a MeshData,
    pub world: Matrix4<f64>,
}

/// Result of a picking operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit<T> {
    pub target: T,
    /// Index of the hit triangle in the mesh
    pub triangle: usize,
    /// Distance from the ray origin to the intersection point
    pub distance: f64,
    /// World space intersection point
    pub point: Point3<f64>,
}

fn to_point(p: [f32; 3]) -> Point3<f64> {
    Point3::new(p[0] as f64, p[1] as f64, p[2] as f64)
}

/// Closest triangle hit of `ray` among `candidates`
pub fn pick<'a, T, I>(ray: &Ray, candidates: I) -> Option<PickHit<T>>
where
    I: IntoIterator<Item = PickCandidate<'a, T>>,
{
    let mut closest: Option<PickHit<T>> = None;

    for candidate in candidates {
        let bounds = candidate.mesh.bounding_box().transform(&candidate.world);
        match bounds.intersect_ray(ray) {
            None => continue,
            Some(entry) if closest.as_ref().is_some_and(|hit| entry > hit.distance) => continue,
            Some(_) => {}
        }

        let mut best: Option<(usize, f64)> = None;
        for triangle in 0..candidate.mesh.triangle_count() {
            let Some([a, b, c]) = candidate.mesh.triangle(triangle) else {
                continue;
            };
            let a = transform_point(&candidate.world, to_point(a));
            let b = transform_point(&candidate.world, to_point(b));
            let c = transform_point(&candidate.world, to_point(c));
            if let Some(t) = intersect_triangle(ray, a, b, c) {
                if best.map_or(true, |(_, d)| t < d) {
                    best = Some((triangle, t));
                }
            }
        }

        if let Some((triangle, distance)) = best {
            if closest.as_ref().map_or(true, |hit| distance < hit.distance) {
                closest = Some(PickHit {
                    target: candidate.target,
                    triangle,
                    distance,
                    point: ray.point_at(distance),
                });
            }
        }
    }

    closest
}
