use cgmath::{EuclideanSpace, Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::gfx::math::transform_point;
use crate::gfx::picking::Ray;

/// Axis-aligned bounding box.
///
/// An empty box has `min > max` on every axis; expanding it by a point yields a
/// box containing only that point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Point3<f64>,
    /// Maximum corner of the bounding box
    pub max: Point3<f64>,
}

impl Aabb {
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Bounds of a vertex buffer. No vertices gives an empty box.
    pub fn from_vertices(vertices: &[[f32; 3]]) -> Self {
        let mut aabb = Self::empty();
        for v in vertices {
            aabb.expand(Point3::new(v[0] as f64, v[1] as f64, v[2] as f64));
        }
        aabb
    }

    pub fn from_points<I: IntoIterator<Item = Point3<f64>>>(points: I) -> Self {
        let mut aabb = Self::empty();
        for p in points {
            aabb.expand(p);
        }
        aabb
    }

    pub fn expand(&mut self, p: Point3<f64>) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        if other.is_empty() {
            return *self;
        }
        let mut out = *self;
        out.expand(other.min);
        out.expand(other.max);
        out
    }

    /// Centre of the box; the origin for an empty box
    pub fn center(&self) -> Point3<f64> {
        if self.is_empty() {
            return Point3::origin();
        }
        self.min.midpoint(self.max)
    }

    /// Extent along each axis; zero for an empty box
    pub fn size(&self) -> Vector3<f64> {
        if self.is_empty() {
            return Vector3::new(0.0, 0.0, 0.0);
        }
        self.max - self.min
    }

    pub fn corners(&self) -> [Point3<f64>; 8] {
        let (a, b) = (self.min, self.max);
        [
            Point3::new(a.x, a.y, a.z),
            Point3::new(b.x, a.y, a.z),
            Point3::new(a.x, b.y, a.z),
            Point3::new(a.x, a.y, b.z),
            Point3::new(b.x, b.y, a.z),
            Point3::new(b.x, a.y, b.z),
            Point3::new(a.x, b.y, b.z),
            Point3::new(b.x, b.y, b.z),
        ]
    }

    /// Bounds of the box after applying a transformation matrix
    pub fn transform(&self, matrix: &Matrix4<f64>) -> Self {
        if self.is_empty() {
            return *self;
        }
        Self::from_points(self.corners().iter().map(|c| transform_point(matrix, *c)))
    }

    /// Slab test. Returns the distance along the ray to the entry point (or the
    /// exit point when the origin is inside), or `None` on a miss.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f64> {
        if self.is_empty() {
            return None;
        }

        let mut t_near = f64::NEG_INFINITY;
        let mut t_far = f64::INFINITY;
        for axis in 0..3 {
            let origin = ray.origin[axis];
            let dir = ray.direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);
            if dir.abs() < f64::EPSILON {
                if origin < lo || origin > hi {
                    return None;
                }
                continue;
            }
            let t1 = (lo - origin) / dir;
            let t2 = (hi - origin) / dir;
            t_near = t_near.max(t1.min(t2));
            t_far = t_far.min(t1.max(t2));
        }

        if t_near <= t_far && t_far >= 0.0 {
            Some(if t_near >= 0.0 { t_near } else { t_far })
        } else {
            None
        }
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_creation() {
        let vertices = vec![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [-1.0, -1.0, -1.0]];
        let aabb = Aabb::from_vertices(&vertices);

        assert_eq!(aabb.min, Point3::new(-1.0, -1.0, -1.0));
        assert_eq!(aabb.max, Point3::new(1.0, 1.0, 1.0));
        assert_eq!(aabb.center(), Point3::new(0.0, 0.0, 0.0));
        assert_eq!(aabb.size(), Vector3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn test_empty_box_is_degenerate_not_fatal() {
        let aabb = Aabb::from_vertices(&[]);
        assert!(aabb.is_empty());
        assert_eq!(aabb.center(), Point3::origin());
        assert_eq!(aabb.size(), Vector3::new(0.0, 0.0, 0.0));
        assert!(aabb.intersect_ray(&Ray::new(Point3::origin(), Vector3::unit_z())).is_none());
    }

    #[test]
    fn test_ray_aabb_intersection() {
        let aabb = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));

        // Ray hitting the box
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(aabb.intersect_ray(&ray), Some(4.0));

        // Ray missing the box
        let ray_miss = Ray::new(Point3::new(5.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(aabb.intersect_ray(&ray_miss).is_none());
    }

    #[test]
    fn test_transform_translates_bounds() {
        let aabb = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 2.0, 3.0));
        let moved = aabb.transform(&Matrix4::from_translation(Vector3::new(10.0, 0.0, -1.0)));
        assert_eq!(moved.min, Point3::new(10.0, 0.0, -1.0));
        assert_eq!(moved.max, Point3::new(11.0, 2.0, 2.0));
    }
}
