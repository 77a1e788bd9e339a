//! # Primitive Shape Generation
//!
//! Boxes for helpers and tests, open tubes for face outlines.

use cgmath::{InnerSpace, Point3, Vector3};
use std::f64::consts::PI;

use super::{Aabb, MeshData};

/// Generate a unit cube centered at the origin
///
/// Returns a cube with vertices from -0.5 to 0.5 on all axes.
pub fn generate_cube() -> MeshData {
    generate_box(&Aabb::new(
        Point3::new(-0.5, -0.5, -0.5),
        Point3::new(0.5, 0.5, 0.5),
    ))
}

/// Generate a box filling `bounds`, four vertices per face with outward normals
pub fn generate_box(bounds: &Aabb) -> MeshData {
    let (l, h) = (bounds.min, bounds.max);
    let (x0, y0, z0) = (l.x as f32, l.y as f32, l.z as f32);
    let (x1, y1, z1) = (h.x as f32, h.y as f32, h.z as f32);

    let faces: [([[f32; 3]; 4], [f32; 3]); 6] = [
        // Front face
        ([[x0, y0, z1], [x1, y0, z1], [x1, y1, z1], [x0, y1, z1]], [0.0, 0.0, 1.0]),
        // Back face
        ([[x0, y0, z0], [x0, y1, z0], [x1, y1, z0], [x1, y0, z0]], [0.0, 0.0, -1.0]),
        // Left face
        ([[x0, y0, z0], [x0, y0, z1], [x0, y1, z1], [x0, y1, z0]], [-1.0, 0.0, 0.0]),
        // Right face
        ([[x1, y0, z1], [x1, y0, z0], [x1, y1, z0], [x1, y1, z1]], [1.0, 0.0, 0.0]),
        // Top face
        ([[x0, y1, z1], [x1, y1, z1], [x1, y1, z0], [x0, y1, z0]], [0.0, 1.0, 0.0]),
        // Bottom face
        ([[x0, y0, z0], [x1, y0, z0], [x1, y0, z1], [x0, y0, z1]], [0.0, -1.0, 0.0]),
    ];

    let mut data = MeshData::new();
    let mut indices = Vec::with_capacity(36);
    for (corners, normal) in faces {
        let base = data.positions.len() as u32;
        data.positions.extend(corners);
        data.normals.extend([normal; 4]);
        data.tex_coords.extend([[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
        // 2 triangles per face, counter-clockwise
        indices.extend([base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    data.indices = Some(indices);
    data
}

/// Generate an open tube (no caps) of `radius` around the segment `start → end`.
///
/// One ring of `radial_segments + 1` vertices at each end; the seam vertex is
/// duplicated so texture coordinates wrap cleanly.
pub fn generate_tube(
    start: Point3<f64>,
    end: Point3<f64>,
    radius: f64,
    radial_segments: u32,
) -> MeshData {
    let mut data = MeshData::new();
    let segs = radial_segments.max(3);

    let axis = end - start;
    if axis.magnitude2() <= f64::EPSILON {
        data.indices = Some(Vec::new());
        return data;
    }
    let axis = axis.normalize();

    // Any vector not parallel to the axis seeds the ring basis.
    let seed = if axis.x.abs() < 0.9 {
        Vector3::unit_x()
    } else {
        Vector3::unit_y()
    };
    let u = axis.cross(seed).normalize();
    let v = axis.cross(u);

    for i in 0..=segs {
        let angle = i as f64 * 2.0 * PI / segs as f64;
        let normal = u * angle.cos() + v * angle.sin();
        let n = [normal.x as f32, normal.y as f32, normal.z as f32];
        for (center, t) in [(start, 0.0f32), (end, 1.0f32)] {
            let p = center + normal * radius;
            data.positions.push([p.x as f32, p.y as f32, p.z as f32]);
            data.normals.push(n);
            data.tex_coords.push([i as f32 / segs as f32, t]);
        }
    }

    let mut indices = Vec::with_capacity(segs as usize * 6);
    for i in 0..segs {
        let start_current = i * 2;
        let end_current = start_current + 1;
        let start_next = start_current + 2;
        let end_next = start_next + 1;

        indices.extend([start_current, start_next, end_current]);
        indices.extend([end_current, start_next, end_next]);
    }
    data.indices = Some(indices);
    data
}
