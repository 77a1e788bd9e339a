//! Footprint extrusion.
//!
//! Turns a 2D building outline (Z-up, as surveyed) into a closed prism. The
//! emission order is fixed: bottom cap, top cap, then two triangles per side
//! segment in outline order. The face classifier relies on that order to pair
//! side triangles into edges.

use log::debug;
use serde::{Deserialize, Serialize};

use super::MeshData;
use crate::error::{MassingError, Result};
use crate::gfx::math::{centroid, CentroidMethod};

/// Points closer than this are treated as the same outline vertex
const DUPLICATE_EPSILON: f64 = 1e-9;

/// Surveyed outline (projected metres) of a 16-segment building, closing point included
pub const SAMPLE_FOOTPRINT: [[f64; 2]; 17] = [
    [38475934.749355, 3847665.029031],
    [38475943.144576, 3847665.020336],
    [38475943.157475, 3847667.650043],
    [38475948.069688, 3847667.625946],
    [38475948.056889, 3847665.015239],
    [38475965.075333, 3847664.997649],
    [38475965.078432, 3847667.637057],
    [38475969.957144, 3847667.63136],
    [38475969.954046, 3847664.992652],
    [38475986.610989, 3847664.975363],
    [38475986.618087, 3847667.64997],
    [38475991.4743, 3847667.637073],
    [38475991.467201, 3847664.970366],
    [38476000.037023, 3847664.961571],
    [38476000.028428, 3847654.810443],
    [38475934.73066, 3847654.818002],
    [38475934.749355, 3847665.029031],
];

/// How a raw footprint becomes a building
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FootprintParams {
    /// Uniform scale applied after centring
    pub scale: f64,
    /// Extrusion height along +Z
    pub height: f64,
}

impl Default for FootprintParams {
    fn default() -> Self {
        Self {
            scale: 1.0,
            height: 15.0,
        }
    }
}

fn same_point(a: [f64; 2], b: [f64; 2]) -> bool {
    (a[0] - b[0]).abs() <= DUPLICATE_EPSILON && (a[1] - b[1]).abs() <= DUPLICATE_EPSILON
}

/// Clean up a surveyed outline: drop repeated and closing points, move it to
/// the origin (average centroid) and scale it.
///
/// Large projected coordinates are reduced in `f64` before anything is narrowed
/// to `f32`.
pub fn prepare_footprint(points: &[[f64; 2]], params: &FootprintParams) -> Result<Vec<[f64; 2]>> {
    if !(params.scale.is_finite() && params.scale > 0.0) {
        return Err(MassingError::InvalidFootprint(format!(
            "scale must be positive, got {}",
            params.scale
        )));
    }

    let mut outline: Vec<[f64; 2]> = Vec::with_capacity(points.len());
    for &p in points {
        if !(p[0].is_finite() && p[1].is_finite()) {
            return Err(MassingError::InvalidFootprint("non-finite coordinate".into()));
        }
        if outline.last().map_or(true, |&last| !same_point(last, p)) {
            outline.push(p);
        }
    }
    while outline.len() > 1 && same_point(outline[0], outline[outline.len() - 1]) {
        outline.pop();
    }

    if outline.len() < 3 {
        return Err(MassingError::InvalidFootprint(format!(
            "need at least 3 distinct points, got {}",
            outline.len()
        )));
    }

    let center = centroid(&outline, CentroidMethod::Average);
    Ok(outline
        .into_iter()
        .map(|p| [(p[0] - center[0]) * params.scale, (p[1] - center[1]) * params.scale])
        .collect())
}

/// Twice the signed area; positive for counter-clockwise outlines
fn signed_area2(points: &[[f64; 2]]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a[0] * b[1] - b[0] * a[1]
        })
        .sum()
}

fn triangle_area2(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1])
}

/// Extrude a footprint along +Z into an indexed prism with flat normals
pub fn extrude_footprint(points: &[[f64; 2]], params: &FootprintParams) -> Result<MeshData> {
    if !(params.height.is_finite() && params.height > 0.0) {
        return Err(MassingError::InvalidFootprint(format!(
            "height must be positive, got {}",
            params.height
        )));
    }

    let mut outline = prepare_footprint(points, params)?;
    let area2 = signed_area2(&outline);
    if area2.abs() <= f64::EPSILON {
        return Err(MassingError::InvalidFootprint("outline has zero area".into()));
    }
    if area2 < 0.0 {
        outline.reverse();
    }

    let flat: Vec<f64> = outline.iter().flat_map(|p| [p[0], p[1]]).collect();
    let cap = earcutr::earcut(&flat, &[], 2)
        .map_err(|e| MassingError::Triangulation(format!("{:?}", e)))?;
    if cap.is_empty() {
        return Err(MassingError::Triangulation("no cap triangles produced".into()));
    }

    let n = outline.len();
    let height = params.height as f32;
    let mut mesh = MeshData::new();
    let mut indices: Vec<u32> = Vec::with_capacity(cap.len() * 2 + n * 6);

    // Caps: bottom faces -Z, top faces +Z.
    for (z, nz) in [(0.0f32, -1.0f32), (height, 1.0f32)] {
        let base = mesh.positions.len() as u32;
        for p in &outline {
            mesh.positions.push([p[0] as f32, p[1] as f32, z]);
            mesh.normals.push([0.0, 0.0, nz]);
            mesh.tex_coords.push([p[0] as f32, p[1] as f32]);
        }
        for tri in cap.chunks_exact(3) {
            let (a, mut b, mut c) = (tri[0], tri[1], tri[2]);
            let ccw = triangle_area2(outline[a], outline[b], outline[c]) > 0.0;
            if ccw != (nz > 0.0) {
                std::mem::swap(&mut b, &mut c);
            }
            indices.extend([base + a as u32, base + b as u32, base + c as u32]);
        }
    }

    for i in 0..n {
        let p0 = outline[i];
        let p1 = outline[(i + 1) % n];
        let (dx, dy) = (p1[0] - p0[0], p1[1] - p0[1]);
        let len = (dx * dx + dy * dy).sqrt();
        let normal = [(dy / len) as f32, (-dx / len) as f32, 0.0];

        // Texture runs along the dominant axis of the segment.
        let along = |p: [f64; 2]| if dy.abs() < dx.abs() { p[0] as f32 } else { p[1] as f32 };

        let base = mesh.positions.len() as u32;
        for (p, z) in [(p0, 0.0), (p1, 0.0), (p1, height), (p0, height)] {
            mesh.positions.push([p[0] as f32, p[1] as f32, z]);
            mesh.normals.push(normal);
            mesh.tex_coords.push([along(p), 1.0 - z]);
        }
        indices.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    debug!(
        "extruded footprint: {} outline points, {} cap triangles, {} side triangles",
        n,
        cap.len() / 3,
        n * 2
    );

    mesh.indices = Some(indices);
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn square() -> Vec<[f64; 2]> {
        vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]]
    }

    fn params() -> FootprintParams {
        FootprintParams { scale: 1.0, height: 5.0 }
    }

    fn first_normal_z(mesh: &MeshData, triangle: usize) -> f32 {
        mesh.normals[mesh.triangle_indices(triangle).unwrap()[0]][2]
    }

    #[test]
    fn test_prepare_removes_closing_point_and_centres() {
        let mut closed = square();
        closed.push([0.0, 0.0]);
        let prepared = prepare_footprint(&closed, &params()).unwrap();

        assert_eq!(prepared.len(), 4);
        assert_eq!(prepared[0], [-5.0, -5.0]);
        assert_eq!(prepared[2], [5.0, 5.0]);
    }

    #[test]
    fn test_prepare_scales_and_drops_repeats() {
        let points = [[0.0, 0.0], [0.0, 0.0], [4.0, 0.0], [4.0, 2.0], [0.0, 2.0], [0.0, 0.0]];
        let prepared = prepare_footprint(&points, &FootprintParams { scale: 0.5, height: 1.0 }).unwrap();
        assert_eq!(prepared, vec![[-1.0, -0.5], [1.0, -0.5], [1.0, 0.5], [-1.0, 0.5]]);
    }

    #[test]
    fn test_too_few_points_is_invalid() {
        let err = extrude_footprint(&[[0.0, 0.0], [1.0, 0.0], [0.0, 0.0]], &params()).unwrap_err();
        assert!(matches!(err, MassingError::InvalidFootprint(_)));

        let err = extrude_footprint(&square(), &FootprintParams { scale: 1.0, height: 0.0 }).unwrap_err();
        assert!(matches!(err, MassingError::InvalidFootprint(_)));
    }

    #[test]
    fn test_emission_order_bottom_top_sides() {
        let mesh = extrude_footprint(&square(), &params()).unwrap();
        assert_eq!(mesh.triangle_count(), 12);

        for t in 0..2 {
            assert_eq!(first_normal_z(&mesh, t), -1.0);
        }
        for t in 2..4 {
            assert_eq!(first_normal_z(&mesh, t), 1.0);
        }
        for t in 4..12 {
            assert_eq!(first_normal_z(&mesh, t), 0.0);
        }

        let bounds = mesh.bounding_box();
        assert_abs_diff_eq!(bounds.min.z, 0.0);
        assert_abs_diff_eq!(bounds.max.z, 5.0);
        assert_abs_diff_eq!(bounds.center().x, 0.0);
    }

    #[test]
    fn test_side_normals_point_outward_for_clockwise_input() {
        let mut clockwise = square();
        clockwise.reverse();
        let mesh = extrude_footprint(&clockwise, &params()).unwrap();

        for t in 4..mesh.triangle_count() {
            let [a, b, c] = mesh.triangle(t).unwrap();
            let mid = [(a[0] + b[0] + c[0]) / 3.0, (a[1] + b[1] + c[1]) / 3.0];
            let n = mesh.normals[mesh.triangle_indices(t).unwrap()[0]];
            // Footprint is centred on the origin, so outward means away from it.
            assert!(mid[0] * n[0] + mid[1] * n[1] > 0.0);
        }
    }

    #[test]
    fn test_cap_winding_matches_normals() {
        let mesh = extrude_footprint(&square(), &params()).unwrap();
        for t in 0..4 {
            let [a, b, c] = mesh.triangle(t).unwrap();
            let cross_z = (b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1]);
            assert_eq!(cross_z.signum(), first_normal_z(&mesh, t));
        }
    }
}
