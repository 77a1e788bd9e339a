//! # Marker Layout
//!
//! Screen positions of the ten handles. Scale handles sit on fixed points of
//! the local bounding box; the rotate and translate handles line up with the
//! model centre along the camera's right direction, spaced by an offset that
//! grows with camera distance so they stay apart at any zoom.

use cgmath::{MetricSpace, Point3};

use super::handles::{AnchorName, HandleKind, HandleSettings};
use crate::gfx::camera::Camera;
use crate::gfx::math::project_to_screen;
use crate::gfx::scene::{ModelAux, TransformState};

/// A handle projected into the viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub kind: HandleKind,
    /// Pixel position, Y down
    pub screen: (f64, f64),
    pub world: Point3<f64>,
    /// False when the point is behind the camera or clipped
    pub in_front: bool,
}

/// Distance of the side handles from the model centre
pub fn side_offset(settings: &HandleSettings, camera_distance: f64) -> f64 {
    settings.base_offset + camera_distance * settings.distance_factor
}

/// World position of a handle
pub fn marker_world_point<C: Camera + ?Sized>(
    kind: HandleKind,
    transform: &TransformState,
    aux: &ModelAux,
    camera: &C,
    settings: &HandleSettings,
) -> Point3<f64> {
    let bounds = &aux.bounding_box;
    let anchored = |name: AnchorName| transform.apply(name.local_point(bounds));

    let center = transform.apply(aux.center_local);
    let offset = side_offset(settings, camera.eye().distance(center));
    let right = camera.right_direction() * offset;

    match kind {
        HandleKind::ScaleLeft => anchored(AnchorName::LeftEdge),
        HandleKind::ScaleRight => anchored(AnchorName::RightEdge),
        HandleKind::ScaleFront => anchored(AnchorName::FrontEdge),
        HandleKind::ScaleBack => anchored(AnchorName::BackEdge),
        HandleKind::ScaleTop => transform.apply(aux.top_center_local),
        HandleKind::RotateX => center,
        HandleKind::RotateY => center - right,
        HandleKind::RotateZ => center - right * 2.0,
        HandleKind::TranslatePlanar => center + right,
        HandleKind::TranslateVertical => center + right * 2.0,
    }
}

/// Project every handle of the model
pub fn compute_markers<C: Camera + ?Sized>(
    transform: &TransformState,
    aux: &ModelAux,
    camera: &C,
    settings: &HandleSettings,
) -> Vec<Marker> {
    HandleKind::all()
        .iter()
        .map(|&kind| {
            let world = marker_world_point(kind, transform, aux, camera, settings);
            let projected = project_to_screen(world, camera);
            Marker {
                kind,
                screen: (projected.x, projected.y),
                world,
                in_front: projected.in_depth_range(),
            }
        })
        .collect()
}

/// The visible marker nearest to `(x, y)` within `radius` pixels
pub fn hit_marker(markers: &[Marker], x: f64, y: f64, radius: f64) -> Option<HandleKind> {
    markers
        .iter()
        .filter(|m| m.in_front)
        .map(|m| {
            let (dx, dy) = (m.screen.0 - x, m.screen.1 - y);
            (m.kind, dx * dx + dy * dy)
        })
        .filter(|(_, d2)| *d2 <= radius * radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(kind, _)| kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::OrbitCamera;
    use crate::gfx::geometry::Aabb;
    use approx::assert_abs_diff_eq;

    fn setup() -> (TransformState, ModelAux, OrbitCamera) {
        let aux = ModelAux::from_bounds(Aabb::new(Point3::new(-2.0, 0.0, -2.0), Point3::new(2.0, 4.0, 2.0)));
        let mut camera = OrbitCamera::new(Point3::new(0.0, 2.0, 30.0), Point3::new(0.0, 2.0, 0.0), 75.0, 0.1, 1000.0);
        camera.resize_projection(800, 600);
        (TransformState::default(), aux, camera)
    }

    #[test]
    fn test_centre_marker_projects_to_viewport_centre() {
        let (t, aux, camera) = setup();
        let markers = compute_markers(&t, &aux, &camera, &HandleSettings::default());
        assert_eq!(markers.len(), 10);

        let center = markers.iter().find(|m| m.kind == HandleKind::RotateX).unwrap();
        assert_abs_diff_eq!(center.screen.0, 400.0, epsilon = 1e-6);
        assert_abs_diff_eq!(center.screen.1, 300.0, epsilon = 1e-6);
        assert!(center.in_front);
    }

    #[test]
    fn test_side_markers_are_spread_along_camera_right() {
        let (t, aux, camera) = setup();
        let settings = HandleSettings::default();
        let offset = side_offset(&settings, 30.0);
        assert_abs_diff_eq!(offset, 0.02 + 30.0 * 0.05, epsilon = 1e-12);

        let right2 = marker_world_point(HandleKind::TranslateVertical, &t, &aux, &camera, &settings);
        let left = marker_world_point(HandleKind::RotateY, &t, &aux, &camera, &settings);
        assert_abs_diff_eq!(right2.x, 2.0 * offset, epsilon = 1e-9);
        assert_abs_diff_eq!(left.x, -offset, epsilon = 1e-9);

        let markers = compute_markers(&t, &aux, &camera, &settings);
        let x_of = |kind| markers.iter().find(|m| m.kind == kind).unwrap().screen.0;
        assert!(x_of(HandleKind::RotateZ) < x_of(HandleKind::RotateY));
        assert!(x_of(HandleKind::RotateY) < x_of(HandleKind::RotateX));
        assert!(x_of(HandleKind::TranslatePlanar) < x_of(HandleKind::TranslateVertical));
    }

    #[test]
    fn test_hit_marker_prefers_nearest_and_skips_hidden() {
        let marker = |kind, x, in_front| Marker {
            kind,
            screen: (x, 100.0),
            world: Point3::new(0.0, 0.0, 0.0),
            in_front,
        };
        let markers = [
            marker(HandleKind::RotateX, 100.0, true),
            marker(HandleKind::RotateY, 104.0, true),
            marker(HandleKind::ScaleTop, 103.0, false),
        ];

        assert_eq!(hit_marker(&markers, 103.0, 100.0, 6.0), Some(HandleKind::RotateY));
        assert_eq!(hit_marker(&markers, 101.0, 100.0, 6.0), Some(HandleKind::RotateX));
        assert_eq!(hit_marker(&markers, 200.0, 100.0, 6.0), None);
    }
}
