//! Concrete [`DragBehaviour`]s, one per family of handles.

use std::f64::consts::FRAC_PI_2;

use cgmath::{Point3, Vector3};
use log::trace;

use super::handles::{pin_anchor, AnchorName, HandleKind, HandleSettings};
use super::traits::{DragBehaviour, DragStart, PointerSample};
use crate::gfx::geometry::Aabb;
use crate::gfx::picking::intersect_ground_plane;
use crate::gfx::scene::{Axis, TransformState};

/// Which pointer coordinate drives a handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenAxis {
    Horizontal,
    Vertical,
}

impl ScreenAxis {
    fn pick(self, x: f64, y: f64) -> f64 {
        match self {
            ScreenAxis::Horizontal => x,
            ScreenAxis::Vertical => y,
        }
    }
}

/// Scale one axis from pointer movement and keep the opposite anchor in place.
///
/// Incremental: the pointer baseline moves to the current position after every
/// step.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisScale {
    axis: Axis,
    screen: ScreenAxis,
    /// `+1` grows with the pointer coordinate, `-1` shrinks
    sign: f64,
    factor: f64,
    pinned: AnchorName,
    last_pointer: f64,
    pinned_local: Point3<f64>,
    pinned_world: Point3<f64>,
}

impl AxisScale {
    pub fn new(axis: Axis, screen: ScreenAxis, sign: f64, factor: f64, pinned: AnchorName) -> Self {
        Self {
            axis,
            screen,
            sign,
            factor,
            pinned,
            last_pointer: 0.0,
            pinned_local: Point3::new(0.0, 0.0, 0.0),
            pinned_world: Point3::new(0.0, 0.0, 0.0),
        }
    }

    pub fn pinned(&self) -> AnchorName {
        self.pinned
    }
}

impl DragBehaviour for AxisScale {
    fn begin(&mut self, start: &DragStart) {
        self.last_pointer = self.screen.pick(start.pointer.x, start.pointer.y);
        self.pinned_local = self.pinned.local_point(&start.local_box);
        self.pinned_world = start.anchors.get(self.pinned);
    }

    fn update(&mut self, pointer: &PointerSample, transform: &mut TransformState) {
        let current = self.screen.pick(pointer.x, pointer.y);
        let delta = current - self.last_pointer;
        let index = self.axis.index();

        transform.scale[index] += self.sign * delta * self.factor;
        transform.clamp_scale();
        pin_anchor(transform, self.pinned_local, self.pinned_world);

        self.last_pointer = current;
        trace!("scale {:?} -> {}", self.axis, transform.scale[index]);
    }
}

/// Rotate about one axis, measured from the drag start
#[derive(Debug, Clone, PartialEq)]
pub struct Rotate {
    axis: Axis,
    screen: ScreenAxis,
    sign: f64,
    sensitivity: f64,
    /// Symmetric limit on the resulting angle
    limit: Option<f64>,
    start_angle: f64,
    start_pointer: f64,
}

impl Rotate {
    pub fn new(axis: Axis, screen: ScreenAxis, sign: f64, sensitivity: f64, limit: Option<f64>) -> Self {
        Self {
            axis,
            screen,
            sign,
            sensitivity,
            limit,
            start_angle: 0.0,
            start_pointer: 0.0,
        }
    }
}

impl DragBehaviour for Rotate {
    fn begin(&mut self, start: &DragStart) {
        self.start_angle = start.baseline.rotation[self.axis.index()];
        self.start_pointer = self.screen.pick(start.pointer.x, start.pointer.y);
    }

    fn update(&mut self, pointer: &PointerSample, transform: &mut TransformState) {
        let delta = self.screen.pick(pointer.x, pointer.y) - self.start_pointer;
        let mut angle = self.start_angle + self.sign * delta * self.sensitivity;
        if let Some(limit) = self.limit {
            angle = angle.clamp(-limit, limit);
        }
        transform.set_rotation(self.axis, angle);
    }
}

/// Follow the pointer across the ground plane (X and Z only)
#[derive(Debug, Clone, PartialEq)]
pub struct PlanarTranslate {
    start_position: Vector3<f64>,
    start_hit: Option<Point3<f64>>,
}

impl PlanarTranslate {
    pub fn new() -> Self {
        Self {
            start_position: Vector3::new(0.0, 0.0, 0.0),
            start_hit: None,
        }
    }
}

impl Default for PlanarTranslate {
    fn default() -> Self {
        Self::new()
    }
}

impl DragBehaviour for PlanarTranslate {
    fn begin(&mut self, start: &DragStart) {
        self.start_position = start.baseline.position;
        self.start_hit = start.ground_hit;
    }

    fn update(&mut self, pointer: &PointerSample, transform: &mut TransformState) {
        // Pointer above the horizon: nothing to follow.
        let (Some(start_hit), Some(hit)) = (self.start_hit, pointer.ray.as_ref().and_then(intersect_ground_plane)) else {
            return;
        };
        let delta = hit - start_hit;
        transform.position.x = self.start_position.x + delta.x;
        transform.position.z = self.start_position.z + delta.z;
    }
}

/// Raise or lower from vertical pointer movement
#[derive(Debug, Clone, PartialEq)]
pub struct VerticalTranslate {
    move_speed: f64,
    start_y: f64,
    start_pointer_y: f64,
}

impl VerticalTranslate {
    pub fn new(move_speed: f64) -> Self {
        Self {
            move_speed,
            start_y: 0.0,
            start_pointer_y: 0.0,
        }
    }
}

impl DragBehaviour for VerticalTranslate {
    fn begin(&mut self, start: &DragStart) {
        self.start_y = start.baseline.position.y;
        self.start_pointer_y = start.pointer.y;
    }

    fn update(&mut self, pointer: &PointerSample, transform: &mut TransformState) {
        // Screen Y grows downward, so moving up raises the model.
        transform.position.y = self.start_y - (pointer.y - self.start_pointer_y) * self.move_speed;
    }
}

/// The behaviour selected for a handle kind
#[derive(Debug, Clone, PartialEq)]
pub enum ActiveHandle {
    Scale(AxisScale),
    Rotate(Rotate),
    PlanarTranslate(PlanarTranslate),
    VerticalTranslate(VerticalTranslate),
}

impl ActiveHandle {
    pub fn for_kind(kind: HandleKind, settings: &HandleSettings) -> Self {
        use ScreenAxis::{Horizontal, Vertical};

        let scale = |axis, screen, sign, pinned| {
            ActiveHandle::Scale(AxisScale::new(axis, screen, sign, settings.scale_factor, pinned))
        };

        match kind {
            HandleKind::ScaleLeft => scale(Axis::X, Horizontal, -1.0, AnchorName::RightEdge),
            HandleKind::ScaleRight => scale(Axis::X, Horizontal, 1.0, AnchorName::LeftEdge),
            HandleKind::ScaleFront => scale(Axis::Z, Vertical, -1.0, AnchorName::BackEdge),
            HandleKind::ScaleBack => scale(Axis::Z, Vertical, 1.0, AnchorName::FrontEdge),
            HandleKind::ScaleTop => scale(Axis::Y, Vertical, -1.0, AnchorName::BottomCenter),
            HandleKind::RotateX => ActiveHandle::Rotate(Rotate::new(
                Axis::X,
                Vertical,
                -1.0,
                settings.rotation_x_sensitivity,
                Some(FRAC_PI_2),
            )),
            HandleKind::RotateY => ActiveHandle::Rotate(Rotate::new(
                Axis::Y,
                Horizontal,
                1.0,
                settings.rotation_sensitivity,
                None,
            )),
            HandleKind::RotateZ => ActiveHandle::Rotate(Rotate::new(
                Axis::Z,
                Horizontal,
                -1.0,
                settings.rotation_sensitivity,
                None,
            )),
            HandleKind::TranslatePlanar => ActiveHandle::PlanarTranslate(PlanarTranslate::new()),
            HandleKind::TranslateVertical => {
                ActiveHandle::VerticalTranslate(VerticalTranslate::new(settings.move_speed))
            }
        }
    }

    fn inner(&mut self) -> &mut dyn DragBehaviour {
        match self {
            ActiveHandle::Scale(b) => b,
            ActiveHandle::Rotate(b) => b,
            ActiveHandle::PlanarTranslate(b) => b,
            ActiveHandle::VerticalTranslate(b) => b,
        }
    }
}

impl DragBehaviour for ActiveHandle {
    fn begin(&mut self, start: &DragStart) {
        self.inner().begin(start);
    }

    fn update(&mut self, pointer: &PointerSample, transform: &mut TransformState) {
        self.inner().update(pointer, transform);
    }

    fn end(&mut self) {
        self.inner().end();
    }
}

/// Bounds of the scaled box along one axis, for logging
pub(crate) fn scaled_extent(local_box: &Aabb, transform: &TransformState, axis: Axis) -> f64 {
    let size = local_box.size();
    size[axis.index()] * transform.scale[axis.index()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::gizmos::handles::FixedAnchorSet;

    fn start(baseline: TransformState, x: f64, y: f64) -> DragStart {
        let local_box = Aabb::new(Point3::new(-1.0, 0.0, -1.0), Point3::new(1.0, 4.0, 1.0));
        DragStart {
            baseline,
            anchors: FixedAnchorSet::capture(&local_box, &baseline),
            local_box,
            pointer: PointerSample::new(x, y),
            ground_hit: None,
        }
    }

    #[test]
    fn test_edge_scale_is_incremental() {
        let mut t = TransformState::default();
        let mut handle = ActiveHandle::for_kind(HandleKind::ScaleRight, &HandleSettings::default());
        handle.begin(&start(t, 100.0, 100.0));

        handle.update(&PointerSample::new(200.0, 100.0), &mut t);
        assert!((t.scale.x - 1.3).abs() < 1e-12);
        // Same pointer position again: no further change.
        handle.update(&PointerSample::new(200.0, 100.0), &mut t);
        assert!((t.scale.x - 1.3).abs() < 1e-12);
        assert!((scaled_extent(&Aabb::new(Point3::new(-1.0, 0.0, -1.0), Point3::new(1.0, 4.0, 1.0)), &t, Axis::X) - 2.6).abs() < 1e-12);
    }

    #[test]
    fn test_rotation_is_absolute_from_start() {
        let mut t = TransformState::default();
        t.rotation.y = 0.5;
        let mut handle = ActiveHandle::for_kind(HandleKind::RotateY, &HandleSettings::default());
        handle.begin(&start(t, 100.0, 100.0));

        handle.update(&PointerSample::new(150.0, 100.0), &mut t);
        handle.update(&PointerSample::new(150.0, 100.0), &mut t);
        assert!((t.rotation.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rotate_z_turns_against_pointer() {
        let mut t = TransformState::default();
        let mut handle = ActiveHandle::for_kind(HandleKind::RotateZ, &HandleSettings::default());
        handle.begin(&start(t, 0.0, 0.0));
        handle.update(&PointerSample::new(20.0, 0.0), &mut t);
        assert!((t.rotation.z + 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_vertical_translate_moves_up_when_pointer_moves_up() {
        let mut t = TransformState::default();
        let mut handle = ActiveHandle::for_kind(HandleKind::TranslateVertical, &HandleSettings::default());
        handle.begin(&start(t, 300.0, 300.0));
        handle.update(&PointerSample::new(300.0, 280.0), &mut t);
        assert!((t.position.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_scale_handles_pin_the_opposite_anchor() {
        let settings = HandleSettings::default();
        for kind in HandleKind::all().iter().copied().filter(|k| k.is_scale()) {
            match ActiveHandle::for_kind(kind, &settings) {
                ActiveHandle::Scale(b) => assert_eq!(Some(b.pinned()), kind.pinned_anchor()),
                other => panic!("{:?} built {:?}", kind, other),
            }
        }
    }

    #[test]
    fn test_planar_translate_starts_at_origin() {
        assert_eq!(PlanarTranslate::default(), PlanarTranslate::new());
        assert!(matches!(
            ActiveHandle::for_kind(HandleKind::TranslatePlanar, &HandleSettings::default()),
            ActiveHandle::PlanarTranslate(p) if p == PlanarTranslate::new()
        ));
    }

    #[test]
    fn test_planar_translate_without_ground_hit_is_inert() {
        let mut t = TransformState::default();
        let mut handle = ActiveHandle::for_kind(HandleKind::TranslatePlanar, &HandleSettings::default());
        handle.begin(&start(t, 0.0, 0.0));
        handle.update(&PointerSample::new(50.0, 50.0), &mut t);
        assert_eq!(t, TransformState::default());
    }
}
