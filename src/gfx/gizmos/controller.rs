//! # Handle Controller
//!
//! Owns the markers of the active model and the drag state machine:
//!
//! ```text
//! Idle --pointer_down on a marker--> Dragging { kind, snapshot } --pointer_up--> Idle
//! ```
//!
//! Only one drag runs at a time; a second pointer down while dragging is
//! ignored. Snapshots belong to a single drag and are dropped on release.

use log::{debug, trace};

use super::behaviours::{scaled_extent, ActiveHandle};
use super::handles::{FixedAnchorSet, HandleKind, HandleSettings};
use super::markers::{compute_markers, hit_marker, Marker};
use super::traits::{DragBehaviour, DragStart, PointerSample};
use crate::gfx::camera::Camera;
use crate::gfx::picking::{intersect_ground_plane, screen_to_ray};
use crate::gfx::scene::{Axis, ModelAux, TransformState};

struct Drag {
    kind: HandleKind,
    start: DragStart,
    behaviour: ActiveHandle,
}

enum DragState {
    Idle,
    Dragging(Box<Drag>),
}

pub struct HandleController {
    settings: HandleSettings,
    markers: Vec<Marker>,
    state: DragState,
}

impl HandleController {
    pub fn new(settings: HandleSettings) -> Self {
        Self {
            settings,
            markers: Vec::new(),
            state: DragState::Idle,
        }
    }

    pub fn settings(&self) -> &HandleSettings {
        &self.settings
    }

    /// Reproject every marker from the model's current transform
    pub fn update_markers<C: Camera + ?Sized>(&mut self, transform: &TransformState, aux: &ModelAux, camera: &C) {
        self.markers = compute_markers(transform, aux, camera, &self.settings);
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Forget the markers, ending any drag in progress
    pub fn clear_markers(&mut self) {
        self.markers.clear();
        self.pointer_up();
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn active_kind(&self) -> Option<HandleKind> {
        match &self.state {
            DragState::Dragging(drag) => Some(drag.kind),
            DragState::Idle => None,
        }
    }

    /// Anchors frozen by the running drag
    pub fn anchors(&self) -> Option<&FixedAnchorSet> {
        match &self.state {
            DragState::Dragging(drag) => Some(&drag.start.anchors),
            DragState::Idle => None,
        }
    }

    /// Start a drag if the pointer is on a marker. Returns whether a drag began.
    pub fn pointer_down<C: Camera + ?Sized>(
        &mut self,
        x: f64,
        y: f64,
        transform: &TransformState,
        aux: &ModelAux,
        camera: &C,
    ) -> bool {
        if self.is_dragging() {
            debug!("pointer down ignored, drag already running");
            return false;
        }
        match hit_marker(&self.markers, x, y, self.settings.marker_radius) {
            Some(kind) => self.begin_drag(kind, x, y, transform, aux, camera),
            None => false,
        }
    }

    /// Start dragging `kind` from pointer `(x, y)` regardless of marker positions
    pub fn begin_drag<C: Camera + ?Sized>(
        &mut self,
        kind: HandleKind,
        x: f64,
        y: f64,
        transform: &TransformState,
        aux: &ModelAux,
        camera: &C,
    ) -> bool {
        if self.is_dragging() {
            debug!("begin_drag({:?}) ignored, drag already running", kind);
            return false;
        }

        let ray = screen_to_ray(x, y, camera);
        let local_box = aux.bounding_box;
        let start = DragStart {
            baseline: *transform,
            anchors: FixedAnchorSet::capture(&local_box, transform),
            local_box,
            pointer: PointerSample::new(x, y).with_ray(ray),
            ground_hit: intersect_ground_plane(&ray),
        };

        let mut behaviour = ActiveHandle::for_kind(kind, &self.settings);
        behaviour.begin(&start);
        debug!("drag {:?} started at ({:.1}, {:.1})", kind, x, y);

        self.state = DragState::Dragging(Box::new(Drag { kind, start, behaviour }));
        true
    }

    /// Apply a pointer move to `transform`. Returns false when no drag is running.
    pub fn pointer_move<C: Camera + ?Sized>(
        &mut self,
        x: f64,
        y: f64,
        transform: &mut TransformState,
        camera: &C,
    ) -> bool {
        let DragState::Dragging(drag) = &mut self.state else {
            return false;
        };

        let pointer = PointerSample::new(x, y).with_ray(screen_to_ray(x, y, camera));
        drag.behaviour.update(&pointer, transform);

        if drag.kind.is_scale() {
            trace!(
                "model extent {:.3} x {:.3} x {:.3}",
                scaled_extent(&drag.start.local_box, transform, Axis::X),
                scaled_extent(&drag.start.local_box, transform, Axis::Y),
                scaled_extent(&drag.start.local_box, transform, Axis::Z),
            );
        }
        true
    }

    /// End the drag, returning the handle that was released
    pub fn pointer_up(&mut self) -> Option<HandleKind> {
        match std::mem::replace(&mut self.state, DragState::Idle) {
            DragState::Dragging(mut drag) => {
                drag.behaviour.end();
                debug!("drag {:?} ended", drag.kind);
                Some(drag.kind)
            }
            DragState::Idle => None,
        }
    }
}

impl Default for HandleController {
    fn default() -> Self {
        Self::new(HandleSettings::default())
    }
}
