//! # Scene Session
//!
//! [`SceneSession`] owns everything an authoring view needs: the scene graph,
//! the orbit camera, the handle controller, face interaction, the event
//! registry and the frame-driven tweens used for fly-to.
//!
//! The host drives it with [`SceneSession::tick`] once per frame. Input is
//! pulled from the injected [`InputSource`] at the start of each tick, so the
//! whole frame runs in a fixed order:
//!
//! 1. drain and dispatch input
//! 2. advance tweens and move the camera
//! 3. emit `Animate`
//! 4. keep helpers (box helper, outlines, markers) on the active model
//! 5. emit `RenderBefore`, render, emit `RenderAfter`
//!
//! ## Usage
//!
//! ```rust
//! use massing::config::SessionOptions;
//! use massing::gfx::geometry::{FootprintParams, SAMPLE_FOOTPRINT};
//! use massing::session::{InputEvent, SceneSession};
//!
//! let (mut session, input) = SceneSession::with_queued_input(SessionOptions::default());
//! session.add_building(&SAMPLE_FOOTPRINT, &FootprintParams::default()).unwrap();
//!
//! input.push(InputEvent::Resize { width: 800, height: 600 });
//! session.tick(1.0 / 60.0, &mut ());
//! assert_eq!(session.camera().viewport.width, 800.0);
//! ```

pub mod events;
pub mod input;
pub mod winit_input;

use std::future::Future;
use std::path::{Path, PathBuf};

use cgmath::{EuclideanSpace, Matrix4, Point3, Rad, Vector3};
use futures::future::{self, Either};
use log::{debug, error, info, warn};

use crate::config::SessionOptions;
use crate::error::{MassingError, Result};
use crate::gfx::camera::{fly_to, plan_fly_to, FrameTweener, OrbitCamera, TweenTarget};
use crate::gfx::faces::{build_face_materials, classify_faces};
use crate::gfx::geometry::{extrude_footprint, generate_box, Aabb, FootprintParams};
use crate::gfx::gizmos::HandleController;
use crate::gfx::scene::{Axis, FaceData, MeshNode, ModelAux, NodeId, NodeKind, Scene, SceneGraph, SceneNode, TransformState};
use crate::interaction::{pick_face, ClickOutcome, FaceInteraction, FaceKey};
use crate::io;

pub use events::{EventKind, EventRegistry, Listener, ListenerHandle, ScopeId, SessionEvent};
pub use input::{InputEvent, InputSource, PointerButton, PointerEvent, PointerTracker, QueuedInput, CLICK_TOLERANCE};
pub use winit_input::{WinitInput, DOUBLE_CLICK_INTERVAL};

/// Draws the scene once per tick.
///
/// The session never touches a GPU; the host plugs its renderer in here.
pub trait Renderer {
    fn render(&mut self, graph: &dyn SceneGraph, camera: &OrbitCamera);
}

/// No-op renderer for headless use
impl Renderer for () {
    fn render(&mut self, _graph: &dyn SceneGraph, _camera: &OrbitCamera) {}
}

#[derive(Debug, Clone, Copy)]
struct ActiveModel {
    id: NodeId,
    aux: ModelAux,
    box_helper: NodeId,
}

pub struct SceneSession<G: SceneGraph = Scene> {
    options: SessionOptions,
    camera: OrbitCamera,
    graph: G,
    events: EventRegistry,
    handles: HandleController,
    tweener: FrameTweener,
    pointer: PointerTracker,
    faces: FaceInteraction,
    input: Box<dyn InputSource>,
    active: Option<ActiveModel>,
    /// Grid and lights attached at construction
    environment: Vec<NodeId>,
}

impl SceneSession<Scene> {
    /// Session over an in-memory [`Scene`] fed by a [`QueuedInput`]; push events
    /// through the returned handle
    pub fn with_queued_input(options: SessionOptions) -> (Self, QueuedInput) {
        let input = QueuedInput::new();
        let session = Self::new(options, Scene::new(), Box::new(input.clone()));
        (session, input)
    }
}

impl<G: SceneGraph> SceneSession<G> {
    pub fn new(options: SessionOptions, mut graph: G, input: Box<dyn InputSource>) -> Self {
        let camera = OrbitCamera::new(
            Point3::from_vec(options.camera_position.into()),
            Point3::new(0.0, 0.0, 0.0),
            options.camera_fov,
            options.camera_near,
            options.camera_far,
        );

        let environment = vec![
            graph.attach(SceneNode::new(
                "grid",
                NodeKind::Grid {
                    size: options.grid_size,
                    divisions: options.grid_divisions,
                },
            )),
            graph.attach(SceneNode::new(
                "ambient_light",
                NodeKind::AmbientLight {
                    intensity: options.ambient_light_intensity,
                },
            )),
            graph.attach(
                SceneNode::new(
                    "directional_light",
                    NodeKind::DirectionalLight {
                        intensity: options.directional_light_intensity,
                    },
                )
                .with_transform(TransformState::new().with_position(Vector3::new(5.0, 5.0, 5.0))),
            ),
        ];

        let caps = &options.capabilities;
        let faces = FaceInteraction::new(caps.hover_style, caps.click_effect.clone());
        let handles = HandleController::new(options.handle_settings());
        info!(
            "session ready: camera at ({:.1}, {:.1}, {:.1}), fov {}",
            camera.eye.x, camera.eye.y, camera.eye.z, options.camera_fov
        );

        Self {
            options,
            camera,
            graph,
            events: EventRegistry::new(),
            handles,
            tweener: FrameTweener::new(),
            pointer: PointerTracker::new(),
            faces,
            input,
            active: None,
            environment,
        }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut G {
        &mut self.graph
    }

    pub fn handles(&self) -> &HandleController {
        &self.handles
    }

    pub fn faces(&self) -> &FaceInteraction {
        &self.faces
    }

    pub fn events(&self) -> &EventRegistry {
        &self.events
    }

    pub fn on(&mut self, kind: EventKind, listener: Listener, scope: Option<ScopeId>) -> ListenerHandle {
        self.events.on(kind, listener, scope)
    }

    pub fn un(&mut self, kind: EventKind, listener: &Listener, scope: Option<ScopeId>) -> bool {
        self.events.un(kind, listener, scope)
    }

    pub fn off(&mut self, handle: ListenerHandle) -> bool {
        self.events.off(handle)
    }

    /// Node id of the model the handles act on
    pub fn active_model(&self) -> Option<NodeId> {
        self.active.map(|a| a.id)
    }

    pub fn active_transform(&self) -> Option<TransformState> {
        let active = self.active?;
        self.graph.get(active.id).map(|node| node.transform)
    }

    /// Run one frame
    pub fn tick(&mut self, delta_seconds: f64, renderer: &mut dyn Renderer) {
        for event in self.input.drain() {
            self.dispatch(event);
        }

        for (target, value) in self.tweener.advance(delta_seconds) {
            match target {
                TweenTarget::CameraPosition => self.camera.set_eye(value),
                TweenTarget::OrbitTarget => self.camera.look_at(value),
            }
        }

        self.events.emit(&SessionEvent::Animate { delta_seconds });
        self.sync_helpers();

        self.events.emit(&SessionEvent::RenderBefore);
        renderer.render(&self.graph, &self.camera);
        self.events.emit(&SessionEvent::RenderAfter);
    }

    /// Handle one input event immediately
    pub fn dispatch(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerDown(pointer) => self.pointer_down(pointer),
            InputEvent::PointerMove(pointer) => self.pointer_move(pointer),
            InputEvent::PointerUp(pointer) => self.pointer_up(pointer),
            InputEvent::DoubleClick(pointer) => self.double_click(pointer),
            InputEvent::Resize { width, height } => {
                debug!("resize to {}x{}", width, height);
                self.camera.resize_projection(width, height);
                self.update_markers();
            }
        }
    }

    fn emit_pointer(&self, kind: EventKind, pointer: PointerEvent, face: Option<FaceKey>) {
        self.events.emit(&SessionEvent::Pointer { kind, pointer, face });
    }

    fn pick(&self, pointer: &PointerEvent) -> Option<FaceKey> {
        pick_face(&self.graph, &self.camera, pointer.x, pointer.y).map(|hit| hit.key)
    }

    fn pointer_down(&mut self, pointer: PointerEvent) {
        self.pointer.down(&pointer);

        if pointer.button == PointerButton::Left && self.options.capabilities.markers {
            if let Some(active) = self.active {
                if let Some(node) = self.graph.get(active.id) {
                    let transform = node.transform;
                    self.handles
                        .pointer_down(pointer.x, pointer.y, &transform, &active.aux, &self.camera);
                }
            }
        }

        self.emit_pointer(EventKind::MouseDown, pointer, None);
    }

    fn pointer_move(&mut self, pointer: PointerEvent) {
        self.pointer.moved(&pointer);

        if self.handles.is_dragging() {
            if let Some(node) = self.active.and_then(|a| self.graph.get_mut(a.id)) {
                self.handles
                    .pointer_move(pointer.x, pointer.y, &mut node.transform, &self.camera);
            }
            self.emit_pointer(EventKind::MouseMove, pointer, None);
            return;
        }

        let face = self.pick(&pointer);
        if self.options.capabilities.face_hover {
            self.faces.hover(&mut self.graph, face);
        }
        self.emit_pointer(EventKind::MouseMove, pointer, face);
    }

    fn pointer_up(&mut self, pointer: PointerEvent) {
        let released = self.handles.pointer_up();
        let click = self.pointer.up(&pointer);
        self.emit_pointer(EventKind::MouseUp, pointer, None);

        if let Some(kind) = released {
            debug!("released {:?} handle", kind);
            self.sync_helpers();
            return;
        }
        if let Some(click) = click {
            self.click(click);
        }
    }

    fn click(&mut self, pointer: PointerEvent) {
        let face = self.pick(&pointer);
        self.emit_pointer(EventKind::Click, pointer, face);

        if !self.options.capabilities.face_click {
            return;
        }
        if let ClickOutcome::Selected { fly_to: Some(bounds), .. } = self.faces.click(&mut self.graph, face) {
            // The tween runs on the frame tweener whether or not anyone awaits it.
            drop(self.fly_to(&bounds));
        }
    }

    fn double_click(&mut self, pointer: PointerEvent) {
        let face = self.pick(&pointer);
        self.emit_pointer(EventKind::DoubleClick, pointer, face);

        if !self.options.capabilities.double_click_fly_to {
            return;
        }
        if let Some(bounds) = face.and_then(|key| self.graph.get(key.node)).map(|node| node.world_bounds()) {
            drop(self.fly_to(&bounds));
        }
    }

    /// Fly the camera to frame `bounds`.
    ///
    /// The future resolves once both the camera position and the orbit target
    /// tweens finished; `false` if either was superseded or `bounds` is empty.
    pub fn fly_to(&mut self, bounds: &Aabb) -> impl Future<Output = bool> + 'static {
        match plan_fly_to(bounds, &self.camera) {
            Some(plan) => {
                debug!(
                    "fly to ({:.1}, {:.1}, {:.1})",
                    plan.center.x, plan.center.y, plan.center.z
                );
                Either::Left(fly_to(&mut self.tweener, &plan, self.camera.eye, self.camera.target))
            }
            None => {
                warn!("fly_to called with empty bounds");
                Either::Right(future::ready(false))
            }
        }
    }

    /// Whether a fly-to is still animating
    pub fn is_flying(&self) -> bool {
        !self.tweener.is_idle()
    }

    /// Make `node` the active model, replacing the previous one.
    ///
    /// The model is lifted so its lowest vertex sits on the ground plane.
    pub fn load_model(&mut self, node: SceneNode) -> NodeId {
        self.activate(node, true)
    }

    fn activate(&mut self, mut node: SceneNode, lift: bool) -> NodeId {
        if let Some(previous) = self.active {
            self.remove(previous.id);
        }
        node.transform.clamp_scale();

        if lift {
            let matrix = node.transform.matrix();
            let lowest = node
                .meshes
                .iter()
                .filter_map(|mesh| mesh.geometry.min_y_transformed(&(matrix * mesh.local)))
                .reduce(f64::min);
            if let Some(min_y) = lowest {
                node.transform.position.y -= min_y;
            }
        }

        let aux = ModelAux::from_bounds(node.local_bounds());
        let transform = node.transform;
        let name = node.name.clone();
        let id = self.graph.attach(node);

        let box_helper = self.graph.attach(
            SceneNode::new(
                "box_helper",
                NodeKind::BoxHelper {
                    color: self.options.box_helper_color,
                },
            )
            .with_mesh(MeshNode::new("box", generate_box(&aux.bounding_box)))
            .with_transform(transform),
        );

        self.active = Some(ActiveModel { id, aux, box_helper });
        self.update_markers();
        info!("active model '{}' ({:?})", name, id);
        id
    }

    /// Load an OBJ file as the active model. Failures are logged and leave the scene as it was.
    pub fn load_obj_file(&mut self, path: impl AsRef<Path>) -> bool {
        match io::load_obj(path) {
            Ok(node) => {
                self.load_model(node);
                true
            }
            Err(e) => {
                error!("{}", e);
                false
            }
        }
    }

    /// Extrude `footprint` into a building with classified faces and make it the active model
    pub fn add_building(&mut self, footprint: &[[f64; 2]], params: &FootprintParams) -> Result<NodeId> {
        let mesh = extrude_footprint(footprint, params)?;
        let map = classify_faces(&mesh)?;
        let materials = build_face_materials(&map, &[]);
        debug!("building with {} faces ({} triangles)", map.distinct().len(), map.len());

        // Footprints are Z-up; stand the prism on the XZ ground plane.
        let faces = MeshNode::new("faces", mesh)
            .with_local(Matrix4::from_angle_x(Rad(-std::f64::consts::FRAC_PI_2)))
            .with_faces(FaceData { map, materials });

        Ok(self.load_model(SceneNode::model("building", vec![faces])))
    }

    fn edit_active(&mut self, edit: impl FnOnce(&mut TransformState)) -> Result<()> {
        let active = self.active.ok_or(MassingError::NoActiveModel)?;
        let node = self.graph.get_mut(active.id).ok_or(MassingError::NoActiveModel)?;
        edit(&mut node.transform);
        self.sync_helpers();
        Ok(())
    }

    pub fn set_position(&mut self, axis: Axis, value: f64) -> Result<()> {
        self.edit_active(|t| t.set_position(axis, value))
    }

    /// Set one Euler angle of the active model, in radians
    pub fn set_rotation(&mut self, axis: Axis, radians: f64) -> Result<()> {
        self.edit_active(|t| t.set_rotation(axis, radians))
    }

    pub fn set_scale(&mut self, axis: Axis, value: f64) -> Result<()> {
        self.edit_active(|t| t.set_scale(axis, value))
    }

    /// Detach a node. Removing the active model also drops its box helper, markers and highlights.
    pub fn remove(&mut self, id: NodeId) -> Option<SceneNode> {
        if self.graph.get(id).is_some_and(|node| node.kind == NodeKind::Model) {
            self.faces.reset(&mut self.graph);
        }
        if let Some(active) = self.active.filter(|a| a.id == id) {
            self.handles.pointer_up();
            self.handles.clear_markers();
            self.graph.detach(active.box_helper);
            self.active = None;
        }
        self.graph.detach(id)
    }

    /// Detach everything except the grid and lights
    pub fn clear(&mut self) {
        self.faces.reset(&mut self.graph);
        self.handles.pointer_up();
        self.handles.clear_markers();
        self.active = None;

        let mut removed = 0;
        for id in self.graph.node_ids() {
            if !self.environment.contains(&id) {
                self.graph.detach(id);
                removed += 1;
            }
        }
        debug!("cleared {} nodes", removed);
    }

    pub fn export_glb(&self) -> Result<Vec<u8>> {
        io::export_glb(&self.graph)
    }

    pub fn export_json(&self) -> Result<String> {
        io::export_json(&self.graph)
    }

    /// Write the exports enabled in the capabilities to `dir` under their fixed names
    pub fn save_exports(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        let mut saved = Vec::new();
        if self.options.capabilities.export_glb {
            saved.push(io::save_blob(dir, io::MODEL_GLB, &self.export_glb()?)?);
        }
        if self.options.capabilities.export_json {
            saved.push(io::save_blob(dir, io::MODEL_JSON, self.export_json()?.as_bytes())?);
        }
        Ok(saved)
    }

    /// Attach imported nodes; the first becomes the active model in place
    fn attach_imported(&mut self, nodes: Vec<SceneNode>) -> Vec<NodeId> {
        let mut nodes = nodes.into_iter();
        let Some(first) = nodes.next() else {
            warn!("import contained no nodes");
            return Vec::new();
        };
        let mut ids = vec![self.activate(first, false)];
        ids.extend(nodes.map(|mut node| {
            node.transform.clamp_scale();
            self.graph.attach(node)
        }));
        ids
    }

    pub fn import_glb(&mut self, bytes: &[u8]) -> Result<Vec<NodeId>> {
        let nodes = io::import_glb(bytes)?;
        Ok(self.attach_imported(nodes))
    }

    pub fn import_json(&mut self, json: &str) -> Result<Vec<NodeId>> {
        let nodes = io::import_json(json)?;
        Ok(self.attach_imported(nodes))
    }

    fn update_markers(&mut self) {
        if !self.options.capabilities.markers {
            return;
        }
        let Some(active) = self.active else {
            self.handles.clear_markers();
            return;
        };
        if let Some(node) = self.graph.get(active.id) {
            let transform = node.transform;
            self.handles.update_markers(&transform, &active.aux, &self.camera);
        }
    }

    /// Move the box helper and outlines with the active model and reproject markers
    fn sync_helpers(&mut self) {
        if let Some(active) = self.active {
            if let Some(transform) = self.graph.get(active.id).map(|node| node.transform) {
                if let Some(helper) = self.graph.get_mut(active.box_helper) {
                    helper.transform = transform;
                }
            }
        }
        self.faces.follow_models(&mut self.graph);
        self.update_markers();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::faces::FaceLabel;
    use crate::gfx::gizmos::HandleKind;
    use crate::gfx::math::project_to_screen;
    use std::cell::RefCell;
    use std::rc::Rc;

    const SQUARE: [[f64; 2]; 4] = [[-5.0, -5.0], [5.0, -5.0], [5.0, 5.0], [-5.0, 5.0]];

    struct RecordingRenderer(Rc<RefCell<Vec<&'static str>>>);

    impl Renderer for RecordingRenderer {
        fn render(&mut self, _graph: &dyn SceneGraph, _camera: &OrbitCamera) {
            self.0.borrow_mut().push("render");
        }
    }

    fn building_session() -> (SceneSession, QueuedInput) {
        let (mut session, input) = SceneSession::with_queued_input(SessionOptions::default());
        session.dispatch(InputEvent::Resize { width: 800, height: 600 });
        session
            .add_building(&SQUARE, &FootprintParams { scale: 1.0, height: 5.0 })
            .unwrap();
        (session, input)
    }

    /// Pixel over the top face, away from every marker
    fn top_face_pixel(session: &SceneSession) -> (f64, f64) {
        let p = project_to_screen(Point3::new(-3.0, 5.0, -3.0), session.camera());
        (p.x, p.y)
    }

    #[test]
    fn test_tick_runs_in_fixed_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (mut session, _input) = SceneSession::with_queued_input(SessionOptions::default());

        for (kind, name) in [
            (EventKind::RenderAfter, "after"),
            (EventKind::Animate, "animate"),
            (EventKind::RenderBefore, "before"),
        ] {
            let log = Rc::clone(&log);
            session.on(kind, Rc::new(move |_: &SessionEvent| log.borrow_mut().push(name)), None);
        }

        session.tick(0.016, &mut RecordingRenderer(Rc::clone(&log)));
        assert_eq!(*log.borrow(), vec!["animate", "before", "render", "after"]);
    }

    #[test]
    fn test_environment_nodes_are_not_exported() {
        let (session, _input) = building_session();
        let json = session.export_json().unwrap();
        let nodes = io::import_json(&json).unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].name, "building");
    }

    #[test]
    fn test_building_stands_on_ground() {
        let (session, _input) = building_session();
        let id = session.active_model().unwrap();
        let bounds = session.graph().get(id).unwrap().world_bounds();
        assert!(bounds.min.y.abs() < 1e-6);
        assert!((bounds.max.y - 5.0).abs() < 1e-6);
        assert_eq!(session.handles().markers().len(), HandleKind::ALL.len());
    }

    #[test]
    fn test_click_is_suppressed_after_drag() {
        let (mut session, input) = building_session();
        let clicks = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&clicks);
        session.on(
            EventKind::Click,
            Rc::new(move |_: &SessionEvent| *counter.borrow_mut() += 1),
            None,
        );

        let (x, y) = top_face_pixel(&session);
        input.push(InputEvent::PointerDown(PointerEvent::left(x, y)));
        input.push(InputEvent::PointerMove(PointerEvent::left(x + 40.0, y)));
        input.push(InputEvent::PointerUp(PointerEvent::left(x + 40.0, y)));
        session.tick(0.016, &mut ());
        assert_eq!(*clicks.borrow(), 0);
        assert_eq!(session.faces().clicked(), None);

        input.push(InputEvent::PointerDown(PointerEvent::left(x, y)));
        input.push(InputEvent::PointerUp(PointerEvent::left(x + 2.0, y + 2.0)));
        session.tick(0.016, &mut ());
        assert_eq!(*clicks.borrow(), 1);
        assert_eq!(session.faces().clicked().map(|k| k.label), Some(FaceLabel::Top));
    }

    #[test]
    fn test_hover_event_carries_face() {
        let (mut session, _input) = building_session();
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        session.on(
            EventKind::MouseMove,
            Rc::new(move |event: &SessionEvent| {
                if let SessionEvent::Pointer { face, .. } = event {
                    *sink.borrow_mut() = *face;
                }
            }),
            None,
        );

        let (x, y) = top_face_pixel(&session);
        session.dispatch(InputEvent::PointerMove(PointerEvent::left(x, y)));
        assert_eq!(seen.borrow().map(|k| k.label), Some(FaceLabel::Top));
        assert_eq!(session.faces().hovered().map(|k| k.label), Some(FaceLabel::Top));
    }

    #[test]
    fn test_marker_drag_moves_model_and_helpers() {
        let (mut session, _input) = building_session();
        let marker = *session
            .handles()
            .markers()
            .iter()
            .find(|m| m.kind == HandleKind::TranslateVertical)
            .unwrap();
        let (x, y) = marker.screen;

        session.dispatch(InputEvent::PointerDown(PointerEvent::left(x, y)));
        assert!(session.handles().is_dragging());
        session.dispatch(InputEvent::PointerMove(PointerEvent::left(x, y - 20.0)));
        session.dispatch(InputEvent::PointerUp(PointerEvent::left(x, y - 20.0)));

        let transform = session.active_transform().unwrap();
        assert!((transform.position.y - 1.0).abs() < 1e-9);
        assert!(!session.handles().is_dragging());
        assert_eq!(session.faces().clicked(), None);
    }

    #[test]
    fn test_setters_need_an_active_model() {
        let (mut session, _input) = SceneSession::with_queued_input(SessionOptions::default());
        assert!(matches!(session.set_scale(Axis::X, 2.0), Err(MassingError::NoActiveModel)));

        let (mut session, _input) = building_session();
        session.set_scale(Axis::X, 0.0).unwrap();
        session.set_rotation(Axis::Y, 0.5).unwrap();
        let t = session.active_transform().unwrap();
        assert_eq!(t.scale.x, crate::gfx::scene::MIN_SCALE);
        assert_eq!(t.rotation.y, 0.5);
    }

    #[test]
    fn test_double_click_flies_to_model() {
        let (mut session, _input) = building_session();
        let (x, y) = top_face_pixel(&session);
        session.dispatch(InputEvent::DoubleClick(PointerEvent::left(x, y)));
        assert!(session.is_flying());

        for _ in 0..100 {
            session.tick(0.02, &mut ());
        }
        assert!(!session.is_flying());
        let target = session.camera().target;
        assert!((target.x).abs() < 1e-6 && (target.y - 2.5).abs() < 1e-6 && target.z.abs() < 1e-6);
    }

    #[test]
    fn test_fly_to_future_resolves_after_ticks() {
        let (mut session, _input) = building_session();
        let bounds = session.graph().get(session.active_model().unwrap()).unwrap().world_bounds();
        let mut flight = Box::pin(session.fly_to(&bounds));

        let waker = futures::task::noop_waker();
        let mut cx = std::task::Context::from_waker(&waker);
        assert!(flight.as_mut().poll(&mut cx).is_pending());
        for _ in 0..80 {
            session.tick(0.02, &mut ());
        }
        assert_eq!(flight.as_mut().poll(&mut cx), std::task::Poll::Ready(true));
    }

    #[test]
    fn test_clear_keeps_environment() {
        let (mut session, _input) = building_session();
        session.clear();
        assert_eq!(session.active_model(), None);
        assert!(session.handles().markers().is_empty());
        assert_eq!(session.graph().len(), 3);
    }

    #[test]
    fn test_glb_import_replaces_active_model() {
        let (mut session, _input) = building_session();
        session.set_position(Axis::Y, 2.0).unwrap();
        let bytes = session.export_glb().unwrap();

        let ids = session.import_glb(&bytes).unwrap();
        assert_eq!(ids.len(), 1);
        assert_eq!(session.active_model(), Some(ids[0]));
        // Imports keep their saved placement instead of being lifted.
        assert!((session.active_transform().unwrap().position.y - 2.0).abs() < 1e-9);
        // grid, two lights, model, box helper
        assert_eq!(session.graph().len(), 5);
    }

    #[test]
    fn test_imported_scale_respects_minimum() {
        let (mut session, _input) = building_session();
        let mut document: io::SceneDocument = serde_json::from_str(&session.export_json().unwrap()).unwrap();
        document.nodes[0].transform.scale.y = 0.01;

        session.import_json(&serde_json::to_string(&document).unwrap()).unwrap();
        let scale = session.active_transform().unwrap().scale;
        assert_eq!(scale, Vector3::new(1.0, crate::gfx::scene::MIN_SCALE, 1.0));
    }

    #[test]
    fn test_corrupt_import_leaves_session_usable() {
        let (mut session, input) = building_session();
        let active = session.active_model();
        let mut document: io::SceneDocument = serde_json::from_str(&session.export_json().unwrap()).unwrap();
        let indices = document.nodes[0].meshes[0].geometry.indices.as_mut().unwrap();
        *indices.last_mut().unwrap() = 9999;

        assert!(session.import_json(&serde_json::to_string(&document).unwrap()).is_err());
        assert_eq!(session.active_model(), active);

        // A broken mesh attached behind the importers' back is skipped by picking.
        session.graph_mut().attach(document.nodes[0].clone());
        for step in 0..20 {
            let (x, y) = (step as f64 * 40.0, step as f64 * 30.0);
            input.push(InputEvent::PointerMove(PointerEvent::left(x, y)));
            session.tick(1.0 / 60.0, &mut ());
        }
        assert_eq!(session.active_model(), active);
    }
}
