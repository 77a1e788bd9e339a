//! # Massing Demo
//!
//! Headless walk through a session: extrude a building (or load an OBJ),
//! drag a handle, hover and click a face, fly the camera to the model and save
//! the exports.
//!
//! ## Usage:
//! ```bash
//! RUST_LOG=debug cargo run --bin massing-demo -- [model.obj] [output-dir]
//! ```

use anyhow::{bail, Context};
use log::info;
use massing::gfx::math::project_to_screen;
use massing::prelude::*;

const FRAME: f64 = 1.0 / 60.0;

/// Prints what the host renderer would receive
struct LogRenderer {
    frames: usize,
}

impl Renderer for LogRenderer {
    fn render(&mut self, graph: &dyn SceneGraph, camera: &OrbitCamera) {
        self.frames += 1;
        if self.frames % 30 == 0 {
            info!(
                "frame {}: {} nodes, eye ({:.1}, {:.1}, {:.1})",
                self.frames,
                graph.node_ids().len(),
                camera.eye.x,
                camera.eye.y,
                camera.eye.z
            );
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let model = args.next();
    let out_dir = args.next().unwrap_or_else(|| "massing-out".to_string());

    let mut options = SessionOptions::default();
    options.capabilities.click_effect = ClickEffect::ApplyTexture {
        uri: "textures/facade.png".to_string(),
    };
    let (mut session, input) = SceneSession::with_queued_input(options);
    let mut renderer = LogRenderer { frames: 0 };

    input.push(InputEvent::Resize { width: 1280, height: 720 });
    session.tick(FRAME, &mut renderer);

    match model {
        Some(path) => {
            if !session.load_obj_file(&path) {
                bail!("could not load {}", path);
            }
        }
        None => {
            session
                .add_building(&SAMPLE_FOOTPRINT, &FootprintParams::default())
                .context("extruding the sample footprint")?;
        }
    }

    // Stretch the model to the right by dragging its right-hand marker.
    let right = session
        .handles()
        .markers()
        .iter()
        .find(|m| m.kind == HandleKind::ScaleRight && m.in_front)
        .map(|m| m.screen);
    if let Some((x, y)) = right {
        input.push(InputEvent::PointerDown(PointerEvent::left(x, y)));
        for step in 1..=10 {
            input.push(InputEvent::PointerMove(PointerEvent::left(x + step as f64 * 8.0, y)));
            session.tick(FRAME, &mut renderer);
        }
        input.push(InputEvent::PointerUp(PointerEvent::left(x + 80.0, y)));
        session.tick(FRAME, &mut renderer);
    }
    if let Some(transform) = session.active_transform() {
        info!(
            "scale after drag: ({:.3}, {:.3}, {:.3})",
            transform.scale.x, transform.scale.y, transform.scale.z
        );
    }

    // Hover and click the roof, off-centre so the top marker is not hit.
    if let Some(node) = session.active_model().and_then(|id| session.graph().get(id)) {
        let bounds = node.world_bounds();
        let center = bounds.center();
        let roof = Point3::new(center.x - bounds.size().x * 0.2, bounds.max.y, center.z);
        let p = project_to_screen(roof, session.camera());
        input.push(InputEvent::PointerMove(PointerEvent::left(p.x, p.y)));
        input.push(InputEvent::PointerDown(PointerEvent::left(p.x, p.y)));
        input.push(InputEvent::PointerUp(PointerEvent::left(p.x, p.y)));
        session.tick(FRAME, &mut renderer);
        info!("clicked face: {:?}", session.faces().clicked().map(|k| k.label));

        let flight = session.fly_to(&bounds);
        while session.is_flying() {
            session.tick(FRAME, &mut renderer);
        }
        let arrived = pollster::block_on(flight);
        info!("fly-to finished: {}", arrived);
    }

    for path in session.save_exports(&out_dir)? {
        println!("wrote {}", path.display());
    }
    Ok(())
}
