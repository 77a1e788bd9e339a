//! # Fly-To Animation
//!
//! Frames a bounding box by moving the camera and its orbit target at the same
//! time. Each motion is a tween handed to a [`Tweener`]; the fly-to future
//! completes only after both tweens have reported completion.
//!
//! The session drives a [`FrameTweener`] from its render tick. Tests and hosts
//! with their own animation system can plug in any other [`Tweener`].

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use cgmath::{EuclideanSpace, Point3};
use futures::channel::oneshot;
use futures::FutureExt;
use log::debug;

use super::Camera;
use crate::gfx::geometry::Aabb;

/// Default fly-to duration in seconds
pub const FLY_TO_DURATION: f64 = 1.5;

/// Extra distance on top of the exact fit distance
const FIT_MARGIN: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    /// Quadratic ease-in-out
    Power2InOut,
}

impl Easing {
    /// Map normalized time `t` in `[0, 1]` to animation progress
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::Power2InOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

/// What a tween writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenTarget {
    CameraPosition,
    OrbitTarget,
}

/// Where the camera should end up to frame a box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlyToPlan {
    pub center: Point3<f64>,
    pub camera_position: Point3<f64>,
    pub duration: f64,
    pub easing: Easing,
}

/// Compute the end pose that fits `bounds` into the camera's vertical FOV.
///
/// The camera keeps its current viewing direction and backs off from the box
/// centre. Returns `None` for an empty box.
pub fn plan_fly_to<C: Camera + ?Sized>(bounds: &Aabb, camera: &C) -> Option<FlyToPlan> {
    if bounds.is_empty() {
        return None;
    }

    let center = bounds.center();
    let size = bounds.size();
    let max_dim = size.x.max(size.y).max(size.z);

    let half_fov = camera.fovy().0 / 2.0;
    let distance = max_dim / (2.0 * half_fov.tan());
    let offset = distance * FIT_MARGIN;

    let camera_position = center - camera.look_direction() * offset;

    Some(FlyToPlan {
        center,
        camera_position,
        duration: FLY_TO_DURATION,
        easing: Easing::Power2InOut,
    })
}

/// Resolves when its tween finishes: `true` on completion, `false` if the tween
/// was cancelled.
#[derive(Debug)]
pub struct TweenCompletion(oneshot::Receiver<()>);

impl TweenCompletion {
    pub fn new(receiver: oneshot::Receiver<()>) -> Self {
        Self(receiver)
    }
}

impl Future for TweenCompletion {
    type Output = bool;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<bool> {
        Pin::new(&mut self.0).poll(cx).map(|result| result.is_ok())
    }
}

/// Something that can animate a point from `from` to `to`
pub trait Tweener {
    fn tween(
        &mut self,
        target: TweenTarget,
        from: Point3<f64>,
        to: Point3<f64>,
        duration: f64,
        easing: Easing,
    ) -> TweenCompletion;
}

/// Start both fly-to tweens and return a future that resolves once both are done.
///
/// The output is `true` only when neither tween was cancelled.
pub fn fly_to(
    tweener: &mut dyn Tweener,
    plan: &FlyToPlan,
    from_position: Point3<f64>,
    from_target: Point3<f64>,
) -> impl Future<Output = bool> + 'static {
    let position = tweener.tween(
        TweenTarget::CameraPosition,
        from_position,
        plan.camera_position,
        plan.duration,
        plan.easing,
    );
    let target = tweener.tween(
        TweenTarget::OrbitTarget,
        from_target,
        plan.center,
        plan.duration,
        plan.easing,
    );
    futures::future::join(position, target).map(|(a, b)| a && b)
}

struct ActiveTween {
    target: TweenTarget,
    from: Point3<f64>,
    to: Point3<f64>,
    elapsed: f64,
    duration: f64,
    easing: Easing,
    done: oneshot::Sender<()>,
}

impl ActiveTween {
    fn value(&self) -> Point3<f64> {
        let t = if self.duration > 0.0 {
            self.elapsed / self.duration
        } else {
            1.0
        };
        let k = self.easing.apply(t);
        Point3::from_vec(self.from.to_vec() + (self.to - self.from) * k)
    }
}

/// Tweens advanced by the render tick
#[derive(Default)]
pub struct FrameTweener {
    active: Vec<ActiveTween>,
}

impl FrameTweener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }

    /// Advance every tween by `delta_seconds` and return the values to apply.
    ///
    /// Finished tweens emit their final value and then signal completion.
    pub fn advance(&mut self, delta_seconds: f64) -> Vec<(TweenTarget, Point3<f64>)> {
        let mut updates = Vec::with_capacity(self.active.len());
        let mut still_running = Vec::with_capacity(self.active.len());

        for mut tween in self.active.drain(..) {
            tween.elapsed += delta_seconds.max(0.0);
            updates.push((tween.target, tween.value()));
            if tween.elapsed >= tween.duration {
                // A dropped receiver just means nobody awaits this tween.
                let _ = tween.done.send(());
            } else {
                still_running.push(tween);
            }
        }

        self.active = still_running;
        updates
    }
}

impl Tweener for FrameTweener {
    fn tween(
        &mut self,
        target: TweenTarget,
        from: Point3<f64>,
        to: Point3<f64>,
        duration: f64,
        easing: Easing,
    ) -> TweenCompletion {
        // A new tween on the same target supersedes the running one.
        let before = self.active.len();
        self.active.retain(|t| t.target != target);
        if self.active.len() != before {
            debug!("cancelled running {:?} tween", target);
        }

        let (done, receiver) = oneshot::channel();
        self.active.push(ActiveTween {
            target,
            from,
            to,
            elapsed: 0.0,
            duration: duration.max(0.0),
            easing,
            done,
        });
        TweenCompletion::new(receiver)
    }
}
