//! # Handle Kinds and Anchors
//!
//! The ten draggable handles, the six named points of the model's local
//! bounding box, and the frozen world positions of those points captured when a
//! drag begins.

use cgmath::{EuclideanSpace, Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::gfx::geometry::Aabb;
use crate::gfx::math::apply_transform;
use crate::gfx::scene::TransformState;

/// A draggable handle and the transform it edits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HandleKind {
    /// Stretch along X, right edge stays put
    ScaleLeft,
    /// Stretch along X, left edge stays put
    ScaleRight,
    /// Stretch along Z, back edge stays put
    ScaleFront,
    /// Stretch along Z, front edge stays put
    ScaleBack,
    /// Stretch along Y, bottom stays on its plane
    ScaleTop,
    RotateX,
    RotateY,
    RotateZ,
    /// Slide over the ground plane
    TranslatePlanar,
    /// Raise or lower
    TranslateVertical,
}

impl HandleKind {
    pub const ALL: [HandleKind; 10] = [
        HandleKind::ScaleLeft,
        HandleKind::ScaleRight,
        HandleKind::ScaleFront,
        HandleKind::ScaleBack,
        HandleKind::ScaleTop,
        HandleKind::RotateX,
        HandleKind::RotateY,
        HandleKind::RotateZ,
        HandleKind::TranslatePlanar,
        HandleKind::TranslateVertical,
    ];

    pub fn all() -> &'static [HandleKind] {
        &Self::ALL
    }

    /// The anchor held fixed while this handle is dragged, if any
    pub fn pinned_anchor(self) -> Option<AnchorName> {
        match self {
            HandleKind::ScaleLeft => Some(AnchorName::RightEdge),
            HandleKind::ScaleRight => Some(AnchorName::LeftEdge),
            HandleKind::ScaleFront => Some(AnchorName::BackEdge),
            HandleKind::ScaleBack => Some(AnchorName::FrontEdge),
            HandleKind::ScaleTop => Some(AnchorName::BottomCenter),
            _ => None,
        }
    }

    pub fn is_scale(self) -> bool {
        self.pinned_anchor().is_some()
    }
}

/// Named points on the local bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnchorName {
    LeftEdge,
    RightEdge,
    FrontEdge,
    BackEdge,
    TopCenter,
    BottomCenter,
}

impl AnchorName {
    pub const ALL: [AnchorName; 6] = [
        AnchorName::LeftEdge,
        AnchorName::RightEdge,
        AnchorName::FrontEdge,
        AnchorName::BackEdge,
        AnchorName::TopCenter,
        AnchorName::BottomCenter,
    ];

    fn index(self) -> usize {
        match self {
            AnchorName::LeftEdge => 0,
            AnchorName::RightEdge => 1,
            AnchorName::FrontEdge => 2,
            AnchorName::BackEdge => 3,
            AnchorName::TopCenter => 4,
            AnchorName::BottomCenter => 5,
        }
    }

    /// Position of the anchor in the model's untransformed space.
    ///
    /// Edge anchors sit on the bottom plane of the box.
    pub fn local_point(self, bounds: &Aabb) -> Point3<f64> {
        let c = bounds.center();
        let (min, max) = (bounds.min, bounds.max);
        match self {
            AnchorName::LeftEdge => Point3::new(min.x, min.y, c.z),
            AnchorName::RightEdge => Point3::new(max.x, min.y, c.z),
            AnchorName::FrontEdge => Point3::new(c.x, min.y, min.z),
            AnchorName::BackEdge => Point3::new(c.x, min.y, max.z),
            AnchorName::TopCenter => Point3::new(c.x, max.y, c.z),
            AnchorName::BottomCenter => Point3::new(c.x, min.y, c.z),
        }
    }
}

/// World positions of every [`AnchorName`], frozen at drag start
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedAnchorSet {
    points: [Point3<f64>; 6],
}

impl FixedAnchorSet {
    /// Apply the baseline transform to each anchor of `bounds`
    pub fn capture(bounds: &Aabb, baseline: &TransformState) -> Self {
        let points = AnchorName::ALL.map(|name| baseline.apply(name.local_point(bounds)));
        Self { points }
    }

    pub fn get(&self, name: AnchorName) -> Point3<f64> {
        self.points[name.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (AnchorName, Point3<f64>)> + '_ {
        AnchorName::ALL.iter().map(move |name| (*name, self.get(*name)))
    }
}

/// Move `transform` so that `local` lands exactly on `frozen_world`.
///
/// Scale and rotation are kept; only the position is solved.
pub fn pin_anchor(transform: &mut TransformState, local: Point3<f64>, frozen_world: Point3<f64>) {
    let offset = apply_transform(local, transform.scale, transform.rotation, Vector3::new(0.0, 0.0, 0.0));
    transform.position = frozen_world.to_vec() - offset.to_vec();
}

/// Sensitivities and marker layout of the handles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleSettings {
    /// Scale change per pixel
    pub scale_factor: f64,
    /// Radians per pixel for [`HandleKind::RotateX`]
    pub rotation_x_sensitivity: f64,
    /// Radians per pixel for [`HandleKind::RotateY`] and [`HandleKind::RotateZ`]
    pub rotation_sensitivity: f64,
    /// World units per pixel for [`HandleKind::TranslateVertical`]
    pub move_speed: f64,
    pub base_offset: f64,
    pub distance_factor: f64,
    /// Hit radius of a marker in pixels
    pub marker_radius: f64,
}

impl Default for HandleSettings {
    fn default() -> Self {
        Self {
            scale_factor: 0.003,
            rotation_x_sensitivity: 0.01,
            rotation_sensitivity: 0.01,
            move_speed: 0.05,
            base_offset: 0.02,
            distance_factor: 0.05,
            marker_radius: 6.0,
        }
    }
}
