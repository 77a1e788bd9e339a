use cgmath::Point3;
use serde::{Deserialize, Serialize};

use crate::gfx::geometry::Aabb;

/// Anchor points of a model in its own untransformed space.
///
/// Kept next to the model's node id by the session instead of being stored on
/// the node itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelAux {
    pub bounding_box: Aabb,
    pub center_local: Point3<f64>,
    /// Centre of the top face of the bounding box
    pub top_center_local: Point3<f64>,
    /// Centre of the bottom face of the bounding box
    pub bottom_center_local: Point3<f64>,
}

impl ModelAux {
    pub fn from_bounds(bounding_box: Aabb) -> Self {
        let center = bounding_box.center();
        let (min_y, max_y) = if bounding_box.is_empty() {
            (0.0, 0.0)
        } else {
            (bounding_box.min.y, bounding_box.max.y)
        };
        Self {
            bounding_box,
            center_local: center,
            top_center_local: Point3::new(center.x, max_y, center.z),
            bottom_center_local: Point3::new(center.x, min_y, center.z),
        }
    }
}
