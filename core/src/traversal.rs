//! Traversal

use crate::geometry::*;
use std::sync::Arc;

/// Closest hit found by a traversal.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TraversalHit {
    /// Distance along the ray.
    pub t: Float,

    /// Parametric coordinates on the primitive.
    pub uv: Point2f,

    /// Instance that was hit.
    pub instance_id: u32,

    /// Primitive within the instance.
    pub prim_id: u32,
}

/// Ray queries against the scene's acceleration structure. Both queries
/// honour the ray's `t_min`, `t_max`, `time` and `mask`.
pub trait Traversal: Send + Sync {
    /// Returns the closest hit.
    ///
    /// * `ray` - The ray.
    fn trace(&self, ray: &Ray) -> Option<TraversalHit>;

    /// Returns true if anything is hit.
    ///
    /// * `ray` - The ray.
    fn occluded(&self, ray: &Ray) -> bool;

    /// Returns the bounds of everything in the structure.
    fn world_bound(&self) -> Bounds3f;
}

/// Atomic reference counted `Traversal`.
pub type ArcTraversal = Arc<dyn Traversal>;
