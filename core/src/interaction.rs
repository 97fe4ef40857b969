//! Interaction

use crate::geometry::*;

/// Geometric and shading data of a point on a surface.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SurfacePoint {
    /// Position.
    pub p: Point3f,

    /// Geometric normal, pointing to the outside of the shape.
    pub ng: Normal3f,

    /// Shading normal.
    pub n: Normal3f,

    /// Surface parameterization.
    pub uv: Point2f,

    /// Instance that was hit.
    pub instance_id: u32,

    /// Primitive that was hit.
    pub prim_id: u32,

    /// Time of the hit.
    pub time: Float,
}

impl SurfacePoint {
    /// Returns true if `w` leaves the surface on the outside.
    ///
    /// * `w` - Direction pointing away from the surface.
    pub fn is_outside(&self, w: &Vector3f) -> bool {
        self.ng.dot(w) > 0.0
    }

    /// Spawns a ray leaving the surface in direction `d`.
    ///
    /// * `d` - Direction.
    pub fn spawn_ray(&self, d: &Vector3f) -> Ray {
        Ray::new(offset_ray_origin(&self.p, &self.ng, d), *d).with_time(self.time)
    }
}
