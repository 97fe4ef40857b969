//! Rays

use super::{Dot, Float, Normal3f, Point3f, Vector3f, INFINITY, RAY_EPSILON};

/// Visibility mask that matches every instance.
pub const RAY_MASK_ALL: u32 = 0xffff_ffff;

/// A Ray
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    /// Origin.
    pub o: Point3f,

    /// Direction.
    pub d: Vector3f,

    /// Minimum extent of the ray.
    pub t_min: Float,

    /// Maximum extent of the ray.
    pub t_max: Float,

    /// Time value.
    pub time: Float,

    /// Visibility mask; an instance is only considered when its mask shares a
    /// bit with this one.
    pub mask: u32,
}

impl Ray {
    /// Returns an unbounded ray at time 0 that sees every instance.
    ///
    /// * `o` - Origin.
    /// * `d` - Direction.
    pub fn new(o: Point3f, d: Vector3f) -> Self {
        Self {
            o,
            d,
            t_min: 0.0,
            t_max: INFINITY,
            time: 0.0,
            mask: RAY_MASK_ALL,
        }
    }

    /// Returns the ray with a new maximum extent.
    ///
    /// * `t_max` - Maximum extent of the ray.
    pub fn with_t_max(self, t_max: Float) -> Self {
        Self { t_max, ..self }
    }

    /// Returns the ray with a new time value.
    ///
    /// * `time` - Time value.
    pub fn with_time(self, time: Float) -> Self {
        Self { time, ..self }
    }

    /// Returns the ray with a new visibility mask.
    ///
    /// * `mask` - Visibility mask.
    pub fn with_mask(self, mask: u32) -> Self {
        Self { mask, ..self }
    }

    /// Returns the position at a given distance along the ray.
    ///
    /// * `t` - The parameter.
    pub fn at(&self, t: Float) -> Point3f {
        self.o + self.d * t
    }
}

/// Offsets a ray origin along the geometric normal towards the side `w`
/// points to, so rays spawned from a surface do not hit it again.
///
/// * `p`  - Point on the surface.
/// * `ng` - Geometric normal.
/// * `w`  - Direction of the spawned ray.
pub fn offset_ray_origin(p: &Point3f, ng: &Normal3f, w: &Vector3f) -> Point3f {
    let scale = RAY_EPSILON * (1.0 + p.abs().max_component());
    if ng.dot(w) < 0.0 {
        *p - *ng * scale
    } else {
        *p + *ng * scale
    }
}
