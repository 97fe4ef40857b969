//! Orthonormal frames

use super::{Dot, Float, Normal3f, Vector3f};

/// An orthonormal basis used to move directions between world space and
/// the local shading space whose z-axis is the shading normal.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Frame {
    /// First tangent.
    pub s: Vector3f,

    /// Second tangent.
    pub t: Vector3f,

    /// Normal.
    pub n: Normal3f,
}

impl Frame {
    /// Builds a frame around a unit normal.
    ///
    /// * `n` - Unit normal.
    pub fn from_normal(n: &Normal3f) -> Self {
        let (s, t) = coordinate_system(n);
        Self { s, t, n: *n }
    }

    /// Transforms a world space direction into the local frame.
    ///
    /// * `v` - World space direction.
    pub fn to_local(&self, v: &Vector3f) -> Vector3f {
        Vector3f::new(v.dot(&self.s), v.dot(&self.t), v.dot(&self.n))
    }

    /// Transforms a local direction back into world space.
    ///
    /// * `v` - Local direction.
    pub fn to_world(&self, v: &Vector3f) -> Vector3f {
        self.s * v.x + self.t * v.y + self.n * v.z
    }
}

/// Construct a local coordinate system given a unit vector.
///
/// * `v1` - The unit vector.
pub fn coordinate_system(v1: &Vector3f) -> (Vector3f, Vector3f) {
    let sign: Float = if v1.z >= 0.0 { 1.0 } else { -1.0 };
    let a = -1.0 / (sign + v1.z);
    let b = v1.x * v1.y * a;
    let v2 = Vector3f::new(1.0 + sign * v1.x * v1.x * a, sign * b, -sign * v1.x);
    let v3 = Vector3f::new(b, sign + v1.y * v1.y * a, -v1.y);
    (v2, v3)
}
