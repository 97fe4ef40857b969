//! Transformations

use super::{Bounds3f, Float, Normal3f, Point3f, Ray, Union, Vector3f};
use std::ops::Mul;

/// A 4x4 row-major matrix.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Matrix4x4 {
    /// The matrix elements.
    pub m: [[Float; 4]; 4],
}

/// The identity matrix.
#[rustfmt::skip]
pub const IDENTITY_MATRIX: Matrix4x4 = Matrix4x4 {
    m: [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ],
};

impl Default for Matrix4x4 {
    fn default() -> Self {
        IDENTITY_MATRIX
    }
}

impl Matrix4x4 {
    /// Returns the transpose of the matrix.
    pub fn transpose(&self) -> Self {
        let mut t = Self::default();
        for (i, row) in t.m.iter_mut().enumerate() {
            for (j, v) in row.iter_mut().enumerate() {
                *v = self.m[j][i];
            }
        }
        t
    }
}

impl Mul for Matrix4x4 {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        let mut r = Self { m: [[0.0; 4]; 4] };
        for i in 0..4 {
            for j in 0..4 {
                r.m[i][j] = (0..4).map(|k| self.m[i][k] * other.m[k][j]).sum();
            }
        }
        r
    }
}

/// A similarity transformation: uniform scale, then rotation, then
/// translation, in any composition. Distances scale by `scale` and areas by
/// its square, so densities over shape area stay easy to map.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    /// The transformation matrix.
    pub m: Matrix4x4,

    /// The inverse transformation matrix.
    pub m_inv: Matrix4x4,

    /// The uniform scale factor.
    scale: Float,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// Returns the identity transformation.
    pub fn identity() -> Self {
        Self {
            m: IDENTITY_MATRIX,
            m_inv: IDENTITY_MATRIX,
            scale: 1.0,
        }
    }

    /// Create a transformation representing a translation.
    ///
    /// * `delta` - Translation.
    #[rustfmt::skip]
    pub fn translate(delta: &Vector3f) -> Self {
        Self {
            m: Matrix4x4 {
                m: [
                    [1.0, 0.0, 0.0, delta.x],
                    [0.0, 1.0, 0.0, delta.y],
                    [0.0, 0.0, 1.0, delta.z],
                    [0.0, 0.0, 0.0, 1.0],
                ],
            },
            m_inv: Matrix4x4 {
                m: [
                    [1.0, 0.0, 0.0, -delta.x],
                    [0.0, 1.0, 0.0, -delta.y],
                    [0.0, 0.0, 1.0, -delta.z],
                    [0.0, 0.0, 0.0, 1.0],
                ],
            },
            scale: 1.0,
        }
    }

    /// Create a transformation representing a uniform scale. Non-positive or
    /// non-finite factors are replaced by 1.
    ///
    /// * `s` - Scaling factor.
    #[rustfmt::skip]
    pub fn scale(s: Float) -> Self {
        let s = if s > 0.0 && s.is_finite() {
            s
        } else {
            warn!("Ignoring invalid scale factor {}", s);
            1.0
        };
        let inv = 1.0 / s;
        Self {
            m: Matrix4x4 {
                m: [
                    [s,   0.0, 0.0, 0.0],
                    [0.0, s,   0.0, 0.0],
                    [0.0, 0.0, s,   0.0],
                    [0.0, 0.0, 0.0, 1.0],
                ],
            },
            m_inv: Matrix4x4 {
                m: [
                    [inv, 0.0, 0.0, 0.0],
                    [0.0, inv, 0.0, 0.0],
                    [0.0, 0.0, inv, 0.0],
                    [0.0, 0.0, 0.0, 1.0],
                ],
            },
            scale: s,
        }
    }

    /// Create a transformation representing rotation about an axis.
    ///
    /// * `theta` - Angle in degrees.
    /// * `axis`  - Rotation axis; need not be normalized.
    pub fn rotate(theta: Float, axis: &Vector3f) -> Self {
        let a = axis.normalize();
        let r = theta.to_radians();
        let sin_theta = r.sin();
        let cos_theta = r.cos();
        let mut m = IDENTITY_MATRIX;

        // Compute rotation of first basis vector
        m.m[0][0] = a.x * a.x + (1.0 - a.x * a.x) * cos_theta;
        m.m[0][1] = a.x * a.y * (1.0 - cos_theta) - a.z * sin_theta;
        m.m[0][2] = a.x * a.z * (1.0 - cos_theta) + a.y * sin_theta;

        // Compute rotations of second and third basis vectors
        m.m[1][0] = a.x * a.y * (1.0 - cos_theta) + a.z * sin_theta;
        m.m[1][1] = a.y * a.y + (1.0 - a.y * a.y) * cos_theta;
        m.m[1][2] = a.y * a.z * (1.0 - cos_theta) - a.x * sin_theta;

        m.m[2][0] = a.x * a.z * (1.0 - cos_theta) - a.y * sin_theta;
        m.m[2][1] = a.y * a.z * (1.0 - cos_theta) + a.x * sin_theta;
        m.m[2][2] = a.z * a.z + (1.0 - a.z * a.z) * cos_theta;

        Self {
            m,
            m_inv: m.transpose(),
            scale: 1.0,
        }
    }

    /// Returns the inverse transformation.
    pub fn inverse(&self) -> Self {
        Self {
            m: self.m_inv,
            m_inv: self.m,
            scale: 1.0 / self.scale,
        }
    }

    /// Returns true if this is the identity transformation.
    pub fn is_identity(&self) -> bool {
        self.m == IDENTITY_MATRIX
    }

    /// Returns the factor distances are scaled by.
    pub fn scale_factor(&self) -> Float {
        self.scale
    }

    /// Applies the transformation to a point.
    ///
    /// * `p` - The point.
    pub fn transform_point(&self, p: &Point3f) -> Point3f {
        let m = &self.m.m;
        Point3f::new(
            m[0][0] * p.x + m[0][1] * p.y + m[0][2] * p.z + m[0][3],
            m[1][0] * p.x + m[1][1] * p.y + m[1][2] * p.z + m[1][3],
            m[2][0] * p.x + m[2][1] * p.y + m[2][2] * p.z + m[2][3],
        )
    }

    /// Applies the transformation to a vector.
    ///
    /// * `v` - The vector.
    pub fn transform_vector(&self, v: &Vector3f) -> Vector3f {
        let m = &self.m.m;
        Vector3f::new(
            m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
            m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
            m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
        )
    }

    /// Applies the transformation to a normal using the inverse transpose
    /// and renormalizes it.
    ///
    /// * `n` - The normal.
    pub fn transform_normal(&self, n: &Normal3f) -> Normal3f {
        let mi = &self.m_inv.m;
        Normal3f::new(
            mi[0][0] * n.x + mi[1][0] * n.y + mi[2][0] * n.z,
            mi[0][1] * n.x + mi[1][1] * n.y + mi[2][1] * n.z,
            mi[0][2] * n.x + mi[1][2] * n.y + mi[2][2] * n.z,
        )
        .normalize()
    }

    /// Applies the transformation to a ray. The direction is not
    /// renormalized so hit distances keep their meaning in both spaces.
    ///
    /// * `r` - The ray.
    pub fn transform_ray(&self, r: &Ray) -> Ray {
        Ray {
            o: self.transform_point(&r.o),
            d: self.transform_vector(&r.d),
            ..*r
        }
    }

    /// Returns the bounds of the transformed box.
    ///
    /// * `b` - The bounding box.
    pub fn transform_bounds(&self, b: &Bounds3f) -> Bounds3f {
        if b.is_empty() {
            return *b;
        }
        (0..8).fold(Bounds3f::empty(), |acc, i| {
            let corner = Point3f::new(
                if i & 1 == 0 { b.p_min.x } else { b.p_max.x },
                if i & 2 == 0 { b.p_min.y } else { b.p_max.y },
                if i & 4 == 0 { b.p_min.z } else { b.p_max.z },
            );
            acc.union(&self.transform_point(&corner))
        })
    }
}

impl Mul for Transform {
    type Output = Self;

    /// Composes two transformations; `other` is applied first.
    fn mul(self, other: Self) -> Self {
        Self {
            m: self.m * other.m,
            m_inv: other.m_inv * self.m_inv,
            scale: self.scale * other.scale,
        }
    }
}
