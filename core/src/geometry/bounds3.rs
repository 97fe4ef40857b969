//! 3-D Axis Aligned Bounding Boxes.

use super::{gamma, max, min, Axis, Float, Point3f, Ray, Union, Vector3f, INFINITY};

/// 3-D axis aligned bounding box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds3f {
    /// Minimum bounds.
    pub p_min: Point3f,

    /// Maximum bounds.
    pub p_max: Point3f,
}

impl Default for Bounds3f {
    /// Returns an empty box with inverted extents so any union replaces it.
    fn default() -> Self {
        Self::empty()
    }
}

impl Bounds3f {
    /// Creates a new bounding box from 2 points. The minimum and maximum
    /// bounds are used for each coordinate axis.
    ///
    /// * `p1` - First point.
    /// * `p2` - Second point.
    pub fn new(p1: Point3f, p2: Point3f) -> Self {
        Self {
            p_min: p1.min(&p2),
            p_max: p1.max(&p2),
        }
    }

    /// Returns an empty bounding box.
    pub fn empty() -> Self {
        Self {
            p_min: Point3f::new(INFINITY, INFINITY, INFINITY),
            p_max: Point3f::new(-INFINITY, -INFINITY, -INFINITY),
        }
    }

    /// Returns true if the bounding box is empty.
    pub fn is_empty(&self) -> bool {
        self.p_max.x < self.p_min.x || self.p_max.y < self.p_min.y || self.p_max.z < self.p_min.z
    }

    /// Returns the vector along the box diagonal from the minimum point to
    /// the maximum point.
    pub fn diagonal(&self) -> Vector3f {
        if self.is_empty() {
            Vector3f::zero()
        } else {
            self.p_max - self.p_min
        }
    }

    /// Returns the centroid of the box.
    pub fn centroid(&self) -> Point3f {
        0.5 * self.p_min + 0.5 * self.p_max
    }

    /// Returns the surface area of the six faces of the box.
    pub fn surface_area(&self) -> Float {
        let d = self.diagonal();
        2.0 * (d.x * d.y + d.x * d.z + d.y * d.z)
    }

    /// Returns index of which of the axes is longest.
    pub fn maximum_extent(&self) -> Axis {
        self.diagonal().max_dimension()
    }

    /// Returns the continuous position of a point relative to the corners of
    /// the box, where a point at the minimum corner has offset (0, 0, 0) and
    /// a point at the maximum corner has offset (1, 1, 1).
    ///
    /// * `p` - The point.
    pub fn offset(&self, p: &Point3f) -> Vector3f {
        let mut o = *p - self.p_min;
        if self.p_max.x > self.p_min.x {
            o.x /= self.p_max.x - self.p_min.x;
        }
        if self.p_max.y > self.p_min.y {
            o.y /= self.p_max.y - self.p_min.y;
        }
        if self.p_max.z > self.p_min.z {
            o.z /= self.p_max.z - self.p_min.z;
        }
        o
    }

    /// Slab test against a ray segment `[t_min, t_max]` using a precomputed
    /// reciprocal direction.
    ///
    /// * `ray`        - The ray.
    /// * `inv_dir`    - Reciprocal of the ray direction.
    /// * `dir_is_neg` - Whether each direction component is negative.
    pub fn intersect_p_inv(&self, ray: &Ray, inv_dir: &Vector3f, dir_is_neg: [usize; 3]) -> bool {
        let bounds = [self.p_min, self.p_max];
        let err = 1.0 + 2.0 * gamma(3);

        let mut t0 = ray.t_min;
        let mut t1 = ray.t_max;
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            let i = usize::from(axis);
            let t_near = (bounds[dir_is_neg[i]][axis] - ray.o[axis]) * inv_dir[axis];
            let t_far = (bounds[1 - dir_is_neg[i]][axis] - ray.o[axis]) * inv_dir[axis] * err;

            // NaN from 0 * inf compares false and leaves the interval intact.
            t0 = if t_near > t0 { t_near } else { t0 };
            t1 = if t_far < t1 { t_far } else { t1 };
            if t0 > t1 {
                return false;
            }
        }
        true
    }
}

impl Union<Point3f> for Bounds3f {
    fn union(&self, other: &Point3f) -> Self {
        Self {
            p_min: self.p_min.min(other),
            p_max: self.p_max.max(other),
        }
    }
}

impl Union<Bounds3f> for Bounds3f {
    fn union(&self, other: &Bounds3f) -> Self {
        Self {
            p_min: Point3f::new(
                min(self.p_min.x, other.p_min.x),
                min(self.p_min.y, other.p_min.y),
                min(self.p_min.z, other.p_min.z),
            ),
            p_max: Point3f::new(
                max(self.p_max.x, other.p_max.x),
                max(self.p_max.y, other.p_max.y),
                max(self.p_max.z, other.p_max.z),
            ),
        }
    }
}

impl From<Point3f> for Bounds3f {
    fn from(p: Point3f) -> Self {
        Self { p_min: p, p_max: p }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Bounds3f {
        Bounds3f::new(Point3f::new(0.0, 0.0, 0.0), Point3f::new(1.0, 1.0, 1.0))
    }

    fn slab(b: &Bounds3f, ray: &Ray) -> bool {
        let inv_dir = Vector3f::new(1.0 / ray.d.x, 1.0 / ray.d.y, 1.0 / ray.d.z);
        let dir_is_neg = [
            (inv_dir.x < 0.0) as usize,
            (inv_dir.y < 0.0) as usize,
            (inv_dir.z < 0.0) as usize,
        ];
        b.intersect_p_inv(ray, &inv_dir, dir_is_neg)
    }

    #[test]
    fn empty_box_union_point() {
        let b = Bounds3f::empty().union(&Point3f::new(1.0, 2.0, 3.0));
        assert!(!b.is_empty());
        assert_eq!(b.p_min, b.p_max);
        assert!(Bounds3f::empty().is_empty());
        assert_eq!(Bounds3f::empty().diagonal(), Vector3f::zero());
    }

    #[test]
    fn slab_test_hits_and_misses() {
        let b = unit_box();
        let hit = Ray::new(Point3f::new(0.5, 0.5, -1.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(slab(&b, &hit));

        let miss = Ray::new(Point3f::new(2.0, 0.5, -1.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(!slab(&b, &miss));

        let short = Ray::new(Point3f::new(0.5, 0.5, -1.0), Vector3f::new(0.0, 0.0, 1.0))
            .with_t_max(0.5);
        assert!(!slab(&b, &short));
    }

    #[test]
    fn surface_area_of_unit_box() {
        assert_eq!(unit_box().surface_area(), 6.0);
        assert_eq!(unit_box().centroid(), Point3f::new(0.5, 0.5, 0.5));
    }
}
