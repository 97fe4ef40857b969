//! Spheres

use std::sync::Arc;
use wavefront_core::geometry::*;
use wavefront_core::interaction::*;
use wavefront_core::sampling::*;
use wavefront_core::shape::*;

/// A full sphere. It is a single primitive whose parametric coordinates are
/// the normalized spherical angles `(φ / 2π, θ / π)`.
#[derive(Clone, Debug)]
pub struct Sphere {
    /// Center.
    pub center: Point3f,

    /// Radius.
    pub radius: Float,
}

impl Sphere {
    /// Create a new `Sphere`.
    ///
    /// * `center` - Center.
    /// * `radius` - Radius.
    pub fn new(center: Point3f, radius: Float) -> Self {
        debug!("Sphere at {:?} with radius {}", center, radius);
        Self { center, radius }
    }

    /// Returns the sphere as a shared `Shape`.
    pub fn into_arc(self) -> ArcShape {
        Arc::new(self)
    }

    /// Returns the point at given spherical angles.
    ///
    /// * `theta` - Polar angle.
    /// * `phi`   - Azimuthal angle.
    fn point_at(&self, theta: Float, phi: Float) -> (Point3f, Normal3f) {
        let n = Normal3f::new(
            theta.sin() * phi.cos(),
            theta.sin() * phi.sin(),
            theta.cos(),
        );
        (self.center + n * self.radius, n)
    }
}

impl Shape for Sphere {
    fn prim_count(&self) -> usize {
        1
    }

    fn prim_bounds(&self, _prim: u32) -> Bounds3f {
        let r = Vector3f::new(self.radius, self.radius, self.radius);
        Bounds3f::new(self.center - r, self.center + r)
    }

    fn intersect_prim(&self, _prim: u32, ray: &Ray) -> Option<(Float, Point2f)> {
        let oc = ray.o - self.center;
        let a = ray.d.length_squared();
        let b = 2.0 * ray.d.dot(&oc);
        let c = oc.length_squared() - self.radius * self.radius;
        let (t0, t1) = quadratic(a, b, c)?;

        let t = if t0 > ray.t_min && t0 < ray.t_max {
            t0
        } else if t1 > ray.t_min && t1 < ray.t_max {
            t1
        } else {
            return None;
        };

        let n = (ray.at(t) - self.center) / self.radius;
        let mut phi = n.y.atan2(n.x);
        if phi < 0.0 {
            phi += TWO_PI;
        }
        let theta = clamp(n.z, -1.0, 1.0).acos();
        Some((t, Point2f::new(phi / TWO_PI, theta / PI)))
    }

    fn surface_point(&self, _prim: u32, uv: &Point2f) -> SurfacePoint {
        let (p, n) = self.point_at(uv.y * PI, uv.x * TWO_PI);
        SurfacePoint {
            p,
            ng: n,
            n,
            uv: *uv,
            ..Default::default()
        }
    }

    fn area(&self) -> Float {
        FOUR_PI * self.radius * self.radius
    }

    fn sample(&self, _u_prim: Float, u: &Point2f) -> ShapeSample {
        let n = uniform_sample_sphere(u);
        ShapeSample {
            p: self.center + n * self.radius,
            n,
            pdf: 1.0 / self.area(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    fn unit() -> Sphere {
        Sphere::new(Point3f::zero(), 1.0)
    }

    #[test]
    fn ray_from_outside_hits_near_side() {
        let ray = Ray::new(Point3f::new(0.0, 0.0, -5.0), Vector3f::new(0.0, 0.0, 1.0));
        let (t, _) = unit().intersect_prim(0, &ray).unwrap();
        assert!(approx_eq!(f32, t, 4.0, epsilon = 1e-5));
    }

    #[test]
    fn ray_from_inside_hits_far_side() {
        let ray = Ray::new(Point3f::zero(), Vector3f::new(1.0, 0.0, 0.0));
        let (t, _) = unit().intersect_prim(0, &ray).unwrap();
        assert!(approx_eq!(f32, t, 1.0, epsilon = 1e-5));
    }

    #[test]
    fn t_max_limits_hits() {
        let ray = Ray::new(Point3f::new(0.0, 0.0, -5.0), Vector3f::new(0.0, 0.0, 1.0))
            .with_t_max(3.0);
        assert!(unit().intersect_prim(0, &ray).is_none());
    }

    proptest! {
        #[test]
        fn surface_point_matches_hit(x in -0.9f32..0.9, y in -0.9f32..0.9) {
            let sphere = Sphere::new(Point3f::new(1.0, 2.0, 3.0), 2.0);
            let o = Point3f::new(1.0 + x, 2.0 + y, -10.0);
            let ray = Ray::new(o, Vector3f::new(0.0, 0.0, 1.0));
            let (t, uv) = sphere.intersect_prim(0, &ray).unwrap();
            let sp = sphere.surface_point(0, &uv);
            prop_assert!((sp.p - ray.at(t)).length() < 1e-3);
            prop_assert!((sp.ng.length() - 1.0).abs() < 1e-4);
        }

        #[test]
        fn samples_lie_on_surface(u in 0.0f32..1.0, v in 0.0f32..1.0) {
            let sphere = Sphere::new(Point3f::new(1.0, 0.0, 0.0), 0.5);
            let s = sphere.sample(0.0, &Point2f::new(u, v));
            prop_assert!(((s.p - sphere.center).length() - 0.5).abs() < 1e-4);
            prop_assert!((s.pdf * sphere.area() - 1.0).abs() < 1e-4);
        }
    }
}
