//! Diffuse Area Light

use wavefront_core::geometry::*;
use wavefront_core::interaction::*;
use wavefront_core::light::*;
use wavefront_core::shape::*;
use wavefront_core::spectrum::*;

/// Area light emitting the same radiance in every direction from every point
/// of its shape.
#[derive(Clone)]
pub struct DiffuseAreaLight {
    /// The emitting shape.
    pub shape: ArcShape,

    /// Emitted radiance.
    pub le: Spectrum,

    /// Emit from both sides of the surface, not just the side the geometric
    /// normal points to.
    pub two_sided: bool,

    /// Object to world transformation of the emitting instance.
    pub transform: Transform,
}

impl DiffuseAreaLight {
    /// Create a new `DiffuseAreaLight`.
    ///
    /// * `shape`     - The emitting shape.
    /// * `le`        - Emitted radiance.
    /// * `two_sided` - Emit from both sides.
    pub fn new(shape: ArcShape, le: Spectrum, two_sided: bool) -> Self {
        debug!(
            "Diffuse area light with radiance {:?} over area {}",
            le,
            shape.area()
        );
        Self {
            shape,
            le,
            two_sided,
            transform: Transform::identity(),
        }
    }

    /// Samples the light in the space of an instance placed with
    /// `transform`. It must match the transform of the instance the light is
    /// bound to.
    ///
    /// * `transform` - Object to world transformation.
    pub fn with_transform(self, transform: Transform) -> Self {
        Self { transform, ..self }
    }

    /// Returns the area density of a sampled point in world space.
    fn area_pdf(&self) -> Float {
        let s = self.transform.scale_factor();
        self.shape.pdf() / (s * s)
    }

    /// Returns the radiance leaving a point with geometric normal `n` in
    /// direction `w`.
    fn l(&self, n: &Normal3f, w: &Vector3f) -> Spectrum {
        if self.two_sided || n.dot(w) > 0.0 {
            self.le
        } else {
            Spectrum::zero()
        }
    }
}

impl AreaLight for DiffuseAreaLight {
    fn eval_le(&self, sp: &SurfacePoint, w: &Vector3f) -> Spectrum {
        self.l(&sp.ng, w)
    }

    fn sample_li(&self, reference: &SurfacePoint, u_prim: Float, u: &Point2f) -> Option<LightSample> {
        let mut ss = self.shape.sample(u_prim, u);
        if !self.transform.is_identity() {
            let s = self.transform.scale_factor();
            ss.p = self.transform.transform_point(&ss.p);
            ss.n = self.transform.transform_normal(&ss.n);
            ss.pdf /= s * s;
        }
        let to_light = ss.p - reference.p;
        let dist2 = to_light.length_squared();
        if dist2 == 0.0 || ss.pdf == 0.0 {
            return None;
        }

        let distance = dist2.sqrt();
        let wi = to_light / distance;
        let cos_l = ss.n.abs_dot(&wi);
        if cos_l == 0.0 {
            return None;
        }

        // Convert the area density to solid angle.
        Some(LightSample {
            li: self.l(&ss.n, &-wi),
            wi,
            pdf: ss.pdf * dist2 / cos_l,
            distance,
        })
    }

    fn pdf_li(&self, reference: &Point3f, sp: &SurfacePoint) -> Float {
        let to_light = sp.p - *reference;
        let dist2 = to_light.length_squared();
        if dist2 == 0.0 {
            return 0.0;
        }
        let cos_l = sp.ng.abs_dot(&(to_light / dist2.sqrt()));
        if cos_l == 0.0 {
            0.0
        } else {
            self.area_pdf() * dist2 / cos_l
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;
    use shapes::*;

    fn quad_light(two_sided: bool) -> DiffuseAreaLight {
        // Unit square at z = 1 facing down.
        let quad = TriangleMesh::quad(
            Point3f::new(-0.5, -0.5, 1.0),
            Point3f::new(-0.5, 0.5, 1.0),
            Point3f::new(0.5, 0.5, 1.0),
            Point3f::new(0.5, -0.5, 1.0),
        )
        .unwrap();
        DiffuseAreaLight::new(quad.into_arc(), Spectrum::new(2.0), two_sided)
    }

    fn origin() -> SurfacePoint {
        SurfacePoint {
            n: Normal3f::new(0.0, 0.0, 1.0),
            ng: Normal3f::new(0.0, 0.0, 1.0),
            ..Default::default()
        }
    }

    #[test]
    fn one_sided_light_emits_along_its_normal() {
        let light = quad_light(false);
        let sp = light.shape.surface_point(0, &Point2f::new(0.25, 0.25));
        let le_down = light.eval_le(&sp, &Vector3f::new(0.0, 0.0, -1.0));
        let le_up = light.eval_le(&sp, &Vector3f::new(0.0, 0.0, 1.0));
        assert!(le_down.is_black() != le_up.is_black());
        assert!(!quad_light(true).eval_le(&sp, &Vector3f::new(0.0, 0.0, 1.0)).is_black());
    }

    proptest! {
        #[test]
        fn sample_pdf_matches_pdf_li(u_prim in 0.0..1.0f32, u0 in 0.0..1.0f32, u1 in 0.0..1.0f32) {
            let light = quad_light(true);
            let reference = origin();
            let ls = light.sample_li(&reference, u_prim, &Point2f::new(u0, u1)).unwrap();
            let hit = reference.p + ls.wi * ls.distance;
            let sp = SurfacePoint {
                p: hit,
                ng: Normal3f::new(0.0, 0.0, -1.0),
                n: Normal3f::new(0.0, 0.0, -1.0),
                ..Default::default()
            };
            let pdf = light.pdf_li(&reference.p, &sp);
            prop_assert!(approx_eq!(f32, ls.pdf, pdf, epsilon = 1e-3 * pdf.max(1.0)));
            prop_assert!(approx_eq!(f32, hit.z, 1.0, epsilon = 1e-4));
        }

        #[test]
        fn transformed_samples_lie_on_the_placed_quad(u0 in 0.0..1.0f32, u1 in 0.0..1.0f32) {
            let placed = Transform::translate(&Vector3f::new(0.0, 0.0, 1.0)) * Transform::scale(2.0);
            let light = quad_light(true).with_transform(placed);
            let reference = origin();
            let ls = light.sample_li(&reference, 0.5, &Point2f::new(u0, u1)).unwrap();
            let hit = reference.p + ls.wi * ls.distance;
            prop_assert!(approx_eq!(f32, hit.z, 3.0, epsilon = 1e-3));
            prop_assert!(hit.x.abs() <= 1.0 + 1e-3 && hit.y.abs() <= 1.0 + 1e-3);

            // The placed quad has four times the area.
            let sp = SurfacePoint {
                p: hit,
                ng: Normal3f::new(0.0, 0.0, -1.0),
                ..Default::default()
            };
            let cos_l = ls.wi.z.abs();
            let expected = 0.25 * ls.distance * ls.distance / cos_l;
            let pdf = light.pdf_li(&reference.p, &sp);
            prop_assert!(approx_eq!(f32, pdf, expected, epsilon = 1e-3 * expected.max(1.0)));
            prop_assert!(approx_eq!(f32, ls.pdf, pdf, epsilon = 1e-3 * pdf.max(1.0)));
        }
    }
}
