//! Pinhole Camera

use std::sync::Arc;
use wavefront_core::camera::*;
use wavefront_core::geometry::*;
use wavefront_core::medium::VOID_MEDIUM;

/// Pinhole camera with a vertical field of view.
#[derive(Clone, Debug)]
pub struct PinholeCamera {
    /// Position of the pinhole.
    pub eye: Point3f,

    /// Unit viewing direction.
    forward: Vector3f,

    /// Film right direction scaled to the half width of the image plane at
    /// unit distance.
    right: Vector3f,

    /// Film up direction scaled to the half height of the image plane at
    /// unit distance.
    up: Vector3f,

    /// Medium the camera sits in.
    medium_id: u32,
}

impl PinholeCamera {
    /// Create a new `PinholeCamera`.
    ///
    /// * `eye`    - Position of the pinhole.
    /// * `target` - Point the camera looks at.
    /// * `up`     - Approximate up direction.
    /// * `fov`    - Vertical field of view in degrees.
    /// * `aspect` - Film width divided by film height.
    pub fn new(eye: Point3f, target: Point3f, up: Vector3f, fov: Float, aspect: Float) -> Self {
        let forward = (target - eye).normalize();
        let right = forward.cross(&up).normalize();
        let true_up = right.cross(&forward);

        let half_height = (0.5 * fov.to_radians()).tan();
        let half_width = half_height * aspect;
        debug!(
            "Pinhole camera at {:?} looking at {:?} with fov {} and aspect {}",
            eye, target, fov, aspect
        );

        Self {
            eye,
            forward,
            right: right * half_width,
            up: true_up * half_height,
            medium_id: VOID_MEDIUM,
        }
    }

    /// Places the camera inside a medium.
    ///
    /// * `medium_id` - Id of the medium.
    pub fn with_medium(self, medium_id: u32) -> Self {
        Self { medium_id, ..self }
    }

    /// Returns the camera as a shared `Camera`.
    pub fn into_arc(self) -> ArcCamera {
        Arc::new(self)
    }
}

impl Camera for PinholeCamera {
    fn generate_ray(&self, film_coord: &Point2f, time: Float) -> Ray {
        let x = 2.0 * film_coord.x - 1.0;
        let y = 1.0 - 2.0 * film_coord.y;
        let d = (self.forward + self.right * x + self.up * y).normalize();
        Ray::new(self.eye, d).with_time(time)
    }

    fn medium_id(&self) -> u32 {
        self.medium_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    fn camera() -> PinholeCamera {
        PinholeCamera::new(
            Point3f::new(0.0, 0.0, -5.0),
            Point3f::zero(),
            Vector3f::new(0.0, 1.0, 0.0),
            90.0,
            2.0,
        )
    }

    #[test]
    fn center_of_film_looks_at_target() {
        let ray = camera().generate_ray(&Point2f::new(0.5, 0.5), 0.25);
        assert!(approx_eq!(f32, ray.d.z, 1.0, epsilon = 1e-6));
        assert_eq!(ray.o, Point3f::new(0.0, 0.0, -5.0));
        assert_eq!(ray.time, 0.25);
    }

    #[test]
    fn film_origin_is_top_left() {
        let top = camera().generate_ray(&Point2f::new(0.5, 0.0), 0.0);
        assert!(top.d.y > 0.0);

        // 90 degree vertical fov: the top edge is at 45 degrees.
        assert!(approx_eq!(f32, top.d.y, top.d.z, epsilon = 1e-5));

        let left = camera().generate_ray(&Point2f::new(0.0, 0.5), 0.0);
        let right = camera().generate_ray(&Point2f::new(1.0, 0.5), 0.0);
        assert!(left.d.x * right.d.x < 0.0);
    }

    #[test]
    fn aspect_widens_horizontal_extent() {
        let right = camera().generate_ray(&Point2f::new(1.0, 0.5), 0.0);
        assert!(approx_eq!(f32, right.d.x.abs() / right.d.z, 2.0, epsilon = 1e-5));
    }

    #[test]
    fn medium_defaults_to_void() {
        assert_eq!(camera().medium_id(), VOID_MEDIUM);
        assert_eq!(camera().with_medium(3).medium_id(), 3);
    }

    proptest! {
        #[test]
        fn rays_are_normalized(u in 0.0..1.0f32, v in 0.0..1.0f32) {
            let ray = camera().generate_ray(&Point2f::new(u, v), 0.0);
            prop_assert!((ray.d.length() - 1.0).abs() < 1e-5);
            prop_assert!(ray.d.z > 0.0);
        }
    }
}
