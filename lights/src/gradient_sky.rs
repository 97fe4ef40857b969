//! Gradient Sky

use wavefront_core::geometry::*;
use wavefront_core::light::*;
use wavefront_core::sampling::*;
use wavefront_core::spectrum::*;

/// Environment light that blends from `lower` straight down to `upper`
/// straight up.
#[derive(Clone, Debug)]
pub struct GradientSky {
    /// Radiance arriving from the `-up` direction.
    pub lower: Spectrum,

    /// Radiance arriving from the `up` direction.
    pub upper: Spectrum,

    /// Unit up direction.
    pub up: Vector3f,

    /// Frame whose normal is `up`.
    frame: Frame,
}

impl Default for GradientSky {
    fn default() -> Self {
        Self::new(Spectrum::zero(), Spectrum::one(), Vector3f::new(0.0, 0.0, 1.0))
    }
}

impl GradientSky {
    /// Create a new `GradientSky`.
    ///
    /// * `lower` - Radiance arriving from below.
    /// * `upper` - Radiance arriving from above.
    /// * `up`    - Up direction.
    pub fn new(lower: Spectrum, upper: Spectrum, up: Vector3f) -> Self {
        let up = up.normalize();
        Self {
            lower,
            upper,
            up,
            frame: Frame::from_normal(&up),
        }
    }
}

impl EnvirLight for GradientSky {
    fn eval_le(&self, w: &Vector3f) -> Spectrum {
        let cos_theta = self.up.dot(&w.normalize());
        let s = clamp(0.5 * (cos_theta + 1.0), 0.0, 1.0);
        self.lower * (1.0 - s) + self.upper * s
    }

    fn sample_li(&self, u: &Point2f) -> Option<LightSample> {
        let wi = self.frame.to_world(&uniform_sample_sphere(u));
        Some(LightSample {
            li: self.eval_le(&wi),
            wi,
            pdf: uniform_sphere_pdf(),
            distance: INFINITY,
        })
    }

    fn pdf_li(&self, _w: &Vector3f) -> Float {
        uniform_sphere_pdf()
    }
}
