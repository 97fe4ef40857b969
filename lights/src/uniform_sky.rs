//! Uniform Sky

use wavefront_core::geometry::*;
use wavefront_core::light::*;
use wavefront_core::sampling::*;
use wavefront_core::spectrum::*;

/// Environment light with the same radiance from every direction.
#[derive(Copy, Clone, Debug)]
pub struct UniformSky {
    /// Radiance.
    pub radiance: Spectrum,
}

impl UniformSky {
    /// Create a new `UniformSky`.
    ///
    /// * `radiance` - Radiance.
    pub fn new(radiance: Spectrum) -> Self {
        Self { radiance }
    }
}

impl EnvirLight for UniformSky {
    fn eval_le(&self, _w: &Vector3f) -> Spectrum {
        self.radiance
    }

    fn sample_li(&self, u: &Point2f) -> Option<LightSample> {
        Some(LightSample {
            li: self.radiance,
            wi: uniform_sample_sphere(u),
            pdf: uniform_sphere_pdf(),
            distance: INFINITY,
        })
    }

    fn pdf_li(&self, _w: &Vector3f) -> Float {
        uniform_sphere_pdf()
    }
}
