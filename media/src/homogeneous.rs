//! Homogeneous Medium

use wavefront_core::geometry::*;
use wavefront_core::medium::Medium;
use wavefront_core::rng::RNG;
use wavefront_core::spectrum::*;

/// Implements a homogeneous medium representing a region of space with constant
/// σa and σs values throughout its extent. Only the attenuation is modelled;
/// light scattered into the ray is ignored.
#[derive(Clone, Debug)]
pub struct HomogeneousMedium {
    /// Absorption cross section `σa` is the probability density that light is
    /// absorbed per unit distance traveled in the medium
    pub sigma_a: Spectrum,

    /// Scattering coefficient `σs` is the probability of an out-scattering
    /// event occurring per unit distance
    pub sigma_s: Spectrum,

    /// Total reduction in radiance due to absorption and out-scattering
    /// `σt = σs + σa`.
    sigma_t: Spectrum,
}

impl HomogeneousMedium {
    /// Create a new `HomogeneousMedium`.
    ///
    /// * `sigma_a` - Absorption cross section `σa`.
    /// * `sigma_s` - Scattering coefficient `σs`.
    pub fn new(sigma_a: Spectrum, sigma_s: Spectrum) -> Self {
        if !sigma_s.is_black() {
            info!("Homogeneous medium treats σs = {:?} as absorption", sigma_s);
        }
        Self {
            sigma_a,
            sigma_s,
            sigma_t: sigma_s + sigma_a,
        }
    }

    /// Create an absorbing only `HomogeneousMedium`.
    ///
    /// * `sigma_a` - Absorption cross section `σa`.
    pub fn absorbing(sigma_a: Spectrum) -> Self {
        Self::new(sigma_a, Spectrum::zero())
    }
}

impl Medium for HomogeneousMedium {
    /// Returns the beam transmittance along a segment using the Beer-Lambert
    /// law.
    ///
    /// * `ray` - The ray.
    /// * `t`   - Length of the segment in units of the ray direction.
    /// * `rng` - Unused.
    fn tr(&self, ray: &Ray, t: Float, _rng: &mut RNG) -> Spectrum {
        let distance = min(t * ray.d.length(), Float::MAX);
        (self.sigma_t * -distance).exp()
    }
}
