//! Light Sampler

use crate::geometry::*;
use std::sync::Arc;

/// A light chosen by a `LightSampler`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LightSelection {
    /// Index of the light. Area lights occupy `[0, area_light_count)`; the
    /// environment light, if any, comes after them.
    pub index: usize,

    /// Probability of choosing the light.
    pub pdf: Float,
}

/// Chooses a light for next-event estimation.
pub trait LightSampler: Send + Sync {
    /// Selects a light for a reference point.
    ///
    /// * `reference` - The receiving point.
    /// * `time`      - Time of the path.
    /// * `u`         - The sample.
    fn sample(&self, reference: &Point3f, time: Float, u: Float) -> Option<LightSelection>;

    /// Returns the probability of selecting a light.
    ///
    /// * `reference`   - The receiving point.
    /// * `time`        - Time of the path.
    /// * `light_index` - Index of the light.
    fn pdf(&self, reference: &Point3f, time: Float, light_index: usize) -> Float;

    /// Returns the number of lights.
    fn light_count(&self) -> usize;

    /// Returns the index of the environment light.
    fn envir_light_index(&self) -> Option<usize>;
}

/// Atomic reference counted `LightSampler`.
pub type ArcLightSampler = Arc<dyn LightSampler>;

/// Chooses each light with the same probability.
#[derive(Copy, Clone, Debug)]
pub struct UniformLightSampler {
    /// Number of area lights.
    area_light_count: usize,

    /// Whether the scene has an environment light.
    has_envir_light: bool,
}

impl UniformLightSampler {
    /// Create a new `UniformLightSampler`.
    ///
    /// * `area_light_count` - Number of area lights.
    /// * `has_envir_light`  - Whether the scene has an environment light.
    pub fn new(area_light_count: usize, has_envir_light: bool) -> Self {
        Self {
            area_light_count,
            has_envir_light,
        }
    }
}

impl LightSampler for UniformLightSampler {
    fn sample(&self, _reference: &Point3f, _time: Float, u: Float) -> Option<LightSelection> {
        let n = self.light_count();
        if n == 0 {
            return None;
        }
        let index = min((u * n as Float) as usize, n - 1);
        Some(LightSelection {
            index,
            pdf: 1.0 / n as Float,
        })
    }

    fn pdf(&self, _reference: &Point3f, _time: Float, light_index: usize) -> Float {
        let n = self.light_count();
        if light_index < n {
            1.0 / n as Float
        } else {
            0.0
        }
    }

    fn light_count(&self) -> usize {
        self.area_light_count + self.has_envir_light as usize
    }

    fn envir_light_index(&self) -> Option<usize> {
        self.has_envir_light.then_some(self.area_light_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn no_lights_no_selection() {
        let sampler = UniformLightSampler::new(0, false);
        assert!(sampler.sample(&Point3f::zero(), 0.0, 0.5).is_none());
        assert_eq!(sampler.envir_light_index(), None);
    }

    #[test]
    fn envir_light_comes_last() {
        let sampler = UniformLightSampler::new(2, true);
        assert_eq!(sampler.light_count(), 3);
        assert_eq!(sampler.envir_light_index(), Some(2));
        assert_eq!(sampler.pdf(&Point3f::zero(), 0.0, 3), 0.0);
    }

    proptest! {
        #[test]
        fn selection_is_in_range(n in 1usize..16, u in 0.0f32..1.0) {
            let sampler = UniformLightSampler::new(n, false);
            let s = sampler.sample(&Point3f::zero(), 0.0, u).unwrap();
            prop_assert!(s.index < n);
            prop_assert_eq!(s.pdf, sampler.pdf(&Point3f::zero(), 0.0, s.index));
        }
    }
}
