//! Mirror Material

use crate::common::*;
use wavefront_core::dispatch::CompileContext;
use wavefront_core::geometry::*;
use wavefront_core::interaction::*;
use wavefront_core::material::*;
use wavefront_core::spectrum::*;

/// Perfectly specular reflector.
#[derive(Clone, Debug)]
pub struct Mirror {
    /// Reflectance.
    pub color: Spectrum,
}

impl Mirror {
    /// Create a new `Mirror` material.
    ///
    /// * `color` - Reflectance.
    pub fn new(color: Spectrum) -> Self {
        Self { color }
    }
}

/// Specular reflection at one surface point.
pub struct MirrorShader {
    color: Spectrum,
    frame: Frame,
}

impl Shader for MirrorShader {
    fn sample(&self, wo: &Vector3f, _u_lobe: Float, _u: &Point2f) -> Option<BSDFSample> {
        let wi_l = reflect_local(&self.frame.to_local(wo));
        let cos = abs_cos_theta(&wi_l);
        if cos == 0.0 {
            return None;
        }
        Some(BSDFSample {
            f: self.color / cos,
            wi: self.frame.to_world(&wi_l),
            pdf: 1.0,
            is_delta: true,
            transmitted: false,
        })
    }

    fn eval(&self, _wo: &Vector3f, _wi: &Vector3f) -> Spectrum {
        Spectrum::zero()
    }

    fn pdf(&self, _wo: &Vector3f, _wi: &Vector3f) -> Float {
        0.0
    }

    fn albedo(&self) -> Spectrum {
        self.color
    }

    fn normal(&self) -> Normal3f {
        self.frame.n
    }

    fn is_delta(&self) -> bool {
        true
    }
}

impl Material for Mirror {
    type Shader = MirrorShader;
    type Inputs = ();

    fn lower_inputs(&self, _cc: &mut CompileContext) {}

    fn create_shader(&self, _inputs: &(), sp: &SurfacePoint) -> MirrorShader {
        MirrorShader {
            color: self.color,
            frame: Frame::from_normal(&sp.n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn reflects_about_the_normal() {
        let sp = SurfacePoint {
            n: Normal3f::new(0.0, 0.0, 1.0),
            ng: Normal3f::new(0.0, 0.0, 1.0),
            ..Default::default()
        };
        let shader = Mirror::new(Spectrum::new(0.8)).create_shader(&(), &sp);
        let wo = Vector3f::new(1.0, 0.0, 1.0).normalize();
        let bs = shader.sample(&wo, 0.3, &Point2f::new(0.1, 0.2)).unwrap();

        assert!(bs.is_delta);
        assert!(approx_eq!(f32, bs.wi.x, -wo.x, epsilon = 1e-6));
        assert!(approx_eq!(f32, bs.wi.z, wo.z, epsilon = 1e-6));
        // f |cos| / pdf recovers the reflectance.
        assert!(approx_eq!(f32, bs.f[0] * bs.wi.z / bs.pdf, 0.8, epsilon = 1e-5));
        assert!(shader.eval(&wo, &bs.wi).is_black());
    }
}
