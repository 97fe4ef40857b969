//! Glass Material

use crate::common::*;
use wavefront_core::dispatch::CompileContext;
use wavefront_core::geometry::*;
use wavefront_core::interaction::*;
use wavefront_core::material::*;
use wavefront_core::spectrum::*;

/// Smooth dielectric that reflects and refracts according to the Fresnel
/// equations. Refracted paths cross into the medium on the other side.
#[derive(Clone, Debug)]
pub struct Glass {
    /// Tint applied to both lobes.
    pub color: Spectrum,

    /// Index of refraction of the inside relative to the outside.
    pub eta: Float,
}

impl Glass {
    /// Create a new `Glass` material.
    ///
    /// * `color` - Tint applied to both lobes.
    /// * `eta`   - Index of refraction.
    pub fn new(color: Spectrum, eta: Float) -> Self {
        Self { color, eta }
    }
}

/// Fresnel-weighted specular reflection and transmission at one surface
/// point.
pub struct GlassShader {
    color: Spectrum,
    eta: Float,
    frame: Frame,
}

impl Shader for GlassShader {
    fn sample(&self, wo: &Vector3f, u_lobe: Float, _u: &Point2f) -> Option<BSDFSample> {
        let wo_l = self.frame.to_local(wo);
        let cos_o = cos_theta(&wo_l);
        if cos_o == 0.0 {
            return None;
        }

        let fr = fr_dielectric(cos_o, 1.0, self.eta);
        if u_lobe < fr {
            let wi_l = reflect_local(&wo_l);
            return Some(BSDFSample {
                f: self.color * (fr / abs_cos_theta(&wi_l)),
                wi: self.frame.to_world(&wi_l),
                pdf: fr,
                is_delta: true,
                transmitted: false,
            });
        }

        // Figure out which eta is incident and which is transmitted.
        let entering = cos_o > 0.0;
        let (eta_i, eta_t) = if entering { (1.0, self.eta) } else { (self.eta, 1.0) };
        let n = Normal3f::new(0.0, 0.0, 1.0).face_forward(&wo_l);
        let wi_l = refract(&wo_l, &n, eta_i / eta_t)?;

        // Radiance is compressed when entering the denser medium.
        let ft = self.color * (1.0 - fr) * (eta_i * eta_i) / (eta_t * eta_t);
        Some(BSDFSample {
            f: ft / abs_cos_theta(&wi_l),
            wi: self.frame.to_world(&wi_l),
            pdf: 1.0 - fr,
            is_delta: true,
            transmitted: true,
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

impl Material for Glass {
    type Shader = GlassShader;
    type Inputs = ();

    fn lower_inputs(&self, _cc: &mut CompileContext) {}

    fn create_shader(&self, _inputs: &(), sp: &SurfacePoint) -> GlassShader {
        GlassShader {
            color: self.color,
            eta: self.eta,
            frame: Frame::from_normal(&sp.n),
        }
    }
}
