//! Diffuse Material

use crate::common::*;
use textures::ConstantTexture;
use wavefront_core::dispatch::*;
use wavefront_core::geometry::*;
use wavefront_core::interaction::*;
use wavefront_core::material::*;
use wavefront_core::sampling::*;
use wavefront_core::spectrum::*;
use wavefront_core::texture::*;

/// Implements purely diffuse (Lambertian) surfaces. Both sides of the
/// surface reflect.
#[derive(Clone)]
pub struct Diffuse {
    /// Spectral diffuse reflection, looked up by surface parameterization.
    pub albedo: ArcTexture,
}

impl Diffuse {
    /// Create a new `Diffuse` material with a uniform albedo.
    ///
    /// * `albedo` - Spectral diffuse reflection.
    pub fn new(albedo: Spectrum) -> Self {
        if albedo.max_component_value() > 1.0 {
            warn!("Diffuse albedo {:?} reflects more energy than it receives", albedo);
        }
        Self::from_texture(ConstantTexture::new(albedo).into_arc())
    }

    /// Create a new `Diffuse` material with a textured albedo.
    ///
    /// * `albedo` - Spectral diffuse reflection.
    pub fn from_texture(albedo: ArcTexture) -> Self {
        Self { albedo }
    }
}

/// Lambertian reflection at one surface point.
pub struct DiffuseShader {
    albedo: Spectrum,
    frame: Frame,
}

impl Shader for DiffuseShader {
    fn sample(&self, wo: &Vector3f, _u_lobe: Float, u: &Point2f) -> Option<BSDFSample> {
        let wo_l = self.frame.to_local(wo);
        if cos_theta(&wo_l) == 0.0 {
            return None;
        }

        let mut wi_l = cosine_sample_hemisphere(u);
        if cos_theta(&wo_l) < 0.0 {
            wi_l.z = -wi_l.z;
        }
        let pdf = cosine_hemisphere_pdf(abs_cos_theta(&wi_l));
        if pdf == 0.0 {
            return None;
        }

        Some(BSDFSample {
            f: self.albedo * INV_PI,
            wi: self.frame.to_world(&wi_l),
            pdf,
            is_delta: false,
            transmitted: false,
        })
    }

    fn eval(&self, wo: &Vector3f, wi: &Vector3f) -> Spectrum {
        if same_hemisphere(&self.frame.to_local(wo), &self.frame.to_local(wi)) {
            self.albedo * INV_PI
        } else {
            Spectrum::zero()
        }
    }

    fn pdf(&self, wo: &Vector3f, wi: &Vector3f) -> Float {
        let (wo_l, wi_l) = (self.frame.to_local(wo), self.frame.to_local(wi));
        if same_hemisphere(&wo_l, &wi_l) {
            cosine_hemisphere_pdf(abs_cos_theta(&wi_l))
        } else {
            0.0
        }
    }

    fn albedo(&self) -> Spectrum {
        self.albedo
    }

    fn normal(&self) -> Normal3f {
        self.frame.n
    }

    fn is_delta(&self) -> bool {
        false
    }
}

impl Material for Diffuse {
    type Shader = DiffuseShader;
    type Inputs = Function<SampleSpectrumFn>;

    fn lower_inputs(&self, cc: &mut CompileContext) -> Self::Inputs {
        self.albedo.clone().lower_sample_spectrum(cc)
    }

    fn create_shader(&self, albedo: &Self::Inputs, sp: &SurfacePoint) -> DiffuseShader {
        DiffuseShader {
            albedo: (albedo.code())(&sp.uv),
            frame: Frame::from_normal(&sp.n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;
    use std::sync::Arc;
    use textures::{ImageTexture, ImageWrap};

    fn shader_of(material: &Diffuse, uv: Point2f) -> DiffuseShader {
        let sp = SurfacePoint {
            n: Normal3f::new(0.0, 1.0, 0.0),
            ng: Normal3f::new(0.0, 1.0, 0.0),
            uv,
            ..Default::default()
        };
        let mut cc = CompileContext::new("shade");
        let albedo = material.lower_inputs(&mut cc);
        material.create_shader(&albedo, &sp)
    }

    fn shader() -> DiffuseShader {
        shader_of(&Diffuse::new(Spectrum::new(0.5)), Point2f::new(0.0, 0.0))
    }

    #[test]
    fn albedo_is_looked_up_at_the_surface_uv() {
        let texels = vec![Spectrum::new(0.2), Spectrum::new(0.8)];
        let image = ImageTexture::new(2, 1, texels, ImageWrap::Clamp).unwrap();
        let material = Diffuse::from_texture(image.into_arc());
        assert_eq!(shader_of(&material, Point2f::new(0.25, 0.5)).albedo(), Spectrum::new(0.2));
        assert_eq!(shader_of(&material, Point2f::new(0.75, 0.5)).albedo(), Spectrum::new(0.8));
    }

    #[test]
    fn shared_texture_is_lowered_once() {
        let checker = ConstantTexture::new(Spectrum::new(0.3)).into_arc();
        let materials: Vec<ArcMaterial> = vec![
            Arc::new(Diffuse::from_texture(checker.clone())),
            Arc::new(Diffuse::from_texture(checker)),
        ];
        let mut cc = CompileContext::new("shade");
        let switch = compile_materials(&mut cc, &materials).unwrap();
        assert_eq!(cc.action_count(TEXTURE_ACTIONS[0]), 1);
        assert_eq!(switch.case(1).unwrap().albedo(&SurfacePoint::default()), Spectrum::new(0.3));
    }

    #[test]
    fn reflection_stays_on_the_side_of_wo() {
        let s = shader();
        let above = Vector3f::new(0.0, 1.0, 0.0);
        let below = Vector3f::new(0.0, -1.0, 0.0);
        let u = Point2f::new(0.3, 0.7);
        assert!(s.sample(&above, 0.5, &u).unwrap().wi.y > 0.0);
        assert!(s.sample(&below, 0.5, &u).unwrap().wi.y < 0.0);
        assert!(s.eval(&above, &below).is_black());
        assert_eq!(s.pdf(&above, &below), 0.0);
    }

    proptest! {
        #[test]
        fn sample_matches_eval_and_pdf(u0 in 0.01..0.99f32, u1 in 0.0..1.0f32) {
            let s = shader();
            let wo = Vector3f::new(0.3, 0.8, 0.1).normalize();
            let bs = s.sample(&wo, 0.5, &Point2f::new(u0, u1)).unwrap();
            prop_assert!(!bs.is_delta);
            prop_assert!(approx_eq!(f32, bs.pdf, s.pdf(&wo, &bs.wi), epsilon = 1e-4));
            prop_assert_eq!(bs.f, s.eval(&wo, &bs.wi));
            prop_assert!((bs.wi.length() - 1.0).abs() < 1e-4);
        }
    }
}
