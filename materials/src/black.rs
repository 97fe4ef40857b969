//! Black Material

use wavefront_core::dispatch::CompileContext;
use wavefront_core::geometry::*;
use wavefront_core::interaction::*;
use wavefront_core::material::*;
use wavefront_core::spectrum::*;

/// Absorbs everything. Paths that hit it end there.
#[derive(Copy, Clone, Debug, Default)]
pub struct Black;

/// Shader of `Black`.
pub struct BlackShader {
    normal: Normal3f,
}

impl Shader for BlackShader {
    fn sample(&self, _wo: &Vector3f, _u_lobe: Float, _u: &Point2f) -> Option<BSDFSample> {
        None
    }

    fn eval(&self, _wo: &Vector3f, _wi: &Vector3f) -> Spectrum {
        Spectrum::zero()
    }

    fn pdf(&self, _wo: &Vector3f, _wi: &Vector3f) -> Float {
        0.0
    }

    fn albedo(&self) -> Spectrum {
        Spectrum::zero()
    }

    fn normal(&self) -> Normal3f {
        self.normal
    }

    fn is_delta(&self) -> bool {
        false
    }
}

impl Material for Black {
    type Shader = BlackShader;
    type Inputs = ();

    fn lower_inputs(&self, _cc: &mut CompileContext) {}

    fn create_shader(&self, _inputs: &(), sp: &SurfacePoint) -> BlackShader {
        BlackShader { normal: sp.n }
    }
}
