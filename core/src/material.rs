//! Material

use crate::dispatch::*;
use crate::geometry::*;
use crate::interaction::*;
use crate::spectrum::*;
use std::sync::Arc;

/// Names of the actions a lowered material provides.
pub const MATERIAL_ACTIONS: [&str; 6] = [
    "material.sample_radiance",
    "material.eval_radiance",
    "material.pdf_radiance",
    "material.albedo",
    "material.normal",
    "material.is_delta",
];

/// A sampled scattering direction.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct BSDFSample {
    /// BSDF value for the pair of directions, without the cosine term.
    pub f: Spectrum,

    /// Sampled incident direction (world space, unit length).
    pub wi: Vector3f,

    /// Density of `wi`. For delta lobes this is the discrete lobe
    /// probability.
    pub pdf: Float,

    /// True if `wi` was sampled from a delta lobe.
    pub is_delta: bool,

    /// True if `wi` crosses the surface, so the path changes medium.
    pub transmitted: bool,
}

/// Scattering functions at one surface point. Directions are in world space
/// and point away from the surface.
pub trait Shader {
    /// Samples an incident direction.
    ///
    /// * `wo`     - Outgoing direction.
    /// * `u_lobe` - Sample used to choose a lobe.
    /// * `u`      - Sample used to choose a direction.
    fn sample(&self, wo: &Vector3f, u_lobe: Float, u: &Point2f) -> Option<BSDFSample>;

    /// Evaluates the BSDF, without the cosine term.
    ///
    /// * `wo` - Outgoing direction.
    /// * `wi` - Incident direction.
    fn eval(&self, wo: &Vector3f, wi: &Vector3f) -> Spectrum;

    /// Returns the density `sample` would produce `wi` with.
    ///
    /// * `wo` - Outgoing direction.
    /// * `wi` - Incident direction.
    fn pdf(&self, wo: &Vector3f, wi: &Vector3f) -> Float;

    /// Returns the hemispherical reflectance used for the albedo channel.
    fn albedo(&self) -> Spectrum;

    /// Returns the shading normal used for the normal channel.
    fn normal(&self) -> Normal3f;

    /// Returns true if every lobe is a delta distribution.
    fn is_delta(&self) -> bool;
}

/// A material creates the shader for a surface point.
pub trait Material: Send + Sync + 'static {
    /// The shader type this material creates.
    type Shader: Shader;

    /// Lowered inputs the shader reads, such as texture lookups.
    type Inputs: Send + Sync + 'static;

    /// Lowers the inputs through the context of the kernel being built.
    ///
    /// * `cc` - Context of the kernel being built.
    fn lower_inputs(&self, cc: &mut CompileContext) -> Self::Inputs;

    /// Creates the shader for a surface point.
    ///
    /// * `inputs` - The lowered inputs.
    /// * `sp`     - The surface point.
    fn create_shader(&self, inputs: &Self::Inputs, sp: &SurfacePoint) -> Self::Shader;
}

/// Lowered `Shader::sample`.
pub type SampleRadianceFn =
    dyn Fn(&SurfacePoint, &Vector3f, Float, &Point2f) -> Option<BSDFSample> + Send + Sync;

/// Lowered `Shader::eval`.
pub type EvalRadianceFn = dyn Fn(&SurfacePoint, &Vector3f, &Vector3f) -> Spectrum + Send + Sync;

/// Lowered `Shader::pdf`.
pub type PdfRadianceFn = dyn Fn(&SurfacePoint, &Vector3f, &Vector3f) -> Float + Send + Sync;

/// Lowered per-point queries: `albedo`, `normal` and `is_delta`.
pub type SurfaceFn<T> = dyn Fn(&SurfacePoint) -> T + Send + Sync;

/// A material lowered into one function per action. Cases lowered from the
/// same material share their functions.
pub struct CompiledMaterial {
    /// The material this case was lowered from.
    pub object: ObjectId,

    sample_radiance: Function<SampleRadianceFn>,
    eval_radiance: Function<EvalRadianceFn>,
    pdf_radiance: Function<PdfRadianceFn>,
    albedo: Function<SurfaceFn<Spectrum>>,
    normal: Function<SurfaceFn<Normal3f>>,
    is_delta: Function<SurfaceFn<bool>>,
}

impl CompiledMaterial {
    /// Returns the function index of each action in `MATERIAL_ACTIONS`
    /// order.
    pub fn functions(&self) -> [usize; 6] {
        [
            self.sample_radiance.index(),
            self.eval_radiance.index(),
            self.pdf_radiance.index(),
            self.albedo.index(),
            self.normal.index(),
            self.is_delta.index(),
        ]
    }

    /// Returns true if both cases run the same lowered code.
    ///
    /// * `other` - The other case.
    pub fn shares_code_with(&self, other: &Self) -> bool {
        self.sample_radiance.same_code(&other.sample_radiance)
            && self.eval_radiance.same_code(&other.eval_radiance)
            && self.pdf_radiance.same_code(&other.pdf_radiance)
            && self.albedo.same_code(&other.albedo)
            && self.normal.same_code(&other.normal)
            && self.is_delta.same_code(&other.is_delta)
    }

    /// See `Shader::sample`.
    #[inline]
    pub fn sample_radiance(
        &self,
        sp: &SurfacePoint,
        wo: &Vector3f,
        u_lobe: Float,
        u: &Point2f,
    ) -> Option<BSDFSample> {
        (self.sample_radiance.code())(sp, wo, u_lobe, u)
    }

    /// See `Shader::eval`.
    #[inline]
    pub fn eval_radiance(&self, sp: &SurfacePoint, wo: &Vector3f, wi: &Vector3f) -> Spectrum {
        (self.eval_radiance.code())(sp, wo, wi)
    }

    /// See `Shader::pdf`.
    #[inline]
    pub fn pdf_radiance(&self, sp: &SurfacePoint, wo: &Vector3f, wi: &Vector3f) -> Float {
        (self.pdf_radiance.code())(sp, wo, wi)
    }

    /// See `Shader::albedo`.
    #[inline]
    pub fn albedo(&self, sp: &SurfacePoint) -> Spectrum {
        (self.albedo.code())(sp)
    }

    /// See `Shader::normal`.
    #[inline]
    pub fn normal(&self, sp: &SurfacePoint) -> Normal3f {
        (self.normal.code())(sp)
    }

    /// See `Shader::is_delta`.
    #[inline]
    pub fn is_delta(&self, sp: &SurfacePoint) -> bool {
        (self.is_delta.code())(sp)
    }
}

/// Object safe view of a `Material` that lowers it for a kernel.
pub trait MaterialObject: Send + Sync {
    /// Lowers the material into a switch case.
    ///
    /// * `cc` - Context of the kernel being built.
    fn lower(self: Arc<Self>, cc: &mut CompileContext) -> CompiledMaterial;
}

/// Lowers one action of a material; the inputs are lowered along with it.
fn lower_action<M, F, L>(
    cc: &mut CompileContext,
    material: &Arc<M>,
    action: &'static str,
    lower: L,
) -> Function<F>
where
    M: Material,
    F: ?Sized + Send + Sync + 'static,
    L: FnOnce(Arc<M>, M::Inputs) -> Arc<F>,
{
    cc.lower_object_action(ObjectId::of(material), action, |cc| {
        let inputs = material.lower_inputs(cc);
        lower(Arc::clone(material), inputs)
    })
}

impl<M: Material> MaterialObject for M {
    fn lower(self: Arc<Self>, cc: &mut CompileContext) -> CompiledMaterial {
        let [sample, eval, pdf, albedo, normal, is_delta] = MATERIAL_ACTIONS;
        CompiledMaterial {
            object: ObjectId::of(&self),
            sample_radiance: lower_action(cc, &self, sample, |m, inputs| -> Arc<SampleRadianceFn> {
                Arc::new(
                    move |sp: &SurfacePoint, wo: &Vector3f, u_lobe: Float, u: &Point2f| {
                        m.create_shader(&inputs, sp).sample(wo, u_lobe, u)
                    },
                )
            }),
            eval_radiance: lower_action(cc, &self, eval, |m, inputs| -> Arc<EvalRadianceFn> {
                Arc::new(move |sp: &SurfacePoint, wo: &Vector3f, wi: &Vector3f| {
                    m.create_shader(&inputs, sp).eval(wo, wi)
                })
            }),
            pdf_radiance: lower_action(cc, &self, pdf, |m, inputs| -> Arc<PdfRadianceFn> {
                Arc::new(move |sp: &SurfacePoint, wo: &Vector3f, wi: &Vector3f| {
                    m.create_shader(&inputs, sp).pdf(wo, wi)
                })
            }),
            albedo: lower_action(cc, &self, albedo, |m, inputs| -> Arc<SurfaceFn<Spectrum>> {
                Arc::new(move |sp: &SurfacePoint| m.create_shader(&inputs, sp).albedo())
            }),
            normal: lower_action(cc, &self, normal, |m, inputs| -> Arc<SurfaceFn<Normal3f>> {
                Arc::new(move |sp: &SurfacePoint| m.create_shader(&inputs, sp).normal())
            }),
            is_delta: lower_action(cc, &self, is_delta, |m, inputs| -> Arc<SurfaceFn<bool>> {
                Arc::new(move |sp: &SurfacePoint| m.create_shader(&inputs, sp).is_delta())
            }),
        }
    }
}

/// Atomic reference counted `MaterialObject`.
pub type ArcMaterial = Arc<dyn MaterialObject>;

/// Lowers every material into a switch over material ids.
///
/// * `cc`        - Context of the kernel being built.
/// * `materials` - Materials indexed by id.
pub fn compile_materials(
    cc: &mut CompileContext,
    materials: &[ArcMaterial],
) -> crate::error::Result<Switch<CompiledMaterial>> {
    let mut builder = SwitchBuilder::new("material", materials.len());
    for (id, m) in materials.iter().enumerate() {
        builder.add_case(id as u32, m.clone().lower(cc))?;
    }
    builder.build()
}
