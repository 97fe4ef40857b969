//! Light

use crate::dispatch::*;
use crate::error::*;
use crate::geometry::*;
use crate::interaction::*;
use crate::spectrum::*;
use std::sync::Arc;

mod light_sampler;

// Re-export
pub use light_sampler::*;

/// Names of the actions a lowered area light provides.
pub const AREA_LIGHT_ACTIONS: [&str; 3] = [
    "area_light.eval_le",
    "area_light.sample_li",
    "area_light.pdf_li",
];

/// Names of the actions a lowered environment light provides.
pub const ENVIR_LIGHT_ACTIONS: [&str; 3] = [
    "envir_light.eval_le",
    "envir_light.sample_li",
    "envir_light.pdf_li",
];

/// Incident illumination sampled from a light.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct LightSample {
    /// Incident radiance.
    pub li: Spectrum,

    /// Unit direction from the reference point towards the light.
    pub wi: Vector3f,

    /// Density of `wi` with respect to solid angle.
    pub pdf: Float,

    /// Distance to the sampled point; infinite for environment lights.
    pub distance: Float,
}

/// Emission bound to a shape instance.
pub trait AreaLight: Send + Sync + 'static {
    /// Returns the radiance leaving a point on the light.
    ///
    /// * `sp` - Point on the light.
    /// * `w`  - Direction the radiance leaves in.
    fn eval_le(&self, sp: &SurfacePoint, w: &Vector3f) -> Spectrum;

    /// Samples a point on the light as seen from a reference point.
    ///
    /// * `reference` - The receiving point.
    /// * `u_prim`    - Sample used to choose a primitive.
    /// * `u`         - Sample used to choose a point.
    fn sample_li(&self, reference: &SurfacePoint, u_prim: Float, u: &Point2f)
        -> Option<LightSample>;

    /// Returns the solid angle density of sampling `sp` from `reference`.
    ///
    /// * `reference` - The receiving point.
    /// * `sp`        - Point on the light.
    fn pdf_li(&self, reference: &Point3f, sp: &SurfacePoint) -> Float;
}

/// Emission arriving from infinitely far away.
pub trait EnvirLight: Send + Sync + 'static {
    /// Returns the radiance arriving from a direction.
    ///
    /// * `w` - Unit direction pointing away from the scene.
    fn eval_le(&self, w: &Vector3f) -> Spectrum;

    /// Samples an incident direction.
    ///
    /// * `u` - The sample.
    fn sample_li(&self, u: &Point2f) -> Option<LightSample>;

    /// Returns the solid angle density of sampling `w`.
    ///
    /// * `w` - Unit direction pointing away from the scene.
    fn pdf_li(&self, w: &Vector3f) -> Float;
}

/// Lowered `AreaLight::eval_le`.
pub type AreaEvalFn = dyn Fn(&SurfacePoint, &Vector3f) -> Spectrum + Send + Sync;

/// Lowered `AreaLight::sample_li`.
pub type AreaSampleFn = dyn Fn(&SurfacePoint, Float, &Point2f) -> Option<LightSample> + Send + Sync;

/// Lowered `AreaLight::pdf_li`.
pub type AreaPdfFn = dyn Fn(&Point3f, &SurfacePoint) -> Float + Send + Sync;

/// An area light lowered into one function per action.
pub struct CompiledAreaLight {
    /// The light this case was lowered from.
    pub object: ObjectId,

    eval_le: Function<AreaEvalFn>,
    sample_li: Function<AreaSampleFn>,
    pdf_li: Function<AreaPdfFn>,
}

impl CompiledAreaLight {
    /// Returns the function index of each action in `AREA_LIGHT_ACTIONS`
    /// order.
    pub fn functions(&self) -> [usize; 3] {
        [self.eval_le.index(), self.sample_li.index(), self.pdf_li.index()]
    }

    /// See `AreaLight::eval_le`.
    #[inline]
    pub fn eval_le(&self, sp: &SurfacePoint, w: &Vector3f) -> Spectrum {
        (self.eval_le.code())(sp, w)
    }

    /// See `AreaLight::sample_li`.
    #[inline]
    pub fn sample_li(
        &self,
        reference: &SurfacePoint,
        u_prim: Float,
        u: &Point2f,
    ) -> Option<LightSample> {
        (self.sample_li.code())(reference, u_prim, u)
    }

    /// See `AreaLight::pdf_li`.
    #[inline]
    pub fn pdf_li(&self, reference: &Point3f, sp: &SurfacePoint) -> Float {
        (self.pdf_li.code())(reference, sp)
    }
}

/// Object safe view of an `AreaLight` that lowers it for a kernel.
pub trait AreaLightObject: Send + Sync {
    /// Lowers the light into a switch case.
    ///
    /// * `cc` - Context of the kernel being built.
    fn lower(self: Arc<Self>, cc: &mut CompileContext) -> CompiledAreaLight;
}

impl<L: AreaLight> AreaLightObject for L {
    fn lower(self: Arc<Self>, cc: &mut CompileContext) -> CompiledAreaLight {
        let object = ObjectId::of(&self);
        let [eval, sample, pdf] = AREA_LIGHT_ACTIONS;
        let (l0, l1, l2) = (self.clone(), self.clone(), self);
        CompiledAreaLight {
            object,
            eval_le: cc.lower_object_action(object, eval, |_| -> Arc<AreaEvalFn> {
                Arc::new(move |sp: &SurfacePoint, w: &Vector3f| l0.eval_le(sp, w))
            }),
            sample_li: cc.lower_object_action(object, sample, |_| -> Arc<AreaSampleFn> {
                Arc::new(move |r: &SurfacePoint, u_prim: Float, u: &Point2f| {
                    l1.sample_li(r, u_prim, u)
                })
            }),
            pdf_li: cc.lower_object_action(object, pdf, |_| -> Arc<AreaPdfFn> {
                Arc::new(move |r: &Point3f, sp: &SurfacePoint| l2.pdf_li(r, sp))
            }),
        }
    }
}

/// Lowered `EnvirLight::eval_le`.
pub type EnvirEvalFn = dyn Fn(&Vector3f) -> Spectrum + Send + Sync;

/// Lowered `EnvirLight::sample_li`.
pub type EnvirSampleFn = dyn Fn(&Point2f) -> Option<LightSample> + Send + Sync;

/// Lowered `EnvirLight::pdf_li`.
pub type EnvirPdfFn = dyn Fn(&Vector3f) -> Float + Send + Sync;

/// An environment light lowered into one function per action.
pub struct CompiledEnvirLight {
    /// The light this case was lowered from.
    pub object: ObjectId,

    eval_le: Function<EnvirEvalFn>,
    sample_li: Function<EnvirSampleFn>,
    pdf_li: Function<EnvirPdfFn>,
}

impl CompiledEnvirLight {
    /// Returns the function index of each action in `ENVIR_LIGHT_ACTIONS`
    /// order.
    pub fn functions(&self) -> [usize; 3] {
        [self.eval_le.index(), self.sample_li.index(), self.pdf_li.index()]
    }

    /// See `EnvirLight::eval_le`.
    #[inline]
    pub fn eval_le(&self, w: &Vector3f) -> Spectrum {
        (self.eval_le.code())(w)
    }

    /// See `EnvirLight::sample_li`.
    #[inline]
    pub fn sample_li(&self, u: &Point2f) -> Option<LightSample> {
        (self.sample_li.code())(u)
    }

    /// See `EnvirLight::pdf_li`.
    #[inline]
    pub fn pdf_li(&self, w: &Vector3f) -> Float {
        (self.pdf_li.code())(w)
    }
}

/// Object safe view of an `EnvirLight` that lowers it for a kernel.
pub trait EnvirLightObject: Send + Sync {
    /// Lowers the light into a switch case.
    ///
    /// * `cc` - Context of the kernel being built.
    fn lower(self: Arc<Self>, cc: &mut CompileContext) -> CompiledEnvirLight;
}

impl<L: EnvirLight> EnvirLightObject for L {
    fn lower(self: Arc<Self>, cc: &mut CompileContext) -> CompiledEnvirLight {
        let object = ObjectId::of(&self);
        let [eval, sample, pdf] = ENVIR_LIGHT_ACTIONS;
        let (l0, l1, l2) = (self.clone(), self.clone(), self);
        CompiledEnvirLight {
            object,
            eval_le: cc.lower_object_action(object, eval, |_| -> Arc<EnvirEvalFn> {
                Arc::new(move |w: &Vector3f| l0.eval_le(w))
            }),
            sample_li: cc.lower_object_action(object, sample, |_| -> Arc<EnvirSampleFn> {
                Arc::new(move |u: &Point2f| l1.sample_li(u))
            }),
            pdf_li: cc.lower_object_action(object, pdf, |_| -> Arc<EnvirPdfFn> {
                Arc::new(move |w: &Vector3f| l2.pdf_li(w))
            }),
        }
    }
}

/// Atomic reference counted `AreaLightObject`.
pub type ArcAreaLight = Arc<dyn AreaLightObject>;

/// Atomic reference counted `EnvirLightObject`.
pub type ArcEnvirLight = Arc<dyn EnvirLightObject>;

/// Lowers every area light into a switch over light ids.
///
/// * `cc`     - Context of the kernel being built.
/// * `lights` - Area lights indexed by id.
pub fn compile_area_lights(
    cc: &mut CompileContext,
    lights: &[ArcAreaLight],
) -> Result<Switch<CompiledAreaLight>> {
    let mut builder = SwitchBuilder::new("area_light", lights.len());
    for (id, l) in lights.iter().enumerate() {
        builder.add_case(id as u32, l.clone().lower(cc))?;
    }
    builder.build()
}

/// Lowers the environment light, if any, into a switch with a single case.
///
/// * `cc`    - Context of the kernel being built.
/// * `light` - The environment light.
pub fn compile_envir_light(
    cc: &mut CompileContext,
    light: Option<&ArcEnvirLight>,
) -> Result<Switch<CompiledEnvirLight>> {
    let mut builder = SwitchBuilder::new("envir_light", light.iter().len());
    if let Some(l) = light {
        builder.add_case(0, l.clone().lower(cc))?;
    }
    builder.build()
}
