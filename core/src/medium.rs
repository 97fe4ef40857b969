//! Medium

use crate::dispatch::*;
use crate::error::*;
use crate::geometry::*;
use crate::rng::RNG;
use crate::spectrum::*;
use std::sync::Arc;

/// Medium id of vacuum. Rays travelling through it are never attenuated and
/// it has no case in the medium switch.
pub const VOID_MEDIUM: u32 = u32::MAX;

/// Names of the actions a lowered medium provides.
pub const MEDIUM_ACTIONS: [&str; 1] = ["medium.tr"];

/// A participating medium.
pub trait Medium: Send + Sync + 'static {
    /// Returns the transmittance along a ray segment.
    ///
    /// * `ray` - The ray; its direction must have unit length.
    /// * `t`   - Length of the segment.
    /// * `rng` - Random numbers for stochastic estimators.
    fn tr(&self, ray: &Ray, t: Float, rng: &mut RNG) -> Spectrum;
}

/// Lowered `Medium::tr`.
pub type TrFn = dyn Fn(&Ray, Float, &mut RNG) -> Spectrum + Send + Sync;

/// A medium lowered into one function per action.
pub struct CompiledMedium {
    /// The medium this case was lowered from.
    pub object: ObjectId,

    tr: Function<TrFn>,
}

impl CompiledMedium {
    /// Returns the function index of each action in `MEDIUM_ACTIONS` order.
    pub fn functions(&self) -> [usize; 1] {
        [self.tr.index()]
    }

    /// See `Medium::tr`.
    #[inline]
    pub fn tr(&self, ray: &Ray, t: Float, rng: &mut RNG) -> Spectrum {
        (self.tr.code())(ray, t, rng)
    }
}

/// Object safe view of a `Medium` that lowers it for a kernel.
pub trait MediumObject: Send + Sync {
    /// Lowers the medium into a switch case.
    ///
    /// * `cc` - Context of the kernel being built.
    fn lower(self: Arc<Self>, cc: &mut CompileContext) -> CompiledMedium;
}

impl<M: Medium> MediumObject for M {
    fn lower(self: Arc<Self>, cc: &mut CompileContext) -> CompiledMedium {
        let object = ObjectId::of(&self);
        CompiledMedium {
            object,
            tr: cc.lower_object_action(object, MEDIUM_ACTIONS[0], |_| -> Arc<TrFn> {
                Arc::new(move |ray: &Ray, t: Float, rng: &mut RNG| self.tr(ray, t, rng))
            }),
        }
    }
}

/// Atomic reference counted `MediumObject`.
pub type ArcMedium = Arc<dyn MediumObject>;

/// Lowers every medium into a switch over medium ids.
///
/// * `cc`    - Context of the kernel being built.
/// * `media` - Media indexed by id.
pub fn compile_media(cc: &mut CompileContext, media: &[ArcMedium]) -> Result<Switch<CompiledMedium>> {
    let mut builder = SwitchBuilder::new("medium", media.len());
    for (id, m) in media.iter().enumerate() {
        builder.add_case(id as u32, m.clone().lower(cc))?;
    }
    builder.build()
}

/// Returns the transmittance of a segment, treating `VOID_MEDIUM` as vacuum.
///
/// * `media`     - The medium switch.
/// * `medium_id` - Id of the medium the segment lies in.
/// * `ray`       - The ray.
/// * `t`         - Length of the segment.
/// * `rng`       - Random numbers for stochastic estimators.
pub fn transmittance(
    media: &Switch<CompiledMedium>,
    medium_id: u32,
    ray: &Ray,
    t: Float,
    rng: &mut RNG,
) -> Result<Spectrum> {
    if medium_id == VOID_MEDIUM {
        Ok(Spectrum::one())
    } else {
        Ok(media.case(medium_id)?.tr(ray, t, rng))
    }
}
