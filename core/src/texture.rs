//! Texture

use crate::dispatch::*;
use crate::geometry::*;
use crate::spectrum::*;
use std::sync::Arc;

/// Names of the actions a lowered texture provides.
pub const TEXTURE_ACTIONS: [&str; 2] = ["texture.sample_spectrum", "texture.sample_float"];

/// A texture looked up by surface parameterization.
pub trait Texture2D: Send + Sync + 'static {
    /// Returns the color at a texture coordinate.
    ///
    /// * `uv` - Texture coordinate.
    fn sample_spectrum(&self, uv: &Point2f) -> Spectrum;

    /// Returns the scalar value at a texture coordinate.
    ///
    /// * `uv` - Texture coordinate.
    fn sample_float(&self, uv: &Point2f) -> Float;
}

/// Lowered `Texture2D::sample_spectrum`.
pub type SampleSpectrumFn = dyn Fn(&Point2f) -> Spectrum + Send + Sync;

/// Lowered `Texture2D::sample_float`.
pub type SampleFloatFn = dyn Fn(&Point2f) -> Float + Send + Sync;

/// Object safe view of a `Texture2D`. Materials lower the lookups they use
/// through the context of the kernel they are lowered into, so a texture
/// shared by several materials is lowered once per kernel.
pub trait TextureObject: Send + Sync {
    /// Lowers `sample_spectrum`.
    ///
    /// * `cc` - Context of the kernel being built.
    fn lower_sample_spectrum(self: Arc<Self>, cc: &mut CompileContext) -> Function<SampleSpectrumFn>;

    /// Lowers `sample_float`.
    ///
    /// * `cc` - Context of the kernel being built.
    fn lower_sample_float(self: Arc<Self>, cc: &mut CompileContext) -> Function<SampleFloatFn>;
}

impl<T: Texture2D> TextureObject for T {
    fn lower_sample_spectrum(self: Arc<Self>, cc: &mut CompileContext) -> Function<SampleSpectrumFn> {
        cc.lower_object_action(ObjectId::of(&self), TEXTURE_ACTIONS[0], |_| -> Arc<SampleSpectrumFn> {
            Arc::new(move |uv: &Point2f| self.sample_spectrum(uv))
        })
    }

    fn lower_sample_float(self: Arc<Self>, cc: &mut CompileContext) -> Function<SampleFloatFn> {
        cc.lower_object_action(ObjectId::of(&self), TEXTURE_ACTIONS[1], |_| -> Arc<SampleFloatFn> {
            Arc::new(move |uv: &Point2f| self.sample_float(uv))
        })
    }
}

/// Atomic reference counted `TextureObject`.
pub type ArcTexture = Arc<dyn TextureObject>;

#[cfg(test)]
mod tests {
    use super::*;

    struct Ramp;

    impl Texture2D for Ramp {
        fn sample_spectrum(&self, uv: &Point2f) -> Spectrum {
            Spectrum::from_rgb(uv.x, uv.y, 0.0)
        }

        fn sample_float(&self, uv: &Point2f) -> Float {
            uv.x
        }
    }

    #[test]
    fn lookups_are_lowered_once_per_texture() {
        let ramp: ArcTexture = Arc::new(Ramp);
        let mut cc = CompileContext::new("shade");

        let a = ramp.clone().lower_sample_spectrum(&mut cc);
        let b = ramp.clone().lower_sample_spectrum(&mut cc);
        let f = ramp.lower_sample_float(&mut cc);

        assert!(a.same_code(&b));
        assert_eq!(cc.function_count(), 2);
        let uv = Point2f::new(0.25, 0.5);
        assert_eq!((a.code())(&uv), Spectrum::from_rgb(0.25, 0.5, 0.0));
        assert_eq!((f.code())(&uv), 0.25);
    }
}
