//! Constant Texture

use std::sync::Arc;
use wavefront_core::geometry::*;
use wavefront_core::spectrum::*;
use wavefront_core::texture::*;

/// Implements a texture that returns the same value everywhere.
#[derive(Copy, Clone, Debug)]
pub struct ConstantTexture<T> {
    /// The texture value.
    value: T,
}

impl<T> ConstantTexture<T> {
    /// Create a new `ConstantTexture<T>`.
    ///
    /// * `value` - The texture value.
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T> ConstantTexture<T>
where
    Self: Texture2D,
{
    /// Returns the texture as a shared `TextureObject`.
    pub fn into_arc(self) -> ArcTexture {
        Arc::new(self)
    }
}

impl Texture2D for ConstantTexture<Spectrum> {
    fn sample_spectrum(&self, _uv: &Point2f) -> Spectrum {
        self.value
    }

    /// Returns the first channel.
    fn sample_float(&self, _uv: &Point2f) -> Float {
        self.value[0]
    }
}

impl Texture2D for ConstantTexture<Float> {
    fn sample_spectrum(&self, _uv: &Point2f) -> Spectrum {
        Spectrum::new(self.value)
    }

    fn sample_float(&self, _uv: &Point2f) -> Float {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_is_returned_everywhere() {
        let c = ConstantTexture::new(Spectrum::from_rgb(0.1, 0.2, 0.3));
        for uv in [Point2f::new(0.0, 0.0), Point2f::new(0.7, -3.0)] {
            assert_eq!(c.sample_spectrum(&uv), Spectrum::from_rgb(0.1, 0.2, 0.3));
            assert_eq!(c.sample_float(&uv), 0.1);
        }
        let f = ConstantTexture::new(0.5 as Float);
        assert_eq!(f.sample_spectrum(&Point2f::new(0.3, 0.3)), Spectrum::new(0.5));
    }
}
