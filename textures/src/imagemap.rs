//! Image Texture

use std::path::Path;
use std::sync::Arc;
use wavefront_core::error::*;
use wavefront_core::geometry::*;
use wavefront_core::spectrum::*;
use wavefront_core::texture::*;

/// Convention for texture coordinates outside [0, 1].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ImageWrap {
    /// Tile the image.
    #[default]
    Repeat,

    /// Extend the border texels.
    Clamp,
}

/// A 2-D array of texels sampled with bilinear filtering. Texel `(0, 0)` is
/// the first one stored and `u` runs along rows.
#[derive(Clone, Debug)]
pub struct ImageTexture {
    /// Width in texels.
    width: usize,

    /// Height in texels.
    height: usize,

    /// Texels in row-major order.
    texels: Vec<Spectrum>,

    /// Wrapping convention.
    wrap: ImageWrap,
}

impl ImageTexture {
    /// Create a new `ImageTexture` from texels.
    ///
    /// * `width`  - Width in texels.
    /// * `height` - Height in texels.
    /// * `texels` - Texels in row-major order.
    /// * `wrap`   - Wrapping convention.
    pub fn new(width: usize, height: usize, texels: Vec<Spectrum>, wrap: ImageWrap) -> Result<Self> {
        if width == 0 || height == 0 || texels.len() != width * height {
            return Err(Error::Image(format!(
                "{} texels do not form a {}x{} texture",
                texels.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            texels,
            wrap,
        })
    }

    /// Loads an 8-bit or floating point image. 8-bit images are sRGB encoded
    /// and converted to linear values.
    ///
    /// * `path` - Path to the image file.
    /// * `wrap` - Wrapping convention.
    pub fn open<P: AsRef<Path>>(path: P, wrap: ImageWrap) -> Result<Self> {
        let path = path.as_ref();
        let img = image::open(path)
            .map_err(Error::from)
            .with_context(|| format!("loading texture {}", path.display()))?;

        let srgb = !matches!(
            img,
            image::DynamicImage::ImageRgb32F(_) | image::DynamicImage::ImageRgba32F(_)
        );
        let rgb = img.to_rgb32f();
        let (width, height) = (rgb.width() as usize, rgb.height() as usize);
        let texels = rgb
            .pixels()
            .map(|p| {
                let c = p.0.map(|v| if srgb { inverse_gamma_correct(v) } else { v });
                Spectrum::from(c)
            })
            .collect();

        debug!("Loaded {}x{} texture from {}", width, height, path.display());
        Self::new(width, height, texels, wrap)
    }

    /// Returns the resolution in texels.
    pub fn resolution(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Returns the texture as a shared `TextureObject`.
    pub fn into_arc(self) -> ArcTexture {
        Arc::new(self)
    }

    /// Returns a texel after applying the wrapping convention.
    ///
    /// * `s` - Column; may be out of range.
    /// * `t` - Row; may be out of range.
    fn texel(&self, s: i64, t: i64) -> Spectrum {
        let (w, h) = (self.width as i64, self.height as i64);
        let (s, t) = match self.wrap {
            ImageWrap::Repeat => (s.rem_euclid(w), t.rem_euclid(h)),
            ImageWrap::Clamp => (s.clamp(0, w - 1), t.clamp(0, h - 1)),
        };
        self.texels[t as usize * self.width + s as usize]
    }

    /// Bilinearly interpolates the texels around a texture coordinate.
    ///
    /// * `uv` - Texture coordinate.
    fn bilerp(&self, uv: &Point2f) -> Spectrum {
        let s = uv.x * self.width as Float - 0.5;
        let t = uv.y * self.height as Float - 0.5;
        let (s0, t0) = (s.floor(), t.floor());
        let (ds, dt) = (s - s0, t - t0);
        let (s0, t0) = (s0 as i64, t0 as i64);

        self.texel(s0, t0) * ((1.0 - ds) * (1.0 - dt))
            + self.texel(s0 + 1, t0) * (ds * (1.0 - dt))
            + self.texel(s0, t0 + 1) * ((1.0 - ds) * dt)
            + self.texel(s0 + 1, t0 + 1) * (ds * dt)
    }
}

impl Texture2D for ImageTexture {
    fn sample_spectrum(&self, uv: &Point2f) -> Spectrum {
        self.bilerp(uv)
    }

    /// Returns the first channel.
    fn sample_float(&self, uv: &Point2f) -> Float {
        self.bilerp(uv)[0]
    }
}
