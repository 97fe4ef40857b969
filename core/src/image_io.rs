//! Image I/O

use crate::error::*;
use crate::geometry::*;
use crate::spectrum::*;
use byteorder::{LittleEndian, WriteBytesExt};
use exr::prelude as exrs;
use exr::prelude::WritableImage;
use image::{ImageBuffer, ImageFormat, Rgb};
use regex::Regex;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::OnceLock;

/// Stores RGB image data.
#[derive(Clone, Debug, PartialEq)]
pub struct RGBImage {
    /// The pixels in row-major order.
    pub pixels: Vec<RGBSpectrum>,

    /// Image width.
    pub width: usize,

    /// Image height.
    pub height: usize,
}

impl RGBImage {
    /// Creates a new `RGBImage` from pixel data.
    ///
    /// * `pixels` - RGB pixel data.
    /// * `width`  - Width of image.
    /// * `height` - Height of image.
    pub fn new(pixels: Vec<RGBSpectrum>, width: usize, height: usize) -> Self {
        debug_assert_eq!(width * height, pixels.len());
        Self {
            pixels,
            width,
            height,
        }
    }

    /// Returns the pixel at a given coordinate.
    ///
    /// * `x` - Column.
    /// * `y` - Row.
    pub fn get(&self, x: usize, y: usize) -> RGBSpectrum {
        self.pixels[y * self.width + x]
    }
}

/// Write an image. The format is chosen from the file extension.
///
/// * `path`  - Output file path.
/// * `image` - The image.
pub fn write_image(path: &str, image: &RGBImage) -> Result<()> {
    match get_extension_from_filename(path) {
        Some(".exr") => write_exr(path, image),
        Some(".tga") => write_8_bit(path, image, ImageFormat::Tga),
        Some(".png") => write_8_bit(path, image, ImageFormat::Png),
        Some(".pfm") => write_pfm(path, image),
        Some(extension) => Err(Error::Image(format!(
            "extension {extension} is not supported"
        ))),
        None => Err(Error::Image(format!(
            "can't determine file type from suffix of filename {path}"
        ))),
    }
    .with_context(|| format!("writing {path}"))
}

/// Inserts a suffix before the file extension, e.g. `out.exr` becomes
/// `out_albedo.exr`.
///
/// * `path`   - The file path.
/// * `suffix` - The suffix to insert.
pub fn suffixed_path(path: &str, suffix: &str) -> String {
    match get_extension_from_filename(path) {
        Some(ext) => format!("{}{}{}", &path[..path.len() - ext.len()], suffix, ext),
        None => format!("{path}{suffix}"),
    }
}

/// Returns regular expression for extracting the file extension. This will
/// match the last occurrence of a period followed by no periods or slashes.
fn regex_file_ext() -> &'static Regex {
    static DATA: OnceLock<Regex> = OnceLock::new();
    DATA.get_or_init(|| Regex::new(r"(\.[^./\\]+)$").expect("file extension pattern"))
}

/// Retrieve the extension from a file path.
///
/// * `path` - The file path.
fn get_extension_from_filename(path: &str) -> Option<&str> {
    regex_file_ext()
        .captures(path)
        .and_then(|c| c.get(1).map(|m| m.as_str()))
}

/// Writes the image in OpenEXR format.
///
/// * `path`  - Output file path.
/// * `image` - The image.
fn write_exr(path: &str, image: &RGBImage) -> Result<()> {
    info!(
        "Writing image {} with resolution {}x{}",
        path, image.width, image.height
    );

    let width = image.width;
    let layer = exrs::Layer::new(
        exrs::Vec2(image.width, image.height),
        exrs::LayerAttributes::named("render"),
        exrs::Encoding::SMALL_LOSSLESS,
        exrs::SpecificChannels::rgb(|pos: exrs::Vec2<usize>| {
            let p = image.pixels[pos.1 * width + pos.0];
            (p[0], p[1], p[2])
        }),
    );

    exrs::Image::from_layer(layer).write().to_file(path)?;
    Ok(())
}

/// Writes the image in an 8-bit format after gamma correction.
///
/// * `path`         - Output file path.
/// * `image`        - The image.
/// * `image_format` - Output format.
fn write_8_bit(path: &str, image: &RGBImage, image_format: ImageFormat) -> Result<()> {
    info!(
        "Writing image {} with resolution {}x{}",
        path, image.width, image.height
    );

    let imgbuf = ImageBuffer::from_fn(image.width as u32, image.height as u32, |x, y| {
        Rgb(apply_gamma(&image.get(x as usize, y as usize).c))
    });
    imgbuf.save_with_format(path, image_format)?;
    Ok(())
}

/// Writes the image as a little-endian 3 channel PFM.
///
/// * `path`  - Output file path.
/// * `image` - The image.
fn write_pfm(path: &str, image: &RGBImage) -> Result<()> {
    info!(
        "Writing image {} with resolution {}x{}",
        path, image.width, image.height
    );

    let mut file = BufWriter::new(File::create(path)?);

    // A negative scale marks little-endian data.
    write!(file, "PF\n{} {}\n-1\n", image.width, image.height)?;

    // Rows are stored bottom to top.
    for y in (0..image.height).rev() {
        for x in 0..image.width {
            for v in image.get(x, y).c {
                file.write_f32::<LittleEndian>(v)?;
            }
        }
    }
    file.flush()?;
    Ok(())
}

/// Apply gamma correction to a RGB floating point pixel and return the
/// clamped 8-bit values.
///
/// * `rgb` - RGB floating point pixel value.
#[inline]
pub fn apply_gamma(rgb: &[Float; 3]) -> [u8; 3] {
    [clamp_byte(rgb[0]), clamp_byte(rgb[1]), clamp_byte(rgb[2])]
}

/// Clamp floating point value to 8-bit range [0, 255].
///
/// * `v` - Value to clamp.
#[inline]
fn clamp_byte(v: Float) -> u8 {
    clamp(255.0 * gamma_correct(v) + 0.5, 0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_goes_before_extension() {
        assert_eq!(suffixed_path("out.exr", "_albedo"), "out_albedo.exr");
        assert_eq!(suffixed_path("dir.v2/out.png", "_normal"), "dir.v2/out_normal.png");
        assert_eq!(suffixed_path("out", "_normal"), "out_normal");
    }

    #[test]
    fn unknown_extension_is_an_error() {
        let image = RGBImage::new(vec![RGBSpectrum::zero()], 1, 1);
        assert!(write_image("out.bmp", &image).is_err());
        assert!(write_image("out", &image).is_err());
    }

    #[test]
    fn gamma_clamps_to_byte_range() {
        assert_eq!(apply_gamma(&[0.0, 1.0, 10.0]), [0, 255, 255]);
        assert_eq!(apply_gamma(&[-1.0, 0.0, 0.0])[0], 0);
    }

    #[test]
    fn pfm_has_header_and_payload() {
        let path = std::env::temp_dir().join("wavefront_core_pfm_test.pfm");
        let path = path.to_string_lossy().to_string();
        let image = RGBImage::new(vec![RGBSpectrum::new(0.5); 2], 2, 1);
        write_image(&path, &image).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"PF\n2 1\n-1\n"));
        assert_eq!(bytes.len(), "PF\n2 1\n-1\n".len() + 2 * 3 * 4);
        let _ = std::fs::remove_file(&path);
    }
}
