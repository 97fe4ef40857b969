//! Film

use crate::geometry::*;
use crate::image_io::RGBImage;
use crate::parallel::AtomicFloat;
use crate::spectrum::*;
use std::sync::atomic::Ordering;

/// Named accumulation channels of the film.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FilmChannel {
    /// Sum of path radiance.
    Radiance,

    /// Number of finished samples.
    Weight,

    /// Sum of first-hit albedo.
    Albedo,

    /// Sum of first-hit shading normals.
    Normal,
}

impl FilmChannel {
    /// Returns the number of components stored per pixel.
    pub fn components(&self) -> usize {
        match self {
            Self::Weight => 1,
            _ => 3,
        }
    }
}

/// Accumulation target shared by all pipeline stages. Every pixel entry is
/// an atomic float so lanes splat without locks.
pub struct Film {
    /// Image resolution in pixels.
    pub resolution: Point2u,

    /// Radiance sums (3 per pixel).
    radiance: Vec<AtomicFloat>,

    /// Sample counts (1 per pixel).
    weight: Vec<AtomicFloat>,

    /// Optional albedo sums (3 per pixel).
    albedo: Option<Vec<AtomicFloat>>,

    /// Optional normal sums (3 per pixel).
    normal: Option<Vec<AtomicFloat>>,
}

/// Allocates a zeroed channel.
///
/// * `n` - Number of floats.
fn channel(n: usize) -> Vec<AtomicFloat> {
    (0..n).map(|_| AtomicFloat::default()).collect()
}

/// Returns the number of pixels of a resolution.
///
/// * `resolution` - Resolution in pixels.
#[inline]
fn pixel_total(resolution: &Point2u) -> usize {
    resolution.x as usize * resolution.y as usize
}

/// Returns the row-major linear index of a pixel.
///
/// * `resolution` - Resolution in pixels.
/// * `pixel`      - Pixel coordinate.
#[inline]
fn linear_index(resolution: &Point2u, pixel: &Point2u) -> usize {
    pixel.y as usize * resolution.x as usize + pixel.x as usize
}

impl Film {
    /// Create a new `Film`.
    ///
    /// * `width`  - Width in pixels.
    /// * `height` - Height in pixels.
    /// * `albedo` - Allocate the albedo channel.
    /// * `normal` - Allocate the normal channel.
    pub fn new(width: u32, height: u32, albedo: bool, normal: bool) -> Self {
        let resolution = Point2u::new(width, height);
        let n = pixel_total(&resolution);
        Self {
            resolution,
            radiance: channel(3 * n),
            weight: channel(n),
            albedo: albedo.then(|| channel(3 * n)),
            normal: normal.then(|| channel(3 * n)),
        }
    }

    /// Returns the number of pixels.
    pub fn pixel_count(&self) -> usize {
        pixel_total(&self.resolution)
    }

    /// Returns true if the channel has storage.
    ///
    /// * `ch` - The channel.
    pub fn has_channel(&self, ch: FilmChannel) -> bool {
        self.storage(ch).is_some()
    }

    fn storage(&self, ch: FilmChannel) -> Option<&[AtomicFloat]> {
        match ch {
            FilmChannel::Radiance => Some(&self.radiance),
            FilmChannel::Weight => Some(&self.weight),
            FilmChannel::Albedo => self.albedo.as_deref(),
            FilmChannel::Normal => self.normal.as_deref(),
        }
    }

    /// Returns the linear index of a pixel.
    ///
    /// * `pixel` - Pixel coordinate.
    #[inline]
    pub fn pixel_index(&self, pixel: &Point2u) -> usize {
        debug_assert!(pixel.x < self.resolution.x && pixel.y < self.resolution.y);
        linear_index(&self.resolution, pixel)
    }

    /// Atomically adds a value into a channel. Values with NaNs are dropped
    /// and splats into channels without storage are ignored.
    ///
    /// * `ch`    - The channel.
    /// * `pixel` - Pixel coordinate.
    /// * `value` - The components to add; the weight channel uses the first.
    pub fn splat_atomic(&self, ch: FilmChannel, pixel: &Point2u, value: &[Float; 3]) {
        let Some(storage) = self.storage(ch) else {
            return;
        };
        if value.iter().any(|v| v.is_nan()) {
            warn!("Dropping NaN splat into {:?} at {:?}", ch, pixel);
            return;
        }

        let n = ch.components();
        let offset = n * self.pixel_index(pixel);
        for (c, v) in value.iter().take(n).enumerate() {
            if *v != 0.0 {
                storage[offset + c].fetch_add(*v);
            }
        }
    }

    /// Adds radiance to a pixel.
    ///
    /// * `pixel` - Pixel coordinate.
    /// * `l`     - Radiance.
    pub fn splat_radiance(&self, pixel: &Point2u, l: &Spectrum) {
        self.splat_atomic(FilmChannel::Radiance, pixel, &l.c);
    }

    /// Adds a sample weight to a pixel.
    ///
    /// * `pixel` - Pixel coordinate.
    /// * `w`     - Weight.
    pub fn splat_weight(&self, pixel: &Point2u, w: Float) {
        self.splat_atomic(FilmChannel::Weight, pixel, &[w, 0.0, 0.0]);
    }

    /// Adds albedo to a pixel.
    ///
    /// * `pixel`  - Pixel coordinate.
    /// * `albedo` - Albedo.
    pub fn splat_albedo(&self, pixel: &Point2u, albedo: &Spectrum) {
        self.splat_atomic(FilmChannel::Albedo, pixel, &albedo.c);
    }

    /// Adds a shading normal to a pixel.
    ///
    /// * `pixel` - Pixel coordinate.
    /// * `n`     - Normal.
    pub fn splat_normal(&self, pixel: &Point2u, n: &Normal3f) {
        self.splat_atomic(FilmChannel::Normal, pixel, &[n.x, n.y, n.z]);
    }

    /// Resets every channel to zero.
    pub fn clear(&self) {
        for ch in [
            FilmChannel::Radiance,
            FilmChannel::Weight,
            FilmChannel::Albedo,
            FilmChannel::Normal,
        ] {
            if let Some(storage) = self.storage(ch) {
                storage.iter().for_each(|v| v.store(0.0, Ordering::Release));
            }
        }
    }

    /// Returns the accumulated weight of a pixel.
    ///
    /// * `pixel` - Pixel coordinate.
    pub fn weight(&self, pixel: &Point2u) -> Float {
        self.weight[self.pixel_index(pixel)].load(Ordering::Acquire)
    }

    /// Returns the sum of the weight channel over all pixels.
    pub fn total_weight(&self) -> Float {
        self.weight.iter().map(|w| w.load(Ordering::Acquire)).sum()
    }

    /// Returns the inverted weight of a pixel; zero stays zero.
    fn inv_weight(&self, i: usize) -> Float {
        let k = self.weight[i].load(Ordering::Acquire);
        if k > 0.0 {
            1.0 / k
        } else {
            0.0
        }
    }

    /// Reads back a 3 component channel normalized by the weight channel.
    ///
    /// * `storage` - Channel storage.
    /// * `remap`   - Maps the normalized value to the output value.
    fn read_back<F>(&self, storage: &[AtomicFloat], remap: F) -> RGBImage
    where
        F: Fn(Float) -> Float,
    {
        let pixels = (0..self.pixel_count())
            .map(|i| {
                let inv = self.inv_weight(i);
                let v = |c: usize| remap(storage[3 * i + c].load(Ordering::Acquire) * inv);
                RGBSpectrum::from_rgb(v(0), v(1), v(2))
            })
            .collect();
        RGBImage::new(
            pixels,
            self.resolution.x as usize,
            self.resolution.y as usize,
        )
    }

    /// Returns the normalized radiance image.
    pub fn radiance_image(&self) -> RGBImage {
        self.read_back(&self.radiance, |v| v)
    }

    /// Returns the normalized albedo image if the channel is enabled.
    pub fn albedo_image(&self) -> Option<RGBImage> {
        self.albedo.as_deref().map(|s| self.read_back(s, |v| v))
    }

    /// Returns the normalized normal image remapped from [-1, 1] to [0, 1]
    /// if the channel is enabled. Pixels without samples map to 0.5.
    pub fn normal_image(&self) -> Option<RGBImage> {
        self.normal.as_deref().map(|s| self.read_back(s, |v| 0.5 + 0.5 * v))
    }

    /// Returns a gamma corrected 8-bit RGBA preview of the radiance channel.
    pub fn preview(&self) -> Vec<[u8; 4]> {
        self.radiance_image()
            .pixels
            .iter()
            .map(|p| {
                let [r, g, b] = crate::image_io::apply_gamma(&p.c);
                [r, g, b, 255]
            })
            .collect()
    }
}
