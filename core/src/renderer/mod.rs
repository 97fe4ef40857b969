//! Renderer

use crate::error::*;
use crate::image_io::RGBImage;
use crate::math::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

mod async_renderer;

// Re-export
pub use async_renderer::*;

/// Renderer parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RendererParams {
    /// Image width in pixels.
    pub width: u32,

    /// Image height in pixels.
    pub height: u32,

    /// Samples per pixel.
    pub spp: u32,

    /// Number of paths in flight.
    pub state_count: u32,

    /// Depth after which Russian roulette may terminate paths.
    pub min_depth: u32,

    /// Depth at which paths are always terminated.
    pub max_depth: u32,

    /// Paths with a throughput luminance below this are subject to
    /// Russian roulette.
    pub rr_threshold: Float,

    /// Survival probability of paths subject to Russian roulette.
    pub rr_cont_prob: Float,

    /// Accumulate first-hit albedo.
    pub albedo: bool,

    /// Accumulate first-hit normals.
    pub normal: bool,
}

impl Default for RendererParams {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            spp: 16,
            state_count: 1 << 20,
            min_depth: 5,
            max_depth: 10,
            rr_threshold: 0.2,
            rr_cont_prob: 0.6,
            albedo: false,
            normal: false,
        }
    }
}

impl RendererParams {
    /// Checks the parameters before any kernel is built.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::Config(format!(
                "resolution {}x{} must be non-zero",
                self.width, self.height
            )));
        }
        if self.spp == 0 {
            return Err(Error::Config("spp must be at least 1".to_string()));
        }
        if self.state_count == 0 {
            return Err(Error::Config("state_count must be at least 1".to_string()));
        }
        if self.max_depth == 0 {
            return Err(Error::Config("max_depth must be at least 1".to_string()));
        }
        if self.min_depth > self.max_depth {
            return Err(Error::Config(format!(
                "min_depth {} exceeds max_depth {}",
                self.min_depth, self.max_depth
            )));
        }
        if !(self.rr_cont_prob > 0.0 && self.rr_cont_prob <= 1.0) {
            return Err(Error::Config(format!(
                "rr_cont_prob {} must be in (0, 1]",
                self.rr_cont_prob
            )));
        }
        if !(self.rr_threshold >= 0.0) {
            return Err(Error::Config(format!(
                "rr_threshold {} must be non-negative",
                self.rr_threshold
            )));
        }
        Ok(())
    }

    /// Returns the total number of samples to render.
    pub fn total_samples(&self) -> u64 {
        self.width as u64 * self.height as u64 * self.spp as u64
    }
}

/// Images produced by a render.
#[derive(Clone, Debug)]
pub struct RenderResult {
    /// Radiance.
    pub radiance: RGBImage,

    /// First-hit albedo.
    pub albedo: Option<RGBImage>,

    /// First-hit normals remapped to `[0, 1]`.
    pub normal: Option<RGBImage>,

    /// False if the render was stopped before every sample finished.
    pub complete: bool,
}

/// Shared flag that asks a render to stop at the next iteration boundary.
#[derive(Clone, Debug, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    /// Create a new `StopToken`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a stop.
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns true if a stop was requested.
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Clears the request.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Renderer interface.
pub trait Renderer: Send + Sync {
    /// Renders an image. Returns the partial result when `stop` is
    /// requested.
    ///
    /// * `stop` - Stop request.
    fn render(&self, stop: &StopToken) -> Result<RenderResult>;
}

/// Atomic reference counted `Renderer`.
pub type ArcRenderer = Arc<dyn Renderer>;
