//! Command line options

use clap::{Parser, ValueEnum};
use wavefront_core::geometry::Float;
use wavefront_core::renderer::RendererParams;

/// Built-in scenes.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum SceneName {
    /// Closed box with a ceiling light, a mirror sphere and a glass sphere.
    Cornell,

    /// Diffuse sphere on a ground plane under a gradient sky.
    Sky,

    /// Single spherical emitter above a floor and an absorbing glass ball.
    Area,
}

/// System wide options.
#[derive(Parser, Clone, Debug)]
#[command(author, version, about = "Wavefront path tracer", long_about = None)]
pub struct Options {
    /// Built-in scene to render.
    #[arg(value_enum, default_value_t = SceneName::Cornell)]
    pub scene: SceneName,

    /// Image width in pixels.
    #[arg(long, short = 'W', value_name = "NUM", default_value_t = 512)]
    pub width: u32,

    /// Image height in pixels.
    #[arg(long, short = 'H', value_name = "NUM", default_value_t = 512)]
    pub height: u32,

    /// Samples per pixel.
    #[arg(long, short = 's', value_name = "NUM", default_value_t = 16)]
    pub spp: u32,

    /// Number of paths in flight.
    #[arg(long = "states", value_name = "NUM", default_value_t = 1 << 20)]
    pub state_count: u32,

    /// Depth after which Russian roulette may terminate paths.
    #[arg(long, value_name = "NUM", default_value_t = 5)]
    pub min_depth: u32,

    /// Depth at which paths are always terminated.
    #[arg(long, value_name = "NUM", default_value_t = 10)]
    pub max_depth: u32,

    /// Throughput luminance below which Russian roulette applies.
    #[arg(long, value_name = "FLOAT", default_value_t = 0.2)]
    pub rr_threshold: Float,

    /// Survival probability under Russian roulette.
    #[arg(long, value_name = "FLOAT", default_value_t = 0.6)]
    pub rr_cont_prob: Float,

    /// Also write the first-hit albedo image.
    #[arg(long)]
    pub albedo: bool,

    /// Also write the first-hit normal image.
    #[arg(long)]
    pub normal: bool,

    /// Number of rendering threads; 0 uses every core.
    #[arg(long = "nthreads", short = 't', value_name = "NUM", default_value_t = 0)]
    pub n_threads: usize,

    /// Output image; the format is chosen from the extension.
    #[arg(long = "outfile", short = 'o', value_name = "FILE", default_value = "out.exr")]
    pub image_file: String,

    /// Seconds between preview images written next to the output.
    #[arg(long = "preview", value_name = "SECS")]
    pub preview_interval: Option<f64>,

    /// Suppress all text output other than error messages.
    #[arg(long)]
    pub quiet: bool,
}

impl Options {
    /// Returns the renderer parameters.
    pub fn renderer_params(&self) -> RendererParams {
        RendererParams {
            width: self.width,
            height: self.height,
            spp: self.spp,
            state_count: self.state_count,
            min_depth: self.min_depth,
            max_depth: self.max_depth,
            rr_threshold: self.rr_threshold,
            rr_cont_prob: self.rr_cont_prob,
            albedo: self.albedo,
            normal: self.normal,
        }
    }

    /// Returns the aspect ratio of the image.
    pub fn aspect(&self) -> Float {
        self.width as Float / self.height.max(1) as Float
    }
}
