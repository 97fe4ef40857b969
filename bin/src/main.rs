#[macro_use]
extern crate log;

mod options;
mod scenes;

use clap::Parser;
use integrators::WavefrontPathTracer;
use options::Options;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use wavefront_core::error::*;
use wavefront_core::image_io::*;
use wavefront_core::renderer::*;
use wavefront_core::reporter::*;

fn main() {
    let options = Options::parse();

    // Initialize `env_logger`; `RUST_LOG` overrides the default level.
    let level = if options.quiet { "error" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(&options) {
        eprintln!("error: {}", ErrorChain(&e));
        std::process::exit(1);
    }
}

fn run(options: &Options) -> Result<()> {
    init_thread_pool(options.n_threads)?;

    let params = options.renderer_params();
    params.validate()?;
    let scene = scenes::build_scene(options.scene, options.aspect())?;

    let start = Instant::now();
    let result = match options.preview_interval {
        Some(secs) => render_with_previews(options, params, scene, secs)?,
        None => {
            let reporter: ArcReporter = if options.quiet {
                Arc::new(NullReporter)
            } else {
                Arc::new(ConsoleReporter::new())
            };
            WavefrontPathTracer::new(params, scene)?
                .with_reporter(reporter)
                .render(&StopToken::new())?
        }
    };
    info!("Rendering took {:.2}s", start.elapsed().as_secs_f64());

    write_image(&options.image_file, &result.radiance)?;
    if let Some(albedo) = &result.albedo {
        write_image(&suffixed_path(&options.image_file, "_albedo"), albedo)?;
    }
    if let Some(normal) = &result.normal {
        write_image(&suffixed_path(&options.image_file, "_normal"), normal)?;
    }
    Ok(())
}

/// Sizes the global `rayon` pool the kernels launch on.
///
/// * `n_threads` - Number of threads; 0 uses every core.
fn init_thread_pool(n_threads: usize) -> Result<()> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .build_global()
        .map_err(|e| Error::Runtime(format!("unable to build thread pool: {e}")))
}

/// Returns the PNG path previews of an output image are written to.
///
/// * `image_file` - Path of the final image.
fn preview_path(image_file: &str) -> PathBuf {
    Path::new(&suffixed_path(image_file, "_preview")).with_extension("png")
}

/// Renders on a background thread while this thread writes previews.
fn render_with_previews(
    options: &Options,
    params: RendererParams,
    scene: Arc<wavefront_core::scene::Scene>,
    secs: f64,
) -> Result<RenderResult> {
    if !(secs > 0.0 && secs.is_finite()) {
        return Err(Error::Config(format!("preview interval {secs} must be positive")));
    }
    let interval = Duration::from_secs_f64(secs);
    let reporter = Arc::new(PreviewReporter::new(interval));
    let tracer = WavefrontPathTracer::new(params, scene)?.with_reporter(reporter.clone());

    let renderer = AsyncRenderer::new(Arc::new(tracer));
    renderer.render_async()?;

    let preview_path = preview_path(&options.image_file);
    while renderer.is_rendering() {
        std::thread::sleep(interval.min(Duration::from_millis(250)));
        if let Some(preview) = reporter.take_preview() {
            let (stage, percent) = reporter.status();
            info!("{}: {:.1}%", stage, percent);
            write_preview(&preview_path, preview)?;
        }
    }
    renderer.wait_async()
}

/// Writes an 8-bit preview as PNG.
fn write_preview(path: &Path, preview: Preview) -> Result<()> {
    let raw = preview.pixels.into_iter().flatten().collect();
    let image = image::RgbaImage::from_raw(preview.width, preview.height, raw)
        .ok_or_else(|| Error::Image(format!("preview buffer does not match {}x{}", preview.width, preview.height)))?;
    image.save(path).map_err(Error::from).with_context(|| format!("writing {}", path.display()))
}
