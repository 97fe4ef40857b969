//! Wavefront Path Tracer
//!
//! Path tracing split into bulk stages that run over a pool of in-flight
//! paths: Generate, Trace, Sort, Shade and Shadow. Paths that survive Shade
//! are compacted into the next generation and free slots are refilled by
//! Generate until every sample has been traced.

use std::sync::Arc;
use wavefront_core::device::*;
use wavefront_core::error::*;
use wavefront_core::film::*;
use wavefront_core::geometry::*;
use wavefront_core::renderer::*;
use wavefront_core::reporter::*;
use wavefront_core::scene::*;

mod generate;
mod path_state;
mod shade;
mod shadow;
mod sort;
mod trace;

pub use generate::*;
pub use path_state::*;
pub use shade::*;
pub use shadow::*;
pub use sort::*;
pub use trace::*;

/// Counts of one iteration.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct IterationStats {
    /// Paths spawned by Generate.
    pub spawned: usize,

    /// Paths in flight before Generate.
    pub active_before: usize,

    /// Paths carried into the next iteration.
    pub active_after: usize,

    /// Paths that finished and were splatted.
    pub terminated: usize,

    /// Shadow rays tested.
    pub shadow_rays: usize,
}

/// Renders a scene with the wavefront stages.
pub struct WavefrontPathTracer {
    params: RendererParams,
    scene: Arc<Scene>,
    reporter: ArcReporter,
}

impl WavefrontPathTracer {
    /// Create a new `WavefrontPathTracer`. The parameters are validated
    /// here, before any kernel is built.
    ///
    /// * `params` - Renderer parameters.
    /// * `scene`  - The scene.
    pub fn new(params: RendererParams, scene: Arc<Scene>) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            scene,
            reporter: Arc::new(NullReporter),
        })
    }

    /// Sets the reporter notified of progress and previews.
    ///
    /// * `reporter` - The reporter.
    pub fn with_reporter(self, reporter: ArcReporter) -> Self {
        Self { reporter, ..self }
    }

    /// Returns the parameters.
    pub fn params(&self) -> &RendererParams {
        &self.params
    }

    /// Builds the film, every stage and the path state.
    pub fn build_pipeline(&self) -> Result<WavefrontPipeline> {
        let params = &self.params;
        let scene = &self.scene;
        let state_count = params.state_count as usize;
        info!(
            "Building wavefront pipeline for {}x{} at {} spp with {} paths in flight",
            params.width, params.height, params.spp, state_count
        );

        let film = Arc::new(Film::new(params.width, params.height, params.albedo, params.normal));

        let generate = GeneratePipeline::new(
            Arc::clone(&scene.camera),
            Point2u::new(params.width, params.height),
            params.spp,
            state_count,
            scene.has_motion_blur,
        );
        let trace = TracePipeline::new(
            Arc::clone(&scene.traversal),
            scene.has_motion_blur,
            scene.is_triangle_only(),
        );
        info!(
            "Tracing with motion blur {}, triangle only {}",
            trace.has_motion_blur(),
            trace.triangle_only()
        );
        let shade = ShadePipeline::new(
            Arc::clone(&film),
            Arc::clone(scene),
            ShadeParams {
                min_depth: params.min_depth,
                max_depth: params.max_depth,
                rr_threshold: params.rr_threshold,
                rr_cont_prob: params.rr_cont_prob,
            },
        )
        .with_context(|| "unable to build shade pipeline")?;
        let shadow = ShadowPipeline::new(Arc::clone(&film), Arc::clone(scene))
            .with_context(|| "unable to build shadow pipeline")?;

        let mut path_state = PathState::new();
        path_state.initialize(state_count);

        Ok(WavefrontPipeline {
            film,
            device: Device::new(),
            path_state,
            generate,
            trace,
            sort: SortPipeline::new(),
            shade,
            shadow,
            active_state_count: 0,
            finished: 0,
            iteration: 0,
        })
    }
}

impl Renderer for WavefrontPathTracer {
    fn render(&self, stop: &StopToken) -> Result<RenderResult> {
        let mut pipeline = self.build_pipeline()?;
        let total = pipeline.total_samples();

        self.reporter.new_stage("rendering");
        let mut complete = true;
        while !pipeline.is_done() {
            if stop.is_stopped() {
                info!("Render stopped after {} of {} samples", pipeline.finished(), total);
                complete = false;
                break;
            }

            pipeline.iterate()?;
            self.reporter.progress(100.0 * pipeline.finished() as f64 / total as f64);
            if self.reporter.need_preview() {
                self.reporter.new_preview(pipeline.film().preview(), self.params.width, self.params.height);
            }
        }
        pipeline.synchronize();
        self.reporter.complete_stage();

        info!(
            "Rendered {} samples in {} iterations ({} kernel launches)",
            pipeline.finished(),
            pipeline.iteration(),
            pipeline.launch_count()
        );
        Ok(pipeline.result(complete))
    }
}

/// The stages of one render and the state they share.
pub struct WavefrontPipeline {
    film: Arc<Film>,
    device: Device,
    path_state: PathState,
    generate: GeneratePipeline,
    trace: TracePipeline,
    sort: SortPipeline,
    shade: ShadePipeline,
    shadow: ShadowPipeline,

    /// Paths in flight.
    active_state_count: usize,

    /// Paths splatted into the film.
    finished: u64,

    /// Iterations run so far.
    iteration: usize,
}

impl WavefrontPipeline {
    /// Runs Generate, Trace, Sort, Shade and Shadow once.
    pub fn iterate(&mut self) -> Result<IterationStats> {
        let iteration = self.iteration;
        let active_before = self.active_state_count;

        let spawned = self
            .generate
            .generate(&self.device, active_before, &mut self.path_state)
            .with_context(|| format!("iteration {iteration}"))?;
        let active = active_before + spawned;

        self.trace
            .trace(&self.device, active, &mut self.path_state)
            .with_context(|| format!("iteration {iteration}"))?;

        self.sort.sort(active, &mut self.path_state);

        let counters = self
            .shade
            .shade(&self.device, active, &mut self.path_state)
            .with_context(|| format!("iteration {iteration}"))?;

        if counters.shadow_ray_counter > 0 {
            self.shadow
                .test(&self.device, counters.shadow_ray_counter, &self.path_state)
                .with_context(|| format!("iteration {iteration}"))?;
        }

        self.path_state.next_iteration(counters.active_state_counter);

        let stats = IterationStats {
            spawned,
            active_before,
            active_after: counters.active_state_counter,
            terminated: active - counters.active_state_counter,
            shadow_rays: counters.shadow_ray_counter,
        };
        debug!("Iteration {}: {:?}", iteration, stats);

        self.active_state_count = stats.active_after;
        self.finished += stats.terminated as u64;
        self.iteration += 1;
        Ok(stats)
    }

    /// Returns true once every sample has been spawned and finished.
    pub fn is_done(&self) -> bool {
        self.generate.is_done() && self.active_state_count == 0
    }

    /// Returns the film.
    pub fn film(&self) -> &Film {
        &self.film
    }

    /// Returns the path state.
    pub fn path_state(&self) -> &PathState {
        &self.path_state
    }

    /// Returns the number of paths in flight.
    pub fn active_state_count(&self) -> usize {
        self.active_state_count
    }

    /// Returns the number of samples spawned so far.
    pub fn spawned(&self) -> u64 {
        self.generate.spawned()
    }

    /// Returns the number of samples splatted so far.
    pub fn finished(&self) -> u64 {
        self.finished
    }

    /// Returns the number of samples of the whole image.
    pub fn total_samples(&self) -> u64 {
        self.generate.total_samples()
    }

    /// Returns the number of iterations run so far.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Returns the number of kernel launches so far.
    pub fn launch_count(&self) -> usize {
        self.device.launch_count()
    }

    /// Waits for every queued launch.
    pub fn synchronize(&self) {
        self.device.synchronize();
    }

    /// Reads the film back into host images.
    ///
    /// * `complete` - Whether every sample finished.
    pub fn result(&self, complete: bool) -> RenderResult {
        RenderResult {
            radiance: self.film.radiance_image(),
            albedo: self.film.albedo_image(),
            normal: self.film.normal_image(),
            complete,
        }
    }
}
