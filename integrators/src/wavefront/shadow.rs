//! Shadow Pipeline

use super::path_state::*;
use std::sync::Arc;
use wavefront_core::device::*;
use wavefront_core::dispatch::*;
use wavefront_core::error::*;
use wavefront_core::film::*;
use wavefront_core::geometry::*;
use wavefront_core::medium::*;
use wavefront_core::scene::*;

/// Tests shadow rays for occlusion and splats the contribution of the
/// unoccluded ones.
pub struct ShadowPipeline {
    film: Arc<Film>,
    scene: Arc<Scene>,
    media: Switch<CompiledMedium>,

    /// Segment length used for shadow rays towards the environment.
    world_diagonal: Float,
}

impl ShadowPipeline {
    /// Builds the shadow kernel.
    ///
    /// * `film`  - Film to splat into.
    /// * `scene` - The scene.
    pub fn new(film: Arc<Film>, scene: Arc<Scene>) -> Result<Self> {
        let mut cc = CompileContext::new("shadow");
        let media = compile_media(&mut cc, &scene.media)?;
        info!(
            "Compiled '{}' kernel: {} media, {} functions",
            cc.kernel(),
            media.len(),
            cc.function_count()
        );
        cc.log_functions();

        Ok(Self {
            world_diagonal: scene.world_diagonal(),
            film,
            scene,
            media,
        })
    }

    /// Tests the first `shadow_ray_count` shadow rays. The path state is only
    /// read.
    ///
    /// * `device`           - Device to launch on.
    /// * `shadow_ray_count` - Number of shadow rays.
    /// * `soa`              - Path state.
    pub fn test(&self, device: &Device, shadow_ray_count: usize, soa: &PathState) -> Result<()> {
        device.launch_for_each("shadow", shadow_ray_count, |i| {
            let record = soa.shadow.read(i);
            let ray = record.ray();
            if self.scene.traversal.occluded(&ray) {
                return Ok(());
            }

            let t = if record.ray_t1.is_infinite() {
                self.world_diagonal
            } else {
                record.ray_t1
            };
            let mut rng = record.rng;
            let tr = transmittance(&self.media, record.medium_id, &ray, t, &mut rng)?;
            self.film.splat_radiance(&record.pixel_coord, &(record.beta_li * tr));
            Ok(())
        })
    }
}
