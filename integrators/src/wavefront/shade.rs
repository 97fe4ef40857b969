//! Shade Pipeline

use super::path_state::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wavefront_core::device::*;
use wavefront_core::dispatch::*;
use wavefront_core::error::*;
use wavefront_core::film::*;
use wavefront_core::geometry::*;
use wavefront_core::interaction::*;
use wavefront_core::light::*;
use wavefront_core::material::*;
use wavefront_core::medium::*;
use wavefront_core::rng::RNG;
use wavefront_core::sampling::power_heuristic;
use wavefront_core::scene::*;
use wavefront_core::spectrum::*;

/// Path termination parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ShadeParams {
    /// Depth after which Russian roulette may terminate paths.
    pub min_depth: u32,

    /// Depth at which paths are always terminated.
    pub max_depth: u32,

    /// Paths with a throughput luminance below this are subject to Russian
    /// roulette.
    pub rr_threshold: Float,

    /// Survival probability under Russian roulette.
    pub rr_cont_prob: Float,
}

/// Counters produced by one Shade launch.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ShadeCounters {
    /// Number of paths written into the next generation.
    pub active_state_counter: usize,

    /// Number of shadow rays written.
    pub shadow_ray_counter: usize,
}

/// What a lane hands back to be scattered into the path state.
#[derive(Default)]
struct ShadeOutput {
    next: Option<(usize, PathRecord)>,
    shadow: Option<(usize, ShadowRecord)>,
}

/// Shading kernel with every scene object lowered into a switch.
pub struct ShadePipeline {
    film: Arc<Film>,
    scene: Arc<Scene>,
    params: ShadeParams,
    materials: Switch<CompiledMaterial>,
    area_lights: Switch<CompiledAreaLight>,
    envir_light: Switch<CompiledEnvirLight>,
    media: Switch<CompiledMedium>,

    /// Number of area lights; the environment light follows them in the
    /// light sampler's numbering.
    area_light_count: usize,

    /// Segment length used for rays that leave the scene.
    world_diagonal: Float,
}

impl ShadePipeline {
    /// Builds the shading kernel.
    ///
    /// * `film`   - Film to splat finished paths into.
    /// * `scene`  - The scene.
    /// * `params` - Path termination parameters.
    pub fn new(film: Arc<Film>, scene: Arc<Scene>, params: ShadeParams) -> Result<Self> {
        let mut cc = CompileContext::new("shade");
        let materials = compile_materials(&mut cc, &scene.materials)?;
        let area_lights = compile_area_lights(&mut cc, &scene.area_lights)?;
        let envir_light = compile_envir_light(&mut cc, scene.envir_light.as_ref())?;
        let media = compile_media(&mut cc, &scene.media)?;
        info!(
            "Compiled '{}' kernel: {} materials, {} area lights, {} environment lights, {} media, {} functions",
            cc.kernel(),
            materials.len(),
            area_lights.len(),
            envir_light.len(),
            media.len(),
            cc.function_count()
        );
        cc.log_functions();

        Ok(Self {
            area_light_count: scene.area_lights.len(),
            world_diagonal: scene.world_diagonal(),
            film,
            scene,
            params,
            materials,
            area_lights,
            envir_light,
            media,
        })
    }

    /// Shades every active path. Terminated paths are splatted into the film;
    /// survivors are written into the next generation and shadow rays into
    /// the shadow buffers.
    ///
    /// * `device`       - Device to launch on.
    /// * `active_count` - Number of active paths.
    /// * `soa`          - Path state.
    pub fn shade(&self, device: &Device, active_count: usize, soa: &mut PathState) -> Result<ShadeCounters> {
        let capacity = soa.capacity();
        let active_state_counter = AtomicUsize::new(0);
        let shadow_ray_counter = AtomicUsize::new(0);

        let state: &PathState = soa;
        let outputs = device.launch("shade", active_count, |i| {
            let s = state.active_state_indices[i] as usize;
            self.shade_path(state, s, capacity, &active_state_counter, &shadow_ray_counter)
        })?;

        for output in outputs {
            if let Some((slot, record)) = output.next {
                soa.next.write(slot, &record);
            }
            if let Some((slot, record)) = output.shadow {
                soa.shadow.write(slot, &record);
            }
        }

        let counters = ShadeCounters {
            active_state_counter: active_state_counter.into_inner(),
            shadow_ray_counter: shadow_ray_counter.into_inner(),
        };
        soa.shadow_ray_count = counters.shadow_ray_counter;
        Ok(counters)
    }

    /// Shades the path in slot `s`.
    fn shade_path(
        &self,
        soa: &PathState,
        s: usize,
        capacity: usize,
        active_state_counter: &AtomicUsize,
        shadow_ray_counter: &AtomicUsize,
    ) -> Result<ShadeOutput> {
        let path = soa.current.read(s);
        let ray = path.ray();
        let mut rng = path.rng;
        let mut beta = path.beta;
        let mut beta_le = path.beta_le;
        let mut radiance = path.path_radiance;
        let mut output = ShadeOutput::default();

        let inct_t = soa.inct_t[s];
        let is_miss = inct_t == INCT_T_MISS;

        // Attenuation along the segment the ray travelled.
        let inct_medium_id = soa.inct_medium_id[s];
        if inct_medium_id != VOID_MEDIUM {
            let t = if is_miss { self.world_diagonal } else { inct_t };
            let tr = transmittance(&self.media, inct_medium_id, &ray, t, &mut rng)?;
            beta *= tr;
            beta_le *= tr;
        }

        if is_miss {
            radiance += self.envir_emission(&path, &beta_le)?;
            self.terminate(&path, &radiance);
            return Ok(output);
        }

        let (uv, instance_id, prim_id) = unpack_inct_uv_id(&soa.inct_uv_id[s]);
        let sp = self.scene.surface_point(instance_id, prim_id, &uv, path.ray_time)?;
        let instance = self.scene.instance(instance_id)?;
        let material = self.materials.case(instance.material_id)?;
        let wo = -ray.d;

        if path.depth == 0 {
            if self.film.has_channel(FilmChannel::Albedo) {
                self.film.splat_albedo(&path.pixel_coord, &material.albedo(&sp));
            }
            if self.film.has_channel(FilmChannel::Normal) {
                self.film.splat_normal(&path.pixel_coord, &material.normal(&sp));
            }
        }

        if let Some(light_id) = instance.light_id {
            radiance += self.area_emission(&path, &beta_le, light_id, &sp, &wo)?;
        }

        if path.depth >= self.params.max_depth {
            self.terminate(&path, &radiance);
            return Ok(output);
        }

        // Next event estimation.
        if !material.is_delta(&sp) {
            if let Some(record) = self.sample_light(&path, &beta, &sp, instance, material, &wo, &mut rng)? {
                let slot = shadow_ray_counter.fetch_add(1, Ordering::AcqRel);
                if slot >= capacity {
                    return Err(Error::ResourceExhausted {
                        requested: slot + 1,
                        capacity,
                    });
                }
                output.shadow = Some((slot, record));
            }
        }

        // Continuation.
        let u_lobe = rng.uniform_float();
        let u = rng.uniform_2d();
        let bs = match material.sample_radiance(&sp, &wo, u_lobe, &u) {
            Some(bs) if !bs.f.is_black() && bs.pdf > 0.0 => bs,
            _ => {
                self.terminate(&path, &radiance);
                return Ok(output);
            }
        };

        let mut new_beta = beta * bs.f * (sp.n.abs_dot(&bs.wi) / bs.pdf);
        if new_beta.is_black() || new_beta.has_nans() {
            self.terminate(&path, &radiance);
            return Ok(output);
        }

        // Russian roulette.
        if path.depth + 1 > self.params.min_depth && new_beta.y() < self.params.rr_threshold {
            if rng.uniform_float() >= self.params.rr_cont_prob {
                self.terminate(&path, &radiance);
                return Ok(output);
            }
            new_beta /= self.params.rr_cont_prob;
        }

        let slot = active_state_counter.fetch_add(1, Ordering::AcqRel);
        if slot >= capacity {
            return Err(Error::ResourceExhausted {
                requested: slot + 1,
                capacity,
            });
        }

        let next_ray = sp.spawn_ray(&bs.wi).with_mask(path.ray_mask);
        output.next = Some((
            slot,
            PathRecord {
                pixel_coord: path.pixel_coord,
                ray_o: next_ray.o,
                ray_d: next_ray.d,
                ray_time: next_ray.time,
                ray_t1: next_ray.t_max,
                ray_mask: next_ray.mask,
                medium_id: instance.medium_towards(&sp, &bs.wi),
                beta: new_beta,
                beta_le: new_beta,
                bsdf_pdf: if bs.is_delta { -1.0 } else { bs.pdf },
                depth: path.depth + 1,
                rng,
                path_radiance: radiance,
            },
        ));
        Ok(output)
    }

    /// Splats a finished path.
    fn terminate(&self, path: &PathRecord, radiance: &Spectrum) {
        self.film.splat_radiance(&path.pixel_coord, radiance);
        self.film.splat_weight(&path.pixel_coord, 1.0);
    }

    /// Returns the MIS weight of emission found by BSDF sampling.
    fn emission_weight(&self, path: &PathRecord, light_index: usize, pdf_li: Float) -> Float {
        if path.bsdf_pdf < 0.0 {
            1.0
        } else {
            let light_pdf = self.scene.light_sampler.pdf(&path.ray_o, path.ray_time, light_index) * pdf_li;
            power_heuristic(path.bsdf_pdf, light_pdf)
        }
    }

    /// Returns the environment emission reaching an escaped path.
    fn envir_emission(&self, path: &PathRecord, beta_le: &Spectrum) -> Result<Spectrum> {
        if self.envir_light.is_empty() {
            return Ok(Spectrum::zero());
        }
        let light = self.envir_light.case(0)?;
        let le = light.eval_le(&path.ray_d);
        if le.is_black() {
            return Ok(Spectrum::zero());
        }
        let w = self.emission_weight(path, self.area_light_count, light.pdf_li(&path.ray_d));
        Ok(*beta_le * le * w)
    }

    /// Returns the emission of an area light hit by a path.
    fn area_emission(
        &self,
        path: &PathRecord,
        beta_le: &Spectrum,
        light_id: u32,
        sp: &SurfacePoint,
        wo: &Vector3f,
    ) -> Result<Spectrum> {
        let light = self.area_lights.case(light_id)?;
        let le = light.eval_le(sp, wo);
        if le.is_black() {
            return Ok(Spectrum::zero());
        }
        let w = self.emission_weight(path, light_id as usize, light.pdf_li(&path.ray_o, sp));
        Ok(*beta_le * le * w)
    }

    /// Samples a light and returns the shadow ray carrying its contribution,
    /// or `None` if it contributes nothing.
    #[allow(clippy::too_many_arguments)]
    fn sample_light(
        &self,
        path: &PathRecord,
        beta: &Spectrum,
        sp: &SurfacePoint,
        instance: &Instance,
        material: &CompiledMaterial,
        wo: &Vector3f,
        rng: &mut RNG,
    ) -> Result<Option<ShadowRecord>> {
        let u_select = rng.uniform_float();
        let u_prim = rng.uniform_float();
        let u = rng.uniform_2d();

        let selection = match self.scene.light_sampler.sample(&sp.p, path.ray_time, u_select) {
            Some(selection) => selection,
            None => return Ok(None),
        };

        let sample = if selection.index < self.area_light_count {
            self.area_lights.case(selection.index as u32)?.sample_li(sp, u_prim, &u)
        } else {
            self.envir_light.case((selection.index - self.area_light_count) as u32)?.sample_li(&u)
        };
        let ls = match sample {
            Some(ls) if ls.pdf > 0.0 && !ls.li.is_black() => ls,
            _ => return Ok(None),
        };

        let f = material.eval_radiance(sp, wo, &ls.wi);
        if f.is_black() {
            return Ok(None);
        }

        let light_pdf = selection.pdf * ls.pdf;
        let bsdf_pdf = material.pdf_radiance(sp, wo, &ls.wi);
        let w = power_heuristic(light_pdf, bsdf_pdf);
        let beta_li = *beta * f * ls.li * (sp.n.abs_dot(&ls.wi) * w / light_pdf);
        if beta_li.is_black() || beta_li.has_nans() {
            return Ok(None);
        }

        let ray = sp.spawn_ray(&ls.wi);
        let t1 = if ls.distance.is_infinite() {
            INFINITY
        } else {
            ls.distance * (1.0 - SHADOW_EPSILON)
        };
        Ok(Some(ShadowRecord {
            pixel_coord: path.pixel_coord,
            ray_o: ray.o,
            ray_d: ray.d,
            ray_time: path.ray_time,
            ray_t1: t1,
            ray_mask: path.ray_mask,
            medium_id: instance.medium_towards(sp, &ls.wi),
            beta_li,
            rng: RNG::new(rng.uniform_u64()),
        }))
    }
}
