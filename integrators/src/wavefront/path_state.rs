//! Path State
//!
//! Structure-of-arrays storage for every path in flight. Two generations are
//! kept: stages read the current one and Shade writes survivors into the
//! next one, which becomes current after `next_iteration`.

use std::mem::swap;
use wavefront_core::geometry::*;
use wavefront_core::rng::RNG;
use wavefront_core::spectrum::*;
use wavefront_core::traversal::TraversalHit;

/// Hit distance recorded for rays that escaped the scene.
pub const INCT_T_MISS: Float = -1.0;

/// Packed intersection identifier: `[u bits, v bits, instance id, primitive id]`.
pub type InctUvId = [u32; 4];

/// Packs a traversal hit into an `InctUvId`.
///
/// * `hit` - The hit.
pub fn pack_inct_uv_id(hit: &TraversalHit) -> InctUvId {
    [
        float_to_bits(hit.uv.x),
        float_to_bits(hit.uv.y),
        hit.instance_id,
        hit.prim_id,
    ]
}

/// Unpacks an `InctUvId` into parametric coordinates, instance id and
/// primitive id.
///
/// * `id` - The packed identifier.
pub fn unpack_inct_uv_id(id: &InctUvId) -> (Point2f, u32, u32) {
    (Point2f::new(bits_to_float(id[0]), bits_to_float(id[1])), id[2], id[3])
}

/// One row of a path generation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PathRecord {
    /// Pixel the path contributes to.
    pub pixel_coord: Point2u,

    /// Ray origin.
    pub ray_o: Point3f,

    /// Ray direction.
    pub ray_d: Vector3f,

    /// Ray time.
    pub ray_time: Float,

    /// Ray termination distance.
    pub ray_t1: Float,

    /// Ray visibility mask.
    pub ray_mask: u32,

    /// Medium the ray travels through.
    pub medium_id: u32,

    /// Path throughput.
    pub beta: Spectrum,

    /// Throughput applied to emission found by the next hit.
    pub beta_le: Spectrum,

    /// Density of the sampled direction of the previous bounce; negative at
    /// the camera vertex and after delta bounces.
    pub bsdf_pdf: Float,

    /// Number of bounces so far.
    pub depth: u32,

    /// Random number generator of the path.
    pub rng: RNG,

    /// Radiance gathered so far.
    pub path_radiance: Spectrum,
}

impl PathRecord {
    /// Returns the ray stored in the record.
    pub fn ray(&self) -> Ray {
        Ray {
            o: self.ray_o,
            d: self.ray_d,
            t_min: 0.0,
            t_max: self.ray_t1,
            time: self.ray_time,
            mask: self.ray_mask,
        }
    }
}

/// One generation of path records stored column by column.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathGeneration {
    pub pixel_coord: Vec<Point2u>,
    pub ray_o: Vec<Point3f>,
    pub ray_d: Vec<Vector3f>,
    pub ray_time: Vec<Float>,
    pub ray_t1: Vec<Float>,
    pub ray_mask: Vec<u32>,
    pub medium_id: Vec<u32>,
    pub beta: Vec<Spectrum>,
    pub beta_le: Vec<Spectrum>,
    pub bsdf_pdf: Vec<Float>,
    pub depth: Vec<u32>,
    pub rng: Vec<RNG>,
    pub path_radiance: Vec<Spectrum>,
}

impl PathGeneration {
    /// Allocates `capacity` rows.
    ///
    /// * `capacity` - Number of rows.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pixel_coord: vec![Point2u::default(); capacity],
            ray_o: vec![Point3f::zero(); capacity],
            ray_d: vec![Vector3f::zero(); capacity],
            ray_time: vec![0.0; capacity],
            ray_t1: vec![0.0; capacity],
            ray_mask: vec![0; capacity],
            medium_id: vec![0; capacity],
            beta: vec![Spectrum::zero(); capacity],
            beta_le: vec![Spectrum::zero(); capacity],
            bsdf_pdf: vec![0.0; capacity],
            depth: vec![0; capacity],
            rng: vec![RNG::new(0); capacity],
            path_radiance: vec![Spectrum::zero(); capacity],
        }
    }

    /// Returns the number of rows.
    pub fn capacity(&self) -> usize {
        self.depth.len()
    }

    /// Gathers a row.
    ///
    /// * `slot` - Row index.
    pub fn read(&self, slot: usize) -> PathRecord {
        PathRecord {
            pixel_coord: self.pixel_coord[slot],
            ray_o: self.ray_o[slot],
            ray_d: self.ray_d[slot],
            ray_time: self.ray_time[slot],
            ray_t1: self.ray_t1[slot],
            ray_mask: self.ray_mask[slot],
            medium_id: self.medium_id[slot],
            beta: self.beta[slot],
            beta_le: self.beta_le[slot],
            bsdf_pdf: self.bsdf_pdf[slot],
            depth: self.depth[slot],
            rng: self.rng[slot],
            path_radiance: self.path_radiance[slot],
        }
    }

    /// Scatters a row.
    ///
    /// * `slot`   - Row index.
    /// * `record` - The row.
    pub fn write(&mut self, slot: usize, record: &PathRecord) {
        self.pixel_coord[slot] = record.pixel_coord;
        self.ray_o[slot] = record.ray_o;
        self.ray_d[slot] = record.ray_d;
        self.ray_time[slot] = record.ray_time;
        self.ray_t1[slot] = record.ray_t1;
        self.ray_mask[slot] = record.ray_mask;
        self.medium_id[slot] = record.medium_id;
        self.beta[slot] = record.beta;
        self.beta_le[slot] = record.beta_le;
        self.bsdf_pdf[slot] = record.bsdf_pdf;
        self.depth[slot] = record.depth;
        self.rng[slot] = record.rng;
        self.path_radiance[slot] = record.path_radiance;
    }
}

/// A shadow ray together with the contribution it carries if unoccluded.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ShadowRecord {
    /// Pixel the contribution is splatted to.
    pub pixel_coord: Point2u,

    /// Ray origin.
    pub ray_o: Point3f,

    /// Unit direction towards the light.
    pub ray_d: Vector3f,

    /// Ray time.
    pub ray_time: Float,

    /// Distance to the light; infinite for environment lights.
    pub ray_t1: Float,

    /// Ray visibility mask.
    pub ray_mask: u32,

    /// Medium the shadow ray travels through.
    pub medium_id: u32,

    /// Contribution computed before occlusion is known.
    pub beta_li: Spectrum,

    /// Random number generator for stochastic media.
    pub rng: RNG,
}

impl ShadowRecord {
    /// Returns the ray stored in the record.
    pub fn ray(&self) -> Ray {
        Ray {
            o: self.ray_o,
            d: self.ray_d,
            t_min: 0.0,
            t_max: self.ray_t1,
            time: self.ray_time,
            mask: self.ray_mask,
        }
    }
}

/// Shadow ray batch stored column by column.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShadowRays {
    pub pixel_coord: Vec<Point2u>,
    pub ray_o: Vec<Point3f>,
    pub ray_d: Vec<Vector3f>,
    pub ray_time: Vec<Float>,
    pub ray_t1: Vec<Float>,
    pub ray_mask: Vec<u32>,
    pub medium_id: Vec<u32>,
    pub beta_li: Vec<Spectrum>,
    pub rng: Vec<RNG>,
}

impl ShadowRays {
    /// Allocates `capacity` rows.
    ///
    /// * `capacity` - Number of rows.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pixel_coord: vec![Point2u::default(); capacity],
            ray_o: vec![Point3f::zero(); capacity],
            ray_d: vec![Vector3f::zero(); capacity],
            ray_time: vec![0.0; capacity],
            ray_t1: vec![0.0; capacity],
            ray_mask: vec![0; capacity],
            medium_id: vec![0; capacity],
            beta_li: vec![Spectrum::zero(); capacity],
            rng: vec![RNG::new(0); capacity],
        }
    }

    /// Gathers a row.
    ///
    /// * `slot` - Row index.
    pub fn read(&self, slot: usize) -> ShadowRecord {
        ShadowRecord {
            pixel_coord: self.pixel_coord[slot],
            ray_o: self.ray_o[slot],
            ray_d: self.ray_d[slot],
            ray_time: self.ray_time[slot],
            ray_t1: self.ray_t1[slot],
            ray_mask: self.ray_mask[slot],
            medium_id: self.medium_id[slot],
            beta_li: self.beta_li[slot],
            rng: self.rng[slot],
        }
    }

    /// Scatters a row.
    ///
    /// * `slot`   - Row index.
    /// * `record` - The row.
    pub fn write(&mut self, slot: usize, record: &ShadowRecord) {
        self.pixel_coord[slot] = record.pixel_coord;
        self.ray_o[slot] = record.ray_o;
        self.ray_d[slot] = record.ray_d;
        self.ray_time[slot] = record.ray_time;
        self.ray_t1[slot] = record.ray_t1;
        self.ray_mask[slot] = record.ray_mask;
        self.medium_id[slot] = record.medium_id;
        self.beta_li[slot] = record.beta_li;
        self.rng[slot] = record.rng;
    }
}

/// Every buffer the wavefront stages exchange data through.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathState {
    /// Generation the stages read.
    pub current: PathGeneration,

    /// Generation Shade writes survivors into.
    pub next: PathGeneration,

    /// Shadow rays produced by Shade.
    pub shadow: ShadowRays,

    /// Hit distance per slot, or `INCT_T_MISS`.
    pub inct_t: Vec<Float>,

    /// Packed hit identifier per slot.
    pub inct_uv_id: Vec<InctUvId>,

    /// Medium the traced segment travelled through per slot.
    pub inct_medium_id: Vec<u32>,

    /// Slots of the current generation that hold live paths.
    pub active_state_indices: Vec<u32>,

    /// Number of valid shadow rays.
    pub shadow_ray_count: usize,
}

impl PathState {
    /// Create an empty `PathState`; call `initialize` before use.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates every buffer for `capacity` paths.
    ///
    /// * `capacity` - Maximum number of paths in flight.
    pub fn initialize(&mut self, capacity: usize) {
        debug!("Allocating path state for {} paths", capacity);
        self.current = PathGeneration::with_capacity(capacity);
        self.next = PathGeneration::with_capacity(capacity);
        self.shadow = ShadowRays::with_capacity(capacity);
        self.inct_t = vec![INCT_T_MISS; capacity];
        self.inct_uv_id = vec![[0; 4]; capacity];
        self.inct_medium_id = vec![0; capacity];
        self.active_state_indices = Vec::with_capacity(capacity);
        self.shadow_ray_count = 0;
    }

    /// Returns the maximum number of paths in flight.
    pub fn capacity(&self) -> usize {
        self.current.capacity()
    }

    /// Resets the counters.
    pub fn clear(&mut self) {
        self.active_state_indices.clear();
        self.shadow_ray_count = 0;
    }

    /// Makes the next generation current. Its first `active_count` slots
    /// hold the surviving paths.
    ///
    /// * `active_count` - Number of surviving paths.
    pub fn next_iteration(&mut self, active_count: usize) {
        swap(&mut self.current, &mut self.next);
        self.active_state_indices.clear();
        self.active_state_indices.extend(0..active_count as u32);
        self.shadow_ray_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(depth: u32) -> PathRecord {
        PathRecord {
            pixel_coord: Point2u::new(3, 4),
            ray_o: Point3f::new(1.0, 2.0, 3.0),
            ray_d: Vector3f::new(0.0, 0.0, 1.0),
            ray_time: 0.5,
            ray_t1: INFINITY,
            ray_mask: RAY_MASK_ALL,
            medium_id: 7,
            beta: Spectrum::new(0.5),
            beta_le: Spectrum::new(0.25),
            bsdf_pdf: -1.0,
            depth,
            rng: RNG::new(depth as u64),
            path_radiance: Spectrum::zero(),
        }
    }

    #[test]
    fn next_iteration_swaps_generations() {
        let mut soa = PathState::new();
        soa.initialize(4);
        soa.next.write(0, &record(1));
        soa.next.write(1, &record(2));
        soa.shadow_ray_count = 3;

        soa.next_iteration(2);
        assert_eq!(soa.current.read(0), record(1));
        assert_eq!(soa.current.read(1), record(2));
        assert_eq!(soa.active_state_indices, vec![0, 1]);
        assert_eq!(soa.shadow_ray_count, 0);
        assert_eq!(soa.capacity(), 4);
    }

    #[test]
    fn clear_resets_counters() {
        let mut soa = PathState::new();
        soa.initialize(2);
        soa.active_state_indices.push(1);
        soa.shadow_ray_count = 1;
        soa.clear();
        assert!(soa.active_state_indices.is_empty());
        assert_eq!(soa.shadow_ray_count, 0);
    }

    #[test]
    fn inct_uv_id_round_trips_hits() {
        let hit = TraversalHit {
            t: 2.0,
            uv: Point2f::new(0.25, 0.75),
            instance_id: 5,
            prim_id: 9,
        };
        let (uv, instance_id, prim_id) = unpack_inct_uv_id(&pack_inct_uv_id(&hit));
        assert_eq!(uv, hit.uv);
        assert_eq!((instance_id, prim_id), (5, 9));
    }
}
