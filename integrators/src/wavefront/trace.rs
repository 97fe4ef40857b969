//! Trace Pipeline

use super::path_state::*;
use wavefront_core::device::*;
use wavefront_core::error::*;
use wavefront_core::traversal::*;

/// Finds the closest hit of every active path.
pub struct TracePipeline {
    /// The acceleration structure.
    traversal: ArcTraversal,

    /// Whether rays are traced at their own time; otherwise at time 0.
    has_motion_blur: bool,

    /// Whether every instance is a triangle mesh.
    triangle_only: bool,
}

impl TracePipeline {
    /// Create a new `TracePipeline`.
    ///
    /// * `traversal`       - The acceleration structure.
    /// * `has_motion_blur` - Whether rays carry distinct times.
    /// * `triangle_only`   - Whether every instance is a triangle mesh.
    pub fn new(traversal: ArcTraversal, has_motion_blur: bool, triangle_only: bool) -> Self {
        debug!(
            "Trace pipeline with motion blur {}, triangle only {}",
            has_motion_blur, triangle_only
        );
        Self {
            traversal,
            has_motion_blur,
            triangle_only,
        }
    }

    /// Returns true if rays are traced at their own time.
    pub fn has_motion_blur(&self) -> bool {
        self.has_motion_blur
    }

    /// Returns true if every instance is a triangle mesh.
    pub fn triangle_only(&self) -> bool {
        self.triangle_only
    }

    /// Writes the intersection of each active path into its slot.
    ///
    /// * `device`       - Device to launch on.
    /// * `active_count` - Number of active paths.
    /// * `soa`          - Path state.
    pub fn trace(&self, device: &Device, active_count: usize, soa: &mut PathState) -> Result<()> {
        let state: &PathState = soa;
        let hits = device.launch("trace", active_count, |i| {
            let s = state.active_state_indices[i] as usize;
            let mut ray = state.current.read(s).ray();
            if !self.has_motion_blur {
                ray.time = 0.0;
            }
            let inct = match self.traversal.trace(&ray) {
                Some(hit) => (hit.t, pack_inct_uv_id(&hit)),
                None => (INCT_T_MISS, [0; 4]),
            };
            Ok((s, inct, state.current.medium_id[s]))
        })?;

        for (s, (t, uv_id), medium_id) in hits {
            soa.inct_t[s] = t;
            soa.inct_uv_id[s] = uv_id;
            soa.inct_medium_id[s] = medium_id;
        }
        Ok(())
    }
}
