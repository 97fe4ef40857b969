//! Sort Pipeline

use super::path_state::*;

/// Reserved reordering stage. Active paths keep the order Shade produced.
#[derive(Copy, Clone, Debug, Default)]
pub struct SortPipeline;

impl SortPipeline {
    /// Create a new `SortPipeline`.
    pub fn new() -> Self {
        Self
    }

    /// Leaves the active list untouched.
    ///
    /// * `active_count` - Number of active paths.
    /// * `_soa`         - Path state.
    pub fn sort(&self, active_count: usize, _soa: &mut PathState) {
        trace!("Sort stage skipped for {} paths", active_count);
    }
}
