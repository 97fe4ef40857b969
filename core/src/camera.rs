//! Camera

use crate::geometry::*;
use crate::medium::VOID_MEDIUM;
use std::sync::Arc;

/// Camera interface.
pub trait Camera: Send + Sync {
    /// Returns a world space ray for a film coordinate. The sample offset
    /// within the pixel is already folded into `film_coord`.
    ///
    /// * `film_coord` - Film coordinate in `[0, 1]^2`, origin at the top left.
    /// * `time`       - Time of the ray.
    fn generate_ray(&self, film_coord: &Point2f, time: Float) -> Ray;

    /// Returns the id of the medium the camera sits in.
    fn medium_id(&self) -> u32 {
        VOID_MEDIUM
    }
}

/// Atomic reference counted `Camera`.
pub type ArcCamera = Arc<dyn Camera>;
