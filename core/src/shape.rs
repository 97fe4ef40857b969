//! Shape

use crate::geometry::*;
use crate::interaction::SurfacePoint;
use std::sync::Arc;

/// A point sampled on a shape.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ShapeSample {
    /// Sampled position.
    pub p: Point3f,

    /// Geometric normal at `p`.
    pub n: Normal3f,

    /// Density with respect to area.
    pub pdf: Float,
}

/// Geometry made of one or more primitives that the acceleration structure
/// intersects one at a time.
pub trait Shape: Send + Sync {
    /// Returns the number of primitives.
    fn prim_count(&self) -> usize;

    /// Returns the world space bounds of a primitive.
    ///
    /// * `prim` - Primitive index.
    fn prim_bounds(&self, prim: u32) -> Bounds3f;

    /// Returns the world space bounds of the shape.
    fn bounds(&self) -> Bounds3f {
        (0..self.prim_count() as u32)
            .map(|p| self.prim_bounds(p))
            .fold(Bounds3f::empty(), |b, pb| b.union(&pb))
    }

    /// Intersects a primitive with a ray and returns the hit distance and
    /// parametric coordinates.
    ///
    /// * `prim` - Primitive index.
    /// * `ray`  - The ray.
    fn intersect_prim(&self, prim: u32, ray: &Ray) -> Option<(Float, Point2f)>;

    /// Reconstructs the surface point from parametric coordinates. The ids
    /// and time are left for the caller to fill in.
    ///
    /// * `prim` - Primitive index.
    /// * `uv`   - Parametric coordinates returned by `intersect_prim`.
    fn surface_point(&self, prim: u32, uv: &Point2f) -> SurfacePoint;

    /// Returns the total surface area.
    fn area(&self) -> Float;

    /// Samples a point uniformly by area.
    ///
    /// * `u_prim` - Sample used to pick a primitive.
    /// * `u`      - Sample used to pick a point on the primitive.
    fn sample(&self, u_prim: Float, u: &Point2f) -> ShapeSample;

    /// Returns the area density of `sample`.
    fn pdf(&self) -> Float {
        1.0 / self.area()
    }

    /// Returns true if the shape is a triangle mesh.
    fn is_triangle_mesh(&self) -> bool {
        false
    }
}

/// Atomic reference counted `Shape`.
pub type ArcShape = Arc<dyn Shape>;
