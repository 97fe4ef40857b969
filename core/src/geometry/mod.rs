//! Geometry

// Define macros for property based testing.
#[cfg(test)]
macro_rules! prop_vector3 {
    ($name: ident, $t: ty, $xr: expr, $yr: expr, $zr: expr) => {
        prop_compose! {
            fn $name()(x in $xr, y in $yr, z in $zr) -> Vector3<$t> {
                Vector3 { x, y, z }
            }
        }
    };
}

mod bounds3;
mod common;
mod frame;
mod ray;
mod transform;
mod vector2;
mod vector3;

// Re-export
pub use crate::math::*;
pub use bounds3::*;
pub use common::*;
pub use frame::*;
pub use ray::*;
pub use transform::*;
pub use vector2::*;
pub use vector3::*;
