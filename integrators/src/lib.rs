//! Integrators

#[macro_use]
extern crate log;

mod wavefront;

// Re-export.
pub use wavefront::*;
