//! Participating Media

#[macro_use]
extern crate log;

mod homogeneous;

// Re-export
pub use homogeneous::*;
