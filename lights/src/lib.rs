//! Lights

#[macro_use]
extern crate log;

mod diffuse;
mod gradient_sky;
mod uniform_sky;

// Re-export
pub use diffuse::*;
pub use gradient_sky::*;
pub use uniform_sky::*;
