//! Materials

#[macro_use]
extern crate log;

mod black;
mod common;
mod diffuse;
mod glass;
mod mirror;

// Re-export
pub use black::*;
pub use common::*;
pub use diffuse::*;
pub use glass::*;
pub use mirror::*;
