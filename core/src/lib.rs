//! Core
//!
//! Data types, plug-in interfaces and device plumbing shared by the
//! wavefront path tracer and its plug-ins.

#[macro_use]
extern crate hexf;
#[macro_use]
extern crate log;

// Re-export.
pub mod camera;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod film;
pub mod geometry;
pub mod image_io;
pub mod interaction;
pub mod light;
pub mod material;
pub mod math;
pub mod medium;
pub mod parallel;
pub mod renderer;
pub mod reporter;
pub mod rng;
pub mod sampling;
pub mod scene;
pub mod shape;
pub mod spectrum;
pub mod texture;
pub mod traversal;
