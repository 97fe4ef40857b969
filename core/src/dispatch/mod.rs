//! Dispatch
//!
//! Calls on scene objects whose concrete types are only known once the scene
//! is loaded are lowered to a switch over the object's integer id. Every
//! object is lowered once per kernel through a `CompileContext`, which
//! records one function per distinct `(object, action)` pair. The lowered
//! cases are collected by a `SwitchBuilder` into a `Switch` whose default
//! branch is fatal.

mod compile_context;
mod switch;

// Re-export
pub use compile_context::*;
pub use switch::*;
