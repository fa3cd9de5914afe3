//! Camera module - view and projection parameters.
//!
//! Passive data containers: they build matrices with `glam` and hold no GPU
//! state. Renderables receive camera matrices through update tasks.

mod camera;

pub use camera::{Camera, Projection};
