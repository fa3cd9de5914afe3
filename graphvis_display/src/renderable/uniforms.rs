/// Uniform payloads shared by several renderable kinds
///
/// All `#[repr(C)]` and laid out in 16-byte columns so the std140 shader
/// blocks read them without extra padding.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

use crate::camera::{Camera, Projection};
use crate::graphics_device::SwapchainInfo;

/// Vertex-stage model-view block
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ModelViewUniform {
    pub model_view: Mat4,
    /// morph mix, visibility low, visibility high, unused
    pub params: [f32; 4],
}

impl ModelViewUniform {
    pub fn from_camera(camera: &Camera) -> Self {
        Self {
            model_view: camera.view_matrix(),
            params: [0.0, 0.0, 1.0, 0.0],
        }
    }
}

/// Geometry-stage projection block
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ProjectionUniform {
    pub projection: Mat4,
    pub highlight_colour: [f32; 4],
    /// pixel density, element scale, unused, unused
    pub params: [f32; 4],
}

impl ProjectionUniform {
    pub fn pixel_density(&self) -> f32 {
        self.params[0]
    }

    pub fn set_highlight_colour(&mut self, colour: Vec4) {
        self.highlight_colour = colour.to_array();
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.params[1] = scale;
    }
}

/// Geometry hook recomputing the projection block for a new swapchain
///
/// Pixel density is the number of pixels covering one world unit at unit
/// distance from the eye.
pub fn apply_projection(uniform: &mut ProjectionUniform, swapchain: &SwapchainInfo, projection: &Projection) {
    uniform.projection = projection.matrix(swapchain.aspect_ratio());
    let half_fov = (projection.fov_y_radians * 0.5).tan();
    uniform.params[0] = if half_fov > 0.0 {
        swapchain.height as f32 * 0.5 / half_fov
    } else {
        0.0
    };
}

/// Fragment-stage opacity block
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct OpacityUniform {
    /// opacity, unused, unused, unused
    pub params: [f32; 4],
}

impl OpacityUniform {
    pub fn new(opacity: f32) -> Self {
        Self { params: [opacity.clamp(0.0, 1.0), 0.0, 0.0, 0.0] }
    }

    pub fn opacity(&self) -> f32 {
        self.params[0]
    }
}

/// Per-vertex flag bits shared by the element shaders
pub mod flags {
    pub const VISIBLE: i32 = 1 << 0;
    pub const SELECTED: i32 = 1 << 1;
    pub const DIMMED: i32 = 1 << 2;
    pub const DIRECTED: i32 = 1 << 3;
}

/// Flag word for an element
pub fn element_flags(visibility: f32, selected: bool, dimmed: bool) -> i32 {
    let mut bits = 0;
    if visibility > 0.0 {
        bits |= flags::VISIBLE;
    }
    if selected {
        bits |= flags::SELECTED;
    }
    if dimmed {
        bits |= flags::DIMMED;
    }
    bits
}

#[cfg(test)]
#[path = "uniforms_tests.rs"]
mod tests;
