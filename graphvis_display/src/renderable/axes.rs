/// Axes - orientation gizmo drawn in a corner of the display
///
/// Six fixed vertices (one coloured line per axis). Only the rotation part of
/// the camera reaches the gizmo, so it turns with the view but never moves.

use std::sync::Arc;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};

use crate::graphics_device::{BlendMode, BufferFormat, PrimitiveTopology, VertexLayout};
use crate::renderable::renderable::delegate_renderable;
use crate::renderable::{RenderableDesc, ResourceManager};
use crate::renderer::DisplayConfig;
use crate::resource::DeviceContext;
use crate::task::{UpdateTask, VertexSnapshot};
use crate::visual::VisualAccess;

pub const AXES_VERTEX_COUNT: usize = 6;

/// Gizmo centre in clip space (bottom-left corner, y points down)
const GIZMO_CENTRE: Vec3 = Vec3::new(-0.85, 0.85, 0.5);
const GIZMO_SCALE: f32 = 0.1;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct AxesVertex {
    pub position: [f32; 3],
    pub colour: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct AxesUniform {
    pub mvp: Mat4,
}

pub type AxesManager = ResourceManager<AxesVertex, AxesUniform, (), ()>;

pub fn axes_desc() -> RenderableDesc {
    RenderableDesc {
        name: "axes",
        vertex_layout: VertexLayout::packed(&[
            BufferFormat::R32G32B32_SFLOAT,
            BufferFormat::R32G32B32A32_SFLOAT,
        ]),
        topology: PrimitiveTopology::LineList,
        vertex_shader: "axes.vert",
        geometry_shader: None,
        fragment_shader: "axes.frag",
        positions_stages: None,
        push_constants: None,
        blend: BlendMode::Opaque,
        depth_test: false,
    }
}

pub struct Axes {
    pub(crate) manager: AxesManager,
}

impl Axes {
    pub fn new(context: Arc<DeviceContext>, config: &DisplayConfig) -> Self {
        Self {
            manager: ResourceManager::new(axes_desc(), context, config),
        }
    }

    pub fn manager(&self) -> &AxesManager {
        &self.manager
    }
}

delegate_renderable!(Axes);

/// X red, Y green, Z blue, each from the origin to the unit point
pub fn axes_vertices() -> Vec<AxesVertex> {
    let axes = [
        (Vec3::X, [1.0, 0.0, 0.0, 1.0]),
        (Vec3::Y, [0.0, 1.0, 0.0, 1.0]),
        (Vec3::Z, [0.0, 0.0, 1.0, 1.0]),
    ];
    axes.iter()
        .flat_map(|&(tip, colour)| {
            [
                AxesVertex { position: [0.0; 3], colour },
                AxesVertex { position: tip.to_array(), colour },
            ]
        })
        .collect()
}

/// Clip-space transform of the gizmo for a camera orientation
pub fn gizmo_matrix(rotation: Quat) -> Mat4 {
    Mat4::from_translation(GIZMO_CENTRE) * Mat4::from_scale(Vec3::splat(GIZMO_SCALE)) * Mat4::from_quat(rotation)
}

pub fn task_axes_vertices() -> UpdateTask<Axes> {
    let vertices = axes_vertices();
    UpdateTask::new("axes: vertices", move |axes: &mut Axes| {
        axes.manager.commit_vertices(VertexSnapshot::Rebuild(vertices))
    })
}

pub fn task_axes_camera(access: &dyn VisualAccess) -> UpdateTask<Axes> {
    let uniform = AxesUniform { mvp: gizmo_matrix(access.camera().rotation()) };
    UpdateTask::new("axes: camera", move |axes: &mut Axes| {
        axes.manager.set_vertex_uniform(uniform);
        Ok(())
    })
}
