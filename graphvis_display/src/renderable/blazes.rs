/// Blazes - pointer markers next to blazed nodes
///
/// Only blazed nodes get a vertex, so any change moves every later vertex:
/// blazes are always rebuilt in full.

use std::sync::Arc;
use bytemuck::{Pod, Zeroable};

use crate::graphics_device::{BlendMode, BufferFormat, PrimitiveTopology, ShaderStageFlags, VertexLayout};
use crate::renderable::renderable::delegate_renderable;
use crate::renderable::uniforms::{
    apply_projection, element_flags, ModelViewUniform, OpacityUniform, ProjectionUniform,
};
use crate::renderable::{RenderableDesc, ResourceManager};
use crate::renderer::DisplayConfig;
use crate::resource::DeviceContext;
use crate::task::{UpdateTask, VertexSnapshot};
use crate::visual::VisualAccess;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BlazeVertex {
    pub colour: [f32; 4],
    /// node index, angle in degrees, flags, unused
    pub data: [i32; 4],
}

pub type BlazesManager = ResourceManager<BlazeVertex, ModelViewUniform, ProjectionUniform, OpacityUniform>;

pub fn blazes_desc() -> RenderableDesc {
    RenderableDesc {
        name: "blazes",
        vertex_layout: VertexLayout::packed(&[
            BufferFormat::R32G32B32A32_SFLOAT,
            BufferFormat::R32G32B32A32_SINT,
        ]),
        topology: PrimitiveTopology::PointList,
        vertex_shader: "blazes.vert",
        geometry_shader: Some("blazes.geom"),
        fragment_shader: "blazes.frag",
        positions_stages: Some(ShaderStageFlags::VERTEX),
        push_constants: None,
        blend: BlendMode::AlphaBlend,
        depth_test: true,
    }
}

pub struct Blazes {
    pub(crate) manager: BlazesManager,
}

impl Blazes {
    pub fn new(context: Arc<DeviceContext>, config: &DisplayConfig) -> Self {
        Self {
            manager: ResourceManager::new(blazes_desc(), context, config).with_geometry_hook(apply_projection),
        }
    }

    pub fn manager(&self) -> &BlazesManager {
        &self.manager
    }
}

delegate_renderable!(Blazes);

/// Vertices of every blazed node, in node order
pub fn blaze_vertices(access: &dyn VisualAccess) -> Vec<BlazeVertex> {
    (0..access.node_count())
        .filter_map(|index| {
            let node = access.node(index);
            node.blaze.map(|blaze| BlazeVertex {
                colour: blaze.colour.to_array(),
                data: [
                    index as i32,
                    blaze.angle_degrees.round() as i32,
                    element_flags(node.visibility, node.selected, node.dimmed),
                    0,
                ],
            })
        })
        .collect()
}

pub fn task_blazes_vertices(access: &dyn VisualAccess) -> UpdateTask<Blazes> {
    let vertices = blaze_vertices(access);
    UpdateTask::new("blazes: rebuild vertices", move |blazes: &mut Blazes| {
        blazes.manager.commit_vertices(VertexSnapshot::Rebuild(vertices))
    })
}

/// Blaze size (geometry scale) and opacity (fragment)
pub fn task_blazes_style(access: &dyn VisualAccess) -> UpdateTask<Blazes> {
    let size = access.blaze_size();
    let opacity = OpacityUniform::new(access.blaze_opacity());
    UpdateTask::new("blazes: style", move |blazes: &mut Blazes| {
        blazes.manager.modify_geometry_uniform(|uniform| uniform.set_scale(size));
        blazes.manager.set_fragment_uniform(opacity);
        Ok(())
    })
}

pub fn task_blazes_camera(access: &dyn VisualAccess) -> UpdateTask<Blazes> {
    let uniform = ModelViewUniform::from_camera(&access.camera());
    UpdateTask::new("blazes: camera", move |blazes: &mut Blazes| {
        blazes.manager.set_vertex_uniform(uniform);
        Ok(())
    })
}
