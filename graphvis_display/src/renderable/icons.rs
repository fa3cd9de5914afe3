/// Icons - one point sprite per node
///
/// The vertex carries the background colour, the icon atlas indices, a flag
/// word and the node index. The node's position comes from the shared
/// position buffer; the geometry shader expands the point into a quad.

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
use crate::task::{ChangeSet, UpdateTask, VertexSnapshot};
use crate::visual::{NodeVisual, VisualAccess};

/// Opacity of dimmed icons
pub const DIMMED_OPACITY: f32 = 0.25;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct IconVertex {
    pub background_colour: [f32; 4],
    /// foreground icon, background icon, flags, node index
    pub data: [i32; 4],
}

pub type IconsManager = ResourceManager<IconVertex, ModelViewUniform, ProjectionUniform, OpacityUniform>;

pub fn icons_desc() -> RenderableDesc {
    RenderableDesc {
        name: "icons",
        vertex_layout: VertexLayout::packed(&[
            BufferFormat::R32G32B32A32_SFLOAT,
            BufferFormat::R32G32B32A32_SINT,
        ]),
        topology: PrimitiveTopology::PointList,
        vertex_shader: "icons.vert",
        geometry_shader: Some("icons.geom"),
        fragment_shader: "icons.frag",
        positions_stages: Some(ShaderStageFlags::VERTEX),
        push_constants: None,
        blend: BlendMode::AlphaBlend,
        depth_test: true,
    }
}

pub struct Icons {
    pub(crate) manager: IconsManager,
}

impl Icons {
    pub fn new(context: Arc<DeviceContext>, config: &DisplayConfig) -> Self {
        let mut manager = ResourceManager::new(icons_desc(), context, config).with_geometry_hook(apply_projection);
        manager.set_fragment_uniform(OpacityUniform::new(DIMMED_OPACITY));
        Self { manager }
    }

    pub fn manager(&self) -> &IconsManager {
        &self.manager
    }
}

delegate_renderable!(Icons);

pub fn icon_vertex(node: &NodeVisual, index: usize) -> IconVertex {
    IconVertex {
        background_colour: node.colour.to_array(),
        data: [
            node.foreground_icon as i32,
            node.background_icon as i32,
            element_flags(node.visibility, node.selected, node.dimmed),
            index as i32,
        ],
    }
}

/// Snapshot icon vertices for the changed nodes
pub fn task_icons_vertices(access: &dyn VisualAccess, change: ChangeSet) -> UpdateTask<Icons> {
    let snapshot = VertexSnapshot::build(change, access.node_count(), |i| icon_vertex(&access.node(i), i));
    let label = if snapshot.is_rebuild() { "icons: rebuild vertices" } else { "icons: update vertices" };
    UpdateTask::new(label, move |icons: &mut Icons| icons.manager.commit_vertices(snapshot))
}

pub fn task_icons_camera(access: &dyn VisualAccess) -> UpdateTask<Icons> {
    let uniform = ModelViewUniform::from_camera(&access.camera());
    UpdateTask::new("icons: camera", move |icons: &mut Icons| {
        icons.manager.set_vertex_uniform(uniform);
        Ok(())
    })
}

pub fn task_icons_highlight(access: &dyn VisualAccess) -> UpdateTask<Icons> {
    let colour = access.highlight_colour();
    UpdateTask::new("icons: highlight colour", move |icons: &mut Icons| {
        icons.manager.modify_geometry_uniform(|uniform| uniform.set_highlight_colour(colour));
        Ok(())
    })
}
