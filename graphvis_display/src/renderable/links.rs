/// Links - straight lines between the endpoints of every connection
///
/// Connection `c` owns vertices `2c` (low end) and `2c + 1` (high end), so a
/// change to connections `first..=last` touches vertices `2 * first` to
/// `2 * last + 1` and can be copied in place. Loops keep their vertex pair
/// but are emitted invisible; the loops renderable draws them.
///
/// The model-view matrix and the global connection opacity travel as push
/// constants rather than a vertex uniform.

use std::sync::Arc;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::error::Result;
use crate::graphics_device::{
    BlendMode, BufferFormat, PrimitiveTopology, PushConstantRange, ShaderStageFlags, VertexLayout,
};
use crate::renderable::renderable::delegate_renderable;
use crate::renderable::uniforms::{apply_projection, element_flags, flags, ProjectionUniform};
use crate::renderable::{RenderableDesc, ResourceManager};
use crate::renderer::DisplayConfig;
use crate::resource::DeviceContext;
use crate::task::{ChangeSet, UpdateTask, VertexSnapshot};
use crate::visual::{ConnectionVisual, VisualAccess};

/// Vertex of one connection endpoint, shared with loops
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ConnectionVertex {
    pub colour: [f32; 4],
    /// width, visibility, unused, unused
    pub params: [f32; 4],
    /// node index, flags, line style, connection index
    pub data: [i32; 4],
}

impl ConnectionVertex {
    pub fn node_index(&self) -> usize {
        self.data[0] as usize
    }

    pub fn is_visible(&self) -> bool {
        self.data[1] & flags::VISIBLE != 0
    }
}

pub fn connection_layout() -> VertexLayout {
    VertexLayout::packed(&[
        BufferFormat::R32G32B32A32_SFLOAT,
        BufferFormat::R32G32B32A32_SFLOAT,
        BufferFormat::R32G32B32A32_SINT,
    ])
}

/// Vertex for one end of `connection`
pub fn connection_vertex(connection: &ConnectionVisual, index: usize, node: usize) -> ConnectionVertex {
    let mut bits = element_flags(connection.visibility, connection.selected, connection.dimmed);
    if connection.directed {
        bits |= flags::DIRECTED;
    }
    ConnectionVertex {
        colour: connection.colour.to_array(),
        params: [connection.width, connection.visibility, 0.0, 0.0],
        data: [node as i32, bits, connection.line_style.code() as i32, index as i32],
    }
}

/// Push constant block of the links pipeline
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LinkPushConstants {
    pub model_view: Mat4,
    /// opacity, unused, unused, unused
    pub params: [f32; 4],
}

pub const LINK_PUSH_CONSTANTS: PushConstantRange = PushConstantRange {
    stages: ShaderStageFlags::VERTEX.union(ShaderStageFlags::GEOMETRY),
    offset: 0,
    size: std::mem::size_of::<LinkPushConstants>() as u32,
};

pub type LinksManager = ResourceManager<ConnectionVertex, (), ProjectionUniform, ()>;

pub fn links_desc() -> RenderableDesc {
    RenderableDesc {
        name: "links",
        vertex_layout: connection_layout(),
        topology: PrimitiveTopology::LineList,
        vertex_shader: "links.vert",
        geometry_shader: Some("links.geom"),
        fragment_shader: "links.frag",
        positions_stages: Some(ShaderStageFlags::VERTEX),
        push_constants: Some(LINK_PUSH_CONSTANTS),
        blend: BlendMode::AlphaBlend,
        depth_test: true,
    }
}

pub struct Links {
    pub(crate) manager: LinksManager,
    push_constants: LinkPushConstants,
}

impl Links {
    pub fn new(context: Arc<DeviceContext>, config: &DisplayConfig) -> Self {
        Self {
            manager: ResourceManager::new(links_desc(), context, config).with_geometry_hook(apply_projection),
            push_constants: LinkPushConstants {
                model_view: Mat4::IDENTITY,
                params: [1.0, 0.0, 0.0, 0.0],
            },
        }
    }

    pub fn manager(&self) -> &LinksManager {
        &self.manager
    }

    pub fn push_constants(&self) -> &LinkPushConstants {
        &self.push_constants
    }

    fn update_push_constants<F: FnOnce(&mut LinkPushConstants)>(&mut self, modify: F) -> Result<()> {
        modify(&mut self.push_constants);
        self.manager.set_push_constants(&self.push_constants)
    }
}

delegate_renderable!(Links);

/// Vertex range of a connection change
pub fn vertex_change(change: ChangeSet) -> ChangeSet {
    match change {
        ChangeSet::Full => ChangeSet::Full,
        ChangeSet::Range { first, last } => ChangeSet::range(2 * first, 2 * last + 1),
    }
}

fn link_vertex(access: &dyn VisualAccess, vertex: usize) -> ConnectionVertex {
    let index = vertex / 2;
    let connection = access.connection(index);
    let node = if vertex % 2 == 0 { connection.low } else { connection.high };
    let mut link = connection_vertex(&connection, index, node);
    if connection.is_loop() {
        link.params[1] = 0.0;
        link.data[1] &= !flags::VISIBLE;
    }
    link
}

pub fn task_links_vertices(access: &dyn VisualAccess, change: ChangeSet) -> UpdateTask<Links> {
    let count = 2 * access.connection_count();
    let snapshot = VertexSnapshot::build(vertex_change(change), count, |v| link_vertex(access, v));
    let label = if snapshot.is_rebuild() { "links: rebuild vertices" } else { "links: update vertices" };
    UpdateTask::new(label, move |links: &mut Links| links.manager.commit_vertices(snapshot))
}

pub fn task_links_camera(access: &dyn VisualAccess) -> UpdateTask<Links> {
    let model_view = access.camera().view_matrix();
    UpdateTask::new("links: camera", move |links: &mut Links| {
        links.update_push_constants(|push| push.model_view = model_view)
    })
}

pub fn task_links_opacity(access: &dyn VisualAccess) -> UpdateTask<Links> {
    let opacity = access.connection_opacity().clamp(0.0, 1.0);
    UpdateTask::new("links: opacity", move |links: &mut Links| {
        links.update_push_constants(|push| push.params[0] = opacity)
    })
}

pub fn task_links_highlight(access: &dyn VisualAccess) -> UpdateTask<Links> {
    let colour = access.highlight_colour();
    UpdateTask::new("links: highlight colour", move |links: &mut Links| {
        links.manager.modify_geometry_uniform(|uniform| uniform.set_highlight_colour(colour));
        Ok(())
    })
}
