/// Node labels - one label anchor per node
///
/// The vertex names the labelled element and how many glyphs to draw; the
/// geometry shader lays the glyphs out from the glyph atlas. A glyph count of
/// zero hides the label.

use std::sync::Arc;
use bytemuck::{Pod, Zeroable};

use crate::graphics_device::{BlendMode, BufferFormat, PrimitiveTopology, ShaderStageFlags, VertexLayout};
use crate::renderable::renderable::delegate_renderable;
use crate::renderable::uniforms::{apply_projection, element_flags, ModelViewUniform, ProjectionUniform};
use crate::renderable::{RenderableDesc, ResourceManager};
use crate::renderer::DisplayConfig;
use crate::resource::DeviceContext;
use crate::task::{ChangeSet, UpdateTask, VertexSnapshot};
use crate::visual::{NodeVisual, VisualAccess};

/// Longest label drawn, in glyphs
pub const MAX_LABEL_GLYPHS: usize = 64;

/// Label anchor, shared by node and connection labels
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LabelVertex {
    /// scale, visibility, unused, unused
    pub glyph: [f32; 4],
    /// low element, high element, glyph count, flags
    pub data: [i32; 4],
}

impl LabelVertex {
    pub fn glyph_count(&self) -> usize {
        self.data[2] as usize
    }
}

pub type LabelsManager = ResourceManager<LabelVertex, ModelViewUniform, ProjectionUniform, ()>;

pub fn label_layout() -> VertexLayout {
    VertexLayout::packed(&[BufferFormat::R32G32B32A32_SFLOAT, BufferFormat::R32G32B32A32_SINT])
}

/// Glyphs to draw for a label: zero when hidden or empty
pub fn glyph_count(label: Option<&str>, visibility: f32) -> i32 {
    match label {
        Some(text) if visibility > 0.0 => text.chars().count().min(MAX_LABEL_GLYPHS) as i32,
        _ => 0,
    }
}

pub fn node_labels_desc() -> RenderableDesc {
    RenderableDesc {
        name: "node labels",
        vertex_layout: label_layout(),
        topology: PrimitiveTopology::PointList,
        vertex_shader: "node_labels.vert",
        geometry_shader: Some("labels.geom"),
        fragment_shader: "labels.frag",
        positions_stages: Some(ShaderStageFlags::VERTEX),
        push_constants: None,
        blend: BlendMode::AlphaBlend,
        depth_test: true,
    }
}

pub struct NodeLabels {
    pub(crate) manager: LabelsManager,
}

impl NodeLabels {
    pub fn new(context: Arc<DeviceContext>, config: &DisplayConfig) -> Self {
        Self {
            manager: ResourceManager::new(node_labels_desc(), context, config).with_geometry_hook(apply_projection),
        }
    }

    pub fn manager(&self) -> &LabelsManager {
        &self.manager
    }
}

delegate_renderable!(NodeLabels);

pub fn node_label_vertex(node: &NodeVisual, index: usize) -> LabelVertex {
    LabelVertex {
        glyph: [node.radius, node.visibility, 0.0, 0.0],
        data: [
            index as i32,
            index as i32,
            glyph_count(node.label.as_deref(), node.visibility),
            element_flags(node.visibility, node.selected, node.dimmed),
        ],
    }
}

pub fn task_node_labels_vertices(access: &dyn VisualAccess, change: ChangeSet) -> UpdateTask<NodeLabels> {
    let snapshot = VertexSnapshot::build(change, access.node_count(), |i| node_label_vertex(&access.node(i), i));
    UpdateTask::new("node labels: vertices", move |labels: &mut NodeLabels| {
        labels.manager.commit_vertices(snapshot)
    })
}

pub fn task_node_labels_camera(access: &dyn VisualAccess) -> UpdateTask<NodeLabels> {
    let uniform = ModelViewUniform::from_camera(&access.camera());
    UpdateTask::new("node labels: camera", move |labels: &mut NodeLabels| {
        labels.manager.set_vertex_uniform(uniform);
        Ok(())
    })
}

pub fn task_node_labels_highlight(access: &dyn VisualAccess) -> UpdateTask<NodeLabels> {
    let colour = access.highlight_colour();
    UpdateTask::new("node labels: highlight colour", move |labels: &mut NodeLabels| {
        labels.manager.modify_geometry_uniform(|uniform| uniform.set_highlight_colour(colour));
        Ok(())
    })
}
