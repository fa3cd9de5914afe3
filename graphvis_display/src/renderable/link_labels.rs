/// Link labels - one label anchor per connection, midway between its endpoints

use std::sync::Arc;

use crate::graphics_device::{BlendMode, PrimitiveTopology, ShaderStageFlags};
use crate::renderable::node_labels::{glyph_count, label_layout, LabelVertex, LabelsManager};
use crate::renderable::renderable::delegate_renderable;
use crate::renderable::uniforms::{apply_projection, element_flags, ModelViewUniform};
use crate::renderable::{RenderableDesc, ResourceManager};
use crate::renderer::DisplayConfig;
use crate::resource::DeviceContext;
use crate::task::{ChangeSet, UpdateTask, VertexSnapshot};
use crate::visual::{ConnectionVisual, VisualAccess};

pub fn link_labels_desc() -> RenderableDesc {
    RenderableDesc {
        name: "link labels",
        vertex_layout: label_layout(),
        topology: PrimitiveTopology::PointList,
        vertex_shader: "link_labels.vert",
        geometry_shader: Some("labels.geom"),
        fragment_shader: "labels.frag",
        positions_stages: Some(ShaderStageFlags::VERTEX),
        push_constants: None,
        blend: BlendMode::AlphaBlend,
        depth_test: true,
    }
}

pub struct LinkLabels {
    pub(crate) manager: LabelsManager,
}

impl LinkLabels {
    pub fn new(context: Arc<DeviceContext>, config: &DisplayConfig) -> Self {
        Self {
            manager: ResourceManager::new(link_labels_desc(), context, config).with_geometry_hook(apply_projection),
        }
    }

    pub fn manager(&self) -> &LabelsManager {
        &self.manager
    }
}

delegate_renderable!(LinkLabels);

pub fn link_label_vertex(connection: &ConnectionVisual) -> LabelVertex {
    LabelVertex {
        glyph: [connection.width, connection.visibility, 0.0, 0.0],
        data: [
            connection.low as i32,
            connection.high as i32,
            glyph_count(connection.label.as_deref(), connection.visibility),
            element_flags(connection.visibility, connection.selected, connection.dimmed),
        ],
    }
}

pub fn task_link_labels_vertices(access: &dyn VisualAccess, change: ChangeSet) -> UpdateTask<LinkLabels> {
    let snapshot = VertexSnapshot::build(change, access.connection_count(), |i| {
        link_label_vertex(&access.connection(i))
    });
    UpdateTask::new("link labels: vertices", move |labels: &mut LinkLabels| {
        labels.manager.commit_vertices(snapshot)
    })
}

pub fn task_link_labels_camera(access: &dyn VisualAccess) -> UpdateTask<LinkLabels> {
    let uniform = ModelViewUniform::from_camera(&access.camera());
    UpdateTask::new("link labels: camera", move |labels: &mut LinkLabels| {
        labels.manager.set_vertex_uniform(uniform);
        Ok(())
    })
}

pub fn task_link_labels_highlight(access: &dyn VisualAccess) -> UpdateTask<LinkLabels> {
    let colour = access.highlight_colour();
    UpdateTask::new("link labels: highlight colour", move |labels: &mut LinkLabels| {
        labels.manager.modify_geometry_uniform(|uniform| uniform.set_highlight_colour(colour));
        Ok(())
    })
}
