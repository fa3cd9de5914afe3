/// Loops - self-connections, drawn as a ring beside their node
///
/// One vertex per loop. Loops are a filtered subset of the connections, so a
/// change always rebuilds the whole buffer.

use std::sync::Arc;

use crate::graphics_device::{BlendMode, PrimitiveTopology, ShaderStageFlags};
use crate::renderable::links::{connection_layout, connection_vertex, ConnectionVertex};
use crate::renderable::renderable::delegate_renderable;
use crate::renderable::uniforms::{apply_projection, ModelViewUniform, ProjectionUniform};
use crate::renderable::{RenderableDesc, ResourceManager};
use crate::renderer::DisplayConfig;
use crate::resource::DeviceContext;
use crate::task::{UpdateTask, VertexSnapshot};
use crate::visual::VisualAccess;

pub type LoopsManager = ResourceManager<ConnectionVertex, ModelViewUniform, ProjectionUniform, ()>;

pub fn loops_desc() -> RenderableDesc {
    RenderableDesc {
        name: "loops",
        vertex_layout: connection_layout(),
        topology: PrimitiveTopology::PointList,
        vertex_shader: "loops.vert",
        geometry_shader: Some("loops.geom"),
        fragment_shader: "loops.frag",
        positions_stages: Some(ShaderStageFlags::VERTEX),
        push_constants: None,
        blend: BlendMode::AlphaBlend,
        depth_test: true,
    }
}

pub struct Loops {
    pub(crate) manager: LoopsManager,
}

impl Loops {
    pub fn new(context: Arc<DeviceContext>, config: &DisplayConfig) -> Self {
        Self {
            manager: ResourceManager::new(loops_desc(), context, config).with_geometry_hook(apply_projection),
        }
    }

    pub fn manager(&self) -> &LoopsManager {
        &self.manager
    }
}

delegate_renderable!(Loops);

/// Vertices of every loop, in connection order
pub fn loop_vertices(access: &dyn VisualAccess) -> Vec<ConnectionVertex> {
    (0..access.connection_count())
        .filter_map(|index| {
            let connection = access.connection(index);
            connection
                .is_loop()
                .then(|| connection_vertex(&connection, index, connection.low))
        })
        .collect()
}

pub fn task_loops_vertices(access: &dyn VisualAccess) -> UpdateTask<Loops> {
    let vertices = loop_vertices(access);
    UpdateTask::new("loops: rebuild vertices", move |loops: &mut Loops| {
        loops.manager.commit_vertices(VertexSnapshot::Rebuild(vertices))
    })
}

pub fn task_loops_camera(access: &dyn VisualAccess) -> UpdateTask<Loops> {
    let uniform = ModelViewUniform::from_camera(&access.camera());
    UpdateTask::new("loops: camera", move |loops: &mut Loops| {
        loops.manager.set_vertex_uniform(uniform);
        Ok(())
    })
}

pub fn task_loops_highlight(access: &dyn VisualAccess) -> UpdateTask<Loops> {
    let colour = access.highlight_colour();
    UpdateTask::new("loops: highlight colour", move |loops: &mut Loops| {
        loops.manager.modify_geometry_uniform(|uniform| uniform.set_highlight_colour(colour));
        Ok(())
    })
}
