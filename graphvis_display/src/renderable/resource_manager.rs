/// ResourceManager - GPU resource lifecycle of one renderable
///
/// Owns every resource category of a drawable element type and drives each
/// one through its [`ResourceState`]:
///
/// - `NeedsRebuild`: destroy and recreate, then fill
/// - `NeedsUpdate`: refresh in place
/// - `Clean`: leave alone
///
/// Update tasks (render thread, during the task drain) stage data and
/// *request* states. [`ResourceManager::display_update`] walks the categories
/// in dependency order and is the only place a category becomes `Clean`.
///
/// The renderable kinds differ only in vertex type, uniform payloads and the
/// [`RenderableDesc`] they pass in. A `()` uniform payload means the shader
/// stage has no uniform.

use std::mem::size_of;
use std::sync::Arc;
use bytemuck::Pod;

use crate::camera::Projection;
use crate::error::{Error, Result};
use crate::graphics_device::{
    BlendMode, BufferUsage, CommandBuffer, DescriptorBinding, DescriptorKind, DescriptorLayoutDesc,
    DescriptorSet, DescriptorWrite, GraphicsDevice, Pipeline, PipelineDesc, PrimitiveTopology,
    PushConstantRange, ResourceId, ShaderStageFlags, SwapchainInfo, VertexLayout, Viewport,
};
use crate::renderable::SharedResources;
use crate::renderer::DisplayConfig;
use crate::resource::{
    BufferedResource, DeviceContext, RenderThread, ResourceCategory, ResourceState, StagedBuffer,
    StagedUniform, StateTable,
};
use crate::task::VertexSnapshot;

const SOURCE: &str = "graphvis::ResourceManager";

/// Descriptor binding of the vertex-stage uniform
pub const VERTEX_UNIFORM_BINDING: u32 = 0;
/// Descriptor binding of the geometry-stage uniform
pub const GEOMETRY_UNIFORM_BINDING: u32 = 1;
/// Descriptor binding of the fragment-stage uniform
pub const FRAGMENT_UNIFORM_BINDING: u32 = 2;
/// Descriptor binding of the shared position buffer
pub const POSITIONS_BINDING: u32 = 3;

/// Recomputes the geometry uniform when the swapchain changes
pub type GeometryHook<GU> = fn(&mut GU, &SwapchainInfo, &Projection);

/// Static description of a renderable kind
#[derive(Debug, Clone, PartialEq)]
pub struct RenderableDesc {
    pub name: &'static str,
    pub vertex_layout: VertexLayout,
    pub topology: PrimitiveTopology,
    pub vertex_shader: &'static str,
    pub geometry_shader: Option<&'static str>,
    pub fragment_shader: &'static str,
    /// Stages reading the shared position buffer, if the kind binds it
    pub positions_stages: Option<ShaderStageFlags>,
    pub push_constants: Option<PushConstantRange>,
    pub blend: BlendMode,
    pub depth_test: bool,
}

pub struct ResourceManager<V, VU, GU, FU> {
    desc: RenderableDesc,
    context: Arc<DeviceContext>,
    render_thread: RenderThread,
    states: StateTable,
    log_transitions: bool,
    projection: Projection,
    geometry_hook: Option<GeometryHook<GU>>,
    layout: DescriptorLayoutDesc,
    initialised: bool,
    swapchain: Option<SwapchainInfo>,

    vertices: StagedBuffer<V>,
    vertex_uniform: StagedUniform<VU>,
    geometry_uniform: StagedUniform<GU>,
    fragment_uniform: StagedUniform<FU>,
    descriptor_sets: BufferedResource<Arc<dyn DescriptorSet>>,
    command_buffers: BufferedResource<Box<dyn CommandBuffer>>,
    pipelines: BufferedResource<Arc<dyn Pipeline>>,
    push_constants: Vec<u8>,

    // Id of the shared position buffer the descriptor sets point at
    bound_positions: Option<ResourceId>,
}

impl<V: Pod, VU: Pod, GU: Pod, FU: Pod> ResourceManager<V, VU, GU, FU> {
    /// New manager with every category `NeedsRebuild`
    pub fn new(desc: RenderableDesc, context: Arc<DeviceContext>, config: &DisplayConfig) -> Self {
        let vertex_uniform = StagedUniform::new(format!("{} vertex uniform", desc.name), &context);
        let geometry_uniform = StagedUniform::new(format!("{} geometry uniform", desc.name), &context);
        let fragment_uniform = StagedUniform::new(format!("{} fragment uniform", desc.name), &context);
        let layout = descriptor_layout(
            &desc,
            vertex_uniform.is_used(),
            geometry_uniform.is_used(),
            fragment_uniform.is_used(),
        );
        Self {
            states: StateTable::new(desc.name, config.log_state_transitions),
            log_transitions: config.log_state_transitions,
            projection: config.projection,
            geometry_hook: None,
            layout,
            initialised: false,
            swapchain: None,
            vertices: StagedBuffer::new(format!("{} vertices", desc.name), BufferUsage::VERTEX),
            vertex_uniform,
            geometry_uniform,
            fragment_uniform,
            descriptor_sets: BufferedResource::new(),
            command_buffers: BufferedResource::new(),
            pipelines: BufferedResource::new(),
            push_constants: Vec::new(),
            bound_positions: None,
            render_thread: RenderThread::new(),
            context,
            desc,
        }
    }

    /// Recompute the geometry uniform with `hook` on every swapchain change
    pub fn with_geometry_hook(mut self, hook: GeometryHook<GU>) -> Self {
        self.geometry_hook = Some(hook);
        self
    }

    // ===== ACCESSORS =====

    pub fn name(&self) -> &str {
        self.desc.name
    }

    pub fn desc(&self) -> &RenderableDesc {
        &self.desc
    }

    pub fn state(&self, category: ResourceCategory) -> ResourceState {
        self.states.get(category)
    }

    pub fn states(&self) -> &StateTable {
        &self.states
    }

    pub fn descriptor_layout(&self) -> &DescriptorLayoutDesc {
        &self.layout
    }

    pub fn vertex_buffer(&self) -> &StagedBuffer<V> {
        &self.vertices
    }

    pub fn vertex_uniform(&self) -> &StagedUniform<VU> {
        &self.vertex_uniform
    }

    pub fn geometry_uniform(&self) -> &StagedUniform<GU> {
        &self.geometry_uniform
    }

    pub fn fragment_uniform(&self) -> &StagedUniform<FU> {
        &self.fragment_uniform
    }

    pub fn descriptor_set(&self, image_index: usize) -> Option<&Arc<dyn DescriptorSet>> {
        self.descriptor_sets.get(image_index)
    }

    pub fn pipeline(&self, image_index: usize) -> Option<&Arc<dyn Pipeline>> {
        self.pipelines.get(image_index)
    }

    pub fn push_constant_bytes(&self) -> &[u8] {
        &self.push_constants
    }

    /// Id of the position buffer the descriptor sets currently reference
    pub fn bound_positions(&self) -> Option<ResourceId> {
        self.bound_positions
    }

    pub fn swapchain(&self) -> Option<&SwapchainInfo> {
        self.swapchain.as_ref()
    }

    /// Number of staged vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.count()
    }

    pub fn command_buffer(&self, image_index: usize) -> Option<&dyn CommandBuffer> {
        self.command_buffers.get(image_index).map(|b| b.as_ref())
    }

    // ===== LIFECYCLE (render thread) =====

    /// Bind the render thread, validate the description and create uniform staging buffers
    pub fn initialise(&mut self) -> Result<()> {
        self.render_thread.bind();

        let vertex_size = size_of::<V>() as u32;
        if self.desc.vertex_layout.stride != vertex_size {
            return Err(Error::InitializationFailed(format!(
                "{}: vertex layout stride {} does not match vertex size {}",
                self.desc.name, self.desc.vertex_layout.stride, vertex_size
            )));
        }
        if let Some(range) = self.desc.push_constants {
            let max = self.context.limits().max_push_constants_size;
            if range.offset + range.size > max {
                return Err(Error::InitializationFailed(format!(
                    "{}: push constants end at {} bytes, device allows {}",
                    self.desc.name,
                    range.offset + range.size,
                    max
                )));
            }
        }

        let context = Arc::clone(&self.context);
        let mut device = context.lock_device()?;
        self.vertex_uniform.create_staging(&mut *device)?;
        self.geometry_uniform.create_staging(&mut *device)?;
        self.fragment_uniform.create_staging(&mut *device)?;
        self.initialised = true;

        crate::engine_debug!(SOURCE, "{} initialised", self.desc.name);
        Ok(())
    }

    /// React to a new swapchain
    ///
    /// A different image count invalidates every per-image resource. The same
    /// image count (a resize) only needs the projection refreshed.
    pub fn set_new_swapchain(&mut self, swapchain: &SwapchainInfo) -> Result<()> {
        self.render_thread.verify("set_new_swapchain");
        if swapchain.image_count == 0 {
            return Err(Error::InitializationFailed(format!(
                "{}: swapchain has no images",
                self.desc.name
            )));
        }

        let previous = self.swapchain.replace(*swapchain);
        match previous {
            Some(old) if old.image_count == swapchain.image_count => {
                if self.geometry_uniform.is_used() {
                    self.states.request(ResourceCategory::GeometryUniform, ResourceState::NeedsUpdate);
                }
                if old.render_pass != swapchain.render_pass {
                    self.states.request(ResourceCategory::Pipelines, ResourceState::NeedsRebuild);
                }
            }
            _ => {
                crate::engine_debug!(
                    SOURCE,
                    "{}: {} swapchain images, rebuilding per-image resources",
                    self.desc.name,
                    swapchain.image_count
                );
                self.release_per_image();
                for category in ResourceCategory::PER_IMAGE {
                    self.states.request(category, ResourceState::NeedsRebuild);
                }
            }
        }

        if let Some(hook) = self.geometry_hook {
            let mut value = *self.geometry_uniform.value();
            hook(&mut value, swapchain, &self.projection);
            self.geometry_uniform.set(value);
        }
        Ok(())
    }

    /// Whether this frame needs [`ResourceManager::display_update`]
    ///
    /// An empty renderable never does, whatever its states say.
    pub fn needs_display_update(&self, shared: &SharedResources) -> bool {
        self.vertex_count() > 0 && (self.states.any_dirty() || self.positions_stale(shared))
    }

    /// Bring every dirty category up to date, in dependency order
    ///
    /// Stops at the first failure. Categories already processed stay clean;
    /// the failing one and everything after it stay dirty for the next frame.
    pub fn display_update(&mut self, shared: &SharedResources) -> Result<()> {
        self.render_thread.verify("display_update");
        if !self.initialised {
            return Err(Error::InitializationFailed(format!("{}: not initialised", self.desc.name)));
        }
        let swapchain = self.swapchain.ok_or_else(|| {
            Error::InitializationFailed(format!("{}: no swapchain bound", self.desc.name))
        })?;

        if self.positions_stale(shared) {
            crate::engine_debug!(SOURCE, "{}: position buffer replaced, refreshing descriptor sets", self.desc.name);
            self.states.request(ResourceCategory::DescriptorSets, ResourceState::NeedsUpdate);
        }

        let context = Arc::clone(&self.context);
        let mut device = context.lock_device()?;
        for category in ResourceCategory::ALL {
            let result = match self.states.get(category) {
                ResourceState::Clean => continue,
                ResourceState::NeedsRebuild => self.rebuild(category, &mut *device, &swapchain, shared),
                ResourceState::NeedsUpdate => self.update(category, &mut *device, shared),
            };
            if let Err(e) = result {
                crate::engine_warn!(SOURCE, "{}: {} failed: {}", self.desc.name, category, e);
                return Err(e);
            }
            self.states.mark_clean(category);
        }
        Ok(())
    }

    /// Record this renderable's draw into the command buffer of `image_index`
    pub fn record_command_buffer(&mut self, image_index: usize) -> Result<ResourceId> {
        self.render_thread.verify("record_command_buffer");
        let swapchain = self.swapchain.ok_or_else(|| {
            Error::InitializationFailed(format!("{}: no swapchain bound", self.desc.name))
        })?;
        let pipeline = Arc::clone(self.pipelines.slot(image_index, "pipeline")?);
        let descriptor_set = if self.layout.is_empty() {
            None
        } else {
            Some(Arc::clone(self.descriptor_sets.slot(image_index, "descriptor set")?))
        };
        let vertex_buffer = self.vertices.device_buffer().cloned();
        let vertex_count = self.vertices.count() as u32;

        let command_buffer = self.command_buffers.slot_mut(image_index, "command buffer")?;
        command_buffer.begin(swapchain.render_pass)?;
        command_buffer.set_viewport(Viewport::full(swapchain.width, swapchain.height))?;
        command_buffer.bind_pipeline(pipeline.as_ref())?;
        if let Some(set) = &descriptor_set {
            command_buffer.bind_descriptor_set(pipeline.as_ref(), set.as_ref())?;
        }
        if let Some(range) = self.desc.push_constants {
            if !self.push_constants.is_empty() {
                command_buffer.push_constants(pipeline.as_ref(), range.stages, range.offset, &self.push_constants)?;
            }
        }
        if let Some(buffer) = &vertex_buffer {
            command_buffer.bind_vertex_buffer(buffer.as_ref(), 0)?;
            command_buffer.draw(vertex_count, 0)?;
        }
        command_buffer.end()?;
        Ok(command_buffer.id())
    }

    /// Release every owned GPU object and return to the constructed state
    pub fn destroy(&mut self) {
        self.render_thread.verify("destroy");
        self.release_per_image();
        self.vertices.destroy();
        self.vertex_uniform.destroy();
        self.geometry_uniform.destroy();
        self.fragment_uniform.destroy();
        self.push_constants.clear();
        self.swapchain = None;
        self.initialised = false;
        self.states = StateTable::new(self.desc.name, self.log_transitions);
        crate::engine_debug!(SOURCE, "{} destroyed", self.desc.name);
    }

    /// True when no GPU object is held
    pub fn is_destroyed(&self) -> bool {
        self.vertices.staging_buffer().is_none()
            && self.vertices.device_buffer().is_none()
            && !self.vertex_uniform.has_staging()
            && !self.geometry_uniform.has_staging()
            && !self.fragment_uniform.has_staging()
            && self.vertex_uniform.device_copies() == 0
            && self.geometry_uniform.device_copies() == 0
            && self.fragment_uniform.device_copies() == 0
            && self.descriptor_sets.is_empty()
            && self.command_buffers.is_empty()
            && self.pipelines.is_empty()
            && self.bound_positions.is_none()
    }

    // ===== COMMIT SIDE (called by update tasks) =====

    /// Stage a vertex snapshot and request the matching vertex-buffer state
    ///
    /// A partial snapshot taken against a different vertex count is rejected:
    /// its indices no longer mean anything.
    pub fn commit_vertices(&mut self, snapshot: VertexSnapshot<V>) -> Result<()> {
        self.render_thread.verify("commit_vertices");
        match snapshot {
            VertexSnapshot::Rebuild(vertices) => {
                let context = Arc::clone(&self.context);
                let mut device = context.lock_device()?;
                let staged = self.vertices.stage_rebuild(&mut *device, &vertices);
                // Failed elements stay deferred in the staged buffer
                self.states.request(ResourceCategory::VertexBuffer, ResourceState::NeedsRebuild);
                staged?;
            }
            VertexSnapshot::Partial { first, vertices, element_count } => {
                if element_count != self.vertices.count() {
                    let last = first + vertices.len().saturating_sub(1);
                    crate::engine_warn!(
                        SOURCE,
                        "{}: partial update for {} vertices, {} staged",
                        self.desc.name,
                        element_count,
                        self.vertices.count()
                    );
                    return Err(Error::InvalidRange { first, last, count: self.vertices.count() });
                }
                let staged = self.vertices.stage_partial(first, &vertices);
                if self.vertices.has_pending_copy() {
                    self.states.request(ResourceCategory::VertexBuffer, ResourceState::NeedsUpdate);
                }
                staged?;
            }
        }
        Ok(())
    }

    pub fn set_vertex_uniform(&mut self, value: VU) {
        self.render_thread.verify("set_vertex_uniform");
        self.vertex_uniform.set(value);
        if self.vertex_uniform.is_used() {
            self.states.request(ResourceCategory::VertexUniform, ResourceState::NeedsUpdate);
        }
    }

    pub fn set_geometry_uniform(&mut self, value: GU) {
        self.render_thread.verify("set_geometry_uniform");
        self.geometry_uniform.set(value);
        if self.geometry_uniform.is_used() {
            self.states.request(ResourceCategory::GeometryUniform, ResourceState::NeedsUpdate);
        }
    }

    /// Change part of the geometry uniform, keeping what the geometry hook computed
    pub fn modify_geometry_uniform<F: FnOnce(&mut GU)>(&mut self, modify: F) {
        let mut value = *self.geometry_uniform.value();
        modify(&mut value);
        self.set_geometry_uniform(value);
    }

    pub fn set_fragment_uniform(&mut self, value: FU) {
        self.render_thread.verify("set_fragment_uniform");
        self.fragment_uniform.set(value);
        if self.fragment_uniform.is_used() {
            self.states.request(ResourceCategory::FragmentUniform, ResourceState::NeedsUpdate);
        }
    }

    /// Replace the push constant block, picked up by the next recording
    pub fn set_push_constants<P: Pod>(&mut self, value: &P) -> Result<()> {
        self.render_thread.verify("set_push_constants");
        let range = self.desc.push_constants.ok_or_else(|| {
            Error::InvalidResource(format!("{} declares no push constants", self.desc.name))
        })?;
        let bytes = bytemuck::bytes_of(value);
        if bytes.len() as u32 > range.size {
            return Err(Error::InvalidResource(format!(
                "{}: {} bytes of push constants, range holds {}",
                self.desc.name,
                bytes.len(),
                range.size
            )));
        }
        self.push_constants = bytes.to_vec();
        Ok(())
    }

    // ===== CATEGORY STEPS =====

    fn rebuild(
        &mut self,
        category: ResourceCategory,
        device: &mut dyn GraphicsDevice,
        swapchain: &SwapchainInfo,
        shared: &SharedResources,
    ) -> Result<()> {
        let image_count = swapchain.image_count;
        match category {
            ResourceCategory::VertexBuffer => self.vertices.sync_device(device, true),
            ResourceCategory::VertexUniform => {
                self.vertex_uniform.rebuild(device, image_count)?;
                self.refresh_descriptors_if(self.vertex_uniform.is_used());
                Ok(())
            }
            ResourceCategory::GeometryUniform => {
                self.geometry_uniform.rebuild(device, image_count)?;
                self.refresh_descriptors_if(self.geometry_uniform.is_used());
                Ok(())
            }
            ResourceCategory::FragmentUniform => {
                self.fragment_uniform.rebuild(device, image_count)?;
                self.refresh_descriptors_if(self.fragment_uniform.is_used());
                Ok(())
            }
            ResourceCategory::DescriptorSets => self.rebuild_descriptor_sets(device, image_count, shared),
            ResourceCategory::CommandBuffers => {
                self.command_buffers.rebuild(image_count, |_| device.create_command_buffer())
            }
            ResourceCategory::Pipelines => {
                let desc = self.pipeline_desc(swapchain);
                self.pipelines.rebuild(image_count, |_| device.create_pipeline(&desc))
            }
        }
    }

    fn update(
        &mut self,
        category: ResourceCategory,
        device: &mut dyn GraphicsDevice,
        shared: &SharedResources,
    ) -> Result<()> {
        match category {
            ResourceCategory::VertexBuffer => self.vertices.sync_device(device, false),
            ResourceCategory::VertexUniform => self.vertex_uniform.update(device),
            ResourceCategory::GeometryUniform => self.geometry_uniform.update(device),
            ResourceCategory::FragmentUniform => self.fragment_uniform.update(device),
            ResourceCategory::DescriptorSets => self.write_descriptor_sets(device, shared),
            // Recorded every frame, immutable once built
            ResourceCategory::CommandBuffers | ResourceCategory::Pipelines => Ok(()),
        }
    }

    // New uniform buffers are not what the descriptor sets point at
    fn refresh_descriptors_if(&mut self, uniform_used: bool) {
        if uniform_used {
            self.states.request(ResourceCategory::DescriptorSets, ResourceState::NeedsUpdate);
        }
    }

    fn rebuild_descriptor_sets(
        &mut self,
        device: &mut dyn GraphicsDevice,
        image_count: usize,
        shared: &SharedResources,
    ) -> Result<()> {
        self.descriptor_sets.clear();
        self.bound_positions = None;
        if self.layout.is_empty() {
            return Ok(());
        }
        let layout = &self.layout;
        self.descriptor_sets.rebuild(image_count, |_| device.create_descriptor_set(layout))?;
        self.write_descriptor_sets(device, shared)
    }

    fn write_descriptor_sets(&mut self, device: &mut dyn GraphicsDevice, shared: &SharedResources) -> Result<()> {
        let positions = match self.desc.positions_stages {
            Some(_) => Some(Arc::clone(shared.positions_buffer().ok_or_else(|| {
                Error::InvalidResource(format!("{}: shared position buffer missing", self.desc.name))
            })?)),
            None => None,
        };

        for (image_index, set) in self.descriptor_sets.iter().enumerate() {
            let mut writes = Vec::with_capacity(4);
            if self.vertex_uniform.is_used() {
                writes.push(DescriptorWrite {
                    binding: VERTEX_UNIFORM_BINDING,
                    kind: DescriptorKind::UniformBuffer,
                    buffer: self.vertex_uniform.buffer_for(image_index)?.as_ref(),
                });
            }
            if self.geometry_uniform.is_used() {
                writes.push(DescriptorWrite {
                    binding: GEOMETRY_UNIFORM_BINDING,
                    kind: DescriptorKind::UniformBuffer,
                    buffer: self.geometry_uniform.buffer_for(image_index)?.as_ref(),
                });
            }
            if self.fragment_uniform.is_used() {
                writes.push(DescriptorWrite {
                    binding: FRAGMENT_UNIFORM_BINDING,
                    kind: DescriptorKind::UniformBuffer,
                    buffer: self.fragment_uniform.buffer_for(image_index)?.as_ref(),
                });
            }
            if let Some(buffer) = &positions {
                writes.push(DescriptorWrite {
                    binding: POSITIONS_BINDING,
                    kind: DescriptorKind::StorageBuffer,
                    buffer: buffer.as_ref(),
                });
            }
            device.update_descriptor_set(set.as_ref(), &writes)?;
        }

        self.bound_positions = positions.map(|buffer| buffer.id());
        Ok(())
    }

    fn pipeline_desc(&self, swapchain: &SwapchainInfo) -> PipelineDesc {
        PipelineDesc {
            name: self.desc.name.to_string(),
            vertex_shader: self.desc.vertex_shader.to_string(),
            geometry_shader: self.desc.geometry_shader.map(str::to_string),
            fragment_shader: self.desc.fragment_shader.to_string(),
            vertex_layout: self.desc.vertex_layout.clone(),
            topology: self.desc.topology,
            descriptor_layout: self.layout.clone(),
            push_constants: self.desc.push_constants,
            blend: self.desc.blend,
            depth_test: self.desc.depth_test,
            render_pass: swapchain.render_pass,
            extent: (swapchain.width, swapchain.height),
        }
    }

    fn positions_stale(&self, shared: &SharedResources) -> bool {
        self.desc.positions_stages.is_some()
            && !self.descriptor_sets.is_empty()
            && shared.positions_id() != self.bound_positions
    }

    fn release_per_image(&mut self) {
        self.descriptor_sets.clear();
        self.command_buffers.clear();
        self.pipelines.clear();
        self.vertex_uniform.destroy_device_copies();
        self.geometry_uniform.destroy_device_copies();
        self.fragment_uniform.destroy_device_copies();
        self.bound_positions = None;
    }
}

/// Layout derived from the used uniform stages and the position binding
fn descriptor_layout(
    desc: &RenderableDesc,
    vertex_uniform: bool,
    geometry_uniform: bool,
    fragment_uniform: bool,
) -> DescriptorLayoutDesc {
    let mut bindings = Vec::new();
    let uniforms = [
        (vertex_uniform, VERTEX_UNIFORM_BINDING, ShaderStageFlags::VERTEX),
        (geometry_uniform, GEOMETRY_UNIFORM_BINDING, ShaderStageFlags::GEOMETRY),
        (fragment_uniform, FRAGMENT_UNIFORM_BINDING, ShaderStageFlags::FRAGMENT),
    ];
    for (used, binding, stages) in uniforms {
        if used {
            bindings.push(DescriptorBinding { binding, kind: DescriptorKind::UniformBuffer, stages });
        }
    }
    if let Some(stages) = desc.positions_stages {
        bindings.push(DescriptorBinding {
            binding: POSITIONS_BINDING,
            kind: DescriptorKind::StorageBuffer,
            stages,
        });
    }
    DescriptorLayoutDesc { bindings }
}

#[cfg(test)]
#[path = "resource_manager_tests.rs"]
mod tests;
