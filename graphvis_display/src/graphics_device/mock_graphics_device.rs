/// Mock graphics device for tests (no GPU required)
///
/// Records every device call, keeps the bytes of every buffer so device-local
/// contents can be read back, tracks live objects through weak handles and can
/// be told to fail the next call of a given kind.
///
/// The device is moved into the renderer; a [`MockInspector`] keeps a second handle
/// on the same state for inspection.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::graphics_device::{
    Buffer, BufferCopy, BufferDesc, BufferUsage, CommandBuffer, DescriptorKind,
    DescriptorLayoutDesc, DescriptorSet, DescriptorWrite, DeviceLimits, GraphicsDevice,
    MemoryLocation, Pipeline, PipelineDesc, RenderPassHandle, ResourceId, ShaderStageFlags,
    Viewport,
};

// ============================================================================
// Call statistics
// ============================================================================

/// Device operation kinds, used for failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    CreateBuffer,
    CopyBuffer,
    WriteBuffer,
    CreateDescriptorSet,
    UpdateDescriptorSet,
    CreatePipeline,
    CreateCommandBuffer,
}

/// Snapshot of call counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MockStats {
    pub buffers_created: usize,
    pub bytes_allocated: u64,
    pub copies: usize,
    pub bytes_copied: u64,
    pub buffer_writes: usize,
    pub descriptor_sets_created: usize,
    pub descriptor_updates: usize,
    pub pipelines_created: usize,
    pub command_buffers_created: usize,
}

impl MockStats {
    /// Every counted device call
    pub fn total_calls(&self) -> usize {
        self.buffers_created
            + self.copies
            + self.buffer_writes
            + self.descriptor_sets_created
            + self.descriptor_updates
            + self.pipelines_created
            + self.command_buffers_created
    }
}

// ============================================================================
// Shared state
// ============================================================================

#[derive(Default)]
struct MockState {
    stats: MockStats,
    limits: DeviceLimits,
    failures: Vec<(MockOp, Error)>,
    buffers: FxHashMap<ResourceId, Weak<MockBuffer>>,
    descriptor_sets: FxHashMap<ResourceId, Weak<MockDescriptorSet>>,
    pipelines: FxHashMap<ResourceId, Weak<MockPipeline>>,
    command_logs: FxHashMap<ResourceId, Weak<Mutex<Vec<MockCommand>>>>,
}

impl MockState {
    fn take_failure(&mut self, op: MockOp) -> Result<()> {
        match self.failures.iter().position(|(failing, _)| *failing == op) {
            Some(index) => Err(self.failures.remove(index).1),
            None => Ok(()),
        }
    }

    fn buffer(&self, id: ResourceId) -> Result<Arc<MockBuffer>> {
        self.buffers
            .get(&id)
            .and_then(Weak::upgrade)
            .ok_or_else(|| Error::InvalidResource(format!("unknown buffer {}", id.raw())))
    }
}

fn lock(state: &Mutex<MockState>) -> MutexGuard<'_, MockState> {
    // A panicking test must not cascade into every other assertion
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ============================================================================
// Mock Buffer
// ============================================================================

pub struct MockBuffer {
    id: ResourceId,
    pub label: String,
    pub usage: BufferUsage,
    location: MemoryLocation,
    data: Mutex<Vec<u8>>,
    writes: Arc<AtomicUsize>,
    state: Weak<Mutex<MockState>>,
}

impl MockBuffer {
    /// Copy of the buffer contents
    pub fn contents(&self) -> Vec<u8> {
        self.data.lock().map(|data| data.clone()).unwrap_or_default()
    }
}

impl Buffer for MockBuffer {
    fn id(&self) -> ResourceId {
        self.id
    }

    fn size(&self) -> u64 {
        self.data.lock().map(|data| data.len() as u64).unwrap_or(0)
    }

    fn location(&self) -> MemoryLocation {
        self.location
    }

    fn update(&self, offset: u64, bytes: &[u8]) -> Result<()> {
        if let Some(state) = self.state.upgrade() {
            lock(&state).take_failure(MockOp::WriteBuffer)?;
        }
        if self.location != MemoryLocation::HostVisible {
            return Err(Error::DriverCallFailure(format!(
                "buffer '{}' is not host visible",
                self.label
            )));
        }
        let mut data = self
            .data
            .lock()
            .map_err(|_| Error::DriverCallFailure("buffer lock poisoned".to_string()))?;
        let start = offset as usize;
        let end = start + bytes.len();
        if end > data.len() {
            return Err(Error::DriverCallFailure(format!(
                "write of {} bytes at {} overflows buffer '{}' ({} bytes)",
                bytes.len(),
                offset,
                self.label,
                data.len()
            )));
        }
        data[start..end].copy_from_slice(bytes);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

// ============================================================================
// Mock Descriptor Set
// ============================================================================

pub struct MockDescriptorSet {
    id: ResourceId,
    pub layout: DescriptorLayoutDesc,
    bound: Mutex<FxHashMap<u32, ResourceId>>,
}

impl MockDescriptorSet {
    /// Buffer currently bound at `binding`
    pub fn bound_buffer(&self, binding: u32) -> Option<ResourceId> {
        self.bound.lock().ok().and_then(|bound| bound.get(&binding).copied())
    }
}

impl DescriptorSet for MockDescriptorSet {
    fn id(&self) -> ResourceId {
        self.id
    }
}

// ============================================================================
// Mock Pipeline
// ============================================================================

pub struct MockPipeline {
    id: ResourceId,
    pub desc: PipelineDesc,
}

impl Pipeline for MockPipeline {
    fn id(&self) -> ResourceId {
        self.id
    }

    fn name(&self) -> &str {
        &self.desc.name
    }
}

// ============================================================================
// Mock Command Buffer
// ============================================================================

/// A recorded command
#[derive(Debug, Clone, PartialEq)]
pub enum MockCommand {
    Begin(RenderPassHandle),
    SetViewport(Viewport),
    BindPipeline(ResourceId),
    BindDescriptorSet(ResourceId),
    BindVertexBuffer(ResourceId),
    PushConstants { stages: ShaderStageFlags, offset: u32, data: Vec<u8> },
    Draw { vertex_count: u32, first_vertex: u32 },
    End,
}

pub struct MockCommandBuffer {
    id: ResourceId,
    recording: bool,
    commands: Arc<Mutex<Vec<MockCommand>>>,
}

impl MockCommandBuffer {
    fn push(&mut self, command: MockCommand) -> Result<()> {
        if !self.recording {
            return Err(Error::DriverCallFailure("command buffer not recording".to_string()));
        }
        self.commands
            .lock()
            .map_err(|_| Error::DriverCallFailure("command log poisoned".to_string()))?
            .push(command);
        Ok(())
    }
}

impl CommandBuffer for MockCommandBuffer {
    fn id(&self) -> ResourceId {
        self.id
    }

    fn begin(&mut self, render_pass: RenderPassHandle) -> Result<()> {
        if self.recording {
            return Err(Error::DriverCallFailure("command buffer already recording".to_string()));
        }
        if let Ok(mut commands) = self.commands.lock() {
            commands.clear();
        }
        self.recording = true;
        self.push(MockCommand::Begin(render_pass))
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.push(MockCommand::SetViewport(viewport))
    }

    fn bind_pipeline(&mut self, pipeline: &dyn Pipeline) -> Result<()> {
        self.push(MockCommand::BindPipeline(pipeline.id()))
    }

    fn bind_descriptor_set(&mut self, _pipeline: &dyn Pipeline, set: &dyn DescriptorSet) -> Result<()> {
        self.push(MockCommand::BindDescriptorSet(set.id()))
    }

    fn bind_vertex_buffer(&mut self, buffer: &dyn Buffer, _offset: u64) -> Result<()> {
        self.push(MockCommand::BindVertexBuffer(buffer.id()))
    }

    fn push_constants(
        &mut self,
        _pipeline: &dyn Pipeline,
        stages: ShaderStageFlags,
        offset: u32,
        data: &[u8],
    ) -> Result<()> {
        self.push(MockCommand::PushConstants { stages, offset, data: data.to_vec() })
    }

    fn draw(&mut self, vertex_count: u32, first_vertex: u32) -> Result<()> {
        self.push(MockCommand::Draw { vertex_count, first_vertex })
    }

    fn end(&mut self) -> Result<()> {
        self.push(MockCommand::End)?;
        self.recording = false;
        Ok(())
    }
}

// ============================================================================
// Mock Graphics Device
// ============================================================================

pub struct MockGraphicsDevice {
    state: Arc<Mutex<MockState>>,
    writes: Arc<AtomicUsize>,
}

impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::default())),
            writes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Device reporting the given limits
    pub fn with_limits(limits: DeviceLimits) -> Self {
        let device = Self::new();
        lock(&device.state).limits = limits;
        device
    }

    /// Inspection handle sharing this device's state
    pub fn inspector(&self) -> MockInspector {
        MockInspector {
            state: Arc::clone(&self.state),
            writes: Arc::clone(&self.writes),
        }
    }
}

impl Default for MockGraphicsDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_buffer(&mut self, desc: &BufferDesc) -> Result<Arc<dyn Buffer>> {
        let mut state = lock(&self.state);
        state.take_failure(MockOp::CreateBuffer)?;
        if desc.size == 0 {
            return Err(Error::InvalidResource(format!("zero-sized buffer '{}'", desc.label)));
        }
        let buffer = Arc::new(MockBuffer {
            id: ResourceId::next(),
            label: desc.label.clone(),
            usage: desc.usage,
            location: desc.location,
            data: Mutex::new(vec![0; desc.size as usize]),
            writes: Arc::clone(&self.writes),
            state: Arc::downgrade(&self.state),
        });
        state.buffers.insert(buffer.id, Arc::downgrade(&buffer));
        state.stats.buffers_created += 1;
        state.stats.bytes_allocated += desc.size;
        Ok(buffer)
    }

    fn copy_buffer(&mut self, src: &dyn Buffer, dst: &dyn Buffer, region: BufferCopy) -> Result<()> {
        let mut state = lock(&self.state);
        state.take_failure(MockOp::CopyBuffer)?;
        let source = state.buffer(src.id())?.contents();
        let destination = state.buffer(dst.id())?;
        let src_end = (region.src_offset + region.size) as usize;
        let dst_end = (region.dst_offset + region.size) as usize;
        let mut data = destination
            .data
            .lock()
            .map_err(|_| Error::DriverCallFailure("buffer lock poisoned".to_string()))?;
        if src_end > source.len() || dst_end > data.len() {
            return Err(Error::DriverCallFailure(format!(
                "copy region {:?} out of bounds ({} -> {} bytes)",
                region,
                source.len(),
                data.len()
            )));
        }
        data[region.dst_offset as usize..dst_end]
            .copy_from_slice(&source[region.src_offset as usize..src_end]);
        state.stats.copies += 1;
        state.stats.bytes_copied += region.size;
        Ok(())
    }

    fn create_descriptor_set(&mut self, layout: &DescriptorLayoutDesc) -> Result<Arc<dyn DescriptorSet>> {
        let mut state = lock(&self.state);
        state.take_failure(MockOp::CreateDescriptorSet)?;
        let set = Arc::new(MockDescriptorSet {
            id: ResourceId::next(),
            layout: layout.clone(),
            bound: Mutex::new(FxHashMap::default()),
        });
        state.descriptor_sets.insert(set.id, Arc::downgrade(&set));
        state.stats.descriptor_sets_created += 1;
        Ok(set)
    }

    fn update_descriptor_set(&mut self, set: &dyn DescriptorSet, writes: &[DescriptorWrite<'_>]) -> Result<()> {
        let mut state = lock(&self.state);
        state.take_failure(MockOp::UpdateDescriptorSet)?;
        let target = state
            .descriptor_sets
            .get(&set.id())
            .and_then(Weak::upgrade)
            .ok_or_else(|| Error::InvalidResource(format!("unknown descriptor set {}", set.id().raw())))?;
        for write in writes {
            let declared = target
                .layout
                .bindings
                .iter()
                .any(|b| b.binding == write.binding && b.kind == write.kind);
            if !declared {
                return Err(Error::DriverCallFailure(format!(
                    "binding {} ({:?}) not in layout",
                    write.binding, write.kind
                )));
            }
            let required = match write.kind {
                DescriptorKind::UniformBuffer => BufferUsage::UNIFORM,
                DescriptorKind::StorageBuffer => BufferUsage::STORAGE,
            };
            let buffer = state.buffer(write.buffer.id())?;
            if !buffer.usage.contains(required) {
                return Err(Error::DriverCallFailure(format!(
                    "buffer '{}' lacks {:?} usage",
                    buffer.label, required
                )));
            }
            if let Ok(mut bound) = target.bound.lock() {
                bound.insert(write.binding, write.buffer.id());
            }
        }
        state.stats.descriptor_updates += 1;
        Ok(())
    }

    fn create_pipeline(&mut self, desc: &PipelineDesc) -> Result<Arc<dyn Pipeline>> {
        let mut state = lock(&self.state);
        state.take_failure(MockOp::CreatePipeline)?;
        let pipeline = Arc::new(MockPipeline { id: ResourceId::next(), desc: desc.clone() });
        state.pipelines.insert(pipeline.id, Arc::downgrade(&pipeline));
        state.stats.pipelines_created += 1;
        Ok(pipeline)
    }

    fn create_command_buffer(&mut self) -> Result<Box<dyn CommandBuffer>> {
        let mut state = lock(&self.state);
        state.take_failure(MockOp::CreateCommandBuffer)?;
        let commands = Arc::new(Mutex::new(Vec::new()));
        let id = ResourceId::next();
        state.command_logs.insert(id, Arc::downgrade(&commands));
        state.stats.command_buffers_created += 1;
        Ok(Box::new(MockCommandBuffer { id, recording: false, commands }))
    }

    fn limits(&self) -> DeviceLimits {
        lock(&self.state).limits
    }

    fn wait_idle(&self) -> Result<()> {
        Ok(())
    }
}

// ============================================================================
// Mock Inspector
// ============================================================================

/// Inspection handle on a [`MockGraphicsDevice`]
#[derive(Clone)]
pub struct MockInspector {
    state: Arc<Mutex<MockState>>,
    writes: Arc<AtomicUsize>,
}

impl MockInspector {
    /// Call counters
    pub fn stats(&self) -> MockStats {
        let mut stats = lock(&self.state).stats;
        stats.buffer_writes = self.writes.load(Ordering::Relaxed);
        stats
    }

    /// Make the next call of kind `op` fail with `error`
    pub fn fail_next(&self, op: MockOp, error: Error) {
        lock(&self.state).failures.push((op, error));
    }

    /// Contents of a live buffer
    pub fn buffer_contents(&self, id: ResourceId) -> Option<Vec<u8>> {
        lock(&self.state).buffer(id).ok().map(|buffer| buffer.contents())
    }

    /// Size of a live buffer
    pub fn buffer_size(&self, id: ResourceId) -> Option<u64> {
        lock(&self.state).buffer(id).ok().map(|buffer| buffer.size())
    }

    /// Whether a buffer is still alive
    pub fn is_buffer_alive(&self, id: ResourceId) -> bool {
        lock(&self.state).buffer(id).is_ok()
    }

    /// Number of buffers not yet dropped
    pub fn live_buffers(&self) -> usize {
        lock(&self.state).buffers.values().filter(|b| b.strong_count() > 0).count()
    }

    /// Number of descriptor sets not yet dropped
    pub fn live_descriptor_sets(&self) -> usize {
        lock(&self.state).descriptor_sets.values().filter(|s| s.strong_count() > 0).count()
    }

    /// Number of pipelines not yet dropped
    pub fn live_pipelines(&self) -> usize {
        lock(&self.state).pipelines.values().filter(|p| p.strong_count() > 0).count()
    }

    /// Number of command buffers not yet dropped
    pub fn live_command_buffers(&self) -> usize {
        lock(&self.state).command_logs.values().filter(|c| c.strong_count() > 0).count()
    }

    /// Buffer bound at `binding` of a live descriptor set
    pub fn descriptor_binding(&self, set: ResourceId, binding: u32) -> Option<ResourceId> {
        lock(&self.state)
            .descriptor_sets
            .get(&set)
            .and_then(Weak::upgrade)
            .and_then(|set| set.bound_buffer(binding))
    }

    /// Commands recorded in a live command buffer
    pub fn recorded_commands(&self, command_buffer: ResourceId) -> Vec<MockCommand> {
        lock(&self.state)
            .command_logs
            .get(&command_buffer)
            .and_then(Weak::upgrade)
            .and_then(|commands| commands.lock().ok().map(|c| c.clone()))
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
