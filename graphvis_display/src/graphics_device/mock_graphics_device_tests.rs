/// Unit tests for MockGraphicsDevice and associated mock types.

use crate::error::Error;
use crate::graphics_device::mock_graphics_device::*;
use crate::graphics_device::{
    BlendMode, Buffer, BufferCopy, BufferDesc, BufferFormat, BufferUsage, DescriptorBinding,
    CommandBuffer, DescriptorKind, DescriptorLayoutDesc, DescriptorSet, DescriptorWrite, GraphicsDevice, MemoryLocation,
    Pipeline, PipelineDesc, PrimitiveTopology, RenderPassHandle, ShaderStageFlags, VertexLayout,
};

fn uniform_layout() -> DescriptorLayoutDesc {
    DescriptorLayoutDesc {
        bindings: vec![DescriptorBinding {
            binding: 0,
            kind: DescriptorKind::UniformBuffer,
            stages: ShaderStageFlags::VERTEX,
        }],
    }
}

// ============================================================================
// Buffers
// ============================================================================

#[test]
fn test_create_buffer_counts_and_tracks() {
    let mut device = MockGraphicsDevice::new();
    let inspector = device.inspector();

    let buffer = device.create_buffer(&BufferDesc::staging("staging", 64)).unwrap();
    assert_eq!(buffer.size(), 64);
    assert_eq!(buffer.location(), MemoryLocation::HostVisible);
    assert_eq!(inspector.stats().buffers_created, 1);
    assert_eq!(inspector.stats().bytes_allocated, 64);
    assert_eq!(inspector.live_buffers(), 1);

    drop(buffer);
    assert_eq!(inspector.live_buffers(), 0);
}

#[test]
fn test_write_requires_host_visible_memory() {
    let mut device = MockGraphicsDevice::new();
    let device_local = device
        .create_buffer(&BufferDesc::device_local("vertices", 16, BufferUsage::VERTEX))
        .unwrap();
    assert!(matches!(device_local.update(0, &[1, 2, 3, 4]), Err(Error::DriverCallFailure(_))));
}

#[test]
fn test_write_out_of_bounds_fails() {
    let mut device = MockGraphicsDevice::new();
    let staging = device.create_buffer(&BufferDesc::staging("staging", 4)).unwrap();
    assert!(staging.update(2, &[0; 4]).is_err());
}

#[test]
fn test_copy_moves_bytes_into_device_buffer() {
    let mut device = MockGraphicsDevice::new();
    let inspector = device.inspector();
    let staging = device.create_buffer(&BufferDesc::staging("staging", 8)).unwrap();
    let local = device
        .create_buffer(&BufferDesc::device_local("local", 8, BufferUsage::VERTEX))
        .unwrap();

    staging.update(0, &[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
    device
        .copy_buffer(staging.as_ref(), local.as_ref(), BufferCopy::aligned(2, 4))
        .unwrap();

    assert_eq!(inspector.buffer_contents(local.id()).unwrap(), vec![0, 0, 3, 4, 5, 6, 0, 0]);
    assert_eq!(inspector.stats().copies, 1);
    assert_eq!(inspector.stats().bytes_copied, 4);
    assert_eq!(inspector.stats().buffer_writes, 1);
}

#[test]
fn test_copy_out_of_bounds_fails() {
    let mut device = MockGraphicsDevice::new();
    let a = device.create_buffer(&BufferDesc::staging("a", 8)).unwrap();
    let b = device.create_buffer(&BufferDesc::staging("b", 4)).unwrap();
    assert!(device.copy_buffer(a.as_ref(), b.as_ref(), BufferCopy::aligned(0, 8)).is_err());
}

// ============================================================================
// Failure injection
// ============================================================================

#[test]
fn test_fail_next_applies_once_to_matching_op() {
    let mut device = MockGraphicsDevice::new();
    let inspector = device.inspector();
    inspector.fail_next(MockOp::CreateBuffer, Error::AllocationFailure("full".to_string()));

    // Other ops are unaffected
    assert!(device.create_descriptor_set(&uniform_layout()).is_ok());

    let first = device.create_buffer(&BufferDesc::staging("a", 4));
    assert!(matches!(first, Err(Error::AllocationFailure(_))));
    assert!(device.create_buffer(&BufferDesc::staging("a", 4)).is_ok());
}

// ============================================================================
// Descriptor sets
// ============================================================================

#[test]
fn test_descriptor_update_records_binding() {
    let mut device = MockGraphicsDevice::new();
    let inspector = device.inspector();
    let set = device.create_descriptor_set(&uniform_layout()).unwrap();
    let ubo = device
        .create_buffer(&BufferDesc::device_local("ubo", 256, BufferUsage::UNIFORM))
        .unwrap();

    device
        .update_descriptor_set(
            set.as_ref(),
            &[DescriptorWrite { binding: 0, kind: DescriptorKind::UniformBuffer, buffer: ubo.as_ref() }],
        )
        .unwrap();

    assert_eq!(inspector.descriptor_binding(set.id(), 0), Some(ubo.id()));
    assert_eq!(inspector.stats().descriptor_updates, 1);
}

#[test]
fn test_descriptor_update_rejects_wrong_usage() {
    let mut device = MockGraphicsDevice::new();
    let set = device.create_descriptor_set(&uniform_layout()).unwrap();
    let vertices = device
        .create_buffer(&BufferDesc::device_local("vertices", 16, BufferUsage::VERTEX))
        .unwrap();

    let result = device.update_descriptor_set(
        set.as_ref(),
        &[DescriptorWrite { binding: 0, kind: DescriptorKind::UniformBuffer, buffer: vertices.as_ref() }],
    );
    assert!(result.is_err());
}

// ============================================================================
// Pipelines and command buffers
// ============================================================================

#[test]
fn test_command_recording_round() {
    let mut device = MockGraphicsDevice::new();
    let inspector = device.inspector();
    let pipeline = device
        .create_pipeline(&PipelineDesc {
            name: "points".to_string(),
            vertex_shader: "points.vert".to_string(),
            geometry_shader: None,
            fragment_shader: "points.frag".to_string(),
            vertex_layout: VertexLayout::packed(&[BufferFormat::R32G32B32A32_SFLOAT]),
            topology: PrimitiveTopology::PointList,
            descriptor_layout: DescriptorLayoutDesc::default(),
            push_constants: None,
            blend: BlendMode::Opaque,
            depth_test: true,
            render_pass: RenderPassHandle(7),
            extent: (640, 480),
        })
        .unwrap();
    assert_eq!(pipeline.name(), "points");

    let mut cmd = device.create_command_buffer().unwrap();
    assert!(cmd.draw(1, 0).is_err());
    cmd.begin(RenderPassHandle(7)).unwrap();
    cmd.bind_pipeline(pipeline.as_ref()).unwrap();
    cmd.draw(3, 0).unwrap();
    cmd.end().unwrap();

    let commands = inspector.recorded_commands(cmd.id());
    assert_eq!(commands.first(), Some(&MockCommand::Begin(RenderPassHandle(7))));
    assert!(commands.contains(&MockCommand::BindPipeline(pipeline.id())));
    assert!(commands.contains(&MockCommand::Draw { vertex_count: 3, first_vertex: 0 }));
    assert_eq!(commands.last(), Some(&MockCommand::End));
    assert_eq!(inspector.live_command_buffers(), 1);
    assert_eq!(inspector.live_pipelines(), 1);
}

#[test]
fn test_total_calls_sums_counters() {
    let mut device = MockGraphicsDevice::new();
    let inspector = device.inspector();
    let before = inspector.stats().total_calls();
    let _set = device.create_descriptor_set(&uniform_layout()).unwrap();
    let _cmd = device.create_command_buffer().unwrap();
    assert_eq!(inspector.stats().total_calls(), before + 2);
}
