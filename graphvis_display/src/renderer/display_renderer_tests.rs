//! Unit tests for display_renderer.rs

use glam::{Vec3, Vec4};

use crate::error::Error;
use crate::graphics_device::mock_graphics_device::{MockGraphicsDevice, MockOp, MockInspector};
use crate::graphics_device::{RenderPassHandle, SwapchainInfo};
use crate::renderable::{Renderable, RENDERABLE_COUNT};
use crate::renderer::{create_display, DisplayConfig, DisplayRenderer, FrameOutcome};
use crate::resource::DeviceContext;
use crate::visual::{
    Blaze, ConnectionVisual, MemoryGraph, NodeVisual, VisualChange, VisualProcessor, VisualProperty,
};

fn swapchain(width: u32, height: u32) -> SwapchainInfo {
    SwapchainInfo {
        image_count: 2,
        width,
        height,
        render_pass: RenderPassHandle(1),
    }
}

/// Graph with something for every renderable to draw
fn graph() -> MemoryGraph {
    let mut graph = MemoryGraph::new();
    for i in 0..4 {
        graph.add_node(NodeVisual::at(Vec3::new(i as f32, 0.0, 0.0)));
    }
    graph.node_mut(2).unwrap().blaze = Some(Blaze {
        angle_degrees: 90.0,
        colour: Vec4::new(0.0, 0.0, 1.0, 1.0),
    });
    graph.add_connection(ConnectionVisual::between(0, 1));
    graph.add_connection(ConnectionVisual::between(3, 3));
    graph.add_connection(ConnectionVisual::between(1, 2));
    graph
}

fn setup() -> (DisplayRenderer, VisualProcessor, MockInspector) {
    let device = MockGraphicsDevice::new();
    let inspector = device.inspector();
    let context = DeviceContext::from_device(device).unwrap();
    let (mut renderer, processor) = create_display(context, DisplayConfig::default());
    renderer.initialise().unwrap();
    renderer.set_new_swapchain(&swapchain(800, 600)).unwrap();
    (renderer, processor, inspector)
}

fn presented(outcome: FrameOutcome) -> Vec<crate::graphics_device::ResourceId> {
    match outcome {
        FrameOutcome::Presented { command_buffers } => command_buffers,
        FrameOutcome::Dropped(e) => panic!("frame dropped: {}", e),
    }
}

// ============================================================================
// Frames
// ============================================================================

#[test]
fn test_first_frame_records_every_renderable() {
    let (mut renderer, mut processor, _inspector) = setup();
    processor.full_refresh(&graph()).unwrap();
    assert!(renderer.pending_tasks() > 0);

    let command_buffers = presented(renderer.frame(0));

    assert_eq!(command_buffers.len(), RENDERABLE_COUNT);
    assert_eq!(renderer.pending_tasks(), 0);
    assert!(!renderer.needs_display_update());
    assert_eq!(renderer.frames_presented(), 1);
}

#[test]
fn test_empty_graph_draws_only_the_axes() {
    let (mut renderer, mut processor, _inspector) = setup();
    processor.full_refresh(&MemoryGraph::new()).unwrap();

    let command_buffers = presented(renderer.frame(0));

    assert_eq!(command_buffers.len(), 1);
    let axes = renderer.renderables().axes.command_buffer(0).unwrap();
    assert_eq!(command_buffers[0], axes.id());
}

#[test]
fn test_idle_frame_touches_no_resources() {
    let (mut renderer, mut processor, inspector) = setup();
    processor.full_refresh(&graph()).unwrap();
    presented(renderer.frame(0));
    let before = inspector.stats();

    presented(renderer.frame(1));

    let after = inspector.stats();
    assert_eq!(after.buffers_created, before.buffers_created);
    assert_eq!(after.copies, before.copies);
    assert_eq!(after.descriptor_updates, before.descriptor_updates);
    assert_eq!(after.pipelines_created, before.pipelines_created);
}

#[test]
fn test_position_change_reaches_the_device_next_frame() {
    let (mut renderer, mut processor, inspector) = setup();
    let mut graph = graph();
    processor.full_refresh(&graph).unwrap();
    presented(renderer.frame(0));
    let before = inspector.stats();

    graph.node_mut(1).unwrap().position = Vec3::new(5.0, 5.0, 5.0);
    processor.process(&graph, &[VisualChange::new(VisualProperty::VertexZ, &[1])]).unwrap();
    assert_eq!(renderer.process_tasks().committed, 1);
    assert!(renderer.needs_display_update());

    presented(renderer.frame(0));

    let after = inspector.stats();
    assert_eq!(after.buffers_created, before.buffers_created);
    assert_eq!(after.bytes_copied - before.bytes_copied, 16);
}

#[test]
fn test_frame_without_swapchain_is_dropped() {
    let device = MockGraphicsDevice::new();
    let context = DeviceContext::from_device(device).unwrap();
    let (mut renderer, mut processor) = create_display(context, DisplayConfig::default());
    renderer.initialise().unwrap();
    processor.full_refresh(&graph()).unwrap();

    match renderer.frame(0) {
        FrameOutcome::Dropped(Error::InitializationFailed(_)) => {}
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(renderer.frames_dropped(), 1);
}

#[test]
fn test_display_update_requires_initialise() {
    let context = DeviceContext::from_device(MockGraphicsDevice::new()).unwrap();
    let (mut renderer, _processor) = create_display(context, DisplayConfig::default());
    assert!(matches!(renderer.display_update(), Err(Error::InitializationFailed(_))));
}

#[test]
fn test_record_frame_rejects_unknown_image() {
    let (mut renderer, mut processor, _inspector) = setup();
    processor.full_refresh(&graph()).unwrap();
    presented(renderer.frame(0));

    assert!(matches!(renderer.record_frame(2), Err(Error::InvalidResource(_))));
    assert!(!renderer.frame(5).is_presented());
}

// ============================================================================
// Failure and retry
// ============================================================================

#[test]
fn test_failed_frame_is_retried() {
    let (mut renderer, mut processor, inspector) = setup();
    processor.full_refresh(&graph()).unwrap();
    inspector.fail_next(MockOp::CreatePipeline, Error::DriverCallFailure("pipeline".to_string()));

    match renderer.frame(0) {
        FrameOutcome::Dropped(e) => assert!(e.is_retryable()),
        other => panic!("unexpected outcome {:?}", other),
    }
    assert!(renderer.needs_display_update());

    let command_buffers = presented(renderer.frame(0));
    assert_eq!(command_buffers.len(), RENDERABLE_COUNT);
    assert!(!renderer.needs_display_update());
    assert_eq!((renderer.frames_presented(), renderer.frames_dropped()), (1, 1));
}

#[test]
fn test_failed_allocation_during_commit_drops_frame_and_keeps_geometry() {
    let (mut renderer, mut processor, inspector) = setup();
    processor.full_refresh(&graph()).unwrap();
    // The axes rebuild is the first task to allocate
    inspector.fail_next(MockOp::CreateBuffer, Error::AllocationFailure("out of device memory".to_string()));

    match renderer.frame(0) {
        FrameOutcome::Dropped(e) => assert!(e.is_fatal()),
        other => panic!("unexpected outcome {:?}", other),
    }
    let axes = &renderer.renderables().axes;
    assert_eq!(axes.vertex_count(), crate::renderable::axes::AXES_VERTEX_COUNT);
    assert!(renderer.needs_display_update());

    let command_buffers = presented(renderer.frame(1));
    assert_eq!(command_buffers.len(), RENDERABLE_COUNT);
    let axes = &renderer.renderables().axes;
    assert_eq!(axes.vertex_count(), crate::renderable::axes::AXES_VERTEX_COUNT);
    assert!(axes.manager().vertex_buffer().device_id().is_some());
    assert_eq!((renderer.frames_presented(), renderer.frames_dropped()), (1, 1));
}

#[test]
fn test_failed_staging_write_is_replayed_next_frame() {
    let (mut renderer, mut processor, inspector) = setup();
    let mut graph = graph();
    processor.full_refresh(&graph).unwrap();
    presented(renderer.frame(0));

    let node = graph.node_mut(1).unwrap();
    node.position = Vec3::new(5.0, 6.0, 7.0);
    let expected = node.position.extend(node.radius);
    processor.process(&graph, &[VisualChange::new(VisualProperty::VertexZ, &[1])]).unwrap();
    inspector.fail_next(MockOp::WriteBuffer, Error::DriverCallFailure("map failed".to_string()));

    match renderer.frame(1) {
        FrameOutcome::Dropped(e) => assert!(e.is_retryable()),
        other => panic!("unexpected outcome {:?}", other),
    }
    assert!(renderer.needs_display_update());

    presented(renderer.frame(0));
    let positions = renderer.renderables().shared.positions().device_id().unwrap();
    let bytes = inspector.buffer_contents(positions).unwrap();
    let on_device: Vec<Vec4> = bytemuck::pod_collect_to_vec(&bytes);
    assert_eq!(on_device[1], expected);
    assert!(!renderer.needs_display_update());
}

// ============================================================================
// Swapchain
// ============================================================================

#[test]
fn test_resize_keeps_vertex_buffers() {
    let (mut renderer, mut processor, inspector) = setup();
    processor.full_refresh(&graph()).unwrap();
    presented(renderer.frame(0));
    let before = inspector.stats();

    renderer.set_new_swapchain(&swapchain(1024, 768)).unwrap();
    presented(renderer.frame(0));

    let after = inspector.stats();
    assert_eq!(after.buffers_created, before.buffers_created);
    assert_eq!(after.pipelines_created, before.pipelines_created);
    assert_eq!(renderer.swapchain().map(|s| s.width), Some(1024));
}

#[test]
fn test_image_count_change_rebuilds_per_image_resources() {
    let (mut renderer, mut processor, inspector) = setup();
    processor.full_refresh(&graph()).unwrap();
    presented(renderer.frame(0));

    let mut three = swapchain(800, 600);
    three.image_count = 3;
    renderer.set_new_swapchain(&three).unwrap();
    let command_buffers = presented(renderer.frame(2));

    assert_eq!(command_buffers.len(), RENDERABLE_COUNT);
    assert_eq!(inspector.live_command_buffers(), 3 * RENDERABLE_COUNT);
}

// ============================================================================
// Destroy
// ============================================================================

#[test]
fn test_destroy_releases_every_resource() {
    let (mut renderer, mut processor, inspector) = setup();
    processor.full_refresh(&graph()).unwrap();
    presented(renderer.frame(0));
    assert!(inspector.live_buffers() > 0);

    renderer.destroy();

    assert_eq!(inspector.live_buffers(), 0);
    assert_eq!(inspector.live_descriptor_sets(), 0);
    assert_eq!(inspector.live_pipelines(), 0);
    assert_eq!(inspector.live_command_buffers(), 0);
    assert!(renderer.renderables().renderables().iter().all(|r| r.is_destroyed()));
    assert!(renderer.swapchain().is_none());
}
