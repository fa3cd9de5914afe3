//! Integration tests for the producer / render thread split
//!
//! A producer thread mutates a graph and sends update tasks while a render
//! thread runs frames against the headless mock device.
//! No GPU required.
//!
//! Run with: cargo test --test display_integration_tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use glam::{Vec3, Vec4};
use graphvis_display::graphvis::device::mock_graphics_device::{MockGraphicsDevice, MockInspector};
use graphvis_display::graphvis::device::{RenderPassHandle, SwapchainInfo};
use graphvis_display::graphvis::renderable::Renderable;
use graphvis_display::graphvis::renderer::{create_display, DisplayConfig, DisplayRenderer};
use graphvis_display::graphvis::resource::DeviceContext;
use graphvis_display::graphvis::visual::{
    ConnectionVisual, MemoryGraph, NodeVisual, VisualAccess, VisualChange, VisualProperty,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn swapchain() -> SwapchainInfo {
    SwapchainInfo {
        image_count: 2,
        width: 1280,
        height: 720,
        render_pass: RenderPassHandle(3),
    }
}

fn ring(nodes: usize) -> MemoryGraph {
    let mut graph = MemoryGraph::new();
    for i in 0..nodes {
        let angle = i as f32 / nodes as f32 * std::f32::consts::TAU;
        graph.add_node(NodeVisual::at(Vec3::new(angle.cos(), angle.sin(), 0.0)));
    }
    for i in 0..nodes {
        graph.add_connection(ConnectionVisual::between(i, (i + 1) % nodes));
    }
    graph.add_connection(ConnectionVisual::between(0, 0));
    graph
}

/// Node positions as the device holds them
fn device_positions(renderer: &DisplayRenderer, inspector: &MockInspector) -> Vec<Vec4> {
    let buffer = renderer.renderables().shared.positions_buffer().expect("positions buffer");
    let bytes = inspector.buffer_contents(buffer.id()).expect("buffer contents");
    bytemuck::pod_collect_to_vec::<u8, [f32; 4]>(&bytes)
        .into_iter()
        .map(Vec4::from_array)
        .collect()
}

// ============================================================================
// PRODUCER / RENDER THREAD
// ============================================================================

#[test]
fn test_integration_producer_and_render_threads() {
    let device = MockGraphicsDevice::new();
    let inspector = device.inspector();
    let context = DeviceContext::from_device(device).unwrap();
    let (renderer, mut processor) = create_display(context, DisplayConfig::default());
    let producer_done = Arc::new(AtomicBool::new(false));

    let done = Arc::clone(&producer_done);
    let render = thread::spawn(move || {
        let mut renderer = renderer;
        renderer.initialise().unwrap();
        renderer.set_new_swapchain(&swapchain()).unwrap();
        let mut image = 0;
        loop {
            let finished = done.load(Ordering::Acquire);
            assert!(renderer.frame(image).is_presented());
            image = (image + 1) % 2;
            if finished && renderer.pending_tasks() == 0 {
                break;
            }
            thread::yield_now();
        }
        renderer
    });

    let mut graph = ring(16);
    let mut rng = StdRng::seed_from_u64(0x9a11);
    processor.full_refresh(&graph).unwrap();
    for step in 0..200 {
        let changes = if step % 50 == 49 {
            let index = graph.add_node(NodeVisual::at(Vec3::splat(step as f32)));
            graph.add_connection(ConnectionVisual::between(index, 0));
            vec![
                VisualChange::full(VisualProperty::VerticesAdded),
                VisualChange::full(VisualProperty::ConnectionsAdded),
            ]
        } else {
            let index = rng.random_range(0..graph.node_count());
            let node = graph.node_mut(index).unwrap();
            node.position += Vec3::new(rng.random_range(-1.0..1.0), 0.5, 0.0);
            node.colour = Vec4::new(rng.random(), rng.random(), rng.random(), 1.0);
            vec![
                VisualChange::new(VisualProperty::VertexX, &[index]),
                VisualChange::new(VisualProperty::VertexColor, &[index]),
            ]
        };
        processor.process(&graph, &changes).unwrap();
    }
    producer_done.store(true, Ordering::Release);

    let mut renderer = render.join().unwrap();
    assert_eq!(renderer.frames_dropped(), 0);

    let expected: Vec<Vec4> = (0..graph.node_count())
        .map(|i| {
            let node = graph.node(i);
            node.position.extend(node.radius)
        })
        .collect();
    assert_eq!(device_positions(&renderer, &inspector)[..expected.len()], expected[..]);
    assert_eq!(renderer.renderables().icons.vertex_count(), graph.node_count());
    assert_eq!(renderer.renderables().links.vertex_count(), 2 * graph.connection_count());

    renderer.destroy();
    assert_eq!(inspector.live_buffers(), 0);
}

#[test]
fn test_integration_processor_outlives_renderer() {
    let context = DeviceContext::from_device(MockGraphicsDevice::new()).unwrap();
    let (renderer, mut processor) = create_display(context, DisplayConfig::default());
    assert!(processor.is_connected());

    drop(renderer);

    assert!(!processor.is_connected());
    assert!(processor.full_refresh(&ring(3)).is_err());
}
