//! Unit tests for shared_resources.rs

use glam::Vec4;

use crate::error::Error;
use crate::graphics_device::mock_graphics_device::{MockGraphicsDevice, MockOp, MockInspector};
use crate::renderable::SharedResources;
use crate::resource::{DeviceContext, ResourceState};
use crate::task::VertexSnapshot;

fn setup() -> (SharedResources, MockInspector) {
    let device = MockGraphicsDevice::new();
    let inspector = device.inspector();
    let mut shared = SharedResources::new(DeviceContext::from_device(device).unwrap());
    shared.initialise();
    (shared, inspector)
}

fn positions(count: usize) -> Vec<Vec4> {
    (0..count).map(|i| Vec4::new(i as f32, 0.0, 0.0, 1.0)).collect()
}

#[test]
fn test_rebuild_creates_storage_buffer() {
    let (mut shared, inspector) = setup();
    assert!(!shared.needs_update());
    assert!(shared.positions_id().is_none());

    shared.commit_positions(VertexSnapshot::Rebuild(positions(3))).unwrap();
    assert_eq!(shared.state(), ResourceState::NeedsRebuild);
    shared.sync().unwrap();

    assert!(!shared.needs_update());
    assert_eq!(shared.node_count(), 3);
    let id = shared.positions_id().unwrap();
    assert_eq!(inspector.buffer_size(id), Some(48));
}

#[test]
fn test_partial_update_keeps_buffer_id() {
    let (mut shared, inspector) = setup();
    shared.commit_positions(VertexSnapshot::Rebuild(positions(4))).unwrap();
    shared.sync().unwrap();
    let id = shared.positions_id().unwrap();
    let before = inspector.stats();

    shared
        .commit_positions(VertexSnapshot::Partial {
            first: 2,
            vertices: vec![Vec4::new(9.0, 9.0, 9.0, 2.0)],
            element_count: 4,
        })
        .unwrap();
    assert_eq!(shared.state(), ResourceState::NeedsUpdate);
    shared.sync().unwrap();

    assert_eq!(shared.positions_id(), Some(id));
    let after = inspector.stats();
    assert_eq!(after.buffers_created, before.buffers_created);
    assert_eq!(after.bytes_copied - before.bytes_copied, 16);
}

#[test]
fn test_resize_replaces_buffer_id() {
    let (mut shared, _) = setup();
    shared.commit_positions(VertexSnapshot::Rebuild(positions(2))).unwrap();
    shared.sync().unwrap();
    let first = shared.positions_id();

    shared.commit_positions(VertexSnapshot::Rebuild(positions(5))).unwrap();
    shared.sync().unwrap();
    assert_ne!(shared.positions_id(), first);
}

#[test]
fn test_stale_partial_is_rejected() {
    let (mut shared, _) = setup();
    shared.commit_positions(VertexSnapshot::Rebuild(positions(2))).unwrap();

    let result = shared.commit_positions(VertexSnapshot::Partial {
        first: 0,
        vertices: positions(1),
        element_count: 7,
    });
    assert!(matches!(result, Err(Error::InvalidRange { count: 2, .. })));
}

#[test]
fn test_failed_position_rebuild_is_synced_later() {
    let (mut shared, inspector) = setup();
    inspector.fail_next(MockOp::CreateBuffer, Error::AllocationFailure("out of device memory".to_string()));

    let err = shared.commit_positions(VertexSnapshot::Rebuild(positions(2))).unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(shared.state(), ResourceState::NeedsRebuild);
    assert_eq!(shared.node_count(), 2);

    shared.sync().unwrap();
    let bytes = inspector.buffer_contents(shared.positions_id().unwrap()).unwrap();
    assert_eq!(bytemuck::pod_collect_to_vec::<u8, Vec4>(&bytes), positions(2));
}

#[test]
fn test_empty_rebuild_drops_buffer() {
    let (mut shared, inspector) = setup();
    shared.commit_positions(VertexSnapshot::Rebuild(positions(2))).unwrap();
    shared.sync().unwrap();

    shared.commit_positions(VertexSnapshot::Rebuild(Vec::new())).unwrap();
    shared.sync().unwrap();
    assert!(shared.positions_id().is_none());
    assert_eq!(inspector.live_buffers(), 0);
}

#[test]
fn test_destroy_releases_buffers() {
    let (mut shared, inspector) = setup();
    shared.commit_positions(VertexSnapshot::Rebuild(positions(2))).unwrap();
    shared.sync().unwrap();
    assert_eq!(inspector.live_buffers(), 2);

    shared.destroy();
    assert_eq!(inspector.live_buffers(), 0);
    assert_eq!(shared.node_count(), 0);
}
