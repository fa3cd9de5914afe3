//! Unit tests for staged_uniform.rs

use std::sync::Arc;
use bytemuck::{Pod, Zeroable};

use crate::error::Error;
use crate::graphics_device::mock_graphics_device::{MockGraphicsDevice, MockOp, MockInspector};
use crate::graphics_device::{Buffer, DeviceLimits};
use crate::resource::{DeviceContext, StagedUniform};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
struct TestUniform {
    scale: [f32; 4],
    flags: [u32; 4],
}

fn setup(alignment: u64) -> (Arc<DeviceContext>, MockInspector) {
    let device = MockGraphicsDevice::with_limits(DeviceLimits {
        min_uniform_buffer_offset_alignment: alignment,
        ..DeviceLimits::default()
    });
    let inspector = device.inspector();
    (DeviceContext::from_device(device).unwrap(), inspector)
}

#[test]
fn test_padded_size_follows_alignment() {
    let (context, _) = setup(64);
    let uniform = StagedUniform::<TestUniform>::new("test", &context);
    assert!(uniform.is_used());
    assert_eq!(uniform.padded_size(), 64);

    let (context, _) = setup(16);
    let uniform = StagedUniform::<TestUniform>::new("test", &context);
    assert_eq!(uniform.padded_size(), 32);
}

#[test]
fn test_unit_payload_creates_nothing() {
    let (context, inspector) = setup(256);
    let mut uniform = StagedUniform::<()>::new("unused", &context);
    let mut device = context.lock_device().unwrap();

    assert!(!uniform.is_used());
    uniform.create_staging(&mut *device).unwrap();
    uniform.rebuild(&mut *device, 3).unwrap();
    uniform.update(&mut *device).unwrap();

    assert_eq!(uniform.device_copies(), 0);
    assert_eq!(inspector.stats().total_calls(), 0);
}

#[test]
fn test_rebuild_creates_one_copy_per_image() {
    let (context, inspector) = setup(256);
    let mut uniform = StagedUniform::<TestUniform>::new("test", &context);
    let value = TestUniform { scale: [1.0, 2.0, 3.0, 4.0], flags: [7, 0, 0, 1] };
    uniform.set(value);

    let mut device = context.lock_device().unwrap();
    uniform.rebuild(&mut *device, 3).unwrap();

    assert_eq!(uniform.device_copies(), 3);
    for image_index in 0..3 {
        let buffer = uniform.buffer_for(image_index).unwrap();
        assert_eq!(buffer.size(), 256);
        let contents = inspector.buffer_contents(buffer.id()).unwrap();
        assert_eq!(&contents[..32], bytemuck::bytes_of(&value));
        assert!(contents[32..].iter().all(|&b| b == 0));
    }
    // staging + 3 device copies
    assert_eq!(inspector.stats().buffers_created, 4);
}

#[test]
fn test_update_copies_into_existing_buffers() {
    let (context, inspector) = setup(256);
    let mut uniform = StagedUniform::<TestUniform>::new("test", &context);
    let mut device = context.lock_device().unwrap();
    uniform.rebuild(&mut *device, 2).unwrap();
    let ids: Vec<_> = (0..2).map(|i| uniform.buffer_for(i).unwrap().id()).collect();
    let created = inspector.stats().buffers_created;

    let value = TestUniform { scale: [0.5; 4], flags: [1; 4] };
    uniform.set(value);
    uniform.update(&mut *device).unwrap();

    assert_eq!(inspector.stats().buffers_created, created);
    for (image_index, id) in ids.iter().enumerate() {
        assert_eq!(uniform.buffer_for(image_index).unwrap().id(), *id);
        let contents = inspector.buffer_contents(*id).unwrap();
        assert_eq!(&contents[..32], bytemuck::bytes_of(&value));
    }
}

#[test]
fn test_update_without_device_copies_fails() {
    let (context, _) = setup(256);
    let mut uniform = StagedUniform::<TestUniform>::new("test", &context);
    let mut device = context.lock_device().unwrap();
    uniform.create_staging(&mut *device).unwrap();

    let result = uniform.update(&mut *device);
    assert!(matches!(result, Err(Error::InvalidResource(_))));
}

#[test]
fn test_missing_image_slot_is_invalid_resource() {
    let (context, _) = setup(256);
    let mut uniform = StagedUniform::<TestUniform>::new("test", &context);
    let mut device = context.lock_device().unwrap();
    uniform.rebuild(&mut *device, 2).unwrap();

    assert!(uniform.buffer(1).is_some());
    assert!(matches!(uniform.buffer_for(2), Err(Error::InvalidResource(_))));
}

#[test]
fn test_failed_rebuild_leaves_no_copies() {
    let (context, inspector) = setup(256);
    let mut uniform = StagedUniform::<TestUniform>::new("test", &context);
    let mut device = context.lock_device().unwrap();
    uniform.rebuild(&mut *device, 3).unwrap();

    inspector.fail_next(MockOp::CopyBuffer, Error::DriverCallFailure("lost".to_string()));
    assert!(uniform.rebuild(&mut *device, 3).is_err());
    assert_eq!(uniform.device_copies(), 0);
    assert!(uniform.has_staging());
}

#[test]
fn test_destroy_releases_all_buffers() {
    let (context, inspector) = setup(256);
    let mut uniform = StagedUniform::<TestUniform>::new("test", &context);
    {
        let mut device = context.lock_device().unwrap();
        uniform.rebuild(&mut *device, 2).unwrap();
    }
    assert_eq!(inspector.live_buffers(), 3);

    uniform.destroy_device_copies();
    assert_eq!(inspector.live_buffers(), 1);
    uniform.destroy();
    assert_eq!(inspector.live_buffers(), 0);
}
