/// StagedUniform - one shader stage's uniform payload
///
/// The payload is written into a single host-visible staging buffer, then
/// copied into one device-local uniform buffer per swapchain image. Buffers
/// are sized to the payload rounded up to the device's uniform alignment.
///
/// A zero-sized payload (`()`) means the stage has no uniform: every
/// operation is a no-op and no buffer is ever created.

use std::sync::Arc;
use bytemuck::Pod;

use crate::error::{Error, Result};
use crate::graphics_device::{Buffer, BufferCopy, BufferDesc, BufferUsage, GraphicsDevice};
use crate::resource::{BufferedResource, DeviceContext};

pub struct StagedUniform<U> {
    label: String,
    value: U,
    padded_size: u64,
    staging: Option<Arc<dyn Buffer>>,
    device: BufferedResource<Arc<dyn Buffer>>,
}

impl<U: Pod> StagedUniform<U> {
    pub fn new(label: impl Into<String>, context: &DeviceContext) -> Self {
        Self {
            label: label.into(),
            value: U::zeroed(),
            padded_size: context.padded_uniform_size::<U>(),
            staging: None,
            device: BufferedResource::new(),
        }
    }

    /// Whether the stage has a uniform at all
    pub fn is_used(&self) -> bool {
        self.padded_size > 0
    }

    /// Buffer size, payload rounded up to the uniform alignment
    pub fn padded_size(&self) -> u64 {
        self.padded_size
    }

    pub fn value(&self) -> &U {
        &self.value
    }

    /// Replace the payload; it reaches the GPU on the next rebuild or update
    pub fn set(&mut self, value: U) {
        self.value = value;
    }

    /// Device buffer for `image_index`
    pub fn buffer(&self, image_index: usize) -> Option<&Arc<dyn Buffer>> {
        self.device.get(image_index)
    }

    /// Device buffer for `image_index`, or `InvalidResource`
    pub fn buffer_for(&self, image_index: usize) -> Result<&Arc<dyn Buffer>> {
        self.device.slot(image_index, &self.label)
    }

    /// Number of per-image device copies
    pub fn device_copies(&self) -> usize {
        self.device.len()
    }

    pub fn has_staging(&self) -> bool {
        self.staging.is_some()
    }

    /// Create the staging buffer if it does not exist yet
    pub fn create_staging(&mut self, device: &mut dyn GraphicsDevice) -> Result<()> {
        if !self.is_used() || self.staging.is_some() {
            return Ok(());
        }
        self.staging = Some(device.create_buffer(&BufferDesc::staging(
            format!("{} staging", self.label),
            self.padded_size,
        ))?);
        Ok(())
    }

    /// Recreate one device copy per swapchain image and fill them
    pub fn rebuild(&mut self, device: &mut dyn GraphicsDevice, image_count: usize) -> Result<()> {
        if !self.is_used() {
            return Ok(());
        }
        self.create_staging(device)?;
        let staging = self.write_staging()?;
        let label = &self.label;
        let size = self.padded_size;
        self.device.rebuild(image_count, |image_index| {
            let buffer = device.create_buffer(&BufferDesc::device_local(
                format!("{} [{}]", label, image_index),
                size,
                BufferUsage::UNIFORM,
            ))?;
            device.copy_buffer(staging.as_ref(), buffer.as_ref(), BufferCopy::aligned(0, size))?;
            Ok(buffer)
        })
    }

    /// Copy the current payload into the existing device copies
    pub fn update(&mut self, device: &mut dyn GraphicsDevice) -> Result<()> {
        if !self.is_used() {
            return Ok(());
        }
        if self.device.is_empty() {
            return Err(Error::InvalidResource(format!("{} has no device buffers to update", self.label)));
        }
        let staging = self.write_staging()?;
        let size = self.padded_size;
        self.device.try_for_each(|_, buffer| {
            device.copy_buffer(staging.as_ref(), buffer.as_ref(), BufferCopy::aligned(0, size))
        })
    }

    /// Drop the per-image device copies, keeping the staging buffer
    pub fn destroy_device_copies(&mut self) {
        self.device.clear();
    }

    /// Drop every buffer
    pub fn destroy(&mut self) {
        self.device.clear();
        self.staging = None;
    }

    fn write_staging(&self) -> Result<Arc<dyn Buffer>> {
        let staging = self
            .staging
            .as_ref()
            .ok_or_else(|| Error::InvalidResource(format!("{} staging buffer", self.label)))?;
        staging.update(0, bytemuck::bytes_of(&self.value))?;
        Ok(Arc::clone(staging))
    }
}

#[cfg(test)]
#[path = "staged_uniform_tests.rs"]
mod tests;
