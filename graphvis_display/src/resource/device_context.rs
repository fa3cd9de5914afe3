/// DeviceContext - shared device handle plus lazily computed capability values
///
/// Every resource manager receives the same `Arc<DeviceContext>` at
/// construction. Padded uniform sizes are computed once per payload type and
/// per context, so two devices with different alignment never share a cache.

use std::any::TypeId;
use std::sync::{Arc, Mutex, MutexGuard};
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::graphics_device::{DeviceLimits, GraphicsDevice};

pub struct DeviceContext {
    device: Arc<Mutex<dyn GraphicsDevice>>,
    limits: DeviceLimits,
    padded_sizes: Mutex<FxHashMap<TypeId, u64>>,
}

impl DeviceContext {
    /// Wrap a device, reading its limits once
    pub fn new(device: Arc<Mutex<dyn GraphicsDevice>>) -> Result<Arc<Self>> {
        let limits = device
            .lock()
            .map_err(|_| Error::InitializationFailed("graphics device lock poisoned".to_string()))?
            .limits();
        if !limits.min_uniform_buffer_offset_alignment.is_power_of_two() {
            return Err(Error::InitializationFailed(format!(
                "uniform alignment {} is not a power of two",
                limits.min_uniform_buffer_offset_alignment
            )));
        }
        Ok(Arc::new(Self {
            device,
            limits,
            padded_sizes: Mutex::new(FxHashMap::default()),
        }))
    }

    /// Convenience constructor taking the device by value
    pub fn from_device<D: GraphicsDevice + 'static>(device: D) -> Result<Arc<Self>> {
        Self::new(Arc::new(Mutex::new(device)))
    }

    /// Lock the device for a sequence of calls
    pub fn lock_device(&self) -> Result<MutexGuard<'_, dyn GraphicsDevice + 'static>> {
        self.device
            .lock()
            .map_err(|_| Error::DriverCallFailure("graphics device lock poisoned".to_string()))
    }

    pub fn limits(&self) -> DeviceLimits {
        self.limits
    }

    /// Size of `T` rounded up to the uniform buffer alignment
    ///
    /// Zero-sized payloads stay zero (the stage has no uniform buffer).
    pub fn padded_uniform_size<T: 'static>(&self) -> u64 {
        let size = std::mem::size_of::<T>() as u64;
        if size == 0 {
            return 0;
        }
        let compute = || align_up(size, self.limits.min_uniform_buffer_offset_alignment);
        match self.padded_sizes.lock() {
            Ok(mut cache) => *cache.entry(TypeId::of::<T>()).or_insert_with(compute),
            Err(_) => compute(),
        }
    }

    /// Number of payload types cached so far
    pub fn cached_uniform_types(&self) -> usize {
        self.padded_sizes.lock().map(|cache| cache.len()).unwrap_or(0)
    }
}

fn align_up(size: u64, alignment: u64) -> u64 {
    let alignment = alignment.max(1);
    size.div_ceil(alignment) * alignment
}

#[cfg(test)]
#[path = "device_context_tests.rs"]
mod tests;
