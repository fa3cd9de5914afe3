/// StagedBuffer - host-visible staging buffer paired with a device-local buffer
///
/// Elements are written into the staging buffer, then copied into the
/// device-local buffer the GPU reads from. Two ways to drive it:
///
/// - one-shot: [`StagedBuffer::rebuild`] and [`StagedBuffer::update_partial`]
///   write staging and copy in the same call;
/// - split: an update task writes staging with [`StagedBuffer::stage_rebuild`]
///   or [`StagedBuffer::stage_partial`], and the next display update calls
///   [`StagedBuffer::sync_device`] to copy the pending range.
///
/// After every successful copy the device buffer has the staging buffer's
/// byte length. Both buffers are created lazily on first populate and dropped
/// when the element count becomes zero.
///
/// A stage that fails keeps the previous buffers untouched and holds the
/// elements as deferred work; the next stage or [`StagedBuffer::sync_device`]
/// replays it.

use std::marker::PhantomData;
use std::mem::size_of;
use std::sync::Arc;
use bytemuck::Pod;

use crate::error::{Error, Result};
use crate::graphics_device::{Buffer, BufferCopy, BufferDesc, BufferUsage, GraphicsDevice, ResourceId};

/// Inclusive element range waiting to be copied to the device buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending {
    first: usize,
    last: usize,
}

impl Pending {
    fn merge(self, other: Pending) -> Pending {
        Pending {
            first: self.first.min(other.first),
            last: self.last.max(other.last),
        }
    }
}

/// Host-side copy of writes that did not reach staging
#[derive(Debug, Clone)]
enum Deferred<V> {
    Rebuild(Vec<V>),
    Writes(Vec<(usize, Vec<V>)>),
}

pub struct StagedBuffer<V> {
    label: String,
    usage: BufferUsage,
    staging: Option<Arc<dyn Buffer>>,
    device: Option<Arc<dyn Buffer>>,
    count: usize,
    pending: Option<Pending>,
    deferred: Option<Deferred<V>>,
    _marker: PhantomData<fn() -> V>,
}

impl<V: Pod> StagedBuffer<V> {
    /// Empty pair; `usage` is the device buffer's usage (vertex, storage, ...)
    pub fn new(label: impl Into<String>, usage: BufferUsage) -> Self {
        Self {
            label: label.into(),
            usage,
            staging: None,
            device: None,
            count: 0,
            pending: None,
            deferred: None,
            _marker: PhantomData,
        }
    }

    /// Bytes per element
    pub fn stride() -> u64 {
        size_of::<V>() as u64
    }

    /// Number of elements staged, counting a deferred rebuild
    pub fn count(&self) -> usize {
        match &self.deferred {
            Some(Deferred::Rebuild(elements)) => elements.len(),
            _ => self.count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Staging byte length (0 when absent)
    pub fn staging_len(&self) -> u64 {
        self.staging.as_ref().map_or(0, |b| b.size())
    }

    /// Device byte length (0 when absent)
    pub fn device_len(&self) -> u64 {
        self.device.as_ref().map_or(0, |b| b.size())
    }

    pub fn staging_buffer(&self) -> Option<&Arc<dyn Buffer>> {
        self.staging.as_ref()
    }

    pub fn device_buffer(&self) -> Option<&Arc<dyn Buffer>> {
        self.device.as_ref()
    }

    /// Id of the device buffer, the handle other resources bind to
    pub fn device_id(&self) -> Option<ResourceId> {
        self.device.as_ref().map(|b| b.id())
    }

    /// Whether staged data is waiting for [`StagedBuffer::sync_device`]
    pub fn has_pending_copy(&self) -> bool {
        self.pending.is_some() || self.deferred.is_some()
    }

    /// Whether a failed stage is waiting to be replayed
    pub fn has_deferred(&self) -> bool {
        self.deferred.is_some()
    }

    /// A rebuild is mandatory when nothing is staged yet or the count changed
    pub fn needs_rebuild_for(&self, count: usize) -> bool {
        (self.staging.is_none() && self.deferred.is_none()) || count != self.count()
    }

    // ===== ONE-SHOT OPERATIONS =====

    /// Rebuild with `count` elements written by `populate`, then copy everything
    ///
    /// `count == 0` drops both buffers and succeeds.
    pub fn rebuild<F>(&mut self, device: &mut dyn GraphicsDevice, count: usize, populate: F) -> Result<()>
    where
        F: FnOnce(&mut [V]),
    {
        let mut elements = vec![V::zeroed(); count];
        populate(&mut elements);
        self.stage_rebuild(device, &elements)?;
        self.sync_device(device, true)
    }

    /// Rewrite elements `first..=last` with `populate` and copy only that range
    pub fn update_partial<F>(
        &mut self,
        device: &mut dyn GraphicsDevice,
        first: usize,
        last: usize,
        populate: F,
    ) -> Result<()>
    where
        F: FnOnce(&mut [V]),
    {
        self.check_range(first, last)?;
        let mut elements = vec![V::zeroed(); last - first + 1];
        populate(&mut elements);
        self.stage_partial(first, &elements)?;
        self.sync_device(device, false)
    }

    // ===== SPLIT OPERATIONS =====

    /// Write a full element array into staging
    ///
    /// Recreates the staging buffer when its byte length differs, and drops the
    /// device buffer with it. The whole range becomes pending. On failure the
    /// previous buffers stay as they were and `elements` is deferred.
    pub fn stage_rebuild(&mut self, device: &mut dyn GraphicsDevice, elements: &[V]) -> Result<()> {
        self.deferred = None;
        if elements.is_empty() {
            self.destroy();
            return Ok(());
        }
        if let Err(e) = self.write_rebuild(device, elements) {
            self.deferred = Some(Deferred::Rebuild(elements.to_vec()));
            return Err(e);
        }
        Ok(())
    }

    /// Write `elements` into staging starting at element `first`
    ///
    /// The range must lie inside the current element count; it is merged
    /// into the pending copy range. Behind deferred work the write is queued
    /// in order; a failed write is deferred itself.
    pub fn stage_partial(&mut self, first: usize, elements: &[V]) -> Result<()> {
        if elements.is_empty() {
            return Ok(());
        }
        let last = first + elements.len() - 1;
        self.check_range(first, last)?;

        match &mut self.deferred {
            Some(Deferred::Rebuild(all)) => {
                all[first..=last].copy_from_slice(elements);
                return Ok(());
            }
            Some(Deferred::Writes(writes)) => {
                writes.push((first, elements.to_vec()));
                return Ok(());
            }
            None => {}
        }
        if let Err(e) = self.write_partial(first, elements) {
            self.deferred = Some(Deferred::Writes(vec![(first, elements.to_vec())]));
            return Err(e);
        }
        Ok(())
    }

    /// Bring the device buffer up to date with staging
    ///
    /// With `rebuild`, or when the device buffer is missing or has the wrong
    /// size, the device buffer is recreated and the whole staging buffer
    /// copied. Otherwise only the pending range is copied.
    pub fn sync_device(&mut self, device: &mut dyn GraphicsDevice, rebuild: bool) -> Result<()> {
        self.replay_deferred(device)?;
        if self.count == 0 {
            self.device = None;
            self.pending = None;
            return Ok(());
        }

        let staging = Arc::clone(self.staging()?);
        let recreate = rebuild || self.device_len() != staging.size();
        if recreate {
            self.device = None;
            let target = device.create_buffer(&BufferDesc::device_local(
                self.label.clone(),
                staging.size(),
                self.usage,
            ))?;
            device.copy_buffer(staging.as_ref(), target.as_ref(), BufferCopy::aligned(0, staging.size()))?;
            self.device = Some(target);
        } else if let Some(pending) = self.pending {
            let target = self.device.as_ref().ok_or_else(|| {
                Error::InvalidResource(format!("{} device buffer", self.label))
            })?;
            let stride = Self::stride();
            let region = BufferCopy::aligned(
                pending.first as u64 * stride,
                (pending.last - pending.first + 1) as u64 * stride,
            );
            device.copy_buffer(staging.as_ref(), target.as_ref(), region)?;
        }
        self.pending = None;
        Ok(())
    }

    /// Drop both buffers
    pub fn destroy(&mut self) {
        self.staging = None;
        self.device = None;
        self.count = 0;
        self.pending = None;
        self.deferred = None;
    }

    fn write_rebuild(&mut self, device: &mut dyn GraphicsDevice, elements: &[V]) -> Result<()> {
        let byte_len = elements.len() as u64 * Self::stride();
        if self.staging_len() != byte_len {
            let staging = device.create_buffer(&BufferDesc::staging(
                format!("{} staging", self.label),
                byte_len,
            ))?;
            staging.update(0, bytemuck::cast_slice(elements))?;
            self.staging = Some(staging);
            self.device = None;
        } else {
            self.staging()?.update(0, bytemuck::cast_slice(elements))?;
        }
        self.count = elements.len();
        self.pending = Some(Pending { first: 0, last: self.count - 1 });
        Ok(())
    }

    fn write_partial(&mut self, first: usize, elements: &[V]) -> Result<()> {
        let staging = self.staging()?;
        staging.update(first as u64 * Self::stride(), bytemuck::cast_slice(elements))?;

        let written = Pending { first, last: first + elements.len() - 1 };
        self.pending = Some(match self.pending {
            Some(pending) => pending.merge(written),
            None => written,
        });
        Ok(())
    }

    /// Write deferred elements into staging, keeping whatever still fails
    fn replay_deferred(&mut self, device: &mut dyn GraphicsDevice) -> Result<()> {
        match self.deferred.take() {
            None => Ok(()),
            Some(Deferred::Rebuild(elements)) => self.stage_rebuild(device, &elements),
            Some(Deferred::Writes(writes)) => {
                let mut writes = writes.into_iter();
                while let Some((first, elements)) = writes.next() {
                    if let Err(e) = self.write_partial(first, &elements) {
                        let mut remaining = vec![(first, elements)];
                        remaining.extend(writes);
                        self.deferred = Some(Deferred::Writes(remaining));
                        return Err(e);
                    }
                }
                Ok(())
            }
        }
    }

    fn staging(&self) -> Result<&Arc<dyn Buffer>> {
        self.staging
            .as_ref()
            .ok_or_else(|| Error::InvalidResource(format!("{} staging buffer", self.label)))
    }

    fn check_range(&self, first: usize, last: usize) -> Result<()> {
        let count = self.count();
        if first > last || last >= count {
            crate::engine_error!(
                "graphvis::StagedBuffer",
                "{}: partial update [{}, {}] outside {} elements",
                self.label, first, last, count
            );
            return Err(Error::InvalidRange { first, last, count });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "staged_buffer_tests.rs"]
mod tests;
