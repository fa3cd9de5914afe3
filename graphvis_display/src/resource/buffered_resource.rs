/// BufferedResource - one copy of a resource per swapchain image
///
/// Always indexed by the frame's image index, never by a rotating cursor: the
/// presentation layer decides which image is free, so the resource slot follows.

use crate::error::{Error, Result};

#[derive(Debug)]
pub struct BufferedResource<T> {
    slots: Vec<T>,
}

impl<T> BufferedResource<T> {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Destroy every copy and create `image_count` new ones
    ///
    /// On failure the resource is left empty so a retry starts from scratch.
    pub fn rebuild<F>(&mut self, image_count: usize, mut create: F) -> Result<()>
    where
        F: FnMut(usize) -> Result<T>,
    {
        self.slots.clear();
        let mut slots = Vec::with_capacity(image_count);
        for image_index in 0..image_count {
            slots.push(create(image_index)?);
        }
        self.slots = slots;
        Ok(())
    }

    /// Apply `update` to every copy, stopping at the first failure
    pub fn try_for_each<F>(&mut self, mut update: F) -> Result<()>
    where
        F: FnMut(usize, &mut T) -> Result<()>,
    {
        for (image_index, slot) in self.slots.iter_mut().enumerate() {
            update(image_index, slot)?;
        }
        Ok(())
    }

    pub fn get(&self, image_index: usize) -> Option<&T> {
        self.slots.get(image_index)
    }

    pub fn get_mut(&mut self, image_index: usize) -> Option<&mut T> {
        self.slots.get_mut(image_index)
    }

    /// Slot for `image_index`, or `InvalidResource` naming `what`
    pub fn slot(&self, image_index: usize, what: &str) -> Result<&T> {
        self.slots.get(image_index).ok_or_else(|| {
            Error::InvalidResource(format!("{} for image {} ({} built)", what, image_index, self.slots.len()))
        })
    }

    pub fn slot_mut(&mut self, image_index: usize, what: &str) -> Result<&mut T> {
        let built = self.slots.len();
        self.slots.get_mut(image_index).ok_or_else(|| {
            Error::InvalidResource(format!("{} for image {} ({} built)", what, image_index, built))
        })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether the copy count matches the swapchain
    pub fn matches(&self, image_count: usize) -> bool {
        self.slots.len() == image_count
    }

    /// Drop every copy
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

impl<T> Default for BufferedResource<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "buffered_resource_tests.rs"]
mod tests;
