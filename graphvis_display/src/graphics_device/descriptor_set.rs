/// Descriptor set trait and layout descriptors

use crate::graphics_device::{Buffer, ResourceId, ShaderStageFlags};

/// Kind of resource a descriptor binding references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorKind {
    UniformBuffer,
    StorageBuffer,
}

/// One binding slot of a descriptor set layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DescriptorBinding {
    /// Binding index in the shader
    pub binding: u32,
    /// Resource kind
    pub kind: DescriptorKind,
    /// Shader stages that read the binding
    pub stages: ShaderStageFlags,
}

/// Layout of a descriptor set
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DescriptorLayoutDesc {
    pub bindings: Vec<DescriptorBinding>,
}

impl DescriptorLayoutDesc {
    /// True when the layout has no bindings (no descriptor set is needed)
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// A buffer bound to one binding slot
#[derive(Clone, Copy)]
pub struct DescriptorWrite<'a> {
    pub binding: u32,
    pub kind: DescriptorKind,
    pub buffer: &'a dyn Buffer,
}

/// Descriptor set resource trait
///
/// The backend frees the set when the last handle is dropped.
pub trait DescriptorSet: Send + Sync {
    /// Process-unique id
    fn id(&self) -> ResourceId;
}
