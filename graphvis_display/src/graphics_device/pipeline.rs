/// Pipeline trait and pipeline descriptor

use bitflags::bitflags;
use crate::graphics_device::{DescriptorLayoutDesc, RenderPassHandle, ResourceId};

bitflags! {
    /// Shader stages
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShaderStageFlags: u32 {
        const VERTEX = 1 << 0;
        const GEOMETRY = 1 << 1;
        const FRAGMENT = 1 << 2;
    }
}

/// Vertex attribute data format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum BufferFormat {
    R32_SFLOAT,          // float (4 bytes)
    R32G32_SFLOAT,       // vec2 (8 bytes)
    R32G32B32_SFLOAT,    // vec3 (12 bytes)
    R32G32B32A32_SFLOAT, // vec4 (16 bytes)
    R32_SINT,
    R32G32B32A32_SINT,
}

impl BufferFormat {
    /// Returns size in bytes for this format
    pub fn size_bytes(&self) -> u32 {
        match self {
            BufferFormat::R32_SFLOAT | BufferFormat::R32_SINT => 4,
            BufferFormat::R32G32_SFLOAT => 8,
            BufferFormat::R32G32B32_SFLOAT => 12,
            BufferFormat::R32G32B32A32_SFLOAT | BufferFormat::R32G32B32A32_SINT => 16,
        }
    }
}

/// One vertex attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    pub location: u32,
    pub format: BufferFormat,
    pub offset: u32,
}

/// Vertex input layout (a single per-vertex binding)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct VertexLayout {
    pub stride: u32,
    pub attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    /// Build a tightly packed layout from a list of formats
    pub fn packed(formats: &[BufferFormat]) -> Self {
        let mut offset = 0;
        let attributes = formats
            .iter()
            .enumerate()
            .map(|(location, &format)| {
                let attribute = VertexAttribute { location: location as u32, format, offset };
                offset += format.size_bytes();
                attribute
            })
            .collect();
        Self { stride: offset, attributes }
    }
}

/// Primitive topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveTopology {
    PointList,
    LineList,
    TriangleList,
}

/// Push constant block visible to some stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PushConstantRange {
    pub stages: ShaderStageFlags,
    pub offset: u32,
    pub size: u32,
}

/// Color blending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendMode {
    Opaque,
    AlphaBlend,
}

/// Descriptor for creating a graphics pipeline
///
/// Shaders are referenced by name; the backend resolves names to compiled code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PipelineDesc {
    pub name: String,
    pub vertex_shader: String,
    pub geometry_shader: Option<String>,
    pub fragment_shader: String,
    pub vertex_layout: VertexLayout,
    pub topology: PrimitiveTopology,
    pub descriptor_layout: DescriptorLayoutDesc,
    pub push_constants: Option<PushConstantRange>,
    pub blend: BlendMode,
    pub depth_test: bool,
    pub render_pass: RenderPassHandle,
    pub extent: (u32, u32),
}

/// Graphics pipeline resource trait
pub trait Pipeline: Send + Sync {
    /// Process-unique id
    fn id(&self) -> ResourceId;

    /// Debug name
    fn name(&self) -> &str;
}
