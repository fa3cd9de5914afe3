/// ShaderLibrary - compiled SPIR-V referenced by name from pipeline descriptors

use graphvis_display::graphvis::{Error, Result};
use ash::vk;
use rustc_hash::FxHashMap;
use std::io::Cursor;

/// Named SPIR-V modules
///
/// Renderables name their shaders (`"icons.vert"`); the host registers the
/// compiled code once, before the first pipeline is built.
#[derive(Debug, Default, Clone)]
pub struct ShaderLibrary {
    modules: FxHashMap<String, Vec<u32>>,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register SPIR-V bytes under `name`, replacing any previous code
    pub fn insert(&mut self, name: impl Into<String>, spirv: &[u8]) -> Result<()> {
        let name = name.into();
        let words = ash::util::read_spv(&mut Cursor::new(spirv))
            .map_err(|e| Error::InvalidResource(format!("shader '{}' is not SPIR-V: {}", name, e)))?;
        self.modules.insert(name, words);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn code(&self, name: &str) -> Result<&[u32]> {
        self.modules
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::InvalidResource(format!("unknown shader '{}'", name)))
    }
}

/// Shader module destroyed on drop, alive only while a pipeline is built
pub(crate) struct ShaderModule<'a> {
    device: &'a ash::Device,
    pub(crate) module: vk::ShaderModule,
}

impl<'a> ShaderModule<'a> {
    pub(crate) fn new(device: &'a ash::Device, code: &[u32]) -> Result<Self> {
        let create_info = vk::ShaderModuleCreateInfo::default().code(code);
        let module = unsafe { device.create_shader_module(&create_info, None) }
            .map_err(|e| graphvis_display::engine_err!("graphvis::vulkan", "Failed to create shader module: {:?}", e))?;
        Ok(Self { device, module })
    }
}

impl Drop for ShaderModule<'_> {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_shader_module(self.module, None);
        }
    }
}

#[cfg(test)]
#[path = "vulkan_shader_tests.rs"]
mod tests;
