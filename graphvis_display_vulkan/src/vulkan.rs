/// VulkanGraphicsDevice - Vulkan implementation of the GraphicsDevice trait
///
/// Owns the instance, the logical device and the shared [`GpuContext`]. The
/// host application keeps ownership of the swapchain and the render pass: it
/// passes the render pass through `SwapchainInfo::render_pass` (see
/// [`render_pass_handle`]) and executes the secondary command buffers the
/// renderables record (see [`raw_command_buffer`]).

use graphvis_display::graphvis::{Error, GraphicsDevice, Result};
use graphvis_display::graphvis::device::{
    Buffer as GraphicsBuffer, BufferCopy, BufferDesc, CommandBuffer as GraphicsCommandBuffer,
    Config, DescriptorLayoutDesc, DescriptorSet as GraphicsDescriptorSet, DescriptorWrite,
    DeviceLimits, Pipeline as GraphicsPipeline, PipelineDesc, RenderPassHandle,
};
use graphvis_display::{engine_debug, engine_err, engine_error, engine_info, engine_warn};
use ash::vk::{self, Handle};
use gpu_allocator::vulkan::{AllocationCreateDesc, AllocationScheme, Allocator, AllocatorCreateDesc};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use rustc_hash::FxHashMap;
use std::ffi::CString;
use std::mem::ManuallyDrop;
use std::sync::Arc;

use crate::vulkan_buffer::Buffer;
use crate::vulkan_command_buffer::CommandBuffer;
use crate::vulkan_context::GpuContext;
use crate::vulkan_descriptor_set::DescriptorSet;
use crate::vulkan_format::{
    blend_attachment, buffer_format_to_vk, buffer_usage_to_vk, creation_error, descriptor_kind_to_vk,
    memory_location_to_allocator, stage_flags_to_vk, topology_to_vk,
};
use crate::vulkan_pipeline::Pipeline;
use crate::vulkan_shader::{ShaderLibrary, ShaderModule};

const SOURCE: &str = "graphvis::vulkan";

/// Host render pass as seen by the core
pub fn render_pass_handle(render_pass: vk::RenderPass) -> RenderPassHandle {
    RenderPassHandle(render_pass.as_raw())
}

/// Raw handle of a command buffer created by [`VulkanGraphicsDevice`]
///
/// Only valid for command buffers this backend created; the host passes the
/// result to `vkCmdExecuteCommands`.
pub fn raw_command_buffer(command_buffer: &dyn GraphicsCommandBuffer) -> vk::CommandBuffer {
    unsafe {
        let vk_command_buffer = &*(command_buffer as *const dyn GraphicsCommandBuffer as *const CommandBuffer);
        vk_command_buffer.command_buffer()
    }
}

/// Debug messenger, only present with validation enabled
struct DebugMessenger {
    loader: ash::ext::debug_utils::Instance,
    messenger: vk::DebugUtilsMessengerEXT,
}

/// Vulkan graphics device
pub struct VulkanGraphicsDevice {
    /// Vulkan entry (keeps the loader library alive)
    _entry: ash::Entry,
    instance: ash::Instance,
    physical_device: vk::PhysicalDevice,
    debug_messenger: Option<DebugMessenger>,

    /// Shared GPU context for every resource
    gpu_context: Arc<GpuContext>,

    /// SPIR-V registered by name, resolved at pipeline creation
    shaders: ShaderLibrary,
    /// One layout per distinct binding set, shared by descriptor sets and pipelines
    set_layouts: FxHashMap<DescriptorLayoutDesc, vk::DescriptorSetLayout>,

    limits: DeviceLimits,
    config: Config,
}

impl VulkanGraphicsDevice {
    /// Create a device able to present to `window`
    pub fn new<W: HasDisplayHandle + HasWindowHandle>(window: &W, config: Config) -> Result<Self> {
        unsafe {
            let entry = Self::load_entry()?;

            let display_handle = window.display_handle()
                .map_err(|e| {
                    engine_error!(SOURCE, "Failed to get display handle: {}", e);
                    Error::InitializationFailed(format!("Failed to get display handle: {}", e))
                })?;
            let extension_names = ash_window::enumerate_required_extensions(display_handle.as_raw())
                .map_err(|e| {
                    engine_error!(SOURCE, "Failed to get required extensions: {}", e);
                    Error::InitializationFailed(format!("Failed to get required extensions: {}", e))
                })?
                .to_vec();

            let instance = Self::create_instance(&entry, &config, extension_names)?;

            // Temporary surface, only used to pick a queue family that can present
            let window_handle = window.window_handle()
                .map_err(|e| {
                    engine_error!(SOURCE, "Failed to get window handle: {}", e);
                    Error::InitializationFailed(format!("Failed to get window handle: {}", e))
                })?;
            let surface = ash_window::create_surface(
                &entry,
                &instance,
                display_handle.as_raw(),
                window_handle.as_raw(),
                None,
            )
            .map_err(|e| {
                engine_error!(SOURCE, "Failed to create surface: {:?}", e);
                Error::InitializationFailed(format!("Failed to create surface: {:?}", e))
            })?;
            let surface_loader = ash::khr::surface::Instance::new(&entry, &instance);

            let result = Self::from_instance(entry, instance, config, true, |physical_device, family| {
                surface_loader
                    .get_physical_device_surface_support(physical_device, family, surface)
                    .unwrap_or(false)
            });
            surface_loader.destroy_surface(surface, None);
            result
        }
    }

    /// Create a device without a window (offscreen rendering, tests)
    pub fn headless(config: Config) -> Result<Self> {
        unsafe {
            let entry = Self::load_entry()?;
            let instance = Self::create_instance(&entry, &config, Vec::new())?;
            Self::from_instance(entry, instance, config, false, |_, _| true)
        }
    }

    unsafe fn load_entry() -> Result<ash::Entry> {
        ash::Entry::load().map_err(|e| {
            engine_error!(SOURCE, "Failed to load Vulkan library: {:?}", e);
            Error::InitializationFailed(format!("Failed to load Vulkan library: {:?}", e))
        })
    }

    unsafe fn create_instance(
        entry: &ash::Entry,
        config: &Config,
        mut extension_names: Vec<*const std::os::raw::c_char>,
    ) -> Result<ash::Instance> {
        let app_name = CString::new(config.app_name.as_str())
            .map_err(|_| Error::InitializationFailed("application name contains a NUL byte".to_string()))?;
        let (major, minor, patch) = config.app_version;
        let app_info = vk::ApplicationInfo::default()
            .application_name(&app_name)
            .application_version(vk::make_api_version(0, major, minor, patch))
            .engine_name(c"Graphvis")
            .engine_version(vk::make_api_version(0, 0, 1, 0))
            .api_version(vk::API_VERSION_1_3);

        let validation = Self::validation_enabled(config);
        if validation {
            extension_names.push(ash::ext::debug_utils::NAME.as_ptr());
        }
        let layer_names = if validation {
            vec![c"VK_LAYER_KHRONOS_validation".as_ptr()]
        } else {
            vec![]
        };

        let create_info = vk::InstanceCreateInfo::default()
            .application_info(&app_info)
            .enabled_layer_names(&layer_names)
            .enabled_extension_names(&extension_names);

        entry.create_instance(&create_info, None).map_err(|e| {
            engine_error!(SOURCE, "Failed to create Vulkan instance: {:?}", e);
            Error::InitializationFailed(format!("Failed to create instance: {:?}", e))
        })
    }

    /// Validation needs both the runtime flag and the compiled-in callback
    fn validation_enabled(config: &Config) -> bool {
        config.enable_validation && cfg!(feature = "vulkan-validation")
    }

    #[cfg(feature = "vulkan-validation")]
    unsafe fn create_debug_messenger(entry: &ash::Entry, instance: &ash::Instance) -> Result<DebugMessenger> {
        let loader = ash::ext::debug_utils::Instance::new(entry, instance);
        crate::debug::reset_validation_stats();

        let debug_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
            .message_severity(
                vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
                    | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                    | vk::DebugUtilsMessageSeverityFlagsEXT::INFO,
            )
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            )
            .pfn_user_callback(Some(crate::debug::vulkan_debug_callback));

        let messenger = loader.create_debug_utils_messenger(&debug_info, None).map_err(|e| {
            engine_error!(SOURCE, "Failed to create debug messenger: {:?}", e);
            Error::InitializationFailed(format!("Failed to create debug messenger: {:?}", e))
        })?;
        Ok(DebugMessenger { loader, messenger })
    }

    #[cfg(not(feature = "vulkan-validation"))]
    unsafe fn create_debug_messenger(_entry: &ash::Entry, _instance: &ash::Instance) -> Result<DebugMessenger> {
        Err(Error::InitializationFailed("validation support not compiled in".to_string()))
    }

    /// Create a descriptor pool holding `size` sets
    fn create_descriptor_pool(device: &ash::Device, size: u32) -> Result<vk::DescriptorPool> {
        let size = size.max(1);
        let pool_sizes = [
            // Up to three uniform stages per set
            vk::DescriptorPoolSize {
                ty: vk::DescriptorType::UNIFORM_BUFFER,
                descriptor_count: size * 3,
            },
            vk::DescriptorPoolSize {
                ty: vk::DescriptorType::STORAGE_BUFFER,
                descriptor_count: size,
            },
        ];
        let info = vk::DescriptorPoolCreateInfo::default()
            .flags(vk::DescriptorPoolCreateFlags::FREE_DESCRIPTOR_SET)
            .pool_sizes(&pool_sizes)
            .max_sets(size);

        unsafe {
            device.create_descriptor_pool(&info, None).map_err(|e| {
                engine_error!(SOURCE, "Failed to create descriptor pool: {:?}", e);
                Error::InitializationFailed(format!("Failed to create descriptor pool: {:?}", e))
            })
        }
    }

    unsafe fn from_instance<F>(
        entry: ash::Entry,
        instance: ash::Instance,
        config: Config,
        swapchain: bool,
        can_present: F,
    ) -> Result<Self>
    where
        F: Fn(vk::PhysicalDevice, u32) -> bool,
    {
        let debug_messenger = if Self::validation_enabled(&config) {
            Some(Self::create_debug_messenger(&entry, &instance)?)
        } else {
            None
        };

        let physical_devices = instance.enumerate_physical_devices().map_err(|e| {
            engine_error!(SOURCE, "Failed to enumerate physical devices: {:?}", e);
            Error::InitializationFailed(format!("Failed to enumerate physical devices: {:?}", e))
        })?;

        // First device with a graphics queue family that can also present
        let (physical_device, graphics_family_index) = physical_devices
            .into_iter()
            .find_map(|physical_device| {
                instance
                    .get_physical_device_queue_family_properties(physical_device)
                    .iter()
                    .enumerate()
                    .find(|(i, qf)| {
                        qf.queue_flags.contains(vk::QueueFlags::GRAPHICS)
                            && can_present(physical_device, *i as u32)
                    })
                    .map(|(i, _)| (physical_device, i as u32))
            })
            .ok_or_else(|| {
                engine_error!(SOURCE, "No Vulkan-capable GPU with a graphics queue found");
                Error::InitializationFailed("No Vulkan-capable GPU found".to_string())
            })?;

        let properties = instance.get_physical_device_properties(physical_device);
        let limits = DeviceLimits {
            min_uniform_buffer_offset_alignment: properties.limits.min_uniform_buffer_offset_alignment,
            max_push_constants_size: properties.limits.max_push_constants_size,
        };
        let device_name = properties
            .device_name_as_c_str()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "unknown".to_string());
        engine_info!(SOURCE, "Using GPU '{}' (queue family {})", device_name, graphics_family_index);

        // Logical device: a single graphics queue, also used for transfers
        let queue_priorities = [1.0];
        let queue_create_infos = [vk::DeviceQueueCreateInfo::default()
            .queue_family_index(graphics_family_index)
            .queue_priorities(&queue_priorities)];

        // The host builds its swapchain on this device
        let device_extension_names = if swapchain {
            vec![ash::khr::swapchain::NAME.as_ptr()]
        } else {
            vec![]
        };
        let device_features = vk::PhysicalDeviceFeatures::default().geometry_shader(true);

        let device_create_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(&queue_create_infos)
            .enabled_extension_names(&device_extension_names)
            .enabled_features(&device_features);

        let device = instance
            .create_device(physical_device, &device_create_info, None)
            .map_err(|e| {
                engine_error!(SOURCE, "Failed to create logical device: {:?}", e);
                Error::InitializationFailed(format!("Failed to create device: {:?}", e))
            })?;

        let graphics_queue = device.get_device_queue(graphics_family_index, 0);

        let allocator = Allocator::new(&AllocatorCreateDesc {
            instance: instance.clone(),
            device: device.clone(),
            physical_device,
            debug_settings: Default::default(),
            buffer_device_address: false,
            allocation_sizes: Default::default(),
        })
        .map_err(|e| {
            engine_error!(SOURCE, "Failed to create GPU allocator: {:?}", e);
            Error::InitializationFailed(format!("Failed to create allocator: {:?}", e))
        })?;

        let descriptor_pool = Self::create_descriptor_pool(&device, config.descriptor_pool_size)?;

        // TRANSIENT + RESET for reusable one-shot copies
        let upload_pool_create_info = vk::CommandPoolCreateInfo::default()
            .queue_family_index(graphics_family_index)
            .flags(vk::CommandPoolCreateFlags::TRANSIENT | vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);

        let upload_command_pool = device.create_command_pool(&upload_pool_create_info, None)
            .map_err(|e| {
                engine_error!(SOURCE, "Failed to create upload command pool: {:?}", e);
                Error::InitializationFailed(format!("Failed to create upload command pool: {:?}", e))
            })?;

        let gpu_context = Arc::new(GpuContext::new(
            device,
            allocator,
            graphics_queue,
            graphics_family_index,
            upload_command_pool,
            descriptor_pool,
        ));

        Ok(Self {
            _entry: entry,
            instance,
            physical_device,
            debug_messenger,
            gpu_context,
            shaders: ShaderLibrary::new(),
            set_layouts: FxHashMap::default(),
            limits,
            config,
        })
    }

    /// Register SPIR-V bytecode under the name pipelines refer to
    pub fn register_shader(&mut self, name: impl Into<String>, spirv: &[u8]) -> Result<()> {
        self.shaders.insert(name, spirv)
    }

    pub fn shaders(&self) -> &ShaderLibrary {
        &self.shaders
    }

    pub fn shaders_mut(&mut self) -> &mut ShaderLibrary {
        &mut self.shaders
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn instance(&self) -> &ash::Instance {
        &self.instance
    }

    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    /// Logical device, for the host's swapchain and render pass
    pub fn device(&self) -> &ash::Device {
        &self.gpu_context.device
    }

    pub fn graphics_queue(&self) -> vk::Queue {
        self.gpu_context.graphics_queue
    }

    pub fn graphics_queue_family(&self) -> u32 {
        self.gpu_context.graphics_queue_family
    }

    /// Number of descriptor set layouts created so far
    pub fn set_layout_count(&self) -> usize {
        self.set_layouts.len()
    }

    /// Cached layout for a binding set, created on first use
    fn set_layout(&mut self, desc: &DescriptorLayoutDesc) -> Result<vk::DescriptorSetLayout> {
        if let Some(&layout) = self.set_layouts.get(desc) {
            return Ok(layout);
        }

        let bindings: Vec<vk::DescriptorSetLayoutBinding> = desc.bindings
            .iter()
            .map(|binding| {
                vk::DescriptorSetLayoutBinding::default()
                    .binding(binding.binding)
                    .descriptor_type(descriptor_kind_to_vk(binding.kind))
                    .descriptor_count(1)
                    .stage_flags(stage_flags_to_vk(binding.stages))
            })
            .collect();
        let layout_create = vk::DescriptorSetLayoutCreateInfo::default().bindings(&bindings);

        let layout = unsafe {
            self.gpu_context.device.create_descriptor_set_layout(&layout_create, None)
                .map_err(|e| engine_err!(SOURCE, "Failed to create descriptor set layout: {:?}", e))?
        };
        engine_debug!(SOURCE, "Descriptor set layout created ({} bindings)", bindings.len());
        self.set_layouts.insert(desc.clone(), layout);
        Ok(layout)
    }

    /// Submit a one-shot command buffer from the upload pool and wait for it
    unsafe fn submit_one_shot<F>(&self, record: F) -> Result<()>
    where
        F: FnOnce(vk::CommandBuffer),
    {
        let ctx = &self.gpu_context;
        let pool = ctx.upload_pool()?;

        let allocate_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(*pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(1);
        let command_buffer = ctx.device.allocate_command_buffers(&allocate_info)
            .map_err(|e| engine_err!(SOURCE, "Failed to allocate transfer command buffer: {:?}", e))?[0];

        let result = (|| {
            let begin_info = vk::CommandBufferBeginInfo::default()
                .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
            ctx.device.begin_command_buffer(command_buffer, &begin_info)
                .map_err(|e| engine_err!(SOURCE, "Failed to begin transfer command buffer: {:?}", e))?;

            record(command_buffer);

            ctx.device.end_command_buffer(command_buffer)
                .map_err(|e| engine_err!(SOURCE, "Failed to end transfer command buffer: {:?}", e))?;

            let command_buffers = [command_buffer];
            let submit_info = vk::SubmitInfo::default().command_buffers(&command_buffers);
            ctx.device.queue_submit(ctx.graphics_queue, &[submit_info], vk::Fence::null())
                .map_err(|e| engine_err!(SOURCE, "Failed to submit transfer commands: {:?}", e))?;

            ctx.device.queue_wait_idle(ctx.graphics_queue)
                .map_err(|e| engine_err!(SOURCE, "Failed to wait for transfer completion: {:?}", e))
        })();

        ctx.device.free_command_buffers(*pool, &[command_buffer]);
        result
    }
}

impl GraphicsDevice for VulkanGraphicsDevice {
    fn create_buffer(&mut self, desc: &BufferDesc) -> Result<Arc<dyn GraphicsBuffer>> {
        let ctx = &self.gpu_context;
        unsafe {
            let buffer_create_info = vk::BufferCreateInfo::default()
                .size(desc.size.max(1))
                .usage(buffer_usage_to_vk(desc.usage))
                .sharing_mode(vk::SharingMode::EXCLUSIVE);

            let buffer = ctx.device.create_buffer(&buffer_create_info, None).map_err(|e| {
                let message = format!("Failed to create buffer '{}' of size {} bytes: {:?}", desc.label, desc.size, e);
                engine_error!(SOURCE, "{}", message);
                creation_error(e, message)
            })?;

            let requirements = ctx.device.get_buffer_memory_requirements(buffer);

            let allocation = ctx.allocator().and_then(|mut allocator| {
                allocator.allocate(&AllocationCreateDesc {
                    name: &desc.label,
                    requirements,
                    location: memory_location_to_allocator(desc.location),
                    linear: true,
                    allocation_scheme: AllocationScheme::GpuAllocatorManaged,
                })
                .map_err(|e| {
                    let size_mb = requirements.size as f64 / (1024.0 * 1024.0);
                    engine_error!(SOURCE, "Out of GPU memory for buffer '{}' (required: {:.2} MB)", desc.label, size_mb);
                    Error::AllocationFailure(format!("{}: {}", desc.label, e))
                })
            });
            let allocation = match allocation {
                Ok(allocation) => allocation,
                Err(e) => {
                    ctx.device.destroy_buffer(buffer, None);
                    return Err(e);
                }
            };

            if let Err(e) = ctx.device.bind_buffer_memory(buffer, allocation.memory(), allocation.offset()) {
                ctx.device.destroy_buffer(buffer, None);
                if let Ok(mut allocator) = ctx.allocator() {
                    allocator.free(allocation).ok();
                }
                let message = format!("Failed to bind memory of buffer '{}': {:?}", desc.label, e);
                engine_error!(SOURCE, "{}", message);
                return Err(creation_error(e, message));
            }

            Ok(Arc::new(Buffer::new(
                Arc::clone(ctx),
                buffer,
                allocation,
                desc.size,
                desc.location,
            )))
        }
    }

    fn copy_buffer(&mut self, src: &dyn GraphicsBuffer, dst: &dyn GraphicsBuffer, region: BufferCopy) -> Result<()> {
        if region.size == 0 {
            return Ok(());
        }
        if region.src_offset + region.size > src.size() || region.dst_offset + region.size > dst.size() {
            return Err(Error::InvalidResource(format!(
                "copy of {} bytes out of bounds (src {} + {}, dst {} + {})",
                region.size,
                src.size(),
                region.src_offset,
                dst.size(),
                region.dst_offset
            )));
        }

        unsafe {
            let vk_src = &*(src as *const dyn GraphicsBuffer as *const Buffer);
            let vk_dst = &*(dst as *const dyn GraphicsBuffer as *const Buffer);
            let device = &self.gpu_context.device;

            self.submit_one_shot(|command_buffer| {
                let copy = vk::BufferCopy {
                    src_offset: region.src_offset,
                    dst_offset: region.dst_offset,
                    size: region.size,
                };
                device.cmd_copy_buffer(command_buffer, vk_src.buffer, vk_dst.buffer, &[copy]);
            })
        }
    }

    fn create_descriptor_set(&mut self, layout: &DescriptorLayoutDesc) -> Result<Arc<dyn GraphicsDescriptorSet>> {
        let set_layout = self.set_layout(layout)?;
        let ctx = &self.gpu_context;
        let layouts = [set_layout];

        unsafe {
            // Grow the pool list when the current pool is exhausted
            let mut pools = ctx.descriptor_pools()?;
            let current_pool = *pools.last()
                .ok_or_else(|| Error::InvalidResource("no descriptor pool".to_string()))?;
            let allocate_info = vk::DescriptorSetAllocateInfo::default()
                .descriptor_pool(current_pool)
                .set_layouts(&layouts);

            let (sets, pool) = match ctx.device.allocate_descriptor_sets(&allocate_info) {
                Ok(sets) => (sets, current_pool),
                Err(vk::Result::ERROR_OUT_OF_POOL_MEMORY) | Err(vk::Result::ERROR_FRAGMENTED_POOL) => {
                    let new_pool = Self::create_descriptor_pool(&ctx.device, self.config.descriptor_pool_size)?;
                    pools.push(new_pool);
                    engine_info!(SOURCE, "Descriptor pool exhausted, created new pool (total: {})", pools.len());
                    let retry_info = vk::DescriptorSetAllocateInfo::default()
                        .descriptor_pool(new_pool)
                        .set_layouts(&layouts);
                    let sets = ctx.device.allocate_descriptor_sets(&retry_info)
                        .map_err(|e| engine_err!(SOURCE, "Failed to allocate descriptor set after pool growth: {:?}", e))?;
                    (sets, new_pool)
                }
                Err(e) => return Err(engine_err!(SOURCE, "Failed to allocate descriptor set: {:?}", e)),
            };
            drop(pools);

            Ok(Arc::new(DescriptorSet::new(Arc::clone(ctx), sets[0], pool)))
        }
    }

    fn update_descriptor_set(&mut self, set: &dyn GraphicsDescriptorSet, writes: &[DescriptorWrite<'_>]) -> Result<()> {
        if writes.is_empty() {
            return Ok(());
        }

        unsafe {
            let vk_set = &*(set as *const dyn GraphicsDescriptorSet as *const DescriptorSet);

            // Buffer infos must outlive the write structs that point at them
            let buffer_infos: Vec<[vk::DescriptorBufferInfo; 1]> = writes
                .iter()
                .map(|write| {
                    let vk_buffer = &*(write.buffer as *const dyn GraphicsBuffer as *const Buffer);
                    [vk::DescriptorBufferInfo {
                        buffer: vk_buffer.buffer,
                        offset: 0,
                        range: vk::WHOLE_SIZE,
                    }]
                })
                .collect();

            let vk_writes: Vec<vk::WriteDescriptorSet> = writes
                .iter()
                .zip(buffer_infos.iter())
                .map(|(write, info)| {
                    vk::WriteDescriptorSet::default()
                        .dst_set(vk_set.descriptor_set)
                        .dst_binding(write.binding)
                        .descriptor_type(descriptor_kind_to_vk(write.kind))
                        .buffer_info(info)
                })
                .collect();

            self.gpu_context.device.update_descriptor_sets(&vk_writes, &[]);
        }
        Ok(())
    }

    fn create_pipeline(&mut self, desc: &PipelineDesc) -> Result<Arc<dyn GraphicsPipeline>> {
        let set_layout = self.set_layout(&desc.descriptor_layout)?;
        let device = &self.gpu_context.device;

        // Modules only need to live until the pipeline is created
        let vertex_module = ShaderModule::new(device, self.shaders.code(&desc.vertex_shader)?)?;
        let fragment_module = ShaderModule::new(device, self.shaders.code(&desc.fragment_shader)?)?;
        let geometry_module = match &desc.geometry_shader {
            Some(name) => Some(ShaderModule::new(device, self.shaders.code(name)?)?),
            None => None,
        };

        unsafe {
            let mut shader_stages = vec![
                vk::PipelineShaderStageCreateInfo::default()
                    .stage(vk::ShaderStageFlags::VERTEX)
                    .module(vertex_module.module)
                    .name(c"main"),
            ];
            if let Some(geometry_module) = &geometry_module {
                shader_stages.push(
                    vk::PipelineShaderStageCreateInfo::default()
                        .stage(vk::ShaderStageFlags::GEOMETRY)
                        .module(geometry_module.module)
                        .name(c"main"),
                );
            }
            shader_stages.push(
                vk::PipelineShaderStageCreateInfo::default()
                    .stage(vk::ShaderStageFlags::FRAGMENT)
                    .module(fragment_module.module)
                    .name(c"main"),
            );

            // Vertex input state: one interleaved binding
            let vertex_bindings = if desc.vertex_layout.attributes.is_empty() {
                vec![]
            } else {
                vec![vk::VertexInputBindingDescription {
                    binding: 0,
                    stride: desc.vertex_layout.stride,
                    input_rate: vk::VertexInputRate::VERTEX,
                }]
            };
            let vertex_attributes: Vec<vk::VertexInputAttributeDescription> = desc.vertex_layout.attributes
                .iter()
                .map(|attribute| vk::VertexInputAttributeDescription {
                    location: attribute.location,
                    binding: 0,
                    format: buffer_format_to_vk(attribute.format),
                    offset: attribute.offset,
                })
                .collect();

            let vertex_input_state = vk::PipelineVertexInputStateCreateInfo::default()
                .vertex_binding_descriptions(&vertex_bindings)
                .vertex_attribute_descriptions(&vertex_attributes);

            let input_assembly_state = vk::PipelineInputAssemblyStateCreateInfo::default()
                .topology(topology_to_vk(desc.topology))
                .primitive_restart_enable(false);

            // Viewport and scissor are dynamic; the extent is set per frame
            let viewport_state = vk::PipelineViewportStateCreateInfo::default()
                .viewport_count(1)
                .scissor_count(1);

            let rasterization_state = vk::PipelineRasterizationStateCreateInfo::default()
                .depth_clamp_enable(false)
                .rasterizer_discard_enable(false)
                .polygon_mode(vk::PolygonMode::FILL)
                .line_width(1.0)
                .cull_mode(vk::CullModeFlags::NONE)
                .front_face(vk::FrontFace::COUNTER_CLOCKWISE)
                .depth_bias_enable(false);

            let depth_stencil_state = vk::PipelineDepthStencilStateCreateInfo::default()
                .depth_test_enable(desc.depth_test)
                .depth_write_enable(desc.depth_test)
                .depth_compare_op(vk::CompareOp::LESS_OR_EQUAL)
                .depth_bounds_test_enable(false)
                .stencil_test_enable(false);

            let multisample_state = vk::PipelineMultisampleStateCreateInfo::default()
                .sample_shading_enable(false)
                .rasterization_samples(vk::SampleCountFlags::TYPE_1);

            let color_blend_attachment = blend_attachment(desc.blend);
            let color_blend_state = vk::PipelineColorBlendStateCreateInfo::default()
                .logic_op_enable(false)
                .attachments(std::slice::from_ref(&color_blend_attachment));

            let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
            let dynamic_state = vk::PipelineDynamicStateCreateInfo::default()
                .dynamic_states(&dynamic_states);

            let push_constant_ranges: Vec<vk::PushConstantRange> = desc.push_constants
                .iter()
                .map(|range| vk::PushConstantRange {
                    stage_flags: stage_flags_to_vk(range.stages),
                    offset: range.offset,
                    size: range.size,
                })
                .collect();

            let set_layouts = [set_layout];
            let layout_create_info = vk::PipelineLayoutCreateInfo::default()
                .set_layouts(&set_layouts)
                .push_constant_ranges(&push_constant_ranges);

            let layout = device.create_pipeline_layout(&layout_create_info, None)
                .map_err(|e| engine_err!(SOURCE, "Failed to create pipeline layout for '{}': {:?}", desc.name, e))?;

            let pipeline_create_info = vk::GraphicsPipelineCreateInfo::default()
                .stages(&shader_stages)
                .vertex_input_state(&vertex_input_state)
                .input_assembly_state(&input_assembly_state)
                .viewport_state(&viewport_state)
                .rasterization_state(&rasterization_state)
                .depth_stencil_state(&depth_stencil_state)
                .multisample_state(&multisample_state)
                .color_blend_state(&color_blend_state)
                .dynamic_state(&dynamic_state)
                .layout(layout)
                .render_pass(vk::RenderPass::from_raw(desc.render_pass.0))
                .subpass(0);

            let pipelines = match device.create_graphics_pipelines(
                vk::PipelineCache::null(),
                &[pipeline_create_info],
                None,
            ) {
                Ok(pipelines) => pipelines,
                Err((_, e)) => {
                    device.destroy_pipeline_layout(layout, None);
                    return Err(engine_err!(SOURCE, "Failed to create graphics pipeline '{}': {:?}", desc.name, e));
                }
            };

            engine_debug!(SOURCE, "Pipeline '{}' created", desc.name);
            Ok(Arc::new(Pipeline::new(
                Arc::clone(&self.gpu_context),
                pipelines[0],
                layout,
                desc.name.clone(),
            )))
        }
    }

    fn create_command_buffer(&mut self) -> Result<Box<dyn GraphicsCommandBuffer>> {
        Ok(Box::new(CommandBuffer::new(Arc::clone(&self.gpu_context))?))
    }

    fn limits(&self) -> DeviceLimits {
        self.limits
    }

    fn wait_idle(&self) -> Result<()> {
        unsafe {
            self.gpu_context.device
                .device_wait_idle()
                .map_err(|e| engine_err!(SOURCE, "Failed to wait idle: {:?}", e))
        }
    }
}

impl Drop for VulkanGraphicsDevice {
    fn drop(&mut self) {
        unsafe {
            let device = self.gpu_context.device.clone();
            device.device_wait_idle().ok();

            // 1. Destroy device-owned objects
            for (_, layout) in self.set_layouts.drain() {
                device.destroy_descriptor_set_layout(layout, None);
            }

            // 2. Every resource holds the context; destroying the device under
            //    them would leave dangling handles
            let live_resources = Arc::strong_count(&self.gpu_context) - 1;
            let Some(ctx) = Arc::get_mut(&mut self.gpu_context) else {
                engine_warn!(
                    SOURCE,
                    "Graphics device dropped while {} resource(s) are alive, leaking the Vulkan device",
                    live_resources
                );
                return;
            };

            if let Ok(pools) = ctx.descriptor_pools.get_mut() {
                for pool in pools.drain(..) {
                    device.destroy_descriptor_pool(pool, None);
                }
            }
            if let Ok(pool) = ctx.upload_command_pool.get_mut() {
                if *pool != vk::CommandPool::null() {
                    device.destroy_command_pool(*pool, None);
                    *pool = vk::CommandPool::null();
                }
            }

            // 3. Drop allocator: free VkDeviceMemory pages BEFORE destroying the device
            ManuallyDrop::drop(&mut ctx.allocator);

            // 4. Destroy debug messenger BEFORE device and instance
            if let Some(debug) = self.debug_messenger.take() {
                debug.loader.destroy_debug_utils_messenger(debug.messenger, None);
            }

            // 5. Destroy device and instance
            device.destroy_device(None);
            self.instance.destroy_instance(None);
        }
    }
}
