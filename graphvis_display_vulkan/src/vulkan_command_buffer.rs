/// CommandBuffer - Vulkan implementation of the CommandBuffer trait
///
/// A secondary command buffer, re-recorded every frame and executed by the
/// host inside its render pass (`vkCmdExecuteCommands`).

use graphvis_display::graphvis::{Error, Result};
use graphvis_display::graphvis::device::{
    Buffer as GraphicsBuffer, CommandBuffer as GraphicsCommandBuffer,
    DescriptorSet as GraphicsDescriptorSet, Pipeline as GraphicsPipeline, RenderPassHandle,
    ResourceId, ShaderStageFlags, Viewport,
};
use graphvis_display::engine_err;
use ash::vk::{self, Handle};
use std::sync::Arc;

use crate::vulkan_buffer::Buffer;
use crate::vulkan_context::GpuContext;
use crate::vulkan_descriptor_set::DescriptorSet;
use crate::vulkan_format::stage_flags_to_vk;
use crate::vulkan_pipeline::Pipeline;

/// Vulkan command buffer implementation
pub struct CommandBuffer {
    ctx: Arc<GpuContext>,
    /// Pool owning the command buffer (one per command buffer, so recording needs no lock)
    command_pool: vk::CommandPool,
    command_buffer: vk::CommandBuffer,
    /// Whether the command buffer is currently recording
    is_recording: bool,
    /// Layout of the bound pipeline (for descriptor sets and push constants)
    bound_pipeline_layout: Option<vk::PipelineLayout>,
    id: ResourceId,
}

impl CommandBuffer {
    pub fn new(ctx: Arc<GpuContext>) -> Result<Self> {
        unsafe {
            let command_pool_create_info = vk::CommandPoolCreateInfo::default()
                .queue_family_index(ctx.graphics_queue_family)
                .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);

            let command_pool = ctx.device.create_command_pool(&command_pool_create_info, None)
                .map_err(|e| engine_err!("graphvis::vulkan", "Failed to create command pool: {:?}", e))?;

            let command_buffer_allocate_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(command_pool)
                .level(vk::CommandBufferLevel::SECONDARY)
                .command_buffer_count(1);

            let command_buffers = match ctx.device.allocate_command_buffers(&command_buffer_allocate_info) {
                Ok(buffers) => buffers,
                Err(e) => {
                    ctx.device.destroy_command_pool(command_pool, None);
                    return Err(engine_err!("graphvis::vulkan", "Failed to allocate command buffer: {:?}", e));
                }
            };

            Ok(Self {
                ctx,
                command_pool,
                command_buffer: command_buffers[0],
                is_recording: false,
                bound_pipeline_layout: None,
                id: ResourceId::next(),
            })
        }
    }

    /// Raw handle, for the host's `vkCmdExecuteCommands`
    pub fn command_buffer(&self) -> vk::CommandBuffer {
        self.command_buffer
    }

    fn check_recording(&self) -> Result<()> {
        if self.is_recording {
            Ok(())
        } else {
            Err(Error::InvalidResource("Command buffer not recording".to_string()))
        }
    }

    fn bound_layout(&self) -> Result<vk::PipelineLayout> {
        self.bound_pipeline_layout
            .ok_or_else(|| Error::InvalidResource("No pipeline bound".to_string()))
    }
}

impl GraphicsCommandBuffer for CommandBuffer {
    fn id(&self) -> ResourceId {
        self.id
    }

    fn begin(&mut self, render_pass: RenderPassHandle) -> Result<()> {
        unsafe {
            self.ctx.device
                .reset_command_buffer(self.command_buffer, vk::CommandBufferResetFlags::empty())
                .map_err(|e| engine_err!("graphvis::vulkan", "Failed to reset command buffer: {:?}", e))?;

            let inheritance_info = vk::CommandBufferInheritanceInfo::default()
                .render_pass(vk::RenderPass::from_raw(render_pass.0))
                .subpass(0);

            let begin_info = vk::CommandBufferBeginInfo::default()
                .flags(vk::CommandBufferUsageFlags::RENDER_PASS_CONTINUE)
                .inheritance_info(&inheritance_info);

            self.ctx.device
                .begin_command_buffer(self.command_buffer, &begin_info)
                .map_err(|e| engine_err!("graphvis::vulkan", "Failed to begin command buffer: {:?}", e))?;
        }
        self.is_recording = true;
        self.bound_pipeline_layout = None;
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.check_recording()?;
        let vk_viewport = vk::Viewport {
            x: viewport.x,
            y: viewport.y,
            width: viewport.width,
            height: viewport.height,
            min_depth: viewport.min_depth,
            max_depth: viewport.max_depth,
        };
        let scissor = vk::Rect2D {
            offset: vk::Offset2D { x: viewport.x as i32, y: viewport.y as i32 },
            extent: vk::Extent2D { width: viewport.width as u32, height: viewport.height as u32 },
        };
        unsafe {
            self.ctx.device.cmd_set_viewport(self.command_buffer, 0, &[vk_viewport]);
            self.ctx.device.cmd_set_scissor(self.command_buffer, 0, &[scissor]);
        }
        Ok(())
    }

    fn bind_pipeline(&mut self, pipeline: &dyn GraphicsPipeline) -> Result<()> {
        self.check_recording()?;
        // Downcast to the Vulkan type: every pipeline this device sees was created by it
        let vk_pipeline = unsafe { &*(pipeline as *const dyn GraphicsPipeline as *const Pipeline) };
        unsafe {
            self.ctx.device.cmd_bind_pipeline(
                self.command_buffer,
                vk::PipelineBindPoint::GRAPHICS,
                vk_pipeline.pipeline,
            );
        }
        self.bound_pipeline_layout = Some(vk_pipeline.pipeline_layout);
        Ok(())
    }

    fn bind_descriptor_set(&mut self, pipeline: &dyn GraphicsPipeline, set: &dyn GraphicsDescriptorSet) -> Result<()> {
        self.check_recording()?;
        let vk_pipeline = unsafe { &*(pipeline as *const dyn GraphicsPipeline as *const Pipeline) };
        let vk_set = unsafe { &*(set as *const dyn GraphicsDescriptorSet as *const DescriptorSet) };
        unsafe {
            self.ctx.device.cmd_bind_descriptor_sets(
                self.command_buffer,
                vk::PipelineBindPoint::GRAPHICS,
                vk_pipeline.pipeline_layout,
                0, // first_set
                &[vk_set.descriptor_set],
                &[], // dynamic_offsets
            );
        }
        Ok(())
    }

    fn bind_vertex_buffer(&mut self, buffer: &dyn GraphicsBuffer, offset: u64) -> Result<()> {
        self.check_recording()?;
        let vk_buffer = unsafe { &*(buffer as *const dyn GraphicsBuffer as *const Buffer) };
        unsafe {
            self.ctx.device.cmd_bind_vertex_buffers(self.command_buffer, 0, &[vk_buffer.buffer], &[offset]);
        }
        Ok(())
    }

    fn push_constants(
        &mut self,
        pipeline: &dyn GraphicsPipeline,
        stages: ShaderStageFlags,
        offset: u32,
        data: &[u8],
    ) -> Result<()> {
        self.check_recording()?;
        let vk_pipeline = unsafe { &*(pipeline as *const dyn GraphicsPipeline as *const Pipeline) };
        unsafe {
            self.ctx.device.cmd_push_constants(
                self.command_buffer,
                vk_pipeline.pipeline_layout,
                stage_flags_to_vk(stages),
                offset,
                data,
            );
        }
        Ok(())
    }

    fn draw(&mut self, vertex_count: u32, first_vertex: u32) -> Result<()> {
        self.check_recording()?;
        self.bound_layout()?;
        unsafe {
            self.ctx.device.cmd_draw(self.command_buffer, vertex_count, 1, first_vertex, 0);
        }
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.check_recording()?;
        unsafe {
            self.ctx.device
                .end_command_buffer(self.command_buffer)
                .map_err(|e| engine_err!("graphvis::vulkan", "Failed to end command buffer: {:?}", e))?;
        }
        self.is_recording = false;
        Ok(())
    }
}

impl Drop for CommandBuffer {
    fn drop(&mut self) {
        unsafe {
            // Destroying the pool frees its command buffer
            self.ctx.device.destroy_command_pool(self.command_pool, None);
        }
    }
}
