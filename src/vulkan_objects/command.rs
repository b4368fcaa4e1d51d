use std::rc::Rc;

use ash::vk;

use super::Device;
use crate::{
    error::{RenderError, RenderResult},
    log_resource,
};

/// Resettable pool on the graphics family with one primary command buffer.
///
/// The buffer is freed together with the pool.
pub struct CommandPool {
    pool: vk::CommandPool,
    command_buffer: vk::CommandBuffer,
    device: Rc<Device>,
}

impl CommandPool {
    pub fn new(device: Rc<Device>) -> RenderResult<Self> {
        let create_info = vk::CommandPoolCreateInfo::builder()
            .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER)
            .queue_family_index(device.graphics_family());
        let pool = unsafe {
            device
                .driver()
                .create_command_pool(device.handle(), &create_info)
        }
        .map_err(RenderError::CommandPoolCreation)?;
        log_resource!(device.verbosity(), "created command pool {pool:?}");

        let mut command_pool = Self {
            pool,
            command_buffer: vk::CommandBuffer::null(),
            device,
        };

        let allocate_info = vk::CommandBufferAllocateInfo::builder()
            .command_pool(pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(1);
        let buffers = unsafe {
            command_pool
                .device
                .driver()
                .allocate_command_buffers(command_pool.device.handle(), &allocate_info)
        }
        .map_err(RenderError::CommandBufferAllocation)?;
        command_pool.command_buffer = buffers
            .into_iter()
            .next()
            .ok_or(RenderError::CommandBufferAllocation(
                vk::Result::ERROR_OUT_OF_DEVICE_MEMORY,
            ))?;

        Ok(command_pool)
    }

    pub fn pool(&self) -> vk::CommandPool {
        self.pool
    }

    pub fn command_buffer(&self) -> vk::CommandBuffer {
        self.command_buffer
    }

    /// Begins the command buffer for `image_index` and hands it back for the
    /// caller to record into and end.
    pub fn record_command(&self, image_index: u32) -> RenderResult<vk::CommandBuffer> {
        let begin_info = vk::CommandBufferBeginInfo::builder()
            .flags(vk::CommandBufferUsageFlags::empty());
        unsafe {
            self.device.driver().begin_command_buffer(
                self.device.handle(),
                self.command_buffer,
                &begin_info,
            )
        }
        .map_err(RenderError::CommandBufferBegin)?;
        log_resource!(
            self.device.verbosity(),
            "recording command buffer {:?} for image {image_index}",
            self.command_buffer
        );
        Ok(self.command_buffer)
    }
}

impl Drop for CommandPool {
    fn drop(&mut self) {
        log_resource!(self.device.verbosity(), "destroying command pool {:?}", self.pool);
        unsafe {
            self.device
                .driver()
                .destroy_command_pool(self.device.handle(), self.pool)
        };
    }
}
