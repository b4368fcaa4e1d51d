//! The narrow slice of the Vulkan API the bring-up path talks to.
//!
//! Everything the rest of the crate does to the GPU goes through [`Driver`]:
//! queries hand back owned `ash::vk` values, creation calls take the usual
//! `ash::vk` create-info records and hand back raw handles, and every
//! creation has a matching destroy. [`AshDriver`] forwards to the real
//! loader.

use ash::{prelude::VkResult, vk};
use raw_window_handle::{RawDisplayHandle, RawWindowHandle};

mod ash_driver;
pub use ash_driver::AshDriver;

#[cfg(test)]
pub(crate) mod mock;

/// Handle-level access to a Vulkan implementation.
///
/// # Safety
///
/// The `unsafe` methods follow the rules of the Vulkan calls they wrap: handles
/// passed in must have been produced by the same driver and still be alive, and
/// every pointer inside a create-info record must be valid for the duration of
/// the call.
pub trait Driver {
    fn enumerate_instance_extension_properties(&self) -> VkResult<Vec<vk::ExtensionProperties>>;

    fn enumerate_instance_layer_properties(&self) -> VkResult<Vec<vk::LayerProperties>>;

    unsafe fn create_instance(&self, create_info: &vk::InstanceCreateInfo)
        -> VkResult<vk::Instance>;

    unsafe fn destroy_instance(&self, instance: vk::Instance);

    unsafe fn create_debug_utils_messenger(
        &self,
        instance: vk::Instance,
        create_info: &vk::DebugUtilsMessengerCreateInfoEXT,
    ) -> VkResult<vk::DebugUtilsMessengerEXT>;

    unsafe fn destroy_debug_utils_messenger(
        &self,
        instance: vk::Instance,
        messenger: vk::DebugUtilsMessengerEXT,
    );

    unsafe fn create_surface(
        &self,
        instance: vk::Instance,
        display_handle: RawDisplayHandle,
        window_handle: RawWindowHandle,
    ) -> VkResult<vk::SurfaceKHR>;

    unsafe fn destroy_surface(&self, instance: vk::Instance, surface: vk::SurfaceKHR);

    unsafe fn enumerate_physical_devices(
        &self,
        instance: vk::Instance,
    ) -> VkResult<Vec<vk::PhysicalDevice>>;

    unsafe fn get_physical_device_properties(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> VkResult<vk::PhysicalDeviceProperties>;

    unsafe fn get_physical_device_queue_family_properties(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> VkResult<Vec<vk::QueueFamilyProperties>>;

    unsafe fn get_physical_device_surface_support(
        &self,
        physical_device: vk::PhysicalDevice,
        queue_family_index: u32,
        surface: vk::SurfaceKHR,
    ) -> VkResult<bool>;

    unsafe fn enumerate_device_extension_properties(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> VkResult<Vec<vk::ExtensionProperties>>;

    unsafe fn get_physical_device_surface_capabilities(
        &self,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<vk::SurfaceCapabilitiesKHR>;

    unsafe fn get_physical_device_surface_formats(
        &self,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<Vec<vk::SurfaceFormatKHR>>;

    unsafe fn get_physical_device_surface_present_modes(
        &self,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<Vec<vk::PresentModeKHR>>;

    unsafe fn create_device(
        &self,
        physical_device: vk::PhysicalDevice,
        create_info: &vk::DeviceCreateInfo,
    ) -> VkResult<vk::Device>;

    unsafe fn destroy_device(&self, device: vk::Device);

    unsafe fn get_device_queue(
        &self,
        device: vk::Device,
        queue_family_index: u32,
        queue_index: u32,
    ) -> VkResult<vk::Queue>;

    unsafe fn create_swapchain(
        &self,
        device: vk::Device,
        create_info: &vk::SwapchainCreateInfoKHR,
    ) -> VkResult<vk::SwapchainKHR>;

    unsafe fn get_swapchain_images(
        &self,
        device: vk::Device,
        swapchain: vk::SwapchainKHR,
    ) -> VkResult<Vec<vk::Image>>;

    unsafe fn destroy_swapchain(&self, device: vk::Device, swapchain: vk::SwapchainKHR);

    unsafe fn create_image_view(
        &self,
        device: vk::Device,
        create_info: &vk::ImageViewCreateInfo,
    ) -> VkResult<vk::ImageView>;

    unsafe fn destroy_image_view(&self, device: vk::Device, image_view: vk::ImageView);

    unsafe fn create_render_pass(
        &self,
        device: vk::Device,
        create_info: &vk::RenderPassCreateInfo,
    ) -> VkResult<vk::RenderPass>;

    unsafe fn destroy_render_pass(&self, device: vk::Device, render_pass: vk::RenderPass);

    unsafe fn create_shader_module(
        &self,
        device: vk::Device,
        create_info: &vk::ShaderModuleCreateInfo,
    ) -> VkResult<vk::ShaderModule>;

    unsafe fn destroy_shader_module(&self, device: vk::Device, shader_module: vk::ShaderModule);

    unsafe fn create_pipeline_layout(
        &self,
        device: vk::Device,
        create_info: &vk::PipelineLayoutCreateInfo,
    ) -> VkResult<vk::PipelineLayout>;

    unsafe fn destroy_pipeline_layout(&self, device: vk::Device, layout: vk::PipelineLayout);

    unsafe fn create_graphics_pipeline(
        &self,
        device: vk::Device,
        create_info: &vk::GraphicsPipelineCreateInfo,
    ) -> VkResult<vk::Pipeline>;

    unsafe fn destroy_pipeline(&self, device: vk::Device, pipeline: vk::Pipeline);

    unsafe fn create_framebuffer(
        &self,
        device: vk::Device,
        create_info: &vk::FramebufferCreateInfo,
    ) -> VkResult<vk::Framebuffer>;

    unsafe fn destroy_framebuffer(&self, device: vk::Device, framebuffer: vk::Framebuffer);

    unsafe fn create_command_pool(
        &self,
        device: vk::Device,
        create_info: &vk::CommandPoolCreateInfo,
    ) -> VkResult<vk::CommandPool>;

    unsafe fn destroy_command_pool(&self, device: vk::Device, pool: vk::CommandPool);

    unsafe fn allocate_command_buffers(
        &self,
        device: vk::Device,
        allocate_info: &vk::CommandBufferAllocateInfo,
    ) -> VkResult<Vec<vk::CommandBuffer>>;

    unsafe fn begin_command_buffer(
        &self,
        device: vk::Device,
        command_buffer: vk::CommandBuffer,
        begin_info: &vk::CommandBufferBeginInfo,
    ) -> VkResult<()>;
}
