use std::cell::{Ref, RefCell};

use ash::{
    extensions::{
        ext::DebugUtils,
        khr::{Surface as SurfaceLoader, Swapchain as SwapchainLoader},
    },
    prelude::VkResult,
    vk, Entry,
};
use raw_window_handle::{RawDisplayHandle, RawWindowHandle};

use super::Driver;
use crate::error::RenderResult;

struct InstanceFns {
    inner: ash::Instance,
    surface: SurfaceLoader,
    debug_utils: DebugUtils,
}

struct DeviceFns {
    inner: ash::Device,
    swapchain: SwapchainLoader,
}

/// [`Driver`] backed by the system Vulkan loader.
///
/// Holds at most one instance and one logical device at a time, which is all
/// the bring-up path ever creates. A second create fails with
/// `ERROR_INITIALIZATION_FAILED` until the first object is destroyed, and so
/// does any call naming a handle other than the loaded one. Destroys for a
/// handle that is not loaded are ignored.
pub struct AshDriver {
    entry: Entry,
    instance: RefCell<Option<InstanceFns>>,
    device: RefCell<Option<DeviceFns>>,
}

impl AshDriver {
    pub fn new() -> RenderResult<Self> {
        let entry = unsafe { Entry::load()? };
        Ok(Self::with_entry(entry))
    }

    pub fn with_entry(entry: Entry) -> Self {
        Self {
            entry,
            instance: RefCell::new(None),
            device: RefCell::new(None),
        }
    }

    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    fn instance_fns(&self) -> VkResult<Ref<'_, InstanceFns>> {
        Ref::filter_map(self.instance.borrow(), Option::as_ref)
            .map_err(|_| vk::Result::ERROR_INITIALIZATION_FAILED)
    }

    fn instance_fns_for(&self, instance: vk::Instance) -> VkResult<Ref<'_, InstanceFns>> {
        Ref::filter_map(self.instance.borrow(), |fns| {
            fns.as_ref().filter(|fns| fns.inner.handle() == instance)
        })
        .map_err(|_| vk::Result::ERROR_INITIALIZATION_FAILED)
    }

    fn device_fns(&self, device: vk::Device) -> VkResult<Ref<'_, DeviceFns>> {
        Ref::filter_map(self.device.borrow(), |fns| {
            fns.as_ref().filter(|fns| fns.inner.handle() == device)
        })
        .map_err(|_| vk::Result::ERROR_INITIALIZATION_FAILED)
    }
}

/// Fails while `slot` still holds a live table. Replacing it would destroy
/// the old object under its children.
fn ensure_vacant<T>(slot: &RefCell<Option<T>>) -> VkResult<()> {
    match *slot.borrow() {
        Some(_) => Err(vk::Result::ERROR_INITIALIZATION_FAILED),
        None => Ok(()),
    }
}

/// Takes the table out of `slot` only if it belongs to the handle being destroyed.
fn take_matching<T>(slot: &RefCell<Option<T>>, owns: impl FnOnce(&T) -> bool) -> Option<T> {
    let mut slot = slot.borrow_mut();
    if slot.as_ref().map_or(false, owns) {
        slot.take()
    } else {
        None
    }
}

impl Driver for AshDriver {
    fn enumerate_instance_extension_properties(&self) -> VkResult<Vec<vk::ExtensionProperties>> {
        self.entry.enumerate_instance_extension_properties(None)
    }

    fn enumerate_instance_layer_properties(&self) -> VkResult<Vec<vk::LayerProperties>> {
        self.entry.enumerate_instance_layer_properties()
    }

    unsafe fn create_instance(
        &self,
        create_info: &vk::InstanceCreateInfo,
    ) -> VkResult<vk::Instance> {
        ensure_vacant(&self.instance)?;
        let inner = self.entry.create_instance(create_info, None)?;
        let handle = inner.handle();
        let fns = InstanceFns {
            surface: SurfaceLoader::new(&self.entry, &inner),
            debug_utils: DebugUtils::new(&self.entry, &inner),
            inner,
        };
        *self.instance.borrow_mut() = Some(fns);
        Ok(handle)
    }

    unsafe fn destroy_instance(&self, instance: vk::Instance) {
        if let Some(fns) = take_matching(&self.instance, |fns| fns.inner.handle() == instance) {
            fns.inner.destroy_instance(None);
        }
    }

    unsafe fn create_debug_utils_messenger(
        &self,
        instance: vk::Instance,
        create_info: &vk::DebugUtilsMessengerCreateInfoEXT,
    ) -> VkResult<vk::DebugUtilsMessengerEXT> {
        self.instance_fns_for(instance)?
            .debug_utils
            .create_debug_utils_messenger(create_info, None)
    }

    unsafe fn destroy_debug_utils_messenger(
        &self,
        instance: vk::Instance,
        messenger: vk::DebugUtilsMessengerEXT,
    ) {
        if let Ok(fns) = self.instance_fns_for(instance) {
            fns.debug_utils
                .destroy_debug_utils_messenger(messenger, None);
        }
    }

    unsafe fn create_surface(
        &self,
        instance: vk::Instance,
        display_handle: RawDisplayHandle,
        window_handle: RawWindowHandle,
    ) -> VkResult<vk::SurfaceKHR> {
        let fns = self.instance_fns_for(instance)?;
        ash_window::create_surface(&self.entry, &fns.inner, display_handle, window_handle, None)
    }

    unsafe fn destroy_surface(&self, instance: vk::Instance, surface: vk::SurfaceKHR) {
        if let Ok(fns) = self.instance_fns_for(instance) {
            fns.surface.destroy_surface(surface, None);
        }
    }

    unsafe fn enumerate_physical_devices(
        &self,
        instance: vk::Instance,
    ) -> VkResult<Vec<vk::PhysicalDevice>> {
        self.instance_fns_for(instance)?.inner.enumerate_physical_devices()
    }

    unsafe fn get_physical_device_properties(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> VkResult<vk::PhysicalDeviceProperties> {
        Ok(self
            .instance_fns()?
            .inner
            .get_physical_device_properties(physical_device))
    }

    unsafe fn get_physical_device_queue_family_properties(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> VkResult<Vec<vk::QueueFamilyProperties>> {
        Ok(self
            .instance_fns()?
            .inner
            .get_physical_device_queue_family_properties(physical_device))
    }

    unsafe fn get_physical_device_surface_support(
        &self,
        physical_device: vk::PhysicalDevice,
        queue_family_index: u32,
        surface: vk::SurfaceKHR,
    ) -> VkResult<bool> {
        self.instance_fns()?.surface.get_physical_device_surface_support(
            physical_device,
            queue_family_index,
            surface,
        )
    }

    unsafe fn enumerate_device_extension_properties(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> VkResult<Vec<vk::ExtensionProperties>> {
        self.instance_fns()?
            .inner
            .enumerate_device_extension_properties(physical_device)
    }

    unsafe fn get_physical_device_surface_capabilities(
        &self,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<vk::SurfaceCapabilitiesKHR> {
        self.instance_fns()?
            .surface
            .get_physical_device_surface_capabilities(physical_device, surface)
    }

    unsafe fn get_physical_device_surface_formats(
        &self,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<Vec<vk::SurfaceFormatKHR>> {
        self.instance_fns()?
            .surface
            .get_physical_device_surface_formats(physical_device, surface)
    }

    unsafe fn get_physical_device_surface_present_modes(
        &self,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<Vec<vk::PresentModeKHR>> {
        self.instance_fns()?
            .surface
            .get_physical_device_surface_present_modes(physical_device, surface)
    }

    unsafe fn create_device(
        &self,
        physical_device: vk::PhysicalDevice,
        create_info: &vk::DeviceCreateInfo,
    ) -> VkResult<vk::Device> {
        ensure_vacant(&self.device)?;
        let fns = {
            let instance = self.instance_fns()?;
            let inner = instance
                .inner
                .create_device(physical_device, create_info, None)?;
            DeviceFns {
                swapchain: SwapchainLoader::new(&instance.inner, &inner),
                inner,
            }
        };
        let handle = fns.inner.handle();
        *self.device.borrow_mut() = Some(fns);
        Ok(handle)
    }

    unsafe fn destroy_device(&self, device: vk::Device) {
        if let Some(fns) = take_matching(&self.device, |fns| fns.inner.handle() == device) {
            fns.inner.destroy_device(None);
        }
    }

    unsafe fn get_device_queue(
        &self,
        device: vk::Device,
        queue_family_index: u32,
        queue_index: u32,
    ) -> VkResult<vk::Queue> {
        Ok(self
            .device_fns(device)?
            .inner
            .get_device_queue(queue_family_index, queue_index))
    }

    unsafe fn create_swapchain(
        &self,
        device: vk::Device,
        create_info: &vk::SwapchainCreateInfoKHR,
    ) -> VkResult<vk::SwapchainKHR> {
        self.device_fns(device)?
            .swapchain
            .create_swapchain(create_info, None)
    }

    unsafe fn get_swapchain_images(
        &self,
        device: vk::Device,
        swapchain: vk::SwapchainKHR,
    ) -> VkResult<Vec<vk::Image>> {
        self.device_fns(device)?
            .swapchain
            .get_swapchain_images(swapchain)
    }

    unsafe fn destroy_swapchain(&self, device: vk::Device, swapchain: vk::SwapchainKHR) {
        if let Ok(fns) = self.device_fns(device) {
            fns.swapchain.destroy_swapchain(swapchain, None);
        }
    }

    unsafe fn create_image_view(
        &self,
        device: vk::Device,
        create_info: &vk::ImageViewCreateInfo,
    ) -> VkResult<vk::ImageView> {
        self.device_fns(device)?
            .inner
            .create_image_view(create_info, None)
    }

    unsafe fn destroy_image_view(&self, device: vk::Device, image_view: vk::ImageView) {
        if let Ok(fns) = self.device_fns(device) {
            fns.inner.destroy_image_view(image_view, None);
        }
    }

    unsafe fn create_render_pass(
        &self,
        device: vk::Device,
        create_info: &vk::RenderPassCreateInfo,
    ) -> VkResult<vk::RenderPass> {
        self.device_fns(device)?
            .inner
            .create_render_pass(create_info, None)
    }

    unsafe fn destroy_render_pass(&self, device: vk::Device, render_pass: vk::RenderPass) {
        if let Ok(fns) = self.device_fns(device) {
            fns.inner.destroy_render_pass(render_pass, None);
        }
    }

    unsafe fn create_shader_module(
        &self,
        device: vk::Device,
        create_info: &vk::ShaderModuleCreateInfo,
    ) -> VkResult<vk::ShaderModule> {
        self.device_fns(device)?
            .inner
            .create_shader_module(create_info, None)
    }

    unsafe fn destroy_shader_module(&self, device: vk::Device, shader_module: vk::ShaderModule) {
        if let Ok(fns) = self.device_fns(device) {
            fns.inner.destroy_shader_module(shader_module, None);
        }
    }

    unsafe fn create_pipeline_layout(
        &self,
        device: vk::Device,
        create_info: &vk::PipelineLayoutCreateInfo,
    ) -> VkResult<vk::PipelineLayout> {
        self.device_fns(device)?
            .inner
            .create_pipeline_layout(create_info, None)
    }

    unsafe fn destroy_pipeline_layout(&self, device: vk::Device, layout: vk::PipelineLayout) {
        if let Ok(fns) = self.device_fns(device) {
            fns.inner.destroy_pipeline_layout(layout, None);
        }
    }

    unsafe fn create_graphics_pipeline(
        &self,
        device: vk::Device,
        create_info: &vk::GraphicsPipelineCreateInfo,
    ) -> VkResult<vk::Pipeline> {
        let pipelines = self
            .device_fns(device)?
            .inner
            .create_graphics_pipelines(
                vk::PipelineCache::null(),
                std::slice::from_ref(create_info),
                None,
            )
            .map_err(|(_, result)| result)?;
        pipelines
            .into_iter()
            .next()
            .ok_or(vk::Result::ERROR_UNKNOWN)
    }

    unsafe fn destroy_pipeline(&self, device: vk::Device, pipeline: vk::Pipeline) {
        if let Ok(fns) = self.device_fns(device) {
            fns.inner.destroy_pipeline(pipeline, None);
        }
    }

    unsafe fn create_framebuffer(
        &self,
        device: vk::Device,
        create_info: &vk::FramebufferCreateInfo,
    ) -> VkResult<vk::Framebuffer> {
        self.device_fns(device)?
            .inner
            .create_framebuffer(create_info, None)
    }

    unsafe fn destroy_framebuffer(&self, device: vk::Device, framebuffer: vk::Framebuffer) {
        if let Ok(fns) = self.device_fns(device) {
            fns.inner.destroy_framebuffer(framebuffer, None);
        }
    }

    unsafe fn create_command_pool(
        &self,
        device: vk::Device,
        create_info: &vk::CommandPoolCreateInfo,
    ) -> VkResult<vk::CommandPool> {
        self.device_fns(device)?
            .inner
            .create_command_pool(create_info, None)
    }

    unsafe fn destroy_command_pool(&self, device: vk::Device, pool: vk::CommandPool) {
        if let Ok(fns) = self.device_fns(device) {
            fns.inner.destroy_command_pool(pool, None);
        }
    }

    unsafe fn allocate_command_buffers(
        &self,
        device: vk::Device,
        allocate_info: &vk::CommandBufferAllocateInfo,
    ) -> VkResult<Vec<vk::CommandBuffer>> {
        self.device_fns(device)?
            .inner
            .allocate_command_buffers(allocate_info)
    }

    unsafe fn begin_command_buffer(
        &self,
        device: vk::Device,
        command_buffer: vk::CommandBuffer,
        begin_info: &vk::CommandBufferBeginInfo,
    ) -> VkResult<()> {
        self.device_fns(device)?
            .inner
            .begin_command_buffer(command_buffer, begin_info)
    }
}
