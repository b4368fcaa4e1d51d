//! Recording stand-in for a Vulkan implementation, used by the unit tests.

use std::{
    cell::{Cell, RefCell},
    ffi::{c_char, CStr, CString},
    rc::Rc,
};

use ash::{
    extensions::{
        ext::DebugUtils,
        khr::{Surface as SurfaceLoader, Swapchain as SwapchainLoader},
    },
    prelude::VkResult,
    vk::{self, Handle},
};
use raw_window_handle::{
    RawDisplayHandle, RawWindowHandle, XlibDisplayHandle, XlibWindowHandle,
};

use super::Driver;
use crate::{
    error::{RenderError, RenderResult},
    vulkan_objects::{pick_physical_device, Device, InstanceBuilder, Surface, SurfaceProvider},
};

pub const SPIRV_MAGIC: u32 = 0x0723_0203;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Instance,
    DebugMessenger,
    Surface,
    Device,
    CommandPool,
    CommandBuffer,
    Swapchain,
    ImageView,
    RenderPass,
    ShaderModule,
    PipelineLayout,
    Pipeline,
    Framebuffer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Call {
    Create(ObjectKind, u64),
    Destroy(ObjectKind, u64),
}

#[derive(Clone, Debug)]
pub struct MockGpu {
    pub name: &'static str,
    pub queue_families: Vec<vk::QueueFlags>,
    pub present_families: Vec<u32>,
    pub extensions: Vec<&'static CStr>,
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    /// Images handed back beyond the requested minimum.
    pub extra_images: u32,
    /// Error returned by the surface capability query, if any.
    pub capabilities_error: Option<vk::Result>,
}

impl MockGpu {
    /// Families `{0: graphics, 1: present}`, sRGB surface, FIFO, 2..=4 images at 800x600.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            queue_families: vec![vk::QueueFlags::GRAPHICS, vk::QueueFlags::TRANSFER],
            present_families: vec![1],
            extensions: vec![SwapchainLoader::name()],
            formats: vec![
                surface_format(vk::Format::R8G8B8A8_UNORM),
                surface_format(vk::Format::B8G8R8A8_SRGB),
            ],
            present_modes: vec![vk::PresentModeKHR::MAILBOX, vk::PresentModeKHR::FIFO],
            capabilities: vk::SurfaceCapabilitiesKHR {
                min_image_count: 2,
                max_image_count: 4,
                current_extent: vk::Extent2D {
                    width: 800,
                    height: 600,
                },
                min_image_extent: vk::Extent2D {
                    width: 1,
                    height: 1,
                },
                max_image_extent: vk::Extent2D {
                    width: 4096,
                    height: 4096,
                },
                max_image_array_layers: 1,
                current_transform: vk::SurfaceTransformFlagsKHR::IDENTITY,
                ..Default::default()
            },
            extra_images: 0,
            capabilities_error: None,
        }
    }

    /// A single family that can both draw and present.
    pub fn with_shared_family(mut self) -> Self {
        self.queue_families = vec![vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE];
        self.present_families = vec![0];
        self
    }

    pub fn with_extra_images(mut self, extra: u32) -> Self {
        self.extra_images = extra;
        self
    }

    pub fn with_extension(mut self, name: &'static CStr) -> Self {
        self.extensions.push(name);
        self
    }
}

pub fn surface_format(format: vk::Format) -> vk::SurfaceFormatKHR {
    vk::SurfaceFormatKHR {
        format,
        color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
    }
}

#[derive(Clone, Debug, Default)]
pub struct SwapchainRequest {
    pub min_image_count: u32,
    pub format: vk::Format,
    pub color_space: vk::ColorSpaceKHR,
    pub extent: vk::Extent2D,
    pub sharing_mode: vk::SharingMode,
    pub queue_family_indices: Vec<u32>,
    pub present_mode: vk::PresentModeKHR,
    pub clipped: bool,
    pub image_array_layers: u32,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FramebufferRequest {
    pub attachment_count: u32,
    pub width: u32,
    pub height: u32,
    pub layers: u32,
}

#[derive(Clone, Debug, Default)]
pub struct PipelineRequest {
    pub stages: Vec<vk::ShaderStageFlags>,
    pub subpass: u32,
    pub base_pipeline_index: i32,
    pub has_dynamic_state: bool,
    pub has_depth_stencil_state: bool,
    pub viewport: vk::Viewport,
    pub blend_attachment_count: u32,
}

#[derive(Default)]
pub struct Record {
    next_handle: u64,
    pub calls: Vec<Call>,
    counts: Vec<(ObjectKind, usize)>,
    pub instance_extensions: Vec<CString>,
    pub instance_layers: Vec<CString>,
    pub device_extensions: Vec<CString>,
    pub device_layers: Vec<CString>,
    pub queue_create_families: Vec<u32>,
    pub physical_device: Option<vk::PhysicalDevice>,
    pub swapchain: Option<SwapchainRequest>,
    pub image_view_formats: Vec<vk::Format>,
    pub render_pass_attachments: Vec<vk::AttachmentDescription>,
    pub render_pass_dependency_count: u32,
    pub framebuffers: Vec<FramebufferRequest>,
    pub pipeline: Option<PipelineRequest>,
    pub command_pool: Option<vk::CommandPoolCreateInfo>,
    pub command_buffer_levels: Vec<vk::CommandBufferLevel>,
    pub command_buffer_begins: Vec<vk::CommandBufferUsageFlags>,
}

impl Record {
    fn bump(&mut self, kind: ObjectKind) -> usize {
        match self.counts.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, count)) => {
                *count += 1;
                *count - 1
            }
            None => {
                self.counts.push((kind, 1));
                0
            }
        }
    }
}

pub struct MockDriver {
    pub instance_extensions: Vec<&'static CStr>,
    pub instance_layers: Vec<&'static CStr>,
    pub gpus: Vec<MockGpu>,
    /// Fail the n-th (zero-based) creation of the given kind.
    pub fail: Option<(ObjectKind, usize)>,
    pub fail_begin: bool,
    pub record: RefCell<Record>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self {
            instance_extensions: vec![
                SurfaceLoader::name(),
                mock_surface_extension(),
                vk::KhrGetPhysicalDeviceProperties2Fn::name(),
                DebugUtils::name(),
            ],
            instance_layers: vec![validation_layer()],
            gpus: vec![],
            fail: None,
            fail_begin: false,
            record: RefCell::new(Record::default()),
        }
    }

    pub fn with_gpu(mut self, gpu: MockGpu) -> Self {
        self.gpus.push(gpu);
        self
    }

    pub fn failing(mut self, kind: ObjectKind, nth: usize) -> Self {
        self.fail = Some((kind, nth));
        self
    }

    pub fn record(&self) -> std::cell::Ref<'_, Record> {
        self.record.borrow()
    }

    pub fn created(&self) -> Vec<(ObjectKind, u64)> {
        self.record
            .borrow()
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::Create(kind, raw) => Some((*kind, *raw)),
                Call::Destroy(..) => None,
            })
            .collect()
    }

    pub fn destroyed(&self) -> Vec<(ObjectKind, u64)> {
        self.record
            .borrow()
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::Destroy(kind, raw) => Some((*kind, *raw)),
                Call::Create(..) => None,
            })
            .collect()
    }

    pub fn live_objects(&self) -> Vec<(ObjectKind, u64)> {
        let destroyed = self.destroyed();
        self.created()
            .into_iter()
            .filter(|object| !destroyed.contains(object))
            .collect()
    }

    pub fn created_count(&self, kind: ObjectKind) -> usize {
        self.created().iter().filter(|(k, _)| *k == kind).count()
    }

    fn gpu(&self, physical_device: vk::PhysicalDevice) -> VkResult<&MockGpu> {
        let index = physical_device.as_raw() as usize;
        index
            .checked_sub(1)
            .and_then(|i| self.gpus.get(i))
            .ok_or(vk::Result::ERROR_DEVICE_LOST)
    }

    fn create(&self, kind: ObjectKind) -> VkResult<u64> {
        let mut record = self.record.borrow_mut();
        let nth = record.bump(kind);
        if self.fail == Some((kind, nth)) {
            return Err(vk::Result::ERROR_INITIALIZATION_FAILED);
        }
        record.next_handle += 1;
        let raw = 0x1000 + record.next_handle;
        record.calls.push(Call::Create(kind, raw));
        Ok(raw)
    }

    fn destroy(&self, kind: ObjectKind, raw: u64) {
        self.record
            .borrow_mut()
            .calls
            .push(Call::Destroy(kind, raw));
    }
}

pub fn validation_layer() -> &'static CStr {
    unsafe { CStr::from_bytes_with_nul_unchecked(b"VK_LAYER_KHRONOS_validation\0") }
}

pub fn mock_surface_extension() -> &'static CStr {
    unsafe { CStr::from_bytes_with_nul_unchecked(b"VK_KHR_xlib_surface\0") }
}

fn write_name(dst: &mut [c_char], name: &CStr) {
    dst.iter_mut()
        .zip(name.to_bytes())
        .for_each(|(d, s)| *d = *s as c_char);
}

pub fn extension_properties(name: &CStr) -> vk::ExtensionProperties {
    let mut properties = vk::ExtensionProperties::default();
    write_name(&mut properties.extension_name, name);
    properties
}

fn layer_properties(name: &CStr) -> vk::LayerProperties {
    let mut properties = vk::LayerProperties::default();
    write_name(&mut properties.layer_name, name);
    properties
}

unsafe fn read_names(names: *const *const c_char, count: u32) -> Vec<CString> {
    if count == 0 || names.is_null() {
        return vec![];
    }
    std::slice::from_raw_parts(names, count as usize)
        .iter()
        .map(|name| CStr::from_ptr(*name).to_owned())
        .collect()
}

unsafe fn read_slice<'a, T>(data: *const T, count: u32) -> &'a [T] {
    if count == 0 || data.is_null() {
        &[]
    } else {
        std::slice::from_raw_parts(data, count as usize)
    }
}

impl Driver for MockDriver {
    fn enumerate_instance_extension_properties(&self) -> VkResult<Vec<vk::ExtensionProperties>> {
        Ok(self
            .instance_extensions
            .iter()
            .map(|name| extension_properties(name))
            .collect())
    }

    fn enumerate_instance_layer_properties(&self) -> VkResult<Vec<vk::LayerProperties>> {
        Ok(self
            .instance_layers
            .iter()
            .map(|name| layer_properties(name))
            .collect())
    }

    unsafe fn create_instance(
        &self,
        create_info: &vk::InstanceCreateInfo,
    ) -> VkResult<vk::Instance> {
        let raw = self.create(ObjectKind::Instance)?;
        let mut record = self.record.borrow_mut();
        record.instance_extensions = read_names(
            create_info.pp_enabled_extension_names,
            create_info.enabled_extension_count,
        );
        record.instance_layers = read_names(
            create_info.pp_enabled_layer_names,
            create_info.enabled_layer_count,
        );
        Ok(vk::Instance::from_raw(raw))
    }

    unsafe fn destroy_instance(&self, instance: vk::Instance) {
        self.destroy(ObjectKind::Instance, instance.as_raw());
    }

    unsafe fn create_debug_utils_messenger(
        &self,
        _instance: vk::Instance,
        _create_info: &vk::DebugUtilsMessengerCreateInfoEXT,
    ) -> VkResult<vk::DebugUtilsMessengerEXT> {
        self.create(ObjectKind::DebugMessenger)
            .map(vk::DebugUtilsMessengerEXT::from_raw)
    }

    unsafe fn destroy_debug_utils_messenger(
        &self,
        _instance: vk::Instance,
        messenger: vk::DebugUtilsMessengerEXT,
    ) {
        self.destroy(ObjectKind::DebugMessenger, messenger.as_raw());
    }

    unsafe fn create_surface(
        &self,
        _instance: vk::Instance,
        _display_handle: RawDisplayHandle,
        _window_handle: RawWindowHandle,
    ) -> VkResult<vk::SurfaceKHR> {
        self.create(ObjectKind::Surface).map(vk::SurfaceKHR::from_raw)
    }

    unsafe fn destroy_surface(&self, _instance: vk::Instance, surface: vk::SurfaceKHR) {
        self.destroy(ObjectKind::Surface, surface.as_raw());
    }

    unsafe fn enumerate_physical_devices(
        &self,
        _instance: vk::Instance,
    ) -> VkResult<Vec<vk::PhysicalDevice>> {
        Ok((1..=self.gpus.len() as u64)
            .map(vk::PhysicalDevice::from_raw)
            .collect())
    }

    unsafe fn get_physical_device_properties(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> VkResult<vk::PhysicalDeviceProperties> {
        let gpu = self.gpu(physical_device)?;
        let mut properties = vk::PhysicalDeviceProperties {
            device_type: vk::PhysicalDeviceType::DISCRETE_GPU,
            ..Default::default()
        };
        let name = CString::new(gpu.name).map_err(|_| vk::Result::ERROR_UNKNOWN)?;
        write_name(&mut properties.device_name, &name);
        Ok(properties)
    }

    unsafe fn get_physical_device_queue_family_properties(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> VkResult<Vec<vk::QueueFamilyProperties>> {
        Ok(self
            .gpu(physical_device)?
            .queue_families
            .iter()
            .map(|flags| vk::QueueFamilyProperties {
                queue_flags: *flags,
                queue_count: 1,
                ..Default::default()
            })
            .collect())
    }

    unsafe fn get_physical_device_surface_support(
        &self,
        physical_device: vk::PhysicalDevice,
        queue_family_index: u32,
        _surface: vk::SurfaceKHR,
    ) -> VkResult<bool> {
        Ok(self
            .gpu(physical_device)?
            .present_families
            .contains(&queue_family_index))
    }

    unsafe fn enumerate_device_extension_properties(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> VkResult<Vec<vk::ExtensionProperties>> {
        Ok(self
            .gpu(physical_device)?
            .extensions
            .iter()
            .map(|name| extension_properties(name))
            .collect())
    }

    unsafe fn get_physical_device_surface_capabilities(
        &self,
        physical_device: vk::PhysicalDevice,
        _surface: vk::SurfaceKHR,
    ) -> VkResult<vk::SurfaceCapabilitiesKHR> {
        let gpu = self.gpu(physical_device)?;
        match gpu.capabilities_error {
            Some(err) => Err(err),
            None => Ok(gpu.capabilities),
        }
    }

    unsafe fn get_physical_device_surface_formats(
        &self,
        physical_device: vk::PhysicalDevice,
        _surface: vk::SurfaceKHR,
    ) -> VkResult<Vec<vk::SurfaceFormatKHR>> {
        Ok(self.gpu(physical_device)?.formats.clone())
    }

    unsafe fn get_physical_device_surface_present_modes(
        &self,
        physical_device: vk::PhysicalDevice,
        _surface: vk::SurfaceKHR,
    ) -> VkResult<Vec<vk::PresentModeKHR>> {
        Ok(self.gpu(physical_device)?.present_modes.clone())
    }

    unsafe fn create_device(
        &self,
        physical_device: vk::PhysicalDevice,
        create_info: &vk::DeviceCreateInfo,
    ) -> VkResult<vk::Device> {
        self.gpu(physical_device)?;
        let raw = self.create(ObjectKind::Device)?;
        let mut record = self.record.borrow_mut();
        record.physical_device = Some(physical_device);
        record.device_extensions = read_names(
            create_info.pp_enabled_extension_names,
            create_info.enabled_extension_count,
        );
        record.device_layers = read_names(
            create_info.pp_enabled_layer_names,
            create_info.enabled_layer_count,
        );
        record.queue_create_families = read_slice(
            create_info.p_queue_create_infos,
            create_info.queue_create_info_count,
        )
        .iter()
        .map(|info| info.queue_family_index)
        .collect();
        Ok(vk::Device::from_raw(raw))
    }

    unsafe fn destroy_device(&self, device: vk::Device) {
        self.destroy(ObjectKind::Device, device.as_raw());
    }

    unsafe fn get_device_queue(
        &self,
        _device: vk::Device,
        queue_family_index: u32,
        queue_index: u32,
    ) -> VkResult<vk::Queue> {
        Ok(vk::Queue::from_raw(
            0x100 + (queue_family_index as u64) * 16 + queue_index as u64,
        ))
    }

    unsafe fn create_swapchain(
        &self,
        _device: vk::Device,
        create_info: &vk::SwapchainCreateInfoKHR,
    ) -> VkResult<vk::SwapchainKHR> {
        let raw = self.create(ObjectKind::Swapchain)?;
        self.record.borrow_mut().swapchain = Some(SwapchainRequest {
            min_image_count: create_info.min_image_count,
            format: create_info.image_format,
            color_space: create_info.image_color_space,
            extent: create_info.image_extent,
            sharing_mode: create_info.image_sharing_mode,
            queue_family_indices: read_slice(
                create_info.p_queue_family_indices,
                create_info.queue_family_index_count,
            )
            .to_vec(),
            present_mode: create_info.present_mode,
            clipped: create_info.clipped == vk::TRUE,
            image_array_layers: create_info.image_array_layers,
        });
        Ok(vk::SwapchainKHR::from_raw(raw))
    }

    unsafe fn get_swapchain_images(
        &self,
        _device: vk::Device,
        swapchain: vk::SwapchainKHR,
    ) -> VkResult<Vec<vk::Image>> {
        let record = self.record.borrow();
        let extra = record
            .physical_device
            .and_then(|physical_device| self.gpu(physical_device).ok())
            .map_or(0, |gpu| gpu.extra_images);
        let count = record
            .swapchain
            .as_ref()
            .map_or(0, |request| request.min_image_count + extra);
        Ok((0..count as u64)
            .map(|i| vk::Image::from_raw(swapchain.as_raw() * 16 + i))
            .collect())
    }

    unsafe fn destroy_swapchain(&self, _device: vk::Device, swapchain: vk::SwapchainKHR) {
        self.destroy(ObjectKind::Swapchain, swapchain.as_raw());
    }

    unsafe fn create_image_view(
        &self,
        _device: vk::Device,
        create_info: &vk::ImageViewCreateInfo,
    ) -> VkResult<vk::ImageView> {
        let raw = self.create(ObjectKind::ImageView)?;
        self.record
            .borrow_mut()
            .image_view_formats
            .push(create_info.format);
        Ok(vk::ImageView::from_raw(raw))
    }

    unsafe fn destroy_image_view(&self, _device: vk::Device, image_view: vk::ImageView) {
        self.destroy(ObjectKind::ImageView, image_view.as_raw());
    }

    unsafe fn create_render_pass(
        &self,
        _device: vk::Device,
        create_info: &vk::RenderPassCreateInfo,
    ) -> VkResult<vk::RenderPass> {
        let raw = self.create(ObjectKind::RenderPass)?;
        let mut record = self.record.borrow_mut();
        record.render_pass_attachments =
            read_slice(create_info.p_attachments, create_info.attachment_count).to_vec();
        record.render_pass_dependency_count = create_info.dependency_count;
        Ok(vk::RenderPass::from_raw(raw))
    }

    unsafe fn destroy_render_pass(&self, _device: vk::Device, render_pass: vk::RenderPass) {
        self.destroy(ObjectKind::RenderPass, render_pass.as_raw());
    }

    unsafe fn create_shader_module(
        &self,
        _device: vk::Device,
        create_info: &vk::ShaderModuleCreateInfo,
    ) -> VkResult<vk::ShaderModule> {
        let words = read_slice(create_info.p_code, (create_info.code_size / 4) as u32);
        if create_info.code_size % 4 != 0 || words.first() != Some(&SPIRV_MAGIC) {
            return Err(vk::Result::ERROR_INVALID_SHADER_NV);
        }
        self.create(ObjectKind::ShaderModule)
            .map(vk::ShaderModule::from_raw)
    }

    unsafe fn destroy_shader_module(&self, _device: vk::Device, shader_module: vk::ShaderModule) {
        self.destroy(ObjectKind::ShaderModule, shader_module.as_raw());
    }

    unsafe fn create_pipeline_layout(
        &self,
        _device: vk::Device,
        _create_info: &vk::PipelineLayoutCreateInfo,
    ) -> VkResult<vk::PipelineLayout> {
        self.create(ObjectKind::PipelineLayout)
            .map(vk::PipelineLayout::from_raw)
    }

    unsafe fn destroy_pipeline_layout(&self, _device: vk::Device, layout: vk::PipelineLayout) {
        self.destroy(ObjectKind::PipelineLayout, layout.as_raw());
    }

    unsafe fn create_graphics_pipeline(
        &self,
        _device: vk::Device,
        create_info: &vk::GraphicsPipelineCreateInfo,
    ) -> VkResult<vk::Pipeline> {
        let raw = self.create(ObjectKind::Pipeline)?;
        let viewport_state = &*create_info.p_viewport_state;
        let color_blend_state = &*create_info.p_color_blend_state;
        self.record.borrow_mut().pipeline = Some(PipelineRequest {
            stages: read_slice(create_info.p_stages, create_info.stage_count)
                .iter()
                .map(|stage| stage.stage)
                .collect(),
            subpass: create_info.subpass,
            base_pipeline_index: create_info.base_pipeline_index,
            has_dynamic_state: !create_info.p_dynamic_state.is_null(),
            has_depth_stencil_state: !create_info.p_depth_stencil_state.is_null(),
            viewport: read_slice(
                viewport_state.p_viewports,
                viewport_state.viewport_count,
            )
            .first()
            .copied()
            .unwrap_or_default(),
            blend_attachment_count: color_blend_state.attachment_count,
        });
        Ok(vk::Pipeline::from_raw(raw))
    }

    unsafe fn destroy_pipeline(&self, _device: vk::Device, pipeline: vk::Pipeline) {
        self.destroy(ObjectKind::Pipeline, pipeline.as_raw());
    }

    unsafe fn create_framebuffer(
        &self,
        _device: vk::Device,
        create_info: &vk::FramebufferCreateInfo,
    ) -> VkResult<vk::Framebuffer> {
        let raw = self.create(ObjectKind::Framebuffer)?;
        self.record.borrow_mut().framebuffers.push(FramebufferRequest {
            attachment_count: create_info.attachment_count,
            width: create_info.width,
            height: create_info.height,
            layers: create_info.layers,
        });
        Ok(vk::Framebuffer::from_raw(raw))
    }

    unsafe fn destroy_framebuffer(&self, _device: vk::Device, framebuffer: vk::Framebuffer) {
        self.destroy(ObjectKind::Framebuffer, framebuffer.as_raw());
    }

    unsafe fn create_command_pool(
        &self,
        _device: vk::Device,
        create_info: &vk::CommandPoolCreateInfo,
    ) -> VkResult<vk::CommandPool> {
        let raw = self.create(ObjectKind::CommandPool)?;
        self.record.borrow_mut().command_pool = Some(*create_info);
        Ok(vk::CommandPool::from_raw(raw))
    }

    unsafe fn destroy_command_pool(&self, _device: vk::Device, pool: vk::CommandPool) {
        self.destroy(ObjectKind::CommandPool, pool.as_raw());
    }

    unsafe fn allocate_command_buffers(
        &self,
        _device: vk::Device,
        allocate_info: &vk::CommandBufferAllocateInfo,
    ) -> VkResult<Vec<vk::CommandBuffer>> {
        let mut record = self.record.borrow_mut();
        let nth = record.bump(ObjectKind::CommandBuffer);
        if self.fail == Some((ObjectKind::CommandBuffer, nth)) {
            return Err(vk::Result::ERROR_OUT_OF_DEVICE_MEMORY);
        }
        let base = allocate_info.command_pool.as_raw() * 16;
        record.command_buffer_levels.push(allocate_info.level);
        Ok((0..allocate_info.command_buffer_count as u64)
            .map(|i| vk::CommandBuffer::from_raw(base + i))
            .collect())
    }

    unsafe fn begin_command_buffer(
        &self,
        _device: vk::Device,
        _command_buffer: vk::CommandBuffer,
        begin_info: &vk::CommandBufferBeginInfo,
    ) -> VkResult<()> {
        if self.fail_begin {
            return Err(vk::Result::ERROR_OUT_OF_HOST_MEMORY);
        }
        self.record
            .borrow_mut()
            .command_buffer_begins
            .push(begin_info.flags);
        Ok(())
    }
}

/// Window stand-in: fixed size, closes after a set number of polls.
pub struct MockWindow {
    pub extensions: Vec<&'static CStr>,
    pub size: (u32, u32),
    pub polls_before_close: Cell<u32>,
    pub polls: Rc<Cell<u32>>,
}

impl MockWindow {
    pub fn new() -> Self {
        Self {
            extensions: vec![SurfaceLoader::name(), mock_surface_extension()],
            size: (800, 600),
            polls_before_close: Cell::new(3),
            polls: Rc::new(Cell::new(0)),
        }
    }
}

impl SurfaceProvider for MockWindow {
    fn required_instance_extensions(&self) -> RenderResult<Vec<&'static CStr>> {
        Ok(self.extensions.clone())
    }

    fn create_surface(
        &self,
        driver: &dyn Driver,
        instance: vk::Instance,
    ) -> RenderResult<vk::SurfaceKHR> {
        unsafe {
            driver.create_surface(
                instance,
                RawDisplayHandle::Xlib(XlibDisplayHandle::empty()),
                RawWindowHandle::Xlib(XlibWindowHandle::empty()),
            )
        }
        .map_err(RenderError::SurfaceCreation)
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        self.size
    }

    fn should_close(&self) -> bool {
        self.polls_before_close.get() == 0
    }

    fn poll_events(&mut self) {
        self.polls.set(self.polls.get() + 1);
        let remaining = self.polls_before_close.get();
        self.polls_before_close.set(remaining.saturating_sub(1));
    }
}

/// Writes a minimal SPIR-V-looking blob of `words` words into the temp dir.
pub fn write_spv(name: &str, words: usize) -> std::path::PathBuf {
    let mut bytes = SPIRV_MAGIC.to_le_bytes().to_vec();
    bytes.resize(words.max(1) * 4, 0);
    write_bytes(name, &bytes)
}

pub fn write_bytes(name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("valium-tests-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create temp shader dir");
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("write temp shader");
    path
}

/// Instance, surface and logical device on the first suitable mock GPU.
pub fn test_device(driver: &Rc<MockDriver>) -> (Rc<Device>, Rc<Surface>) {
    let window = MockWindow::new();
    let instance = Rc::new(
        InstanceBuilder::default()
            .with_surface_extensions(window.extensions.clone())
            .build(driver.clone())
            .expect("mock instance"),
    );
    let surface = Rc::new(Surface::new(&window, instance.clone()).expect("mock surface"));
    let physical_device = pick_physical_device(&instance, &surface).expect("mock gpu");
    let device = Rc::new(Device::new(instance, physical_device).expect("mock device"));
    (device, surface)
}
