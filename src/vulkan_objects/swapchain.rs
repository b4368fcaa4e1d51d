use std::rc::Rc;

use ash::vk;
use log::info;

use super::{Device, Surface};
use crate::{
    driver::Driver,
    error::{RenderError, RenderResult},
    log_resource,
};

/// Surface properties of one (GPU, surface) pair.
#[derive(Clone, Debug, Default)]
pub struct SwapchainSupport {
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
}

impl SwapchainSupport {
    pub fn query(
        driver: &dyn Driver,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> RenderResult<Self> {
        unsafe {
            Ok(Self {
                capabilities: driver
                    .get_physical_device_surface_capabilities(physical_device, surface)
                    .map_err(RenderError::Query)?,
                formats: driver
                    .get_physical_device_surface_formats(physical_device, surface)
                    .map_err(RenderError::Query)?,
                present_modes: driver
                    .get_physical_device_surface_present_modes(physical_device, surface)
                    .map_err(RenderError::Query)?,
            })
        }
    }

    pub fn is_usable(&self) -> bool {
        !self.formats.is_empty() && !self.present_modes.is_empty()
    }
}

pub mod swapchain_helper {
    use super::*;
    use crate::vulkan_objects::extent_helper;

    pub const SURFACE_FORMAT: vk::SurfaceFormatKHR = vk::SurfaceFormatKHR {
        format: vk::Format::B8G8R8A8_SRGB,
        color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
    };

    pub fn choose_surface_format(
        formats: &[vk::SurfaceFormatKHR],
    ) -> RenderResult<vk::SurfaceFormatKHR> {
        formats
            .iter()
            .find(|f| {
                f.format == SURFACE_FORMAT.format && f.color_space == SURFACE_FORMAT.color_space
            })
            .copied()
            .ok_or(RenderError::UnsupportedSurfaceFormat {
                format: SURFACE_FORMAT.format,
                color_space: SURFACE_FORMAT.color_space,
            })
    }

    /// FIFO is the one mode every implementation has to offer.
    pub fn choose_present_mode(_present_modes: &[vk::PresentModeKHR]) -> vk::PresentModeKHR {
        vk::PresentModeKHR::FIFO
    }

    pub fn choose_extent(
        capabilities: &vk::SurfaceCapabilitiesKHR,
        framebuffer_size: (u32, u32),
    ) -> vk::Extent2D {
        extent_helper::get_window_extent(capabilities, framebuffer_size)
    }

    /// One more than the minimum, capped by the maximum unless that is 0 (no limit).
    pub fn choose_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
        let count = capabilities.min_image_count + 1;
        if capabilities.max_image_count > 0 {
            count.min(capabilities.max_image_count)
        } else {
            count
        }
    }

    pub fn choose_sharing((graphics, present): (u32, u32)) -> (vk::SharingMode, Vec<u32>) {
        if graphics != present {
            (vk::SharingMode::CONCURRENT, vec![graphics, present])
        } else {
            (vk::SharingMode::EXCLUSIVE, vec![])
        }
    }
}

use swapchain_helper::*;

pub struct Swapchain {
    handle: vk::SwapchainKHR,
    format: vk::Format,
    color_space: vk::ColorSpaceKHR,
    extent: vk::Extent2D,
    present_mode: vk::PresentModeKHR,
    min_image_count: u32,
    images: Vec<vk::Image>,
    sharing_mode: vk::SharingMode,
    queue_family_indices: Vec<u32>,
    device: Rc<Device>,
    surface: Rc<Surface>,
}

impl Swapchain {
    pub fn new(
        device: Rc<Device>,
        surface: Rc<Surface>,
        framebuffer_size: (u32, u32),
    ) -> RenderResult<Self> {
        let support = device.physical_device().swapchain_support();
        let surface_format = choose_surface_format(&support.formats)?;
        let present_mode = choose_present_mode(&support.present_modes);
        let extent = choose_extent(&support.capabilities, framebuffer_size);
        let min_image_count = choose_image_count(&support.capabilities);
        let (sharing_mode, queue_family_indices) =
            choose_sharing((device.graphics_family(), device.present_family()));

        let create_info = vk::SwapchainCreateInfoKHR::builder()
            .surface(surface.surface_khr())
            .min_image_count(min_image_count)
            .image_format(surface_format.format)
            .image_color_space(surface_format.color_space)
            .image_extent(extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .image_sharing_mode(sharing_mode)
            .queue_family_indices(&queue_family_indices)
            .pre_transform(support.capabilities.current_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(present_mode)
            .clipped(true)
            .old_swapchain(vk::SwapchainKHR::null());

        let handle = unsafe {
            device
                .driver()
                .create_swapchain(device.handle(), &create_info)
        }
        .map_err(RenderError::SwapchainCreation)?;
        log_resource!(device.verbosity(), "created swapchain {handle:?}");

        let mut swapchain = Self {
            handle,
            format: surface_format.format,
            color_space: surface_format.color_space,
            extent,
            present_mode,
            min_image_count,
            images: vec![],
            sharing_mode,
            queue_family_indices,
            device,
            surface,
        };
        swapchain.images = unsafe {
            swapchain
                .device
                .driver()
                .get_swapchain_images(swapchain.device.handle(), handle)
        }
        .map_err(RenderError::Query)?;

        info!(
            "swapchain: {} images of {:?}/{:?}, {}x{}, {:?}, {:?}",
            swapchain.images.len(),
            swapchain.format,
            swapchain.color_space,
            extent.width,
            extent.height,
            present_mode,
            sharing_mode
        );
        Ok(swapchain)
    }

    pub fn swapchain_khr(&self) -> vk::SwapchainKHR {
        self.handle
    }

    pub fn format(&self) -> vk::Format {
        self.format
    }

    pub fn color_space(&self) -> vk::ColorSpaceKHR {
        self.color_space
    }

    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    pub fn present_mode(&self) -> vk::PresentModeKHR {
        self.present_mode
    }

    /// The count requested at creation; the implementation may hand out more images.
    pub fn min_image_count(&self) -> u32 {
        self.min_image_count
    }

    pub fn images(&self) -> &[vk::Image] {
        &self.images
    }

    pub fn sharing_mode(&self) -> vk::SharingMode {
        self.sharing_mode
    }

    pub fn queue_family_indices(&self) -> &[u32] {
        &self.queue_family_indices
    }

    pub fn device(&self) -> &Rc<Device> {
        &self.device
    }

    pub fn surface(&self) -> &Rc<Surface> {
        &self.surface
    }
}

impl Drop for Swapchain {
    fn drop(&mut self) {
        log_resource!(self.device.verbosity(), "destroying swapchain {:?}", self.handle);
        unsafe {
            self.device
                .driver()
                .destroy_swapchain(self.device.handle(), self.handle)
        };
    }
}
