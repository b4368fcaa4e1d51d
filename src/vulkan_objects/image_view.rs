use std::rc::Rc;

use ash::vk;

use super::{Device, Swapchain};
use crate::{
    error::{RenderError, RenderResult},
    log_resource,
};

/// One 2D color view per swapchain image, in image order.
pub struct ImageViews {
    views: Vec<vk::ImageView>,
    device: Rc<Device>,
}

impl ImageViews {
    pub fn new(swapchain: &Swapchain) -> RenderResult<Self> {
        let device = swapchain.device().clone();
        let mut image_views = Self {
            views: Vec::with_capacity(swapchain.images().len()),
            device,
        };

        for image in swapchain.images() {
            let create_info = vk::ImageViewCreateInfo::builder()
                .image(*image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(swapchain.format())
                .components(vk::ComponentMapping {
                    r: vk::ComponentSwizzle::IDENTITY,
                    g: vk::ComponentSwizzle::IDENTITY,
                    b: vk::ComponentSwizzle::IDENTITY,
                    a: vk::ComponentSwizzle::IDENTITY,
                })
                .subresource_range(
                    vk::ImageSubresourceRange::builder()
                        .aspect_mask(vk::ImageAspectFlags::COLOR)
                        .base_mip_level(0)
                        .level_count(1)
                        .base_array_layer(0)
                        .layer_count(1)
                        .build(),
                );
            let view = unsafe {
                image_views
                    .device
                    .driver()
                    .create_image_view(image_views.device.handle(), &create_info)
            }
            .map_err(RenderError::ImageViewCreation)?;
            log_resource!(image_views.device.verbosity(), "created image view {view:?}");
            image_views.views.push(view);
        }

        Ok(image_views)
    }

    pub fn views(&self) -> &[vk::ImageView] {
        &self.views
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

impl Drop for ImageViews {
    fn drop(&mut self) {
        let driver = self.device.driver();
        for view in self.views.drain(..).rev() {
            log_resource!(self.device.verbosity(), "destroying image view {view:?}");
            unsafe { driver.destroy_image_view(self.device.handle(), view) };
        }
    }
}
