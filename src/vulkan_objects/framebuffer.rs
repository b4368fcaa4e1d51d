use std::rc::Rc;

use ash::vk;

use super::{Device, ImageViews, RenderPass};
use crate::{
    error::{RenderError, RenderResult},
    log_resource,
};

/// One framebuffer per image view, each with that view as its only attachment.
pub struct Framebuffers {
    framebuffers: Vec<vk::Framebuffer>,
    extent: vk::Extent2D,
    device: Rc<Device>,
}

impl Framebuffers {
    pub fn new(
        device: Rc<Device>,
        render_pass: &RenderPass,
        image_views: &ImageViews,
        extent: vk::Extent2D,
    ) -> RenderResult<Self> {
        let mut framebuffers = Self {
            framebuffers: Vec::with_capacity(image_views.len()),
            extent,
            device,
        };

        for view in image_views.views() {
            let attachments = [*view];
            let create_info = vk::FramebufferCreateInfo::builder()
                .render_pass(render_pass.handle())
                .attachments(&attachments)
                .width(extent.width)
                .height(extent.height)
                .layers(1);
            let framebuffer = unsafe {
                framebuffers
                    .device
                    .driver()
                    .create_framebuffer(framebuffers.device.handle(), &create_info)
            }
            .map_err(RenderError::FramebufferCreation)?;
            log_resource!(
                framebuffers.device.verbosity(),
                "created framebuffer {framebuffer:?}"
            );
            framebuffers.framebuffers.push(framebuffer);
        }

        Ok(framebuffers)
    }

    pub fn handles(&self) -> &[vk::Framebuffer] {
        &self.framebuffers
    }

    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    pub fn len(&self) -> usize {
        self.framebuffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.framebuffers.is_empty()
    }
}

impl Drop for Framebuffers {
    fn drop(&mut self) {
        let driver = self.device.driver();
        for framebuffer in self.framebuffers.drain(..).rev() {
            log_resource!(
                self.device.verbosity(),
                "destroying framebuffer {framebuffer:?}"
            );
            unsafe { driver.destroy_framebuffer(self.device.handle(), framebuffer) };
        }
    }
}
