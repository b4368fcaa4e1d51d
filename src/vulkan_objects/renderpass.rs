use std::rc::Rc;

use ash::vk;

use super::Device;
use crate::{
    error::{RenderError, RenderResult},
    log_resource,
};

/// Single subpass writing one color attachment that ends up ready to present.
pub struct RenderPass {
    handle: vk::RenderPass,
    color_format: vk::Format,
    device: Rc<Device>,
}

impl RenderPass {
    pub fn new(device: Rc<Device>, color_format: vk::Format) -> RenderResult<Self> {
        let attachments = [renderpass_helper::color_attachment_description(color_format)];
        let color_refs = [vk::AttachmentReference::builder()
            .attachment(0)
            .layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL)
            .build()];
        let subpasses = [vk::SubpassDescription::builder()
            .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
            .color_attachments(&color_refs)
            .build()];

        // No subpass dependency yet: nothing is ever submitted against this pass.
        let create_info = vk::RenderPassCreateInfo::builder()
            .attachments(&attachments)
            .subpasses(&subpasses);

        let handle = unsafe {
            device
                .driver()
                .create_render_pass(device.handle(), &create_info)
        }
        .map_err(RenderError::RenderPassCreation)?;
        log_resource!(device.verbosity(), "created render pass {handle:?}");

        Ok(Self {
            handle,
            color_format,
            device,
        })
    }

    pub fn handle(&self) -> vk::RenderPass {
        self.handle
    }

    pub fn color_format(&self) -> vk::Format {
        self.color_format
    }
}

impl Drop for RenderPass {
    fn drop(&mut self) {
        log_resource!(self.device.verbosity(), "destroying render pass {:?}", self.handle);
        unsafe {
            self.device
                .driver()
                .destroy_render_pass(self.device.handle(), self.handle)
        };
    }
}

pub mod renderpass_helper {
    use super::*;

    pub fn color_attachment_description(format: vk::Format) -> vk::AttachmentDescription {
        vk::AttachmentDescription::builder()
            .format(format)
            .samples(vk::SampleCountFlags::TYPE_1)
            .load_op(vk::AttachmentLoadOp::CLEAR)
            .store_op(vk::AttachmentStoreOp::STORE)
            .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
            .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .final_layout(vk::ImageLayout::PRESENT_SRC_KHR)
            .build()
    }
}
