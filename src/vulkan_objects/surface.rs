use std::{ffi::CStr, rc::Rc};

use ash::vk;

use super::Instance;
use crate::{driver::Driver, error::RenderResult, log_resource};

/// What the bring-up path needs from the window system.
pub trait SurfaceProvider {
    /// Instance extensions this window system requires.
    fn required_instance_extensions(&self) -> RenderResult<Vec<&'static CStr>>;

    /// Creates a presentable surface bound to `instance`. Failures surface as
    /// [`RenderError::SurfaceCreation`](crate::error::RenderError::SurfaceCreation).
    fn create_surface(
        &self,
        driver: &dyn Driver,
        instance: vk::Instance,
    ) -> RenderResult<vk::SurfaceKHR>;

    /// Current framebuffer size in pixels.
    fn framebuffer_size(&self) -> (u32, u32);

    fn should_close(&self) -> bool;

    fn poll_events(&mut self);
}

pub struct Surface {
    inner: vk::SurfaceKHR,
    instance: Rc<Instance>,
}

impl Surface {
    pub fn new(provider: &dyn SurfaceProvider, instance: Rc<Instance>) -> RenderResult<Self> {
        let inner = provider.create_surface(instance.driver().as_ref(), instance.handle())?;
        log_resource!(instance.verbosity(), "created surface {inner:?}");
        Ok(Self { inner, instance })
    }

    pub fn surface_khr(&self) -> vk::SurfaceKHR {
        self.inner
    }

    pub fn instance(&self) -> &Rc<Instance> {
        &self.instance
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        log_resource!(self.instance.verbosity(), "destroying surface {:?}", self.inner);
        unsafe {
            self.instance
                .driver()
                .destroy_surface(self.instance.handle(), self.inner)
        };
    }
}

pub mod extent_helper {
    use super::*;

    pub fn viewport_from_extent(extent: vk::Extent2D) -> vk::Viewport {
        vk::Viewport::builder()
            .x(0.)
            .y(0.)
            .width(extent.width as f32)
            .height(extent.height as f32)
            .min_depth(0.)
            .max_depth(1.)
            .build()
    }

    pub fn scissor_from_extent(extent: vk::Extent2D) -> vk::Rect2D {
        vk::Rect2D::builder()
            .offset(vk::Offset2D::default())
            .extent(extent)
            .build()
    }

    /// The surface's own extent when it reports one, otherwise `(width, height)`
    /// clamped into the supported range.
    pub fn get_window_extent(
        capabilities: &vk::SurfaceCapabilitiesKHR,
        (width, height): (u32, u32),
    ) -> vk::Extent2D {
        if capabilities.current_extent.width != u32::MAX {
            capabilities.current_extent
        } else {
            let width = width.clamp(
                capabilities.min_image_extent.width,
                capabilities.max_image_extent.width,
            );
            let height = height.clamp(
                capabilities.min_image_extent.height,
                capabilities.max_image_extent.height,
            );
            vk::Extent2D::builder().width(width).height(height).build()
        }
    }
}
