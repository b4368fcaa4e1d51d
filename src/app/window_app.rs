use std::ffi::CStr;

use ash::vk;
use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle};
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent},
    event_loop::EventLoop,
    platform::run_return::EventLoopExtRunReturn,
    window::WindowBuilder,
};

use crate::{
    config::AppConfig,
    driver::Driver,
    error::{RenderError, RenderResult},
    vulkan_objects::SurfaceProvider,
};

/// Fixed-size, non-resizable winit window that presents but never draws.
pub struct Window {
    inner: winit::window::Window,
    event_loop: EventLoop<()>,
    close_requested: bool,
}

impl Window {
    pub fn new(config: &AppConfig) -> RenderResult<Self> {
        let event_loop = EventLoop::new();
        let inner = WindowBuilder::new()
            .with_title(&config.app_name)
            .with_inner_size(PhysicalSize::new(config.width, config.height))
            .with_resizable(false)
            .build(&event_loop)?;
        Ok(Self {
            inner,
            event_loop,
            close_requested: false,
        })
    }

    pub fn winit_window(&self) -> &winit::window::Window {
        &self.inner
    }
}

impl SurfaceProvider for Window {
    fn required_instance_extensions(&self) -> RenderResult<Vec<&'static CStr>> {
        let names = ash_window::enumerate_required_extensions(self.inner.raw_display_handle())
            .map_err(RenderError::Query)?;
        Ok(names
            .iter()
            .map(|name| unsafe { CStr::from_ptr(*name) })
            .collect())
    }

    fn create_surface(
        &self,
        driver: &dyn Driver,
        instance: vk::Instance,
    ) -> RenderResult<vk::SurfaceKHR> {
        unsafe {
            driver.create_surface(
                instance,
                self.inner.raw_display_handle(),
                self.inner.raw_window_handle(),
            )
        }
        .map_err(RenderError::SurfaceCreation)
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        let size = self.inner.inner_size();
        (size.width, size.height)
    }

    fn should_close(&self) -> bool {
        self.close_requested
    }

    /// Handles whatever is pending and returns once the queue is drained.
    fn poll_events(&mut self) {
        let mut close_requested = false;
        self.event_loop.run_return(|event, _, control_flow| {
            control_flow.set_poll();
            match event {
                Event::WindowEvent {
                    event:
                        WindowEvent::CloseRequested
                        | WindowEvent::KeyboardInput {
                            input:
                                KeyboardInput {
                                    state: ElementState::Pressed,
                                    virtual_keycode: Some(VirtualKeyCode::Escape),
                                    ..
                                },
                            ..
                        },
                    ..
                } => close_requested = true,
                Event::MainEventsCleared => control_flow.set_exit(),
                _ => (),
            }
        });
        self.close_requested |= close_requested;
    }
}
