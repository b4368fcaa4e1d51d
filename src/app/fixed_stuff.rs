use std::{mem::ManuallyDrop, rc::Rc};

use ash::vk;
use log::{info, warn};

use super::{FixedPipelineBuilder, GraphicsPipeline, PipelineBuilder};
use crate::{
    config::AppConfig,
    driver::Driver,
    error::RenderResult,
    vulkan_objects::{
        pick_physical_device, swapchain_helper, CommandPool, Device, Framebuffers, ImageViews,
        Instance, InstanceBuilder, RenderPass, Surface, SurfaceProvider, Swapchain,
        VulkanApiVersion,
    },
};

/// Where bring-up has got to. Only ever moves forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecycleState {
    Idle,
    InstanceCreated,
    SurfaceCreated,
    DeviceSelected,
    LogicalDeviceReady,
    SwapchainReady,
    PipelineReady,
    FrameReady,
    Running,
    TornDown,
}

#[derive(Clone, Debug)]
pub struct Lifecycle {
    state: LifecycleState,
    history: Vec<LifecycleState>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self {
            state: LifecycleState::Idle,
            history: vec![LifecycleState::Idle],
        }
    }
}

impl Lifecycle {
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Every state passed through so far, oldest first.
    pub fn history(&self) -> &[LifecycleState] {
        &self.history
    }

    /// Moves to `next`; returns false and stays put if that would go backwards.
    pub fn advance(&mut self, next: LifecycleState) -> bool {
        if next <= self.state {
            warn!("ignoring lifecycle transition {:?} -> {next:?}", self.state);
            return false;
        }
        info!("{:?} -> {next:?}", self.state);
        self.state = next;
        self.history.push(next);
        true
    }
}

/// Everything created on the GPU, declared in teardown order.
struct RenderStack {
    framebuffers: Framebuffers,
    pipeline: GraphicsPipeline,
    render_pass: RenderPass,
    image_views: ImageViews,
    swapchain: Swapchain,
    command_pool: CommandPool,
    device: Rc<Device>,
    surface: Rc<Surface>,
    instance: Rc<Instance>,
}

/// The whole bring-up: owns the window and every Vulkan object made for it.
///
/// [`Valium::new`] builds the stack from the instance up to the framebuffers;
/// any failure on the way releases what was already made, newest first.
/// Dropping a `Valium` releases the stack in exact reverse creation order and
/// then the window.
pub struct Valium {
    stack: ManuallyDrop<RenderStack>,
    provider: Box<dyn SurfaceProvider>,
    lifecycle: Lifecycle,
}

impl Valium {
    pub fn new(
        driver: Rc<dyn Driver>,
        provider: Box<dyn SurfaceProvider>,
        config: &AppConfig,
    ) -> RenderResult<Self> {
        let mut lifecycle = Lifecycle::default();

        let instance = Rc::new(
            InstanceBuilder::default()
                .with_app_name_and_version(&config.app_name, vk::make_api_version(0, 1, 0, 0))
                .with_engine_name_and_version("No Engine", vk::make_api_version(0, 1, 0, 0))
                .with_vulkan_api_version(VulkanApiVersion::V1_0)
                .with_validation(config.validation.clone())
                .with_surface_extensions(provider.required_instance_extensions()?)
                .with_verbosity(config.verbosity)
                .build(driver)?,
        );
        lifecycle.advance(LifecycleState::InstanceCreated);

        let surface = Rc::new(Surface::new(provider.as_ref(), instance.clone())?);
        lifecycle.advance(LifecycleState::SurfaceCreated);

        let physical_device = pick_physical_device(&instance, &surface)?;
        // Settle the surface format before anything is created on the device.
        swapchain_helper::choose_surface_format(&physical_device.swapchain_support().formats)?;
        lifecycle.advance(LifecycleState::DeviceSelected);

        let device = Rc::new(Device::new(instance.clone(), physical_device)?);
        lifecycle.advance(LifecycleState::LogicalDeviceReady);

        let command_pool = CommandPool::new(device.clone())?;
        let swapchain = Swapchain::new(device.clone(), surface.clone(), provider.framebuffer_size())?;
        let image_views = ImageViews::new(&swapchain)?;
        lifecycle.advance(LifecycleState::SwapchainReady);

        let render_pass = RenderPass::new(device.clone(), swapchain.format())?;
        let pipeline = FixedPipelineBuilder::new(
            device.clone(),
            swapchain.extent(),
            render_pass.handle(),
            config.vertex_shader.clone(),
            config.fragment_shader.clone(),
        )
        .build()?;
        lifecycle.advance(LifecycleState::PipelineReady);

        let framebuffers =
            Framebuffers::new(device.clone(), &render_pass, &image_views, swapchain.extent())?;
        lifecycle.advance(LifecycleState::FrameReady);

        Ok(Self {
            stack: ManuallyDrop::new(RenderStack {
                framebuffers,
                pipeline,
                render_pass,
                image_views,
                swapchain,
                command_pool,
                device,
                surface,
                instance,
            }),
            provider,
            lifecycle,
        })
    }

    /// Pumps window events until the window asks to close. Nothing is drawn.
    pub fn run(&mut self) {
        if self.lifecycle.state() < LifecycleState::Running {
            self.lifecycle.advance(LifecycleState::Running);
        }
        while !self.provider.should_close() {
            self.provider.poll_events();
        }
        info!("window closed");
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn instance(&self) -> &Rc<Instance> {
        &self.stack.instance
    }

    pub fn surface(&self) -> &Rc<Surface> {
        &self.stack.surface
    }

    pub fn device(&self) -> &Rc<Device> {
        &self.stack.device
    }

    pub fn graphics_queue(&self) -> vk::Queue {
        self.stack.device.graphics_queue()
    }

    pub fn present_queue(&self) -> vk::Queue {
        self.stack.device.present_queue()
    }

    pub fn swapchain(&self) -> &Swapchain {
        &self.stack.swapchain
    }

    pub fn image_views(&self) -> &ImageViews {
        &self.stack.image_views
    }

    pub fn render_pass(&self) -> &RenderPass {
        &self.stack.render_pass
    }

    pub fn pipeline(&self) -> &GraphicsPipeline {
        &self.stack.pipeline
    }

    pub fn framebuffers(&self) -> &Framebuffers {
        &self.stack.framebuffers
    }

    pub fn command_pool(&self) -> &CommandPool {
        &self.stack.command_pool
    }

    pub fn record_command(&self, image_index: u32) -> RenderResult<vk::CommandBuffer> {
        self.stack.command_pool.record_command(image_index)
    }

    pub fn provider(&self) -> &dyn SurfaceProvider {
        self.provider.as_ref()
    }
}

impl Drop for Valium {
    fn drop(&mut self) {
        // SAFETY: `stack` is never touched again after this point.
        unsafe { ManuallyDrop::drop(&mut self.stack) };
        self.lifecycle.advance(LifecycleState::TornDown);
    }
}
