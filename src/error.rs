use std::path::PathBuf;

use ash::vk;
use thiserror::Error;

/// Every way bringing up the rendering context can fail.
///
/// Variants wrapping a [`vk::Result`] name the step that failed, so the
/// rendered message reads like `failed to create swapchain: ERROR_...`.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to load the vulkan library: {0}")]
    Loader(#[from] ash::LoadingError),

    #[error("failed to create window: {0}")]
    WindowCreation(#[from] winit::error::OsError),

    #[error("vulkan query failed: {0:?}")]
    Query(vk::Result),

    #[error("validation layer {0} is not supported")]
    UnsupportedLayer(String),

    #[error("required instance extension {0} is not available")]
    MissingInstanceExtension(String),

    #[error("failed to create instance: {0:?}")]
    InstanceCreation(vk::Result),

    #[error("failed to find GPUs with vulkan support")]
    NoGpu,

    #[error("failed to find a suitable GPU")]
    NoSuitableGpu,

    #[error("required device extension {0} is not available")]
    MissingDeviceExtension(String),

    #[error("failed to create logical device: {0:?}")]
    LogicalDeviceCreation(vk::Result),

    #[error("failed to create window surface: {0:?}")]
    SurfaceCreation(vk::Result),

    #[error("surface does not support format {format:?} with color space {color_space:?}")]
    UnsupportedSurfaceFormat {
        format: vk::Format,
        color_space: vk::ColorSpaceKHR,
    },

    #[error("failed to create swapchain: {0:?}")]
    SwapchainCreation(vk::Result),

    #[error("failed to create image view: {0:?}")]
    ImageViewCreation(vk::Result),

    #[error("failed to create render pass: {0:?}")]
    RenderPassCreation(vk::Result),

    #[error("failed to load shader {}: {source}", path.display())]
    ShaderLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to create shader module from {}: {result:?}", path.display())]
    ShaderCompile { path: PathBuf, result: vk::Result },

    #[error("failed to create pipeline layout: {0:?}")]
    PipelineLayoutCreation(vk::Result),

    #[error("failed to create graphics pipeline: {0:?}")]
    PipelineCreation(vk::Result),

    #[error("failed to create framebuffer: {0:?}")]
    FramebufferCreation(vk::Result),

    #[error("failed to create command pool: {0:?}")]
    CommandPoolCreation(vk::Result),

    #[error("failed to allocate command buffers: {0:?}")]
    CommandBufferAllocation(vk::Result),

    #[error("failed to begin recording command buffer: {0:?}")]
    CommandBufferBegin(vk::Result),
}

pub type RenderResult<T> = std::result::Result<T, RenderError>;
