mod validation;
pub use validation::{ValidationPolicy, VALIDATION_LAYER_NAME};

mod instance;
pub use instance::{
    available_instance_extensions, extension_names, Instance, InstanceBuilder, VulkanApiVersion,
};

mod surface;
pub use surface::{extent_helper, Surface, SurfaceProvider};

mod physical_device;
pub use physical_device::{pick_physical_device, required_device_extensions, PhysicalDevice};

mod device;
pub use device::Device;

mod swapchain;
pub use swapchain::{swapchain_helper, Swapchain, SwapchainSupport};

mod image_view;
pub use image_view::ImageViews;

mod renderpass;
pub use renderpass::RenderPass;

mod shader;
pub use shader::{ShaderModule, ShaderStages, SHADER_ENTRY_POINT};

mod framebuffer;
pub use framebuffer::Framebuffers;

mod command;
pub use command::CommandPool;
