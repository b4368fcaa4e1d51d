use std::ffi::{CStr, CString};

use ash::{extensions::khr::Swapchain as SwapchainLoader, vk};
use log::{debug, info, warn};

use super::{extension_names, Instance, Surface, SwapchainSupport};
use crate::{
    config::Verbosity,
    driver::Driver,
    error::{RenderError, RenderResult},
    queue_family::QueueFamilyIndices,
};

/// Device extensions every candidate GPU must offer.
pub fn required_device_extensions() -> Vec<&'static CStr> {
    vec![SwapchainLoader::name()]
}

/// What the selector learned about one GPU. Does not own anything.
#[derive(Clone, Debug)]
pub struct PhysicalDevice {
    handle: vk::PhysicalDevice,
    name: String,
    queue_family_indices: QueueFamilyIndices,
    available_extensions: Vec<CString>,
    swapchain_support: SwapchainSupport,
}

impl PhysicalDevice {
    pub fn inspect(
        driver: &dyn Driver,
        handle: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
        verbosity: Verbosity,
    ) -> RenderResult<Self> {
        let properties =
            unsafe { driver.get_physical_device_properties(handle) }.map_err(RenderError::Query)?;
        let name = unsafe { CStr::from_ptr(properties.device_name.as_ptr()) }
            .to_string_lossy()
            .into_owned();

        let queue_family_indices =
            QueueFamilyIndices::find(driver, handle, Some(surface), verbosity.queues)?;

        let available_extensions = extension_names(
            &unsafe { driver.enumerate_device_extension_properties(handle) }
                .map_err(RenderError::Query)?,
        );
        if verbosity.extensions {
            debug!("{name}: available device extensions: {available_extensions:?}");
        }

        let swapchain_support = SwapchainSupport::query(driver, handle, surface)?;

        Ok(Self {
            handle,
            name,
            queue_family_indices,
            available_extensions,
            swapchain_support,
        })
    }

    pub fn handle(&self) -> vk::PhysicalDevice {
        self.handle
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn queue_family_indices(&self) -> QueueFamilyIndices {
        self.queue_family_indices
    }

    pub fn available_extensions(&self) -> &[CString] {
        &self.available_extensions
    }

    pub fn swapchain_support(&self) -> &SwapchainSupport {
        &self.swapchain_support
    }

    pub fn supports_extension(&self, name: &CStr) -> bool {
        self.available_extensions
            .iter()
            .any(|ext| ext.as_c_str() == name)
    }

    pub fn supports_required_extensions(&self) -> bool {
        required_device_extensions()
            .into_iter()
            .all(|name| self.supports_extension(name))
    }

    pub fn is_suitable(&self) -> bool {
        self.queue_family_indices.is_complete()
            && self.supports_required_extensions()
            && self.swapchain_support.is_usable()
    }
}

/// First GPU, in enumeration order, that can draw and present to `surface`.
pub fn pick_physical_device(instance: &Instance, surface: &Surface) -> RenderResult<PhysicalDevice> {
    let driver = instance.driver();
    let candidates = unsafe { driver.enumerate_physical_devices(instance.handle()) }
        .map_err(RenderError::Query)?;
    if candidates.is_empty() {
        return Err(RenderError::NoGpu);
    }

    for handle in candidates {
        let candidate = match PhysicalDevice::inspect(
            driver.as_ref(),
            handle,
            surface.surface_khr(),
            instance.verbosity(),
        ) {
            Ok(candidate) => candidate,
            Err(err) => {
                warn!("skipping GPU {handle:?}: {err}");
                continue;
            }
        };
        if candidate.is_suitable() {
            info!("selected GPU {:?}", candidate.name());
            return Ok(candidate);
        }
        debug!(
            "skipping GPU {:?}: queues {:?}, required extensions {}, swapchain usable {}",
            candidate.name(),
            candidate.queue_family_indices(),
            candidate.supports_required_extensions(),
            candidate.swapchain_support().is_usable()
        );
    }

    Err(RenderError::NoSuitableGpu)
}
