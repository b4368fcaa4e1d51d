use std::{
    ffi::{CStr, CString},
    rc::Rc,
};

use ash::vk;
use log::{debug, info};

use super::{required_device_extensions, Instance, PhysicalDevice};
use crate::{
    config::Verbosity,
    driver::Driver,
    error::{RenderError, RenderResult},
    log_resource,
};

const QUEUE_PRIORITY: f32 = 1.0;

/// Logical device plus the graphics and present queues taken from it.
pub struct Device {
    handle: vk::Device,
    physical_device: PhysicalDevice,
    graphics_family: u32,
    present_family: u32,
    graphics_queue: vk::Queue,
    present_queue: vk::Queue,
    enabled_extensions: Vec<CString>,
    instance: Rc<Instance>,
}

impl Device {
    pub fn new(instance: Rc<Instance>, physical_device: PhysicalDevice) -> RenderResult<Self> {
        let (graphics_family, present_family) = physical_device
            .queue_family_indices()
            .complete()
            .ok_or(RenderError::NoSuitableGpu)?;

        let priorities = [QUEUE_PRIORITY];
        let queue_create_infos = physical_device
            .queue_family_indices()
            .unique_families()
            .into_iter()
            .map(|index| {
                vk::DeviceQueueCreateInfo::builder()
                    .queue_family_index(index)
                    .queue_priorities(&priorities)
                    .build()
            })
            .collect::<Vec<_>>();

        let mut extensions: Vec<&CStr> = vec![];
        for required in required_device_extensions() {
            if !physical_device.supports_extension(required) {
                return Err(RenderError::MissingDeviceExtension(
                    required.to_string_lossy().into_owned(),
                ));
            }
            extensions.push(required);
        }
        // Must be enabled whenever the implementation exposes it.
        if physical_device.supports_extension(vk::KhrPortabilitySubsetFn::name()) {
            extensions.push(vk::KhrPortabilitySubsetFn::name());
        }
        if instance.verbosity().extensions {
            debug!("enabling device extensions {extensions:?}");
        }
        let extension_ptrs = extensions.iter().map(|e| e.as_ptr()).collect::<Vec<_>>();
        let layer_ptrs = instance.validation().layer_name_ptrs();
        let features = vk::PhysicalDeviceFeatures::default();

        let create_info = vk::DeviceCreateInfo::builder()
            .queue_create_infos(&queue_create_infos)
            .enabled_extension_names(&extension_ptrs)
            .enabled_layer_names(&layer_ptrs)
            .enabled_features(&features);

        let handle = unsafe {
            instance
                .driver()
                .create_device(physical_device.handle(), &create_info)
        }
        .map_err(RenderError::LogicalDeviceCreation)?;
        info!(
            "created logical device on {:?} with {} queue family(ies)",
            physical_device.name(),
            queue_create_infos.len()
        );

        let mut device = Self {
            handle,
            physical_device,
            graphics_family,
            present_family,
            graphics_queue: vk::Queue::null(),
            present_queue: vk::Queue::null(),
            enabled_extensions: extensions.into_iter().map(CStr::to_owned).collect(),
            instance,
        };
        device.graphics_queue = device.queue(graphics_family)?;
        device.present_queue = device.queue(present_family)?;

        Ok(device)
    }

    fn queue(&self, family: u32) -> RenderResult<vk::Queue> {
        unsafe { self.driver().get_device_queue(self.handle, family, 0) }
            .map_err(RenderError::Query)
    }

    pub fn handle(&self) -> vk::Device {
        self.handle
    }

    pub fn driver(&self) -> &Rc<dyn Driver> {
        self.instance.driver()
    }

    pub fn instance(&self) -> &Rc<Instance> {
        &self.instance
    }

    pub fn verbosity(&self) -> Verbosity {
        self.instance.verbosity()
    }

    pub fn physical_device(&self) -> &PhysicalDevice {
        &self.physical_device
    }

    pub fn graphics_family(&self) -> u32 {
        self.graphics_family
    }

    pub fn present_family(&self) -> u32 {
        self.present_family
    }

    pub fn graphics_queue(&self) -> vk::Queue {
        self.graphics_queue
    }

    /// Same handle as [`Self::graphics_queue`] when both families coincide.
    pub fn present_queue(&self) -> vk::Queue {
        self.present_queue
    }

    pub fn enabled_extensions(&self) -> &[CString] {
        &self.enabled_extensions
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        log_resource!(self.verbosity(), "destroying logical device {:?}", self.handle);
        unsafe { self.driver().destroy_device(self.handle) };
    }
}
