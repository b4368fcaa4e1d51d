use std::{
    borrow::Cow,
    ffi::{c_char, CStr, CString},
    rc::Rc,
};

use ash::{extensions::ext::DebugUtils, vk};
use log::{debug, error, info, trace, warn};

use super::ValidationPolicy;
use crate::{
    config::Verbosity,
    driver::Driver,
    error::{RenderError, RenderResult},
};

#[derive(Clone, Copy, Debug)]
pub enum VulkanApiVersion {
    V1_0,
    V1_1,
    V1_2,
    V1_3,
}

impl VulkanApiVersion {
    fn get_u32_version(&self) -> u32 {
        match self {
            Self::V1_0 => vk::API_VERSION_1_0,
            Self::V1_1 => vk::API_VERSION_1_1,
            Self::V1_2 => vk::API_VERSION_1_2,
            Self::V1_3 => vk::API_VERSION_1_3,
        }
    }
}

/// Names out of an extension enumeration, in the order the loader reported them.
pub fn extension_names(properties: &[vk::ExtensionProperties]) -> Vec<CString> {
    properties
        .iter()
        .map(|props| unsafe { CStr::from_ptr(props.extension_name.as_ptr()) }.to_owned())
        .collect()
}

/// Instance-level extensions the loader offers.
pub fn available_instance_extensions(driver: &dyn Driver) -> RenderResult<Vec<CString>> {
    driver
        .enumerate_instance_extension_properties()
        .map(|props| extension_names(&props))
        .map_err(RenderError::Query)
}

pub struct InstanceBuilder<'a> {
    app_name: &'a str,
    engine_name: &'a str,
    app_version: u32,
    engine_version: u32,
    vulkan_api_version: VulkanApiVersion,
    validation: ValidationPolicy,
    surface_extensions: Vec<&'static CStr>,
    verbosity: Verbosity,
}

impl<'a> Default for InstanceBuilder<'a> {
    fn default() -> Self {
        Self {
            app_name: "",
            engine_name: "No Engine",
            app_version: vk::make_api_version(0, 1, 0, 0),
            engine_version: vk::make_api_version(0, 1, 0, 0),
            vulkan_api_version: VulkanApiVersion::V1_0,
            validation: ValidationPolicy::disabled(),
            surface_extensions: vec![],
            verbosity: Verbosity::QUIET,
        }
    }
}

impl<'a> InstanceBuilder<'a> {
    pub fn with_app_name_and_version(mut self, name: &'a str, version: u32) -> Self {
        self.app_name = name;
        self.app_version = version;
        self
    }

    pub fn with_engine_name_and_version(mut self, name: &'a str, version: u32) -> Self {
        self.engine_name = name;
        self.engine_version = version;
        self
    }

    pub fn with_vulkan_api_version(mut self, version: VulkanApiVersion) -> Self {
        self.vulkan_api_version = version;
        self
    }

    pub fn with_validation(mut self, validation: ValidationPolicy) -> Self {
        self.validation = validation;
        self
    }

    /// Extensions the window system needs; each must be offered by the loader.
    pub fn with_surface_extensions(mut self, extensions: Vec<&'static CStr>) -> Self {
        self.surface_extensions = extensions;
        self
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn build(&self, driver: Rc<dyn Driver>) -> RenderResult<Instance> {
        let available = available_instance_extensions(driver.as_ref())?;
        if self.verbosity.extensions {
            debug!("available instance extensions: {available:?}");
        }
        let is_available = |name: &CStr| available.iter().any(|ext| ext.as_c_str() == name);

        let mut extensions: Vec<&CStr> = vec![];
        // Dependency of VK_KHR_portability_subset on the device side.
        if is_available(vk::KhrGetPhysicalDeviceProperties2Fn::name()) {
            extensions.push(vk::KhrGetPhysicalDeviceProperties2Fn::name());
        }

        #[cfg(any(target_os = "macos", target_os = "ios"))]
        let portability = is_available(vk::KhrPortabilityEnumerationFn::name());
        #[cfg(not(any(target_os = "macos", target_os = "ios")))]
        let portability = false;
        if portability {
            extensions.push(vk::KhrPortabilityEnumerationFn::name());
        }

        for required in &self.surface_extensions {
            if self.verbosity.extensions {
                debug!("checking for {required:?} in instance extensions");
            }
            if !is_available(*required) {
                return Err(RenderError::MissingInstanceExtension(
                    required.to_string_lossy().into_owned(),
                ));
            }
            if !extensions.contains(required) {
                extensions.push(*required);
            }
        }

        self.validation.check_support(driver.as_ref())?;
        let debug_messenger_enabled = self.validation.enabled && is_available(DebugUtils::name());
        if debug_messenger_enabled {
            extensions.push(DebugUtils::name());
        } else if self.validation.enabled {
            warn!("{:?} is not available, validation output is not logged", DebugUtils::name());
        }

        let app_name = vk_name(self.app_name)?;
        let engine_name = vk_name(self.engine_name)?;
        let app_info = vk::ApplicationInfo::builder()
            .application_name(&app_name)
            .application_version(self.app_version)
            .engine_name(&engine_name)
            .engine_version(self.engine_version)
            .api_version(self.vulkan_api_version.get_u32_version());

        let extension_ptrs = extensions.iter().map(|e| e.as_ptr()).collect::<Vec<_>>();
        let layer_ptrs: Vec<*const c_char> = self.validation.layer_name_ptrs();

        let create_flags = if portability {
            vk::InstanceCreateFlags::ENUMERATE_PORTABILITY_KHR
        } else {
            vk::InstanceCreateFlags::default()
        };

        let instance_create_info = vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_extension_names(&extension_ptrs)
            .enabled_layer_names(&layer_ptrs)
            .flags(create_flags);

        let handle = unsafe { driver.create_instance(&instance_create_info) }
            .map_err(RenderError::InstanceCreation)?;
        info!("created vulkan instance for {:?}", self.app_name);

        let mut instance = Instance {
            driver,
            handle,
            debug_messenger: None,
            enabled_extensions: extensions.iter().map(|e| (*e).to_owned()).collect(),
            validation: self.validation.clone(),
            verbosity: self.verbosity,
        };

        if debug_messenger_enabled {
            let messenger_create_info = vk::DebugUtilsMessengerCreateInfoEXT::builder()
                .message_severity(
                    vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
                        | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                        | vk::DebugUtilsMessageSeverityFlagsEXT::INFO,
                )
                .message_type(
                    vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                        | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                        | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
                )
                .pfn_user_callback(Some(vulkan_debug_callback));
            instance.debug_messenger = Some(
                unsafe {
                    instance
                        .driver
                        .create_debug_utils_messenger(handle, &messenger_create_info)
                }
                .map_err(RenderError::InstanceCreation)?,
            );
        }

        Ok(instance)
    }
}

pub struct Instance {
    driver: Rc<dyn Driver>,
    handle: vk::Instance,
    debug_messenger: Option<vk::DebugUtilsMessengerEXT>,
    enabled_extensions: Vec<CString>,
    validation: ValidationPolicy,
    verbosity: Verbosity,
}

impl Instance {
    pub fn driver(&self) -> &Rc<dyn Driver> {
        &self.driver
    }

    pub fn handle(&self) -> vk::Instance {
        self.handle
    }

    pub fn enabled_extensions(&self) -> &[CString] {
        &self.enabled_extensions
    }

    pub fn validation(&self) -> &ValidationPolicy {
        &self.validation
    }

    pub fn validation_layer_enabled(&self) -> bool {
        self.validation.enabled
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }
}

impl Drop for Instance {
    fn drop(&mut self) {
        unsafe {
            if let Some(messenger) = self.debug_messenger.take() {
                self.driver
                    .destroy_debug_utils_messenger(self.handle, messenger);
            }
            self.driver.destroy_instance(self.handle);
        }
        info!("destroyed vulkan instance");
    }
}

unsafe extern "system" fn vulkan_debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _user_data: *mut std::os::raw::c_void,
) -> vk::Bool32 {
    let callback_data = *p_callback_data;
    let message_id_number = callback_data.message_id_number;

    let message_id_name = if callback_data.p_message_id_name.is_null() {
        Cow::from("")
    } else {
        CStr::from_ptr(callback_data.p_message_id_name).to_string_lossy()
    };

    let message = if callback_data.p_message.is_null() {
        Cow::from("")
    } else {
        CStr::from_ptr(callback_data.p_message).to_string_lossy()
    };

    match message_severity {
        vk::DebugUtilsMessageSeverityFlagsEXT::ERROR => {
            error!("{message_type:?} [{message_id_name} ({message_id_number})] : {message}")
        }
        vk::DebugUtilsMessageSeverityFlagsEXT::WARNING => {
            warn!("{message_type:?} [{message_id_name} ({message_id_number})] : {message}")
        }
        vk::DebugUtilsMessageSeverityFlagsEXT::INFO => {
            info!("{message_type:?} [{message_id_name} ({message_id_number})] : {message}")
        }
        _ => trace!("{message_type:?} [{message_id_name} ({message_id_number})] : {message}"),
    }

    vk::FALSE
}

fn vk_name(name: &str) -> RenderResult<CString> {
    CString::new(name).map_err(|_| {
        error!("name {name:?} contains a NUL byte");
        RenderError::InstanceCreation(vk::Result::ERROR_INITIALIZATION_FAILED)
    })
}
