use std::ffi::{c_char, CStr, CString};

use log::{debug, info};

use crate::{
    driver::Driver,
    error::{RenderError, RenderResult},
};

pub const VALIDATION_LAYER_NAME: &CStr =
    unsafe { CStr::from_bytes_with_nul_unchecked(b"VK_LAYER_KHRONOS_validation\0") };

/// Whether debug layers are requested, and which ones.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationPolicy {
    pub enabled: bool,
    pub layers: Vec<CString>,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        if cfg!(feature = "vk_validation_layer") {
            Self::enabled()
        } else {
            Self::disabled()
        }
    }
}

impl ValidationPolicy {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            layers: vec![VALIDATION_LAYER_NAME.to_owned()],
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            layers: vec![],
        }
    }

    /// Fails with [`RenderError::UnsupportedLayer`] naming the first requested
    /// layer the loader does not report. A disabled policy always passes.
    pub fn check_support(&self, driver: &dyn Driver) -> RenderResult<()> {
        if !self.enabled {
            return Ok(());
        }

        let available = driver
            .enumerate_instance_layer_properties()
            .map_err(RenderError::Query)?;
        let available = available
            .iter()
            .map(|props| unsafe { CStr::from_ptr(props.layer_name.as_ptr()) })
            .collect::<Vec<_>>();
        debug!("available instance layers: {available:?}");

        match self
            .layers
            .iter()
            .find(|layer| !available.contains(&layer.as_c_str()))
        {
            Some(missing) => Err(RenderError::UnsupportedLayer(
                missing.to_string_lossy().into_owned(),
            )),
            None => {
                info!("enabling validation layers {:?}", self.layers);
                Ok(())
            }
        }
    }

    /// Layer names for `ppEnabledLayerNames`; empty while disabled.
    pub fn layer_name_ptrs(&self) -> Vec<*const c_char> {
        if self.enabled {
            self.layers.iter().map(|layer| layer.as_ptr()).collect()
        } else {
            vec![]
        }
    }
}
