use std::{
    ffi::CStr,
    fs,
    path::{Path, PathBuf},
    rc::Rc,
};

use ash::vk;

use super::Device;
use crate::{
    error::{RenderError, RenderResult},
    log_resource,
};

pub const SHADER_ENTRY_POINT: &CStr = unsafe { CStr::from_bytes_with_nul_unchecked(b"main\0") };

pub struct ShaderModule {
    handle: vk::ShaderModule,
    stage: vk::ShaderStageFlags,
    path: PathBuf,
    device: Rc<Device>,
}

impl ShaderModule {
    /// Reads a SPIR-V binary from `path` and hands it to the driver.
    ///
    /// Unreadable files, files whose length is not a whole number of 32-bit
    /// words and files without the SPIR-V magic number fail with
    /// [`RenderError::ShaderLoad`]; code the driver rejects fails with
    /// [`RenderError::ShaderCompile`].
    pub fn from_spv_path<P: AsRef<Path>>(
        device: Rc<Device>,
        path: P,
        stage: vk::ShaderStageFlags,
    ) -> RenderResult<Self> {
        let path = path.as_ref().to_path_buf();
        let load_error = |source: std::io::Error| RenderError::ShaderLoad {
            path: path.clone(),
            source,
        };
        let mut file = fs::File::open(&path).map_err(load_error)?;
        let code = ash::util::read_spv(&mut file).map_err(load_error)?;

        let create_info = vk::ShaderModuleCreateInfo::builder().code(&code);
        let handle = unsafe {
            device
                .driver()
                .create_shader_module(device.handle(), &create_info)
        }
        .map_err(|result| RenderError::ShaderCompile {
            path: path.clone(),
            result,
        })?;
        log_resource!(
            device.verbosity(),
            "created {stage:?} shader module {handle:?} from {}",
            path.display()
        );

        Ok(Self {
            handle,
            stage,
            path,
            device,
        })
    }

    pub fn handle(&self) -> vk::ShaderModule {
        self.handle
    }

    pub fn stage(&self) -> vk::ShaderStageFlags {
        self.stage
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn stage_create_info(&self) -> vk::PipelineShaderStageCreateInfo {
        vk::PipelineShaderStageCreateInfo::builder()
            .stage(self.stage)
            .module(self.handle)
            .name(SHADER_ENTRY_POINT)
            .build()
    }
}

impl Drop for ShaderModule {
    fn drop(&mut self) {
        log_resource!(self.device.verbosity(), "destroying shader module {:?}", self.handle);
        unsafe {
            self.device
                .driver()
                .destroy_shader_module(self.device.handle(), self.handle)
        };
    }
}

/// Shader modules of one pipeline, released newest first.
pub struct ShaderStages {
    modules: Vec<ShaderModule>,
}

impl ShaderStages {
    pub fn load<P: AsRef<Path>>(
        device: &Rc<Device>,
        stages: &[(P, vk::ShaderStageFlags)],
    ) -> RenderResult<Self> {
        let mut shader_stages = Self {
            modules: Vec::with_capacity(stages.len()),
        };
        for (path, stage) in stages {
            shader_stages
                .modules
                .push(ShaderModule::from_spv_path(device.clone(), path, *stage)?);
        }
        Ok(shader_stages)
    }

    pub fn modules(&self) -> &[ShaderModule] {
        &self.modules
    }

    pub fn stage_create_infos(&self) -> Vec<vk::PipelineShaderStageCreateInfo> {
        self.modules
            .iter()
            .map(ShaderModule::stage_create_info)
            .collect()
    }
}

impl Drop for ShaderStages {
    fn drop(&mut self) {
        while let Some(module) = self.modules.pop() {
            drop(module);
        }
    }
}
