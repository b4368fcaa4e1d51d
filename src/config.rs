use std::path::PathBuf;

use crate::vulkan_objects::ValidationPolicy;

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;

pub const DEFAULT_VERTEX_SHADER_PATH: &str = "shaders/vert.spv";
pub const DEFAULT_FRAGMENT_SHADER_PATH: &str = "shaders/frag.spv";

/// Which verbose log lines are emitted during bring-up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Verbosity {
    pub extensions: bool,
    pub queues: bool,
    pub resources: bool,
}

impl Verbosity {
    pub const QUIET: Self = Self {
        extensions: false,
        queues: false,
        resources: false,
    };

    pub const FROM_FEATURES: Self = Self {
        extensions: cfg!(feature = "show_extensions"),
        queues: cfg!(feature = "show_queues"),
        resources: cfg!(feature = "show_resource_allocation"),
    };
}

impl Default for Verbosity {
    fn default() -> Self {
        Self::FROM_FEATURES
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub app_name: String,
    pub width: u32,
    pub height: u32,
    pub validation: ValidationPolicy,
    pub vertex_shader: PathBuf,
    pub fragment_shader: PathBuf,
    pub verbosity: Verbosity,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: "Vulkan".to_string(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            validation: ValidationPolicy::default(),
            vertex_shader: PathBuf::from(DEFAULT_VERTEX_SHADER_PATH),
            fragment_shader: PathBuf::from(DEFAULT_FRAGMENT_SHADER_PATH),
            verbosity: Verbosity::default(),
        }
    }
}

impl AppConfig {
    pub fn with_app_name(mut self, name: &str) -> Self {
        self.app_name = name.to_string();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_validation(mut self, validation: ValidationPolicy) -> Self {
        self.validation = validation;
        self
    }

    pub fn with_shaders<P: Into<PathBuf>>(mut self, vertex: P, fragment: P) -> Self {
        self.vertex_shader = vertex.into();
        self.fragment_shader = fragment.into();
        self
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }
}
