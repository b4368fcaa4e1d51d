mod fixed_stuff;
pub use fixed_stuff::{Lifecycle, LifecycleState, Valium};

mod window_app;
pub use window_app::Window;

mod pipeline;
pub use pipeline::{FixedPipelineBuilder, GraphicsPipeline, PipelineBuilder, PipelineLayout};
