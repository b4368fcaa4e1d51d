pub mod app;
pub mod config;
pub mod driver;
pub mod error;
pub mod queue_family;
pub mod vulkan_objects;

#[doc(hidden)]
pub use log;

/// Logs a GPU object create/destroy when resource logging is switched on.
#[macro_export]
macro_rules! log_resource {
    ($verbosity:expr, $($arg:tt)+) => {
        if $verbosity.resources {
            $crate::log::debug!(target: "valium::resources", $($arg)+);
        }
    };
}
