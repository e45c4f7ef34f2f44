pub mod kernel;
pub mod plugin_system;
pub mod storage;
pub mod utils;

// Re-export key public types for easier use by the binary and embedding hosts.
pub use kernel::bootstrap::Application;
pub use kernel::error::Error as KernelError;
pub use plugin_system::{Plugin, PluginManifest, PluginManager};
pub use storage::config::EngineConfig;
