use std::path::Path;

use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::manifest::PluginManifest;
use crate::plugin_system::source::LoaderRegistry;

/// Handle to an activated plugin, as held by the plugin registry.
pub trait Plugin: Send + Sync {
    /// The unique name of the plugin.
    fn name(&self) -> &str;

    /// The version of the plugin.
    fn version(&self) -> &str;

    /// Called once when the host shuts down. Errors are logged, not fatal.
    fn shutdown(&self) -> Result<(), PluginSystemError> {
        Ok(())
    }
}

/// Everything a plugin constructor gets to see during activation.
///
/// The `loaders` handle is how an activating plugin registers an additional
/// source loader; the engine detects the registration and re-scans with the
/// new loader while the current load call is still open.
pub struct PluginContext<'a> {
    /// The plugin's parsed manifest.
    pub manifest: &'a PluginManifest,
    /// Per-plugin data directory, created before construction.
    pub data_dir: &'a Path,
    /// Source path with the loader's access prefix applied.
    pub access_path: &'a str,
    /// The live source-loader registry.
    pub loaders: &'a mut LoaderRegistry,
}
