use std::collections::HashMap;
use std::sync::Arc;

use crate::plugin_system::adapter::PluginMap;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::traits::Plugin;

/// Canonical map of activated-plugin-name to plugin handle.
///
/// Process-scoped: outlives individual load calls, and may be pre-populated
/// by the host before the engine runs. The engine only adds to it.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: HashMap<String, Arc<dyn Plugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin handle. Fails if the name is already taken.
    pub fn register_plugin(&mut self, plugin: Arc<dyn Plugin>) -> Result<(), PluginSystemError> {
        let name = plugin.name().to_string();
        if self.plugins.contains_key(&name) {
            return Err(PluginSystemError::DuplicatePlugin { name });
        }
        self.plugins.insert(name, plugin);
        Ok(())
    }

    /// Check if a plugin is registered by name.
    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    /// Iterator over registered names and handles.
    pub fn iter_plugins(&self) -> impl Iterator<Item = (&String, &Arc<dyn Plugin>)> {
        self.plugins.iter()
    }

    /// Call `shutdown` on every registered plugin, logging failures.
    pub fn shutdown_all(&self) {
        for (name, plugin) in &self.plugins {
            if let Err(e) = plugin.shutdown() {
                log::error!("Error shutting down plugin '{}': {}", name, e);
            }
        }
    }
}

impl PluginMap for PluginRegistry {
    fn get_plugin(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.plugins.get(name).cloned()
    }

    fn set_plugin(&mut self, name: &str, handle: Arc<dyn Plugin>) {
        self.plugins.insert(name.to_string(), handle);
    }

    fn list_plugins(&self) -> Vec<String> {
        self.plugins.keys().cloned().collect()
    }
}
