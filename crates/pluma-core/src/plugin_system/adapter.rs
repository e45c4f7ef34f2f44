use std::sync::Arc;

use crate::plugin_system::traits::Plugin;

/// Narrow capability surface over the host's live plugin map.
///
/// The engine and the source loaders consult the map exclusively through
/// this trait; the engine only ever adds entries, never removes them.
/// Hosts with their own plugin bookkeeping implement this instead of
/// exposing internal state.
pub trait PluginMap: Send {
    /// Look up an activated plugin by name.
    fn get_plugin(&self, name: &str) -> Option<Arc<dyn Plugin>>;

    /// Insert (or replace) an activated plugin handle under `name`.
    fn set_plugin(&mut self, name: &str, handle: Arc<dyn Plugin>);

    /// Names of all activated plugins.
    fn list_plugins(&self) -> Vec<String>;
}
