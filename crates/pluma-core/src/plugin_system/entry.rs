use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::manifest::PluginManifest;
use crate::plugin_system::traits::{Plugin, PluginContext};

/// Constructor for a plugin instance, invoked once at activation.
pub type PluginCtor = Arc<dyn Fn(&mut PluginContext<'_>) -> Box<dyn Plugin> + Send + Sync>;

/// A compiled unit registered under an entry-point symbol.
#[derive(Clone)]
pub enum EntryUnit {
    /// A conforming plugin constructor.
    Constructor(PluginCtor),
    /// The symbol exists but is abstract and cannot be instantiated.
    Abstract,
    /// The symbol exists but does not conform to the plugin interface.
    Opaque,
}

impl std::fmt::Debug for EntryUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryUnit::Constructor(_) => write!(f, "EntryUnit::Constructor(..)"),
            EntryUnit::Abstract => write!(f, "EntryUnit::Abstract"),
            EntryUnit::Opaque => write!(f, "EntryUnit::Opaque"),
        }
    }
}

/// Maps entry-point symbols (a manifest's `main`) to compiled units.
///
/// Units come from two places: the host pre-registers statically linked
/// plugin constructors at startup, and source loaders register units during
/// activation through their [`UnitRegistrar`].
#[derive(Debug, Default)]
pub struct EntryPointRegistry {
    units: HashMap<String, EntryUnit>,
}

impl EntryPointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit under a symbol, replacing any previous registration.
    pub fn register(&mut self, symbol: &str, unit: EntryUnit) {
        self.units.insert(symbol.to_string(), unit);
    }

    /// Convenience for registering a conforming constructor.
    pub fn register_constructor<F>(&mut self, symbol: &str, ctor: F)
    where
        F: Fn(&mut PluginContext<'_>) -> Box<dyn Plugin> + Send + Sync + 'static,
    {
        self.register(symbol, EntryUnit::Constructor(Arc::new(ctor)));
    }

    pub fn resolve(&self, symbol: &str) -> Option<&EntryUnit> {
        self.units.get(symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.units.contains_key(symbol)
    }

    pub fn count(&self) -> usize {
        self.units.len()
    }
}

/// Host-supplied hook that makes a materialized source's compiled code
/// resolvable through the [`EntryPointRegistry`].
///
/// How code actually becomes executable is host-specific (static linking,
/// a scripting runtime, a JIT); the engine only requires that after
/// `register_units` returns Ok, the manifest's `main` symbol resolves.
pub trait UnitRegistrar: Send + Sync {
    fn register_units(
        &self,
        source: &Path,
        manifest: &PluginManifest,
        entries: &mut EntryPointRegistry,
    ) -> Result<(), PluginSystemError>;
}

/// Registrar for hosts that link all plugin code statically and pre-register
/// constructors at startup; materialization is a no-op.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticUnitRegistrar;

impl UnitRegistrar for StaticUnitRegistrar {
    fn register_units(
        &self,
        _source: &Path,
        _manifest: &PluginManifest,
        _entries: &mut EntryPointRegistry,
    ) -> Result<(), PluginSystemError> {
        Ok(())
    }
}
