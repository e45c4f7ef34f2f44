//! Application bootstrap: wires configuration, the graylist, the source
//! loaders and the plugin manager into a runnable kernel.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info, warn};

use crate::kernel::component::ComponentRegistry;
use crate::kernel::constants::{
    APP_NAME, APP_VERSION, API_VERSION, GRAYLIST_FILE, PLUGINS_DIR, PLUGIN_DATA_DIR,
    SOURCE_CACHE_DIR,
};
use crate::kernel::error::{Error, KernelLifecyclePhase, Result};
use crate::plugin_system::entry::UnitRegistrar;
use crate::plugin_system::graylist::PluginGraylist;
use crate::plugin_system::loader::PluginLoader;
use crate::plugin_system::manager::{DefaultPluginManager, PluginManager};
use crate::plugin_system::registry::PluginRegistry;
use crate::plugin_system::sources::{BundleSource, FolderSource, PackedSource};
use crate::plugin_system::version::ApiVersion;
use crate::storage::config::EngineConfig;
use crate::utils::validate_category_name;

/// A fully wired application instance.
///
/// `new` builds everything but touches plugins only through configuration;
/// `run` drives the component lifecycle (which performs the actual load
/// pass); `shutdown` stops components in reverse registration order.
pub struct Application {
    base_dir: PathBuf,
    components: ComponentRegistry,
    plugin_manager: Arc<DefaultPluginManager>,
}

impl Application {
    pub fn new(
        base_dir: PathBuf,
        config: EngineConfig,
        registrar: Arc<dyn UnitRegistrar>,
    ) -> Result<Self> {
        info!("{} v{} bootstrapping in '{}'", APP_NAME, APP_VERSION, base_dir.display());

        fs::create_dir_all(&base_dir).map_err(|e| {
            Error::lifecycle(
                KernelLifecyclePhase::Bootstrap,
                None,
                format!("Failed to create base directory '{}': {}", base_dir.display(), e),
            )
        })?;

        let category_paths = Self::prepare_categories(&base_dir, &config)?;

        // A graylist that fails to parse is fatal: load policy cannot be
        // guessed at.
        let graylist = PluginGraylist::load_or_seed(&base_dir.join(GRAYLIST_FILE))?;
        if graylist.is_whitelist() {
            debug!("Plugin graylist is in whitelist mode");
        }

        let api_version: ApiVersion = API_VERSION.parse().map_err(|e| {
            Error::lifecycle(
                KernelLifecyclePhase::Bootstrap,
                None,
                format!("Invalid engine API version constant: {}", e),
            )
        })?;

        let data_root = base_dir.join(PLUGIN_DATA_DIR);
        let mut loader = PluginLoader::new(Box::new(PluginRegistry::new()), api_version)
            .with_graylist(graylist)
            .with_data_root(data_root.clone())
            .with_legacy_data_dir(config.legacy_data_dir);
        if let Some(seed) = config.shuffle_seed {
            loader = loader.with_shuffle_seed(seed);
        }

        let cache_dir = base_dir.join(SOURCE_CACHE_DIR);
        loader
            .loaders_mut()
            .register(Arc::new(BundleSource::new(Arc::clone(&registrar), cache_dir.clone())));
        if config.loaders.folder {
            loader
                .loaders_mut()
                .register(Arc::new(FolderSource::new(Arc::clone(&registrar))));
        }
        if config.loaders.packed {
            loader
                .loaders_mut()
                .register(Arc::new(PackedSource::new(registrar, cache_dir)));
        }

        let plugin_manager = Arc::new(DefaultPluginManager::new(
            loader,
            category_paths,
            data_root,
        ));

        let mut components = ComponentRegistry::new();
        components.register_instance(Arc::clone(&plugin_manager));

        Ok(Application {
            base_dir,
            components,
            plugin_manager,
        })
    }

    /// Validate category names and make sure their directories exist.
    /// An empty category list means the plugins directory itself is the one
    /// category.
    fn prepare_categories(base_dir: &Path, config: &EngineConfig) -> Result<Vec<PathBuf>> {
        let plugins_dir = base_dir.join(PLUGINS_DIR);
        fs::create_dir_all(&plugins_dir).map_err(|e| {
            Error::lifecycle(
                KernelLifecyclePhase::Bootstrap,
                None,
                format!(
                    "Failed to create plugins directory '{}': {}",
                    plugins_dir.display(),
                    e
                ),
            )
        })?;

        if config.categories.is_empty() {
            return Ok(vec![plugins_dir]);
        }

        let mut paths = Vec::with_capacity(config.categories.len());
        for name in &config.categories {
            if !validate_category_name(name) {
                return Err(Error::lifecycle(
                    KernelLifecyclePhase::Bootstrap,
                    None,
                    format!("Invalid plugin category name '{}'", name),
                ));
            }
            let path = plugins_dir.join(name);
            // A category that is itself a plugin folder would make the
            // scanner miss it entirely; refuse outright.
            if path.join("plugin.yml").is_file() {
                return Err(Error::lifecycle(
                    KernelLifecyclePhase::Bootstrap,
                    None,
                    format!("Plugin category '{}' points at a plugin folder", name),
                ));
            }
            fs::create_dir_all(&path).map_err(|e| {
                Error::lifecycle(
                    KernelLifecyclePhase::Bootstrap,
                    None,
                    format!("Failed to create category directory '{}': {}", path.display(), e),
                )
            })?;
            paths.push(path);
        }
        Ok(paths)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn plugin_manager(&self) -> Arc<DefaultPluginManager> {
        Arc::clone(&self.plugin_manager)
    }

    /// Initialize and start all components, then report the load outcome.
    /// Plugin load errors do not abort startup, but they are surfaced in
    /// the return value so a host can decide to bail.
    pub async fn run(&self) -> Result<usize> {
        for component in self.components.in_order() {
            debug!("Initializing component '{}'", component.name());
            component.initialize().await?;
        }
        for component in self.components.in_order() {
            debug!("Starting component '{}'", component.name());
            component.start().await?;
        }

        let error_count = self
            .plugin_manager
            .report()
            .await
            .map(|r| r.error_count)
            .unwrap_or(0);
        if error_count > 0 {
            warn!("{} plugin(s) failed to load", error_count);
        }
        Ok(error_count)
    }

    /// Stop all components in reverse registration order.
    pub async fn shutdown(&self) -> Result<()> {
        for component in self.components.in_order().into_iter().rev() {
            debug!("Stopping component '{}'", component.name());
            if let Err(e) = component.stop().await {
                warn!("Component '{}' failed to stop cleanly: {}", component.name(), e);
            }
        }
        Ok(())
    }
}
