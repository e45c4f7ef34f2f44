use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, error, info, trace, warn};
use rand::seq::SliceRandom;
use rand::{rngs::StdRng, SeedableRng};

use crate::plugin_system::adapter::PluginMap;
use crate::plugin_system::entry::{EntryPointRegistry, EntryUnit};
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::graylist::PluginGraylist;
use crate::plugin_system::permissions::{Permission, PermissionRegistry};
use crate::plugin_system::source::{LoaderRegistry, SourceLoader};
use crate::plugin_system::traits::{Plugin, PluginContext};
use crate::plugin_system::triage::{LoadTriage, TriageEntry};
use crate::plugin_system::version::ApiVersion;

/// The dependency-aware loading engine.
///
/// A loader owns the source loader registry, the entry point registry,
/// the permission registry and a handle to the host's plugin map. One
/// call to [`load_plugins`](PluginLoader::load_plugins) scans the given
/// category directories, triages every candidate it finds and activates
/// them in dependency order until no candidate remains.
pub struct PluginLoader {
    loaders: LoaderRegistry,
    entry_points: EntryPointRegistry,
    permissions: PermissionRegistry,
    plugins: Box<dyn PluginMap + Send>,
    graylist: Option<PluginGraylist>,
    data_root: Option<PathBuf>,
    legacy_data_dir: bool,
    api_version: ApiVersion,
    shuffle_seed: Option<u64>,
    pub(crate) load_in_progress: bool,
}

impl PluginLoader {
    pub fn new(plugins: Box<dyn PluginMap + Send>, api_version: ApiVersion) -> Self {
        PluginLoader {
            loaders: LoaderRegistry::new(),
            entry_points: EntryPointRegistry::new(),
            permissions: PermissionRegistry::new(),
            plugins,
            graylist: None,
            data_root: None,
            legacy_data_dir: false,
            api_version,
            shuffle_seed: None,
            load_in_progress: false,
        }
    }

    pub fn with_graylist(mut self, graylist: PluginGraylist) -> Self {
        self.graylist = Some(graylist);
        self
    }

    pub fn set_graylist(&mut self, graylist: PluginGraylist) {
        self.graylist = Some(graylist);
    }

    pub fn with_data_root(mut self, data_root: PathBuf) -> Self {
        self.data_root = Some(data_root);
        self
    }

    pub fn with_shuffle_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    /// Place each plugin's data directory next to its source instead of
    /// under the shared data root.
    pub fn with_legacy_data_dir(mut self, legacy: bool) -> Self {
        self.legacy_data_dir = legacy;
        self
    }

    pub fn loaders(&self) -> &LoaderRegistry {
        &self.loaders
    }

    pub fn loaders_mut(&mut self) -> &mut LoaderRegistry {
        &mut self.loaders
    }

    pub fn entry_points_mut(&mut self) -> &mut EntryPointRegistry {
        &mut self.entry_points
    }

    pub fn permissions(&self) -> &PermissionRegistry {
        &self.permissions
    }

    pub fn plugin_map(&self) -> &dyn PluginMap {
        self.plugins.as_ref()
    }

    /// Invoke `shutdown` on every plugin in the map. Failures are logged
    /// and do not stop the remaining plugins from shutting down.
    pub fn shutdown_plugins(&mut self) {
        for name in self.plugins.list_plugins() {
            if let Some(plugin) = self.plugins.get_plugin(&name) {
                if let Err(e) = plugin.shutdown() {
                    warn!("Plugin '{}' failed to shut down cleanly: {}", name, e);
                }
            }
        }
    }

    /// Scan `category_paths` and load every eligible plugin, activating in
    /// dependency order. Per-plugin failures are logged and counted into
    /// `load_error_count`; only conditions that invalidate the whole pass
    /// (such as a reentrant call) return `Err`. Returns handles for the
    /// plugins activated by this call, in activation order.
    pub fn load_plugins(
        &mut self,
        category_paths: &[PathBuf],
        load_error_count: &mut usize,
    ) -> Result<Vec<Arc<dyn Plugin>>, PluginSystemError> {
        if self.load_in_progress {
            return Err(PluginSystemError::ReentrantLoad);
        }
        self.load_in_progress = true;
        let result = self.load_plugins_inner(category_paths, load_error_count);
        self.load_in_progress = false;
        result
    }

    fn load_plugins_inner(
        &mut self,
        category_paths: &[PathBuf],
        load_error_count: &mut usize,
    ) -> Result<Vec<Arc<dyn Plugin>>, PluginSystemError> {
        let mut triage = LoadTriage::new();
        self.triage_plugins(category_paths, &mut triage, load_error_count, None);

        let mut loaded: Vec<Arc<dyn Plugin>> = Vec::new();

        while !triage.is_empty() {
            let mut loaded_this_round = 0usize;

            for name in triage.queue() {
                if !triage.contains(&name) {
                    continue;
                }
                self.settle_deps(&mut triage, &name);

                if triage.hard_satisfied(&name) && triage.soft_satisfied(&name) {
                    let entry = triage
                        .remove(&name)
                        .ok_or_else(|| PluginSystemError::Internal(format!(
                            "triage entry for '{name}' vanished mid-round"
                        )))?;
                    loaded_this_round += 1;

                    let loaders_before = self.loaders.ids();
                    match self.load_candidate(&entry) {
                        Ok(plugin) => {
                            loaded.push(plugin);

                            let new_ids: Vec<&'static str> = self
                                .loaders
                                .ids()
                                .into_iter()
                                .filter(|id| !loaders_before.contains(id))
                                .collect();
                            if !new_ids.is_empty() {
                                debug!(
                                    "Plugin '{}' registered new source loaders {:?}, rescanning",
                                    name, new_ids
                                );
                                self.triage_plugins(
                                    category_paths,
                                    &mut triage,
                                    load_error_count,
                                    Some(&new_ids),
                                );
                            }
                        }
                        Err(e) => {
                            error!("Could not load plugin '{}': {}", name, e);
                            *load_error_count += 1;
                        }
                    }
                }
            }

            if loaded_this_round == 0 {
                // Stalled. First see if any candidate is only waiting on
                // soft dependencies that can never appear; dropping one such
                // set unblocks a candidate, so go straight into a new round.
                let mut unblocked = false;
                'stall: for name in triage.queue() {
                    if triage.hard_satisfied(&name) && !triage.soft_satisfied(&name) {
                        let missing: Vec<String> = triage
                            .soft_deps(&name)
                            .map(|set| {
                                set.iter()
                                    .filter(|dep| {
                                        self.plugins.get_plugin(dep).is_none()
                                            && !triage.contains(dep)
                                    })
                                    .cloned()
                                    .collect()
                            })
                            .unwrap_or_default();
                        for dep in &missing {
                            debug!(
                                "Skipping resolution of missing soft dependency '{}' for plugin '{}'",
                                dep, name
                            );
                            triage.satisfy_soft(&name, dep);
                        }
                        if triage.soft_satisfied(&name) {
                            unblocked = true;
                            break 'stall;
                        }
                    }
                }
                if unblocked {
                    continue;
                }

                // Report candidates blocked on dependencies nobody will ever
                // provide, then write the rest off as circular.
                for name in triage.queue() {
                    if let Some(deps) = triage.hard_deps(&name) {
                        let unknown: Vec<String> = deps
                            .iter()
                            .filter(|dep| {
                                self.plugins.get_plugin(dep).is_none() && !triage.contains(dep)
                            })
                            .cloned()
                            .collect();
                        if !unknown.is_empty() {
                            let mut unknown = unknown;
                            unknown.sort();
                            let err = PluginSystemError::UnknownDependency {
                                name: name.clone(),
                                missing: unknown.join(", "),
                            };
                            error!("Could not load plugin '{}': {}", name, err);
                            triage.remove(&name);
                            *load_error_count += 1;
                        }
                    }
                }

                for name in triage.queue() {
                    let err = PluginSystemError::CircularDependency { name: name.clone() };
                    error!("{}", err);
                    *load_error_count += 1;
                    triage.remove(&name);
                }
                break;
            }
        }

        Ok(loaded)
    }

    /// Drop from the candidate's dependency sets every name that is already
    /// present in the plugin map, whether activated by this pass or earlier.
    fn settle_deps(&self, triage: &mut LoadTriage, name: &str) {
        let satisfied = |dep: &str| self.plugins.get_plugin(dep).is_some();

        let hard: Vec<String> = triage
            .hard_deps(name)
            .map(|set| set.iter().filter(|d| satisfied(d)).cloned().collect())
            .unwrap_or_default();
        for dep in hard {
            triage.satisfy_hard(name, &dep);
        }

        let soft: Vec<String> = triage
            .soft_deps(name)
            .map(|set| set.iter().filter(|d| satisfied(d)).cloned().collect())
            .unwrap_or_default();
        for dep in soft {
            triage.satisfy_soft(name, &dep);
        }
    }

    /// Scan the category directories and queue every eligible candidate.
    /// When `only_loaders` is given, sources are matched against those
    /// loader ids exclusively; used after a plugin registers new loaders.
    fn triage_plugins(
        &mut self,
        category_paths: &[PathBuf],
        triage: &mut LoadTriage,
        load_error_count: &mut usize,
        only_loaders: Option<&[&'static str]>,
    ) {
        let mut rng = match self.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        for category in category_paths {
            let mut entries = match self.list_sources(category) {
                Ok(entries) => entries,
                Err(e) => {
                    error!("Failed to scan plugin directory '{}': {}", category.display(), e);
                    *load_error_count += 1;
                    continue;
                }
            };
            entries.shuffle(&mut rng);

            for path in entries {
                // Every loader gets a look at every entry; two loaders
                // claiming the same path surface as a duplicate plugin.
                let claimants: Vec<Arc<dyn SourceLoader>> = self
                    .loaders
                    .iter()
                    .filter(|l| {
                        only_loaders.is_none_or(|ids| ids.contains(&l.id())) && l.can_handle(&path)
                    })
                    .cloned()
                    .collect();

                for loader in claimants {
                    let manifest = match loader.describe(&path, self.plugins.as_ref()) {
                        Ok(Some(manifest)) => manifest,
                        Ok(None) => continue,
                        Err(e) => {
                            error!("Could not load plugin from '{}': {}", path.display(), e);
                            *load_error_count += 1;
                            continue;
                        }
                    };
                    let name = manifest.name.clone();

                    if let Some(graylist) = &self.graylist {
                        if !graylist.is_allowed(&name) {
                            info!(
                                "Skipping plugin '{}': disallowed by the plugin list policy",
                                name
                            );
                            continue;
                        }
                    }

                    if let Some(required) = manifest.api_incompatibility(&self.api_version) {
                        let err = PluginSystemError::ApiIncompatible {
                            name: name.clone(),
                            host_api: self.api_version.to_string(),
                            required,
                        };
                        error!("Could not load plugin '{}': {}", name, err);
                        *load_error_count += 1;
                        continue;
                    }

                    if triage.contains(&name) || self.plugins.get_plugin(&name).is_some() {
                        let err = PluginSystemError::DuplicatePlugin { name: name.clone() };
                        error!("{}", err);
                        *load_error_count += 1;
                        continue;
                    }

                    if name.contains(' ') {
                        warn!("Plugin '{}' uses spaces in its name, this is discouraged", name);
                    }

                    trace!("Triaged plugin '{}' from '{}'", name, path.display());
                    let loadbefore = manifest.loadbefore.clone();
                    triage.insert(TriageEntry {
                        path: path.clone(),
                        loader,
                        manifest,
                    });
                    // load-before targets acquire a soft dependency on this
                    // plugin, whether or not they have been triaged yet.
                    for target in &loadbefore {
                        triage.add_soft(target, &name);
                    }
                }
            }
        }
    }

    fn list_sources(&self, category: &Path) -> Result<Vec<PathBuf>, PluginSystemError> {
        // A category path that is itself a file is scanned as a
        // single-candidate list.
        if category.is_file() {
            return Ok(vec![category.to_path_buf()]);
        }
        // A missing category is not an error; rescans walk the same
        // category list and would otherwise recount it every pass.
        if !category.is_dir() {
            return Ok(Vec::new());
        }
        let read_dir = fs::read_dir(category)
            .map_err(|e| PluginSystemError::io(e, "read_dir", category.to_path_buf()))?;
        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in read_dir {
            let entry =
                entry.map_err(|e| PluginSystemError::io(e, "read_dir", category.to_path_buf()))?;
            paths.push(entry.path());
        }
        // Sorted first so the seeded shuffle is the only source of variance.
        paths.sort();
        Ok(paths)
    }

    /// Run the activation sequence for a ready candidate.
    fn load_candidate(&mut self, entry: &TriageEntry) -> Result<Arc<dyn Plugin>, PluginSystemError> {
        let manifest = &entry.manifest;
        info!("Loading plugin '{}'", manifest.full_name());

        // Without a shared data root (or in legacy mode) the data directory
        // sits next to the plugin's source.
        let data_dir = match (&self.data_root, self.legacy_data_dir) {
            (Some(root), false) => root.join(&manifest.name),
            _ => entry
                .path
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(&manifest.name),
        };
        if data_dir.exists() && !data_dir.is_dir() {
            return Err(PluginSystemError::DataFolderConflict {
                name: manifest.name.clone(),
                path: data_dir,
            });
        }
        fs::create_dir_all(&data_dir)
            .map_err(|e| PluginSystemError::io(e, "create_data_dir", data_dir.clone()))?;

        entry.loader.activate(&entry.path, &mut self.entry_points)?;

        let ctor = match self.entry_points.resolve(&manifest.main) {
            Some(EntryUnit::Constructor(ctor)) => Arc::clone(ctor),
            Some(EntryUnit::Abstract) => {
                return Err(PluginSystemError::MainEntryNotInstantiable {
                    name: manifest.name.clone(),
                    main: manifest.main.clone(),
                });
            }
            Some(EntryUnit::Opaque) => {
                return Err(PluginSystemError::MainEntryWrongType {
                    name: manifest.name.clone(),
                    main: manifest.main.clone(),
                });
            }
            None => {
                return Err(PluginSystemError::MainEntryNotFound {
                    name: manifest.name.clone(),
                    main: manifest.main.clone(),
                });
            }
        };

        // Every declared permission is checked before any is registered;
        // a colliding plugin registers nothing, while earlier plugins'
        // permissions stay in place.
        for (_, perm_name) in manifest.permissions.iter() {
            if self.permissions.contains(perm_name) {
                return Err(PluginSystemError::DuplicatePermission {
                    name: manifest.name.clone(),
                    permission: perm_name.to_string(),
                });
            }
        }
        for (default, perm_name) in manifest.permissions.iter() {
            self.permissions.register(Permission {
                name: perm_name.to_string(),
                default,
            })?;
        }

        let access_path = format!(
            "{}{}",
            entry.loader.access_prefix(),
            entry.path.display()
        );
        let mut ctx = PluginContext {
            manifest,
            data_dir: &data_dir,
            access_path: &access_path,
            loaders: &mut self.loaders,
        };
        let plugin: Arc<dyn Plugin> = Arc::from(ctor(&mut ctx));

        self.plugins.set_plugin(&manifest.name, Arc::clone(&plugin));
        Ok(plugin)
    }
}
