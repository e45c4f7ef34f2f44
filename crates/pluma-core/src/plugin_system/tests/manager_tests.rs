use std::fs;
use std::sync::Arc;

use tempfile::tempdir;

use crate::kernel::component::KernelComponent;
use crate::plugin_system::entry::StaticUnitRegistrar;
use crate::plugin_system::loader::PluginLoader;
use crate::plugin_system::manager::{DefaultPluginManager, PluginManager};
use crate::plugin_system::registry::PluginRegistry;
use crate::plugin_system::sources::FolderSource;
use crate::plugin_system::traits::Plugin;

struct TestPlugin {
    name: String,
}

impl Plugin for TestPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        "1.0.0"
    }
}

fn manager_with_one_plugin(base: &std::path::Path) -> DefaultPluginManager {
    let category = base.join("plugins");
    fs::create_dir_all(category.join("solo")).unwrap();
    fs::write(
        category.join("solo").join("plugin.yml"),
        "name: Solo\nversion: 1.0.0\nmain: unit.solo\n",
    )
    .unwrap();

    let data_root = base.join("plugin_data");
    let mut loader = PluginLoader::new(
        Box::new(PluginRegistry::new()),
        "0.1.0".parse().unwrap(),
    )
    .with_data_root(data_root.clone())
    .with_shuffle_seed(1);
    loader
        .loaders_mut()
        .register(Arc::new(FolderSource::new(Arc::new(StaticUnitRegistrar))));
    loader.entry_points_mut().register_constructor("unit.solo", |ctx| {
        Box::new(TestPlugin {
            name: ctx.manifest.name.clone(),
        })
    });

    DefaultPluginManager::new(loader, vec![category], data_root)
}

#[tokio::test]
async fn lifecycle_runs_a_load_pass() {
    let tmp = tempdir().unwrap();
    let manager = manager_with_one_plugin(tmp.path());

    assert!(manager.report().await.is_none());
    manager.initialize().await.unwrap();
    assert!(tmp.path().join("plugin_data").is_dir());

    manager.start().await.unwrap();
    let report = manager.report().await.unwrap();
    assert_eq!(report.loaded, vec!["Solo"]);
    assert_eq!(report.error_count, 0);

    manager.stop().await.unwrap();
}

#[tokio::test]
async fn load_all_reports_errors_without_failing() {
    let tmp = tempdir().unwrap();
    let manager = manager_with_one_plugin(tmp.path());
    // A second plugin with an unknown hard dependency.
    let broken = tmp.path().join("plugins").join("broken");
    fs::create_dir_all(&broken).unwrap();
    fs::write(
        broken.join("plugin.yml"),
        "name: Broken\nversion: 1.0.0\nmain: unit.broken\ndepend: [Nothing]\n",
    )
    .unwrap();

    manager.initialize().await.unwrap();
    let report = manager.load_all().await.unwrap();
    assert_eq!(report.loaded, vec!["Solo"]);
    assert_eq!(report.error_count, 1);
}

#[tokio::test]
async fn loader_handle_is_shared() {
    let tmp = tempdir().unwrap();
    let manager = manager_with_one_plugin(tmp.path());
    manager.initialize().await.unwrap();
    manager.start().await.unwrap();

    let loader = manager.loader();
    let loader = loader.lock().await;
    assert!(loader.plugin_map().get_plugin("Solo").is_some());
}
