use std::fs;
use std::sync::Arc;

use tempfile::tempdir;

use crate::kernel::bootstrap::Application;
use crate::plugin_system::entry::StaticUnitRegistrar;
use crate::plugin_system::manager::PluginManager;
use crate::storage::config::EngineConfig;

fn config_with_categories(names: &[&str]) -> EngineConfig {
    EngineConfig {
        categories: names.iter().map(|n| n.to_string()).collect(),
        shuffle_seed: Some(1),
        ..EngineConfig::default()
    }
}

#[tokio::test]
async fn bootstrap_creates_directory_layout() {
    let tmp = tempdir().unwrap();
    let base = tmp.path().join("engine");
    let app = Application::new(
        base.clone(),
        config_with_categories(&["tools", "game"]),
        Arc::new(StaticUnitRegistrar),
    )
    .unwrap();

    assert!(base.join("plugins").join("tools").is_dir());
    assert!(base.join("plugins").join("game").is_dir());
    assert!(base.join("plugin_list.yml").is_file());
    assert_eq!(app.base_dir(), base.as_path());
}

#[tokio::test]
async fn empty_category_list_scans_the_plugins_dir_itself() {
    let tmp = tempdir().unwrap();
    let app = Application::new(
        tmp.path().to_path_buf(),
        config_with_categories(&[]),
        Arc::new(StaticUnitRegistrar),
    )
    .unwrap();

    let error_count = app.run().await.unwrap();
    assert_eq!(error_count, 0);
    let report = app.plugin_manager().report().await.unwrap();
    assert!(report.loaded.is_empty());
    app.shutdown().await.unwrap();
}

#[test]
fn invalid_category_name_is_rejected() {
    let tmp = tempdir().unwrap();
    let result = Application::new(
        tmp.path().to_path_buf(),
        config_with_categories(&["../escape"]),
        Arc::new(StaticUnitRegistrar),
    );
    assert!(result.is_err());
}

#[test]
fn category_that_is_a_plugin_folder_is_rejected() {
    let tmp = tempdir().unwrap();
    let category = tmp.path().join("plugins").join("oops");
    fs::create_dir_all(&category).unwrap();
    fs::write(
        category.join("plugin.yml"),
        "name: Oops\nversion: 1.0.0\nmain: unit.oops\n",
    )
    .unwrap();

    let result = Application::new(
        tmp.path().to_path_buf(),
        config_with_categories(&["oops"]),
        Arc::new(StaticUnitRegistrar),
    );
    assert!(result.is_err());
}

#[test]
fn corrupt_graylist_is_fatal() {
    let tmp = tempdir().unwrap();
    fs::write(tmp.path().join("plugin_list.yml"), "mode: sideways\n").unwrap();

    let result = Application::new(
        tmp.path().to_path_buf(),
        config_with_categories(&[]),
        Arc::new(StaticUnitRegistrar),
    );
    assert!(result.is_err());
}
