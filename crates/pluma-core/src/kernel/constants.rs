/// Application name
pub const APP_NAME: &str = "Pluma";

/// Application version
pub const APP_VERSION: &str = "0.1.0";

/// Current host API version that plugin manifests are checked against
pub const API_VERSION: &str = "0.1.0";

/// Directory under the base path that category folders live in
pub const PLUGINS_DIR: &str = "plugins";

/// Shared per-plugin data directory (unless legacy data dirs are enabled)
pub const PLUGIN_DATA_DIR: &str = "plugin_data";

/// Graylist file name, relative to the base path
pub const GRAYLIST_FILE: &str = "plugin_list.yml";

/// Default engine configuration file name, relative to the base path
pub const CONFIG_FILE: &str = "pluma.yml";

/// Cache directory archive sources unpack into, relative to the base path
pub const SOURCE_CACHE_DIR: &str = "source_cache";
