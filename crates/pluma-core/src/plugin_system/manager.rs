use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use log::info;
use tokio::sync::Mutex;

use crate::kernel::component::KernelComponent;
use crate::kernel::error::{Error, KernelLifecyclePhase, Result};
use crate::plugin_system::loader::PluginLoader;

/// Outcome of one full load pass.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Names of the plugins activated by the pass, in activation order.
    pub loaded: Vec<String>,
    /// Number of candidates that failed to load.
    pub error_count: usize,
}

/// Kernel-facing contract of the plugin engine component.
#[async_trait]
pub trait PluginManager: KernelComponent {
    /// Run a full scan-and-load pass over the configured categories.
    async fn load_all(&self) -> Result<LoadReport>;

    /// Report of the most recent load pass, if one has run.
    async fn report(&self) -> Option<LoadReport>;
}

/// Default [`PluginManager`] implementation wrapping a [`PluginLoader`]
/// behind an async mutex so the kernel lifecycle and host queries can share
/// it.
pub struct DefaultPluginManager {
    loader: Arc<Mutex<PluginLoader>>,
    categories: Vec<PathBuf>,
    data_root: PathBuf,
    report: Mutex<Option<LoadReport>>,
}

impl DefaultPluginManager {
    pub fn new(loader: PluginLoader, categories: Vec<PathBuf>, data_root: PathBuf) -> Self {
        DefaultPluginManager {
            loader: Arc::new(Mutex::new(loader)),
            categories,
            data_root,
            report: Mutex::new(None),
        }
    }

    /// Shared handle to the underlying loader, for hosts that need to query
    /// permissions or the plugin map after startup.
    pub fn loader(&self) -> Arc<Mutex<PluginLoader>> {
        Arc::clone(&self.loader)
    }

    pub fn categories(&self) -> &[PathBuf] {
        &self.categories
    }
}

impl fmt::Debug for DefaultPluginManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultPluginManager")
            .field("categories", &self.categories)
            .field("data_root", &self.data_root)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl KernelComponent for DefaultPluginManager {
    fn name(&self) -> &'static str {
        "PluginManager"
    }

    async fn initialize(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.data_root)
            .await
            .map_err(|e| {
                Error::lifecycle(
                    KernelLifecyclePhase::Initialize,
                    Some(self.name()),
                    format!(
                        "Failed to create plugin data root '{}': {}",
                        self.data_root.display(),
                        e
                    ),
                )
            })?;
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        let report = self.load_all().await?;
        info!(
            "Plugin load pass complete: {} loaded, {} errors",
            report.loaded.len(),
            report.error_count
        );
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.loader.lock().await.shutdown_plugins();
        Ok(())
    }
}

#[async_trait]
impl PluginManager for DefaultPluginManager {
    async fn load_all(&self) -> Result<LoadReport> {
        let mut loader = self.loader.lock().await;
        let mut error_count = 0usize;
        let plugins = loader.load_plugins(&self.categories, &mut error_count)?;
        let report = LoadReport {
            loaded: plugins.iter().map(|p| p.name().to_string()).collect(),
            error_count,
        };
        *self.report.lock().await = Some(report.clone());
        Ok(report)
    }

    async fn report(&self) -> Option<LoadReport> {
        self.report.lock().await.clone()
    }
}
