mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use log::error;

use pluma_core::kernel::bootstrap::Application;
use pluma_core::kernel::constants::CONFIG_FILE;
use pluma_core::kernel::error::Result;
use pluma_core::plugin_system::entry::StaticUnitRegistrar;
use pluma_core::plugin_system::manager::PluginManager;
use pluma_core::storage::config::EngineConfig;

use cli::{CliArgs, Commands, PluginCommand};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = CliArgs::parse();

    match execute(args).await {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn execute(args: CliArgs) -> Result<ExitCode> {
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| args.base_dir.join(CONFIG_FILE));

    match args.command {
        Commands::InitConfig => {
            EngineConfig::default().save(&config_path)?;
            println!("Wrote default configuration to {}", config_path.display());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Run { strict } => {
            let config = EngineConfig::load_or_default(&config_path)?;
            let app = Application::new(args.base_dir, config, Arc::new(StaticUnitRegistrar))?;
            let error_count = app.run().await?;
            let report = app.plugin_manager().report().await.unwrap_or_default();
            println!(
                "Loaded {} plugin(s), {} error(s)",
                report.loaded.len(),
                error_count
            );
            app.shutdown().await?;
            if strict && error_count > 0 {
                return Ok(ExitCode::FAILURE);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Plugin {
            command: PluginCommand::List,
        } => {
            let config = EngineConfig::load_or_default(&config_path)?;
            let app = Application::new(args.base_dir, config, Arc::new(StaticUnitRegistrar))?;
            app.run().await?;
            let report = app.plugin_manager().report().await.unwrap_or_default();
            if report.loaded.is_empty() {
                println!("No plugins loaded.");
            } else {
                for name in &report.loaded {
                    println!("{}", name);
                }
            }
            app.shutdown().await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
