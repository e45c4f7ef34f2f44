use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Pluma: a dependency-aware plugin engine host
#[derive(Parser, Debug)]
#[command(name = "pluma", author, version, about, long_about = None)]
pub struct CliArgs {
    /// Base directory holding plugins/, plugin_data/ and the config file
    #[arg(long, default_value = ".")]
    pub base_dir: PathBuf,

    /// Engine configuration file (defaults to <base-dir>/pluma.yml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a full plugin load pass, then shut down
    Run {
        /// Exit with a failure code if any plugin fails to load
        #[arg(long)]
        strict: bool,
    },
    /// Manage plugins
    Plugin {
        #[command(subcommand)]
        command: PluginCommand,
    },
    /// Write a default configuration file and exit
    InitConfig,
}

#[derive(Subcommand, Debug)]
pub enum PluginCommand {
    /// Run a load pass and list the plugins that loaded
    List,
}
