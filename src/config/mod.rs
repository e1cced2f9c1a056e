pub mod toml_config;

pub use toml_config::FleetConfig;

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "fleet-registry")]
#[command(about = "Fleet vehicle registry: REST API and maintenance tools")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Serve the vehicle REST API
    Serve {
        /// Override server.bind
        #[arg(long)]
        bind: Option<String>,

        /// Override store.data_file
        #[arg(long)]
        data_file: Option<String>,
    },
    /// Populate the store with an admin user and sample vehicles
    Seed {
        /// Override store.data_file
        #[arg(long)]
        data_file: Option<String>,

        #[arg(long, default_value = crate::app::seed::DEFAULT_ADMIN_EMAIL)]
        admin_email: String,

        #[arg(long, default_value_t = crate::app::seed::DEFAULT_VEHICLE_COUNT)]
        count: usize,

        /// Keep existing records instead of clearing the store first
        #[arg(long)]
        keep_existing: bool,
    },
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// File settings (or defaults) with command line overrides applied.
    pub fn resolve(&self) -> crate::utils::error::Result<FleetConfig> {
        let mut config = match &self.config {
            Some(path) => FleetConfig::from_file(path)?,
            None => FleetConfig::default(),
        };

        match &self.command {
            Command::Serve { bind, data_file } => {
                if let Some(bind) = bind {
                    config.server.bind = bind.clone();
                }
                if let Some(data_file) = data_file {
                    config.store.data_file = data_file.clone();
                }
            }
            Command::Seed { data_file, .. } => {
                if let Some(data_file) = data_file {
                    config.store.data_file = data_file.clone();
                }
            }
        }
        Ok(config)
    }
}
