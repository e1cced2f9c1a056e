use clap::Parser;
use fleet_registry::app::{self, SeedOptions};
use fleet_registry::utils::{logger, validation::Validate};
use fleet_registry::{CliConfig, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    logger::init_logger(cli.verbose, config.log_format());
    if cli.verbose {
        tracing::debug!("Resolved config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    match cli.command {
        Command::Serve { .. } => app::serve(&config).await,
        Command::Seed {
            admin_email,
            count,
            keep_existing,
            ..
        } => {
            let store = app::open_store(&config).await?;
            let options = SeedOptions {
                admin_email,
                count,
                keep_existing,
            };
            let summary = app::seed_store(store.as_ref(), &options).await?;
            store.close().await?;

            println!("✨ Seed completed");
            println!("   - Admin: {}", summary.admin_email);
            println!("   - Vehicles created: {}", summary.vehicles_created);
            println!("   - Vehicles total: {}", summary.total_vehicles);
            Ok(())
        }
    }
}
