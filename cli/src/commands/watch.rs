use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use config::{ConfigManager, ConfigOptions, Environment};

use crate::output;

#[derive(Args)]
pub struct WatchArgs {
    #[arg(
        short,
        long,
        env = "MERIDIAN_ENV",
        default_value = "development",
        help = "Environment to load"
    )]
    pub environment: Environment,

    #[arg(
        short,
        long,
        env = "MERIDIAN_CONFIG_DIR",
        default_value = "config",
        help = "Configuration root directory"
    )]
    pub config_dir: PathBuf,
}

/// Load the configuration with hot reload forced on and report every
/// successful reload until interrupted.
pub async fn run(args: WatchArgs) -> Result<()> {
    let manager = ConfigManager::new(ConfigOptions {
        environment: Some(args.environment),
        config_path: Some(args.config_dir.clone()),
        enable_hot_reload: Some(true),
    });

    // Register before the initial load so the first file change is never missed.
    manager.on_reload(|config| {
        output::success(&format!(
            "configuration reloaded (api.baseUrl = {})",
            config.app.api.base_url
        ));
        Ok(())
    });

    let config = manager
        .load()
        .context("initial configuration load failed")?;
    output::success(&format!(
        "loaded {} configuration from {}",
        manager.environment(),
        args.config_dir.display()
    ));
    output::info(&format!(
        "watching for changes (api.baseUrl = {}, ctrl-c to stop)",
        config.app.api.base_url
    ));

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    manager.cleanup();
    output::info("watch stopped");
    Ok(())
}
