pub mod show;
pub mod validate;
pub mod watch;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "meridian-config",
    author,
    version,
    about = "Meridian config CLI - inspect, validate and watch layered configuration",
    long_about = "Validates environment configuration files against their JSON schemas, shows \
                  the merged configuration a service would receive (secrets redacted by \
                  default), and watches a configuration tree for hot reloads."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Validate environment files against their schemas")]
    Validate(validate::ValidateArgs),

    #[command(about = "Show the merged configuration as JSON")]
    Show(show::ShowArgs),

    #[command(about = "Watch configuration files and report hot reloads")]
    Watch(watch::WatchArgs),
}
