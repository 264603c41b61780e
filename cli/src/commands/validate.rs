use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use config::{ConfigDomain, ConfigError, Environment, SchemaValidator, load_config_file};

use crate::output;

#[derive(Args)]
pub struct ValidateArgs {
    #[arg(
        short,
        long,
        env = "MERIDIAN_ENV",
        default_value = "development",
        help = "Environment whose files are validated"
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

/// Validate every domain rather than failing fast, so one run reports all
/// problems in the tree.
pub fn run(args: ValidateArgs) -> Result<()> {
    output::header(&format!(
        "Validating {} configuration in {}",
        args.environment,
        args.config_dir.display()
    ));

    let validator = SchemaValidator::new(&args.config_dir.join("schemas"));
    let mut failures = 0usize;

    for domain in ConfigDomain::ALL {
        match check_domain(&validator, &args, domain) {
            Ok(()) => output::success(&format!("{domain}: ok")),
            Err(error) => {
                failures += 1;
                report_failure(domain, &error);
            }
        }
    }

    if failures > 0 {
        bail!(
            "{failures} of {} domain(s) failed validation",
            ConfigDomain::ALL.len()
        );
    }
    Ok(())
}

fn check_domain(
    validator: &SchemaValidator,
    args: &ValidateArgs,
    domain: ConfigDomain,
) -> Result<(), ConfigError> {
    let document = load_config_file(&args.config_dir, args.environment, domain)?;
    validator.validate(domain, &document)
}

fn report_failure(domain: ConfigDomain, error: &ConfigError) {
    match error {
        ConfigError::SchemaValidation { violations, .. } => {
            output::error(&format!("{domain}: {} violation(s)", violations.len()));
            for violation in violations {
                eprintln!("    {violation}");
            }
        }
        other => output::error(&format!("{domain}: {other}")),
    }
}
