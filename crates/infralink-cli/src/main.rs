use anyhow::{Result, anyhow};
use clap::Parser;

use infralink_cli::cli::{Cli, Commands, ConfigCommands};
use infralink_cli::commands;
use infralink_cli::config::{loader::load_config, resolve_config_path};
use infralink_cli::observability::init_tracing;
use infralink_cli::output::print_error;

#[tokio::main]
async fn main() {
    // Load .env file if present (before anything else)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist - it's optional
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    match run().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            print_error(&format!("{e:#}"));
            std::process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when the command ran but found failures.
async fn run() -> Result<bool> {
    let cli = Cli::parse();
    let format = cli.format.unwrap_or_default();

    let (config_path, source) = resolve_config_path(cli.config.as_deref());
    let mut cfg = load_config(&config_path, source).map_err(|e| anyhow!(e))?;
    if let Some(level) = cli.log_level {
        cfg.logging.level = level;
        cfg.validate().map_err(|e| anyhow!(e))?;
    }

    // Dropped at the end of `run`, before the process exits.
    let _guard = init_tracing(&cfg.logging, &cfg.otel)?;
    tracing::debug!(path = %config_path, %source, "configuration loaded");

    let ok = match &cli.command {
        Commands::Provision(args) => commands::provision::provision(&cfg, args.only, format).await?,
        Commands::Check => commands::check::check(&cfg, format).await?,
        Commands::List(args) => {
            commands::list::list(&cfg, args.target, format).await?;
            true
        }
        Commands::Config(args) => {
            match args.command {
                ConfigCommands::Show => commands::config::show(&cfg, &config_path, source, format)?,
                ConfigCommands::Validate => commands::config::validate(&config_path, source),
            }
            true
        }
    };

    Ok(ok)
}
