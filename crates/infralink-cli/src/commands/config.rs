use anyhow::{Context, Result};
use colored::Colorize;

use crate::cli::OutputFormat;
use crate::config::{AppConfig, ConfigSource};
use crate::output::print_success;

pub fn show(config: &AppConfig, path: &str, source: ConfigSource, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(config).context("Failed to render config")?;
            println!("{json}");
        }
        OutputFormat::Table => {
            println!("{}: {} ({})", "Config".cyan(), path, source);
            let rendered = toml::to_string_pretty(config).context("Failed to render config")?;
            println!("{rendered}");
        }
    }
    Ok(())
}

/// Loading already validated the config; this only reports it.
pub fn validate(path: &str, source: ConfigSource) {
    print_success(&format!("Configuration is valid: {path} ({source})"));
}
