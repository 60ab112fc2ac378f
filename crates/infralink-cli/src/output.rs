use colored::Colorize;
use infralink_core::{HealthResult, ProvisionReport, StepOutcome};
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

/// One line of a provisioning summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionRow {
    pub kind: String,
    pub resource: String,
    pub outcome: String,
    pub failed: bool,
}

pub fn provision_rows(kind: &str, report: &ProvisionReport) -> Vec<ProvisionRow> {
    report
        .steps
        .iter()
        .map(|step| ProvisionRow {
            kind: kind.to_string(),
            resource: step.path.clone(),
            outcome: step.outcome.to_string(),
            failed: step.outcome.is_failed() || step.outcome == StepOutcome::NotAttempted,
        })
        .collect()
}

pub fn print_provision_rows(rows: &[ProvisionRow], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(rows),
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("No resources configured.");
                return;
            }
            let mut builder = Builder::default();
            builder.push_record(["Kind", "Resource", "Outcome"]);
            for row in rows {
                let outcome = if row.failed {
                    row.outcome.red().to_string()
                } else {
                    row.outcome.green().to_string()
                };
                builder.push_record([row.kind.clone(), row.resource.clone(), outcome]);
            }
            println!("{}", builder.build().with(Style::rounded()));
        }
    }
}

#[derive(Serialize)]
struct HealthLine<'a> {
    name: &'a str,
    status: String,
    #[serde(skip_serializing_if = "str::is_empty")]
    detail: &'a str,
}

pub fn print_health(results: &[(String, HealthResult)], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let lines: Vec<HealthLine<'_>> = results
                .iter()
                .map(|(name, result)| HealthLine {
                    name,
                    status: result.status.to_string(),
                    detail: &result.detail,
                })
                .collect();
            print_json(&lines);
        }
        OutputFormat::Table => {
            for (name, result) in results {
                if result.is_healthy() {
                    println!("{} {}", "UP".green(), name);
                } else {
                    println!("{} {}: {}", "DOWN".red(), name, result.detail);
                }
            }
        }
    }
}

pub fn print_names(names: &[String], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(names),
        OutputFormat::Table => {
            if names.is_empty() {
                println!("No resources found.");
            }
            for name in names {
                println!("{name}");
            }
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => print_error(&format!("failed to render JSON: {e}")),
    }
}
