use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "infralink")]
#[command(about = "Infralink: provision Kafka topics and Elasticsearch indices, check their health")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path (overrides INFRALINK_CONFIG env var and infralink.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,

    /// Log level (overrides logging.level from config)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Clone, Copy, ValueEnum, Default, PartialEq, Eq, Debug)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq, Debug)]
pub enum Target {
    Kafka,
    Elasticsearch,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create or update every configured topic, index and mapping
    Provision(ProvisionArgs),
    /// Check the health of every configured cluster
    Check,
    /// List resources that exist remotely
    List(ListArgs),
    /// Inspect the effective configuration
    Config(ConfigArgs),
}

#[derive(clap::Args)]
pub struct ProvisionArgs {
    /// Only provision resources of this system
    #[arg(long)]
    pub only: Option<Target>,
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// System to list resources from
    pub target: Target,
}

#[derive(clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the merged configuration (file + environment)
    Show,
    /// Validate the configuration and exit
    Validate,
}
