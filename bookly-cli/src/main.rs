//! bookly CLI - operator tool for the bookly catalog database
//!
//! - `init`: create tables and indexes (idempotent)
//! - `check`: connectivity and pool health
//! - `status`: row counts per table
//! - `config`: inspect the resolved configuration

use std::path::PathBuf;

use anyhow::{Context, Result};
use bookly_db::DatabaseConfig;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

use commands::config::{ConfigArgs, ConfigCommands};

#[derive(Parser, Debug)]
#[command(
    name = "bookly",
    author,
    version,
    about = "Manage the bookly catalog database",
    long_about = "Initialize and inspect the PostgreSQL store behind the bookly catalog: \
                  users, books, reviews and tags."
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Log every SQL statement
    #[arg(long, global = true)]
    echo: bool,

    /// Config file (default: ~/.bookly/config.toml)
    #[arg(long, global = true, env = "BOOKLY_CONFIG")]
    config: Option<PathBuf>,

    /// PostgreSQL connection string, overrides the config file
    #[arg(long, global = true, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create tables and indexes (safe to run repeatedly)
    Init,
    /// Open a session and round trip to the database
    Check,
    /// Show row counts for every table
    Status(commands::db::StatusArgs),
    /// Inspect configuration (show, path)
    Config(ConfigArgs),
}

impl Cli {
    fn database_config(&self) -> Result<DatabaseConfig> {
        let mut config = DatabaseConfig::load(self.config.as_deref(), self.database_url.clone())
            .context("Failed to load database configuration")?;
        config.echo |= self.echo;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    tracing_setup::init(&tracing_setup::TracingConfig {
        debug: cli.debug,
        echo: cli.echo,
    })?;

    match cli.command {
        Commands::Config(ConfigArgs {
            command: ConfigCommands::Path,
        }) => commands::config::run_path(),
        Commands::Config(ConfigArgs {
            command: ConfigCommands::Show { json },
        }) => commands::config::run_show(&cli.database_config()?, json),
        Commands::Init => commands::db::run_init(&cli.database_config()?).await,
        Commands::Check => commands::db::run_check(&cli.database_config()?).await,
        Commands::Status(ref args) => commands::db::run_status(&cli.database_config()?, args).await,
    }
}
