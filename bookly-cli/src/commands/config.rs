//! Configuration commands
//!
//! Commands: show, path

use anyhow::Result;
use bookly_db::DatabaseConfig;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective database configuration (password redacted)
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the default config file path
    Path,
}

pub fn run_show(config: &DatabaseConfig, json: bool) -> Result<()> {
    let shown = DatabaseConfig {
        url: config.redacted_url(),
        ..config.clone()
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
    } else {
        println!("url                  = {}", shown.url);
        println!("max_connections      = {}", shown.max_connections);
        println!("acquire_timeout_secs = {}", shown.acquire_timeout_secs);
        println!("echo                 = {}", shown.echo);
    }
    Ok(())
}

pub fn run_path() -> Result<()> {
    println!("{}", DatabaseConfig::config_path().display());
    Ok(())
}
