//! Tracing setup for the bookly CLI
//!
//! Usage:
//!   bookly --debug ...              # Debug logging to console
//!   bookly --echo ...               # Log every SQL statement
//!   RUST_LOG=bookly_db=debug bookly # Fine-grained log control
//!
//! `RUST_LOG`, when set, wins over both flags.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Tracing configuration options
#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    /// Debug level for everything
    pub debug: bool,
    /// Statement logging (`sqlx::query` target)
    pub echo: bool,
}

impl TracingConfig {
    /// Filter directives used when `RUST_LOG` is unset.
    pub fn default_directives(&self) -> String {
        let base = if self.debug { "debug" } else { "info" };
        if self.echo {
            format!("{},sqlx::query=debug", base)
        } else {
            base.to_string()
        }
    }
}

/// Initialize console tracing.
pub fn init(config: &TracingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_directives()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.debug || config.echo)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}
