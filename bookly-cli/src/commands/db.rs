//! Database commands
//!
//! Commands: init, check, status

use anyhow::{Context, Result};
use bookly_db::{schema, DatabaseConfig, Storage};
use clap::Parser;
use serde::Serialize;
use tracing::info;

#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Print counts as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct TableCount {
    table: &'static str,
    rows: i64,
}

async fn connect(config: &DatabaseConfig) -> Result<Storage> {
    Storage::connect(config)
        .await
        .with_context(|| format!("Failed to connect to {}", config.redacted_url()))
}

/// Create tables and indexes (safe to repeat).
pub async fn run_init(config: &DatabaseConfig) -> Result<()> {
    let storage = connect(config).await?;
    storage
        .initialize()
        .await
        .context("Failed to initialize storage")?;
    storage.close().await;

    println!("Storage initialized ({} tables)", schema::TABLES.len());
    Ok(())
}

/// Acquire a session, round trip, and report pool occupancy.
pub async fn run_check(config: &DatabaseConfig) -> Result<()> {
    let storage = connect(config).await?;

    let mut session = storage.session().await.context("Failed to open session")?;
    session.ping().await.context("Database did not answer")?;
    session.close();

    let status = storage.pool_status();
    info!(
        size = status.size,
        idle = status.idle,
        max = status.max_connections,
        "pool status"
    );
    storage.close().await;

    println!("OK: {}", config.redacted_url());
    Ok(())
}

/// Row counts per table.
pub async fn run_status(config: &DatabaseConfig, args: &StatusArgs) -> Result<()> {
    let storage = connect(config).await?;

    let mut session = storage.session().await.context("Failed to open session")?;
    let counts = schema::row_counts(&mut session)
        .await
        .context("Failed to count rows (run `bookly init` first?)")?;
    session.close();
    storage.close().await;

    if args.json {
        let counts: Vec<TableCount> = counts
            .into_iter()
            .map(|(table, rows)| TableCount { table, rows })
            .collect();
        println!("{}", serde_json::to_string_pretty(&counts)?);
    } else {
        for (table, rows) in counts {
            println!("{:<10} {:>10}", table, rows);
        }
    }

    Ok(())
}
