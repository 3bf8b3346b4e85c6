//! Schema creation and category seeding

use anyhow::{Context, Result};
use clap::Parser;

use rushmore_server::db::{create_pool_with_options, migrations, seed};

use super::{load_config, DatabaseArgs, MISSING_DATABASE_URL};

/// Arguments for the setup-db command
#[derive(Parser, Debug)]
pub struct SetupDbArgs {
    #[command(flatten)]
    pub database: DatabaseArgs,

    /// Create tables only, without sample categories
    #[arg(long)]
    pub no_seed: bool,
}

/// Create the tables and seed sample categories into an empty database
pub async fn run_setup_db(args: SetupDbArgs) -> Result<()> {
    let config = load_config(args.database)?;
    let database_url = config.database_url().context(MISSING_DATABASE_URL)?;

    let pool = create_pool_with_options(database_url, config.max_connections)
        .await
        .context("Failed to connect to database")?;

    migrations::run(&pool)
        .await
        .context("Failed to create tables")?;
    tracing::info!("Tables ready");

    if args.no_seed {
        return Ok(());
    }

    let inserted = seed::seed_categories(&pool)
        .await
        .context("Failed to seed categories")?;
    if inserted == 0 {
        tracing::info!("Categories already present, seed skipped");
    } else {
        tracing::info!(inserted, "Sample categories created");
    }

    Ok(())
}
