//! HTTP server command for the blog API

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;

use rushmore_server::db::{create_pool_with_options, migrations, seed, MemoryStore, PgStore};
use rushmore_server::{run_server, ApiKeys, AppState, ServerConfig};

use super::{load_config, DatabaseArgs, MISSING_DATABASE_URL};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default: RUSHMORE_BIND or 127.0.0.1:3030)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    #[command(flatten)]
    pub database: DatabaseArgs,

    /// Serve from an in-memory store seeded with sample categories (ignores DATABASE_URL)
    #[arg(long)]
    pub memory: bool,

    /// Skip table creation and category seeding on startup
    #[arg(long)]
    pub no_setup: bool,

    /// Key granting anonymous write access (default: RUSHMORE_ANON_KEY; unset: writes are open)
    #[arg(long)]
    pub anon_key: Option<String>,

    /// Key granting service-role access (default: RUSHMORE_SERVICE_ROLE_KEY; unset: deletes are open)
    #[arg(long)]
    pub service_role_key: Option<String>,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let mut config = load_config(args.database)?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if args.anon_key.is_some() || args.service_role_key.is_some() {
        config.keys = ApiKeys::new(
            args.anon_key.or(config.keys.anon_key),
            args.service_role_key.or(config.keys.service_role_key),
        );
    }

    let keys = config.keys.clone();
    if keys.service_role_key.is_none() {
        tracing::warn!("No service-role key configured, every caller may delete content");
    }

    let state = if args.memory {
        tracing::info!("Using in-memory store, data is lost on exit");
        AppState::new(MemoryStore::with_sample_categories(), keys)
    } else {
        let database_url = config.database_url().context(MISSING_DATABASE_URL)?;

        let pool = create_pool_with_options(database_url, config.max_connections)
            .await
            .context("Failed to create database pool")?;

        if !args.no_setup {
            migrations::run(&pool)
                .await
                .context("Failed to create tables")?;
            let seeded = seed::seed_categories(&pool)
                .await
                .context("Failed to seed categories")?;
            tracing::debug!(seeded, "Database setup complete");
        }

        AppState::new(PgStore::new(pool), keys)
    };

    tracing::info!("Starting rushmore server on {}", config.bind_addr);

    let server_config = ServerConfig {
        bind_addr: config.bind_addr,
        cors_permissive: args.cors_permissive,
    };

    run_server(state, server_config).await.context("Server error")?;

    Ok(())
}
