//! Subcommand implementations

use anyhow::{Context, Result};
use clap::Args;

use rushmore_server::BlogConfig;

pub mod serve;
pub mod setup_db;

pub use serve::run_serve;
pub use setup_db::run_setup_db;

/// Database overrides shared by every command
#[derive(Args, Debug)]
pub struct DatabaseArgs {
    /// Database URL (default: DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Maximum pooled database connections (default: RUSHMORE_MAX_CONNECTIONS or 5)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_connections: Option<u32>,
}

impl DatabaseArgs {
    fn apply(self, config: &mut BlogConfig) {
        if let Some(url) = self.database_url {
            config.database_url = Some(url);
        }
        if let Some(max) = self.max_connections {
            config.max_connections = max;
        }
    }
}

/// Environment (and `.env`) configuration with `args` applied on top
fn load_config(args: DatabaseArgs) -> Result<BlogConfig> {
    let mut config = BlogConfig::from_env().context("Invalid configuration")?;
    args.apply(&mut config);
    Ok(config)
}

const MISSING_DATABASE_URL: &str =
    "DATABASE_URL not set. Set via --database-url, DATABASE_URL env, or .env";
