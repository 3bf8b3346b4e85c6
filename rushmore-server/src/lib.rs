//! rushmore-server: JSON API for the Rushmore blog
//!
//! Posts, categories, and comments with a likes counter, stored in
//! PostgreSQL. Referential rules (comment cascade on post delete,
//! category reference nulled on category delete) live in the schema.

pub mod config;
pub mod db;
pub mod http;
pub mod models;

pub use config::{ApiKeys, BlogConfig, ConfigError};
pub use http::{build_router, run_server, AppState, ServerConfig};
