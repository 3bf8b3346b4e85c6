//! Database layer - connection pool, schema, and stores
//!
//! # Design Principles
//!
//! - Connection pool (max 5 connections by default)
//! - List operations use JOINs for counts - no N+1 queries
//! - Referential rules are schema constraints, not application checks
//! - Transactions for multi-step operations

pub mod memory;
pub mod migrations;
pub mod pool;
pub mod postgres;
pub mod seed;
pub mod store;

pub use memory::MemoryStore;
pub use pool::{create_pool, create_pool_with_options};
pub use postgres::PgStore;
pub use store::{
    BlogStore, Category, CategoryWithCount, Comment, DbError, Post, PostDetail, PostSummary,
};
