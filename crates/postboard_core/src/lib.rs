//! Core persistence logic for Postboard.
//! This crate owns the post store and everything it needs to run.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{AppConfig, ConfigError};
pub use db::{
    open_db, open_db_in_memory, with_read_transaction, with_transaction, DbError, DbResult,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::post::{Post, PostId};
pub use repo::post_repo::{PostRepository, RepoError, RepoResult, SqlitePostRepository};
pub use service::post_service::PostService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
