//! Repository layer for post persistence.
//!
//! # Responsibility
//! - Define the post store contract.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Store failures propagate unchanged inside `RepoError::Db`.
//! - Repositories borrow a connection; they never own transaction scope.

pub mod post_repo;
