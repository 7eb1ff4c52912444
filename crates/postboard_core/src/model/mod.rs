//! Domain model for the post store.
//!
//! # Invariants
//! - Identity is assigned by the store, never by callers.
//! - A post without identity is transient; with identity it is managed.

pub mod post;
