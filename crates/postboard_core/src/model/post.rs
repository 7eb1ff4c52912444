//! Post record.
//!
//! # Invariants
//! - `id` and `created_at` are `None` until the store persists the post.
//! - Deleted ids are never handed out again.

use serde::{Deserialize, Serialize};

/// Store-assigned post identity.
pub type PostId = i64;

/// One post as seen by callers and the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Store-assigned identity. `None` while the post is transient.
    pub id: Option<PostId>,
    /// Short heading. The store rejects blank titles.
    pub title: String,
    /// Body text.
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Unix epoch milliseconds, assigned on insert.
    pub created_at: Option<i64>,
}

impl Post {
    /// Creates a transient post with no author.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            content: content.into(),
            author: None,
            created_at: None,
        }
    }

    /// Sets the author label.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Returns whether the store is tracking this post.
    pub fn is_managed(&self) -> bool {
        self.id.is_some()
    }
}
