//! Post use-case service.
//!
//! # Invariants
//! - Service APIs never bypass the repository contract.
//! - The service stays storage-agnostic and adds no validation.

use crate::model::post::{Post, PostId};
use crate::repo::post_repo::{PostRepository, RepoError, RepoResult};

/// Use-case wrapper for post store operations.
pub struct PostService<R: PostRepository> {
    repo: R,
}

impl<R: PostRepository> PostService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Builds a transient post from parts and persists it.
    pub fn add_post(
        &self,
        title: impl Into<String>,
        content: impl Into<String>,
        author: Option<String>,
    ) -> RepoResult<Post> {
        let mut post = Post::new(title, content);
        post.author = author;
        self.repo.add(post)
    }

    pub fn add(&self, post: Post) -> RepoResult<Post> {
        self.repo.add(post)
    }

    pub fn delete(&self, post: &Post) -> RepoResult<()> {
        self.repo.delete(post)
    }

    /// Loads the managed post for `id` and removes it.
    ///
    /// Returns `RepoError::NotFound` when no post carries `id`.
    pub fn delete_by_id(&self, id: PostId) -> RepoResult<Post> {
        let post = self.repo.get(id)?.ok_or(RepoError::NotFound(id))?;
        self.repo.delete(&post)?;
        Ok(post)
    }

    pub fn find_all(&self) -> RepoResult<Vec<Post>> {
        self.repo.find_all()
    }

    pub fn get(&self, id: PostId) -> RepoResult<Option<Post>> {
        self.repo.get(id)
    }
}
