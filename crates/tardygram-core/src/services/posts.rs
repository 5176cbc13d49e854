//! Post CRUD with the ownership rule applied.

use std::sync::Arc;

use crate::domain::{NewPost, Post, PostDetail, PostPatch, RankedPost, User};
use crate::error::{DomainError, RepoError};
use crate::ports::{PostRepository, UserRepository};

/// Number of posts returned by the popularity ranking.
pub const POPULAR_LIMIT: u64 = 10;

/// Fields of a post supplied by its author.
#[derive(Debug, Clone)]
pub struct PostDraft {
    pub photo_url: String,
    pub caption: String,
    pub tags: Vec<String>,
}

/// Caller of a post mutation: the session user, plus any `userId` the
/// request itself named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i64,
    pub claimed_id: Option<i64>,
}

impl Actor {
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            claimed_id: None,
        }
    }

    pub fn claiming(self, claimed_id: Option<i64>) -> Self {
        Self { claimed_id, ..self }
    }

    /// Owner only, and a named id must be the caller's own.
    fn may_modify(&self, post: &Post) -> bool {
        post.is_owned_by(self.user_id) && self.claimed_id.is_none_or(|id| id == self.user_id)
    }
}

pub struct PostService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { posts, users }
    }

    /// Create a post owned by an authenticated user.
    pub async fn create(&self, owner: &User, draft: PostDraft) -> Result<Post, DomainError> {
        let post = self
            .posts
            .insert(NewPost::new(
                owner.id,
                draft.photo_url,
                draft.caption,
                draft.tags,
            ))
            .await?;

        tracing::info!(post_id = post.id, user_id = owner.id, "Post created");
        Ok(post)
    }

    pub async fn list(&self) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.list_recent().await?)
    }

    pub async fn get(&self, id: i64) -> Result<PostDetail, DomainError> {
        let post = self.find(id).await?;
        let owner = self
            .users
            .find_by_id(post.user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", post.user_id))?;

        Ok(PostDetail::new(post, &owner))
    }

    /// Apply a partial update on behalf of `actor`.
    pub async fn update(
        &self,
        id: i64,
        actor: Actor,
        patch: PostPatch,
    ) -> Result<Post, DomainError> {
        let mut post = self.find_owned(id, actor).await?;
        if patch.is_empty() {
            return Ok(post);
        }

        patch.apply(&mut post);
        let post = self.posts.update(post).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::not_found("post", id),
            other => other.into(),
        })?;

        tracing::info!(post_id = id, user_id = actor.user_id, "Post updated");
        Ok(post)
    }

    /// Delete a post on behalf of `actor`, returning its prior state.
    pub async fn delete(&self, id: i64, actor: Actor) -> Result<Post, DomainError> {
        let post = self.find_owned(id, actor).await?;
        self.posts.delete(id).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::not_found("post", id),
            other => other.into(),
        })?;

        tracing::info!(post_id = id, user_id = actor.user_id, "Post deleted");
        Ok(post)
    }

    pub async fn popular(&self, limit: u64) -> Result<Vec<RankedPost>, DomainError> {
        Ok(self.posts.list_popular(limit).await?)
    }

    async fn find(&self, id: i64) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", id))
    }

    /// Unknown ids fail as `NotFound` before ownership is considered.
    async fn find_owned(&self, id: i64, actor: Actor) -> Result<Post, DomainError> {
        let post = self.find(id).await?;
        if !actor.may_modify(&post) {
            tracing::warn!(
                post_id = id,
                owner_id = post.user_id,
                user_id = actor.user_id,
                claimed_id = ?actor.claimed_id,
                "Rejected non-owner mutation"
            );
            return Err(DomainError::Forbidden {
                entity_type: "post",
            });
        }
        Ok(post)
    }
}
