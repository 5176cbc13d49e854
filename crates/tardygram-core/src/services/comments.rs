use std::sync::Arc;

use crate::domain::{Comment, NewComment, User};
use crate::error::{DomainError, RepoError};
use crate::ports::{CommentRepository, PostRepository};

pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    posts: Arc<dyn PostRepository>,
}

impl CommentService {
    pub fn new(comments: Arc<dyn CommentRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { comments, posts }
    }

    pub async fn create(
        &self,
        author: &User,
        post_id: i64,
        body: String,
    ) -> Result<Comment, DomainError> {
        if body.trim().is_empty() {
            return Err(DomainError::Validation("Comment must not be empty".to_string()));
        }
        self.ensure_post(post_id).await?;

        let comment = self
            .comments
            .insert(NewComment::new(post_id, author.id, body))
            .await?;

        tracing::info!(comment_id = comment.id, post_id, user_id = author.id, "Comment created");
        Ok(comment)
    }

    pub async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>, DomainError> {
        self.ensure_post(post_id).await?;
        Ok(self.comments.find_by_post_id(post_id).await?)
    }

    /// Delete a comment on behalf of its author.
    pub async fn delete(&self, id: i64, user_id: i64) -> Result<Comment, DomainError> {
        let comment = self
            .comments
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("comment", id))?;

        if comment.user_id != user_id {
            return Err(DomainError::Forbidden {
                entity_type: "comment",
            });
        }

        self.comments.delete(id).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::not_found("comment", id),
            other => other.into(),
        })?;
        Ok(comment)
    }

    async fn ensure_post(&self, post_id: i64) -> Result<(), DomainError> {
        match self.posts.find_by_id(post_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found("post", post_id)),
        }
    }
}
