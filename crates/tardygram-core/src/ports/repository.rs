use async_trait::async_trait;

use crate::domain::{Comment, NewComment, NewPost, NewUser, Post, RankedPost, User};
use crate::error::RepoError;

/// Generic repository trait shared by every store.
///
/// `N` is the unsaved form of `T`; the store assigns the id on insert.
#[async_trait]
pub trait BaseRepository<T, N, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity and return it with its generated ID.
    async fn insert(&self, draft: N) -> Result<T, RepoError>;
}

/// Credential store. Accounts are never edited or removed.
#[async_trait]
pub trait UserRepository: BaseRepository<User, NewUser, i64> {
    /// Find a user by their email address (exact match).
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
}

/// Post store.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, NewPost, i64> {
    /// Overwrite an existing post.
    async fn update(&self, post: Post) -> Result<Post, RepoError>;

    /// Delete a post and, with it, its comments.
    async fn delete(&self, id: i64) -> Result<(), RepoError>;

    /// All posts, newest first.
    async fn list_recent(&self) -> Result<Vec<Post>, RepoError>;

    /// The `limit` posts with the most comments, ties broken by ascending id.
    async fn list_popular(&self, limit: u64) -> Result<Vec<RankedPost>, RepoError>;
}

/// Comment store.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, NewComment, i64> {
    /// Delete a comment by its ID.
    async fn delete(&self, id: i64) -> Result<(), RepoError>;

    /// Comments on a post, oldest first.
    async fn find_by_post_id(&self, post_id: i64) -> Result<Vec<Comment>, RepoError>;
}
