//! In-memory store - used when no database is configured, and in tests.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use tardygram_core::domain::{
    Comment, NewComment, NewPost, NewUser, Post, RankedPost, User, mask_email,
};
use tardygram_core::error::RepoError;
use tardygram_core::ports::{BaseRepository, CommentRepository, PostRepository, UserRepository};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    posts: BTreeMap<i64, Post>,
    comments: BTreeMap<i64, Comment>,
    last_user_id: i64,
    last_post_id: i64,
    last_comment_id: i64,
}

/// All three tables behind one async RwLock, with the same unique and
/// foreign-key rules as the PostgreSQL schema.
///
/// Note: Data is lost on process restart.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, NewUser, i64> for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn insert(&self, draft: NewUser) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == draft.email) {
            return Err(RepoError::Constraint(format!(
                "email {} already exists",
                mask_email(&draft.email)
            )));
        }

        tables.last_user_id += 1;
        let user = User {
            id: tables.last_user_id,
            email: draft.email,
            password_hash: draft.password_hash,
            created_at: draft.created_at,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl BaseRepository<Post, NewPost, i64> for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn insert(&self, draft: NewPost) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&draft.user_id) {
            return Err(RepoError::Constraint(format!(
                "user {} does not exist",
                draft.user_id
            )));
        }

        tables.last_post_id += 1;
        let post = Post {
            id: tables.last_post_id,
            user_id: draft.user_id,
            photo_url: draft.photo_url,
            caption: draft.caption,
            tags: draft.tags,
            created_at: draft.created_at,
            updated_at: draft.created_at,
        };
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        match tables.posts.get_mut(&post.id) {
            Some(stored) => {
                *stored = post.clone();
                Ok(post)
            }
            None => Err(RepoError::NotFound),
        }
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if tables.posts.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }

        // ON DELETE CASCADE
        tables.comments.retain(|_, c| c.post_id != id);
        Ok(())
    }

    async fn list_recent(&self) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        let mut posts: Vec<Post> = tables.posts.values().cloned().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(posts)
    }

    async fn list_popular(&self, limit: u64) -> Result<Vec<RankedPost>, RepoError> {
        let tables = self.tables.read().await;

        let mut counts: HashMap<i64, i64> = HashMap::new();
        for comment in tables.comments.values() {
            *counts.entry(comment.post_id).or_default() += 1;
        }

        let mut ranked: Vec<RankedPost> = tables
            .posts
            .values()
            .map(|post| RankedPost {
                comment_count: counts.get(&post.id).copied().unwrap_or(0),
                post: post.clone(),
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.comment_count
                .cmp(&a.comment_count)
                .then(a.post.id.cmp(&b.post.id))
        });
        ranked.truncate(usize::try_from(limit).unwrap_or(usize::MAX));

        Ok(ranked)
    }
}

#[async_trait]
impl BaseRepository<Comment, NewComment, i64> for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>, RepoError> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn insert(&self, draft: NewComment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&draft.post_id) {
            return Err(RepoError::Constraint(format!(
                "post {} does not exist",
                draft.post_id
            )));
        }
        if !tables.users.contains_key(&draft.user_id) {
            return Err(RepoError::Constraint(format!(
                "user {} does not exist",
                draft.user_id
            )));
        }

        tables.last_comment_id += 1;
        let comment = Comment {
            id: tables.last_comment_id,
            post_id: draft.post_id,
            user_id: draft.user_id,
            body: draft.body,
            created_at: draft.created_at,
        };
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        match tables.comments.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }

    async fn find_by_post_id(&self, post_id: i64) -> Result<Vec<Comment>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect())
    }
}
