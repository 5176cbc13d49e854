use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Comment entity - a short text left on a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// A comment that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: i64,
    pub user_id: i64,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl NewComment {
    pub fn new(post_id: i64, user_id: i64, body: String) -> Self {
        Self {
            post_id,
            user_id,
            body,
            created_at: Utc::now(),
        }
    }
}
