use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::User;

/// Post entity - a photo with a caption and tags, owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub photo_url: String,
    pub caption: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.user_id == user_id
    }
}

/// A post that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub user_id: i64,
    pub photo_url: String,
    pub caption: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl NewPost {
    pub fn new(user_id: i64, photo_url: String, caption: String, tags: Vec<String>) -> Self {
        Self {
            user_id,
            photo_url,
            caption,
            tags,
            created_at: Utc::now(),
        }
    }
}

/// Partial update of a post. Every present field overwrites the stored one.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub photo_url: Option<String>,
    pub caption: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl PostPatch {
    pub fn is_empty(&self) -> bool {
        self.photo_url.is_none() && self.caption.is_none() && self.tags.is_none()
    }

    /// Apply the patch and bump `updated_at`.
    pub fn apply(self, post: &mut Post) {
        if let Some(photo_url) = self.photo_url {
            post.photo_url = photo_url;
        }
        if let Some(caption) = self.caption {
            post.caption = caption;
        }
        if let Some(tags) = self.tags {
            post.tags = tags;
        }
        post.updated_at = Utc::now();
    }
}

/// A post together with its owner's public handle.
#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: Post,
    pub username: String,
}

impl PostDetail {
    pub fn new(post: Post, owner: &User) -> Self {
        Self {
            post,
            username: owner.username().to_string(),
        }
    }
}

/// A post with its comment count, as returned by the popularity ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedPost {
    pub post: Post,
    pub comment_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Post {
        let now = Utc::now();
        Post {
            id: 1,
            user_id: 7,
            photo_url: "blah blah".to_string(),
            caption: "beginning caption".to_string(),
            tags: vec!["run this town".to_string(), "how about it".to_string()],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_patch_only_touches_present_fields() {
        let mut post = sample();
        let before = post.clone();

        PostPatch {
            caption: Some("thought it was cute, might delete later".to_string()),
            ..Default::default()
        }
        .apply(&mut post);

        assert_eq!(post.caption, "thought it was cute, might delete later");
        assert_eq!(post.photo_url, before.photo_url);
        assert_eq!(post.tags, before.tags);
        assert_eq!(post.user_id, before.user_id);
        assert!(post.updated_at >= before.updated_at);
    }

    #[test]
    fn test_empty_patch() {
        assert!(PostPatch::default().is_empty());
        assert!(
            !PostPatch {
                tags: Some(vec![]),
                ..Default::default()
            }
            .is_empty()
        );
    }
}
