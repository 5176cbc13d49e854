//! Data Transfer Objects - request/response types for the API.
//!
//! Field names are camelCase on the wire. User and post ids travel as strings,
//! a post's `userId` as a number.

use serde::{Deserialize, Serialize};

/// Body of signup and login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// A user's public information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub photo_url: String,
    pub caption: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Partial update. `userId`, when sent, must name the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub user_id: Option<i64>,
    pub photo_url: Option<String>,
    pub caption: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePostRequest {
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub user_id: i64,
    pub photo_url: String,
    pub caption: String,
    pub tags: Vec<String>,
}

/// A single post as shown on its own page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDetailResponse {
    pub id: String,
    pub caption: String,
    pub tags: Vec<String>,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularPostResponse {
    #[serde(flatten)]
    pub post: PostResponse,
    pub comment_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub post_id: i64,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub post_id: i64,
    pub user_id: i64,
    pub comment: String,
}
