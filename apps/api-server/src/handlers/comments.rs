//! Comment handlers.

use actix_web::{HttpResponse, web};

use tardygram_core::domain::Comment;
use tardygram_shared::dto::{CommentResponse, CreateCommentRequest};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

fn comment_response(comment: Comment) -> CommentResponse {
    CommentResponse {
        id: comment.id.to_string(),
        post_id: comment.post_id,
        user_id: comment.user_id,
        comment: comment.body,
    }
}

/// POST /api/v1/comments
pub async fn create(
    identity: Identity,
    state: web::Data<AppState>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let comment = state
        .comments
        .create(identity.user(), req.post_id, req.comment)
        .await?;

    Ok(HttpResponse::Ok().json(comment_response(comment)))
}

/// GET /api/v1/posts/{id}/comments
pub async fn list_for_post(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let comments = state.comments.list_for_post(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(
        comments
            .into_iter()
            .map(comment_response)
            .collect::<Vec<_>>(),
    ))
}

/// DELETE /api/v1/comments/{id}
pub async fn delete(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let comment = state
        .comments
        .delete(path.into_inner(), identity.user_id)
        .await?;

    Ok(HttpResponse::Ok().json(comment_response(comment)))
}
