//! Post handlers. Reads are public; writes need a session and ownership.

use actix_web::{HttpResponse, web};

use tardygram_core::domain::{Post, PostPatch, RankedPost};
use tardygram_core::services::{POPULAR_LIMIT, PostDraft};
use tardygram_shared::dto::{
    CreatePostRequest, DeletePostRequest, PopularPostResponse, PostDetailResponse, PostResponse,
    UpdatePostRequest,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

fn post_response(post: Post) -> PostResponse {
    PostResponse {
        id: post.id.to_string(),
        user_id: post.user_id,
        photo_url: post.photo_url,
        caption: post.caption,
        tags: post.tags,
    }
}

fn popular_response(ranked: RankedPost) -> PopularPostResponse {
    PopularPostResponse {
        post: post_response(ranked.post),
        comment_count: ranked.comment_count,
    }
}

/// POST /api/v1/posts
pub async fn create(
    identity: Identity,
    state: web::Data<AppState>,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let post = state
        .posts
        .create(
            identity.user(),
            PostDraft {
                photo_url: req.photo_url,
                caption: req.caption,
                tags: req.tags,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// GET /api/v1/posts
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.list().await?;

    Ok(HttpResponse::Ok().json(posts.into_iter().map(post_response).collect::<Vec<_>>()))
}

/// GET /api/v1/posts/popular
pub async fn popular(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.popular(POPULAR_LIMIT).await?;

    Ok(HttpResponse::Ok().json(
        posts
            .into_iter()
            .map(popular_response)
            .collect::<Vec<_>>(),
    ))
}

/// GET /api/v1/posts/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let detail = state.posts.get(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(PostDetailResponse {
        id: detail.post.id.to_string(),
        caption: detail.post.caption,
        tags: detail.post.tags,
        username: detail.username,
    }))
}

/// PATCH /api/v1/posts/{id}
pub async fn update(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let actor = identity.actor(req.user_id);
    let patch = PostPatch {
        photo_url: req.photo_url,
        caption: req.caption,
        tags: req.tags,
    };
    let post = state.posts.update(path.into_inner(), actor, patch).await?;

    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// DELETE /api/v1/posts/{id}
///
/// The body is optional; when present its `userId` must name the caller.
/// An unknown id is a 404 whatever the body says.
pub async fn delete(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: Option<web::Json<DeletePostRequest>>,
) -> AppResult<HttpResponse> {
    let req = body.map(web::Json::into_inner).unwrap_or_default();

    let post = state
        .posts
        .delete(path.into_inner(), identity.actor(req.user_id))
        .await?;

    Ok(HttpResponse::Ok().json(post_response(post)))
}
