//! End-to-end tests of the HTTP surface over the in-memory store.

use actix_http::Request;
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use serde_json::{Value, json};

use tardygram_core::ports::TokenService;
use tardygram_infra::{JwtConfig, JwtTokenService};

use crate::config::SessionConfig;
use crate::handlers::configure_routes;
use crate::state::{AppState, Repositories};

fn test_state() -> AppState {
    AppState::new(
        Repositories::in_memory(),
        JwtConfig {
            secret: "test-secret".to_string(),
            ..JwtConfig::default()
        },
        SessionConfig::default(),
    )
}

async fn app() -> impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>
{
    test::init_service(
        App::new()
            .app_data(web::Data::new(test_state()))
            .configure(configure_routes),
    )
    .await
}

fn session_of(resp: &ServiceResponse) -> Cookie<'static> {
    resp.response()
        .cookies()
        .find(|c| c.name() == "session")
        .map(|c| c.into_owned())
        .expect("session cookie")
}

/// Sign up and return the session cookie with the response body.
async fn signup(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    email: &str,
) -> (Cookie<'static>, Value) {
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/signup")
        .set_json(json!({ "email": email, "password": "password" }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cookie = session_of(&resp);
    let body: Value = test::read_body_json(resp).await;
    (cookie, body)
}

async fn create_post(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    session: &Cookie<'static>,
    caption: &str,
) -> Value {
    let req = test::TestRequest::post()
        .uri("/api/v1/posts")
        .cookie(session.clone())
        .set_json(json!({
            "userId": 1,
            "photoUrl": "blah blah",
            "caption": caption,
            "tags": ["run this town", "how about it"],
        }))
        .to_request();
    test::call_and_read_body_json(app, req).await
}

#[actix_web::test]
async fn test_signup_returns_identity_and_sets_cookie() {
    let app = app().await;

    let (cookie, body) = signup(&app, "ben@ben.com").await;

    assert!(body["id"].is_string());
    assert_eq!(body["email"], "ben@ben.com");
    assert_eq!(body.as_object().unwrap().len(), 2);
    assert!(!cookie.value().is_empty());
    assert_eq!(cookie.http_only(), Some(true));
}

#[actix_web::test]
async fn test_duplicate_signup_is_rejected() {
    let app = app().await;
    signup(&app, "ben@ben.com").await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/signup")
        .set_json(json!({ "email": "ben@ben.com", "password": "password" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "status": 409, "message": "Email already registered" }));
}

#[actix_web::test]
async fn test_login_matches_signup() {
    let app = app().await;
    let (_, signed_up) = signup(&app, "ben@ben.com").await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": "ben@ben.com", "password": "password" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    session_of(&resp);

    let logged_in: Value = test::read_body_json(resp).await;
    assert_eq!(logged_in, signed_up);
}

#[actix_web::test]
async fn test_login_with_wrong_password() {
    let app = app().await;
    signup(&app, "ben@ben.com").await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": "ben@ben.com", "password": "not-my-password" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "status": 401, "message": "Invalid email/password" }));
}

#[actix_web::test]
async fn test_verify_with_and_without_session() {
    let app = app().await;
    let (cookie, signed_up) = signup(&app, "ben@ben.com").await;

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/verify")
        .cookie(cookie)
        .to_request();
    let verified: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(verified, signed_up);

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/verify")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "status": 500, "message": "jwt must be provided" }));
}

#[actix_web::test]
async fn test_verify_accepts_bearer_header() {
    let app = app().await;
    let (cookie, signed_up) = signup(&app, "ben@ben.com").await;

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/verify")
        .insert_header(("Authorization", format!("Bearer {}", cookie.value())))
        .to_request();
    let verified: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(verified, signed_up);
}

#[actix_web::test]
async fn test_verify_with_tampered_token() {
    let app = app().await;

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/verify")
        .cookie(Cookie::new("session", "not.a.jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "status": 500, "message": "invalid token" }));
}

#[actix_web::test]
async fn test_verify_with_expired_token() {
    let app = app().await;
    let (_, signed_up) = signup(&app, "ben@ben.com").await;
    let user_id: i64 = signed_up["id"].as_str().unwrap().parse().unwrap();

    // Same secret and issuer as the app, but a lifetime already over.
    let stale = JwtTokenService::new(JwtConfig {
        secret: "test-secret".to_string(),
        expiration_hours: -3,
        ..JwtConfig::default()
    });
    let token = stale.issue(user_id).unwrap();

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/verify")
        .cookie(Cookie::new("session", token))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "status": 500, "message": "jwt expired" }));
}

#[actix_web::test]
async fn test_logout_clears_cookie() {
    let app = app().await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/logout")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let cookie = session_of(&resp);
    assert_eq!(cookie.value(), "");
}

#[actix_web::test]
async fn test_create_post_as_signed_in_user() {
    let app = app().await;
    let (cookie, _) = signup(&app, "ben@ben.com").await;

    let submitted = json!({
        "photoUrl": "aurlto the photo",
        "caption": "I love cranberry",
        "tags": ["spicy", "hot", "tasty"],
    });
    let req = test::TestRequest::post()
        .uri("/api/v1/posts")
        .cookie(cookie)
        .set_json(&submitted)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert!(body["id"].is_string());
    assert!(body["userId"].is_number());
    assert_eq!(body["photoUrl"], submitted["photoUrl"]);
    assert_eq!(body["caption"], submitted["caption"]);
    assert_eq!(body["tags"], submitted["tags"]);
    assert_eq!(body.as_object().unwrap().len(), 5);
}

#[actix_web::test]
async fn test_create_post_without_session() {
    let app = app().await;

    let req = test::TestRequest::post()
        .uri("/api/v1/posts")
        .set_json(json!({
            "caption": "I love cranberry",
            "tags": ["spicy", "hot", "tasty"],
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "status": 500, "message": "jwt must be provided" }));
}

#[actix_web::test]
async fn test_list_and_get_posts() {
    let app = app().await;
    let (cookie, _) = signup(&app, "ben@ben.com").await;
    for caption in ["one", "two", "three"] {
        create_post(&app, &cookie, caption).await;
    }

    let req = test::TestRequest::get().uri("/api/v1/posts").to_request();
    let posts: Value = test::call_and_read_body_json(&app, req).await;
    let posts = posts.as_array().unwrap();
    assert_eq!(posts.len(), 3);

    let first = &posts[0];
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/posts/{}", first["id"].as_str().unwrap()))
        .to_request();
    let detail: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        detail,
        json!({
            "id": first["id"],
            "caption": first["caption"],
            "tags": first["tags"],
            "username": "ben@ben.com",
        })
    );
}

#[actix_web::test]
async fn test_get_unknown_post() {
    let app = app().await;

    let req = test::TestRequest::get().uri("/api/v1/posts/999").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 404);
}

#[actix_web::test]
async fn test_owner_patches_caption() {
    let app = app().await;
    let (cookie, _) = signup(&app, "ben@ben.com").await;
    let created = create_post(&app, &cookie, "beginning caption").await;

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/posts/{}", created["id"].as_str().unwrap()))
        .cookie(cookie)
        .set_json(json!({
            "userId": created["userId"],
            "caption": "thought it was cute, might delete later",
        }))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(
        updated,
        json!({
            "id": created["id"],
            "userId": created["userId"],
            "photoUrl": created["photoUrl"],
            "caption": "thought it was cute, might delete later",
            "tags": created["tags"],
        })
    );
}

#[actix_web::test]
async fn test_non_owner_cannot_patch_or_delete() {
    let app = app().await;
    let (ben, _) = signup(&app, "ben@ben.com").await;
    let (eve, _) = signup(&app, "eve@eve.com").await;
    let created = create_post(&app, &ben, "mine").await;
    let uri = format!("/api/v1/posts/{}", created["id"].as_str().unwrap());

    let req = test::TestRequest::patch()
        .uri(&uri)
        .cookie(eve.clone())
        .set_json(json!({ "caption": "stolen" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete()
        .uri(&uri)
        .cookie(eve)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Claiming someone else's id in the body is rejected too.
    let req = test::TestRequest::patch()
        .uri(&uri)
        .cookie(ben)
        .set_json(json!({ "userId": created["userId"].as_i64().unwrap() + 1, "caption": "x" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get().uri(&uri).to_request();
    let detail: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(detail["caption"], "mine");
}

#[actix_web::test]
async fn test_unknown_post_is_404_even_with_foreign_user_id() {
    let app = app().await;
    let (cookie, signed_up) = signup(&app, "ben@ben.com").await;
    let other_id = signed_up["id"].as_str().unwrap().parse::<i64>().unwrap() + 1;

    let req = test::TestRequest::patch()
        .uri("/api/v1/posts/999")
        .cookie(cookie.clone())
        .set_json(json!({ "userId": other_id, "caption": "x" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::delete()
        .uri("/api/v1/posts/999")
        .cookie(cookie)
        .set_json(json!({ "userId": other_id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_owner_deletes_post() {
    let app = app().await;
    let (cookie, _) = signup(&app, "ben@ben.com").await;
    let created = create_post(&app, &cookie, "beginning caption").await;
    let uri = format!("/api/v1/posts/{}", created["id"].as_str().unwrap());

    let req = test::TestRequest::delete()
        .uri(&uri)
        .cookie(cookie)
        .set_json(json!({ "userId": created["userId"] }))
        .to_request();
    let deleted: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(deleted, created);

    let req = test::TestRequest::get().uri(&uri).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_popular_posts() {
    let app = app().await;
    let (cookie, _) = signup(&app, "ben@ben.com").await;

    let mut ids = Vec::new();
    for i in 0..12 {
        let post = create_post(&app, &cookie, &format!("post {i}")).await;
        ids.push(post["id"].as_str().unwrap().parse::<i64>().unwrap());
    }
    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/api/v1/comments")
            .cookie(cookie.clone())
            .set_json(json!({ "postId": ids[5], "comment": "so good" }))
            .to_request();
        let comment: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(comment["postId"], ids[5]);
    }

    let req = test::TestRequest::get()
        .uri("/api/v1/posts/popular")
        .to_request();
    let popular: Value = test::call_and_read_body_json(&app, req).await;
    let popular = popular.as_array().unwrap();

    assert_eq!(popular.len(), 10);
    assert_eq!(popular[0]["id"], ids[5].to_string());
    assert_eq!(popular[0]["commentCount"], 2);
    assert!(
        popular
            .windows(2)
            .all(|w| w[0]["commentCount"].as_i64() >= w[1]["commentCount"].as_i64())
    );
}

#[actix_web::test]
async fn test_comment_lifecycle() {
    let app = app().await;
    let (ben, _) = signup(&app, "ben@ben.com").await;
    let (eve, _) = signup(&app, "eve@eve.com").await;
    let post = create_post(&app, &ben, "comment on me").await;
    let post_id = post["id"].as_str().unwrap().parse::<i64>().unwrap();

    let req = test::TestRequest::post()
        .uri("/api/v1/comments")
        .cookie(eve.clone())
        .set_json(json!({ "postId": post_id, "comment": "so cute" }))
        .to_request();
    let comment: Value = test::call_and_read_body_json(&app, req).await;
    let comment_uri = format!("/api/v1/comments/{}", comment["id"].as_str().unwrap());

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/posts/{post_id}/comments"))
        .to_request();
    let comments: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(comments, json!([comment.clone()]));

    let req = test::TestRequest::delete()
        .uri(&comment_uri)
        .cookie(ben)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete()
        .uri(&comment_uri)
        .cookie(eve)
        .to_request();
    let deleted: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(deleted, comment);
}

#[actix_web::test]
async fn test_malformed_json_is_400() {
    let app = app().await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/signup")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 400);
}

#[actix_web::test]
async fn test_health() {
    let app = app().await;

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "ok");
}
