//! HTTP handlers and route configuration.

mod auth;
mod comments;
mod health;
mod posts;

use actix_web::{error, web};

use crate::middleware::error::AppError;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        error::Error::from(AppError::BadRequest(err.to_string()))
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        error::Error::from(AppError::NotFound(err.to_string()))
    }))
    .service(
        web::scope("/api/v1")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/signup", web::post().to(auth::signup))
                    .route("/login", web::post().to(auth::login))
                    .route("/verify", web::get().to(auth::verify))
                    .route("/logout", web::post().to(auth::logout)),
            )
            // Post routes; /popular must precede /{id}
            .service(
                web::scope("/posts")
                    .route("", web::post().to(posts::create))
                    .route("", web::get().to(posts::list))
                    .route("/popular", web::get().to(posts::popular))
                    .route("/{id}", web::get().to(posts::get))
                    .route("/{id}", web::patch().to(posts::update))
                    .route("/{id}", web::delete().to(posts::delete))
                    .route("/{id}/comments", web::get().to(comments::list_for_post)),
            )
            .service(
                web::scope("/comments")
                    .route("", web::post().to(comments::create))
                    .route("/{id}", web::delete().to(comments::delete)),
            ),
    );
}
