//! Application state - shared across all handlers.

use std::sync::Arc;

use tardygram_core::ports::{CommentRepository, PostRepository, UserRepository};
use tardygram_core::services::{AuthService, CommentService, PostService};
use tardygram_infra::{Argon2PasswordService, InMemoryStore, JwtConfig, JwtTokenService};

#[cfg(feature = "postgres")]
use tardygram_infra::database::DbErr;

use crate::config::{DatabaseSettings, SessionConfig};

/// The three stores the services run on.
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            users: store.clone(),
            posts: store.clone(),
            comments: store,
        }
    }

    /// PostgreSQL when configured and reachable, the in-memory store otherwise.
    pub async fn from_settings(database: Option<&DatabaseSettings>) -> Self {
        let Some(settings) = database else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Self::in_memory();
        };

        Self::connect_or_fallback(settings).await
    }

    #[cfg(feature = "postgres")]
    async fn connect_or_fallback(settings: &DatabaseSettings) -> Self {
        match Self::postgres(settings).await {
            Ok(repos) => repos,
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                Self::in_memory()
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn connect_or_fallback(_settings: &DatabaseSettings) -> Self {
        tracing::info!("Running without postgres feature - using in-memory store");
        Self::in_memory()
    }

    #[cfg(feature = "postgres")]
    async fn postgres(settings: &DatabaseSettings) -> Result<Self, DbErr> {
        use tardygram_infra::database::{DatabaseConfig, connect, postgres_repositories};

        let db = connect(&DatabaseConfig {
            url: settings.url.clone(),
            max_connections: settings.max_connections,
            min_connections: settings.min_connections,
            connect_timeout: settings.connect_timeout,
        })
        .await?;

        let (users, posts, comments) = postgres_repositories(db);
        Ok(Self {
            users: Arc::new(users),
            posts: Arc::new(posts),
            comments: Arc::new(comments),
        })
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub posts: Arc<PostService>,
    pub comments: Arc<CommentService>,
    pub session: SessionConfig,
}

impl AppState {
    /// Wire the services over the given stores.
    pub fn new(repos: Repositories, jwt: JwtConfig, session: SessionConfig) -> Self {
        let tokens = Arc::new(JwtTokenService::new(jwt));
        let passwords = Arc::new(Argon2PasswordService::new());

        let auth = AuthService::new(repos.users.clone(), tokens, passwords);
        let posts = PostService::new(repos.posts.clone(), repos.users);
        let comments = CommentService::new(repos.comments, repos.posts);

        tracing::info!("Application state initialized");

        Self {
            auth: Arc::new(auth),
            posts: Arc::new(posts),
            comments: Arc::new(comments),
            session,
        }
    }
}
