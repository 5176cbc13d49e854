//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use tardygram_infra::JwtConfig;

/// Pool settings, present only when `DATABASE_URL` is set.
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
}

/// How the session token travels in a cookie.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "session".to_string(),
            secure: false,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseSettings>,
    pub jwt: JwtConfig,
    pub session: SessionConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseSettings {
            url,
            max_connections: parse_var("DB_MAX_CONNECTIONS").unwrap_or(100),
            min_connections: parse_var("DB_MIN_CONNECTIONS").unwrap_or(10),
            connect_timeout: Duration::from_secs(
                parse_var("DB_CONNECT_TIMEOUT_SECS").unwrap_or(10),
            ),
        });

        let session_defaults = SessionConfig::default();
        let session = SessionConfig {
            cookie_name: env::var("SESSION_COOKIE").unwrap_or(session_defaults.cookie_name),
            secure: env::var("SESSION_COOKIE_SECURE")
                .map(|v| is_truthy(&v))
                .unwrap_or(session_defaults.secure),
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT").unwrap_or(8080),
            database,
            jwt: JwtConfig::from_env(),
            session,
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
