//! Authentication ports.

/// Claims carried by a session token.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub user_id: i64,
    pub exp: i64,
}

/// Issues and verifies signed, time-bound identity tokens.
pub trait TokenService: Send + Sync {
    /// Issue a token proving `user_id`.
    fn issue(&self, user_id: i64) -> Result<String, AuthError>;

    /// Check signature and expiry and decode the claims.
    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Lifetime of an issued token.
    fn expiration_seconds(&self) -> i64;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("jwt must be provided")]
    MissingToken,

    #[error("invalid token")]
    InvalidToken(String),

    #[error("jwt expired")]
    TokenExpired,

    #[error("Invalid email/password")]
    InvalidCredentials,

    #[error("Hashing error: {0}")]
    HashingError(String),
}
