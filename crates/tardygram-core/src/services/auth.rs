//! Signup, login and token verification.

use std::sync::{Arc, OnceLock};

use crate::domain::{NewUser, User, mask_email};
use crate::error::{DomainError, RepoError};
use crate::ports::{AuthError, PasswordService, TokenService, UserRepository};

const MIN_PASSWORD_LEN: usize = 8;

/// An authenticated user and the token proving it.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: String,
}

/// Authentication service over the credential store.
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenService>,
    passwords: Arc<dyn PasswordService>,
    // Checked in place of a stored hash when the email is unknown.
    decoy_hash: OnceLock<Option<String>>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
    ) -> Self {
        Self {
            users,
            tokens,
            passwords,
            decoy_hash: OnceLock::new(),
        }
    }

    /// Register a new account and open a session for it.
    pub async fn signup(&self, email: &str, password: &str) -> Result<Session, DomainError> {
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::Validation("Invalid email address".to_string()));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(DomainError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        if self.users.find_by_email(email).await?.is_some() {
            return Err(DomainError::DuplicateEmail);
        }

        let password_hash = self.passwords.hash(password)?;
        let user = match self
            .users
            .insert(NewUser::new(email.to_string(), password_hash))
            .await
        {
            Ok(user) => user,
            // Lost a race against a concurrent signup for the same email.
            Err(RepoError::Constraint(_)) => return Err(DomainError::DuplicateEmail),
            Err(e) => return Err(e.into()),
        };

        let token = self.tokens.issue(user.id)?;
        tracing::info!(
            user_id = user.id,
            email = %mask_email(&user.email),
            "User signed up"
        );

        Ok(Session { user, token })
    }

    /// Check credentials and open a session.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, DomainError> {
        let Some(user) = self.users.find_by_email(email).await? else {
            tracing::debug!(email = %mask_email(email), "Login for unknown email");
            self.verify_decoy(password);
            return Err(AuthError::InvalidCredentials.into());
        };

        if !self.passwords.verify(password, &user.password_hash)? {
            tracing::debug!(user_id = user.id, "Login with wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = self.tokens.issue(user.id)?;
        tracing::info!(user_id = user.id, "User logged in");

        Ok(Session { user, token })
    }

    /// Resolve a session token to the user it proves.
    pub async fn verify(&self, token: Option<&str>) -> Result<User, DomainError> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;
        let claims = self.tokens.verify(token)?;

        self.users
            .find_by_id(claims.user_id)
            .await?
            .ok_or_else(|| {
                tracing::warn!(user_id = claims.user_id, "Token for a user that no longer exists");
                DomainError::from(AuthError::InvalidToken("unknown user".to_string()))
            })
    }

    pub fn token_lifetime_seconds(&self) -> i64 {
        self.tokens.expiration_seconds()
    }

    fn verify_decoy(&self, password: &str) {
        let decoy = self
            .decoy_hash
            .get_or_init(|| self.passwords.hash("tardygram-decoy-password").ok());
        if let Some(hash) = decoy {
            let _ = self.passwords.verify(password, hash);
        }
    }
}
