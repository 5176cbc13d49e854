//! Session identity extractor and cookie helpers.

use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use std::future::Future;
use std::pin::Pin;

use tardygram_core::domain::User;
use tardygram_core::services::Actor;

use crate::config::SessionConfig;
use crate::middleware::error::AppError;
use crate::state::AppState;

/// Authenticated user identity extractor.
///
/// Reads the session token from the session cookie, falling back to an
/// `Authorization: Bearer` header, and resolves it to a stored user.
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, user {}!", identity.user_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: i64,
    user: User,
}

impl Identity {
    pub fn user(&self) -> &User {
        &self.user
    }

    /// The caller of a mutation, carrying any `userId` the body named.
    pub fn actor(&self, claimed_id: Option<i64>) -> Actor {
        Actor::new(self.user_id).claiming(claimed_id)
    }
}

impl From<User> for Identity {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            user,
        }
    }
}

/// Pull the raw token out of the request, if any.
pub fn session_token(req: &HttpRequest, session: &SessionConfig) -> Option<String> {
    if let Some(cookie) = req.cookie(&session.cookie_name) {
        return Some(cookie.value().to_string());
    }

    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Cookie carrying a freshly issued token, living as long as the token does.
pub fn session_cookie(
    session: &SessionConfig,
    token: String,
    max_age_secs: i64,
) -> Cookie<'static> {
    Cookie::build(session.cookie_name.clone(), token)
        .path("/")
        .http_only(true)
        .secure(session.secure)
        .same_site(SameSite::Strict)
        .max_age(Duration::seconds(max_age_secs))
        .finish()
}

/// Expired cookie that makes the client drop its session.
pub fn cleared_session_cookie(session: &SessionConfig) -> Cookie<'static> {
    let mut cookie = session_cookie(session, String::new(), 0);
    cookie.make_removal();
    cookie
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
            tracing::error!("AppState not found in app data");
            return Box::pin(async {
                Err(AppError::Internal("Server configuration error".to_string()))
            });
        };
        let token = session_token(req, &state.session);

        Box::pin(async move {
            let user = state.auth.verify(token.as_deref()).await?;
            Ok(Identity::from(user))
        })
    }
}
