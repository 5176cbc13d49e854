//! Authentication handlers.

use actix_web::{HttpResponse, web};

use tardygram_core::domain::User;
use tardygram_core::services::Session;
use tardygram_shared::dto::{CredentialsRequest, UserResponse};

use crate::middleware::auth::{Identity, cleared_session_cookie, session_cookie};
use crate::middleware::error::AppResult;
use crate::state::AppState;

fn user_response(user: &User) -> UserResponse {
    UserResponse {
        id: user.id.to_string(),
        email: user.email.clone(),
    }
}

/// Respond with the public identity and hand the token over in the session cookie.
fn session_response(state: &AppState, session: Session) -> HttpResponse {
    let cookie = session_cookie(
        &state.session,
        session.token,
        state.auth.token_lifetime_seconds(),
    );

    HttpResponse::Ok()
        .cookie(cookie)
        .json(user_response(&session.user))
}

/// POST /api/v1/auth/signup
pub async fn signup(
    state: web::Data<AppState>,
    body: web::Json<CredentialsRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let session = state.auth.signup(&req.email, &req.password).await?;

    Ok(session_response(&state, session))
}

/// POST /api/v1/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<CredentialsRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let session = state.auth.login(&req.email, &req.password).await?;

    Ok(session_response(&state, session))
}

/// GET /api/v1/auth/verify
pub async fn verify(identity: Identity) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(user_response(identity.user())))
}

/// POST /api/v1/auth/logout
pub async fn logout(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::NoContent()
        .cookie(cleared_session_cookie(&state.session))
        .finish()
}
