use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::{debug, warn};

use super::{jwt::TokenService, repo::UserRepo, repo_types::User};
use crate::{error::AppError, state::AppState};

/// Reads `Authorization: Bearer <token>`. The scheme is case-insensitive.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::MissingCredentials)?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or(AppError::MissingCredentials)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AppError::MissingCredentials);
    }
    Ok(token)
}

/// Resolves the request to a stored user.
///
/// Token failures and an unknown subject all come back as `Unauthorized` so
/// the client cannot tell which check failed; the precise reason is logged.
/// Store failures are passed through unchanged.
pub async fn authenticate(
    headers: &HeaderMap,
    tokens: &TokenService,
    users: &dyn UserRepo,
) -> Result<User, AppError> {
    let token = bearer_token(headers)?;

    let claims = tokens.validate(token).map_err(|e| {
        warn!(reason = %e, "bearer token rejected");
        AppError::Unauthorized
    })?;

    match users.find_by_username(&claims.sub).await? {
        Some(user) => {
            debug!(user_id = user.id, "request authenticated");
            Ok(user)
        }
        None => {
            warn!(reason = %AppError::UnknownIdentity, subject = %claims.sub, "bearer token rejected");
            Err(AppError::Unauthorized)
        }
    }
}

/// Authenticated principal for protected handlers.
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(&parts.headers, &state.tokens, state.users.as_ref()).await?;
        Ok(AuthUser(user))
    }
}
