use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    auth::{
        dto::{RegisterRequest, TokenResponse, TOKEN_TYPE},
        repo_types::{NewUser, User, DEFAULT_ROLE},
    },
    error::{AppError, AppResult},
    state::AppState,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Creates a user with a hashed password. The email check runs before the
/// (slow) hash; the store still enforces uniqueness on insert.
pub async fn register(state: &AppState, mut req: RegisterRequest) -> AppResult<User> {
    req.email = req.email.trim().to_string();

    if !is_valid_email(&req.email) {
        warn!(email = %req.email, "invalid email");
        return Err(AppError::Validation("Invalid email".into()));
    }

    if state.users.find_by_email(&req.email).await?.is_some() {
        warn!(email = %req.email, "email already registered");
        return Err(AppError::DuplicateEmail);
    }
    if state.users.find_by_username(&req.username).await?.is_some() {
        warn!(username = %req.username, "username already registered");
        return Err(AppError::DuplicateUsername);
    }

    let password_hash = state.hasher.hash(&req.password)?;
    let user = state
        .users
        .create(NewUser {
            username: req.username,
            email: req.email,
            password_hash,
            role: DEFAULT_ROLE.to_string(),
        })
        .await?;

    info!(user_id = user.id, username = %user.username, "user registered");
    Ok(user)
}

/// Unknown username and wrong password produce the same error.
pub async fn login(state: &AppState, username: &str, password: &str) -> AppResult<TokenResponse> {
    let user = match state.users.find_by_username(username).await? {
        Some(u) => u,
        None => {
            warn!(username = %username, "login unknown username");
            return Err(AppError::InvalidCredentials);
        }
    };

    if !state.hasher.verify(password, &user.password_hash) {
        warn!(user_id = user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let access_token = state.tokens.issue(&user.username)?;
    info!(user_id = user.id, username = %user.username, "user logged in");
    Ok(TokenResponse {
        access_token,
        token_type: TOKEN_TYPE.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn email_syntax() {
        assert!(is_valid_email("alice@x.com"));
        assert!(!is_valid_email("alice"));
        assert!(!is_valid_email("alice@x"));
        assert!(!is_valid_email("a b@x.com"));
    }

    #[tokio::test]
    async fn register_stores_hash_not_plaintext() {
        let state = AppState::fake();
        let user = register(&state, req("alice", "alice@x.com", "secret123")).await.unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.role, "user");
        assert_ne!(user.password_hash, "secret123");
        assert!(state.hasher.verify("secret123", &user.password_hash));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_and_first_user_kept() {
        let state = AppState::fake();
        let first = register(&state, req("alice", "alice@x.com", "secret123")).await.unwrap();
        let err = register(&state, req("alicia", "alice@x.com", "other-pass")).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateEmail));

        let stored = state.users.find_by_email("alice@x.com").await.unwrap();
        assert_eq!(stored, Some(first));
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let state = AppState::fake();
        register(&state, req("alice", "alice@x.com", "secret123")).await.unwrap();
        let err = register(&state, req("alice", "alice2@x.com", "secret123")).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateUsername));
    }

    #[tokio::test]
    async fn invalid_email_is_rejected() {
        let state = AppState::fake();
        let err = register(&state, req("alice", "nope", "secret123")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn login_issues_token_for_subject() {
        let state = AppState::fake();
        register(&state, req("alice", "alice@x.com", "secret123")).await.unwrap();
        let res = login(&state, "alice", "secret123").await.unwrap();
        assert_eq!(res.token_type, "bearer");
        let claims = state.tokens.validate(&res.access_token).unwrap();
        assert_eq!(claims.sub, "alice");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_the_same() {
        let state = AppState::fake();
        register(&state, req("alice", "alice@x.com", "secret123")).await.unwrap();

        let wrong_pw = login(&state, "alice", "nope").await.unwrap_err();
        let no_user = login(&state, "bob", "secret123").await.unwrap_err();

        assert!(matches!(wrong_pw, AppError::InvalidCredentials));
        assert!(matches!(no_user, AppError::InvalidCredentials));
        assert_eq!(wrong_pw.status_code(), no_user.status_code());
        assert_eq!(wrong_pw.user_message(), no_user.user_message());
    }
}
