use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    // ===== Token Service =====
    #[error("malformed token")]
    MalformedToken,

    #[error("token expired")]
    ExpiredToken,

    // ===== Authentication Guard =====
    #[error("missing bearer credentials")]
    MissingCredentials,

    #[error("token subject does not resolve to a user")]
    UnknownIdentity,

    #[error("unauthorized")]
    Unauthorized,

    // ===== Registration & Login =====
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("email already registered")]
    DuplicateEmail,

    #[error("username already registered")]
    DuplicateUsername,

    // ===== Resources =====
    #[error("{0}")]
    NotFound(&'static str),

    #[error("validation error: {0}")]
    Validation(String),

    // ===== Infrastructure =====
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MalformedToken
            | AppError::ExpiredToken
            | AppError::MissingCredentials
            | AppError::UnknownIdentity
            | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::InvalidCredentials
            | AppError::DuplicateEmail
            | AppError::DuplicateUsername
            | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent to the client. Never carries internal details.
    pub fn user_message(&self) -> String {
        match self {
            AppError::ExpiredToken => "Token expired".into(),
            AppError::MalformedToken | AppError::UnknownIdentity | AppError::Unauthorized => {
                "Invalid or expired token".into()
            }
            AppError::MissingCredentials => "Not authenticated".into(),
            AppError::InvalidCredentials => "Incorrect username or password".into(),
            AppError::DuplicateEmail => "Email already registered".into(),
            AppError::DuplicateUsername => "Username already registered".into(),
            AppError::NotFound(what) => (*what).into(),
            AppError::Validation(msg) => msg.clone(),
            AppError::Database(_) | AppError::Internal(_) => "Internal server error".into(),
        }
    }

    fn log(&self) {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, status = %status.as_u16(), "server error");
        } else if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(error = %self, "authentication failed");
        } else {
            tracing::debug!(error = %self, status = %status.as_u16(), "client error");
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status_code();
        let mut res = (status, Json(json!({ "detail": self.user_message() }))).into_response();
        if status == StatusCode::UNAUTHORIZED {
            res.headers_mut().insert(
                axum::http::header::WWW_AUTHENTICATE,
                axum::http::HeaderValue::from_static("Bearer"),
            );
        }
        res
    }
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

/// Unique constraints on `users`, as named by Postgres for the inline
/// `UNIQUE` columns in `migrations/0001_init.sql`.
const USERS_EMAIL_KEY: &str = "users_email_key";
const USERS_USERNAME_KEY: &str = "users_username_key";

/// Maps a Postgres unique violation on `users` to the matching duplicate kind.
pub(crate) fn map_user_unique_violation(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            if let Some(dup) = duplicate_for_constraint(db_err.constraint()) {
                return dup;
            }
        }
    }
    AppError::Database(err)
}

fn duplicate_for_constraint(constraint: Option<&str>) -> Option<AppError> {
    match constraint? {
        USERS_EMAIL_KEY => Some(AppError::DuplicateEmail),
        USERS_USERNAME_KEY => Some(AppError::DuplicateUsername),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_are_401() {
        for e in [
            AppError::MalformedToken,
            AppError::ExpiredToken,
            AppError::MissingCredentials,
            AppError::UnknownIdentity,
            AppError::Unauthorized,
        ] {
            assert_eq!(e.status_code(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn guard_kinds_share_one_message() {
        assert_eq!(
            AppError::UnknownIdentity.user_message(),
            AppError::MalformedToken.user_message()
        );
        assert_eq!(AppError::Unauthorized.user_message(), "Invalid or expired token");
    }

    #[test]
    fn internal_errors_hide_details() {
        let e = AppError::Internal(anyhow::anyhow!("db password is hunter2"));
        assert_eq!(e.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.user_message(), "Internal server error");
    }

    #[test]
    fn not_found_is_404_with_message() {
        let e = AppError::NotFound("Deal not found");
        assert_eq!(e.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(e.user_message(), "Deal not found");
    }

    #[test]
    fn user_constraints_map_to_duplicate_kinds() {
        assert!(matches!(
            duplicate_for_constraint(Some("users_email_key")),
            Some(AppError::DuplicateEmail)
        ));
        assert!(matches!(
            duplicate_for_constraint(Some("users_username_key")),
            Some(AppError::DuplicateUsername)
        ));
        assert!(duplicate_for_constraint(Some("investors_email_key")).is_none());
        assert!(duplicate_for_constraint(Some("users_pkey")).is_none());
        assert!(duplicate_for_constraint(None).is_none());
    }

    #[test]
    fn constraint_names_match_migration() {
        let sql = include_str!("../migrations/0001_init.sql");
        let users = &sql[sql.find("CREATE TABLE IF NOT EXISTS users (").unwrap()..];
        let users = &users[..users.find(");").unwrap()];
        assert!(users.lines().any(|l| l.trim_start().starts_with("email") && l.contains("UNIQUE")));
        assert!(users.lines().any(|l| l.trim_start().starts_with("username") && l.contains("UNIQUE")));
    }

    #[test]
    fn non_database_errors_pass_through() {
        assert!(matches!(
            map_user_unique_violation(sqlx::Error::RowNotFound),
            AppError::Database(sqlx::Error::RowNotFound)
        ));
    }
}
