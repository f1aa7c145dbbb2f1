use axum::{
    extract::State,
    routing::{get, post},
    Form, Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginForm, MeResponse, ProtectedResponse, PublicUser, RegisterRequest, TokenResponse},
        extractors::AuthUser,
        services,
    },
    error::AppResult,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register/", post(register))
        .route("/token/", post(login))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/protected/", get(protected))
        .route("/me/", get(get_me))
}

#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<PublicUser>> {
    let user = services::register(&state, payload).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> AppResult<Json<TokenResponse>> {
    let token = services::login(&state, &form.username, &form.password).await?;
    Ok(Json(token))
}

#[instrument(skip_all, fields(user_id = user.id))]
pub async fn protected(AuthUser(user): AuthUser) -> Json<ProtectedResponse> {
    Json(ProtectedResponse {
        message: "You are authorized".into(),
        user: user.username,
    })
}

#[instrument(skip_all, fields(user_id = user.id))]
pub async fn get_me(AuthUser(user): AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        role: user.role,
    })
}
