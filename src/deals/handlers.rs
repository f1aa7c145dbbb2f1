use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::{info, instrument};

use super::{
    dto::{DealCreate, DealUpdate},
    repo_types::Deal,
};
use crate::{
    auth::extractors::AuthUser,
    error::{AppError, AppResult},
    state::AppState,
};

const NOT_FOUND: &str = "Deal not found";

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: String,
}

pub fn deal_routes() -> Router<AppState> {
    Router::new()
        .route("/deals/", get(list_deals).post(create_deal))
        .route(
            "/deals/:id",
            get(get_deal).put(update_deal).delete(delete_deal),
        )
}

/// Fails with 400 when `investor_id` names no investor.
#[instrument(skip(state, payload))]
pub async fn create_deal(
    State(state): State<AppState>,
    Json(payload): Json<DealCreate>,
) -> AppResult<Json<Deal>> {
    let deal = state.deals.create(payload).await?;
    info!(deal_id = deal.id, investor_id = ?deal.investor_id, "deal created");
    Ok(Json(deal))
}

#[instrument(skip_all)]
pub async fn list_deals(State(state): State<AppState>, _user: AuthUser) -> AppResult<Json<Vec<Deal>>> {
    Ok(Json(state.deals.list().await?))
}

#[instrument(skip(state, _user))]
pub async fn get_deal(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Deal>> {
    state
        .deals
        .get(id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound(NOT_FOUND))
}

#[instrument(skip(state, payload))]
pub async fn update_deal(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<DealUpdate>,
) -> AppResult<Json<Deal>> {
    let deal = state
        .deals
        .update(id, payload)
        .await?
        .ok_or(AppError::NotFound(NOT_FOUND))?;
    info!(deal_id = deal.id, "deal updated");
    Ok(Json(deal))
}

#[instrument(skip(state))]
pub async fn delete_deal(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<DeletedResponse>> {
    if !state.deals.delete(id).await? {
        return Err(AppError::NotFound(NOT_FOUND));
    }
    info!(deal_id = id, "deal deleted");
    Ok(Json(DeletedResponse {
        message: "Deal deleted successfully".into(),
    }))
}
