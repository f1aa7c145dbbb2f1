use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use super::{dto::InvestorCreate, repo_types::Investor};
use crate::{
    auth::extractors::AuthUser,
    deals::repo_types::Deal,
    error::{AppError, AppResult},
    state::AppState,
};

pub fn investor_routes() -> Router<AppState> {
    Router::new()
        .route("/investors/", get(list_investors).post(create_investor))
        .route("/investors/:id", get(get_investor))
        .route("/investors/:id/deals", get(list_investor_deals))
}

#[instrument(skip(state, payload))]
pub async fn create_investor(
    State(state): State<AppState>,
    Json(payload): Json<InvestorCreate>,
) -> AppResult<Json<Investor>> {
    let investor = state.investors.create(payload).await?;
    info!(investor_id = investor.id, "investor created");
    Ok(Json(investor))
}

#[instrument(skip_all)]
pub async fn list_investors(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<Vec<Investor>>> {
    Ok(Json(state.investors.list().await?))
}

#[instrument(skip(state, _user))]
pub async fn get_investor(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Investor>> {
    state
        .investors
        .get(id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Investor not found"))
}

#[instrument(skip(state, _user))]
pub async fn list_investor_deals(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Deal>>> {
    if state.investors.get(id).await?.is_none() {
        return Err(AppError::NotFound("Investor not found"));
    }
    Ok(Json(state.deals.list_by_investor(id).await?))
}
