use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use super::{dto::PropertyCreate, repo_types::Property};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

pub fn property_routes() -> Router<AppState> {
    Router::new()
        .route("/properties/", get(list_properties).post(create_property))
        .route("/properties/:id", get(get_property))
}

#[instrument(skip(state, payload))]
pub async fn create_property(
    State(state): State<AppState>,
    Json(payload): Json<PropertyCreate>,
) -> AppResult<Json<Property>> {
    let property = state.properties.create(payload).await?;
    info!(property_id = property.id, "property created");
    Ok(Json(property))
}

#[instrument(skip(state))]
pub async fn list_properties(State(state): State<AppState>) -> AppResult<Json<Vec<Property>>> {
    Ok(Json(state.properties.list().await?))
}

#[instrument(skip(state))]
pub async fn get_property(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Property>> {
    state
        .properties
        .get(id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Property not found"))
}
