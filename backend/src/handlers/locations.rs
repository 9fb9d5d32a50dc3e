//! HTTP handlers for the location registry

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::error::AppResult;
use crate::models::Location;
use crate::services::location::{CreateLocationInput, LocationSummary, UpdateLocationInput};
use crate::services::LocationService;
use crate::AppState;

/// List locations with item counts
pub async fn list_locations(State(state): State<AppState>) -> AppResult<Json<Vec<LocationSummary>>> {
    let service = LocationService::new(state.db);
    Ok(Json(service.list().await?))
}

/// Create a location
pub async fn create_location(
    State(state): State<AppState>,
    Json(input): Json<CreateLocationInput>,
) -> AppResult<(StatusCode, Json<Location>)> {
    let service = LocationService::new(state.db);
    let location = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(location)))
}

pub async fn get_location(
    State(state): State<AppState>,
    Path(location_id): Path<i64>,
) -> AppResult<Json<Location>> {
    let service = LocationService::new(state.db);
    Ok(Json(service.get(location_id).await?))
}

pub async fn update_location(
    State(state): State<AppState>,
    Path(location_id): Path<i64>,
    Json(input): Json<UpdateLocationInput>,
) -> AppResult<Json<Location>> {
    let service = LocationService::new(state.db);
    Ok(Json(service.update(location_id, input).await?))
}

/// Delete a location; its items are kept without a location
pub async fn delete_location(
    State(state): State<AppState>,
    Path(location_id): Path<i64>,
) -> AppResult<StatusCode> {
    let service = LocationService::new(state.db);
    service.delete(location_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
