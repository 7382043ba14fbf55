use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::locations::dtos::{
    CaptureLocationDto, CityDto, LocationSearchDto, ReverseCityQuery, SearchLocationsQuery,
};
use crate::features::locations::models::CapturedLocation;
use crate::features::locations::services::{LocationService, ReportedFix};
use crate::features::map::services::MapService;
use crate::features::posts::models::Coordinates;
use crate::shared::types::ApiResponse;

/// Shared state for the location endpoints
#[derive(Clone)]
pub struct LocationState {
    pub locations: Arc<LocationService>,
    pub map: Arc<MapService>,
}

/// Search places by name for the form's location picker
#[utoipa::path(
    get,
    path = "/api/locations/search",
    params(SearchLocationsQuery),
    responses(
        (status = 200, description = "Search outcome with matching places", body = ApiResponse<LocationSearchDto>),
    ),
    tag = "locations"
)]
pub async fn search_locations(
    State(state): State<LocationState>,
    Query(query): Query<SearchLocationsQuery>,
) -> Json<ApiResponse<LocationSearchDto>> {
    let session = query
        .session
        .unwrap_or_else(|| Uuid::now_v7().to_string());
    let outcome = state.locations.search(&session, &query.q).await;
    Json(ApiResponse::success(Some(outcome.into()), None, None))
}

/// City name at the given coordinates
#[utoipa::path(
    get,
    path = "/api/locations/reverse",
    params(ReverseCityQuery),
    responses(
        (status = 200, description = "City name, empty when unknown", body = ApiResponse<CityDto>),
        (status = 400, description = "Coordinates out of range")
    ),
    tag = "locations"
)]
pub async fn reverse_city(
    State(state): State<LocationState>,
    Query(query): Query<ReverseCityQuery>,
) -> Result<Json<ApiResponse<CityDto>>> {
    let coordinates = Coordinates::new(query.lat, query.lon)
        .ok_or_else(|| AppError::BadRequest("Coordinates out of range".to_string()))?;
    let city = state.locations.reverse_city(coordinates).await;
    Ok(Json(ApiResponse::success(Some(CityDto { city }), None, None)))
}

/// Capture the viewer's current location, falling back to the city center
#[utoipa::path(
    post,
    path = "/api/locations/current",
    request_body = CaptureLocationDto,
    responses(
        (status = 200, description = "Captured or fallback location", body = ApiResponse<CapturedLocation>),
        (status = 404, description = "Map session not found")
    ),
    tag = "locations"
)]
pub async fn capture_current(
    State(state): State<LocationState>,
    AppJson(dto): AppJson<CaptureLocationDto>,
) -> Result<Json<ApiResponse<CapturedLocation>>> {
    let reported = dto.coordinates.is_some() || dto.error.is_some();

    let captured = match dto.session {
        Some(session) if !reported => {
            let provider = state.map.location_provider(session).await?;
            state.locations.capture_current(&provider).await
        }
        _ => {
            let fix = ReportedFix {
                coordinates: dto.coordinates,
                error: dto.error,
            };
            state.locations.capture_current(&fix).await
        }
    };

    Ok(Json(ApiResponse::success(Some(captured), None, None)))
}
