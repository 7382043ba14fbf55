use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::{Stream, StreamExt};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, Viewer};
use crate::features::map::dtos::{FeedQuery, MapSessionDto, PositionDto};
use crate::features::map::services::MapService;
use crate::features::posts::dtos::PostResponseDto;
use crate::shared::constants::{MARKERS_EVENT, SSE_KEEP_ALIVE_SECS};
use crate::shared::types::{ApiResponse, Meta};

/// Sidebar list of sources and help requests
#[utoipa::path(
    get,
    path = "/api/feed",
    params(FeedQuery),
    responses(
        (status = 200, description = "Filtered and sorted posts", body = ApiResponse<Vec<PostResponseDto>>),
    ),
    tag = "map"
)]
pub async fn get_feed(
    State(service): State<Arc<MapService>>,
    viewer: Viewer,
    Query(query): Query<FeedQuery>,
) -> Result<Json<ApiResponse<Vec<PostResponseDto>>>> {
    let (filter, order) = query.into_parts();
    let posts = service.feed(&filter, order, viewer.0).await?;
    let total = posts.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(posts),
        None,
        Some(Meta { total }),
    )))
}

/// Open a map session
#[utoipa::path(
    post,
    path = "/api/map/sessions",
    responses(
        (status = 201, description = "Session opened", body = ApiResponse<MapSessionDto>),
    ),
    tag = "map"
)]
pub async fn open_session(
    State(service): State<Arc<MapService>>,
) -> (StatusCode, Json<ApiResponse<MapSessionDto>>) {
    let session = service.open_session().await;
    let dto = MapSessionDto::new(&session, service.default_center());
    (
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(dto), None, None)),
    )
}

/// Stream marker diffs for a session
#[utoipa::path(
    get,
    path = "/api/map/sessions/{id}/events",
    params(
        ("id" = Uuid, Path, description = "Map session ID")
    ),
    responses(
        (status = 200, description = "Server-sent `markers` events, each a marker diff", content_type = "text/event-stream"),
        (status = 404, description = "Session not found")
    ),
    tag = "map"
)]
pub async fn session_events(
    State(service): State<Arc<MapService>>,
    Path(id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, axum::Error>>>> {
    let diffs = service.marker_events(id).await?;
    let events = diffs.map(|diff| Event::default().event(MARKERS_EVENT).json_data(diff));

    Ok(Sse::new(events)
        .keep_alive(KeepAlive::new().interval(Duration::from_secs(SSE_KEEP_ALIVE_SECS))))
}

/// Update the viewer's live location
#[utoipa::path(
    put,
    path = "/api/map/sessions/{id}/location",
    params(
        ("id" = Uuid, Path, description = "Map session ID")
    ),
    request_body = PositionDto,
    responses(
        (status = 200, description = "Location updated"),
        (status = 404, description = "Session not found")
    ),
    tag = "map"
)]
pub async fn set_location(
    State(service): State<Arc<MapService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<PositionDto>,
) -> Result<Json<ApiResponse<()>>> {
    service.set_viewer_location(id, dto.coordinates).await?;
    Ok(Json(ApiResponse::success(None, None, None)))
}

/// Show the preview marker for the location picked in an open form
#[utoipa::path(
    put,
    path = "/api/map/sessions/{id}/preview",
    params(
        ("id" = Uuid, Path, description = "Map session ID")
    ),
    request_body = PositionDto,
    responses(
        (status = 200, description = "Preview shown"),
        (status = 404, description = "Session not found")
    ),
    tag = "map"
)]
pub async fn set_preview(
    State(service): State<Arc<MapService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<PositionDto>,
) -> Result<Json<ApiResponse<()>>> {
    service.set_preview(id, Some(dto.coordinates)).await?;
    Ok(Json(ApiResponse::success(None, None, None)))
}

/// Remove the preview marker, e.g. when the form closes
#[utoipa::path(
    delete,
    path = "/api/map/sessions/{id}/preview",
    params(
        ("id" = Uuid, Path, description = "Map session ID")
    ),
    responses(
        (status = 200, description = "Preview cleared"),
        (status = 404, description = "Session not found")
    ),
    tag = "map"
)]
pub async fn clear_preview(
    State(service): State<Arc<MapService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.set_preview(id, None).await?;
    Ok(Json(ApiResponse::success(None, None, None)))
}
