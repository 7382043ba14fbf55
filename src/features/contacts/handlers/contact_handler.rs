use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::features::contacts::dtos::{ContactSearchQuery, EmergencyDirectoryDto};
use crate::features::contacts::services::ContactService;
use crate::shared::types::ApiResponse;

/// Look up emergency hotlines by name and group
#[utoipa::path(
    get,
    path = "/api/emergency-contacts",
    params(ContactSearchQuery),
    responses(
        (status = 200, description = "Matching directory groups", body = ApiResponse<EmergencyDirectoryDto>),
    ),
    tag = "contacts"
)]
pub async fn list_emergency_contacts(
    State(service): State<Arc<ContactService>>,
    Query(query): Query<ContactSearchQuery>,
) -> Json<ApiResponse<EmergencyDirectoryDto>> {
    let directory = service.lookup(query.search.as_deref(), query.group.as_deref());
    Json(ApiResponse::success(Some(directory), None, None))
}
