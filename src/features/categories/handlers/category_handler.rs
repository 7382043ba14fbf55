use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::features::categories::dtos::CategoryGroupDto;
use crate::features::categories::services::CategoryService;
use crate::features::posts::models::PostKind;
use crate::shared::types::ApiResponse;

/// Query params for listing categories
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListCategoriesQuery {
    /// Restrict to one post kind (`source` or `help`)
    pub kind: Option<PostKind>,
}

/// List the category taxonomy
#[utoipa::path(
    get,
    path = "/api/categories",
    params(ListCategoriesQuery),
    responses(
        (status = 200, description = "Category groups", body = ApiResponse<Vec<CategoryGroupDto>>),
    ),
    tag = "categories"
)]
pub async fn list_categories(
    State(service): State<Arc<CategoryService>>,
    Query(query): Query<ListCategoriesQuery>,
) -> Json<ApiResponse<Vec<CategoryGroupDto>>> {
    Json(ApiResponse::success(Some(service.list(query.kind)), None, None))
}
