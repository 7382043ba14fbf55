use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::posts::models::PostKind;

/// Category labels available to one post kind
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryGroupDto {
    pub kind: PostKind,
    pub categories: Vec<String>,
}
