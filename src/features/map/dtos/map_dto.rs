use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::features::map::models::{PostFilter, SortOrder};
use crate::features::map::services::MapSession;
use crate::features::posts::models::{Coordinates, PostKind};

/// Response DTO for an opened map session
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MapSessionDto {
    pub id: Uuid,
    /// Initial map center
    pub center: Coordinates,
    pub created_at: DateTime<Utc>,
}

impl MapSessionDto {
    pub fn new(session: &MapSession, center: Coordinates) -> Self {
        Self {
            id: session.id,
            center,
            created_at: session.created_at,
        }
    }
}

/// Request DTO carrying a single map position
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PositionDto {
    pub coordinates: Coordinates,
}

/// Query params for the sidebar feed
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct FeedQuery {
    /// City name; `All` or blank for every city
    pub city: Option<String>,
    /// Category label; `All` or blank for every category
    pub category: Option<String>,
    /// Post kind: source or help
    pub kind: Option<PostKind>,
    /// Creation-time order, `desc` (default) or `asc`
    pub sort: Option<SortOrder>,
}

impl FeedQuery {
    pub fn into_parts(self) -> (PostFilter, SortOrder) {
        (
            PostFilter::new(self.city, self.category, self.kind),
            self.sort.unwrap_or_default(),
        )
    }
}
