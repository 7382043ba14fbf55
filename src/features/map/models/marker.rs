use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::posts::models::Coordinates;

/// Identity of a marker on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MarkerId {
    Post(Uuid),
    /// The viewer's own live location
    Viewer,
    /// Location being picked in an open form
    Preview,
}

impl std::fmt::Display for MarkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarkerId::Post(id) => write!(f, "post:{}", id),
            MarkerId::Viewer => write!(f, "viewer"),
            MarkerId::Preview => write!(f, "preview"),
        }
    }
}

/// Marker style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Source,
    Help,
    Viewer,
    Preview,
}

/// A marker as sent to map clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    /// `post:<uuid>`, `viewer` or `preview`
    pub id: String,
    pub kind: MarkerKind,
    pub position: Coordinates,
    pub urgent: bool,
    /// Rendered popup HTML; absent for viewer and preview markers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popup: Option<String>,
}

/// Changes to bring a client's marker set up to date
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MarkerDiff {
    pub added: Vec<Marker>,
    pub updated: Vec<Marker>,
    /// Ids of markers to take off the map
    pub removed: Vec<String>,
}

impl MarkerDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}
