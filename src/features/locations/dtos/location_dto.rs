use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::features::locations::models::{Place, SearchOutcome};
use crate::features::posts::models::Coordinates;

/// Query params for a location search
#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchLocationsQuery {
    /// Free-text place query
    pub q: String,
    /// Client key used for debouncing; a newer query with the same key supersedes a pending one
    pub session: Option<String>,
}

/// Query params for a reverse city lookup
#[derive(Debug, Deserialize, IntoParams)]
pub struct ReverseCityQuery {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    TooShort,
    Superseded,
    Results,
}

/// Response DTO for a location search
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LocationSearchDto {
    pub status: SearchStatus,
    pub results: Vec<Place>,
}

impl From<SearchOutcome> for LocationSearchDto {
    fn from(outcome: SearchOutcome) -> Self {
        match outcome {
            SearchOutcome::TooShort => Self {
                status: SearchStatus::TooShort,
                results: Vec::new(),
            },
            SearchOutcome::Superseded => Self {
                status: SearchStatus::Superseded,
                results: Vec::new(),
            },
            SearchOutcome::Results(results) => Self {
                status: SearchStatus::Results,
                results,
            },
        }
    }
}

/// Response DTO for a reverse city lookup; `city` is empty when unknown
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CityDto {
    pub city: String,
}

/// Request DTO for capturing the current location.
///
/// A device either reports a fix (`coordinates`) or a failure (`error`).
/// With neither, the position of the given map session is awaited.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaptureLocationDto {
    pub coordinates: Option<Coordinates>,
    pub error: Option<String>,
    pub session: Option<Uuid>,
}
