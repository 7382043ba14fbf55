use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::posts::models::Coordinates;

/// A geocoding search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub display_name: String,
    pub coordinates: Coordinates,
}

/// How a captured location was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LocationSource {
    /// A device position fix
    Device,
    /// The configured city center, used when no fix was available in time
    Fallback,
}

/// Location captured for a form, ready to be copied into its fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CapturedLocation {
    pub label: String,
    pub coordinates: Coordinates,
    pub city: String,
    pub source: LocationSource,
}

impl CapturedLocation {
    /// Location from a device fix; the label carries 4-decimal coordinates
    pub fn from_fix(coordinates: Coordinates, city: String) -> Self {
        Self {
            label: format!("Current Location ({})", coordinates),
            coordinates,
            city,
            source: LocationSource::Device,
        }
    }

    pub fn fallback(center: Coordinates, city: &str) -> Self {
        Self {
            label: format!("Approximate Location ({})", city),
            coordinates: center,
            city: city.to_string(),
            source: LocationSource::Fallback,
        }
    }
}

/// Outcome of a debounced location search
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Query below the minimum length; the geocoder was not called
    TooShort,
    /// A newer query from the same session replaced this one during the debounce window
    Superseded,
    Results(Vec<Place>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        let fix = Coordinates::new(10.324_56, 123.941_23).unwrap();
        assert_eq!(
            CapturedLocation::from_fix(fix, "Mandaue City".to_string()).label,
            "Current Location (10.3246, 123.9412)"
        );
        assert_eq!(
            CapturedLocation::fallback(Coordinates::CEBU_CITY, "Cebu City").label,
            "Approximate Location (Cebu City)"
        );
    }
}
