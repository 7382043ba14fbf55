use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A validated latitude/longitude pair.
///
/// Accepts either `{"latitude": .., "longitude": ..}` or a `[lat, lon]` pair on
/// input; out-of-range values are rejected during deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "CoordinatesInput")]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Cebu City center, the default map center and location fallback
    pub const CEBU_CITY: Coordinates = Coordinates {
        latitude: 10.3157,
        longitude: 123.8854,
    };

    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        valid.then_some(Self {
            latitude,
            longitude,
        })
    }

    /// Builds coordinates from nullable columns; both parts must be present
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(lat), Some(lon)) => Self::new(lat, lon),
            _ => None,
        }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CoordinatesInput {
    Pair([f64; 2]),
    Named { latitude: f64, longitude: f64 },
}

impl TryFrom<CoordinatesInput> for Coordinates {
    type Error = String;

    fn try_from(input: CoordinatesInput) -> Result<Self, Self::Error> {
        let (latitude, longitude) = match input {
            CoordinatesInput::Pair([lat, lon]) => (lat, lon),
            CoordinatesInput::Named {
                latitude,
                longitude,
            } => (latitude, longitude),
        };
        Coordinates::new(latitude, longitude).ok_or_else(|| {
            format!(
                "coordinates out of range: latitude {} longitude {}",
                latitude, longitude
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_out_of_range() {
        assert!(Coordinates::new(91.0, 0.0).is_none());
        assert!(Coordinates::new(0.0, -180.5).is_none());
        assert!(Coordinates::new(f64::NAN, 0.0).is_none());
        assert!(Coordinates::new(10.2447, 123.8494).is_some());
    }

    #[test]
    fn test_deserializes_pair_and_object() {
        let pair: Coordinates = serde_json::from_str("[10.3236, 123.9415]").unwrap();
        let named: Coordinates =
            serde_json::from_str(r#"{"latitude": 10.3236, "longitude": 123.9415}"#).unwrap();
        assert_eq!(pair, named);

        let invalid = serde_json::from_str::<Coordinates>("[123.9, 10.3]");
        assert!(invalid.is_err());
    }

    #[test]
    fn test_from_parts_requires_both() {
        assert_eq!(Coordinates::from_parts(Some(10.0), None), None);
        assert_eq!(
            Coordinates::from_parts(Some(10.0), Some(123.0)),
            Coordinates::new(10.0, 123.0)
        );
    }
}
