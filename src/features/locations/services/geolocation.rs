use async_trait::async_trait;

use crate::core::error::{AppError, Result};
use crate::features::posts::models::Coordinates;

/// Source of the viewer's current position
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    /// Resolves once a position fix is available; may never resolve
    async fn current_position(&self) -> Result<Coordinates>;
}

/// A fix (or failure) reported by the device in the request itself
#[derive(Debug, Clone, Default)]
pub struct ReportedFix {
    pub coordinates: Option<Coordinates>,
    pub error: Option<String>,
}

#[async_trait]
impl GeolocationProvider for ReportedFix {
    async fn current_position(&self) -> Result<Coordinates> {
        match (self.coordinates, &self.error) {
            (Some(coordinates), None) => Ok(coordinates),
            (_, Some(error)) => Err(AppError::BadRequest(format!(
                "Geolocation failed: {}",
                error
            ))),
            (None, None) => Err(AppError::BadRequest(
                "Geolocation failed: no position reported".to_string(),
            )),
        }
    }
}
