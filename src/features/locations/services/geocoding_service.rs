use async_trait::async_trait;
use serde::Deserialize;

use crate::core::config::GeocoderConfig;
use crate::core::error::{AppError, Result};
use crate::features::locations::models::Place;
use crate::features::posts::models::Coordinates;

/// Forward and reverse geocoding backend
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Places matching a free-text query, inside the configured viewbox
    async fn search(&self, query: &str) -> Result<Vec<Place>>;

    /// City (or town, or village) containing the coordinates
    async fn reverse_city(&self, coordinates: Coordinates) -> Result<Option<String>>;
}

/// Nominatim search hit
#[derive(Debug, Deserialize)]
pub struct NominatimPlace {
    pub lat: String,
    pub lon: String,
    pub display_name: String,
}

impl NominatimPlace {
    fn into_place(self) -> Option<Place> {
        let latitude = self.lat.parse().ok()?;
        let longitude = self.lon.parse().ok()?;
        Some(Place {
            display_name: self.display_name,
            coordinates: Coordinates::new(latitude, longitude)?,
        })
    }
}

/// Nominatim reverse lookup response
#[derive(Debug, Deserialize)]
pub struct NominatimReverse {
    pub address: Option<NominatimAddress>,
}

/// Nominatim address components
#[derive(Debug, Deserialize)]
pub struct NominatimAddress {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
}

impl NominatimAddress {
    /// Get city, falling back to town or village
    pub fn get_city(&self) -> Option<String> {
        self.city
            .clone()
            .or_else(|| self.town.clone())
            .or_else(|| self.village.clone())
    }
}

/// Geocoder backed by a Nominatim instance
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
    viewbox: String,
    limit: u32,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            viewbox: config.viewbox.clone(),
            limit: config.result_limit,
        })
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}/search?format=json&q={}&viewbox={}&bounded=1&limit={}",
            self.base_url,
            urlencoding::encode(query),
            self.viewbox,
            self.limit
        )
    }

    fn reverse_url(&self, coordinates: Coordinates) -> String {
        format!(
            "{}/reverse?format=json&lat={}&lon={}",
            self.base_url, coordinates.latitude, coordinates.longitude
        )
    }

    /// Execute HTTP request to Nominatim and parse response
    async fn execute_request<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<Option<T>> {
        let response = self.client.get(url).send().await.map_err(|e| {
            tracing::error!("Nominatim request failed: {:?}", e);
            AppError::ExternalServiceError(format!("Nominatim request failed: {}", e))
        })?;

        if !response.status().is_success() {
            tracing::warn!("Nominatim returned status: {}", response.status());
            return Ok(None);
        }

        let parsed = response.json::<T>().await.map_err(|e| {
            tracing::error!("Failed to parse Nominatim response: {:?}", e);
            AppError::ExternalServiceError(format!("Failed to parse Nominatim response: {}", e))
        })?;

        Ok(Some(parsed))
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn search(&self, query: &str) -> Result<Vec<Place>> {
        let url = self.search_url(query);
        tracing::debug!("Geocoding (search): {} -> {}", query, url);

        let places: Vec<NominatimPlace> = self.execute_request(&url).await?.unwrap_or_default();
        Ok(places
            .into_iter()
            .filter_map(NominatimPlace::into_place)
            .collect())
    }

    async fn reverse_city(&self, coordinates: Coordinates) -> Result<Option<String>> {
        let url = self.reverse_url(coordinates);
        tracing::debug!("Geocoding (reverse): {} -> {}", coordinates, url);

        let response: Option<NominatimReverse> = self.execute_request(&url).await?;
        Ok(response
            .and_then(|r| r.address)
            .and_then(|a| a.get_city()))
    }
}
