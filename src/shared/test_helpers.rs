#[cfg(test)]
use std::sync::{Arc, Mutex};

#[cfg(test)]
use async_trait::async_trait;

#[cfg(test)]
use crate::core::config::LocationConfig;
#[cfg(test)]
use crate::core::error::{AppError, Result};
#[cfg(test)]
use crate::features::categories::CategoryService;
#[cfg(test)]
use crate::features::locations::models::Place;
#[cfg(test)]
use crate::features::locations::services::{Geocoder, LocationService};
#[cfg(test)]
use crate::features::posts::live::LiveFeed;
#[cfg(test)]
use crate::features::posts::models::Coordinates;
#[cfg(test)]
use crate::features::posts::store::MemoryPostStore;
#[cfg(test)]
use crate::features::posts::PostService;

/// Geocoder double that records calls instead of reaching Nominatim
#[cfg(test)]
#[derive(Default)]
pub struct StubGeocoder {
    places: Vec<Place>,
    city: Option<String>,
    fail: bool,
    queries: Mutex<Vec<String>>,
}

#[cfg(test)]
#[allow(dead_code)]
impl StubGeocoder {
    pub fn with_places(places: Vec<Place>) -> Self {
        Self {
            places,
            ..Default::default()
        }
    }

    pub fn with_city(city: &str) -> Self {
        Self {
            city: Some(city.to_string()),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn search_calls(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn last_query(&self) -> Option<String> {
        self.queries.lock().unwrap().last().cloned()
    }
}

#[cfg(test)]
#[async_trait]
impl Geocoder for StubGeocoder {
    async fn search(&self, query: &str) -> Result<Vec<Place>> {
        self.queries.lock().unwrap().push(query.to_string());
        if self.fail {
            return Err(AppError::ExternalServiceError("geocoder down".to_string()));
        }
        Ok(self.places.clone())
    }

    async fn reverse_city(&self, _coordinates: Coordinates) -> Result<Option<String>> {
        if self.fail {
            return Err(AppError::ExternalServiceError("geocoder down".to_string()));
        }
        Ok(self.city.clone())
    }
}

/// Location service over the given geocoder with default settings
#[cfg(test)]
#[allow(dead_code)]
pub fn location_service(geocoder: StubGeocoder) -> Arc<LocationService> {
    Arc::new(LocationService::new(
        Arc::new(geocoder),
        LocationConfig::default(),
    ))
}

/// Post service over an empty in-memory store
#[cfg(test)]
#[allow(dead_code)]
pub fn post_service(geocoder: StubGeocoder) -> PostService {
    PostService::new(
        Arc::new(MemoryPostStore::new()),
        Arc::new(LiveFeed::new()),
        Arc::new(CategoryService::new()),
        location_service(geocoder),
    )
}
