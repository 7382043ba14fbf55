use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::core::config::LocationConfig;
use crate::features::locations::models::{CapturedLocation, SearchOutcome};
use crate::features::locations::services::{Geocoder, GeolocationProvider};
use crate::features::posts::models::Coordinates;

/// Location capture and lookup for the post forms
pub struct LocationService {
    geocoder: Arc<dyn Geocoder>,
    config: LocationConfig,
    /// Service-wide counter; generations are never reused
    generations: AtomicU64,
    /// Latest search generation per session
    searches: Mutex<HashMap<String, u64>>,
}

impl LocationService {
    pub fn new(geocoder: Arc<dyn Geocoder>, config: LocationConfig) -> Self {
        Self {
            geocoder,
            config,
            generations: AtomicU64::new(0),
            searches: Mutex::new(HashMap::new()),
        }
    }

    fn next_generation(&self, session: &str) -> u64 {
        let generation = self.generations.fetch_add(1, Ordering::Relaxed) + 1;
        let mut searches = self.searches.lock().unwrap_or_else(|e| e.into_inner());
        searches.insert(session.to_string(), generation);
        generation
    }

    /// Returns true and forgets the session entry if `generation` is still the latest
    fn finish_generation(&self, session: &str, generation: u64) -> bool {
        let mut searches = self.searches.lock().unwrap_or_else(|e| e.into_inner());
        if searches.get(session) == Some(&generation) {
            searches.remove(session);
            true
        } else {
            false
        }
    }

    /// Debounced forward search.
    ///
    /// Waits out the debounce window first; a newer query from the same
    /// session during the wait supersedes this one. Queries below the minimum
    /// length cancel any pending search and never reach the geocoder.
    /// Geocoder failures yield an empty result list.
    pub async fn search(&self, session: &str, query: &str) -> SearchOutcome {
        let query = query.trim();
        let generation = self.next_generation(session);

        if query.chars().count() < self.config.search_min_chars {
            self.finish_generation(session, generation);
            return SearchOutcome::TooShort;
        }

        tokio::time::sleep(self.config.search_debounce).await;

        if !self.finish_generation(session, generation) {
            tracing::debug!("Search '{}' superseded for session {}", query, session);
            return SearchOutcome::Superseded;
        }

        match self.geocoder.search(query).await {
            Ok(places) => SearchOutcome::Results(places),
            Err(e) => {
                tracing::error!("Error fetching locations for '{}': {:?}", query, e);
                SearchOutcome::Results(Vec::new())
            }
        }
    }

    /// City containing the coordinates; empty when the lookup fails
    pub async fn reverse_city(&self, coordinates: Coordinates) -> String {
        match self.geocoder.reverse_city(coordinates).await {
            Ok(city) => city.unwrap_or_default(),
            Err(e) => {
                tracing::error!("Error fetching city for {}: {:?}", coordinates, e);
                String::new()
            }
        }
    }

    /// Captures the viewer's current position.
    ///
    /// Falls back to the configured city center when the provider fails or
    /// does not answer within the geolocation timeout.
    pub async fn capture_current(&self, provider: &dyn GeolocationProvider) -> CapturedLocation {
        let fix =
            tokio::time::timeout(self.config.geolocation_timeout, provider.current_position())
                .await;

        match fix {
            Ok(Ok(coordinates)) => {
                let city = self.reverse_city(coordinates).await;
                CapturedLocation::from_fix(coordinates, city)
            }
            Ok(Err(e)) => {
                tracing::warn!("Geolocation error, using fallback location: {}", e);
                self.fallback()
            }
            Err(_) => {
                tracing::warn!(
                    "Geolocation timed out after {:?}, using fallback location",
                    self.config.geolocation_timeout
                );
                self.fallback()
            }
        }
    }

    fn fallback(&self) -> CapturedLocation {
        CapturedLocation::fallback(self.config.fallback_center, &self.config.fallback_city)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::core::error::Result;
    use crate::features::locations::models::{LocationSource, Place};
    use crate::features::locations::services::ReportedFix;
    use crate::shared::test_helpers::StubGeocoder;

    fn service(geocoder: Arc<StubGeocoder>) -> LocationService {
        LocationService::new(geocoder, LocationConfig::default())
    }

    struct NeverAnswers;

    #[async_trait]
    impl GeolocationProvider for NeverAnswers {
        async fn current_position(&self) -> Result<Coordinates> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_query_never_reaches_geocoder() {
        let geocoder = Arc::new(StubGeocoder::default());
        let service = service(geocoder.clone());

        assert_eq!(service.search("s1", "  ab  ").await, SearchOutcome::TooShort);
        assert_eq!(geocoder.search_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_waits_for_debounce() {
        let place = Place {
            display_name: "Ayala Center Cebu".to_string(),
            coordinates: Coordinates::new(10.3181, 123.9050).unwrap(),
        };
        let geocoder = Arc::new(StubGeocoder::with_places(vec![place.clone()]));
        let service = service(geocoder.clone());

        let started = tokio::time::Instant::now();
        let outcome = service.search("s1", "Ayala").await;

        assert_eq!(outcome, SearchOutcome::Results(vec![place]));
        assert!(started.elapsed() >= Duration::from_millis(500));
        assert_eq!(geocoder.search_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_query_supersedes_pending_one() {
        let geocoder = Arc::new(StubGeocoder::default());
        let service = Arc::new(service(geocoder.clone()));

        let first = tokio::spawn({
            let service = service.clone();
            async move { service.search("s1", "Mand").await }
        });
        tokio::time::sleep(Duration::from_millis(200)).await;
        let second = service.search("s1", "Mandaue").await;

        assert_eq!(first.await.unwrap(), SearchOutcome::Superseded);
        assert_eq!(second, SearchOutcome::Results(Vec::new()));
        assert_eq!(geocoder.search_calls(), 1);
        assert_eq!(geocoder.last_query().as_deref(), Some("Mandaue"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_query_between_searches_keeps_newest() {
        let geocoder = Arc::new(StubGeocoder::default());
        let service = Arc::new(service(geocoder.clone()));

        let stale = tokio::spawn({
            let service = service.clone();
            async move { service.search("s1", "Mandaue").await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(service.search("s1", "ab").await, SearchOutcome::TooShort);

        tokio::time::sleep(Duration::from_millis(100)).await;
        let newest = service.search("s1", "Talisay").await;

        assert_eq!(stale.await.unwrap(), SearchOutcome::Superseded);
        assert_eq!(newest, SearchOutcome::Results(Vec::new()));
        assert_eq!(geocoder.search_calls(), 1);
        assert_eq!(geocoder.last_query().as_deref(), Some("Talisay"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sessions_do_not_supersede_each_other() {
        let geocoder = Arc::new(StubGeocoder::default());
        let service = Arc::new(service(geocoder.clone()));

        let other = tokio::spawn({
            let service = service.clone();
            async move { service.search("s2", "Talisay").await }
        });
        let mine = service.search("s1", "Lapu-Lapu").await;

        assert!(matches!(mine, SearchOutcome::Results(_)));
        assert!(matches!(other.await.unwrap(), SearchOutcome::Results(_)));
        assert_eq!(geocoder.search_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_geocoder_failure_yields_empty_results() {
        let geocoder = Arc::new(StubGeocoder::failing());
        let service = service(geocoder);

        assert_eq!(
            service.search("s1", "Cebu").await,
            SearchOutcome::Results(Vec::new())
        );
        assert_eq!(service.reverse_city(Coordinates::CEBU_CITY).await, "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_capture_uses_fix_and_reverse_city() {
        let geocoder = Arc::new(StubGeocoder::with_city("Mandaue City"));
        let service = service(geocoder);
        let fix = ReportedFix {
            coordinates: Coordinates::new(10.3236, 123.9415),
            error: None,
        };

        let captured = service.capture_current(&fix).await;
        assert_eq!(captured.source, LocationSource::Device);
        assert_eq!(captured.city, "Mandaue City");
        assert_eq!(captured.label, "Current Location (10.3236, 123.9415)");
    }

    #[tokio::test(start_paused = true)]
    async fn test_capture_falls_back_on_error() {
        let service = service(Arc::new(StubGeocoder::default()));
        let denied = ReportedFix {
            coordinates: None,
            error: Some("User denied Geolocation".to_string()),
        };

        let captured = service.capture_current(&denied).await;
        assert_eq!(captured.source, LocationSource::Fallback);
        assert_eq!(captured.coordinates, Coordinates::CEBU_CITY);
        assert_eq!(captured.label, "Approximate Location (Cebu City)");
        assert_eq!(captured.city, "Cebu City");
    }

    #[tokio::test(start_paused = true)]
    async fn test_capture_falls_back_on_timeout() {
        let service = service(Arc::new(StubGeocoder::default()));

        let started = tokio::time::Instant::now();
        let captured = service.capture_current(&NeverAnswers).await;

        assert_eq!(captured.source, LocationSource::Fallback);
        assert!(started.elapsed() >= Duration::from_secs(7));
    }
}
