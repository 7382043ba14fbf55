mod geocoding_service;
mod geolocation;
mod location_service;

pub use geocoding_service::{Geocoder, NominatimGeocoder};
pub use geolocation::{GeolocationProvider, ReportedFix};
pub use location_service::LocationService;
