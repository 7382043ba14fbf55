pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use handlers::LocationState;
pub use services::{LocationService, NominatimGeocoder};
