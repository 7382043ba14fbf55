//! Map view: merged live feed, per-client marker sessions and the sidebar list.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::MapService;
