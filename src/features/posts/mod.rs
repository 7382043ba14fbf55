pub mod dtos;
pub mod handlers;
pub mod live;
pub mod models;
pub mod routes;
pub mod seed;
pub mod services;
pub mod store;

pub use services::PostService;
