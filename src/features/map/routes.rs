use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::features::map::handlers;
use crate::features::map::services::MapService;

/// Create routes for the map feature
pub fn routes(service: Arc<MapService>) -> Router {
    Router::new()
        .route("/api/feed", get(handlers::get_feed))
        .route("/api/map/sessions", post(handlers::open_session))
        .route("/api/map/sessions/{id}/events", get(handlers::session_events))
        .route("/api/map/sessions/{id}/location", put(handlers::set_location))
        .route(
            "/api/map/sessions/{id}/preview",
            put(handlers::set_preview).delete(handlers::clear_preview),
        )
        .with_state(service)
}
