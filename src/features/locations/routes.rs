use axum::{
    routing::{get, post},
    Router,
};

use crate::features::locations::handlers::{self, LocationState};

/// Create routes for the locations feature
pub fn routes(state: LocationState) -> Router {
    Router::new()
        .route("/api/locations/search", get(handlers::search_locations))
        .route("/api/locations/reverse", get(handlers::reverse_city))
        .route("/api/locations/current", post(handlers::capture_current))
        .with_state(state)
}
