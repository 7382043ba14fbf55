use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::contacts::handlers;
use crate::features::contacts::services::ContactService;

/// Create routes for the emergency contacts feature
pub fn routes(service: Arc<ContactService>) -> Router {
    Router::new()
        .route(
            "/api/emergency-contacts",
            get(handlers::list_emergency_contacts),
        )
        .with_state(service)
}
