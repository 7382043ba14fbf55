use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::posts::handlers;
use crate::features::posts::services::PostService;

/// Create routes for the posts feature
pub fn routes(service: Arc<PostService>) -> Router {
    Router::new()
        .route("/api/sources", post(handlers::create_source))
        .route("/api/help-requests", post(handlers::create_help_request))
        .route("/api/posts/{kind}", get(handlers::list_posts))
        .route("/api/posts/{kind}/stream", get(handlers::stream_posts))
        .route(
            "/api/posts/{kind}/{id}",
            get(handlers::get_post)
                .patch(handlers::update_post)
                .delete(handlers::delete_post),
        )
        .route("/api/posts/{kind}/{id}/heart", post(handlers::toggle_heart))
        .route("/api/posts/{kind}/{id}/flag", post(handlers::flag_post))
        .with_state(service)
}
