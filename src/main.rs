mod core;
mod features;
mod shared;

use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::categories::{routes as categories_routes, CategoryService};
use crate::features::contacts::{routes as contacts_routes, ContactService};
use crate::features::locations::{
    routes as locations_routes, LocationService, LocationState, NominatimGeocoder,
};
use crate::features::map::services::PopupRenderer;
use crate::features::map::{routes as map_routes, MapService};
use crate::features::posts::live::LiveFeed;
use crate::features::posts::store::{MemoryPostStore, PgPostStore, PostStore};
use crate::features::posts::{routes as posts_routes, PostService};
use axum::{middleware::from_fn, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

/// Services shared by the feature routers
struct Services {
    posts: Arc<PostService>,
    map: Arc<MapService>,
    locations: Arc<LocationService>,
    categories: Arc<CategoryService>,
    contacts: Arc<ContactService>,
}

/// Public API routes of every feature
fn api_routes(services: &Services) -> Router {
    let location_state = LocationState {
        locations: Arc::clone(&services.locations),
        map: Arc::clone(&services.map),
    };

    Router::new()
        .merge(posts_routes::routes(Arc::clone(&services.posts)))
        .merge(map_routes::routes(Arc::clone(&services.map)))
        .merge(locations_routes::routes(location_state))
        .merge(categories_routes::routes(Arc::clone(&services.categories)))
        .merge(contacts_routes::routes(Arc::clone(&services.contacts)))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    // Log system info
    let available_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    tracing::info!(
        "System info: available_cpus={}, tokio_worker_threads={}, pid={}",
        available_cpus,
        worker_threads,
        std::process::id()
    );

    tracing::info!("Configuration loaded successfully");

    // Primary store: Postgres when configured, otherwise in memory
    let store: Arc<dyn PostStore> = match &config.database.url {
        Some(url) => {
            let pool = database::create_pool(&config.database, url).await?;
            tracing::info!("Database connection pool created");

            // Run migrations automatically
            tracing::info!("Running database migrations...");
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
            tracing::info!("Database migrations completed successfully");

            Arc::new(PgPostStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, posts are kept in memory only");
            Arc::new(MemoryPostStore::new())
        }
    };

    // Initialize geocoding and location capture
    let geocoder = Arc::new(
        NominatimGeocoder::new(&config.geocoder)
            .map_err(|e| anyhow::anyhow!("Failed to initialize geocoder: {}", e))?,
    );
    let location_service = Arc::new(LocationService::new(geocoder, config.location.clone()));
    tracing::info!("Location service initialized ({})", config.geocoder.base_url);

    let category_service = Arc::new(CategoryService::new());
    let contact_service = Arc::new(ContactService::new());

    // Initialize post service and its live feed
    let live_feed = Arc::new(LiveFeed::new());
    let post_service = Arc::new(PostService::new(
        store,
        live_feed,
        Arc::clone(&category_service),
        Arc::clone(&location_service),
    ));
    if config.app.seed_demo_posts {
        post_service.seed_if_empty().await?;
    }
    post_service.prime_live_feed().await?;
    tracing::info!("Post service initialized, live feed primed");

    // Initialize map sessions with popup templates
    let popup_renderer = Arc::new(
        PopupRenderer::new("")
            .map_err(|e| anyhow::anyhow!("Failed to load popup template: {}", e))?,
    );
    let map_service = Arc::new(MapService::new(
        Arc::clone(&post_service),
        popup_renderer,
        config.location.fallback_center,
        config.map.clone(),
    ));
    map_service.spawn_reaper();
    tracing::info!(
        "Map service initialized (idle sessions reaped after {:?})",
        config.map.session_idle_ttl
    );

    let services = Services {
        posts: post_service,
        map: map_service,
        locations: location_service,
        categories: category_service,
        contacts: contact_service,
    };

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    // Build swagger router
    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Simple health check endpoint
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    let app = Router::new()
        .merge(swagger)
        .merge(api_routes(&services))
        .merge(health_route)
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderName, HeaderValue, StatusCode};
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use uuid::Uuid;

    use super::*;
    use crate::core::config::MapConfig;
    use crate::features::posts::models::Coordinates;
    use crate::shared::constants::VIEWER_ID_HEADER;
    use crate::shared::test_helpers::{location_service, StubGeocoder};

    fn test_server() -> TestServer {
        let locations = location_service(StubGeocoder::with_city("Mandaue City"));
        let categories = Arc::new(CategoryService::new());
        let posts = Arc::new(PostService::new(
            Arc::new(MemoryPostStore::new()),
            Arc::new(LiveFeed::new()),
            Arc::clone(&categories),
            Arc::clone(&locations),
        ));
        let renderer = Arc::new(PopupRenderer::new("").unwrap());
        let map = Arc::new(MapService::new(
            Arc::clone(&posts),
            renderer,
            Coordinates::CEBU_CITY,
            MapConfig::default(),
        ));

        let services = Services {
            posts,
            map,
            locations,
            categories,
            contacts: Arc::new(ContactService::new()),
        };
        TestServer::new(api_routes(&services)).unwrap()
    }

    fn viewer_header(viewer: Uuid) -> (HeaderName, HeaderValue) {
        (
            HeaderName::from_static(VIEWER_ID_HEADER),
            HeaderValue::from_str(&viewer.to_string()).unwrap(),
        )
    }

    fn source_form() -> Value {
        json!({
            "category": ["Water", "Food"],
            "description": "Free drinking water refill station",
            "fullName": "Maria Santos",
            "contactNumber": "09123456789",
            "manualLocation": "",
            "coordinates": [10.3236, 123.9415]
        })
    }

    #[tokio::test]
    async fn test_pin_source_then_heart_it() {
        let server = test_server();

        let created = server.post("/api/sources").json(&source_form()).await;
        assert_eq!(created.status_code(), StatusCode::CREATED);
        let body: Value = created.json();
        let id = body["data"]["id"].as_str().unwrap().to_string();
        assert_eq!(body["data"]["city"], "Mandaue City");
        assert_eq!(body["data"]["contact"], "Maria Santos - 09123456789");

        let (name, value) = viewer_header(Uuid::now_v7());
        let hearted = server
            .post(&format!("/api/posts/source/{}/heart", id))
            .add_header(name.clone(), value.clone())
            .await;
        hearted.assert_status_ok();
        let body: Value = hearted.json();
        assert_eq!(body["data"]["hearts"], 1);
        assert_eq!(body["data"]["userHearted"], true);

        let listed: Value = server
            .get("/api/posts/source")
            .add_header(name, value)
            .await
            .json();
        assert_eq!(listed["data"][0]["userHearted"], true);
    }

    #[tokio::test]
    async fn test_heart_requires_viewer_header() {
        let server = test_server();
        let created: Value = server.post("/api/sources").json(&source_form()).await.json();
        let id = created["data"]["id"].as_str().unwrap();

        let response = server.post(&format!("/api/posts/source/{}/heart", id)).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_help_form_lists_field_messages() {
        let server = test_server();

        let response = server
            .post("/api/help-requests")
            .json(&json!({
                "title": "",
                "category": [],
                "description": "",
                "fullName": "Pedro",
                "contactNumber": "12345",
                "manualLocation": ""
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        let errors: Vec<String> = serde_json::from_value(body["errors"].clone()).unwrap();
        assert!(errors.iter().any(|e| e.starts_with("contactNumber:")));
        assert!(errors.iter().any(|e| e.contains("Please describe your situation.")));
    }

    #[tokio::test]
    async fn test_feed_filters_by_kind() {
        let server = test_server();
        server.post("/api/sources").json(&source_form()).await;
        server
            .post("/api/help-requests")
            .json(&json!({
                "title": "Roof collapsed",
                "category": "Rescue",
                "description": "Family trapped on second floor",
                "fullName": "Ana Reyes",
                "contactNumber": "+639151112233",
                "manualLocation": "Talisay City"
            }))
            .await;

        let all: Value = server.get("/api/feed").await.json();
        assert_eq!(all["meta"]["total"], 2);

        let help: Value = server
            .get("/api/feed")
            .add_query_param("kind", "help")
            .await
            .json();
        assert_eq!(help["meta"]["total"], 1);
        assert_eq!(help["data"][0]["title"], "Roof collapsed");
    }

    #[tokio::test]
    async fn test_unknown_map_session_is_not_found() {
        let server = test_server();
        let response = server
            .put(&format!("/api/map/sessions/{}/preview", Uuid::now_v7()))
            .json(&json!({ "coordinates": [10.3, 123.9] }))
            .await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

        let opened = server.post("/api/map/sessions").await;
        assert_eq!(opened.status_code(), StatusCode::CREATED);
        let id = opened.json::<Value>()["data"]["id"]
            .as_str()
            .unwrap()
            .to_string();
        server
            .delete(&format!("/api/map/sessions/{}/preview", id))
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn test_capture_location_falls_back_on_device_error() {
        let server = test_server();
        let body: Value = server
            .post("/api/locations/current")
            .json(&json!({ "error": "permission denied" }))
            .await
            .json();

        assert_eq!(body["data"]["source"], "fallback");
        assert_eq!(body["data"]["label"], "Approximate Location (Cebu City)");
    }

    #[tokio::test]
    async fn test_emergency_contacts_search() {
        let server = test_server();
        let body: Value = server
            .get("/api/emergency-contacts")
            .add_query_param("search", "red cross")
            .await
            .json();

        assert_eq!(body["data"]["results"][0]["name"], "Other Essential Numbers");
        assert_eq!(
            body["data"]["results"][0]["contacts"][0]["dial"],
            "09155839829"
        );
    }
}
