use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::contacts::{dtos as contacts_dtos, handlers as contacts_handlers};
use crate::features::locations::{
    dtos as locations_dtos, handlers as locations_handlers, models as locations_models,
};
use crate::features::map::{dtos as map_dtos, handlers as map_handlers, models as map_models};
use crate::features::posts::{
    dtos as posts_dtos, handlers as posts_handlers, models as posts_models,
};
use crate::shared::constants::VIEWER_ID_HEADER;
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Posts
        posts_handlers::create_source,
        posts_handlers::create_help_request,
        posts_handlers::list_posts,
        posts_handlers::get_post,
        posts_handlers::update_post,
        posts_handlers::delete_post,
        posts_handlers::toggle_heart,
        posts_handlers::flag_post,
        posts_handlers::stream_posts,
        // Map
        map_handlers::get_feed,
        map_handlers::open_session,
        map_handlers::session_events,
        map_handlers::set_location,
        map_handlers::set_preview,
        map_handlers::clear_preview,
        // Locations
        locations_handlers::search_locations,
        locations_handlers::reverse_city,
        locations_handlers::capture_current,
        // Categories (public)
        categories_handlers::list_categories,
        // Emergency contacts (public)
        contacts_handlers::list_emergency_contacts,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Posts
            posts_models::PostKind,
            posts_models::Coordinates,
            posts_dtos::PinSourceFormDto,
            posts_dtos::AskHelpFormDto,
            posts_dtos::UpdatePostDto,
            posts_dtos::PostResponseDto,
            posts_dtos::HeartResponseDto,
            ApiResponse<posts_dtos::PostResponseDto>,
            ApiResponse<Vec<posts_dtos::PostResponseDto>>,
            ApiResponse<posts_dtos::HeartResponseDto>,
            // Map
            map_models::SortOrder,
            map_models::MarkerKind,
            map_models::Marker,
            map_models::MarkerDiff,
            map_dtos::MapSessionDto,
            map_dtos::PositionDto,
            ApiResponse<map_dtos::MapSessionDto>,
            // Locations
            locations_models::Place,
            locations_models::LocationSource,
            locations_models::CapturedLocation,
            locations_dtos::SearchStatus,
            locations_dtos::LocationSearchDto,
            locations_dtos::CityDto,
            locations_dtos::CaptureLocationDto,
            ApiResponse<locations_dtos::LocationSearchDto>,
            ApiResponse<locations_dtos::CityDto>,
            ApiResponse<locations_models::CapturedLocation>,
            // Categories
            categories_dtos::CategoryGroupDto,
            ApiResponse<Vec<categories_dtos::CategoryGroupDto>>,
            // Emergency contacts
            contacts_dtos::ContactDto,
            contacts_dtos::ContactGroupDto,
            contacts_dtos::CreditsDto,
            contacts_dtos::EmergencyDirectoryDto,
            ApiResponse<contacts_dtos::EmergencyDirectoryDto>,
        )
    ),
    tags(
        (name = "posts", description = "Sources and help requests"),
        (name = "map", description = "Map sessions, marker streams and the sidebar feed"),
        (name = "locations", description = "Location search and capture for the post forms"),
        (name = "categories", description = "Category taxonomy (public)"),
        (name = "contacts", description = "Emergency hotline directory (public)"),
    ),
    modifiers(&ViewerAddon),
    info(
        title = "Crisis Map API",
        version = "0.1.0",
        description = "API documentation for the community crisis map",
    )
)]
pub struct ApiDoc;

/// Documents the anonymous viewer header used for hearts
struct ViewerAddon;

impl Modify for ViewerAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "viewer_id",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(VIEWER_ID_HEADER))),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
