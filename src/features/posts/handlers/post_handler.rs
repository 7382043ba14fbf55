use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::{Stream, StreamExt};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, Viewer};
use crate::features::posts::dtos::{
    AskHelpFormDto, HeartResponseDto, PinSourceFormDto, PostResponseDto, UpdatePostDto,
};
use crate::features::posts::models::PostKind;
use crate::features::posts::services::PostService;
use crate::shared::constants::{POSTS_EVENT, SSE_KEEP_ALIVE_SECS};
use crate::shared::types::ApiResponse;

/// Pin a source
#[utoipa::path(
    post,
    path = "/api/sources",
    request_body = PinSourceFormDto,
    responses(
        (status = 201, description = "Source pinned", body = ApiResponse<PostResponseDto>),
        (status = 400, description = "Validation error")
    ),
    tag = "posts"
)]
pub async fn create_source(
    State(service): State<Arc<PostService>>,
    AppJson(form): AppJson<PinSourceFormDto>,
) -> Result<(StatusCode, Json<ApiResponse<PostResponseDto>>)> {
    let post = service.submit(form).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(post),
            Some("Source pinned successfully".to_string()),
            None,
        )),
    ))
}

/// Ask for help
#[utoipa::path(
    post,
    path = "/api/help-requests",
    request_body = AskHelpFormDto,
    responses(
        (status = 201, description = "Help request posted", body = ApiResponse<PostResponseDto>),
        (status = 400, description = "Validation error")
    ),
    tag = "posts"
)]
pub async fn create_help_request(
    State(service): State<Arc<PostService>>,
    AppJson(form): AppJson<AskHelpFormDto>,
) -> Result<(StatusCode, Json<ApiResponse<PostResponseDto>>)> {
    let post = service.submit(form).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(post),
            Some("Help request posted successfully".to_string()),
            None,
        )),
    ))
}

/// List all posts of one kind, newest first
#[utoipa::path(
    get,
    path = "/api/posts/{kind}",
    params(
        ("kind" = PostKind, Path, description = "Post kind: source or help")
    ),
    responses(
        (status = 200, description = "Posts", body = ApiResponse<Vec<PostResponseDto>>),
    ),
    tag = "posts"
)]
pub async fn list_posts(
    State(service): State<Arc<PostService>>,
    viewer: Viewer,
    Path(kind): Path<PostKind>,
) -> Result<Json<ApiResponse<Vec<PostResponseDto>>>> {
    let posts = service.list(kind, viewer.0).await?;
    Ok(Json(ApiResponse::success(Some(posts), None, None)))
}

/// Get a post by ID
#[utoipa::path(
    get,
    path = "/api/posts/{kind}/{id}",
    params(
        ("kind" = PostKind, Path, description = "Post kind: source or help"),
        ("id" = Uuid, Path, description = "Post ID")
    ),
    responses(
        (status = 200, description = "Post found", body = ApiResponse<PostResponseDto>),
        (status = 404, description = "Post not found")
    ),
    tag = "posts"
)]
pub async fn get_post(
    State(service): State<Arc<PostService>>,
    viewer: Viewer,
    Path((kind, id)): Path<(PostKind, Uuid)>,
) -> Result<Json<ApiResponse<PostResponseDto>>> {
    let post = service.get(kind, id, viewer.0).await?;
    Ok(Json(ApiResponse::success(Some(post), None, None)))
}

/// Update fields of a post
#[utoipa::path(
    patch,
    path = "/api/posts/{kind}/{id}",
    params(
        ("kind" = PostKind, Path, description = "Post kind: source or help"),
        ("id" = Uuid, Path, description = "Post ID")
    ),
    request_body = UpdatePostDto,
    responses(
        (status = 200, description = "Post updated", body = ApiResponse<PostResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Post not found")
    ),
    tag = "posts"
)]
pub async fn update_post(
    State(service): State<Arc<PostService>>,
    Path((kind, id)): Path<(PostKind, Uuid)>,
    AppJson(dto): AppJson<UpdatePostDto>,
) -> Result<Json<ApiResponse<PostResponseDto>>> {
    let post = service.update(kind, id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(post),
        Some("Post updated successfully".to_string()),
        None,
    )))
}

/// Delete a post
#[utoipa::path(
    delete,
    path = "/api/posts/{kind}/{id}",
    params(
        ("kind" = PostKind, Path, description = "Post kind: source or help"),
        ("id" = Uuid, Path, description = "Post ID")
    ),
    responses(
        (status = 200, description = "Post deleted"),
        (status = 404, description = "Post not found")
    ),
    tag = "posts"
)]
pub async fn delete_post(
    State(service): State<Arc<PostService>>,
    Path((kind, id)): Path<(PostKind, Uuid)>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(kind, id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Post deleted successfully".to_string()),
        None,
    )))
}

/// Toggle the viewer's heart on a post
#[utoipa::path(
    post,
    path = "/api/posts/{kind}/{id}/heart",
    params(
        ("kind" = PostKind, Path, description = "Post kind: source or help"),
        ("id" = Uuid, Path, description = "Post ID"),
        ("x-viewer-id" = Uuid, Header, description = "Anonymous viewer ID")
    ),
    responses(
        (status = 200, description = "Heart toggled", body = ApiResponse<HeartResponseDto>),
        (status = 400, description = "Missing viewer ID"),
        (status = 404, description = "Post not found")
    ),
    tag = "posts"
)]
pub async fn toggle_heart(
    State(service): State<Arc<PostService>>,
    viewer: Viewer,
    Path((kind, id)): Path<(PostKind, Uuid)>,
) -> Result<Json<ApiResponse<HeartResponseDto>>> {
    let viewer = viewer.require()?;
    let heart = service.toggle_heart(kind, id, viewer).await?;
    Ok(Json(ApiResponse::success(Some(heart), None, None)))
}

/// Flag a post as inaccurate or inappropriate
#[utoipa::path(
    post,
    path = "/api/posts/{kind}/{id}/flag",
    params(
        ("kind" = PostKind, Path, description = "Post kind: source or help"),
        ("id" = Uuid, Path, description = "Post ID")
    ),
    responses(
        (status = 200, description = "Post flagged", body = ApiResponse<PostResponseDto>),
        (status = 404, description = "Post not found")
    ),
    tag = "posts"
)]
pub async fn flag_post(
    State(service): State<Arc<PostService>>,
    viewer: Viewer,
    Path((kind, id)): Path<(PostKind, Uuid)>,
) -> Result<Json<ApiResponse<PostResponseDto>>> {
    let post = service.flag(kind, id, viewer.0).await?;
    Ok(Json(ApiResponse::success(
        Some(post),
        Some("Post flagged for review".to_string()),
        None,
    )))
}

/// Stream the full list of one kind, on connect and after every change
#[utoipa::path(
    get,
    path = "/api/posts/{kind}/stream",
    params(
        ("kind" = PostKind, Path, description = "Post kind: source or help")
    ),
    responses(
        (status = 200, description = "Server-sent `posts` events carrying the full list", content_type = "text/event-stream"),
    ),
    tag = "posts"
)]
pub async fn stream_posts(
    State(service): State<Arc<PostService>>,
    viewer: Viewer,
    Path(kind): Path<PostKind>,
) -> Sse<impl Stream<Item = std::result::Result<Event, axum::Error>>> {
    let subscription = service.subscribe(kind);
    tracing::debug!(
        "Live {} stream opened ({} subscribers)",
        kind,
        service.live().subscriber_count(kind)
    );

    let events = subscription.into_stream().then(move |posts| {
        let service = service.clone();
        async move {
            // Heart lookup failures show as not hearted
            let hearted = service.hearted_by(viewer.0).await.unwrap_or_default();
            let posts: Vec<PostResponseDto> = posts
                .into_iter()
                .map(|p| {
                    let user_hearted = hearted.contains(&p.id);
                    PostResponseDto::from_post(p, user_hearted)
                })
                .collect();
            Event::default().event(POSTS_EVENT).json_data(posts)
        }
    });

    Sse::new(events)
        .keep_alive(KeepAlive::new().interval(Duration::from_secs(SSE_KEEP_ALIVE_SECS)))
}
