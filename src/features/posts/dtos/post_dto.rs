use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::posts::models::{
    normalize_categories, Coordinates, Post, PostChanges, PostKind,
};
use crate::shared::validation::PH_MOBILE_REGEX;

/// Response DTO for a map post
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostResponseDto {
    pub id: Uuid,
    pub kind: PostKind,
    pub category: Vec<String>,
    pub title: String,
    pub description: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    pub contact: String,
    pub verified: bool,
    pub urgent: bool,
    pub hearts: i32,
    pub flags: i32,
    /// Whether the requesting viewer has hearted this post
    pub user_hearted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostResponseDto {
    pub fn from_post(post: Post, user_hearted: bool) -> Self {
        Self {
            urgent: post.urgent(),
            id: post.id,
            kind: post.kind,
            category: post.categories,
            title: post.title,
            description: post.description,
            location: post.location,
            city: post.city,
            coordinates: post.coordinates,
            contact: post.contact,
            verified: post.verified,
            hearts: post.hearts,
            flags: post.flags,
            user_hearted,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

impl From<Post> for PostResponseDto {
    fn from(post: Post) -> Self {
        Self::from_post(post, false)
    }
}

/// Request DTO for a partial post update
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostDto {
    #[validate(length(min = 1, message = "Please select at least one category."))]
    pub category: Option<Vec<String>>,

    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: Option<String>,

    #[validate(length(min = 1, message = "Location must not be empty"))]
    pub location: Option<String>,

    pub city: Option<String>,

    pub coordinates: Option<Coordinates>,

    #[validate(length(min = 1, message = "Contact must not be empty"))]
    pub contact: Option<String>,

    pub verified: Option<bool>,
}

impl UpdatePostDto {
    pub fn into_changes(self) -> PostChanges {
        PostChanges {
            categories: self.category.map(normalize_categories),
            title: self.title.map(|t| t.trim().to_string()),
            description: self.description.map(|d| d.trim().to_string()),
            location: self.location.map(|l| l.trim().to_string()),
            city: self.city.map(|c| c.trim().to_string()),
            coordinates: self.coordinates,
            contact: self.contact.map(|c| c.trim().to_string()),
            verified: self.verified,
        }
    }
}

/// Response DTO for a heart toggle
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HeartResponseDto {
    pub id: Uuid,
    pub hearts: i32,
    pub user_hearted: bool,
}

/// Mobile number at the end of a `"<name> - <number>"` contact line, if dialable
pub fn contact_mobile_number(contact: &str) -> Option<&str> {
    contact
        .rsplit(" - ")
        .next()
        .map(str::trim)
        .filter(|number| PH_MOBILE_REGEX.is_match(number))
}
