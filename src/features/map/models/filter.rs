use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::posts::models::{Post, PostKind};

/// Creation-time ordering of the sidebar list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Sidebar filter; every set criterion must match
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub city: Option<String>,
    pub category: Option<String>,
    pub kind: Option<PostKind>,
}

fn criterion(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty() && v != "all")
}

impl PostFilter {
    /// Builds a filter from raw query values; blank and `All` mean no constraint
    pub fn new(city: Option<String>, category: Option<String>, kind: Option<PostKind>) -> Self {
        Self {
            city: criterion(city),
            category: criterion(category),
            kind,
        }
    }

    /// City matches the resolved city, or else the location label, by substring
    fn matches_city(post: &Post, city: &str) -> bool {
        match &post.city {
            Some(post_city) if !post_city.is_empty() => post_city.to_lowercase().contains(city),
            _ => post.location.to_lowercase().contains(city),
        }
    }

    pub fn matches(&self, post: &Post) -> bool {
        if self.kind.is_some_and(|kind| kind != post.kind) {
            return false;
        }
        if let Some(city) = &self.city {
            if !Self::matches_city(post, city) {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if !post.categories.iter().any(|c| c.to_lowercase() == *category) {
                return false;
            }
        }
        true
    }

    /// Filters then sorts by creation time; ties break on id
    pub fn apply(&self, posts: Vec<Post>, order: SortOrder) -> Vec<Post> {
        let mut posts: Vec<Post> = posts.into_iter().filter(|p| self.matches(p)).collect();
        posts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        if order == SortOrder::Desc {
            posts.reverse();
        }
        posts
    }
}
