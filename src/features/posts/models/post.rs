use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::Coordinates;

/// Kind of a map post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    /// An available resource (water, food, power, ...)
    Source,
    /// A request for assistance; always urgent
    Help,
}

impl PostKind {
    pub const ALL: [PostKind; 2] = [PostKind::Source, PostKind::Help];

    /// Backing collection (table) name
    pub fn collection(&self) -> &'static str {
        match self {
            PostKind::Source => "sources",
            PostKind::Help => "need_help",
        }
    }

    pub fn is_urgent(&self) -> bool {
        matches!(self, PostKind::Help)
    }
}

impl std::fmt::Display for PostKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostKind::Source => write!(f, "source"),
            PostKind::Help => write!(f, "help"),
        }
    }
}

/// A source or help post as stored
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: Uuid,
    pub kind: PostKind,
    pub categories: Vec<String>,
    pub title: String,
    pub description: String,
    pub location: String,
    pub city: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub contact: String,
    pub verified: bool,
    pub hearts: i32,
    pub flags: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn urgent(&self) -> bool {
        self.kind.is_urgent()
    }

    /// Map position, falling back to `default_center` when the post has none
    pub fn position(&self, default_center: Coordinates) -> Coordinates {
        self.coordinates.unwrap_or(default_center)
    }
}

/// Database row for both post collections
#[derive(Debug, Clone, FromRow)]
pub struct PostRow {
    pub id: Uuid,
    pub categories: Vec<String>,
    pub title: String,
    pub description: String,
    pub location: String,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub contact: String,
    pub verified: bool,
    pub hearts: i32,
    pub flags: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostRow {
    pub fn into_post(self, kind: PostKind) -> Post {
        Post {
            id: self.id,
            kind,
            categories: self.categories,
            title: self.title,
            description: self.description,
            location: self.location,
            city: self.city,
            coordinates: Coordinates::from_parts(self.latitude, self.longitude),
            contact: self.contact,
            verified: self.verified,
            hearts: self.hearts,
            flags: self.flags,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Data for creating a new post
#[derive(Debug, Clone)]
pub struct NewPost {
    pub kind: PostKind,
    pub categories: Vec<String>,
    pub title: String,
    pub description: String,
    pub location: String,
    pub city: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub contact: String,
    pub verified: bool,
    pub hearts: i32,
    pub created_at: DateTime<Utc>,
}

/// Partial update applied by id
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub categories: Option<Vec<String>>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub city: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub contact: Option<String>,
    pub verified: Option<bool>,
}

impl PostChanges {
    pub fn is_empty(&self) -> bool {
        self.categories.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.city.is_none()
            && self.coordinates.is_none()
            && self.contact.is_none()
            && self.verified.is_none()
    }

    /// Applies the changes in place and bumps `updated_at`
    pub fn apply_to(&self, post: &mut Post, now: DateTime<Utc>) {
        if let Some(categories) = &self.categories {
            post.categories = categories.clone();
        }
        if let Some(title) = &self.title {
            post.title = title.clone();
        }
        if let Some(description) = &self.description {
            post.description = description.clone();
        }
        if let Some(location) = &self.location {
            post.location = location.clone();
        }
        if let Some(city) = &self.city {
            post.city = Some(city.clone());
        }
        if let Some(coordinates) = self.coordinates {
            post.coordinates = Some(coordinates);
        }
        if let Some(contact) = &self.contact {
            post.contact = contact.clone();
        }
        if let Some(verified) = self.verified {
            post.verified = verified;
        }
        post.updated_at = now;
    }
}

/// Result of toggling a viewer's heart on a post
#[derive(Debug, Clone)]
pub struct HeartToggle {
    pub post: Post,
    pub hearted: bool,
}

/// Trims labels, drops empty ones and removes duplicates keeping first occurrence
pub fn normalize_categories<I, S>(labels: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for label in labels {
        let label = label.as_ref().trim();
        if label.is_empty() {
            continue;
        }
        if !normalized.iter().any(|c| c.eq_ignore_ascii_case(label)) {
            normalized.push(label.to_string());
        }
    }
    normalized
}

/// Deserializes a category field given either as one label or a list of labels
pub fn deserialize_categories<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(label) => normalize_categories([label]),
        OneOrMany::Many(labels) => normalize_categories(labels),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(deserialize_with = "deserialize_categories")]
        category: Vec<String>,
    }

    #[test]
    fn test_category_string_is_normalized_to_list() {
        let holder: Holder = serde_json::from_str(r#"{"category": "Water"}"#).unwrap();
        assert_eq!(holder.category, vec!["Water".to_string()]);

        let holder: Holder =
            serde_json::from_str(r#"{"category": [" Food ", "food", "", "Water"]}"#).unwrap();
        assert_eq!(holder.category, vec!["Food".to_string(), "Water".to_string()]);
    }

    #[test]
    fn test_help_is_always_urgent() {
        assert!(PostKind::Help.is_urgent());
        assert!(!PostKind::Source.is_urgent());
    }

    #[test]
    fn test_changes_apply_and_touch_updated_at() {
        let created = Utc::now() - chrono::Duration::hours(2);
        let mut post = Post {
            id: Uuid::now_v7(),
            kind: PostKind::Source,
            categories: vec!["Water".to_string()],
            title: "Water station".to_string(),
            description: "Free water".to_string(),
            location: "Cebu City".to_string(),
            city: None,
            coordinates: None,
            contact: "Maria Santos - 09123456789".to_string(),
            verified: false,
            hearts: 0,
            flags: 0,
            created_at: created,
            updated_at: created,
        };
        let changes = PostChanges {
            verified: Some(true),
            city: Some("Cebu City".to_string()),
            ..Default::default()
        };
        let now = Utc::now();
        changes.apply_to(&mut post, now);

        assert!(post.verified);
        assert_eq!(post.city.as_deref(), Some("Cebu City"));
        assert_eq!(post.updated_at, now);
        assert_eq!(post.created_at, created);
        assert_eq!(post.position(Coordinates::CEBU_CITY), Coordinates::CEBU_CITY);
    }
}
