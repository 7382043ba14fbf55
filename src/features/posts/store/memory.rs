use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::PostStore;
use crate::core::error::{AppError, Result};
use crate::features::posts::models::{HeartToggle, NewPost, Post, PostChanges, PostKind};

#[derive(Default)]
struct Collections {
    posts: HashMap<PostKind, HashMap<Uuid, Post>>,
    hearts: HashSet<(Uuid, Uuid)>,
}

impl Collections {
    fn post_mut(&mut self, kind: PostKind, id: Uuid) -> Result<&mut Post> {
        self.posts
            .get_mut(&kind)
            .and_then(|collection| collection.get_mut(&id))
            .ok_or_else(|| not_found(kind, id))
    }
}

fn not_found(kind: PostKind, id: Uuid) -> AppError {
    AppError::NotFound(format!("{} post {} not found", kind, id))
}

/// Process-local post store
#[derive(Default)]
pub struct MemoryPostStore {
    inner: RwLock<Collections>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn insert(&self, new: NewPost) -> Result<Post> {
        let post = Post {
            id: Uuid::now_v7(),
            kind: new.kind,
            categories: new.categories,
            title: new.title,
            description: new.description,
            location: new.location,
            city: new.city,
            coordinates: new.coordinates,
            contact: new.contact,
            verified: new.verified,
            hearts: new.hearts.max(0),
            flags: 0,
            created_at: new.created_at,
            updated_at: new.created_at,
        };

        let mut inner = self.inner.write().await;
        inner
            .posts
            .entry(post.kind)
            .or_default()
            .insert(post.id, post.clone());
        Ok(post)
    }

    async fn list(&self, kind: PostKind) -> Result<Vec<Post>> {
        let inner = self.inner.read().await;
        let mut posts: Vec<Post> = inner
            .posts
            .get(&kind)
            .map(|collection| collection.values().cloned().collect())
            .unwrap_or_default();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(posts)
    }

    async fn get(&self, kind: PostKind, id: Uuid) -> Result<Post> {
        let inner = self.inner.read().await;
        inner
            .posts
            .get(&kind)
            .and_then(|collection| collection.get(&id))
            .cloned()
            .ok_or_else(|| not_found(kind, id))
    }

    async fn update(&self, kind: PostKind, id: Uuid, changes: &PostChanges) -> Result<Post> {
        let mut inner = self.inner.write().await;
        let post = inner.post_mut(kind, id)?;
        changes.apply_to(post, Utc::now());
        Ok(post.clone())
    }

    async fn delete(&self, kind: PostKind, id: Uuid) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner
            .posts
            .get_mut(&kind)
            .and_then(|collection| collection.remove(&id))
            .ok_or_else(|| not_found(kind, id))?;
        inner.hearts.retain(|(post_id, _)| *post_id != id);
        Ok(())
    }

    async fn toggle_heart(&self, kind: PostKind, id: Uuid, viewer: Uuid) -> Result<HeartToggle> {
        let mut inner = self.inner.write().await;
        // Existence check before touching the heart set
        inner.post_mut(kind, id)?;

        let hearted = if inner.hearts.remove(&(id, viewer)) {
            false
        } else {
            inner.hearts.insert((id, viewer));
            true
        };

        let post = inner.post_mut(kind, id)?;
        post.hearts = if hearted {
            post.hearts + 1
        } else {
            (post.hearts - 1).max(0)
        };
        post.updated_at = Utc::now();

        Ok(HeartToggle {
            post: post.clone(),
            hearted,
        })
    }

    async fn flag(&self, kind: PostKind, id: Uuid) -> Result<Post> {
        let mut inner = self.inner.write().await;
        let post = inner.post_mut(kind, id)?;
        post.flags += 1;
        post.updated_at = Utc::now();
        Ok(post.clone())
    }

    async fn hearted_by(&self, viewer: Uuid) -> Result<HashSet<Uuid>> {
        let inner = self.inner.read().await;
        Ok(inner
            .hearts
            .iter()
            .filter(|(_, v)| *v == viewer)
            .map(|(post_id, _)| *post_id)
            .collect())
    }

    async fn count(&self) -> Result<i64> {
        let inner = self.inner.read().await;
        Ok(inner.posts.values().map(|c| c.len() as i64).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_post(kind: PostKind, hearts: i32) -> NewPost {
        NewPost {
            kind,
            categories: vec!["Water".to_string()],
            title: "Water refilling".to_string(),
            description: "Free drinking water".to_string(),
            location: "Mandaue City".to_string(),
            city: Some("Mandaue City".to_string()),
            coordinates: None,
            contact: "Juan Dela Cruz - 09198765432".to_string(),
            verified: false,
            hearts,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_collections_are_separate() {
        let store = MemoryPostStore::new();
        let source = store.insert(new_post(PostKind::Source, 0)).await.unwrap();
        store.insert(new_post(PostKind::Help, 0)).await.unwrap();

        assert_eq!(store.list(PostKind::Source).await.unwrap().len(), 1);
        assert_eq!(store.list(PostKind::Help).await.unwrap().len(), 1);
        assert!(matches!(
            store.get(PostKind::Help, source.id).await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_heart_toggle_is_per_viewer() {
        let store = MemoryPostStore::new();
        let post = store.insert(new_post(PostKind::Source, 4)).await.unwrap();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let first = store.toggle_heart(PostKind::Source, post.id, alice).await.unwrap();
        assert!(first.hearted);
        assert_eq!(first.post.hearts, 5);

        let second = store.toggle_heart(PostKind::Source, post.id, bob).await.unwrap();
        assert_eq!(second.post.hearts, 6);

        let undo = store.toggle_heart(PostKind::Source, post.id, alice).await.unwrap();
        assert!(!undo.hearted);
        assert_eq!(undo.post.hearts, 5);

        assert!(store.hearted_by(bob).await.unwrap().contains(&post.id));
        assert!(store.hearted_by(alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_heart_and_flag_bump_updated_at() {
        let store = MemoryPostStore::new();
        let mut draft = new_post(PostKind::Source, 0);
        draft.created_at = Utc::now() - chrono::Duration::minutes(5);
        let post = store.insert(draft).await.unwrap();

        let hearted = store
            .toggle_heart(PostKind::Source, post.id, Uuid::new_v4())
            .await
            .unwrap();
        assert!(hearted.post.updated_at > post.updated_at);

        let flagged = store.flag(PostKind::Source, post.id).await.unwrap();
        assert!(flagged.updated_at >= hearted.post.updated_at);
        assert_eq!(flagged.flags, 1);
    }

    #[tokio::test]
    async fn test_delete_clears_hearts() {
        let store = MemoryPostStore::new();
        let post = store.insert(new_post(PostKind::Help, 0)).await.unwrap();
        let viewer = Uuid::new_v4();
        store.toggle_heart(PostKind::Help, post.id, viewer).await.unwrap();

        store.delete(PostKind::Help, post.id).await.unwrap();

        assert!(store.hearted_by(viewer).await.unwrap().is_empty());
        assert!(store.delete(PostKind::Help, post.id).await.is_err());
    }
}
