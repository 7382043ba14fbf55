use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::categories::CategoryService;
use crate::features::locations::services::LocationService;
use crate::features::posts::dtos::{
    HeartResponseDto, PostForm, PostResponseDto, PostSubmission, UpdatePostDto,
};
use crate::features::posts::live::{LiveFeed, Subscription};
use crate::features::posts::models::{NewPost, Post, PostKind};
use crate::features::posts::seed::demo_posts;
use crate::features::posts::store::PostStore;

/// Service for source and help posts.
///
/// Every successful write to the primary store is mirrored into the live
/// feed under the same id. Writes to one kind are serialized with their
/// mirror update so the feed never applies them out of order.
pub struct PostService {
    store: Arc<dyn PostStore>,
    live: Arc<LiveFeed>,
    categories: Arc<CategoryService>,
    locations: Arc<LocationService>,
    source_writes: Mutex<()>,
    help_writes: Mutex<()>,
}

impl PostService {
    pub fn new(
        store: Arc<dyn PostStore>,
        live: Arc<LiveFeed>,
        categories: Arc<CategoryService>,
        locations: Arc<LocationService>,
    ) -> Self {
        Self {
            store,
            live,
            categories,
            locations,
            source_writes: Mutex::new(()),
            help_writes: Mutex::new(()),
        }
    }

    fn writes(&self, kind: PostKind) -> &Mutex<()> {
        match kind {
            PostKind::Source => &self.source_writes,
            PostKind::Help => &self.help_writes,
        }
    }

    pub fn live(&self) -> &Arc<LiveFeed> {
        &self.live
    }

    pub fn subscribe(&self, kind: PostKind) -> Subscription {
        self.live.subscribe(kind)
    }

    /// Validate a form payload and create the post it describes
    pub async fn submit<F: PostForm>(&self, form: F) -> Result<PostResponseDto> {
        form.validate()?;
        let submission = form.into_submission();
        let new_post = self.prepare(submission).await?;
        let post = self.create(new_post).await?;
        Ok(PostResponseDto::from_post(post, false))
    }

    /// Canonical categories, resolved city and derived title for a submission
    async fn prepare(&self, submission: PostSubmission) -> Result<NewPost> {
        let categories = self
            .categories
            .canonicalize(submission.kind, &submission.categories)?;

        let city = match (&submission.city, submission.coordinates) {
            (Some(city), _) => Some(city.clone()),
            (None, Some(coordinates)) => {
                let city = self.locations.reverse_city(coordinates).await;
                (!city.is_empty()).then_some(city)
            }
            (None, None) => None,
        };

        let submission = PostSubmission {
            categories,
            city,
            ..submission
        };

        Ok(NewPost {
            kind: submission.kind,
            title: submission.resolved_title(),
            contact: submission.contact(),
            categories: submission.categories,
            description: submission.description,
            location: submission.location,
            city: submission.city,
            coordinates: submission.coordinates,
            verified: false,
            hearts: 0,
            created_at: Utc::now(),
        })
    }

    /// Insert into the primary store, then mirror into the live feed
    pub async fn create(&self, new_post: NewPost) -> Result<Post> {
        let post = {
            let _guard = self.writes(new_post.kind).lock().await;
            let post = self.store.insert(new_post).await?;
            self.live.upsert(&post);
            post
        };

        tracing::info!(
            "Post created: kind={}, id={}, title={}",
            post.kind,
            post.id,
            post.title
        );
        Ok(post)
    }

    pub async fn list(
        &self,
        kind: PostKind,
        viewer: Option<Uuid>,
    ) -> Result<Vec<PostResponseDto>> {
        let posts = self.store.list(kind).await?;
        let hearted = self.hearted_by(viewer).await?;
        Ok(posts
            .into_iter()
            .map(|p| {
                let user_hearted = hearted.contains(&p.id);
                PostResponseDto::from_post(p, user_hearted)
            })
            .collect())
    }

    pub async fn get(
        &self,
        kind: PostKind,
        id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<PostResponseDto> {
        let post = self.store.get(kind, id).await?;
        let hearted = self.hearted_by(viewer).await?;
        let user_hearted = hearted.contains(&post.id);
        Ok(PostResponseDto::from_post(post, user_hearted))
    }

    pub async fn update(
        &self,
        kind: PostKind,
        id: Uuid,
        dto: UpdatePostDto,
    ) -> Result<PostResponseDto> {
        dto.validate()?;
        let mut changes = dto.into_changes();
        if changes.is_empty() {
            return Err(AppError::BadRequest("No fields to update".to_string()));
        }
        if let Some(categories) = &changes.categories {
            changes.categories = Some(self.categories.canonicalize(kind, categories)?);
        }

        let post = {
            let _guard = self.writes(kind).lock().await;
            let post = self.store.update(kind, id, &changes).await?;
            self.live.upsert(&post);
            post
        };

        tracing::info!("Post updated: kind={}, id={}", kind, id);
        Ok(post.into())
    }

    pub async fn delete(&self, kind: PostKind, id: Uuid) -> Result<()> {
        {
            let _guard = self.writes(kind).lock().await;
            self.store.delete(kind, id).await?;
            self.live.remove(kind, id);
        }

        tracing::info!("Post deleted: kind={}, id={}", kind, id);
        Ok(())
    }

    /// Heart the post for the viewer, or take the heart back
    pub async fn toggle_heart(
        &self,
        kind: PostKind,
        id: Uuid,
        viewer: Uuid,
    ) -> Result<HeartResponseDto> {
        let toggle = {
            let _guard = self.writes(kind).lock().await;
            let toggle = self.store.toggle_heart(kind, id, viewer).await?;
            self.live.upsert(&toggle.post);
            toggle
        };

        tracing::debug!(
            "Heart toggled: kind={}, id={}, hearted={}, hearts={}",
            kind,
            id,
            toggle.hearted,
            toggle.post.hearts
        );
        Ok(HeartResponseDto {
            id: toggle.post.id,
            hearts: toggle.post.hearts,
            user_hearted: toggle.hearted,
        })
    }

    pub async fn flag(
        &self,
        kind: PostKind,
        id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<PostResponseDto> {
        let post = {
            let _guard = self.writes(kind).lock().await;
            let post = self.store.flag(kind, id).await?;
            self.live.upsert(&post);
            post
        };

        tracing::warn!("Post flagged: kind={}, id={}, flags={}", kind, id, post.flags);
        let hearted = self.hearted_by(viewer).await?;
        let user_hearted = hearted.contains(&post.id);
        Ok(PostResponseDto::from_post(post, user_hearted))
    }

    /// Ids hearted by the viewer; empty for an unidentified viewer
    pub async fn hearted_by(&self, viewer: Option<Uuid>) -> Result<HashSet<Uuid>> {
        match viewer {
            Some(viewer) => self.store.hearted_by(viewer).await,
            None => Ok(HashSet::new()),
        }
    }

    /// Load the live feed from the primary store
    pub async fn prime_live_feed(&self) -> Result<()> {
        for kind in PostKind::ALL {
            let posts = self.store.list(kind).await?;
            self.live.load(kind, posts);
        }
        Ok(())
    }

    /// Insert the demo posts when the store holds no posts at all
    pub async fn seed_if_empty(&self) -> Result<usize> {
        if self.store.count().await? > 0 {
            tracing::info!("Post store not empty, skipping demo seed");
            return Ok(0);
        }

        let posts = demo_posts(Utc::now());
        let count = posts.len();
        for post in posts {
            self.create(post).await?;
        }

        tracing::info!("Seeded {} demo posts", count);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::features::posts::dtos::{AskHelpFormDto, PinSourceFormDto};
    use crate::features::posts::models::Coordinates;
    use crate::shared::test_helpers::{post_service, StubGeocoder};

    fn help_form() -> AskHelpFormDto {
        serde_json::from_value(json!({
            "title": "Need Insulin for Senior",
            "category": ["medicine"],
            "description": "Running out of insulin.",
            "fullName": "Pedro Gomez",
            "contactNumber": "09189998877",
            "manualLocation": "Minglanilla",
            "coordinates": [10.2483, 123.7865]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_submit_creates_and_mirrors() {
        let service = post_service(StubGeocoder::with_city("Minglanilla"));
        let mut subscription = service.subscribe(PostKind::Help);
        assert!(subscription.next().await.unwrap().is_empty());

        let created = service.submit(help_form()).await.unwrap();

        assert_eq!(created.kind, PostKind::Help);
        assert!(created.urgent);
        assert!(!created.verified);
        assert_eq!(created.category, vec!["Medicine".to_string()]);
        assert_eq!(created.contact, "Pedro Gomez - 09189998877");
        assert_eq!(created.city.as_deref(), Some("Minglanilla"));

        let live = subscription.next().await.unwrap();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].id, created.id);
    }

    #[tokio::test]
    async fn test_submit_rejects_invalid_form_without_writing() {
        let service = post_service(StubGeocoder::default());
        let mut form = help_form();
        form.contact_number = "12345".to_string();

        let result = service.submit(form).await;
        assert!(matches!(result, Err(AppError::InvalidForm(_))));
        assert!(service.list(PostKind::Help, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_rejects_category_of_other_kind() {
        let service = post_service(StubGeocoder::default());
        let form: PinSourceFormDto = serde_json::from_value(json!({
            "category": ["Rescue"],
            "description": "Boat available",
            "fullName": "Ana Reyes",
            "contactNumber": "09151112233",
            "manualLocation": "Talisay City"
        }))
        .unwrap();

        assert!(matches!(
            service.submit(form).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_heart_twice_restores_count() {
        let service = post_service(StubGeocoder::default());
        service.seed_if_empty().await.unwrap();
        let viewer = Uuid::new_v4();
        let post = service.list(PostKind::Source, None).await.unwrap()[0].clone();

        let hearted = service
            .toggle_heart(PostKind::Source, post.id, viewer)
            .await
            .unwrap();
        assert!(hearted.user_hearted);
        assert_eq!(hearted.hearts, post.hearts + 1);
        let fetched = service
            .get(PostKind::Source, post.id, Some(viewer))
            .await
            .unwrap();
        assert!(fetched.user_hearted);

        let restored = service
            .toggle_heart(PostKind::Source, post.id, viewer)
            .await
            .unwrap();
        assert!(!restored.user_hearted);
        assert_eq!(restored.hearts, post.hearts);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_hearts_leave_mirror_matching_store() {
        let service = Arc::new(post_service(StubGeocoder::default()));
        let created = service.submit(help_form()).await.unwrap();

        let toggles: Vec<_> = (0..64)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .toggle_heart(PostKind::Help, created.id, Uuid::new_v4())
                        .await
                        .unwrap()
                })
            })
            .collect();
        for toggle in toggles {
            toggle.await.unwrap();
        }
        service.flag(PostKind::Help, created.id, None).await.unwrap();

        let stored = service.get(PostKind::Help, created.id, None).await.unwrap();
        let mirrored = service.live().snapshot(PostKind::Help);
        assert_eq!(stored.hearts, 64);
        assert_eq!(mirrored[0].hearts, stored.hearts);
        assert_eq!(mirrored[0].flags, 1);
        assert_eq!(mirrored[0].updated_at, stored.updated_at);
    }

    #[tokio::test]
    async fn test_update_and_delete_reach_live_feed() {
        let service = post_service(StubGeocoder::default());
        let created = service.submit(help_form()).await.unwrap();
        let mut subscription = service.subscribe(PostKind::Help);
        subscription.next().await.unwrap();

        let update = UpdatePostDto {
            verified: Some(true),
            coordinates: Coordinates::new(10.25, 123.79),
            ..Default::default()
        };
        let updated = service
            .update(PostKind::Help, created.id, update)
            .await
            .unwrap();
        assert!(updated.verified);
        assert!(subscription.next().await.unwrap()[0].verified);

        service.delete(PostKind::Help, created.id).await.unwrap();
        assert!(subscription.next().await.unwrap().is_empty());
        assert!(matches!(
            service.get(PostKind::Help, created.id, None).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_update_is_rejected() {
        let service = post_service(StubGeocoder::default());
        let created = service.submit(help_form()).await.unwrap();

        let result = service
            .update(PostKind::Help, created.id, UpdatePostDto::default())
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_seed_only_into_empty_store() {
        let service = post_service(StubGeocoder::default());
        assert_eq!(service.seed_if_empty().await.unwrap(), 5);
        assert_eq!(service.seed_if_empty().await.unwrap(), 0);
        assert_eq!(service.live().snapshot(PostKind::Source).len(), 3);
    }

    #[tokio::test]
    async fn test_flag_counts_up_and_keeps_post_visible() {
        let service = post_service(StubGeocoder::default());
        let created = service.submit(help_form()).await.unwrap();

        let flagged = service.flag(PostKind::Help, created.id, None).await.unwrap();
        assert_eq!(flagged.flags, 1);
        assert_eq!(service.live().snapshot(PostKind::Help).len(), 1);
    }
}
