use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch, RwLock};
use tokio::time::Instant;
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

use crate::core::config::MapConfig;
use crate::core::error::{AppError, Result};
use crate::features::locations::services::GeolocationProvider;
use crate::features::map::models::{MarkerDiff, PostFilter, SortOrder};
use crate::features::map::services::{merge, MarkerLayer, MergedFeed, PopupRenderer};
use crate::features::posts::dtos::PostResponseDto;
use crate::features::posts::models::{Coordinates, PostKind};
use crate::features::posts::PostService;

/// Per-client map state shared between its HTTP endpoints and its event tasks
pub struct MapSession {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    viewer_location: watch::Sender<Option<Coordinates>>,
    preview: watch::Sender<Option<Coordinates>>,
    /// Open event streams, changed only while holding the sessions lock
    streams: AtomicUsize,
    last_seen: Mutex<Instant>,
}

impl MapSession {
    fn new() -> Self {
        Self {
            id: Uuid::now_v7(),
            created_at: Utc::now(),
            viewer_location: watch::Sender::new(None),
            preview: watch::Sender::new(None),
            streams: AtomicUsize::new(0),
            last_seen: Mutex::new(Instant::now()),
        }
    }

    fn touch(&self) {
        *self.last_seen.lock().unwrap_or_else(|e| e.into_inner()) = Instant::now();
    }

    fn is_idle(&self, ttl: Duration) -> bool {
        let last_seen = *self.last_seen.lock().unwrap_or_else(|e| e.into_inner());
        self.streams.load(Ordering::Acquire) == 0 && last_seen.elapsed() >= ttl
    }
}

/// Position source that waits for a map session's live location
pub struct SessionLocation {
    receiver: watch::Receiver<Option<Coordinates>>,
}

#[async_trait]
impl GeolocationProvider for SessionLocation {
    async fn current_position(&self) -> Result<Coordinates> {
        let mut receiver = self.receiver.clone();
        let position = receiver
            .wait_for(Option::is_some)
            .await
            .map_err(|_| AppError::BadRequest("Map session closed".to_string()))?;
        (*position).ok_or_else(|| AppError::Internal("Session location vanished".to_string()))
    }
}

/// Map sessions, marker streams and the sidebar feed
pub struct MapService {
    posts: Arc<PostService>,
    renderer: Arc<PopupRenderer>,
    default_center: Coordinates,
    config: MapConfig,
    sessions: RwLock<HashMap<Uuid, Arc<MapSession>>>,
}

impl MapService {
    pub fn new(
        posts: Arc<PostService>,
        renderer: Arc<PopupRenderer>,
        default_center: Coordinates,
        config: MapConfig,
    ) -> Self {
        Self {
            posts,
            renderer,
            default_center,
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn default_center(&self) -> Coordinates {
        self.default_center
    }

    pub async fn open_session(&self) -> Arc<MapSession> {
        let session = Arc::new(MapSession::new());
        self.sessions
            .write()
            .await
            .insert(session.id, session.clone());

        tracing::info!("Map session opened: {}", session.id);
        session
    }

    async fn session(&self, id: Uuid) -> Result<Arc<MapSession>> {
        let session = self
            .sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Map session {} not found", id)))?;
        session.touch();
        Ok(session)
    }

    /// Ends one event stream; the session goes away with its last stream
    async fn release_stream(&self, id: Uuid) {
        let mut sessions = self.sessions.write().await;
        let Some(session) = sessions.get(&id) else {
            return;
        };

        session.touch();
        if session.streams.fetch_sub(1, Ordering::AcqRel) == 1 {
            sessions.remove(&id);
            tracing::info!("Map session closed: {}", id);
        }
    }

    /// Drops sessions with no open stream that have been unseen for the idle TTL
    pub async fn reap_idle(&self) -> usize {
        let ttl = self.config.session_idle_ttl;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_idle(ttl));

        let reaped = before - sessions.len();
        if reaped > 0 {
            tracing::info!("Reaped {} idle map sessions", reaped);
        }
        reaped
    }

    /// Runs `reap_idle` every reap interval for the life of the process
    pub fn spawn_reaper(self: &Arc<Self>) {
        let service = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(service.config.reap_interval);
            loop {
                ticker.tick().await;
                service.reap_idle().await;
            }
        });
    }

    #[cfg(test)]
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Record the viewer's live location for the session
    pub async fn set_viewer_location(&self, id: Uuid, position: Coordinates) -> Result<()> {
        let session = self.session(id).await?;
        session.viewer_location.send_replace(Some(position));
        Ok(())
    }

    /// Show (or with `None`, clear) the preview marker of an open form
    pub async fn set_preview(&self, id: Uuid, position: Option<Coordinates>) -> Result<()> {
        let session = self.session(id).await?;
        session.preview.send_replace(position);
        Ok(())
    }

    /// Position provider backed by the session's live location
    pub async fn location_provider(&self, id: Uuid) -> Result<SessionLocation> {
        let session = self.session(id).await?;
        Ok(SessionLocation {
            receiver: session.viewer_location.subscribe(),
        })
    }

    /// Starts the marker event task for a session.
    ///
    /// The stream yields the full marker set as the first diff, then one diff
    /// per change of posts, viewer location or preview. When the client drops
    /// the stream the task unsubscribes; the session is removed once its last
    /// stream has ended.
    pub async fn marker_events(
        self: &Arc<Self>,
        id: Uuid,
    ) -> Result<ReceiverStream<MarkerDiff>> {
        let session = {
            let sessions = self.sessions.read().await;
            let session = sessions
                .get(&id)
                .cloned()
                .ok_or_else(|| AppError::NotFound(format!("Map session {} not found", id)))?;
            session.streams.fetch_add(1, Ordering::AcqRel);
            session
        };
        session.touch();
        let (tx, rx) = mpsc::channel(16);

        let service = self.clone();
        tokio::spawn(async move {
            service.run_session(session, tx).await;
            service.release_stream(id).await;
        });

        Ok(ReceiverStream::new(rx))
    }

    async fn run_session(&self, session: Arc<MapSession>, tx: mpsc::Sender<MarkerDiff>) {
        let mut feed = MergedFeed::new(self.posts.live());
        let mut viewer = session.viewer_location.subscribe();
        let mut preview = session.preview.subscribe();
        let mut layer = MarkerLayer::new(self.renderer.clone(), self.default_center);

        let Some(mut posts) = feed.next().await else {
            return;
        };

        loop {
            let viewer_position = *viewer.borrow_and_update();
            let preview_position = *preview.borrow_and_update();
            let diff = layer.sync(&posts, viewer_position, preview_position);
            if !diff.is_empty() && tx.send(diff).await.is_err() {
                break;
            }

            tokio::select! {
                next = feed.next() => match next {
                    Some(list) => posts = list,
                    None => break,
                },
                changed = viewer.changed() => if changed.is_err() { break },
                changed = preview.changed() => if changed.is_err() { break },
                _ = tx.closed() => break,
            }
        }

        tracing::debug!(
            "Map session {} event stream ended with {} markers shown",
            session.id,
            layer.len()
        );
    }

    /// Sidebar list: both kinds merged, filtered and sorted
    pub async fn feed(
        &self,
        filter: &PostFilter,
        order: SortOrder,
        viewer: Option<Uuid>,
    ) -> Result<Vec<PostResponseDto>> {
        let live = self.posts.live();
        let posts = merge(live.snapshot(PostKind::Source), live.snapshot(PostKind::Help));
        let hearted = self.posts.hearted_by(viewer).await?;

        Ok(filter
            .apply(posts, order)
            .into_iter()
            .map(|p| {
                let user_hearted = hearted.contains(&p.id);
                PostResponseDto::from_post(p, user_hearted)
            })
            .collect())
    }
}
