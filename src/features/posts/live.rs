//! Live subscription store.
//!
//! Mirrors every write to the primary store, keyed by the same id, and pushes
//! the full list of a collection to its subscribers whenever it changes.
//! Delivery is latest-value: a slow subscriber sees the newest list and may
//! skip intermediate states.

use std::collections::HashMap;

use futures::Stream;
use tokio::sync::watch;
use uuid::Uuid;

use crate::features::posts::models::{Post, PostKind};

type Records = HashMap<Uuid, Post>;

/// Per-kind keyed mirror of the primary store
pub struct LiveFeed {
    sources: watch::Sender<Records>,
    help: watch::Sender<Records>,
}

impl LiveFeed {
    pub fn new() -> Self {
        Self {
            sources: watch::Sender::new(Records::new()),
            help: watch::Sender::new(Records::new()),
        }
    }

    fn channel(&self, kind: PostKind) -> &watch::Sender<Records> {
        match kind {
            PostKind::Source => &self.sources,
            PostKind::Help => &self.help,
        }
    }

    /// Replaces a whole collection, used when priming from the primary store
    pub fn load(&self, kind: PostKind, posts: Vec<Post>) {
        let records: Records = posts.into_iter().map(|p| (p.id, p)).collect();
        tracing::debug!("Live feed {} loaded with {} records", kind, records.len());
        self.channel(kind).send_replace(records);
    }

    /// Inserts or replaces a record and notifies subscribers
    pub fn upsert(&self, post: &Post) {
        let post = post.clone();
        self.channel(post.kind).send_modify(|records| {
            records.insert(post.id, post);
        });
    }

    /// Removes a record; subscribers are only notified when something was removed
    pub fn remove(&self, kind: PostKind, id: Uuid) {
        self.channel(kind)
            .send_if_modified(|records| records.remove(&id).is_some());
    }

    /// Current list of a collection, newest first
    pub fn snapshot(&self, kind: PostKind) -> Vec<Post> {
        sorted(&self.channel(kind).borrow())
    }

    pub fn subscribe(&self, kind: PostKind) -> Subscription {
        Subscription {
            kind,
            receiver: self.channel(kind).subscribe(),
            primed: false,
        }
    }

    pub fn subscriber_count(&self, kind: PostKind) -> usize {
        self.channel(kind).receiver_count()
    }
}

impl Default for LiveFeed {
    fn default() -> Self {
        Self::new()
    }
}

fn sorted(records: &Records) -> Vec<Post> {
    let mut posts: Vec<Post> = records.values().cloned().collect();
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    posts
}

/// A listener on one collection of the live feed.
///
/// The first call to [`Subscription::next`] yields the current list; later
/// calls wait for the next change. Dropping the subscription (or calling
/// [`Subscription::unsubscribe`]) detaches it.
pub struct Subscription {
    kind: PostKind,
    receiver: watch::Receiver<Records>,
    primed: bool,
}

impl Subscription {
    /// Waits until the collection changes; returns `false` once the feed is gone
    pub async fn changed(&mut self) -> bool {
        if !self.primed {
            self.primed = true;
            return true;
        }
        self.receiver.changed().await.is_ok()
    }

    /// Marks the current list as seen and returns it
    pub fn latest(&mut self) -> Vec<Post> {
        self.primed = true;
        sorted(&self.receiver.borrow_and_update())
    }

    /// Next full list, or `None` once the feed is gone
    pub async fn next(&mut self) -> Option<Vec<Post>> {
        if !self.changed().await {
            return None;
        }
        Some(sorted(&self.receiver.borrow_and_update()))
    }

    pub fn unsubscribe(self) {
        tracing::debug!("Live feed {} subscriber detached", self.kind);
    }

    pub fn into_stream(self) -> impl Stream<Item = Vec<Post>> {
        futures::stream::unfold(self, |mut subscription| async move {
            subscription
                .next()
                .await
                .map(|posts| (posts, subscription))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;

    use super::*;

    fn post(kind: PostKind, title: &str) -> Post {
        let now = Utc::now();
        Post {
            id: Uuid::now_v7(),
            kind,
            categories: vec!["Food".to_string()],
            title: title.to_string(),
            description: "Hot meals".to_string(),
            location: "Lapu-Lapu City".to_string(),
            city: None,
            coordinates: None,
            contact: "LGU Relief Ops - 09271234567".to_string(),
            verified: true,
            hearts: 0,
            flags: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_subscriber_gets_current_list_first() {
        let feed = LiveFeed::new();
        feed.upsert(&post(PostKind::Source, "Kitchen"));

        let mut subscription = feed.subscribe(PostKind::Source);
        let first = subscription.next().await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].title, "Kitchen");
    }

    #[tokio::test]
    async fn test_every_write_publishes_full_list() {
        let feed = LiveFeed::new();
        let mut subscription = feed.subscribe(PostKind::Help);
        assert!(subscription.next().await.unwrap().is_empty());

        let first = post(PostKind::Help, "Evacuation");
        feed.upsert(&first);
        assert_eq!(subscription.next().await.unwrap().len(), 1);

        feed.upsert(&post(PostKind::Help, "Insulin"));
        assert_eq!(subscription.next().await.unwrap().len(), 2);

        feed.remove(PostKind::Help, first.id);
        let after_remove = subscription.next().await.unwrap();
        assert_eq!(after_remove.len(), 1);
        assert_eq!(after_remove[0].title, "Insulin");
    }

    #[tokio::test]
    async fn test_other_collection_does_not_notify() {
        let feed = LiveFeed::new();
        let mut subscription = feed.subscribe(PostKind::Source);
        subscription.next().await.unwrap();

        feed.upsert(&post(PostKind::Help, "Rescue"));
        feed.remove(PostKind::Source, Uuid::new_v4());

        let waited = tokio::time::timeout(Duration::from_millis(50), subscription.next()).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn test_unsubscribe_detaches_listener() {
        let feed = LiveFeed::new();
        let subscription = feed.subscribe(PostKind::Source);
        assert_eq!(feed.subscriber_count(PostKind::Source), 1);

        subscription.unsubscribe();
        assert_eq!(feed.subscriber_count(PostKind::Source), 0);
    }
}
