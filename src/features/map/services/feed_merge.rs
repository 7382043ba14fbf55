use crate::features::posts::live::{LiveFeed, Subscription};
use crate::features::posts::models::{Post, PostKind};

/// Both live collections as one list, newest first
pub struct MergedFeed {
    sources: Subscription,
    help: Subscription,
    primed: bool,
}

impl MergedFeed {
    pub fn new(live: &LiveFeed) -> Self {
        Self {
            sources: live.subscribe(PostKind::Source),
            help: live.subscribe(PostKind::Help),
            primed: false,
        }
    }

    /// Current merged list first, then again whenever either collection changes.
    ///
    /// Returns `None` once the live feed is gone. Cancel safe.
    pub async fn next(&mut self) -> Option<Vec<Post>> {
        if self.primed {
            let alive = tokio::select! {
                alive = self.sources.changed() => alive,
                alive = self.help.changed() => alive,
            };
            if !alive {
                return None;
            }
        }
        self.primed = true;
        Some(merge(self.sources.latest(), self.help.latest()))
    }
}

pub fn merge(mut sources: Vec<Post>, help: Vec<Post>) -> Vec<Post> {
    sources.extend(help);
    sources.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    sources
}
