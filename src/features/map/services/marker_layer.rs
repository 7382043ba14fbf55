use std::collections::BTreeMap;
use std::sync::Arc;

use crate::features::map::models::{Marker, MarkerDiff, MarkerId, MarkerKind};
use crate::features::map::services::PopupRenderer;
use crate::features::posts::models::{Coordinates, Post, PostKind};

/// Marker state of one map client.
///
/// Holds the markers the client currently shows and computes the minimal
/// diff needed to match a new post list, viewer location and preview.
pub struct MarkerLayer {
    renderer: Arc<PopupRenderer>,
    default_center: Coordinates,
    markers: BTreeMap<MarkerId, Marker>,
}

impl MarkerLayer {
    pub fn new(renderer: Arc<PopupRenderer>, default_center: Coordinates) -> Self {
        Self {
            renderer,
            default_center,
            markers: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    fn post_marker(&self, post: &Post) -> Marker {
        let popup = match self.renderer.render(post) {
            Ok(html) => Some(html),
            Err(e) => {
                tracing::warn!("Marker {} shown without popup: {}", post.id, e);
                None
            }
        };

        Marker {
            id: MarkerId::Post(post.id).to_string(),
            kind: match post.kind {
                PostKind::Source => MarkerKind::Source,
                PostKind::Help => MarkerKind::Help,
            },
            position: post.position(self.default_center),
            urgent: post.urgent(),
            popup,
        }
    }

    fn point_marker(id: MarkerId, kind: MarkerKind, position: Coordinates) -> Marker {
        Marker {
            id: id.to_string(),
            kind,
            position,
            urgent: false,
            popup: None,
        }
    }

    /// Brings the layer in line with the given state and returns what changed
    pub fn sync(
        &mut self,
        posts: &[Post],
        viewer: Option<Coordinates>,
        preview: Option<Coordinates>,
    ) -> MarkerDiff {
        let mut wanted: BTreeMap<MarkerId, Marker> = posts
            .iter()
            .map(|post| (MarkerId::Post(post.id), self.post_marker(post)))
            .collect();
        if let Some(position) = viewer {
            wanted.insert(
                MarkerId::Viewer,
                Self::point_marker(MarkerId::Viewer, MarkerKind::Viewer, position),
            );
        }
        if let Some(position) = preview {
            wanted.insert(
                MarkerId::Preview,
                Self::point_marker(MarkerId::Preview, MarkerKind::Preview, position),
            );
        }

        let mut diff = MarkerDiff::default();
        for (id, marker) in &self.markers {
            if !wanted.contains_key(id) {
                diff.removed.push(marker.id.clone());
            }
        }
        for (id, marker) in &wanted {
            match self.markers.get(id) {
                None => diff.added.push(marker.clone()),
                Some(existing) if existing != marker => diff.updated.push(marker.clone()),
                Some(_) => {}
            }
        }

        self.markers = wanted;
        diff
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn layer() -> MarkerLayer {
        let renderer = PopupRenderer::new("").unwrap();
        MarkerLayer::new(Arc::new(renderer), Coordinates::CEBU_CITY)
    }

    fn post(kind: PostKind, coordinates: Option<Coordinates>) -> Post {
        let now = Utc::now();
        Post {
            id: Uuid::now_v7(),
            kind,
            categories: vec!["Shelter".to_string()],
            title: "Evacuation center".to_string(),
            description: "Covered court open".to_string(),
            location: "Consolacion".to_string(),
            city: None,
            coordinates,
            contact: "Brgy. Captain - 09171234567".to_string(),
            verified: false,
            hearts: 0,
            flags: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_first_sync_adds_everything() {
        let mut layer = layer();
        let posts = vec![
            post(PostKind::Source, Coordinates::new(10.38, 123.96)),
            post(PostKind::Help, None),
        ];

        let diff = layer.sync(&posts, Some(Coordinates::CEBU_CITY), None);

        assert_eq!(diff.added.len(), 3);
        assert!(diff.updated.is_empty() && diff.removed.is_empty());
        let help = diff.added.iter().find(|m| m.kind == MarkerKind::Help).unwrap();
        assert!(help.urgent);
        assert_eq!(help.position, Coordinates::CEBU_CITY);
        assert!(help.popup.is_some());
    }

    #[test]
    fn test_unchanged_markers_are_not_reemitted() {
        let mut layer = layer();
        let mut posts = vec![
            post(PostKind::Source, Coordinates::new(10.38, 123.96)),
            post(PostKind::Source, Coordinates::new(10.30, 123.90)),
        ];
        layer.sync(&posts, None, None);

        posts[1].hearts += 1;
        let diff = layer.sync(&posts, None, None);

        assert!(diff.added.is_empty());
        assert_eq!(diff.updated.len(), 1);
        assert_eq!(diff.updated[0].id, format!("post:{}", posts[1].id));
        assert!(layer.sync(&posts, None, None).is_empty());
    }

    #[test]
    fn test_removed_post_and_cleared_preview() {
        let mut layer = layer();
        let posts = vec![post(PostKind::Help, Coordinates::new(10.24, 123.84))];
        let preview = Coordinates::new(10.31, 123.97);

        let diff = layer.sync(&posts, None, preview);
        assert_eq!(diff.added.len(), 2);
        assert!(diff.added.iter().any(|m| m.id == "preview"));

        let diff = layer.sync(&[], None, None);
        assert_eq!(diff.removed.len(), 2);
        assert!(diff.removed.contains(&"preview".to_string()));
        assert!(layer.is_empty());
    }

    #[test]
    fn test_viewer_marker_moves() {
        let mut layer = layer();
        layer.sync(&[], Coordinates::new(10.31, 123.89), None);

        let diff = layer.sync(&[], Coordinates::new(10.32, 123.90), None);
        assert_eq!(diff.updated.len(), 1);
        assert_eq!(diff.updated[0].kind, MarkerKind::Viewer);
        assert_eq!(layer.len(), 1);
    }
}
