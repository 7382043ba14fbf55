mod feed_merge;
mod map_service;
mod marker_layer;
mod popup_renderer;

pub use feed_merge::{merge, MergedFeed};
pub use map_service::{MapService, MapSession, SessionLocation};
pub use marker_layer::MarkerLayer;
pub use popup_renderer::{PopupRenderer, TemplateError};
