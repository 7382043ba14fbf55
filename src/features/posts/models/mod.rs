mod coordinates;
mod post;

pub use coordinates::Coordinates;
pub use post::{
    deserialize_categories, normalize_categories, HeartToggle, NewPost, Post, PostChanges,
    PostKind, PostRow,
};
