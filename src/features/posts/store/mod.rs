//! Primary post store.
//!
//! Each post kind lives in its own collection (`sources`, `need_help`). The
//! Postgres store backs production deployments; the in-memory store is used
//! when no database is configured and by tests.

mod memory;
mod postgres;

use std::collections::HashSet;

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::posts::models::{HeartToggle, NewPost, Post, PostChanges, PostKind};

pub use memory::MemoryPostStore;
pub use postgres::PgPostStore;

#[async_trait]
pub trait PostStore: Send + Sync {
    /// Persists a post and returns it with its generated id
    async fn insert(&self, post: NewPost) -> Result<Post>;

    async fn list(&self, kind: PostKind) -> Result<Vec<Post>>;

    async fn get(&self, kind: PostKind, id: Uuid) -> Result<Post>;

    async fn update(&self, kind: PostKind, id: Uuid, changes: &PostChanges) -> Result<Post>;

    async fn delete(&self, kind: PostKind, id: Uuid) -> Result<()>;

    /// Hearts the post for `viewer`, or removes the heart if already present
    async fn toggle_heart(&self, kind: PostKind, id: Uuid, viewer: Uuid) -> Result<HeartToggle>;

    async fn flag(&self, kind: PostKind, id: Uuid) -> Result<Post>;

    /// Ids of every post the viewer has hearted
    async fn hearted_by(&self, viewer: Uuid) -> Result<HashSet<Uuid>>;

    async fn count(&self) -> Result<i64>;
}
