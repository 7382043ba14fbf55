use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::PostStore;
use crate::core::error::{AppError, Result};
use crate::features::posts::models::{
    HeartToggle, NewPost, Post, PostChanges, PostKind, PostRow,
};

const POST_COLUMNS: &str = "id, categories, title, description, location, city, latitude, \
     longitude, contact, verified, hearts, flags, created_at, updated_at";

fn db_error(action: &str, kind: PostKind) -> impl FnOnce(sqlx::Error) -> AppError + '_ {
    move |e| {
        tracing::error!("Failed to {} {} post: {:?}", action, kind, e);
        AppError::Database(e)
    }
}

fn not_found(kind: PostKind, id: Uuid) -> AppError {
    AppError::NotFound(format!("{} post {} not found", kind, id))
}

/// Postgres-backed post store; one table per post kind
pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn insert(&self, new: NewPost) -> Result<Post> {
        let kind = new.kind;
        let sql = format!(
            r#"
            INSERT INTO {} (id, categories, title, description, location, city, latitude,
                            longitude, contact, verified, hearts, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
            RETURNING {}
            "#,
            kind.collection(),
            POST_COLUMNS
        );

        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(Uuid::now_v7())
            .bind(&new.categories)
            .bind(&new.title)
            .bind(&new.description)
            .bind(&new.location)
            .bind(&new.city)
            .bind(new.coordinates.map(|c| c.latitude))
            .bind(new.coordinates.map(|c| c.longitude))
            .bind(&new.contact)
            .bind(new.verified)
            .bind(new.hearts.max(0))
            .bind(new.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("insert", kind))?;

        Ok(row.into_post(kind))
    }

    async fn list(&self, kind: PostKind) -> Result<Vec<Post>> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY created_at DESC, id DESC",
            POST_COLUMNS,
            kind.collection()
        );

        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("list", kind))?;

        Ok(rows.into_iter().map(|r| r.into_post(kind)).collect())
    }

    async fn get(&self, kind: PostKind, id: Uuid) -> Result<Post> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1",
            POST_COLUMNS,
            kind.collection()
        );

        sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("get", kind))?
            .map(|r| r.into_post(kind))
            .ok_or_else(|| not_found(kind, id))
    }

    async fn update(&self, kind: PostKind, id: Uuid, changes: &PostChanges) -> Result<Post> {
        let sql = format!(
            r#"
            UPDATE {}
            SET categories = COALESCE($2, categories),
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                location = COALESCE($5, location),
                city = COALESCE($6, city),
                latitude = COALESCE($7, latitude),
                longitude = COALESCE($8, longitude),
                contact = COALESCE($9, contact),
                verified = COALESCE($10, verified),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            kind.collection(),
            POST_COLUMNS
        );

        sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .bind(&changes.categories)
            .bind(&changes.title)
            .bind(&changes.description)
            .bind(&changes.location)
            .bind(&changes.city)
            .bind(changes.coordinates.map(|c| c.latitude))
            .bind(changes.coordinates.map(|c| c.longitude))
            .bind(&changes.contact)
            .bind(changes.verified)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("update", kind))?
            .map(|r| r.into_post(kind))
            .ok_or_else(|| not_found(kind, id))
    }

    async fn delete(&self, kind: PostKind, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(db_error("delete", kind))?;

        let sql = format!("DELETE FROM {} WHERE id = $1", kind.collection());
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("delete", kind))?;

        if result.rows_affected() == 0 {
            return Err(not_found(kind, id));
        }

        sqlx::query("DELETE FROM post_hearts WHERE post_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("delete hearts of", kind))?;

        tx.commit().await.map_err(db_error("delete", kind))?;
        Ok(())
    }

    async fn toggle_heart(&self, kind: PostKind, id: Uuid, viewer: Uuid) -> Result<HeartToggle> {
        let mut tx = self.pool.begin().await.map_err(db_error("heart", kind))?;

        let removed = sqlx::query("DELETE FROM post_hearts WHERE post_id = $1 AND viewer_id = $2")
            .bind(id)
            .bind(viewer)
            .execute(&mut *tx)
            .await
            .map_err(db_error("heart", kind))?
            .rows_affected()
            > 0;

        if !removed {
            sqlx::query("INSERT INTO post_hearts (post_id, viewer_id) VALUES ($1, $2)")
                .bind(id)
                .bind(viewer)
                .execute(&mut *tx)
                .await
                .map_err(db_error("heart", kind))?;
        }

        let sql = format!(
            "UPDATE {} SET hearts = GREATEST(hearts + $2, 0), updated_at = NOW() WHERE id = $1 RETURNING {}",
            kind.collection(),
            POST_COLUMNS
        );
        let delta: i32 = if removed { -1 } else { 1 };
        let post = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .bind(delta)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("heart", kind))?
            .map(|r| r.into_post(kind))
            .ok_or_else(|| not_found(kind, id))?;

        tx.commit().await.map_err(db_error("heart", kind))?;

        Ok(HeartToggle {
            post,
            hearted: !removed,
        })
    }

    async fn flag(&self, kind: PostKind, id: Uuid) -> Result<Post> {
        let sql = format!(
            "UPDATE {} SET flags = flags + 1, updated_at = NOW() WHERE id = $1 RETURNING {}",
            kind.collection(),
            POST_COLUMNS
        );

        sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("flag", kind))?
            .map(|r| r.into_post(kind))
            .ok_or_else(|| not_found(kind, id))
    }

    async fn hearted_by(&self, viewer: Uuid) -> Result<HashSet<Uuid>> {
        let ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT post_id FROM post_hearts WHERE viewer_id = $1")
                .bind(viewer)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to load hearts for viewer {}: {:?}", viewer, e);
                    AppError::Database(e)
                })?;

        Ok(ids.into_iter().collect())
    }

    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT (SELECT COUNT(*) FROM sources) + (SELECT COUNT(*) FROM need_help)",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count posts: {:?}", e);
            AppError::Database(e)
        })
    }
}
