//! Anime repository
//!
//! - save: INSERT when the record has no id, UPDATE ... RETURNING otherwise
//! - save_all: every record written inside a single transaction
//! - find_all: rows streamed straight from the cursor

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use sqlx::{FromRow, PgExecutor, PgPool};

use super::{DbError, DbResult};
use crate::models::Anime;

/// Persistence operations for anime records.
#[async_trait]
pub trait AnimeRepository: Send + Sync {
    /// Stream every record ordered by id.
    ///
    /// Dropping the stream stops reading from the store.
    fn find_all(&self) -> BoxStream<'_, DbResult<Anime>>;

    /// Find a record by id.
    async fn find_by_id(&self, id: i32) -> DbResult<Option<Anime>>;

    /// Insert (no id) or update (id present) a record.
    ///
    /// Updating an id the store does not hold returns `DbError::NotFound`.
    async fn save(&self, anime: Anime) -> DbResult<Anime>;

    /// Save every record atomically, returning them in input order.
    async fn save_all(&self, animes: Vec<Anime>) -> DbResult<Vec<Anime>>;

    /// Delete a record by id. Deleting a missing id is a no-op.
    async fn delete(&self, id: i32) -> DbResult<()>;

    /// Short backend name reported by `/health`.
    fn backend(&self) -> &'static str;

    /// Round-trip to the store without touching any record.
    async fn ping(&self) -> DbResult<()>;
}

/// Anime row from database
#[derive(Debug, Clone, FromRow)]
struct AnimeRow {
    id: i32,
    name: String,
}

impl From<AnimeRow> for Anime {
    fn from(row: AnimeRow) -> Self {
        Anime::new(row.name).with_id(row.id)
    }
}

/// PostgreSQL-backed anime repository
#[derive(Clone)]
pub struct PgAnimeRepo {
    pool: PgPool,
}

impl PgAnimeRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn upsert<'e, E>(executor: E, anime: Anime) -> DbResult<Anime>
where
    E: PgExecutor<'e>,
{
    let row = match anime.id {
        None => {
            sqlx::query_as::<_, AnimeRow>("INSERT INTO anime (name) VALUES ($1) RETURNING id, name")
                .bind(&anime.name)
                .fetch_one(executor)
                .await?
        }
        Some(id) => sqlx::query_as::<_, AnimeRow>(
            "UPDATE anime SET name = $2 WHERE id = $1 RETURNING id, name",
        )
        .bind(id)
        .bind(&anime.name)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| DbError::NotFound {
            resource: "anime",
            id: id.to_string(),
        })?,
    };

    Ok(row.into())
}

#[async_trait]
impl AnimeRepository for PgAnimeRepo {
    fn find_all(&self) -> BoxStream<'_, DbResult<Anime>> {
        sqlx::query_as::<_, AnimeRow>("SELECT id, name FROM anime ORDER BY id")
            .fetch(&self.pool)
            .map_ok(Anime::from)
            .map_err(DbError::from)
            .boxed()
    }

    async fn find_by_id(&self, id: i32) -> DbResult<Option<Anime>> {
        let row = sqlx::query_as::<_, AnimeRow>("SELECT id, name FROM anime WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Anime::from))
    }

    async fn save(&self, anime: Anime) -> DbResult<Anime> {
        upsert(&self.pool, anime).await
    }

    async fn save_all(&self, animes: Vec<Anime>) -> DbResult<Vec<Anime>> {
        let mut tx = self.pool.begin().await?;

        let mut saved = Vec::with_capacity(animes.len());
        for anime in animes {
            saved.push(upsert(&mut *tx, anime).await?);
        }

        tx.commit().await?;
        Ok(saved)
    }

    async fn delete(&self, id: i32) -> DbResult<()> {
        sqlx::query("DELETE FROM anime WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::db::connect;

    // Integration tests - run with DATABASE_URL set
    // cargo test -p animectl-server -- --ignored

    async fn repo() -> PgAnimeRepo {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = connect(&url, &DatabaseConfig::default())
            .await
            .expect("connect failed");
        PgAnimeRepo::new(pool)
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn save_then_find_round_trip() {
        let repo = repo().await;

        let saved = repo.save(Anime::new("Tensei")).await.unwrap();
        let id = saved.id.expect("store assigns id");

        let found = repo.find_by_id(id).await.unwrap();
        assert_eq!(found, Some(saved));

        repo.delete(id).await.unwrap();
        assert_eq!(repo.find_by_id(id).await.unwrap(), None);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn update_of_missing_id_is_not_found() {
        let repo = repo().await;

        let err = repo.save(Anime::new("Ghost").with_id(-1)).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "anime", .. }));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn save_all_rolls_back_on_failure() {
        let repo = repo().await;
        let before: Vec<Anime> = repo.find_all().try_collect().await.unwrap();

        let result = repo
            .save_all(vec![Anime::new("Kept?"), Anime::new("Ghost").with_id(-1)])
            .await;
        assert!(result.is_err());

        let after: Vec<Anime> = repo.find_all().try_collect().await.unwrap();
        assert_eq!(before, after);
    }
}
