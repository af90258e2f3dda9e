//! Publishers repository

use sqlx::{Pool, Postgres};

use super::{books::delete_books_where, finish};
use crate::{
    error::{AppError, AppResult},
    models::publisher::{CreatePublisher, Publisher, UpdatePublisher},
};

pub const DUPLICATE_PUBLISHER: &str = "A publisher with this name already exists.";
pub const PUBLISHER_NOT_FOUND: &str = "Publisher not found";

#[derive(Clone)]
pub struct PublishersRepository {
    pool: Pool<Postgres>,
}

impl PublishersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> AppResult<Vec<Publisher>> {
        let publishers = sqlx::query_as::<_, Publisher>("SELECT * FROM publishers ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(publishers)
    }

    pub async fn find_by_name(&self, name: &str, limit: i64) -> AppResult<Vec<Publisher>> {
        let publishers = sqlx::query_as::<_, Publisher>("SELECT * FROM publishers WHERE name = $1 LIMIT $2")
            .bind(name)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(publishers)
    }

    pub async fn create(&self, data: &CreatePublisher) -> AppResult<Publisher> {
        let mut tx = self.pool.begin().await?;
        let result: AppResult<Publisher> = async {
            let duplicate: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM publishers WHERE name = $1)")
                .bind(&data.publisher_name)
                .fetch_one(&mut *tx)
                .await?;
            if duplicate {
                return Err(AppError::DuplicateEntry(DUPLICATE_PUBLISHER.to_string()));
            }

            let publisher = sqlx::query_as::<_, Publisher>("INSERT INTO publishers (name) VALUES ($1) RETURNING *")
                .bind(&data.publisher_name)
                .fetch_one(&mut *tx)
                .await?;
            Ok(publisher)
        }
        .await;
        finish(tx, result).await
    }

    pub async fn update(&self, id: i32, data: &UpdatePublisher) -> AppResult<Publisher> {
        sqlx::query_as::<_, Publisher>(
            "UPDATE publishers SET name = COALESCE($1, name) WHERE id = $2 RETURNING *",
        )
        .bind(&data.publisher_name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match super::unique_violation(&e) {
            Some(_) => AppError::DuplicateEntry(DUPLICATE_PUBLISHER.to_string()),
            None => AppError::Database(e).into_integrity(),
        })?
        .ok_or_else(|| AppError::NotFound(PUBLISHER_NOT_FOUND.to_string()))
    }

    /// Delete a publisher together with its books, their copies and borrows
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        let result: AppResult<()> = async {
            let found: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM publishers WHERE id = $1)")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
            if !found {
                return Err(AppError::NotFound(PUBLISHER_NOT_FOUND.to_string()));
            }
            delete_books_where(&mut tx, "b.publisher_id = $1", id).await?;
            sqlx::query("DELETE FROM publishers WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            Ok(())
        }
        .await;
        finish(tx, result).await
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM publishers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
