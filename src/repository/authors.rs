//! Authors repository

use sqlx::{Pool, Postgres};

use super::{books::delete_books_where, finish};
use crate::{
    error::{AppError, AppResult},
    models::author::{Author, AuthorName, CreateAuthor, UpdateAuthor},
};

pub const DUPLICATE_AUTHOR: &str = "An author with this name already exists.";
pub const AUTHOR_NOT_FOUND: &str = "Author not found";

#[derive(Clone)]
pub struct AuthorsRepository {
    pool: Pool<Postgres>,
}

impl AuthorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> AppResult<Vec<Author>> {
        let authors = sqlx::query_as::<_, Author>("SELECT * FROM authors ORDER BY last_name, first_name")
            .fetch_all(&self.pool)
            .await?;
        Ok(authors)
    }

    pub async fn find_by_name(&self, name: &AuthorName, limit: i64) -> AppResult<Vec<Author>> {
        let authors = sqlx::query_as::<_, Author>(
            r#"
            SELECT * FROM authors
            WHERE first_name = $1 AND midname_initial = $2 AND last_name = $3
            LIMIT $4
            "#,
        )
        .bind(&name.first_name)
        .bind(&name.midname_initial)
        .bind(&name.last_name)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(authors)
    }

    pub async fn create(&self, data: &CreateAuthor) -> AppResult<Author> {
        let mut tx = self.pool.begin().await?;
        let result: AppResult<Author> = async {
            let duplicate: bool = sqlx::query_scalar(
                r#"
                SELECT EXISTS(
                    SELECT 1 FROM authors
                    WHERE first_name = $1 AND midname_initial = $2 AND last_name = $3
                )
                "#,
            )
            .bind(&data.author_first_name)
            .bind(&data.author_initial_midname)
            .bind(&data.author_last_name)
            .fetch_one(&mut *tx)
            .await?;
            if duplicate {
                return Err(AppError::DuplicateEntry(DUPLICATE_AUTHOR.to_string()));
            }

            let author = sqlx::query_as::<_, Author>(
                r#"
                INSERT INTO authors (first_name, midname_initial, last_name)
                VALUES ($1, $2, $3)
                RETURNING *
                "#,
            )
            .bind(&data.author_first_name)
            .bind(&data.author_initial_midname)
            .bind(&data.author_last_name)
            .fetch_one(&mut *tx)
            .await?;
            Ok(author)
        }
        .await;
        finish(tx, result).await
    }

    pub async fn update(&self, id: i32, data: &UpdateAuthor) -> AppResult<Author> {
        sqlx::query_as::<_, Author>(
            r#"
            UPDATE authors
            SET first_name = COALESCE($1, first_name),
                midname_initial = COALESCE($2, midname_initial),
                last_name = COALESCE($3, last_name)
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(&data.author_first_name)
        .bind(&data.author_initial_midname)
        .bind(&data.author_last_name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match super::unique_violation(&e) {
            Some(_) => AppError::DuplicateEntry(DUPLICATE_AUTHOR.to_string()),
            None => AppError::Database(e).into_integrity(),
        })?
        .ok_or_else(|| AppError::NotFound(AUTHOR_NOT_FOUND.to_string()))
    }

    /// Delete an author together with its books, their copies and borrows
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        let result: AppResult<()> = async {
            let found: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM authors WHERE id = $1)")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
            if !found {
                return Err(AppError::NotFound(AUTHOR_NOT_FOUND.to_string()));
            }
            delete_books_where(&mut tx, "b.author_id = $1", id).await?;
            sqlx::query("DELETE FROM authors WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            Ok(())
        }
        .await;
        finish(tx, result).await
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM authors")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
