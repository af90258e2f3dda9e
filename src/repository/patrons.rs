//! Patrons repository for database operations

use sqlx::{PgConnection, Pool, Postgres};

use super::finish;
use crate::{
    error::{AppError, AppResult},
    models::patron::{CreatePatron, Patron, PatronStatus, UpdatePatron},
};

pub const DUPLICATE_PATRON_ID: &str = "A patron with this ID already exists.";
pub const DUPLICATE_PATRON_EMAIL: &str = "A patron with this email already exists.";
pub const DUPLICATE_PATRON_PHONE: &str = "A patron with this phone number already exists.";
pub const PATRON_NOT_FOUND: &str = "Patron not found";

#[derive(Clone)]
pub struct PatronsRepository {
    pool: Pool<Postgres>,
}

impl PatronsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all patrons
    pub async fn list(&self) -> AppResult<Vec<Patron>> {
        let patrons = sqlx::query_as::<_, Patron>("SELECT * FROM patrons ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(patrons)
    }

    /// Get patron by ID
    pub async fn get_by_id(&self, id: &str) -> AppResult<Patron> {
        sqlx::query_as::<_, Patron>("SELECT * FROM patrons WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(PATRON_NOT_FOUND.to_string()))
    }

    /// Exact first/last name match, at most `limit` rows
    pub async fn find_by_name(&self, first_name: &str, last_name: &str, limit: i64) -> AppResult<Vec<Patron>> {
        let patrons = sqlx::query_as::<_, Patron>(
            "SELECT * FROM patrons WHERE first_name = $1 AND last_name = $2 LIMIT $3",
        )
        .bind(first_name)
        .bind(last_name)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(patrons)
    }

    /// Patrons whose fine is strictly greater than `fine`
    pub async fn find_with_fine_above(&self, fine: i32, limit: i64) -> AppResult<Vec<Patron>> {
        let patrons = sqlx::query_as::<_, Patron>("SELECT * FROM patrons WHERE fine > $1 LIMIT $2")
            .bind(fine)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(patrons)
    }

    /// Create a patron, checking id, email and phone uniqueness in the same transaction
    pub async fn create(&self, data: &CreatePatron) -> AppResult<Patron> {
        let mut tx = self.pool.begin().await?;
        let result = Self::create_in(&mut tx, data).await;
        finish(tx, result).await
    }

    async fn create_in(conn: &mut PgConnection, data: &CreatePatron) -> AppResult<Patron> {
        if exists(conn, "SELECT EXISTS(SELECT 1 FROM patrons WHERE id = $1)", &data.patron_id).await? {
            return Err(AppError::DuplicateEntry(DUPLICATE_PATRON_ID.to_string()));
        }
        if exists(conn, "SELECT EXISTS(SELECT 1 FROM patrons WHERE email = $1)", &data.patron_email).await? {
            return Err(AppError::DuplicateEntry(DUPLICATE_PATRON_EMAIL.to_string()));
        }
        if exists(conn, "SELECT EXISTS(SELECT 1 FROM patrons WHERE phone = $1)", &data.patron_phone).await? {
            return Err(AppError::DuplicateEntry(DUPLICATE_PATRON_PHONE.to_string()));
        }

        let patron = sqlx::query_as::<_, Patron>(
            r#"
            INSERT INTO patrons (id, first_name, last_name, email, phone, status, fine)
            VALUES ($1, $2, $3, $4, $5, $6, 0)
            RETURNING *
            "#,
        )
        .bind(&data.patron_id)
        .bind(&data.patron_first_name)
        .bind(&data.patron_last_name)
        .bind(&data.patron_email)
        .bind(&data.patron_phone)
        .bind(PatronStatus::Inactive)
        .fetch_one(&mut *conn)
        .await?;

        Ok(patron)
    }

    /// Update the fields present in `data`
    pub async fn update(&self, id: &str, data: &UpdatePatron) -> AppResult<Patron> {
        let mut tx = self.pool.begin().await?;
        let result = Self::update_in(&mut tx, id, data).await;
        finish(tx, result).await
    }

    async fn update_in(conn: &mut PgConnection, id: &str, data: &UpdatePatron) -> AppResult<Patron> {
        let current = sqlx::query_as::<_, Patron>("SELECT * FROM patrons WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError::NotFound(PATRON_NOT_FOUND.to_string()))?;

        if let Some(ref email) = data.patron_email {
            let taken: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM patrons WHERE email = $1 AND id <> $2)")
                    .bind(email)
                    .bind(id)
                    .fetch_one(&mut *conn)
                    .await?;
            if taken {
                return Err(AppError::DuplicateEntry(DUPLICATE_PATRON_EMAIL.to_string()));
            }
        }
        if let Some(ref phone) = data.patron_phone {
            let taken: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM patrons WHERE phone = $1 AND id <> $2)")
                    .bind(phone)
                    .bind(id)
                    .fetch_one(&mut *conn)
                    .await?;
            if taken {
                return Err(AppError::DuplicateEntry(DUPLICATE_PATRON_PHONE.to_string()));
            }
        }

        let patron = sqlx::query_as::<_, Patron>(
            r#"
            UPDATE patrons
            SET first_name = $1, last_name = $2, email = $3, phone = $4
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(data.patron_first_name.as_ref().unwrap_or(&current.first_name))
        .bind(data.patron_last_name.as_ref().unwrap_or(&current.last_name))
        .bind(data.patron_email.as_ref().unwrap_or(&current.email))
        .bind(data.patron_phone.as_ref().unwrap_or(&current.phone))
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(patron)
    }

    /// Delete a patron together with all of its borrows
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        let result = Self::delete_in(&mut tx, id).await;
        finish(tx, result).await
    }

    async fn delete_in(conn: &mut PgConnection, id: &str) -> AppResult<()> {
        if !exists(conn, "SELECT EXISTS(SELECT 1 FROM patrons WHERE id = $1)", id).await? {
            return Err(AppError::NotFound(PATRON_NOT_FOUND.to_string()));
        }

        sqlx::query("DELETE FROM borrows WHERE patron_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        sqlx::query("DELETE FROM patrons WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    /// Count patrons
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM patrons")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Sum of all patron fines
    pub async fn total_fines(&self) -> AppResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(fine), 0)::bigint FROM patrons")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }
}

async fn exists(conn: &mut PgConnection, query: &str, value: &str) -> AppResult<bool> {
    let found: bool = sqlx::query_scalar(query)
        .bind(value)
        .fetch_one(&mut *conn)
        .await?;
    Ok(found)
}
