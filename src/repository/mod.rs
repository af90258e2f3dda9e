//! Repository layer for database operations

pub mod authors;
pub mod books;
pub mod borrows;
pub mod ledger;
#[cfg(test)]
pub mod memory;
pub mod patrons;
pub mod publishers;

use async_trait::async_trait;
use sqlx::{error::ErrorKind, Pool, Postgres, Transaction};

use crate::error::{AppError, AppResult};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub patrons: patrons::PatronsRepository,
    pub books: books::BooksRepository,
    pub authors: authors::AuthorsRepository,
    pub publishers: publishers::PublishersRepository,
    pub borrows: borrows::BorrowsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            patrons: patrons::PatronsRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            authors: authors::AuthorsRepository::new(pool.clone()),
            publishers: publishers::PublishersRepository::new(pool.clone()),
            borrows: borrows::BorrowsRepository::new(pool.clone()),
            pool,
        }
    }

    /// Round-trip to the database (readiness probe)
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// A transaction that ends in either a commit or a rollback
#[async_trait]
pub(crate) trait UnitOfWork: Send {
    async fn commit(self) -> AppResult<()>;

    async fn rollback(self) -> AppResult<()>;
}

#[async_trait]
impl UnitOfWork for Transaction<'static, Postgres> {
    async fn commit(self) -> AppResult<()> {
        Transaction::commit(self).await?;
        Ok(())
    }

    async fn rollback(self) -> AppResult<()> {
        Transaction::rollback(self).await?;
        Ok(())
    }
}

/// Commit `tx` if `result` is Ok, otherwise roll it back.
///
/// Storage errors raised by the work or the commit come back as
/// `IntegrityCompromised`; domain errors are returned unchanged.
pub(crate) async fn finish<T, W: UnitOfWork>(tx: W, result: AppResult<T>) -> AppResult<T> {
    match result {
        Ok(value) => {
            tx.commit().await.map_err(AppError::into_integrity)?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!("Rollback failed: {:?}", rollback_err);
            }
            Err(e.into_integrity())
        }
    }
}

/// Name of the unique constraint violated by `err`, if that is what it is.
pub(crate) fn unique_violation(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db) if db.kind() == ErrorKind::UniqueViolation => {
            Some(db.constraint().unwrap_or_default())
        }
        _ => None,
    }
}

/// Three-part author name as shown in joined listings
pub(crate) const AUTHOR_DISPLAY_SQL: &str =
    "a.first_name || ' ' || a.midname_initial || ' ' || a.last_name";
