//! Storage seam for the borrow lifecycle.
//!
//! The lifecycle rules in `services::borrows` only talk to storage through
//! [`Ledger`] and [`LedgerTx`]. Every operation runs inside one transaction
//! obtained from [`Ledger::begin`] and is either committed or rolled back as a
//! whole. [`Repository`] implements the seam over Postgres.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Postgres, Transaction};

use super::{books::available_copies_sql, borrows::borrow_details_sql, unique_violation, Repository, UnitOfWork};
use crate::{
    error::{AppError, AppResult},
    models::{
        book::AvailableCopy,
        borrow::{Borrow, BorrowDetails, NewBorrow},
        patron::{Patron, PatronStatus},
    },
};

pub const DUPLICATE_BORROW: &str = "A transaction with these credentials already exists.";
pub const COPY_ALREADY_BORROWED: &str = "This book copy is already borrowed.";
pub const BORROW_NOT_FOUND: &str = "Transaction not found";
pub const COPY_NOT_FOUND: &str = "Book copy not found";

/// Unique constraint on (patron_id, copy_id, borrow_date)
pub const BORROW_KEY_CONSTRAINT: &str = "borrows_patron_copy_date_key";
/// Partial unique index: one open borrow per copy
pub const OPEN_BORROW_INDEX: &str = "borrows_open_copy_idx";

#[async_trait]
pub trait Ledger: Send + Sync {
    /// Start a transaction
    async fn begin(&self) -> AppResult<Box<dyn LedgerTx>>;
}

/// One open transaction against the store
#[async_trait]
pub trait LedgerTx: Send {
    async fn find_patron(&mut self, patron_id: &str) -> AppResult<Option<Patron>>;

    async fn copy_exists(&mut self, copy_id: i32) -> AppResult<bool>;

    async fn find_borrow(&mut self, borrow_id: i32) -> AppResult<Option<Borrow>>;

    async fn find_open_borrow_for_copy(&mut self, copy_id: i32) -> AppResult<Option<Borrow>>;

    async fn find_borrow_by_key(
        &mut self,
        patron_id: &str,
        copy_id: i32,
        borrow_date: NaiveDate,
    ) -> AppResult<Option<Borrow>>;

    /// Every borrow of the patron, open or returned
    async fn patron_borrows(&mut self, patron_id: &str) -> AppResult<Vec<Borrow>>;

    /// Open borrows due before `today`
    async fn overdue_borrows(&mut self, today: NaiveDate) -> AppResult<Vec<Borrow>>;

    /// Insert a borrow. Storage-level uniqueness failures are reported as
    /// `DuplicateBorrow` (copy already out) or `DuplicateEntry` (same key).
    async fn insert_borrow(&mut self, borrow: &NewBorrow) -> AppResult<Borrow>;

    async fn set_return_date(&mut self, borrow_id: i32, return_date: NaiveDate) -> AppResult<()>;

    async fn set_patron_status(&mut self, patron_id: &str, status: PatronStatus) -> AppResult<()>;

    async fn add_patron_fine(&mut self, patron_id: &str, points: i32) -> AppResult<()>;

    async fn available_copies(&mut self) -> AppResult<Vec<AvailableCopy>>;

    async fn overdue_copies(&mut self, today: NaiveDate) -> AppResult<Vec<BorrowDetails>>;

    async fn commit(self: Box<Self>) -> AppResult<()>;

    async fn rollback(self: Box<Self>) -> AppResult<()>;
}

#[async_trait]
impl UnitOfWork for Box<dyn LedgerTx> {
    async fn commit(self) -> AppResult<()> {
        LedgerTx::commit(self).await
    }

    async fn rollback(self) -> AppResult<()> {
        LedgerTx::rollback(self).await
    }
}

/// Postgres transaction backing a [`LedgerTx`]
pub struct PgLedgerTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl Ledger for Repository {
    async fn begin(&self) -> AppResult<Box<dyn LedgerTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgLedgerTx { tx }))
    }
}

#[async_trait]
impl LedgerTx for PgLedgerTx {
    async fn find_patron(&mut self, patron_id: &str) -> AppResult<Option<Patron>> {
        let patron = sqlx::query_as::<_, Patron>("SELECT * FROM patrons WHERE id = $1 FOR UPDATE")
            .bind(patron_id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(patron)
    }

    async fn copy_exists(&mut self, copy_id: i32) -> AppResult<bool> {
        let found: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM book_copies WHERE id = $1)")
            .bind(copy_id)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(found)
    }

    async fn find_borrow(&mut self, borrow_id: i32) -> AppResult<Option<Borrow>> {
        let borrow = sqlx::query_as::<_, Borrow>("SELECT * FROM borrows WHERE id = $1 FOR UPDATE")
            .bind(borrow_id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(borrow)
    }

    async fn find_open_borrow_for_copy(&mut self, copy_id: i32) -> AppResult<Option<Borrow>> {
        let borrow = sqlx::query_as::<_, Borrow>(
            "SELECT * FROM borrows WHERE copy_id = $1 AND return_date IS NULL",
        )
        .bind(copy_id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(borrow)
    }

    async fn find_borrow_by_key(
        &mut self,
        patron_id: &str,
        copy_id: i32,
        borrow_date: NaiveDate,
    ) -> AppResult<Option<Borrow>> {
        let borrow = sqlx::query_as::<_, Borrow>(
            "SELECT * FROM borrows WHERE patron_id = $1 AND copy_id = $2 AND borrow_date = $3",
        )
        .bind(patron_id)
        .bind(copy_id)
        .bind(borrow_date)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(borrow)
    }

    async fn patron_borrows(&mut self, patron_id: &str) -> AppResult<Vec<Borrow>> {
        let borrows = sqlx::query_as::<_, Borrow>("SELECT * FROM borrows WHERE patron_id = $1 ORDER BY id")
            .bind(patron_id)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(borrows)
    }

    async fn overdue_borrows(&mut self, today: NaiveDate) -> AppResult<Vec<Borrow>> {
        let borrows = sqlx::query_as::<_, Borrow>(
            "SELECT * FROM borrows WHERE due_date < $1 AND return_date IS NULL ORDER BY id",
        )
        .bind(today)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(borrows)
    }

    async fn insert_borrow(&mut self, borrow: &NewBorrow) -> AppResult<Borrow> {
        sqlx::query_as::<_, Borrow>(
            r#"
            INSERT INTO borrows (patron_id, copy_id, borrow_date, due_date, return_date)
            VALUES ($1, $2, $3, $4, NULL)
            RETURNING *
            "#,
        )
        .bind(&borrow.patron_id)
        .bind(borrow.copy_id)
        .bind(borrow.borrow_date)
        .bind(borrow.due_date)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some(OPEN_BORROW_INDEX) => AppError::DuplicateBorrow(COPY_ALREADY_BORROWED.to_string()),
            Some(BORROW_KEY_CONSTRAINT) => AppError::DuplicateEntry(DUPLICATE_BORROW.to_string()),
            _ => AppError::Database(e),
        })
    }

    async fn set_return_date(&mut self, borrow_id: i32, return_date: NaiveDate) -> AppResult<()> {
        sqlx::query("UPDATE borrows SET return_date = $1 WHERE id = $2")
            .bind(return_date)
            .bind(borrow_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn set_patron_status(&mut self, patron_id: &str, status: PatronStatus) -> AppResult<()> {
        sqlx::query("UPDATE patrons SET status = $1 WHERE id = $2")
            .bind(status)
            .bind(patron_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn add_patron_fine(&mut self, patron_id: &str, points: i32) -> AppResult<()> {
        sqlx::query("UPDATE patrons SET fine = fine + $1 WHERE id = $2")
            .bind(points)
            .bind(patron_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn available_copies(&mut self) -> AppResult<Vec<AvailableCopy>> {
        let copies = sqlx::query_as::<_, AvailableCopy>(&available_copies_sql())
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(copies)
    }

    async fn overdue_copies(&mut self, today: NaiveDate) -> AppResult<Vec<BorrowDetails>> {
        let borrows = sqlx::query_as::<_, BorrowDetails>(&borrow_details_sql(
            "br.due_date < $1 AND br.return_date IS NULL",
        ))
        .bind(today)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(borrows)
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
