//! Borrow lifecycle: borrowing, returning, patron status and fines.
//!
//! A borrow is OPEN until its return date is recorded and RETURNED after
//! that; RETURNED is terminal. A patron is ACTIVE while it holds at least one
//! open borrow and INACTIVE otherwise. Every mutating operation runs in one
//! [`LedgerTx`] and is committed or rolled back as a whole.

use std::sync::Arc;

use chrono::Datelike;
use serde::Serialize;
use utoipa::ToSchema;

use super::clock::Clock;
use crate::{
    error::{AppError, AppResult},
    models::{
        book::AvailableCopy,
        borrow::{Borrow, BorrowDetails, CreateBorrow, NewBorrow, ReturnBorrow},
        patron::PatronStatus,
    },
    repository::{
        finish,
        ledger::{Ledger, LedgerTx, BORROW_NOT_FOUND, COPY_ALREADY_BORROWED, COPY_NOT_FOUND, DUPLICATE_BORROW},
        patrons::PATRON_NOT_FOUND,
        Repository,
    },
    validation::{normalize_isbn, patron::validate_patron_id},
};

/// Fine-points charged per overdue copy on each run
pub const FINE_POINTS_PER_RUN: i32 = 1;

/// Result of closing a borrow
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReturnOutcome {
    pub borrow: Borrow,
    /// Patron status after the return
    pub patron_status: PatronStatus,
}

/// Owns the borrow/return/fine rules over a [`Ledger`]
#[derive(Clone)]
pub struct LifecycleManager {
    ledger: Arc<dyn Ledger>,
    clock: Arc<dyn Clock>,
}

impl LifecycleManager {
    pub fn new(ledger: Arc<dyn Ledger>, clock: Arc<dyn Clock>) -> Self {
        Self { ledger, clock }
    }

    /// Open a borrow of `copy_id` for `patron_id`, due 15 days after `borrow_date`
    pub async fn create_borrow(&self, request: &CreateBorrow) -> AppResult<Borrow> {
        let patron_id = validate_patron_id(&request.patron_id, self.clock.today().year())?;
        let new = NewBorrow::new(patron_id, request.copy_id, request.borrow_date);

        let mut tx = self.ledger.begin().await?;
        let result = create_in(tx.as_mut(), &new).await;
        let borrow = finish(tx, result).await.map_err(|e| {
            tracing::warn!(copy_id = new.copy_id, patron_id = %new.patron_id, "Borrow rejected: {}", e);
            e
        })?;

        tracing::info!(
            borrow_id = borrow.id,
            copy_id = borrow.copy_id,
            patron_id = %borrow.patron_id,
            due_date = %borrow.due_date,
            "Borrow opened"
        );
        Ok(borrow)
    }

    /// Record the return of borrow `borrow_id` and recompute the patron's status
    pub async fn return_borrow(&self, borrow_id: i32, request: &ReturnBorrow) -> AppResult<ReturnOutcome> {
        let mut tx = self.ledger.begin().await?;
        let result = return_in(tx.as_mut(), borrow_id, request).await;
        let outcome = finish(tx, result).await.map_err(|e| {
            tracing::warn!(borrow_id, "Return rejected: {}", e);
            e
        })?;

        tracing::info!(
            borrow_id,
            patron_id = %outcome.borrow.patron_id,
            patron_status = %outcome.patron_status,
            "Borrow returned"
        );
        Ok(outcome)
    }

    /// Charge one fine-point per open borrow due before today.
    ///
    /// Each call charges again; running twice on the same day charges twice.
    /// Returns the number of fine-points charged.
    pub async fn calculate_fines(&self) -> AppResult<usize> {
        let today = self.clock.today();
        let mut tx = self.ledger.begin().await?;
        let result: AppResult<usize> = async {
            let overdue = tx.overdue_borrows(today).await?;
            for borrow in &overdue {
                tx.add_patron_fine(&borrow.patron_id, FINE_POINTS_PER_RUN).await?;
            }
            Ok(overdue.len())
        }
        .await;
        finish(tx, result).await
    }

    /// Copies with no open borrow
    pub async fn available_copies(&self) -> AppResult<Vec<AvailableCopy>> {
        let mut tx = self.ledger.begin().await?;
        let result = tx.available_copies().await;
        finish(tx, result).await
    }

    /// Open borrows past their due date
    pub async fn overdue_copies(&self) -> AppResult<Vec<BorrowDetails>> {
        let today = self.clock.today();
        let mut tx = self.ledger.begin().await?;
        let result = tx.overdue_copies(today).await;
        finish(tx, result).await
    }
}

async fn create_in(tx: &mut dyn LedgerTx, new: &NewBorrow) -> AppResult<Borrow> {
    if !tx.copy_exists(new.copy_id).await? {
        return Err(AppError::NotFound(COPY_NOT_FOUND.to_string()));
    }
    if tx.find_open_borrow_for_copy(new.copy_id).await?.is_some() {
        return Err(AppError::DuplicateBorrow(COPY_ALREADY_BORROWED.to_string()));
    }
    if tx
        .find_borrow_by_key(&new.patron_id, new.copy_id, new.borrow_date)
        .await?
        .is_some()
    {
        return Err(AppError::DuplicateEntry(DUPLICATE_BORROW.to_string()));
    }
    let patron = tx
        .find_patron(&new.patron_id)
        .await?
        .ok_or_else(|| AppError::NotFound(PATRON_NOT_FOUND.to_string()))?;

    let borrow = tx.insert_borrow(new).await?;
    if patron.status != PatronStatus::Active {
        tx.set_patron_status(&patron.id, PatronStatus::Active).await?;
    }
    Ok(borrow)
}

async fn return_in(tx: &mut dyn LedgerTx, borrow_id: i32, request: &ReturnBorrow) -> AppResult<ReturnOutcome> {
    let mut borrow = tx
        .find_borrow(borrow_id)
        .await?
        .ok_or_else(|| AppError::NotFound(BORROW_NOT_FOUND.to_string()))?;
    if !borrow.is_open() {
        return Err(AppError::InvalidRequest("This book copy has already been returned.".to_string()));
    }

    tx.set_return_date(borrow.id, request.return_date).await?;
    borrow.return_date = Some(request.return_date);

    // Status follows every borrow the patron holds, not just this one
    let still_open = tx
        .patron_borrows(&borrow.patron_id)
        .await?
        .iter()
        .any(|b| b.id != borrow.id && b.is_open());
    let patron_status = if still_open {
        PatronStatus::Active
    } else {
        PatronStatus::Inactive
    };
    tx.set_patron_status(&borrow.patron_id, patron_status).await?;

    Ok(ReturnOutcome { borrow, patron_status })
}

/// Borrow operations exposed to the API: lifecycle writes plus listings
#[derive(Clone)]
pub struct BorrowsService {
    repository: Repository,
    lifecycle: LifecycleManager,
    clock: Arc<dyn Clock>,
}

impl BorrowsService {
    pub fn new(repository: Repository, lifecycle: LifecycleManager, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            lifecycle,
            clock,
        }
    }

    pub fn lifecycle(&self) -> &LifecycleManager {
        &self.lifecycle
    }

    pub async fn create(&self, request: &CreateBorrow) -> AppResult<Borrow> {
        self.lifecycle.create_borrow(request).await
    }

    pub async fn return_borrow(&self, borrow_id: i32, request: &ReturnBorrow) -> AppResult<ReturnOutcome> {
        self.lifecycle.return_borrow(borrow_id, request).await
    }

    pub async fn list(&self) -> AppResult<Vec<BorrowDetails>> {
        self.repository.borrows.list().await
    }

    pub async fn count(&self) -> AppResult<i64> {
        self.repository.borrows.count().await
    }

    pub async fn count_unreturned(&self) -> AppResult<i64> {
        self.repository.borrows.count_unreturned().await
    }

    pub async fn list_by_patron(&self, patron_id: &str) -> AppResult<Vec<BorrowDetails>> {
        let patron_id = validate_patron_id(patron_id, self.clock.today().year())?;
        self.repository.patrons.get_by_id(&patron_id).await?;
        self.repository.borrows.list_by_patron(&patron_id).await
    }

    pub async fn list_by_isbn(&self, isbn: &str) -> AppResult<Vec<BorrowDetails>> {
        let isbn = normalize_isbn(isbn)?;
        self.repository.books.get_by_isbn(&isbn).await?;
        self.repository.borrows.list_by_isbn(&isbn).await
    }

    pub async fn available_copies(&self) -> AppResult<Vec<AvailableCopy>> {
        self.lifecycle.available_copies().await
    }

    pub async fn overdue_copies(&self) -> AppResult<Vec<BorrowDetails>> {
        self.lifecycle.overdue_copies().await
    }
}
