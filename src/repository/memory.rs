//! In-memory [`Ledger`] for tests.
//!
//! A transaction works on a private copy of the state and publishes the rows
//! it wrote on commit, so a rolled back or dropped transaction leaves nothing
//! behind. Borrow ids come from a shared sequence. Uniqueness is checked again
//! against the shared state at commit, so of two transactions that both
//! passed their own checks only the first to commit succeeds.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use chrono::NaiveDate;

use super::ledger::{Ledger, LedgerTx, COPY_ALREADY_BORROWED, DUPLICATE_BORROW};
use crate::{
    error::{AppError, AppResult},
    models::{
        book::AvailableCopy,
        borrow::{Borrow, BorrowDetails, NewBorrow},
        patron::{Patron, PatronStatus},
    },
};

#[derive(Debug, Clone, Default)]
struct State {
    patrons: BTreeMap<String, Patron>,
    copies: BTreeMap<i32, AvailableCopy>,
    borrows: BTreeMap<i32, Borrow>,
    next_borrow_id: i32,
}

#[derive(Clone, Default)]
pub struct MemoryLedger {
    state: Arc<Mutex<State>>,
    fail_commit: Arc<AtomicBool>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_patron(&self, id: &str) {
        let patron = Patron {
            id: id.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: format!("{}@example.org", id.to_lowercase()),
            phone: "9876543210".to_string(),
            status: PatronStatus::Inactive,
            fine: 0,
        };
        self.lock().patrons.insert(patron.id.clone(), patron);
    }

    pub fn add_copy(&self, copy_id: i32, isbn: &str, title: &str) {
        let copy = AvailableCopy {
            id: copy_id,
            isbn: isbn.to_string(),
            title: title.to_string(),
            author: "Ursula K. Guin".to_string(),
            publisher: "Ace".to_string(),
        };
        self.lock().copies.insert(copy_id, copy);
    }

    pub fn patron(&self, id: &str) -> Option<Patron> {
        self.lock().patrons.get(id).cloned()
    }

    pub fn borrows(&self) -> Vec<Borrow> {
        self.lock().borrows.values().cloned().collect()
    }

    /// Make every subsequent commit fail as a storage error would
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commit.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }
}

struct MemoryTx {
    shared: Arc<Mutex<State>>,
    working: State,
    written_patrons: BTreeSet<String>,
    written_borrows: BTreeSet<i32>,
    fail_commit: bool,
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn begin(&self) -> AppResult<Box<dyn LedgerTx>> {
        Ok(Box::new(MemoryTx {
            shared: self.state.clone(),
            working: self.lock().clone(),
            written_patrons: BTreeSet::new(),
            written_borrows: BTreeSet::new(),
            fail_commit: self.fail_commit.load(Ordering::SeqCst),
        }))
    }
}

impl MemoryTx {
    fn details(&self, borrow: &Borrow) -> BorrowDetails {
        let copy = &self.working.copies[&borrow.copy_id];
        BorrowDetails {
            borrow_id: borrow.id,
            patron_id: borrow.patron_id.clone(),
            borrow_date: borrow.borrow_date,
            due_date: borrow.due_date,
            return_date: borrow.return_date,
            copy_id: copy.id,
            isbn: copy.isbn.clone(),
            title: copy.title.clone(),
            author: copy.author.clone(),
            publisher: copy.publisher.clone(),
        }
    }

    fn patron_mut(&mut self, patron_id: &str) -> AppResult<&mut Patron> {
        self.written_patrons.insert(patron_id.to_string());
        self.working
            .patrons
            .get_mut(patron_id)
            .ok_or(AppError::Database(sqlx::Error::RowNotFound))
    }
}

/// The same uniqueness the Postgres schema enforces on `borrows`
fn check_unique(state: &State, borrow: &Borrow) -> AppResult<()> {
    let mut others = state.borrows.values().filter(|b| b.id != borrow.id);
    if borrow.is_open() && others.clone().any(|b| b.copy_id == borrow.copy_id && b.is_open()) {
        return Err(AppError::DuplicateBorrow(COPY_ALREADY_BORROWED.to_string()));
    }
    if others.any(|b| {
        b.patron_id == borrow.patron_id && b.copy_id == borrow.copy_id && b.borrow_date == borrow.borrow_date
    }) {
        return Err(AppError::DuplicateEntry(DUPLICATE_BORROW.to_string()));
    }
    Ok(())
}

#[async_trait]
impl LedgerTx for MemoryTx {
    async fn find_patron(&mut self, patron_id: &str) -> AppResult<Option<Patron>> {
        Ok(self.working.patrons.get(patron_id).cloned())
    }

    async fn copy_exists(&mut self, copy_id: i32) -> AppResult<bool> {
        Ok(self.working.copies.contains_key(&copy_id))
    }

    async fn find_borrow(&mut self, borrow_id: i32) -> AppResult<Option<Borrow>> {
        Ok(self.working.borrows.get(&borrow_id).cloned())
    }

    async fn find_open_borrow_for_copy(&mut self, copy_id: i32) -> AppResult<Option<Borrow>> {
        Ok(self
            .working
            .borrows
            .values()
            .find(|b| b.copy_id == copy_id && b.is_open())
            .cloned())
    }

    async fn find_borrow_by_key(
        &mut self,
        patron_id: &str,
        copy_id: i32,
        borrow_date: NaiveDate,
    ) -> AppResult<Option<Borrow>> {
        Ok(self
            .working
            .borrows
            .values()
            .find(|b| b.patron_id == patron_id && b.copy_id == copy_id && b.borrow_date == borrow_date)
            .cloned())
    }

    async fn patron_borrows(&mut self, patron_id: &str) -> AppResult<Vec<Borrow>> {
        Ok(self
            .working
            .borrows
            .values()
            .filter(|b| b.patron_id == patron_id)
            .cloned()
            .collect())
    }

    async fn overdue_borrows(&mut self, today: NaiveDate) -> AppResult<Vec<Borrow>> {
        Ok(self
            .working
            .borrows
            .values()
            .filter(|b| b.is_overdue(today))
            .cloned()
            .collect())
    }

    async fn insert_borrow(&mut self, new: &NewBorrow) -> AppResult<Borrow> {
        let candidate = Borrow {
            id: 0,
            patron_id: new.patron_id.clone(),
            copy_id: new.copy_id,
            borrow_date: new.borrow_date,
            due_date: new.due_date,
            return_date: None,
        };
        check_unique(&self.working, &candidate)?;

        let id = {
            let mut shared = self.shared.lock().unwrap();
            shared.next_borrow_id += 1;
            shared.next_borrow_id
        };
        let borrow = Borrow {
            id,
            patron_id: new.patron_id.clone(),
            copy_id: new.copy_id,
            borrow_date: new.borrow_date,
            due_date: new.due_date,
            return_date: None,
        };
        self.working.borrows.insert(borrow.id, borrow.clone());
        self.written_borrows.insert(borrow.id);
        Ok(borrow)
    }

    async fn set_return_date(&mut self, borrow_id: i32, return_date: NaiveDate) -> AppResult<()> {
        let borrow = self
            .working
            .borrows
            .get_mut(&borrow_id)
            .ok_or(AppError::Database(sqlx::Error::RowNotFound))?;
        borrow.return_date = Some(return_date);
        self.written_borrows.insert(borrow_id);
        Ok(())
    }

    async fn set_patron_status(&mut self, patron_id: &str, status: PatronStatus) -> AppResult<()> {
        self.patron_mut(patron_id)?.status = status;
        Ok(())
    }

    async fn add_patron_fine(&mut self, patron_id: &str, points: i32) -> AppResult<()> {
        self.patron_mut(patron_id)?.fine += points;
        Ok(())
    }

    async fn available_copies(&mut self) -> AppResult<Vec<AvailableCopy>> {
        let borrows = &self.working.borrows;
        Ok(self
            .working
            .copies
            .values()
            .filter(|c| !borrows.values().any(|b| b.copy_id == c.id && b.is_open()))
            .cloned()
            .collect())
    }

    async fn overdue_copies(&mut self, today: NaiveDate) -> AppResult<Vec<BorrowDetails>> {
        Ok(self
            .working
            .borrows
            .values()
            .filter(|b| b.is_overdue(today))
            .map(|b| self.details(b))
            .collect())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryTx {
            shared,
            mut working,
            written_patrons,
            written_borrows,
            fail_commit,
        } = *self;
        if fail_commit {
            return Err(AppError::Database(sqlx::Error::WorkerCrashed));
        }

        let mut shared = shared.lock().unwrap();
        let mut merged = shared.clone();
        for id in &written_patrons {
            if let Some(patron) = working.patrons.remove(id) {
                merged.patrons.insert(id.clone(), patron);
            }
        }
        let mut written = Vec::with_capacity(written_borrows.len());
        for id in &written_borrows {
            if let Some(borrow) = working.borrows.remove(id) {
                merged.borrows.remove(id);
                written.push(borrow);
            }
        }
        for borrow in written {
            check_unique(&merged, &borrow)?;
            merged.borrows.insert(borrow.id, borrow);
        }

        *shared = merged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        Ok(())
    }
}
