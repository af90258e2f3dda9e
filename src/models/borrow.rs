//! Borrow (transaction) model and related types

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Fixed loan period
pub const BORROW_DURATION_DAYS: i64 = 15;

/// Due date for a borrow started on `borrow_date`
pub fn due_date_for(borrow_date: NaiveDate) -> NaiveDate {
    borrow_date + Duration::days(BORROW_DURATION_DAYS)
}

/// Borrow model from database. `return_date = None` means the copy is still out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Borrow {
    pub id: i32,
    pub patron_id: String,
    pub copy_id: i32,
    pub borrow_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
}

impl Borrow {
    pub fn is_open(&self) -> bool {
        self.return_date.is_none()
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.is_open() && self.due_date < today
    }
}

/// Borrow row to insert; the due date is always derived, never supplied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBorrow {
    pub patron_id: String,
    pub copy_id: i32,
    pub borrow_date: NaiveDate,
    pub due_date: NaiveDate,
}

impl NewBorrow {
    pub fn new(patron_id: String, copy_id: i32, borrow_date: NaiveDate) -> Self {
        Self {
            patron_id,
            copy_id,
            borrow_date,
            due_date: due_date_for(borrow_date),
        }
    }
}

/// Create borrow request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBorrow {
    pub patron_id: String,
    pub copy_id: i32,
    pub borrow_date: NaiveDate,
}

/// Return borrow request
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReturnBorrow {
    pub return_date: NaiveDate,
}

/// Borrow joined out to copy, book, author and publisher for display
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowDetails {
    pub borrow_id: i32,
    pub patron_id: String,
    pub borrow_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub copy_id: i32,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub publisher: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_due_date_is_fifteen_days_out() {
        let start = NaiveDate::from_ymd_opt(2025, 2, 20).unwrap();
        assert_eq!(due_date_for(start), NaiveDate::from_ymd_opt(2025, 3, 7).unwrap());

        let new = NewBorrow::new("1MS21CS045".to_string(), 1, start);
        assert_eq!(new.due_date - new.borrow_date, Duration::days(15));
    }

    #[test]
    fn test_overdue_only_when_open() {
        let mut borrow = Borrow {
            id: 1,
            patron_id: "1MS21CS045".to_string(),
            copy_id: 1,
            borrow_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2025, 1, 16).unwrap(),
            return_date: None,
        };
        let today = NaiveDate::from_ymd_opt(2025, 1, 17).unwrap();
        assert!(borrow.is_overdue(today));
        assert!(!borrow.is_overdue(borrow.due_date));

        borrow.return_date = Some(today);
        assert!(!borrow.is_overdue(today));
    }
}
