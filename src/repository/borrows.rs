//! Borrow listings and counts (read side)

use sqlx::{Pool, Postgres};

use super::AUTHOR_DISPLAY_SQL;
use crate::{error::AppResult, models::borrow::BorrowDetails};

#[derive(Clone)]
pub struct BorrowsRepository {
    pool: Pool<Postgres>,
}

/// Borrow rows joined out to copy, book, author and publisher; `filter` is
/// appended as the WHERE clause.
pub(crate) fn borrow_details_sql(filter: &str) -> String {
    format!(
        r#"
        SELECT br.id AS borrow_id, br.patron_id, br.borrow_date, br.due_date, br.return_date,
               c.id AS copy_id, b.isbn, b.title, {} AS author, p.name AS publisher
        FROM borrows br
        JOIN book_copies c ON br.copy_id = c.id
        JOIN books b ON c.isbn = b.isbn
        JOIN authors a ON b.author_id = a.id
        JOIN publishers p ON b.publisher_id = p.id
        WHERE {}
        ORDER BY br.id
        "#,
        AUTHOR_DISPLAY_SQL, filter
    )
}

impl BorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> AppResult<Vec<BorrowDetails>> {
        let borrows = sqlx::query_as::<_, BorrowDetails>(&borrow_details_sql("TRUE"))
            .fetch_all(&self.pool)
            .await?;
        Ok(borrows)
    }

    pub async fn list_by_patron(&self, patron_id: &str) -> AppResult<Vec<BorrowDetails>> {
        let borrows = sqlx::query_as::<_, BorrowDetails>(&borrow_details_sql("br.patron_id = $1"))
            .bind(patron_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(borrows)
    }

    pub async fn list_by_isbn(&self, isbn: &str) -> AppResult<Vec<BorrowDetails>> {
        let borrows = sqlx::query_as::<_, BorrowDetails>(&borrow_details_sql("c.isbn = $1"))
            .bind(isbn)
            .fetch_all(&self.pool)
            .await?;
        Ok(borrows)
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM borrows")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Count open borrows (copies currently out)
    pub async fn count_unreturned(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM borrows WHERE return_date IS NULL")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
