//! Books and book copies repository

use sqlx::{PgConnection, Pool, Postgres};

use super::{finish, AUTHOR_DISPLAY_SQL};
use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
};

pub const DUPLICATE_BOOK_ISBN: &str = "A book with this ISBN already exists.";
pub const BOOK_NOT_FOUND: &str = "Book not found";

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // READ
    // =========================================================================

    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY title")
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    /// Get book by canonical ISBN-13
    pub async fn get_by_isbn(&self, isbn: &str) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE isbn = $1")
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(BOOK_NOT_FOUND.to_string()))
    }

    pub async fn find_by_title(&self, title: &str, limit: i64) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE title = $1 LIMIT $2")
            .bind(title)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    pub async fn find_by_genre(&self, genre: &str, limit: i64) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE genre = $1 LIMIT $2")
            .bind(genre)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    pub async fn find_by_author(
        &self,
        first_name: &str,
        midname_initial: &str,
        last_name: &str,
        limit: i64,
    ) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT b.* FROM books b
            JOIN authors a ON b.author_id = a.id
            WHERE a.first_name = $1 AND a.midname_initial = $2 AND a.last_name = $3
            LIMIT $4
            "#,
        )
        .bind(first_name)
        .bind(midname_initial)
        .bind(last_name)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    pub async fn find_by_publisher(&self, publisher_name: &str, limit: i64) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT b.* FROM books b
            JOIN publishers p ON b.publisher_id = p.id
            WHERE p.name = $1
            LIMIT $2
            "#,
        )
        .bind(publisher_name)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_copies(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_copies")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // =========================================================================
    // WRITE
    // =========================================================================

    /// Create a book with `qty` copies. `data.isbn` must already be canonical.
    pub async fn create(&self, data: &CreateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;
        let result = Self::create_in(&mut tx, data).await;
        finish(tx, result).await
    }

    async fn create_in(conn: &mut PgConnection, data: &CreateBook) -> AppResult<Book> {
        let duplicate: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1)")
            .bind(&data.isbn)
            .fetch_one(&mut *conn)
            .await?;
        if duplicate {
            return Err(AppError::DuplicateEntry(DUPLICATE_BOOK_ISBN.to_string()));
        }

        let author: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM authors WHERE id = $1)")
            .bind(data.author_id)
            .fetch_one(&mut *conn)
            .await?;
        if !author {
            return Err(AppError::NotFound(super::authors::AUTHOR_NOT_FOUND.to_string()));
        }

        let publisher: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM publishers WHERE id = $1)")
            .bind(data.publisher_id)
            .fetch_one(&mut *conn)
            .await?;
        if !publisher {
            return Err(AppError::NotFound(super::publishers::PUBLISHER_NOT_FOUND.to_string()));
        }

        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (isbn, title, genre, author_id, publisher_id, published_year, qty)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&data.isbn)
        .bind(&data.title)
        .bind(&data.genre)
        .bind(data.author_id)
        .bind(data.publisher_id)
        .bind(data.published_year)
        .bind(data.qty)
        .fetch_one(&mut *conn)
        .await?;

        sqlx::query("INSERT INTO book_copies (isbn) SELECT $1 FROM generate_series(1, $2)")
            .bind(&book.isbn)
            .bind(book.qty)
            .execute(&mut *conn)
            .await?;

        Ok(book)
    }

    pub async fn update(&self, isbn: &str, data: &UpdateBook) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = COALESCE($1, title),
                genre = COALESCE($2, genre),
                published_year = COALESCE($3, published_year)
            WHERE isbn = $4
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(&data.genre)
        .bind(data.published_year)
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e).into_integrity())?
        .ok_or_else(|| AppError::NotFound(BOOK_NOT_FOUND.to_string()))
    }

    /// Delete a book, its copies, and every borrow of those copies
    pub async fn delete(&self, isbn: &str) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        let result: AppResult<()> = async {
            let found: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1)")
                .bind(isbn)
                .fetch_one(&mut *tx)
                .await?;
            if !found {
                return Err(AppError::NotFound(BOOK_NOT_FOUND.to_string()));
            }
            delete_books_where(&mut tx, "b.isbn = $1", isbn).await
        }
        .await;
        finish(tx, result).await
    }
}

/// Delete the books matching `filter` (over alias `b`, one bind parameter)
/// together with their copies and borrows.
pub(crate) async fn delete_books_where<V>(conn: &mut PgConnection, filter: &str, value: V) -> AppResult<()>
where
    V: for<'q> sqlx::Encode<'q, Postgres> + sqlx::Type<Postgres> + Send + Copy,
{
    sqlx::query(&format!(
        r#"
        DELETE FROM borrows WHERE copy_id IN (
            SELECT c.id FROM book_copies c JOIN books b ON c.isbn = b.isbn WHERE {}
        )
        "#,
        filter
    ))
    .bind(value)
    .execute(&mut *conn)
    .await?;

    sqlx::query(&format!(
        "DELETE FROM book_copies WHERE isbn IN (SELECT b.isbn FROM books b WHERE {})",
        filter
    ))
    .bind(value)
    .execute(&mut *conn)
    .await?;

    sqlx::query(&format!("DELETE FROM books b WHERE {}", filter))
        .bind(value)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

pub(crate) fn available_copies_sql() -> String {
    format!(
        r#"
        SELECT c.id, c.isbn, b.title, {} AS author, p.name AS publisher
        FROM book_copies c
        JOIN books b ON c.isbn = b.isbn
        JOIN authors a ON b.author_id = a.id
        JOIN publishers p ON b.publisher_id = p.id
        WHERE c.id NOT IN (SELECT copy_id FROM borrows WHERE return_date IS NULL)
        ORDER BY c.id
        "#,
        AUTHOR_DISPLAY_SQL
    )
}
