//! Catalog management service: books, their copies, authors and publishers

use std::sync::Arc;

use chrono::Datelike;
use validator::Validate;

use super::clock::Clock;
use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorName, CreateAuthor, UpdateAuthor},
        book::{Book, CreateBook, UpdateBook},
        publisher::{CreatePublisher, Publisher, UpdatePublisher},
    },
    repository::{
        authors::AUTHOR_NOT_FOUND, books::BOOK_NOT_FOUND, publishers::PUBLISHER_NOT_FOUND, Repository,
    },
    validation::{
        book::{validate_published_year, validate_qty},
        normalize_isbn,
    },
};

/// Title, genre, author and publisher searches return at most this many matches
pub const SEARCH_LIMIT: i64 = 3;

fn author_name(name: &str) -> AppResult<AuthorName> {
    AuthorName::parse(name).ok_or_else(|| {
        AppError::InvalidRequest("Author name must be given as first, middle initial and last name".to_string())
    })
}

fn non_empty<T>(rows: Vec<T>, not_found: &str) -> AppResult<Vec<T>> {
    if rows.is_empty() {
        return Err(AppError::NotFound(not_found.to_string()));
    }
    Ok(rows)
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    clock: Arc<dyn Clock>,
}

impl CatalogService {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    // =========================================================================
    // BOOKS
    // =========================================================================

    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list().await
    }

    pub async fn count_books(&self) -> AppResult<i64> {
        self.repository.books.count().await
    }

    pub async fn count_copies(&self) -> AppResult<i64> {
        self.repository.books.count_copies().await
    }

    /// Get a book by ISBN-10 or ISBN-13
    pub async fn get_book(&self, isbn: &str) -> AppResult<Book> {
        let isbn = normalize_isbn(isbn)?;
        self.repository.books.get_by_isbn(&isbn).await
    }

    pub async fn books_by_title(&self, title: &str) -> AppResult<Vec<Book>> {
        let books = self.repository.books.find_by_title(title.trim(), SEARCH_LIMIT).await?;
        non_empty(books, BOOK_NOT_FOUND)
    }

    pub async fn books_by_genre(&self, genre: &str) -> AppResult<Vec<Book>> {
        let books = self.repository.books.find_by_genre(genre.trim(), SEARCH_LIMIT).await?;
        non_empty(books, BOOK_NOT_FOUND)
    }

    pub async fn books_by_author(&self, name: &str) -> AppResult<Vec<Book>> {
        let name = author_name(name)?;
        let books = self
            .repository
            .books
            .find_by_author(&name.first_name, &name.midname_initial, &name.last_name, SEARCH_LIMIT)
            .await?;
        non_empty(books, BOOK_NOT_FOUND)
    }

    pub async fn books_by_publisher(&self, name: &str) -> AppResult<Vec<Book>> {
        let books = self.repository.books.find_by_publisher(name.trim(), SEARCH_LIMIT).await?;
        non_empty(books, BOOK_NOT_FOUND)
    }

    /// Create a book and its `qty` copies. The ISBN is stored in canonical ISBN-13 form.
    pub async fn create_book(&self, mut data: CreateBook) -> AppResult<Book> {
        data.isbn = normalize_isbn(&data.isbn)?;
        data.validate()?;
        validate_published_year(data.published_year, self.clock.today().year())?;
        validate_qty(data.qty)?;

        let book = self.repository.books.create(&data).await?;
        tracing::info!(isbn = %book.isbn, copies = book.qty, "Book created");
        Ok(book)
    }

    pub async fn update_book(&self, isbn: &str, data: UpdateBook) -> AppResult<Book> {
        let isbn = normalize_isbn(isbn)?;
        data.validate()?;
        if let Some(year) = data.published_year {
            validate_published_year(year, self.clock.today().year())?;
        }

        let book = self.repository.books.update(&isbn, &data).await?;
        tracing::info!(isbn = %book.isbn, "Book updated");
        Ok(book)
    }

    /// Delete a book with its copies and their borrows
    pub async fn delete_book(&self, isbn: &str) -> AppResult<()> {
        let isbn = normalize_isbn(isbn)?;
        self.repository.books.delete(&isbn).await?;
        tracing::info!(isbn = %isbn, "Book deleted");
        Ok(())
    }

    // =========================================================================
    // AUTHORS
    // =========================================================================

    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        self.repository.authors.list().await
    }

    pub async fn count_authors(&self) -> AppResult<i64> {
        self.repository.authors.count().await
    }

    pub async fn authors_by_name(&self, name: &str) -> AppResult<Vec<Author>> {
        let name = author_name(name)?;
        let authors = self.repository.authors.find_by_name(&name, SEARCH_LIMIT).await?;
        non_empty(authors, AUTHOR_NOT_FOUND)
    }

    pub async fn create_author(&self, data: CreateAuthor) -> AppResult<Author> {
        data.validate()?;
        let author = self.repository.authors.create(&data).await?;
        tracing::info!(author_id = author.id, name = %author.display_name(), "Author created");
        Ok(author)
    }

    pub async fn update_author(&self, id: i32, data: UpdateAuthor) -> AppResult<Author> {
        data.validate()?;
        self.repository.authors.update(id, &data).await
    }

    /// Delete an author with every book written by it
    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.repository.authors.delete(id).await?;
        tracing::info!(author_id = id, "Author deleted");
        Ok(())
    }

    // =========================================================================
    // PUBLISHERS
    // =========================================================================

    pub async fn list_publishers(&self) -> AppResult<Vec<Publisher>> {
        self.repository.publishers.list().await
    }

    pub async fn count_publishers(&self) -> AppResult<i64> {
        self.repository.publishers.count().await
    }

    pub async fn publishers_by_name(&self, name: &str) -> AppResult<Vec<Publisher>> {
        let publishers = self.repository.publishers.find_by_name(name.trim(), SEARCH_LIMIT).await?;
        non_empty(publishers, PUBLISHER_NOT_FOUND)
    }

    pub async fn create_publisher(&self, data: CreatePublisher) -> AppResult<Publisher> {
        data.validate()?;
        let publisher = self.repository.publishers.create(&data).await?;
        tracing::info!(publisher_id = publisher.id, name = %publisher.name, "Publisher created");
        Ok(publisher)
    }

    pub async fn update_publisher(&self, id: i32, data: UpdatePublisher) -> AppResult<Publisher> {
        data.validate()?;
        self.repository.publishers.update(id, &data).await
    }

    /// Delete a publisher with every book it published
    pub async fn delete_publisher(&self, id: i32) -> AppResult<()> {
        self.repository.publishers.delete(id).await?;
        tracing::info!(publisher_id = id, "Publisher deleted");
        Ok(())
    }
}
