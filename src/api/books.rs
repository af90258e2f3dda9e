//! Book (catalog) endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use super::{
    extract::{ApiJson, ApiPath, ApiQuery},
    CountResponse,
};
use crate::{
    error::{AppError, AppResult, ErrorResponse},
    models::book::{Book, CreateBook, UpdateBook},
};

/// Exactly one criterion must be given
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct BookSearchQuery {
    /// Exact title
    pub title: Option<String>,
    /// Exact genre
    pub genre: Option<String>,
    /// "first middle last"
    pub author: Option<String>,
    /// Exact publisher name
    pub publisher: Option<String>,
}

/// List all books
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "All books", body = Vec<Book>)
    )
)]
pub async fn list_books(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.catalog.list_books().await?;
    Ok(Json(books))
}

/// Count books (titles, not copies)
#[utoipa::path(
    get,
    path = "/books/count",
    tag = "books",
    responses(
        (status = 200, description = "Number of books", body = CountResponse)
    )
)]
pub async fn count_books(State(state): State<crate::AppState>) -> AppResult<Json<CountResponse>> {
    let count = state.services.catalog.count_books().await?;
    Ok(Json(CountResponse { count }))
}

/// Search books by title, genre, author or publisher
#[utoipa::path(
    get,
    path = "/books/search",
    tag = "books",
    params(BookSearchQuery),
    responses(
        (status = 200, description = "Matching books (at most 3)", body = Vec<Book>),
        (status = 400, description = "No criterion, several criteria, or malformed author name", body = ErrorResponse),
        (status = 404, description = "No match", body = ErrorResponse)
    )
)]
pub async fn search_books(
    State(state): State<crate::AppState>,
    ApiQuery(query): ApiQuery<BookSearchQuery>,
) -> AppResult<Json<Vec<Book>>> {
    let catalog = &state.services.catalog;
    let books = match query {
        BookSearchQuery { title: Some(title), genre: None, author: None, publisher: None } => {
            catalog.books_by_title(&title).await?
        }
        BookSearchQuery { title: None, genre: Some(genre), author: None, publisher: None } => {
            catalog.books_by_genre(&genre).await?
        }
        BookSearchQuery { title: None, genre: None, author: Some(author), publisher: None } => {
            catalog.books_by_author(&author).await?
        }
        BookSearchQuery { title: None, genre: None, author: None, publisher: Some(publisher) } => {
            catalog.books_by_publisher(&publisher).await?
        }
        _ => {
            return Err(AppError::InvalidRequest(
                "Give exactly one of title, genre, author or publisher".to_string(),
            ))
        }
    };
    Ok(Json(books))
}

/// Get book by ISBN
#[utoipa::path(
    get,
    path = "/books/{isbn}",
    tag = "books",
    params(
        ("isbn" = String, Path, description = "ISBN-10 or ISBN-13, hyphens allowed")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 400, description = "Invalid ISBN", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    ApiPath(isbn): ApiPath<String>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.get_book(&isbn).await?;
    Ok(Json(book))
}

/// Create a book and its copies
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 404, description = "Author or publisher not found", body = ErrorResponse),
        (status = 409, description = "ISBN already catalogued", body = ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    ApiJson(data): ApiJson<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let book = state.services.catalog.create_book(data).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Update a book
#[utoipa::path(
    put,
    path = "/books/{isbn}",
    tag = "books",
    params(
        ("isbn" = String, Path, description = "ISBN-10 or ISBN-13")
    ),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    ApiPath(isbn): ApiPath<String>,
    ApiJson(data): ApiJson<UpdateBook>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.update_book(&isbn, data).await?;
    Ok(Json(book))
}

/// Delete a book with its copies and their borrows
#[utoipa::path(
    delete,
    path = "/books/{isbn}",
    tag = "books",
    params(
        ("isbn" = String, Path, description = "ISBN-10 or ISBN-13")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 400, description = "Invalid ISBN", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    ApiPath(isbn): ApiPath<String>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_book(&isbn).await?;
    Ok(StatusCode::NO_CONTENT)
}
