//! Book and book copy models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Book model from database, keyed by canonical ISBN-13
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub isbn: String,
    pub title: String,
    pub genre: String,
    pub author_id: i32,
    pub publisher_id: i32,
    pub published_year: i32,
    /// Copies ordered when the book was created
    pub qty: i32,
}

/// One physical copy of a book
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookCopy {
    pub id: i32,
    pub isbn: String,
}

/// Create book request. `isbn` may be ISBN-10 or ISBN-13, hyphens allowed.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    pub isbn: String,
    #[validate(length(min = 10, max = 255, message = "Title must be 10 to 255 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 25, message = "Genre must be 1 to 25 characters"))]
    pub genre: String,
    pub author_id: i32,
    pub publisher_id: i32,
    pub published_year: i32,
    pub qty: i32,
}

/// Update book request; absent fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 10, max = 255, message = "Title must be 10 to 255 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 25, message = "Genre must be 1 to 25 characters"))]
    pub genre: Option<String>,
    pub published_year: Option<i32>,
}

/// A copy with no open borrow, joined out for display
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AvailableCopy {
    pub id: i32,
    pub isbn: String,
    pub title: String,
    /// "First M Last"
    pub author: String,
    pub publisher: String,
}
