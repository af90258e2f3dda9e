//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{authors, books, borrows, copies, health, patrons, publishers};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Biblio API",
        version = "1.0.0",
        description = "Library management REST API: patrons, catalog, copies and circulation",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Patrons
        patrons::list_patrons,
        patrons::count_patrons,
        patrons::search_patrons,
        patrons::total_fines,
        patrons::patrons_with_fine_above,
        patrons::get_patron,
        patrons::create_patron,
        patrons::update_patron,
        patrons::delete_patron,
        // Books
        books::list_books,
        books::count_books,
        books::search_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Copies
        copies::count_copies,
        copies::count_unreturned,
        copies::available_copies,
        copies::overdue_copies,
        // Authors
        authors::list_authors,
        authors::count_authors,
        authors::search_authors,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        // Publishers
        publishers::list_publishers,
        publishers::count_publishers,
        publishers::search_publishers,
        publishers::create_publisher,
        publishers::update_publisher,
        publishers::delete_publisher,
        // Borrows
        borrows::list_borrows,
        borrows::count_borrows,
        borrows::create_borrow,
        borrows::return_borrow,
        borrows::borrows_by_patron,
        borrows::borrows_by_isbn,
    ),
    components(
        schemas(
            // Patrons
            crate::models::patron::Patron,
            crate::models::patron::PatronStatus,
            crate::models::patron::CreatePatron,
            crate::models::patron::UpdatePatron,
            crate::models::patron::FineTotal,
            // Books
            crate::models::book::Book,
            crate::models::book::BookCopy,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::book::AvailableCopy,
            // Authors & publishers
            crate::models::author::Author,
            crate::models::author::CreateAuthor,
            crate::models::author::UpdateAuthor,
            crate::models::publisher::Publisher,
            crate::models::publisher::CreatePublisher,
            crate::models::publisher::UpdatePublisher,
            // Borrows
            crate::models::borrow::Borrow,
            crate::models::borrow::CreateBorrow,
            crate::models::borrow::ReturnBorrow,
            crate::models::borrow::BorrowDetails,
            crate::services::borrows::ReturnOutcome,
            // Common
            crate::api::CountResponse,
            health::HealthResponse,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "patrons", description = "Patron management"),
        (name = "books", description = "Catalog management"),
        (name = "copies", description = "Copy availability and counts"),
        (name = "authors", description = "Author management"),
        (name = "publishers", description = "Publisher management"),
        (name = "borrows", description = "Borrowing and returns")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_circulation_paths() {
        let doc = ApiDoc::openapi();
        for path in ["/borrows", "/borrows/{id}/return", "/copies/available", "/books/{isbn}"] {
            assert!(doc.paths.paths.contains_key(path), "{}", path);
        }
    }
}
