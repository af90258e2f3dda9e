//! API handlers for Biblio REST endpoints

pub mod authors;
pub mod books;
pub mod borrows;
pub mod copies;
pub mod extract;
pub mod health;
pub mod openapi;
pub mod patrons;
pub mod publishers;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::ToSchema;

use crate::AppState;

/// Row count returned by the `/count` endpoints
#[derive(Debug, Serialize, ToSchema)]
pub struct CountResponse {
    pub count: i64,
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors.allowed_origins);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Patrons
        .route("/patrons", get(patrons::list_patrons).post(patrons::create_patron))
        .route("/patrons/count", get(patrons::count_patrons))
        .route("/patrons/search", get(patrons::search_patrons))
        .route("/patrons/fines/total", get(patrons::total_fines))
        .route("/patrons/fines/above/:fine", get(patrons::patrons_with_fine_above))
        .route(
            "/patrons/:id",
            get(patrons::get_patron)
                .put(patrons::update_patron)
                .delete(patrons::delete_patron),
        )
        .route("/patrons/:id/borrows", get(borrows::borrows_by_patron))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/count", get(books::count_books))
        .route("/books/search", get(books::search_books))
        .route(
            "/books/:isbn",
            get(books::get_book).put(books::update_book).delete(books::delete_book),
        )
        .route("/books/:isbn/borrows", get(borrows::borrows_by_isbn))
        // Copies
        .route("/copies/count", get(copies::count_copies))
        .route("/copies/unreturned/count", get(copies::count_unreturned))
        .route("/copies/available", get(copies::available_copies))
        .route("/copies/overdue", get(copies::overdue_copies))
        // Authors
        .route("/authors", get(authors::list_authors).post(authors::create_author))
        .route("/authors/count", get(authors::count_authors))
        .route("/authors/search", get(authors::search_authors))
        .route(
            "/authors/:id",
            axum::routing::put(authors::update_author).delete(authors::delete_author),
        )
        // Publishers
        .route("/publishers", get(publishers::list_publishers).post(publishers::create_publisher))
        .route("/publishers/count", get(publishers::count_publishers))
        .route("/publishers/search", get(publishers::search_publishers))
        .route(
            "/publishers/:id",
            axum::routing::put(publishers::update_publisher).delete(publishers::delete_publisher),
        )
        // Borrows
        .route("/borrows", get(borrows::list_borrows).post(borrows::create_borrow))
        .route("/borrows/count", get(borrows::count_borrows))
        .route("/borrows/:id/return", post(borrows::return_borrow))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!("Failed to parse CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}
