//! Borrow (circulation) endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use super::{
    extract::{ApiJson, ApiPath},
    CountResponse,
};
use crate::{
    error::{AppResult, ErrorResponse},
    models::borrow::{Borrow, BorrowDetails, CreateBorrow, ReturnBorrow},
    services::borrows::ReturnOutcome,
};

/// List every borrow, open and returned
#[utoipa::path(
    get,
    path = "/borrows",
    tag = "borrows",
    responses(
        (status = 200, description = "All borrows", body = Vec<BorrowDetails>)
    )
)]
pub async fn list_borrows(State(state): State<crate::AppState>) -> AppResult<Json<Vec<BorrowDetails>>> {
    let borrows = state.services.borrows.list().await?;
    Ok(Json(borrows))
}

#[utoipa::path(
    get,
    path = "/borrows/count",
    tag = "borrows",
    responses(
        (status = 200, description = "Number of borrows ever made", body = CountResponse)
    )
)]
pub async fn count_borrows(State(state): State<crate::AppState>) -> AppResult<Json<CountResponse>> {
    let count = state.services.borrows.count().await?;
    Ok(Json(CountResponse { count }))
}

/// Borrow a copy. The due date is always 15 days after the borrow date.
#[utoipa::path(
    post,
    path = "/borrows",
    tag = "borrows",
    request_body = CreateBorrow,
    responses(
        (status = 201, description = "Borrow opened", body = Borrow),
        (status = 400, description = "Malformed patron ID", body = ErrorResponse),
        (status = 404, description = "Copy or patron not found", body = ErrorResponse),
        (status = 409, description = "Copy already out, or same borrow already recorded", body = ErrorResponse)
    )
)]
pub async fn create_borrow(
    State(state): State<crate::AppState>,
    ApiJson(request): ApiJson<CreateBorrow>,
) -> AppResult<(StatusCode, Json<Borrow>)> {
    let borrow = state.services.borrows.create(&request).await?;
    Ok((StatusCode::CREATED, Json(borrow)))
}

/// Return a borrowed copy
#[utoipa::path(
    post,
    path = "/borrows/{id}/return",
    tag = "borrows",
    params(
        ("id" = i32, Path, description = "Borrow (transaction) ID")
    ),
    request_body = ReturnBorrow,
    responses(
        (status = 200, description = "Copy returned", body = ReturnOutcome),
        (status = 400, description = "Already returned", body = ErrorResponse),
        (status = 404, description = "Transaction not found", body = ErrorResponse)
    )
)]
pub async fn return_borrow(
    State(state): State<crate::AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(request): ApiJson<ReturnBorrow>,
) -> AppResult<Json<ReturnOutcome>> {
    let outcome = state.services.borrows.return_borrow(id, &request).await?;
    Ok(Json(outcome))
}

/// Borrow history of a patron
#[utoipa::path(
    get,
    path = "/patrons/{id}/borrows",
    tag = "borrows",
    params(
        ("id" = String, Path, description = "Patron ID")
    ),
    responses(
        (status = 200, description = "Patron's borrows", body = Vec<BorrowDetails>),
        (status = 400, description = "Malformed patron ID", body = ErrorResponse),
        (status = 404, description = "Patron not found", body = ErrorResponse)
    )
)]
pub async fn borrows_by_patron(
    State(state): State<crate::AppState>,
    ApiPath(id): ApiPath<String>,
) -> AppResult<Json<Vec<BorrowDetails>>> {
    let borrows = state.services.borrows.list_by_patron(&id).await?;
    Ok(Json(borrows))
}

/// Borrow history of every copy of a book
#[utoipa::path(
    get,
    path = "/books/{isbn}/borrows",
    tag = "borrows",
    params(
        ("isbn" = String, Path, description = "ISBN-10 or ISBN-13")
    ),
    responses(
        (status = 200, description = "Borrows of the book's copies", body = Vec<BorrowDetails>),
        (status = 400, description = "Invalid ISBN", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn borrows_by_isbn(
    State(state): State<crate::AppState>,
    ApiPath(isbn): ApiPath<String>,
) -> AppResult<Json<Vec<BorrowDetails>>> {
    let borrows = state.services.borrows.list_by_isbn(&isbn).await?;
    Ok(Json(borrows))
}
