//! Book copy circulation views

use axum::{extract::State, Json};

use super::CountResponse;
use crate::{
    error::AppResult,
    models::{book::AvailableCopy, borrow::BorrowDetails},
};

/// Count all physical copies
#[utoipa::path(
    get,
    path = "/copies/count",
    tag = "copies",
    responses(
        (status = 200, description = "Number of copies", body = CountResponse)
    )
)]
pub async fn count_copies(State(state): State<crate::AppState>) -> AppResult<Json<CountResponse>> {
    let count = state.services.catalog.count_copies().await?;
    Ok(Json(CountResponse { count }))
}

/// Count copies currently out on loan
#[utoipa::path(
    get,
    path = "/copies/unreturned/count",
    tag = "copies",
    responses(
        (status = 200, description = "Number of open borrows", body = CountResponse)
    )
)]
pub async fn count_unreturned(State(state): State<crate::AppState>) -> AppResult<Json<CountResponse>> {
    let count = state.services.borrows.count_unreturned().await?;
    Ok(Json(CountResponse { count }))
}

/// Copies that can be borrowed now
#[utoipa::path(
    get,
    path = "/copies/available",
    tag = "copies",
    responses(
        (status = 200, description = "Copies with no open borrow", body = Vec<AvailableCopy>)
    )
)]
pub async fn available_copies(State(state): State<crate::AppState>) -> AppResult<Json<Vec<AvailableCopy>>> {
    let copies = state.services.borrows.available_copies().await?;
    Ok(Json(copies))
}

/// Copies past their due date and not yet returned
#[utoipa::path(
    get,
    path = "/copies/overdue",
    tag = "copies",
    responses(
        (status = 200, description = "Overdue borrows", body = Vec<BorrowDetails>)
    )
)]
pub async fn overdue_copies(State(state): State<crate::AppState>) -> AppResult<Json<Vec<BorrowDetails>>> {
    let copies = state.services.borrows.overdue_copies().await?;
    Ok(Json(copies))
}
