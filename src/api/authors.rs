//! Author endpoints

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
    error::{AppResult, ErrorResponse},
    models::author::{Author, CreateAuthor, UpdateAuthor},
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct AuthorSearchQuery {
    /// "first middle last"
    pub name: String,
}

#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    responses(
        (status = 200, description = "All authors", body = Vec<Author>)
    )
)]
pub async fn list_authors(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Author>>> {
    let authors = state.services.catalog.list_authors().await?;
    Ok(Json(authors))
}

#[utoipa::path(
    get,
    path = "/authors/count",
    tag = "authors",
    responses(
        (status = 200, description = "Number of authors", body = CountResponse)
    )
)]
pub async fn count_authors(State(state): State<crate::AppState>) -> AppResult<Json<CountResponse>> {
    let count = state.services.catalog.count_authors().await?;
    Ok(Json(CountResponse { count }))
}

#[utoipa::path(
    get,
    path = "/authors/search",
    tag = "authors",
    params(AuthorSearchQuery),
    responses(
        (status = 200, description = "Matching authors (at most 3)", body = Vec<Author>),
        (status = 400, description = "Name is not three words", body = ErrorResponse),
        (status = 404, description = "No match", body = ErrorResponse)
    )
)]
pub async fn search_authors(
    State(state): State<crate::AppState>,
    ApiQuery(query): ApiQuery<AuthorSearchQuery>,
) -> AppResult<Json<Vec<Author>>> {
    let authors = state.services.catalog.authors_by_name(&query.name).await?;
    Ok(Json(authors))
}

#[utoipa::path(
    post,
    path = "/authors",
    tag = "authors",
    request_body = CreateAuthor,
    responses(
        (status = 201, description = "Author created", body = Author),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 409, description = "Author already exists", body = ErrorResponse)
    )
)]
pub async fn create_author(
    State(state): State<crate::AppState>,
    ApiJson(data): ApiJson<CreateAuthor>,
) -> AppResult<(StatusCode, Json<Author>)> {
    let author = state.services.catalog.create_author(data).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

#[utoipa::path(
    put,
    path = "/authors/{id}",
    tag = "authors",
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    request_body = UpdateAuthor,
    responses(
        (status = 200, description = "Author updated", body = Author),
        (status = 404, description = "Author not found", body = ErrorResponse),
        (status = 409, description = "Another author has this name", body = ErrorResponse)
    )
)]
pub async fn update_author(
    State(state): State<crate::AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(data): ApiJson<UpdateAuthor>,
) -> AppResult<Json<Author>> {
    let author = state.services.catalog.update_author(id, data).await?;
    Ok(Json(author))
}

/// Delete an author with its books, their copies and borrows
#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "authors",
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 404, description = "Author not found", body = ErrorResponse)
    )
)]
pub async fn delete_author(
    State(state): State<crate::AppState>,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_author(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
