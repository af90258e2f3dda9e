//! Publisher endpoints

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
    models::publisher::{CreatePublisher, Publisher, UpdatePublisher},
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct PublisherSearchQuery {
    pub name: String,
}

#[utoipa::path(
    get,
    path = "/publishers",
    tag = "publishers",
    responses(
        (status = 200, description = "All publishers", body = Vec<Publisher>)
    )
)]
pub async fn list_publishers(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Publisher>>> {
    let publishers = state.services.catalog.list_publishers().await?;
    Ok(Json(publishers))
}

#[utoipa::path(
    get,
    path = "/publishers/count",
    tag = "publishers",
    responses(
        (status = 200, description = "Number of publishers", body = CountResponse)
    )
)]
pub async fn count_publishers(State(state): State<crate::AppState>) -> AppResult<Json<CountResponse>> {
    let count = state.services.catalog.count_publishers().await?;
    Ok(Json(CountResponse { count }))
}

#[utoipa::path(
    get,
    path = "/publishers/search",
    tag = "publishers",
    params(PublisherSearchQuery),
    responses(
        (status = 200, description = "Matching publishers (at most 3)", body = Vec<Publisher>),
        (status = 404, description = "No match", body = ErrorResponse)
    )
)]
pub async fn search_publishers(
    State(state): State<crate::AppState>,
    ApiQuery(query): ApiQuery<PublisherSearchQuery>,
) -> AppResult<Json<Vec<Publisher>>> {
    let publishers = state.services.catalog.publishers_by_name(&query.name).await?;
    Ok(Json(publishers))
}

#[utoipa::path(
    post,
    path = "/publishers",
    tag = "publishers",
    request_body = CreatePublisher,
    responses(
        (status = 201, description = "Publisher created", body = Publisher),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 409, description = "Publisher already exists", body = ErrorResponse)
    )
)]
pub async fn create_publisher(
    State(state): State<crate::AppState>,
    ApiJson(data): ApiJson<CreatePublisher>,
) -> AppResult<(StatusCode, Json<Publisher>)> {
    let publisher = state.services.catalog.create_publisher(data).await?;
    Ok((StatusCode::CREATED, Json(publisher)))
}

#[utoipa::path(
    put,
    path = "/publishers/{id}",
    tag = "publishers",
    params(
        ("id" = i32, Path, description = "Publisher ID")
    ),
    request_body = UpdatePublisher,
    responses(
        (status = 200, description = "Publisher updated", body = Publisher),
        (status = 404, description = "Publisher not found", body = ErrorResponse),
        (status = 409, description = "Another publisher has this name", body = ErrorResponse)
    )
)]
pub async fn update_publisher(
    State(state): State<crate::AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(data): ApiJson<UpdatePublisher>,
) -> AppResult<Json<Publisher>> {
    let publisher = state.services.catalog.update_publisher(id, data).await?;
    Ok(Json(publisher))
}

/// Delete a publisher with its books, their copies and borrows
#[utoipa::path(
    delete,
    path = "/publishers/{id}",
    tag = "publishers",
    params(
        ("id" = i32, Path, description = "Publisher ID")
    ),
    responses(
        (status = 204, description = "Publisher deleted"),
        (status = 404, description = "Publisher not found", body = ErrorResponse)
    )
)]
pub async fn delete_publisher(
    State(state): State<crate::AppState>,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_publisher(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
