//! Patron management endpoints

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
    models::patron::{CreatePatron, FineTotal, Patron, UpdatePatron},
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct PatronSearchQuery {
    /// "first last"
    pub name: String,
}

/// List all patrons
#[utoipa::path(
    get,
    path = "/patrons",
    tag = "patrons",
    responses(
        (status = 200, description = "All patrons", body = Vec<Patron>)
    )
)]
pub async fn list_patrons(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Patron>>> {
    let patrons = state.services.patrons.list().await?;
    Ok(Json(patrons))
}

/// Count patrons
#[utoipa::path(
    get,
    path = "/patrons/count",
    tag = "patrons",
    responses(
        (status = 200, description = "Number of patrons", body = CountResponse)
    )
)]
pub async fn count_patrons(State(state): State<crate::AppState>) -> AppResult<Json<CountResponse>> {
    let count = state.services.patrons.count().await?;
    Ok(Json(CountResponse { count }))
}

/// Search patrons by full name
#[utoipa::path(
    get,
    path = "/patrons/search",
    tag = "patrons",
    params(PatronSearchQuery),
    responses(
        (status = 200, description = "Matching patrons (at most 3)", body = Vec<Patron>),
        (status = 400, description = "Name is not \"first last\"", body = ErrorResponse),
        (status = 404, description = "No match", body = ErrorResponse)
    )
)]
pub async fn search_patrons(
    State(state): State<crate::AppState>,
    ApiQuery(query): ApiQuery<PatronSearchQuery>,
) -> AppResult<Json<Vec<Patron>>> {
    let patrons = state.services.patrons.search_by_name(&query.name).await?;
    Ok(Json(patrons))
}

/// Sum of all outstanding fines
#[utoipa::path(
    get,
    path = "/patrons/fines/total",
    tag = "patrons",
    responses(
        (status = 200, description = "Total fine-points owed", body = FineTotal)
    )
)]
pub async fn total_fines(State(state): State<crate::AppState>) -> AppResult<Json<FineTotal>> {
    let total = state.services.patrons.total_fines().await?;
    Ok(Json(FineTotal { total }))
}

/// Patrons owing more than the given fine
#[utoipa::path(
    get,
    path = "/patrons/fines/above/{fine}",
    tag = "patrons",
    params(
        ("fine" = i32, Path, description = "Exclusive lower bound")
    ),
    responses(
        (status = 200, description = "Patrons over the bound (at most 10)", body = Vec<Patron>),
        (status = 404, description = "No patron over the bound", body = ErrorResponse)
    )
)]
pub async fn patrons_with_fine_above(
    State(state): State<crate::AppState>,
    ApiPath(fine): ApiPath<i32>,
) -> AppResult<Json<Vec<Patron>>> {
    let patrons = state.services.patrons.with_fine_above(fine).await?;
    Ok(Json(patrons))
}

/// Get patron by ID
#[utoipa::path(
    get,
    path = "/patrons/{id}",
    tag = "patrons",
    params(
        ("id" = String, Path, description = "Patron ID, e.g. 1MS21CS045")
    ),
    responses(
        (status = 200, description = "Patron details", body = Patron),
        (status = 400, description = "Malformed patron ID", body = ErrorResponse),
        (status = 404, description = "Patron not found", body = ErrorResponse)
    )
)]
pub async fn get_patron(
    State(state): State<crate::AppState>,
    ApiPath(id): ApiPath<String>,
) -> AppResult<Json<Patron>> {
    let patron = state.services.patrons.get(&id).await?;
    Ok(Json(patron))
}

/// Register a new patron
#[utoipa::path(
    post,
    path = "/patrons",
    tag = "patrons",
    request_body = CreatePatron,
    responses(
        (status = 201, description = "Patron created", body = Patron),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 409, description = "ID, email or phone already registered", body = ErrorResponse)
    )
)]
pub async fn create_patron(
    State(state): State<crate::AppState>,
    ApiJson(data): ApiJson<CreatePatron>,
) -> AppResult<(StatusCode, Json<Patron>)> {
    let patron = state.services.patrons.create(data).await?;
    Ok((StatusCode::CREATED, Json(patron)))
}

/// Update a patron
#[utoipa::path(
    put,
    path = "/patrons/{id}",
    tag = "patrons",
    params(
        ("id" = String, Path, description = "Patron ID")
    ),
    request_body = UpdatePatron,
    responses(
        (status = 200, description = "Patron updated", body = Patron),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 404, description = "Patron not found", body = ErrorResponse),
        (status = 409, description = "Email or phone used by another patron", body = ErrorResponse)
    )
)]
pub async fn update_patron(
    State(state): State<crate::AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(data): ApiJson<UpdatePatron>,
) -> AppResult<Json<Patron>> {
    let patron = state.services.patrons.update(&id, data).await?;
    Ok(Json(patron))
}

/// Delete a patron and all of its borrows
#[utoipa::path(
    delete,
    path = "/patrons/{id}",
    tag = "patrons",
    params(
        ("id" = String, Path, description = "Patron ID")
    ),
    responses(
        (status = 204, description = "Patron deleted"),
        (status = 404, description = "Patron not found", body = ErrorResponse)
    )
)]
pub async fn delete_patron(
    State(state): State<crate::AppState>,
    ApiPath(id): ApiPath<String>,
) -> AppResult<StatusCode> {
    state.services.patrons.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
