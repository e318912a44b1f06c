use crate::errors::AppError;
use crate::models::*;
use crate::services::{OwnerService, SpecialtyService, VetService};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub owners: OwnerService,
    pub vets: VetService,
    pub specialties: SpecialtyService,
}

/// Rejects list requests that set more than one exact-match filter.
fn single_filter<'a>(
    filters: impl IntoIterator<Item = (&'static str, Option<&'a str>)>,
) -> Result<Option<(&'static str, &'a str)>, AppError> {
    let mut set = filters
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)));
    let first = set.next();
    if let Some((second, _)) = set.next() {
        return Err(AppError::BadRequest(format!(
            "Filter by one field at a time ({} and {} given)",
            first.map(|(name, _)| name).unwrap_or_default(),
            second
        )));
    }
    Ok(first)
}

fn deleted_message(id: impl std::fmt::Display) -> String {
    format!("Delete ID :{}", id)
}

/// Health check endpoint.
#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "Service is up")))]
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "petclinic-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

// ============ Owners ============

/// GET /owners
///
/// Lists every owner, or only those matching one exact-match filter.
#[utoipa::path(
    get,
    path = "/owners",
    tag = "owners",
    params(OwnerFilter),
    responses(
        (status = 200, description = "Owners in id order", body = [OwnerDto]),
        (status = 400, description = "More than one filter given")
    )
)]
pub async fn list_owners(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<OwnerFilter>,
) -> Result<Json<Vec<OwnerDto>>, AppError> {
    tracing::info!("GET /owners - filter: {:?}", filter);

    let owners = match single_filter([
        ("firstName", filter.first_name.as_deref()),
        ("lastName", filter.last_name.as_deref()),
        ("city", filter.city.as_deref()),
    ])? {
        Some(("firstName", value)) => state.owners.find_by_first_name(value).await?,
        Some(("lastName", value)) => state.owners.find_by_last_name(value).await?,
        Some((_, value)) => state.owners.find_by_city(value).await?,
        None => state.owners.find_all().await?,
    };

    owners
        .iter()
        .for_each(|item| tracing::info!("OwnerDTO >> {:?}", item));
    Ok(Json(owners))
}

/// POST /owners
#[utoipa::path(
    post,
    path = "/owners",
    tag = "owners",
    request_body = OwnerDto,
    responses((status = 201, description = "Owner created", body = OwnerDto))
)]
pub async fn create_owner(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<OwnerDto>,
) -> Result<(StatusCode, Json<OwnerDto>), AppError> {
    tracing::info!("POST /owners - payload: {:?}", payload);
    let created = state.owners.create(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /owners/:id
#[utoipa::path(
    get,
    path = "/owners/{id}",
    tag = "owners",
    params(("id" = i64, Path, description = "Owner id")),
    responses(
        (status = 200, description = "Owner found", body = OwnerDto),
        (status = 404, description = "No owner with this id")
    )
)]
pub async fn get_owner(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<OwnerDto>, AppError> {
    tracing::info!("GET /owners/{}", id);
    Ok(Json(state.owners.find_by_id(id).await?))
}

/// PUT /owners/:id
///
/// Overwrites the five editable fields of an existing owner. The body's `id`
/// is ignored.
#[utoipa::path(
    put,
    path = "/owners/{id}",
    tag = "owners",
    params(("id" = i64, Path, description = "Owner id")),
    request_body = OwnerDto,
    responses(
        (status = 200, description = "Owner updated", body = OwnerDto),
        (status = 404, description = "No owner with this id")
    )
)]
pub async fn update_owner(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<OwnerDto>,
) -> Result<Json<OwnerDto>, AppError> {
    tracing::info!("PUT /owners/{} - payload: {:?}", id, payload);

    let mut owner = state.owners.find_by_id(id).await?;
    owner.first_name = payload.first_name;
    owner.last_name = payload.last_name;
    owner.address = payload.address;
    owner.city = payload.city;
    owner.telephone = payload.telephone;

    Ok(Json(state.owners.update(owner).await?))
}

/// DELETE /owners/:id
#[utoipa::path(
    delete,
    path = "/owners/{id}",
    tag = "owners",
    params(("id" = i64, Path, description = "Owner id")),
    responses(
        (status = 200, description = "Owner deleted", body = String),
        (status = 404, description = "No owner with this id")
    )
)]
pub async fn delete_owner(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<String, AppError> {
    tracing::info!("DELETE /owners/{}", id);
    state.owners.delete(id).await?;
    Ok(deleted_message(id))
}

// ============ Vets ============

/// GET /vets
#[utoipa::path(
    get,
    path = "/vets",
    tag = "vets",
    params(VetFilter),
    responses(
        (status = 200, description = "Vets in id order, with their specialties", body = [VetDto]),
        (status = 400, description = "More than one filter given")
    )
)]
pub async fn list_vets(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<VetFilter>,
) -> Result<Json<Vec<VetDto>>, AppError> {
    tracing::info!("GET /vets - filter: {:?}", filter);

    let vets = match single_filter([
        ("firstName", filter.first_name.as_deref()),
        ("lastName", filter.last_name.as_deref()),
    ])? {
        Some(("firstName", value)) => state.vets.find_by_first_name(value).await?,
        Some((_, value)) => state.vets.find_by_last_name(value).await?,
        None => state.vets.find_all().await?,
    };

    vets.iter()
        .for_each(|item| tracing::info!("VetDTO >> {:?}", item));
    Ok(Json(vets))
}

/// POST /vets
///
/// `specialties` in the body is ignored; the new vet starts with none.
#[utoipa::path(
    post,
    path = "/vets",
    tag = "vets",
    request_body = VetDto,
    responses((status = 201, description = "Vet created", body = VetDto))
)]
pub async fn create_vet(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<VetDto>,
) -> Result<(StatusCode, Json<VetDto>), AppError> {
    tracing::info!("POST /vets - payload: {:?}", payload);
    let created = state.vets.create(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /vets/:id
#[utoipa::path(
    get,
    path = "/vets/{id}",
    tag = "vets",
    params(("id" = i32, Path, description = "Vet id")),
    responses(
        (status = 200, description = "Vet found", body = VetDto),
        (status = 404, description = "No vet with this id")
    )
)]
pub async fn get_vet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<VetDto>, AppError> {
    tracing::info!("GET /vets/{}", id);
    Ok(Json(state.vets.find_by_id(id).await?))
}

/// PUT /vets/:id
///
/// Overwrites first and last name. Specialties are kept as they are.
#[utoipa::path(
    put,
    path = "/vets/{id}",
    tag = "vets",
    params(("id" = i32, Path, description = "Vet id")),
    request_body = VetDto,
    responses(
        (status = 200, description = "Vet updated", body = VetDto),
        (status = 404, description = "No vet with this id")
    )
)]
pub async fn update_vet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<VetDto>,
) -> Result<Json<VetDto>, AppError> {
    tracing::info!("PUT /vets/{} - payload: {:?}", id, payload);

    let mut vet = state.vets.find_by_id(id).await?;
    vet.first_name = payload.first_name;
    vet.last_name = payload.last_name;

    Ok(Json(state.vets.update(vet).await?))
}

/// DELETE /vets/:id
#[utoipa::path(
    delete,
    path = "/vets/{id}",
    tag = "vets",
    params(("id" = i32, Path, description = "Vet id")),
    responses(
        (status = 200, description = "Vet deleted", body = String),
        (status = 404, description = "No vet with this id")
    )
)]
pub async fn delete_vet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<String, AppError> {
    tracing::info!("DELETE /vets/{}", id);
    state.vets.delete(id).await?;
    Ok(deleted_message(id))
}

/// PUT /vets/:id/specialties/:specialty_id
#[utoipa::path(
    put,
    path = "/vets/{id}/specialties/{specialty_id}",
    tag = "vets",
    params(
        ("id" = i32, Path, description = "Vet id"),
        ("specialty_id" = i32, Path, description = "Specialty id")
    ),
    responses(
        (status = 200, description = "Specialty linked", body = VetDto),
        (status = 404, description = "Vet or specialty missing")
    )
)]
pub async fn assign_vet_specialty(
    State(state): State<Arc<AppState>>,
    Path((id, specialty_id)): Path<(i32, i32)>,
) -> Result<Json<VetDto>, AppError> {
    tracing::info!("PUT /vets/{}/specialties/{}", id, specialty_id);
    Ok(Json(state.vets.assign_specialty(id, specialty_id).await?))
}

/// DELETE /vets/:id/specialties/:specialty_id
#[utoipa::path(
    delete,
    path = "/vets/{id}/specialties/{specialty_id}",
    tag = "vets",
    params(
        ("id" = i32, Path, description = "Vet id"),
        ("specialty_id" = i32, Path, description = "Specialty id")
    ),
    responses(
        (status = 200, description = "Specialty unlinked", body = VetDto),
        (status = 404, description = "Vet or specialty missing")
    )
)]
pub async fn unassign_vet_specialty(
    State(state): State<Arc<AppState>>,
    Path((id, specialty_id)): Path<(i32, i32)>,
) -> Result<Json<VetDto>, AppError> {
    tracing::info!("DELETE /vets/{}/specialties/{}", id, specialty_id);
    Ok(Json(state.vets.unassign_specialty(id, specialty_id).await?))
}

// ============ Specialties ============

/// GET /specialties
#[utoipa::path(
    get,
    path = "/specialties",
    tag = "specialties",
    params(SpecialtyFilter),
    responses((status = 200, description = "Specialties in id order", body = [SpecialtyDto]))
)]
pub async fn list_specialties(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<SpecialtyFilter>,
) -> Result<Json<Vec<SpecialtyDto>>, AppError> {
    tracing::info!("GET /specialties - filter: {:?}", filter);

    let specialties = match filter.name.as_deref() {
        Some(name) => state.specialties.find_by_name(name).await?,
        None => state.specialties.find_all().await?,
    };
    Ok(Json(specialties))
}

/// POST /specialties
#[utoipa::path(
    post,
    path = "/specialties",
    tag = "specialties",
    request_body = SpecialtyDto,
    responses((status = 201, description = "Specialty created", body = SpecialtyDto))
)]
pub async fn create_specialty(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SpecialtyDto>,
) -> Result<(StatusCode, Json<SpecialtyDto>), AppError> {
    tracing::info!("POST /specialties - payload: {:?}", payload);
    let created = state.specialties.create(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /specialties/:id
#[utoipa::path(
    get,
    path = "/specialties/{id}",
    tag = "specialties",
    params(("id" = i32, Path, description = "Specialty id")),
    responses(
        (status = 200, description = "Specialty found", body = SpecialtyDto),
        (status = 404, description = "No specialty with this id")
    )
)]
pub async fn get_specialty(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<SpecialtyDto>, AppError> {
    tracing::info!("GET /specialties/{}", id);
    Ok(Json(state.specialties.find_by_id(id).await?))
}

/// PUT /specialties/:id
#[utoipa::path(
    put,
    path = "/specialties/{id}",
    tag = "specialties",
    params(("id" = i32, Path, description = "Specialty id")),
    request_body = SpecialtyDto,
    responses(
        (status = 200, description = "Specialty updated", body = SpecialtyDto),
        (status = 404, description = "No specialty with this id")
    )
)]
pub async fn update_specialty(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<SpecialtyDto>,
) -> Result<Json<SpecialtyDto>, AppError> {
    tracing::info!("PUT /specialties/{} - payload: {:?}", id, payload);

    let mut specialty = state.specialties.find_by_id(id).await?;
    specialty.name = payload.name;

    Ok(Json(state.specialties.update(specialty).await?))
}

/// DELETE /specialties/:id
///
/// Vets that had this specialty keep existing without it.
#[utoipa::path(
    delete,
    path = "/specialties/{id}",
    tag = "specialties",
    params(("id" = i32, Path, description = "Specialty id")),
    responses(
        (status = 200, description = "Specialty deleted", body = String),
        (status = 404, description = "No specialty with this id")
    )
)]
pub async fn delete_specialty(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<String, AppError> {
    tracing::info!("DELETE /specialties/{}", id);
    state.specialties.delete(id).await?;
    Ok(deleted_message(id))
}
