use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// ============ Database Models ============

/// A pet owner as stored in the `owners` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Owner {
    /// `None` until the store assigns one.
    pub id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub telephone: String,
}

/// A veterinarian as stored in the `vets` table.
///
/// `specialties` is filled by lookup through `vet_specialties` when the vet is
/// read. Saving a vet never writes it back.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Vet {
    pub id: Option<i32>,
    pub first_name: String,
    pub last_name: String,
    #[sqlx(skip)]
    pub specialties: Vec<Specialty>,
}

/// A specialty as stored in the `specialties` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Specialty {
    pub id: Option<i32>,
    pub name: String,
}

// ============ Transfer Objects ============

/// Owner as exchanged with HTTP clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct OwnerDto {
    pub id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub telephone: String,
}

/// Vet as exchanged with HTTP clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct VetDto {
    pub id: Option<i32>,
    pub first_name: String,
    pub last_name: String,
    /// Populated on responses. Ignored on requests; use the
    /// `/vets/{id}/specialties/{specialtyId}` routes to change it.
    pub specialties: Vec<SpecialtyDto>,
}

/// Specialty as exchanged with HTTP clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SpecialtyDto {
    pub id: Option<i32>,
    pub name: String,
}

// ============ Query Parameters ============

/// Exact-match filters accepted by `GET /owners`. At most one may be set.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OwnerFilter {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub city: Option<String>,
}

/// Exact-match filters accepted by `GET /vets`. At most one may be set.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct VetFilter {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Exact-match filter accepted by `GET /specialties`.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SpecialtyFilter {
    pub name: Option<String>,
}
