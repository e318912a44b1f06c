use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::{Owner, Specialty, Vet};

/// Data access for owners. Every finder returns records in id order.
#[async_trait]
pub trait OwnerRepository: Send + Sync {
    /// Inserts an id-less owner under a fresh id, otherwise upserts by id.
    async fn save(&self, owner: Owner) -> Result<Owner, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Owner>, AppError>;
    async fn find_all(&self) -> Result<Vec<Owner>, AppError>;
    async fn find_by_first_name(&self, first_name: &str) -> Result<Vec<Owner>, AppError>;
    async fn find_by_last_name(&self, last_name: &str) -> Result<Vec<Owner>, AppError>;
    async fn find_by_city(&self, city: &str) -> Result<Vec<Owner>, AppError>;
    /// Removes the row carrying `owner.id`. An id-less owner is a no-op.
    async fn delete(&self, owner: &Owner) -> Result<(), AppError>;
}

/// Data access for vets.
///
/// Reads attach each vet's specialties. `save` leaves the vet/specialty pairs
/// untouched; they change only through `add_specialty` and `remove_specialty`.
#[async_trait]
pub trait VetRepository: Send + Sync {
    async fn save(&self, vet: Vet) -> Result<Vet, AppError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<Vet>, AppError>;
    async fn find_all(&self) -> Result<Vec<Vet>, AppError>;
    async fn find_by_first_name(&self, first_name: &str) -> Result<Vec<Vet>, AppError>;
    async fn find_by_last_name(&self, last_name: &str) -> Result<Vec<Vet>, AppError>;
    async fn delete(&self, vet: &Vet) -> Result<(), AppError>;
    /// Links a vet to a specialty. Linking twice is harmless.
    async fn add_specialty(&self, vet_id: i32, specialty_id: i32) -> Result<(), AppError>;
    /// Unlinks a vet from a specialty, reporting whether a link existed.
    async fn remove_specialty(&self, vet_id: i32, specialty_id: i32) -> Result<bool, AppError>;
}

/// Data access for specialties. Deleting one unlinks it from every vet.
#[async_trait]
pub trait SpecialtyRepository: Send + Sync {
    async fn save(&self, specialty: Specialty) -> Result<Specialty, AppError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<Specialty>, AppError>;
    async fn find_all(&self) -> Result<Vec<Specialty>, AppError>;
    async fn find_by_name(&self, name: &str) -> Result<Vec<Specialty>, AppError>;
    async fn delete(&self, specialty: &Specialty) -> Result<(), AppError>;
}
