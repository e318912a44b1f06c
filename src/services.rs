use std::sync::Arc;

use crate::errors::AppError;
use crate::mappers::map_list;
use crate::models::{Owner, OwnerDto, Specialty, SpecialtyDto, Vet, VetDto};
use crate::repository::{OwnerRepository, SpecialtyRepository, VetRepository};

#[derive(Clone)]
pub struct OwnerService {
    repo: Arc<dyn OwnerRepository>,
}

impl OwnerService {
    pub fn new(repo: Arc<dyn OwnerRepository>) -> Self {
        Self { repo }
    }

    /// Persists a new owner. Any id on the input is discarded.
    pub async fn create(&self, dto: OwnerDto) -> Result<OwnerDto, AppError> {
        let mut owner = Owner::from(dto);
        owner.id = None;
        let created = self.repo.save(owner).await?;
        tracing::info!("Owner created: {:?}", created);
        Ok(created.into())
    }

    /// Saves under the dto's id without checking it exists first.
    pub async fn update(&self, dto: OwnerDto) -> Result<OwnerDto, AppError> {
        let updated = self.repo.save(dto.into()).await?;
        tracing::info!("Owner updated: {:?}", updated);
        Ok(updated.into())
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let owner = self.find_by_id(id).await?;
        self.repo.delete(&Owner::from(owner)).await?;
        tracing::info!("Owner {} deleted", id);
        Ok(())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<OwnerDto, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .map(OwnerDto::from)
            .ok_or_else(|| AppError::not_found("Owner", id))
    }

    pub async fn find_by_first_name(&self, first_name: &str) -> Result<Vec<OwnerDto>, AppError> {
        let owners = self.repo.find_by_first_name(first_name).await?;
        owners.iter().for_each(|owner| tracing::info!("{:?}", owner));
        Ok(map_list(owners))
    }

    pub async fn find_by_last_name(&self, last_name: &str) -> Result<Vec<OwnerDto>, AppError> {
        let owners = self.repo.find_by_last_name(last_name).await?;
        owners.iter().for_each(|owner| tracing::info!("{:?}", owner));
        Ok(map_list(owners))
    }

    pub async fn find_by_city(&self, city: &str) -> Result<Vec<OwnerDto>, AppError> {
        let owners = self.repo.find_by_city(city).await?;
        owners.iter().for_each(|owner| tracing::info!("{:?}", owner));
        Ok(map_list(owners))
    }

    pub async fn find_all(&self) -> Result<Vec<OwnerDto>, AppError> {
        Ok(map_list(self.repo.find_all().await?))
    }
}

/// Vet operations. Holds the specialty repository too, so that links are only
/// ever made to specialties that exist.
#[derive(Clone)]
pub struct VetService {
    repo: Arc<dyn VetRepository>,
    specialties: Arc<dyn SpecialtyRepository>,
}

impl VetService {
    pub fn new(repo: Arc<dyn VetRepository>, specialties: Arc<dyn SpecialtyRepository>) -> Self {
        Self { repo, specialties }
    }

    pub async fn create(&self, dto: VetDto) -> Result<VetDto, AppError> {
        let mut vet = Vet::from(dto);
        vet.id = None;
        let created = self.repo.save(vet).await?;
        tracing::info!("Vet created: {:?}", created);
        Ok(created.into())
    }

    pub async fn update(&self, dto: VetDto) -> Result<VetDto, AppError> {
        let updated = self.repo.save(dto.into()).await?;
        tracing::info!("Vet updated: {:?}", updated);
        Ok(updated.into())
    }

    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        let vet = self.find_by_id(id).await?;
        self.repo.delete(&Vet::from(vet)).await?;
        tracing::info!("Vet {} deleted", id);
        Ok(())
    }

    pub async fn find_by_id(&self, id: i32) -> Result<VetDto, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .map(VetDto::from)
            .ok_or_else(|| AppError::not_found("Vet", id))
    }

    pub async fn find_by_first_name(&self, first_name: &str) -> Result<Vec<VetDto>, AppError> {
        let vets = self.repo.find_by_first_name(first_name).await?;
        vets.iter().for_each(|vet| tracing::info!("{:?}", vet));
        Ok(map_list(vets))
    }

    pub async fn find_by_last_name(&self, last_name: &str) -> Result<Vec<VetDto>, AppError> {
        let vets = self.repo.find_by_last_name(last_name).await?;
        vets.iter().for_each(|vet| tracing::info!("{:?}", vet));
        Ok(map_list(vets))
    }

    pub async fn find_all(&self) -> Result<Vec<VetDto>, AppError> {
        Ok(map_list(self.repo.find_all().await?))
    }

    /// Links an existing vet to an existing specialty and returns the vet.
    pub async fn assign_specialty(&self, vet_id: i32, specialty_id: i32) -> Result<VetDto, AppError> {
        self.ensure_linkable(vet_id, specialty_id).await?;
        self.repo.add_specialty(vet_id, specialty_id).await?;
        tracing::info!("Vet {} assigned specialty {}", vet_id, specialty_id);
        self.find_by_id(vet_id).await
    }

    /// Unlinks a specialty from a vet and returns the vet. Unlinking a pair
    /// that was never linked is not an error.
    pub async fn unassign_specialty(&self, vet_id: i32, specialty_id: i32) -> Result<VetDto, AppError> {
        self.ensure_linkable(vet_id, specialty_id).await?;
        if !self.repo.remove_specialty(vet_id, specialty_id).await? {
            tracing::debug!("Vet {} had no specialty {}", vet_id, specialty_id);
        }
        self.find_by_id(vet_id).await
    }

    async fn ensure_linkable(&self, vet_id: i32, specialty_id: i32) -> Result<(), AppError> {
        if self.repo.find_by_id(vet_id).await?.is_none() {
            return Err(AppError::not_found("Vet", vet_id));
        }
        if self.specialties.find_by_id(specialty_id).await?.is_none() {
            return Err(AppError::not_found("Specialty", specialty_id));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct SpecialtyService {
    repo: Arc<dyn SpecialtyRepository>,
}

impl SpecialtyService {
    pub fn new(repo: Arc<dyn SpecialtyRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, dto: SpecialtyDto) -> Result<SpecialtyDto, AppError> {
        let mut specialty = Specialty::from(dto);
        specialty.id = None;
        let created = self.repo.save(specialty).await?;
        tracing::info!("Specialty created: {:?}", created);
        Ok(created.into())
    }

    pub async fn update(&self, dto: SpecialtyDto) -> Result<SpecialtyDto, AppError> {
        let updated = self.repo.save(dto.into()).await?;
        tracing::info!("Specialty updated: {:?}", updated);
        Ok(updated.into())
    }

    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        let specialty = self.find_by_id(id).await?;
        self.repo.delete(&Specialty::from(specialty)).await?;
        tracing::info!("Specialty {} deleted", id);
        Ok(())
    }

    pub async fn find_by_id(&self, id: i32) -> Result<SpecialtyDto, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .map(SpecialtyDto::from)
            .ok_or_else(|| AppError::not_found("Specialty", id))
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Vec<SpecialtyDto>, AppError> {
        let specialties = self.repo.find_by_name(name).await?;
        specialties
            .iter()
            .for_each(|specialty| tracing::info!("{:?}", specialty));
        Ok(map_list(specialties))
    }

    pub async fn find_all(&self) -> Result<Vec<SpecialtyDto>, AppError> {
        Ok(map_list(self.repo.find_all().await?))
    }
}
