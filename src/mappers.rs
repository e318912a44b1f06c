//! Entity <-> transfer object conversions.
//!
//! Every conversion is a plain field copy. The only asymmetry is on vets:
//! a `VetDto` coming from a client never carries its specialties into the
//! entity, while a `Vet` read from the store always exposes them.

use crate::models::{Owner, OwnerDto, Specialty, SpecialtyDto, Vet, VetDto};

/// Maps a list element-wise, keeping order.
pub fn map_list<T, U>(items: Vec<T>) -> Vec<U>
where
    U: From<T>,
{
    items.into_iter().map(U::from).collect()
}

impl From<Owner> for OwnerDto {
    fn from(owner: Owner) -> Self {
        Self {
            id: owner.id,
            first_name: owner.first_name,
            last_name: owner.last_name,
            address: owner.address,
            city: owner.city,
            telephone: owner.telephone,
        }
    }
}

impl From<OwnerDto> for Owner {
    fn from(dto: OwnerDto) -> Self {
        Self {
            id: dto.id,
            first_name: dto.first_name,
            last_name: dto.last_name,
            address: dto.address,
            city: dto.city,
            telephone: dto.telephone,
        }
    }
}

impl From<Specialty> for SpecialtyDto {
    fn from(specialty: Specialty) -> Self {
        Self {
            id: specialty.id,
            name: specialty.name,
        }
    }
}

impl From<SpecialtyDto> for Specialty {
    fn from(dto: SpecialtyDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
        }
    }
}

impl From<Vet> for VetDto {
    fn from(vet: Vet) -> Self {
        Self {
            id: vet.id,
            first_name: vet.first_name,
            last_name: vet.last_name,
            specialties: map_list(vet.specialties),
        }
    }
}

impl From<VetDto> for Vet {
    fn from(dto: VetDto) -> Self {
        Self {
            id: dto.id,
            first_name: dto.first_name,
            last_name: dto.last_name,
            specialties: Vec::new(),
        }
    }
}
