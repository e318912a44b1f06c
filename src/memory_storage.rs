use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use crate::errors::AppError;
use crate::models::{Owner, Specialty, Vet};
use crate::repository::{OwnerRepository, SpecialtyRepository, VetRepository};

#[derive(Default)]
struct Tables {
    owners: BTreeMap<i64, Owner>,
    vets: BTreeMap<i32, Vet>,
    specialties: BTreeMap<i32, Specialty>,
    // (vet_id, specialty_id)
    vet_specialties: BTreeSet<(i32, i32)>,
    next_owner_id: i64,
    next_vet_id: i32,
    next_specialty_id: i32,
}

impl Tables {
    fn with_specialties(&self, vet: &Vet) -> Vet {
        let mut vet = vet.clone();
        vet.specialties = match vet.id {
            Some(vet_id) => self
                .vet_specialties
                .range((vet_id, i32::MIN)..=(vet_id, i32::MAX))
                .filter_map(|(_, specialty_id)| self.specialties.get(specialty_id).cloned())
                .collect(),
            None => Vec::new(),
        };
        vet
    }

    fn vets_matching<P>(&self, predicate: P) -> Vec<Vet>
    where
        P: Fn(&Vet) -> bool,
    {
        self.vets
            .values()
            .filter(|vet| predicate(vet))
            .map(|vet| self.with_specialties(vet))
            .collect()
    }
}

/// In-process store with the same contract as [`crate::db_storage::PgStore`].
///
/// Rows live in ordered maps, so every listing comes back in id order. Used
/// when no database is configured and throughout the test suite.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-filled with the clinic's demo owners, vets and specialties.
    pub fn with_demo_data() -> Self {
        let mut tables = Tables::default();

        for (id, name) in [(1, "radiology"), (2, "surgery"), (3, "dentistry")] {
            tables.specialties.insert(
                id,
                Specialty {
                    id: Some(id),
                    name: name.to_string(),
                },
            );
        }

        let vets = [
            (1, "James", "Carter"),
            (2, "Helen", "Leary"),
            (3, "Linda", "Douglas"),
            (4, "Rafael", "Ortega"),
            (5, "Henry", "Stevens"),
            (6, "Sharon", "Jenkins"),
        ];
        for (id, first_name, last_name) in vets {
            tables.vets.insert(
                id,
                Vet {
                    id: Some(id),
                    first_name: first_name.to_string(),
                    last_name: last_name.to_string(),
                    specialties: Vec::new(),
                },
            );
        }
        tables
            .vet_specialties
            .extend([(2, 1), (3, 2), (3, 3), (4, 2), (5, 1)]);

        let owners = [
            (1, "George", "Franklin", "110 W. Liberty St.", "Madison", "6085551023"),
            (2, "Betty", "Davis", "638 Cardinal Ave.", "Sun Prairie", "6085551749"),
            (3, "Eduardo", "Rodriquez", "2693 Commerce St.", "McFarland", "6085558763"),
            (4, "Harold", "Davis", "563 Friendly St.", "Windsor", "6085553198"),
            (5, "Peter", "McTavish", "2387 S. Fair Way", "Madison", "6085552765"),
            (6, "Jean", "Coleman", "105 N. Lake St.", "Monona", "6085552654"),
            (7, "Jeff", "Black", "1450 Oak Blvd.", "Monona", "6085555387"),
            (8, "Maria", "Escobito", "345 Maple St.", "Madison", "6085557683"),
            (9, "David", "Schroeder", "2749 Blackhawk Trail", "Madison", "6085559435"),
            (10, "Carlos", "Estaban", "2335 Independence La.", "Waunakee", "6085555487"),
        ];
        for (id, first_name, last_name, address, city, telephone) in owners {
            tables.owners.insert(
                id,
                Owner {
                    id: Some(id),
                    first_name: first_name.to_string(),
                    last_name: last_name.to_string(),
                    address: address.to_string(),
                    city: city.to_string(),
                    telephone: telephone.to_string(),
                },
            );
        }

        tables.next_owner_id = 11;
        tables.next_vet_id = 7;
        tables.next_specialty_id = 4;

        Self {
            tables: Mutex::new(tables),
        }
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, AppError> {
        self.tables
            .lock()
            .map_err(|_| AppError::InternalError("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl OwnerRepository for MemoryStore {
    async fn save(&self, mut owner: Owner) -> Result<Owner, AppError> {
        let mut tables = self.tables()?;
        let id = match owner.id {
            Some(id) => id,
            None => tables.next_owner_id.max(1),
        };
        tables.next_owner_id = tables.next_owner_id.max(id + 1);

        owner.id = Some(id);
        tables.owners.insert(id, owner.clone());
        Ok(owner)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Owner>, AppError> {
        Ok(self.tables()?.owners.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Owner>, AppError> {
        Ok(self.tables()?.owners.values().cloned().collect())
    }

    async fn find_by_first_name(&self, first_name: &str) -> Result<Vec<Owner>, AppError> {
        Ok(self
            .tables()?
            .owners
            .values()
            .filter(|o| o.first_name == first_name)
            .cloned()
            .collect())
    }

    async fn find_by_last_name(&self, last_name: &str) -> Result<Vec<Owner>, AppError> {
        Ok(self
            .tables()?
            .owners
            .values()
            .filter(|o| o.last_name == last_name)
            .cloned()
            .collect())
    }

    async fn find_by_city(&self, city: &str) -> Result<Vec<Owner>, AppError> {
        Ok(self
            .tables()?
            .owners
            .values()
            .filter(|o| o.city == city)
            .cloned()
            .collect())
    }

    async fn delete(&self, owner: &Owner) -> Result<(), AppError> {
        if let Some(id) = owner.id {
            self.tables()?.owners.remove(&id);
        }
        Ok(())
    }
}

#[async_trait]
impl VetRepository for MemoryStore {
    async fn save(&self, mut vet: Vet) -> Result<Vet, AppError> {
        let mut tables = self.tables()?;
        let id = match vet.id {
            Some(id) => id,
            None => tables.next_vet_id.max(1),
        };
        tables.next_vet_id = tables.next_vet_id.max(id + 1);

        vet.id = Some(id);
        vet.specialties.clear();
        tables.vets.insert(id, vet.clone());
        Ok(tables.with_specialties(&vet))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Vet>, AppError> {
        let tables = self.tables()?;
        Ok(tables.vets.get(&id).map(|vet| tables.with_specialties(vet)))
    }

    async fn find_all(&self) -> Result<Vec<Vet>, AppError> {
        Ok(self.tables()?.vets_matching(|_| true))
    }

    async fn find_by_first_name(&self, first_name: &str) -> Result<Vec<Vet>, AppError> {
        Ok(self.tables()?.vets_matching(|v| v.first_name == first_name))
    }

    async fn find_by_last_name(&self, last_name: &str) -> Result<Vec<Vet>, AppError> {
        Ok(self.tables()?.vets_matching(|v| v.last_name == last_name))
    }

    async fn delete(&self, vet: &Vet) -> Result<(), AppError> {
        if let Some(id) = vet.id {
            let mut tables = self.tables()?;
            tables.vets.remove(&id);
            tables.vet_specialties.retain(|(vet_id, _)| *vet_id != id);
        }
        Ok(())
    }

    async fn add_specialty(&self, vet_id: i32, specialty_id: i32) -> Result<(), AppError> {
        self.tables()?.vet_specialties.insert((vet_id, specialty_id));
        Ok(())
    }

    async fn remove_specialty(&self, vet_id: i32, specialty_id: i32) -> Result<bool, AppError> {
        Ok(self.tables()?.vet_specialties.remove(&(vet_id, specialty_id)))
    }
}

#[async_trait]
impl SpecialtyRepository for MemoryStore {
    async fn save(&self, mut specialty: Specialty) -> Result<Specialty, AppError> {
        let mut tables = self.tables()?;
        let id = match specialty.id {
            Some(id) => id,
            None => tables.next_specialty_id.max(1),
        };
        tables.next_specialty_id = tables.next_specialty_id.max(id + 1);

        specialty.id = Some(id);
        tables.specialties.insert(id, specialty.clone());
        Ok(specialty)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Specialty>, AppError> {
        Ok(self.tables()?.specialties.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Specialty>, AppError> {
        Ok(self.tables()?.specialties.values().cloned().collect())
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<Specialty>, AppError> {
        Ok(self
            .tables()?
            .specialties
            .values()
            .filter(|s| s.name == name)
            .cloned()
            .collect())
    }

    async fn delete(&self, specialty: &Specialty) -> Result<(), AppError> {
        if let Some(id) = specialty.id {
            let mut tables = self.tables()?;
            tables.specialties.remove(&id);
            tables
                .vet_specialties
                .retain(|(_, specialty_id)| *specialty_id != id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner(first_name: &str, city: &str) -> Owner {
        Owner {
            id: None,
            first_name: first_name.to_string(),
            last_name: "Test".to_string(),
            address: "1 Main St.".to_string(),
            city: city.to_string(),
            telephone: "5550000".to_string(),
        }
    }

    #[tokio::test]
    async fn test_ids_are_assigned_in_sequence() {
        let store = MemoryStore::new();
        let first = OwnerRepository::save(&store, owner("Ana", "Lima")).await.unwrap();
        let second = OwnerRepository::save(&store, owner("Luis", "Cusco")).await.unwrap();
        assert_eq!(first.id, Some(1));
        assert_eq!(second.id, Some(2));
    }

    #[tokio::test]
    async fn test_explicit_id_moves_sequence_forward() {
        let store = MemoryStore::new();
        let mut explicit = owner("Ana", "Lima");
        explicit.id = Some(40);
        OwnerRepository::save(&store, explicit).await.unwrap();

        let next = OwnerRepository::save(&store, owner("Luis", "Cusco")).await.unwrap();
        assert_eq!(next.id, Some(41));
    }

    #[tokio::test]
    async fn test_demo_data_matches_seed_migration() {
        let store = MemoryStore::with_demo_data();

        let george = OwnerRepository::find_by_id(&store, 1).await.unwrap().unwrap();
        assert_eq!(george.first_name, "George");
        assert_eq!(george.city, "Madison");

        let linda = VetRepository::find_by_id(&store, 3).await.unwrap().unwrap();
        let names: Vec<&str> = linda.specialties.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["surgery", "dentistry"]);

        let created = SpecialtyRepository::save(
            &store,
            Specialty {
                id: None,
                name: "oncology".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(created.id, Some(4));
    }

    #[tokio::test]
    async fn test_deleting_specialty_keeps_vets() {
        let store = MemoryStore::with_demo_data();
        let radiology = SpecialtyRepository::find_by_id(&store, 1).await.unwrap().unwrap();

        SpecialtyRepository::delete(&store, &radiology).await.unwrap();

        let helen = VetRepository::find_by_id(&store, 2).await.unwrap().unwrap();
        assert!(helen.specialties.is_empty());
    }
}
