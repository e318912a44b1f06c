use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;

use crate::errors::{AppError, ResultExt};
use crate::models::{Owner, Specialty, Vet};
use crate::repository::{OwnerRepository, SpecialtyRepository, VetRepository};

const OWNER_COLUMNS: &str = "id, first_name, last_name, address, city, telephone";
const VET_COLUMNS: &str = "id, first_name, last_name";
const SPECIALTY_COLUMNS: &str = "id, name";

/// Postgres-backed store implementing every repository trait over one pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Moves the table's id sequence past an explicitly written id so later
    /// inserts do not collide with it. The sequence only ever moves forward,
    /// so ids of deleted rows are never handed out again.
    async fn sync_sequence(&self, table: &'static str, id: i64) -> Result<(), AppError> {
        sqlx::query(&format!(
            r#"
            SELECT setval(seq, $1)
            FROM (SELECT pg_get_serial_sequence('{table}', 'id')::regclass AS seq) s
            WHERE $1 > COALESCE(pg_sequence_last_value(seq), 0)
            "#
        ))
        .bind(id)
        .execute(&self.pool)
        .await
        .with_context(|| format!("syncing {} id sequence", table))?;
        Ok(())
    }

    async fn owners_where(&self, column: &'static str, value: &str) -> Result<Vec<Owner>, AppError> {
        sqlx::query_as::<_, Owner>(&format!(
            "SELECT {OWNER_COLUMNS} FROM owners WHERE {column} = $1 ORDER BY id"
        ))
        .bind(value)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("finding owners by {}", column))
    }

    async fn vets_where(&self, column: &'static str, value: &str) -> Result<Vec<Vet>, AppError> {
        let vets = sqlx::query_as::<_, Vet>(&format!(
            "SELECT {VET_COLUMNS} FROM vets WHERE {column} = $1 ORDER BY id"
        ))
        .bind(value)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("finding vets by {}", column))?;

        self.attach_specialties(vets).await
    }

    /// Fills `specialties` on each vet with one lookup over the association table.
    async fn attach_specialties(&self, mut vets: Vec<Vet>) -> Result<Vec<Vet>, AppError> {
        let ids: Vec<i32> = vets.iter().filter_map(|v| v.id).collect();
        if ids.is_empty() {
            return Ok(vets);
        }

        let rows = sqlx::query_as::<_, (i32, i32, String)>(
            r#"
            SELECT vs.vet_id, s.id, s.name
            FROM vet_specialties vs
            JOIN specialties s ON s.id = vs.specialty_id
            WHERE vs.vet_id = ANY($1)
            ORDER BY s.id
            "#,
        )
        .bind(&ids[..])
        .fetch_all(&self.pool)
        .await
        .context("loading vet specialties")?;

        let mut by_vet: HashMap<i32, Vec<Specialty>> = HashMap::new();
        for (vet_id, id, name) in rows {
            by_vet.entry(vet_id).or_default().push(Specialty { id: Some(id), name });
        }

        for vet in &mut vets {
            if let Some(id) = vet.id {
                vet.specialties = by_vet.remove(&id).unwrap_or_default();
            }
        }

        Ok(vets)
    }
}

#[async_trait]
impl OwnerRepository for PgStore {
    async fn save(&self, owner: Owner) -> Result<Owner, AppError> {
        match owner.id {
            None => sqlx::query_as::<_, Owner>(&format!(
                r#"
                INSERT INTO owners (first_name, last_name, address, city, telephone)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING {OWNER_COLUMNS}
                "#
            ))
            .bind(&owner.first_name)
            .bind(&owner.last_name)
            .bind(&owner.address)
            .bind(&owner.city)
            .bind(&owner.telephone)
            .fetch_one(&self.pool)
            .await
            .context("inserting owner"),
            Some(id) => {
                let saved = sqlx::query_as::<_, Owner>(&format!(
                    r#"
                    INSERT INTO owners (id, first_name, last_name, address, city, telephone)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    ON CONFLICT (id) DO UPDATE
                    SET first_name = EXCLUDED.first_name,
                        last_name = EXCLUDED.last_name,
                        address = EXCLUDED.address,
                        city = EXCLUDED.city,
                        telephone = EXCLUDED.telephone
                    RETURNING {OWNER_COLUMNS}
                    "#
                ))
                .bind(id)
                .bind(&owner.first_name)
                .bind(&owner.last_name)
                .bind(&owner.address)
                .bind(&owner.city)
                .bind(&owner.telephone)
                .fetch_one(&self.pool)
                .await
                .with_context(|| format!("saving owner {}", id))?;

                self.sync_sequence("owners", id).await?;
                Ok(saved)
            }
        }
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Owner>, AppError> {
        sqlx::query_as::<_, Owner>(&format!("SELECT {OWNER_COLUMNS} FROM owners WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("finding owner {}", id))
    }

    async fn find_all(&self) -> Result<Vec<Owner>, AppError> {
        sqlx::query_as::<_, Owner>(&format!("SELECT {OWNER_COLUMNS} FROM owners ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .context("listing owners")
    }

    async fn find_by_first_name(&self, first_name: &str) -> Result<Vec<Owner>, AppError> {
        self.owners_where("first_name", first_name).await
    }

    async fn find_by_last_name(&self, last_name: &str) -> Result<Vec<Owner>, AppError> {
        self.owners_where("last_name", last_name).await
    }

    async fn find_by_city(&self, city: &str) -> Result<Vec<Owner>, AppError> {
        self.owners_where("city", city).await
    }

    async fn delete(&self, owner: &Owner) -> Result<(), AppError> {
        let Some(id) = owner.id else {
            return Ok(());
        };

        sqlx::query("DELETE FROM owners WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("deleting owner {}", id))?;
        Ok(())
    }
}

#[async_trait]
impl VetRepository for PgStore {
    async fn save(&self, vet: Vet) -> Result<Vet, AppError> {
        let saved = match vet.id {
            None => sqlx::query_as::<_, Vet>(&format!(
                "INSERT INTO vets (first_name, last_name) VALUES ($1, $2) RETURNING {VET_COLUMNS}"
            ))
            .bind(&vet.first_name)
            .bind(&vet.last_name)
            .fetch_one(&self.pool)
            .await
            .context("inserting vet")?,
            Some(id) => {
                let saved = sqlx::query_as::<_, Vet>(&format!(
                    r#"
                    INSERT INTO vets (id, first_name, last_name)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (id) DO UPDATE
                    SET first_name = EXCLUDED.first_name,
                        last_name = EXCLUDED.last_name
                    RETURNING {VET_COLUMNS}
                    "#
                ))
                .bind(id)
                .bind(&vet.first_name)
                .bind(&vet.last_name)
                .fetch_one(&self.pool)
                .await
                .with_context(|| format!("saving vet {}", id))?;

                self.sync_sequence("vets", id.into()).await?;
                saved
            }
        };

        let mut vets = self.attach_specialties(vec![saved]).await?;
        vets.pop()
            .ok_or_else(|| AppError::InternalError("saved vet vanished".to_string()))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Vet>, AppError> {
        let vet = sqlx::query_as::<_, Vet>(&format!("SELECT {VET_COLUMNS} FROM vets WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("finding vet {}", id))?;

        match vet {
            Some(vet) => Ok(self.attach_specialties(vec![vet]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_all(&self) -> Result<Vec<Vet>, AppError> {
        let vets = sqlx::query_as::<_, Vet>(&format!("SELECT {VET_COLUMNS} FROM vets ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .context("listing vets")?;

        self.attach_specialties(vets).await
    }

    async fn find_by_first_name(&self, first_name: &str) -> Result<Vec<Vet>, AppError> {
        self.vets_where("first_name", first_name).await
    }

    async fn find_by_last_name(&self, last_name: &str) -> Result<Vec<Vet>, AppError> {
        self.vets_where("last_name", last_name).await
    }

    async fn delete(&self, vet: &Vet) -> Result<(), AppError> {
        let Some(id) = vet.id else {
            return Ok(());
        };

        // vet_specialties rows go with it through ON DELETE CASCADE
        sqlx::query("DELETE FROM vets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("deleting vet {}", id))?;
        Ok(())
    }

    async fn add_specialty(&self, vet_id: i32, specialty_id: i32) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO vet_specialties (vet_id, specialty_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(vet_id)
        .bind(specialty_id)
        .execute(&self.pool)
        .await
        .with_context(|| format!("linking vet {} to specialty {}", vet_id, specialty_id))?;
        Ok(())
    }

    async fn remove_specialty(&self, vet_id: i32, specialty_id: i32) -> Result<bool, AppError> {
        let result =
            sqlx::query("DELETE FROM vet_specialties WHERE vet_id = $1 AND specialty_id = $2")
                .bind(vet_id)
                .bind(specialty_id)
                .execute(&self.pool)
                .await
                .with_context(|| {
                    format!("unlinking vet {} from specialty {}", vet_id, specialty_id)
                })?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl SpecialtyRepository for PgStore {
    async fn save(&self, specialty: Specialty) -> Result<Specialty, AppError> {
        match specialty.id {
            None => sqlx::query_as::<_, Specialty>(&format!(
                "INSERT INTO specialties (name) VALUES ($1) RETURNING {SPECIALTY_COLUMNS}"
            ))
            .bind(&specialty.name)
            .fetch_one(&self.pool)
            .await
            .context("inserting specialty"),
            Some(id) => {
                let saved = sqlx::query_as::<_, Specialty>(&format!(
                    r#"
                    INSERT INTO specialties (id, name)
                    VALUES ($1, $2)
                    ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name
                    RETURNING {SPECIALTY_COLUMNS}
                    "#
                ))
                .bind(id)
                .bind(&specialty.name)
                .fetch_one(&self.pool)
                .await
                .with_context(|| format!("saving specialty {}", id))?;

                self.sync_sequence("specialties", id.into()).await?;
                Ok(saved)
            }
        }
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Specialty>, AppError> {
        sqlx::query_as::<_, Specialty>(&format!(
            "SELECT {SPECIALTY_COLUMNS} FROM specialties WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("finding specialty {}", id))
    }

    async fn find_all(&self) -> Result<Vec<Specialty>, AppError> {
        sqlx::query_as::<_, Specialty>(&format!(
            "SELECT {SPECIALTY_COLUMNS} FROM specialties ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .context("listing specialties")
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<Specialty>, AppError> {
        sqlx::query_as::<_, Specialty>(&format!(
            "SELECT {SPECIALTY_COLUMNS} FROM specialties WHERE name = $1 ORDER BY id"
        ))
        .bind(name)
        .fetch_all(&self.pool)
        .await
        .context("finding specialties by name")
    }

    async fn delete(&self, specialty: &Specialty) -> Result<(), AppError> {
        let Some(id) = specialty.id else {
            return Ok(());
        };

        sqlx::query("DELETE FROM specialties WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("deleting specialty {}", id))?;
        Ok(())
    }
}
