//! Veterinary Clinic Records API Library
//!
//! CRUD over owners, vets and the specialty lookup, exposed as JSON over
//! HTTP and stored in Postgres (or in memory when no database is configured).
//!
//! # Modules
//!
//! - `api`: HTTP-facing components.
//! - `core`: Domain models, mappers, services and errors.
//! - `data`: Repository traits and their Postgres / in-memory stores.
//! - `config`: Configuration management.
//! - `db`: Database connection and migrations.
//! - `db_storage`: Postgres repository implementations.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `mappers`: Entity <-> DTO conversions.
//! - `memory_storage`: In-memory repository implementations.
//! - `models`: Entities, DTOs and query filters.
//! - `repository`: Repository traits.
//! - `routes`: Router and OpenAPI document.
//! - `services`: Per-entity business services.

pub mod api;
pub mod core;
pub mod data;

pub mod config;
pub mod db;
pub mod db_storage;
pub mod errors;
pub mod handlers;
pub mod mappers;
pub mod memory_storage;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;

use std::sync::Arc;

use crate::handlers::AppState;
use crate::repository::{OwnerRepository, SpecialtyRepository, VetRepository};
use crate::services::{OwnerService, SpecialtyService, VetService};

/// Wires the three services over a store that implements every repository.
pub fn app_state<S>(store: Arc<S>) -> AppState
where
    S: OwnerRepository + VetRepository + SpecialtyRepository + 'static,
{
    let specialties: Arc<dyn SpecialtyRepository> = store.clone();
    AppState {
        owners: OwnerService::new(store.clone()),
        vets: VetService::new(store, specialties.clone()),
        specialties: SpecialtyService::new(specialties),
    }
}
