use axum::{
    routing::{get, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::{self, AppState};
use crate::models::{OwnerDto, SpecialtyDto, VetDto};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::list_owners,
        handlers::create_owner,
        handlers::get_owner,
        handlers::update_owner,
        handlers::delete_owner,
        handlers::list_vets,
        handlers::create_vet,
        handlers::get_vet,
        handlers::update_vet,
        handlers::delete_vet,
        handlers::assign_vet_specialty,
        handlers::unassign_vet_specialty,
        handlers::list_specialties,
        handlers::create_specialty,
        handlers::get_specialty,
        handlers::update_specialty,
        handlers::delete_specialty,
    ),
    components(schemas(OwnerDto, VetDto, SpecialtyDto)),
    tags(
        (name = "owners", description = "Pet owners"),
        (name = "vets", description = "Veterinarians and their specialties"),
        (name = "specialties", description = "Specialty lookup"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

/// Builds the full HTTP surface over the given state.
///
/// `max_body_bytes` caps request payloads. Tracing and CORS wrap everything,
/// including the docs routes.
pub fn build_router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    let api_routes = Router::new()
        .route(
            "/owners",
            get(handlers::list_owners).post(handlers::create_owner),
        )
        .route(
            "/owners/:id",
            get(handlers::get_owner)
                .put(handlers::update_owner)
                .delete(handlers::delete_owner),
        )
        .route("/vets", get(handlers::list_vets).post(handlers::create_vet))
        .route(
            "/vets/:id",
            get(handlers::get_vet)
                .put(handlers::update_vet)
                .delete(handlers::delete_vet),
        )
        .route(
            "/vets/:id/specialties/:specialty_id",
            put(handlers::assign_vet_specialty).delete(handlers::unassign_vet_specialty),
        )
        .route(
            "/specialties",
            get(handlers::list_specialties).post(handlers::create_specialty),
        )
        .route(
            "/specialties/:id",
            get(handlers::get_specialty)
                .put(handlers::update_specialty)
                .delete(handlers::delete_specialty),
        )
        .layer(ServiceBuilder::new().layer(RequestBodyLimitLayer::new(max_body_bytes)));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(api_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_resource() {
        let doc = ApiDoc::openapi();
        for path in [
            "/owners",
            "/owners/{id}",
            "/vets",
            "/vets/{id}",
            "/vets/{id}/specialties/{specialty_id}",
            "/specialties",
            "/specialties/{id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
