//! HTTP API Layer
//!
//! This crate provides the REST API for party management using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for parties and party reference data
//! - **Middleware**: Authentication and audit logging
//! - **Extractors**: Tenant header, JSON/XML request bodies and responses
//! - **DTOs**: Query strings and response envelopes
//! - **Error Handling**: Consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let state = AppState::new(party_port, reference_port, config)?;
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use domain_party::{PartyError, PartyPort, PartyReferenceService, PartyService, ReferenceDataPort};

use crate::config::ApiConfig;
use crate::handlers::{health, party, reference};
use crate::middleware::{audit_middleware, auth_middleware, error_format_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub parties: PartyService,
    pub reference: Arc<PartyReferenceService>,
    pub party_port: Arc<dyn PartyPort>,
    pub reference_port: Arc<dyn ReferenceDataPort>,
    pub config: ApiConfig,
}

impl AppState {
    /// Builds the services over the given ports
    ///
    /// Fails if the configured default locale is not a valid language tag.
    pub fn new(
        party_port: Arc<dyn PartyPort>,
        reference_port: Arc<dyn ReferenceDataPort>,
        config: ApiConfig,
    ) -> Result<Self, PartyError> {
        let reference = Arc::new(
            PartyReferenceService::with_ttl(
                reference_port.clone(),
                config.reference_data.cache_ttl(),
            )
            .with_default_locale(&config.reference_data.default_locale)?,
        );

        Ok(Self {
            parties: PartyService::new(party_port.clone(), reference.clone()),
            reference,
            party_port,
            reference_port,
            config,
        })
    }
}

/// Creates the main API router
///
/// # Arguments
///
/// * `state` - Services and configuration shared by the handlers
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Party routes
    let party_routes = Router::new()
        .route("/", get(party::list_parties))
        .route("/persons", get(party::list_persons).post(party::create_person))
        .route("/persons/validate", post(party::validate_person))
        .route(
            "/persons/:id",
            get(party::get_person).put(party::update_person).delete(party::delete_person),
        )
        .route("/organizations", get(party::list_organizations).post(party::create_organization))
        .route("/organizations/validate", post(party::validate_organization))
        .route(
            "/organizations/:id",
            get(party::get_organization)
                .put(party::update_organization)
                .delete(party::delete_organization),
        )
        .route("/associations", post(party::create_association))
        .route(
            "/associations/:id",
            get(party::get_association)
                .put(party::update_association)
                .delete(party::delete_association),
        )
        .route("/mandates", post(party::create_mandate))
        .route(
            "/mandates/:id",
            get(party::get_mandate).put(party::update_mandate).delete(party::delete_mandate),
        )
        .route("/:id", get(party::get_party))
        .route("/:id/associations", get(party::list_associations_for_party))
        .route("/:id/mandates", get(party::list_mandates_for_party));

    // Party reference data routes
    let reference_routes = Router::new()
        .route("/reload", post(reference::reload))
        .route("/:kind", get(reference::get_codes))
        .route("/:kind/:code/valid", get(reference::is_valid));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/parties", party_routes)
        .nest("/party-reference", reference_routes)
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(axum_middleware::from_fn(error_format_middleware))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
