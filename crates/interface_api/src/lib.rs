//! HTTP API Layer
//!
//! REST surface over the provider, service, and country catalog domains
//! using Axum. Handlers are thin: each one builds a fresh store session via
//! the state's factories, hands it to a domain writer, and maps the result
//! to a response.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState, config::ApiConfig};
//!
//! let state = AppState::postgres(pool, &config)?;
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use core_kernel::{HealthCheckable, PortError};
use domain_catalog::{CountryFeed, CountryStore, FeedConfig, RestCountriesClient};
use domain_providers::ProviderStore;
use infra_db::{PgCountryStore, PgProviderStore};

use crate::config::ApiConfig;
use crate::handlers::{countries, health, providers, services};

/// Builds one provider store session per request
pub type ProviderStoreFactory = Arc<dyn Fn() -> Arc<dyn ProviderStore> + Send + Sync>;
/// Builds one country store session per request
pub type CountryStoreFactory = Arc<dyn Fn() -> Arc<dyn CountryStore> + Send + Sync>;

/// Application state shared across handlers
///
/// Stores are held as factories rather than instances: a store session is
/// one unit of work, so each request gets its own.
#[derive(Clone)]
pub struct AppState {
    pub provider_stores: ProviderStoreFactory,
    pub country_stores: CountryStoreFactory,
    pub feed: Arc<dyn CountryFeed>,
    pub health: Arc<dyn HealthCheckable>,
}

impl AppState {
    /// Production wiring: Postgres sessions over the pool, the REST
    /// countries client as the feed.
    pub fn postgres(pool: PgPool, config: &ApiConfig) -> Result<Self, PortError> {
        let feed = RestCountriesClient::new(FeedConfig {
            url: config.countries_feed_url.clone(),
            ..FeedConfig::default()
        })?;
        let provider_pool = pool.clone();
        let country_pool = pool.clone();
        Ok(Self {
            provider_stores: Arc::new(move || {
                Arc::new(PgProviderStore::new(provider_pool.clone())) as Arc<dyn ProviderStore>
            }),
            country_stores: Arc::new(move || {
                Arc::new(PgCountryStore::new(country_pool.clone())) as Arc<dyn CountryStore>
            }),
            feed: Arc::new(feed),
            health: Arc::new(PgProviderStore::new(pool)),
        })
    }

    /// Wiring over arbitrary port implementations, used by the tests
    pub fn with_ports(
        provider_stores: ProviderStoreFactory,
        country_stores: CountryStoreFactory,
        feed: Arc<dyn CountryFeed>,
        health: Arc<dyn HealthCheckable>,
    ) -> Self {
        Self {
            provider_stores,
            country_stores,
            feed,
            health,
        }
    }
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    let provider_routes = Router::new()
        .route("/", get(providers::list))
        .route("/", post(providers::create))
        .route("/", put(providers::update))
        .route("/complete", get(providers::list_complete))
        .route("/:id", delete(providers::remove));

    let service_routes = Router::new()
        .route("/", post(services::create))
        .route("/", put(services::update))
        .route("/:id", delete(services::remove))
        .route("/by-provider", get(services::by_provider))
        .route("/by-country/:iso", get(services::by_country));

    let country_routes = Router::new()
        .route("/", get(countries::list))
        .route("/sync", post(countries::sync));

    let api_routes = Router::new()
        .nest("/providers", provider_routes)
        .nest("/services", service_routes)
        .nest("/countries", country_routes);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
