//! HTTP API server with observability for the marketplace checkout.
//!
//! Exposes the checkout wizard over REST (start, address, back, pay,
//! status, audit trail) with structured logging (tracing) and Prometheus
//! metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use checkout::{
    CheckoutCoordinator, InMemoryCartService, InMemoryGatewayProvider, InMemoryOrderBackend,
    InMemoryPaymentBackend,
};
use event_store::EventStore;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::Config;
use routes::checkout::AppState;

/// The in-memory collaborator set behind the default wiring, returned so
/// callers (the binary, the tests) can seed carts and flip failure modes.
#[derive(Clone)]
pub struct Collaborators {
    pub carts: InMemoryCartService,
    pub payments: InMemoryPaymentBackend,
    pub gateway: InMemoryGatewayProvider,
    pub orders: InMemoryOrderBackend,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: EventStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/checkout", post(routes::checkout::start::<S>))
        .route("/checkout/{id}", get(routes::checkout::get::<S>))
        .route(
            "/checkout/{id}/address",
            post(routes::checkout::submit_address::<S>),
        )
        .route("/checkout/{id}/back", post(routes::checkout::back::<S>))
        .route("/checkout/{id}/pay", post(routes::checkout::pay::<S>))
        .route("/checkout/{id}/events", get(routes::checkout::events::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the default application state with in-memory collaborators.
pub fn create_default_state<S: EventStore + Clone + 'static>(
    event_store: S,
    config: &Config,
) -> (Arc<AppState<S>>, Collaborators) {
    let collaborators = Collaborators {
        carts: InMemoryCartService::new(),
        payments: InMemoryPaymentBackend::new(),
        gateway: InMemoryGatewayProvider::new(),
        orders: InMemoryOrderBackend::new(),
    };

    let coordinator = CheckoutCoordinator::new(
        event_store.clone(),
        collaborators.carts.clone(),
        collaborators.payments.clone(),
        collaborators.gateway.clone(),
        collaborators.orders.clone(),
        config.shipping_policy(),
        config.gateway_settings(),
    );

    let state = Arc::new(AppState {
        coordinator,
        event_store,
    });

    (state, collaborators)
}
