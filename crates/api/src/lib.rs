//! HTTP API for the bakery.
//!
//! Exposes order submission, status reporting, the todo list persistence
//! client and the transactional gateway vocabulary, with structured logging
//! (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use channels::InMemoryChannelSet;
use gateway::{
    GatewayConfig, InMemoryBackend, SessionRegistry, StatementPredicate, TransactionalGateway,
};
use metrics_exporter_prometheus::PrometheusHandle;
use reporting::{FallbackOutbox, OrderStatusStore, ReportingService, SimulatedBakery, WorkerPool};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use state::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/order", post(routes::orders::submit))
        .route("/reporting/order", get(routes::reporting::status))
        .route("/reporting/order/detail", get(routes::reporting::detail))
        .route(
            "/channels/factory.unknown.inbound",
            get(routes::outbox::take),
        )
        .route(
            "/todolist",
            get(routes::todolist::list).post(routes::todolist::create),
        )
        .route("/gateway/sessions", post(routes::sessions::open))
        .route(
            "/gateway/sessions/{id}",
            get(routes::sessions::get)
                .post(routes::sessions::send)
                .delete(routes::sessions::close),
        )
        .route(
            "/gateway/config",
            get(routes::sessions::config).put(routes::sessions::set_config),
        )
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

/// Creates the default application state and starts the fulfillment workers
/// together with the relay that keeps the fallback channel draining.
///
/// The returned pool finishes once the channels are closed with
/// [`InMemoryChannelSet::close_all`].
pub async fn create_default_state(
    config: &Config,
) -> reporting::Result<(Arc<AppState>, WorkerPool)> {
    let channels = InMemoryChannelSet::with_capacity(config.channel_capacity);
    let store = OrderStatusStore::new();
    let bakery = SimulatedBakery::with_delay(config.fulfillment_delay());
    let mut pool = WorkerPool::spawn(&channels, store.clone(), Arc::new(bakery)).await?;
    let outbox = FallbackOutbox::with_capacity(config.outbox_capacity);
    pool.spawn_fallback_relay(&channels, outbox.clone()).await?;

    let gateway = TransactionalGateway::new(
        InMemoryBackend::new(),
        GatewayConfig {
            auto_transaction: config.auto_transaction,
            expected: StatementPredicate::starts_with("INSERT INTO todo_entries"),
        },
    );

    let state = Arc::new(AppState {
        router: router::Router::new(channels.clone()),
        channels,
        reporting: ReportingService::new(store),
        outbox,
        gateway,
        sessions: SessionRegistry::with_retention(config.session_retention),
        poll_policy: config.poll_policy(),
    });

    Ok((state, pool))
}
