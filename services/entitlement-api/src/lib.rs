//! SyncStyle Entitlement API
//!
//! HTTP service exposing the entitlement engine, usage recording and
//! Stripe billing.
//!
//! ## REST Endpoints
//!
//! - `GET /api/v1/features` - Feature catalog
//! - `GET /api/v1/entitlements/features/{feature}?user_id=` - Feature access check
//! - `GET /api/v1/entitlements/usage/{usage_type}?user_id=` - Usage limit check
//! - `GET /api/v1/entitlements/upgrade/{feature}?user_id=` - Upgrade prompt data
//! - `POST /api/v1/usage/record` - Record usage
//! - `POST /api/v1/billing/checkout` - Create checkout session
//! - `POST /api/v1/billing/portal` - Create customer portal session
//! - `POST /webhooks/stripe` - Stripe webhook handler
//!
//! ## Health Endpoints
//!
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `GET /metrics` - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

pub use config::{Config, ConfigError};
pub use error::{ApiError, ApiResult};
pub use state::{AppState, Backend, PgBackend};

/// Build the HTTP router
pub fn build_router<B: Backend>(
    state: AppState<B>,
    metrics_handle: Option<PrometheusHandle>,
) -> Router {
    let request_timeout = state.request_timeout();

    // API v1 routes
    let api_v1 = Router::new()
        .route("/features", get(handlers::list_features))
        // Entitlement checks
        .route(
            "/entitlements/features/{feature}",
            get(handlers::check_feature::<B>),
        )
        .route(
            "/entitlements/usage/{usage_type}",
            get(handlers::check_usage::<B>),
        )
        .route(
            "/entitlements/upgrade/{feature}",
            get(handlers::upgrade_prompt::<B>),
        )
        // Usage
        .route("/usage/record", post(handlers::record_usage::<B>))
        // Billing
        .route("/billing/checkout", post(handlers::create_checkout::<B>))
        .route("/billing/portal", post(handlers::create_portal::<B>));

    // Webhook route (separate - uses raw body, no JSON parsing)
    let webhook_routes =
        Router::new().route("/webhooks/stripe", post(handlers::stripe_webhook::<B>));

    // Health routes (no timeout - must always respond quickly)
    let health_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/ready", get(handlers::ready::<B>));

    // Metrics route (no timeout)
    let metrics_route = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    // Build middleware stack (order matters - outermost first)
    let middleware = ServiceBuilder::new()
        // Request ID propagation (outermost)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        // Tracing with request details
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // CORS
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        // Request timeout (innermost - closest to handler)
        .layer(TimeoutLayer::new(request_timeout));

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(webhook_routes)
        .layer(middleware)
        .merge(health_routes)
        .merge(metrics_route)
        .with_state(state)
}
