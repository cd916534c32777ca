//! SyncStyle Entitlement API server

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use tokio::signal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use entitlement_api::{build_router, AppState, Config, PgBackend};
use syncstyle_billing::{BillingService, StripeProvider};
use syncstyle_db::Repositories;
use syncstyle_entitlement::{EntitlementEngine, UsageRecorder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::from_default_env()
                .add_directive("entitlement_api=debug".parse()?)
                .add_directive("syncstyle_entitlement=info".parse()?)
                .add_directive("syncstyle_billing=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting SyncStyle Entitlement API");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        http_port = config.http_port,
        priced_tiers = config.billing.price_ids.len(),
        "Configuration loaded"
    );

    // Initialize metrics
    let metrics_handle = if config.metrics_enabled {
        Some(setup_metrics()?)
    } else {
        None
    };

    // Create database pool
    let pool = syncstyle_db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    if config.run_migrations {
        syncstyle_db::run_migrations(&pool).await?;
        tracing::info!("Migrations applied");
    }

    // Create repositories and services
    let repos = Repositories::new(pool.clone());
    let subscriptions = Arc::new(repos.subscriptions);
    let usage = Arc::new(repos.usage);

    let engine = EntitlementEngine::new(
        Arc::clone(&subscriptions),
        Arc::new(repos.tiers),
        Arc::clone(&usage),
        config.entitlement.clone(),
    );
    let recorder = UsageRecorder::new(usage, config.entitlement.clone());
    let billing = BillingService::new(
        subscriptions,
        Arc::new(StripeProvider::new(&config.billing)),
        config.billing.clone(),
    );

    let http_addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let state =
        AppState::<PgBackend>::new(engine, recorder, billing, Some(pool), config);

    // Build HTTP router
    let app = build_router(state, metrics_handle);

    run_http_server(app, http_addr).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn run_http_server(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    tracing::info!("HTTP server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn setup_metrics() -> anyhow::Result<PrometheusHandle> {
    // Entitlement checks sit on request hot paths; most should finish well
    // under the 2 s store timeout
    let latency_buckets = &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.2, 0.5, 1.0, 2.5];

    let builder = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            latency_buckets,
        )?
        .set_buckets_for_metric(
            Matcher::Full("entitlement_operation_duration_seconds".to_string()),
            latency_buckets,
        )?;

    let handle = builder.install_recorder()?;

    // Register metrics with descriptions
    metrics::describe_counter!(
        "entitlement_checks_total",
        "Entitlement checks by check kind and result"
    );
    metrics::describe_counter!(
        "entitlement_store_failures_total",
        "Failed or timed out store reads by store"
    );
    metrics::describe_counter!(
        "entitlement_usage_recorded_total",
        "Units of usage recorded by usage type"
    );
    metrics::describe_counter!(
        "billing_webhooks_processed_total",
        "Stripe webhooks processed by status"
    );
    metrics::describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request latency in seconds by operation"
    );
    metrics::describe_histogram!(
        "entitlement_operation_duration_seconds",
        "Entitlement operation latency in seconds by operation type"
    );

    Ok(handle)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = ?e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = ?e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
