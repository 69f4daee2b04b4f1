//! SpendTrack payment service entry point.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use spendtrack::adapters::http::payment::{payment_routes, webhook_routes, PaymentAppState};
use spendtrack::adapters::http::subscription::{subscription_routes, SubscriptionAppState};
use spendtrack::adapters::midtrans::MidtransSnapClient;
use spendtrack::adapters::observability::{TracingEventPublisher, TracingMetrics};
use spendtrack::adapters::postgres::{PostgresPaymentStore, PostgresSubscriptionStore};
use spendtrack::application::handlers::subscription::ExpireSubscriptionsHandler;
use spendtrack::config::AppConfig;
use spendtrack::domain::payment::SignatureVerifier;
use spendtrack::ports::{EventPublisher, Metrics, PaymentStore, SubscriptionStore};

/// How often the subscription expiry sweep runs.
const EXPIRY_SWEEP_INTERVAL: Duration = Duration::from_secs(3600);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config);
    info!(
        environment = ?config.server.environment,
        "starting spendtrack payment service"
    );

    // Database
    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .idle_timeout(config.database.idle_timeout())
        .max_lifetime(config.database.max_lifetime())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        info!("running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;
    }

    // Adapters
    let payments: Arc<dyn PaymentStore> = Arc::new(PostgresPaymentStore::new(pool.clone()));
    let subscriptions: Arc<dyn SubscriptionStore> =
        Arc::new(PostgresSubscriptionStore::new(pool.clone()));
    let gateway = Arc::new(MidtransSnapClient::new(&config.payment)?);
    let verifier = Arc::new(SignatureVerifier::new(config.payment.server_key.clone()));
    let events: Arc<dyn EventPublisher> = Arc::new(TracingEventPublisher);
    let metrics: Arc<dyn Metrics> = Arc::new(TracingMetrics::new());

    // Background expiry sweep
    spawn_expiry_sweep(subscriptions.clone());

    // Routers
    let payment_state = PaymentAppState {
        payments: payments.clone(),
        subscriptions: subscriptions.clone(),
        gateway,
        verifier,
        events: events.clone(),
        metrics,
    };
    let subscription_state = SubscriptionAppState {
        subscriptions,
        payments,
        events,
    };

    let app = Router::new()
        .nest(
            "/api/payments",
            payment_routes().with_state(payment_state.clone()),
        )
        .nest("/api/webhooks", webhook_routes().with_state(payment_state))
        .nest(
            "/api/subscriptions",
            subscription_routes().with_state(subscription_state),
        )
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(cors_layer(&config));

    let addr = config.server.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any)
    }
}

fn spawn_expiry_sweep(subscriptions: Arc<dyn SubscriptionStore>) {
    let handler = ExpireSubscriptionsHandler::new(subscriptions);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(EXPIRY_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            if let Err(e) = handler.handle().await {
                warn!(error = %e, "subscription expiry sweep failed");
            }
        }
    });
}
