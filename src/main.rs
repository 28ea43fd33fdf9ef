//! Coursegate server binary.
//!
//! Wires configuration, the PostgreSQL stores, the provider adapters and
//! the fulfillment pipeline into the Axum webhook surface, then serves
//! until shutdown.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use coursegate::adapters::http::{webhook_router, WebhookAppState};
use coursegate::adapters::postgres::{
    PostgresLineItemStore, PostgresOrderStore, PostgresWebhookRecordStore,
};
use coursegate::adapters::{
    FulfillmentRunnerConfig, OmiseConfig, OmiseEventVerifier, OpenEdxAdapter, OpenEdxConfig,
    ResendConfig, ResendNotifier, TokioFulfillmentRunner,
};
use coursegate::config::AppConfig;
use coursegate::domain::fulfillment::FulfillmentOrchestrator;
use coursegate::ports::{LineItemStore, OrderStore, WebhookRecordStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config);

    info!(
        environment = ?config.server.environment,
        payment_test_mode = config.payment.is_test_mode(),
        "starting coursegate"
    );

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("database migrations applied");
    }

    let webhook_records: Arc<dyn WebhookRecordStore> =
        Arc::new(PostgresWebhookRecordStore::new(pool.clone()));
    let orders: Arc<dyn OrderStore> = Arc::new(PostgresOrderStore::new(pool.clone()));
    let line_items: Arc<dyn LineItemStore> = Arc::new(PostgresLineItemStore::new(pool));

    let verifier = Arc::new(OmiseEventVerifier::new(
        OmiseConfig::new(config.payment.omise_secret_key.clone())
            .with_base_url(config.payment.omise_api_base_url.clone()),
    ));
    let openedx = Arc::new(OpenEdxAdapter::new(OpenEdxConfig::new(
        config.lms.base_url.clone(),
        config.lms.api_token.clone(),
    )));
    let notifier = Arc::new(ResendNotifier::new(
        ResendConfig::new(
            config.email.resend_api_key.clone(),
            config.email.from_header(),
        )
        .with_login_url(config.email.login_url.clone())
        .with_platform_name(config.email.platform_name.clone()),
    ));

    let orchestrator = Arc::new(FulfillmentOrchestrator::new(
        orders.clone(),
        line_items,
        openedx.clone(),
        openedx,
        notifier,
        config.fulfillment.item_failure_policy,
    ));
    let runner = TokioFulfillmentRunner::with_config(
        orchestrator,
        orders.clone(),
        FulfillmentRunnerConfig::default()
            .with_max_retries(config.fulfillment.max_retries)
            .with_soft_time_limit(config.fulfillment.soft_time_limit())
            .with_retry_base_delay(config.fulfillment.retry_base_delay()),
    );

    let state = WebhookAppState {
        webhook_records,
        event_verifier: verifier,
        orders,
        fulfillment_scheduler: Arc::new(runner),
    };

    let app = webhook_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )));

    let addr = config.server.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening for webhook deliveries");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` when set, falling back to the configured log level.
/// Production gets JSON output for log aggregation.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
