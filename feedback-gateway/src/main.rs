use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use prometheus::Registry;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use feedback_gateway::config::Config;
use feedback_gateway::grpc_client::ReaderClient;
use feedback_gateway::kafka::FeedbackEventProducer;
use feedback_gateway::metrics::{serve_metrics, ApiMetrics};
use feedback_gateway::routes::{self, AppState};

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,feedback_gateway=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting feedback-gateway");

    let config = Config::from_env();

    let producer = Arc::new(
        FeedbackEventProducer::new(&config.kafka.brokers)
            .context("Failed to create Kafka producer")?,
    );

    let reader = ReaderClient::connect(config.reader.grpc_url.clone())
        .await
        .context("Failed to connect to feedback-reader")?;

    let registry = Registry::new();
    let metrics = Arc::new(ApiMetrics::new(&registry).context("Failed to register metrics")?);

    let state = web::Data::new(AppState {
        producer,
        reader,
        metrics,
    });
    let registry_data = web::Data::new(registry);

    tracing::info!(
        "Starting HTTP server on {}:{}",
        config.app.host,
        config.app.port
    );

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(registry_data.clone())
            .configure(routes::configure)
            .route("/health", web::get().to(|| async { "OK" }))
            .route("/metrics", web::get().to(serve_metrics))
    })
    .bind((config.app.host.as_str(), config.app.port))
    .context("Failed to bind HTTP server")?
    .run()
    .await
    .context("HTTP server error")
}
