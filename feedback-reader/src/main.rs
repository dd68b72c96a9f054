use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use prometheus::Registry;
use redis::aio::ConnectionManager;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tonic::transport::Server as GrpcServer;
use tonic_health::server::health_reporter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use feedback_reader::config::Config;
use feedback_reader::consumer::{AnalyzedFeedbackProcessor, ConsumerPool, ConsumerPoolConfig};
use feedback_reader::grpc::{FeedbackReaderServer, FeedbackReaderService};
use feedback_reader::metrics::{serve_metrics, ReaderMetrics};
use feedback_reader::queries::GetFeedbackByIdHandler;
use feedback_reader::repository::{
    FeedbackCache, FeedbackRepository, PostgresFeedbackRepository, RedisFeedbackCache,
};

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,feedback_reader=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting feedback-reader");

    let config = Config::from_env();

    // Database pool + migrations
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to create database pool")?;

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .context("Failed to run migrations")?;

    // Redis connection
    let redis_client =
        redis::Client::open(config.cache.url.as_str()).context("Invalid Redis URL")?;
    let redis_conn = ConnectionManager::new(redis_client)
        .await
        .context("Failed to connect to Redis")?;
    let redis = Arc::new(Mutex::new(redis_conn));

    // Observability is an explicit dependency: one registry, one metrics
    // struct, handed to every component.
    let registry = Registry::new();
    let metrics =
        Arc::new(ReaderMetrics::new(&registry).context("Failed to register metrics")?);

    // Repositories
    let store: Arc<dyn FeedbackRepository> =
        Arc::new(PostgresFeedbackRepository::new(db_pool.clone()));
    let cache: Arc<dyn FeedbackCache> = Arc::new(RedisFeedbackCache::new(
        redis,
        config.cache.key_prefix.clone(),
    ));

    // Consumer worker pool
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let processor = Arc::new(AnalyzedFeedbackProcessor::new(
        store.clone(),
        cache.clone(),
        config.retry.to_policy(),
        metrics.clone(),
    ));

    let pool = ConsumerPool::new(
        ConsumerPoolConfig {
            brokers: config.kafka.brokers.clone(),
            group_id: config.kafka.group_id.clone(),
            pool_size: config.kafka.pool_size,
        },
        processor,
        shutdown_rx,
        metrics.clone(),
    )
    .context("Failed to create consumer pool")?;

    let pool_handle = tokio::spawn(pool.run());

    // gRPC read path
    let queries = Arc::new(GetFeedbackByIdHandler::new(store, cache, metrics.clone()));
    let grpc_addr: std::net::SocketAddr =
        format!("{}:{}", config.app.host, config.app.grpc_port)
            .parse()
            .context("Invalid gRPC address")?;

    let grpc_metrics = metrics.clone();
    tokio::spawn(async move {
        let (mut health, health_service) = health_reporter();
        health
            .set_serving::<FeedbackReaderServer<FeedbackReaderService>>()
            .await;

        let svc = FeedbackReaderService::new(queries, grpc_metrics);

        tracing::info!("Starting gRPC server on {}", grpc_addr);

        if let Err(e) = GrpcServer::builder()
            .add_service(health_service)
            .add_service(FeedbackReaderServer::new(svc))
            .serve(grpc_addr)
            .await
        {
            tracing::error!("feedback-reader gRPC server error: {}", e);
        }
    });

    // HTTP server: health + metrics
    tracing::info!(
        "Starting HTTP server on {}:{}",
        config.app.host,
        config.app.port
    );

    let registry_data = web::Data::new(registry);
    HttpServer::new(move || {
        App::new()
            .app_data(registry_data.clone())
            .route("/health", web::get().to(|| async { "OK" }))
            .route("/metrics", web::get().to(serve_metrics))
    })
    .bind((config.app.host.as_str(), config.app.port))
    .context("Failed to bind HTTP server")?
    .run()
    .await
    .context("HTTP server error")?;

    // HTTP server exit means we were signalled; drain the workers before
    // the process goes away so no in-flight message is abandoned.
    tracing::info!("Shutting down, waiting for consumer workers to drain");
    let _ = shutdown_tx.send(true);
    pool_handle
        .await
        .context("Consumer pool task failed to join")?;

    Ok(())
}
