//! Consumer worker pool for the analyzed-feedback topic.
//!
//! A fixed number of workers share one `StreamConsumer` in one consumer
//! group; the broker balances partitions across them. Offsets are committed
//! manually, per message, only after processing resolves — success, poison
//! skip, or retry exhaustion all commit, so a bad message can never stall
//! its partition.

mod processor;

pub use processor::{AnalyzedFeedbackProcessor, ProcessOutcome};

use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::Message;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use event_schema::topics;

use crate::error::{ReaderError, Result};
use crate::metrics::ReaderMetrics;

/// Consumer pool configuration
#[derive(Debug, Clone)]
pub struct ConsumerPoolConfig {
    /// Kafka brokers (comma-separated)
    pub brokers: String,
    /// Consumer group ID shared by all workers
    pub group_id: String,
    /// Number of worker tasks
    pub pool_size: usize,
}

impl Default for ConsumerPoolConfig {
    fn default() -> Self {
        Self {
            brokers: "localhost:9092".to_string(),
            group_id: "feedback-reader".to_string(),
            pool_size: 30,
        }
    }
}

pub struct ConsumerPool {
    consumer: Arc<StreamConsumer>,
    processor: Arc<AnalyzedFeedbackProcessor>,
    config: ConsumerPoolConfig,
    shutdown_rx: watch::Receiver<bool>,
    metrics: Arc<ReaderMetrics>,
}

impl ConsumerPool {
    pub fn new(
        config: ConsumerPoolConfig,
        processor: Arc<AnalyzedFeedbackProcessor>,
        shutdown_rx: watch::Receiver<bool>,
        metrics: Arc<ReaderMetrics>,
    ) -> Result<Self> {
        // Manual commits: the offset moves only after a message resolves.
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &config.group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .set("session.timeout.ms", "30000")
            .set("heartbeat.interval.ms", "3000")
            .set("max.poll.interval.ms", "300000")
            .set("enable.partition.eof", "false")
            .create()
            .map_err(|e| ReaderError::Kafka(format!("failed to create consumer: {e}")))?;

        consumer
            .subscribe(&[topics::ANALYZED_FEEDBACK])
            .map_err(|e| ReaderError::Kafka(format!("failed to subscribe: {e}")))?;

        info!(
            brokers = %config.brokers,
            group_id = %config.group_id,
            pool_size = config.pool_size,
            topic = topics::ANALYZED_FEEDBACK,
            "consumer pool initialized"
        );

        Ok(Self {
            consumer: Arc::new(consumer),
            processor,
            config,
            shutdown_rx,
            metrics,
        })
    }

    /// Run the pool until shutdown, then wait for every worker to finish its
    /// in-flight message.
    pub async fn run(self) {
        let mut workers = Vec::with_capacity(self.config.pool_size);

        for worker_id in 0..self.config.pool_size {
            workers.push(tokio::spawn(worker_loop(
                worker_id,
                self.consumer.clone(),
                self.processor.clone(),
                self.shutdown_rx.clone(),
                self.metrics.clone(),
            )));
        }

        for worker in workers {
            if let Err(e) = worker.await {
                error!("consumer worker panicked: {}", e);
            }
        }

        info!("consumer pool stopped");
    }
}

async fn worker_loop(
    worker_id: usize,
    consumer: Arc<StreamConsumer>,
    processor: Arc<AnalyzedFeedbackProcessor>,
    mut shutdown_rx: watch::Receiver<bool>,
    metrics: Arc<ReaderMetrics>,
) {
    info!(worker_id, "consumer worker started");

    loop {
        // Cancellation is observed between messages, never mid-message.
        if *shutdown_rx.borrow() {
            break;
        }

        tokio::select! {
            _ = shutdown_rx.changed() => {
                continue;
            }

            msg = consumer.recv() => {
                match msg {
                    Ok(message) => {
                        metrics.consumed_messages.inc();

                        debug!(
                            worker_id,
                            topic = message.topic(),
                            partition = message.partition(),
                            offset = message.offset(),
                            "received message"
                        );

                        let outcome = processor.handle_payload(message.payload()).await;

                        debug!(
                            worker_id,
                            partition = message.partition(),
                            offset = message.offset(),
                            ?outcome,
                            "message resolved"
                        );

                        // Every outcome commits; an uncommitted offset while
                        // fetching continues would silently stall the
                        // partition.
                        if let Err(e) = consumer.commit_message(&message, CommitMode::Async) {
                            warn!(worker_id, "failed to commit offset: {}", e);
                        }
                    }
                    Err(e) => {
                        warn!(worker_id, "kafka consumer error: {}", e);
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        }
    }

    info!(worker_id, "consumer worker stopped");
}
