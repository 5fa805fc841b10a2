//! Credit Default Prediction Service - Main Entry Point
//!
//! Answers NATS request-reply messages carrying raw client features with
//! a default probability and a thresholded prediction, using artifacts
//! frozen at training time.

use anyhow::Result;
use credit_default_service::{
    config::AppConfig,
    listener::RequestListener,
    metrics::{MetricsReporter, ServiceMetrics},
    model::ArtifactLoader,
    responder::ReplyPublisher,
    types::{ClientRecord, ErrorReply},
};
use futures::StreamExt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("credit_default_service=info".parse()?),
        )
        .init();

    info!("Starting Credit Default Prediction Service");

    // Load configuration
    let config = AppConfig::load()?;
    info!("Configuration loaded successfully");

    // Initialize metrics
    let metrics = Arc::new(ServiceMetrics::new());

    // All three artifacts must load before any subscription exists; a
    // failed load exits here and no request is ever accepted.
    let loader = ArtifactLoader::with_threads(config.artifacts.onnx_threads)?;
    let context = Arc::new(loader.load_context(&config.artifacts)?);
    info!(
        features = context.feature_count(),
        "Scoring context initialized"
    );

    // Connect to NATS
    let client = async_nats::connect(&config.nats.url).await?;
    info!("Connected to NATS at {}", config.nats.url);

    let responder = ReplyPublisher::new(client.clone());

    // Health subject answers with a static acknowledgement
    let health_listener = RequestListener::new(client.clone(), &config.nats.health_subject);
    let mut health_subscription = health_listener.subscribe().await?;
    let health_responder = responder.clone();
    tokio::spawn(async move {
        while let Some(message) = health_subscription.next().await {
            if let Some(reply) = message.reply {
                let status = serde_json::json!({
                    "message": "Credit default prediction service online."
                });
                if let Err(e) = health_responder.reply(reply, &status).await {
                    warn!(error = %e, "Failed to send health reply");
                }
            }
        }
    });

    // Start metrics reporter (prints summary every 30 seconds)
    let metrics_clone = metrics.clone();
    tokio::spawn(async move {
        let reporter = MetricsReporter::new(metrics_clone, 30);
        reporter.start().await;
    });

    // Prediction request loop
    let listener = RequestListener::new(client.clone(), &config.nats.predict_subject);
    let mut subscription = listener.subscribe().await?;

    let num_workers = config.pipeline.workers;
    info!(
        workers = num_workers,
        subject = %config.nats.predict_subject,
        "Serving prediction requests"
    );

    // Semaphore to limit concurrent processing
    let semaphore = Arc::new(Semaphore::new(num_workers));
    let processed_count = Arc::new(AtomicU64::new(0));

    while let Some(message) = subscription.next().await {
        // Acquire permit (limits concurrent tasks)
        let permit = semaphore.clone().acquire_owned().await.unwrap();

        // Clone shared resources for the spawned task
        let context = context.clone();
        let responder = responder.clone();
        let metrics = metrics.clone();
        let processed_count = processed_count.clone();

        // Spawn task to answer this request
        tokio::spawn(async move {
            let start_time = Instant::now();

            let Some(reply) = message.reply else {
                warn!("Prediction request carried no reply subject, dropping");
                drop(permit);
                return;
            };

            match serde_json::from_slice::<ClientRecord>(&message.payload) {
                Ok(record) => match context.predict(&record) {
                    Ok(prediction) => {
                        let processing_time = start_time.elapsed();
                        metrics.record_prediction(processing_time, &prediction);

                        debug!(
                            prediction = prediction.prediction,
                            probability_default = prediction.probability_default,
                            processing_time_us = processing_time.as_micros(),
                            "Request scored"
                        );

                        if let Err(e) = responder.reply(reply, &prediction).await {
                            error!(error = %e, "Failed to send prediction reply");
                        }

                        let count = processed_count.fetch_add(1, Ordering::Relaxed) + 1;

                        // Log progress every 100 requests
                        if count % 100 == 0 {
                            let stats = metrics.get_processing_stats();
                            info!(
                                processed = count,
                                throughput = format!("{:.1} req/s", metrics.get_throughput()),
                                avg_latency_us = stats.mean_us,
                                "Processing milestone"
                            );
                        }
                    }
                    Err(e) => {
                        // Inconsistently loaded artifacts or a failed
                        // session run; surfaced to the caller, never
                        // silently coerced.
                        error!(error = %e, "Scoring failed");
                        metrics.record_scoring_failure();

                        let internal = ErrorReply::new("internal error: scoring failed");
                        if let Err(send_err) = responder.reply(reply, &internal).await {
                            error!(error = %send_err, "Failed to send error reply");
                        }
                    }
                },
                Err(e) => {
                    warn!(error = %e, "Rejected malformed prediction request");
                    metrics.record_rejection();

                    let rejection = ErrorReply::new(format!("malformed request: {}", e));
                    if let Err(send_err) = responder.reply(reply, &rejection).await {
                        error!(error = %send_err, "Failed to send rejection reply");
                    }
                }
            }

            // Release permit when done
            drop(permit);
        });
    }

    // Print final summary
    info!("Service shutting down...");
    metrics.print_summary();

    Ok(())
}
