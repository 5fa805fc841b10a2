//! Test Prediction Client
//!
//! Generates randomized client records and sends them to the prediction
//! service over NATS request-reply, printing each reply.

use credit_default_service::types::ClientRecord;
use rand::Rng;
use std::time::Duration;
use tracing::{info, warn};

/// Random client record generator for exercising the service
struct RecordGenerator {
    rng: rand::rngs::ThreadRng,
}

impl RecordGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }

    /// Generate a random record drawn from the training vocabulary
    fn generate(&mut self) -> ClientRecord {
        let mut record = ClientRecord::new(
            self.rng.gen_range(10000.0..500000.0),
            self.rng.gen_range(21..70),
        );

        record.sex = self.random_choice(&["M", "F"]).to_string();
        record.education = self
            .random_choice(&["graduate school", "university", "high school", "others"])
            .to_string();
        record.marriage = self
            .random_choice(&["married", "single", "others"])
            .to_string();

        let statuses = ["-2", "-1", "0", "1", "2", "3"];
        record.pay_0 = self.random_choice(&statuses).to_string();
        record.pay_2 = self.random_choice(&statuses).to_string();
        record.pay_3 = self.random_choice(&statuses).to_string();
        record.pay_4 = self.random_choice(&statuses).to_string();
        record.pay_5 = self.random_choice(&statuses).to_string();
        record.pay_6 = self.random_choice(&statuses).to_string();

        let limit = record.limit_bal;
        record.bill_amt1 = self.rng.gen_range(0.0..limit);
        record.bill_amt2 = self.rng.gen_range(0.0..limit);
        record.bill_amt3 = self.rng.gen_range(0.0..limit);
        record.bill_amt4 = self.rng.gen_range(0.0..limit);
        record.bill_amt5 = self.rng.gen_range(0.0..limit);
        record.bill_amt6 = self.rng.gen_range(0.0..limit);
        record.pay_amt1 = self.rng.gen_range(0.0..20000.0);
        record.pay_amt2 = self.rng.gen_range(0.0..20000.0);
        record.pay_amt3 = self.rng.gen_range(0.0..20000.0);
        record.pay_amt4 = self.rng.gen_range(0.0..20000.0);
        record.pay_amt5 = self.rng.gen_range(0.0..20000.0);
        record.pay_amt6 = self.rng.gen_range(0.0..20000.0);

        record
    }

    /// Generate a record with a categorical value the training data
    /// never contained (the service answers with an all-zero one-hot
    /// contribution for that field, not an error)
    fn generate_with_unseen_category(&mut self) -> ClientRecord {
        let mut record = self.generate();
        record.education = "doctorate".to_string();
        record
    }

    fn random_choice<'a>(&mut self, choices: &[&'a str]) -> &'a str {
        choices[self.rng.gen_range(0..choices.len())]
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("test_client=info".parse()?),
        )
        .init();

    info!("Starting Test Prediction Client");

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let nats_url = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("nats://localhost:4222");
    let subject = args.get(2).map(|s| s.as_str()).unwrap_or("credit.predict");
    let count: u64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(100);
    let unseen_rate: f64 = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(0.05);
    let delay_ms: u64 = args.get(5).and_then(|s| s.parse().ok()).unwrap_or(100);

    info!(
        nats_url = %nats_url,
        subject = %subject,
        count = count,
        unseen_rate = unseen_rate,
        delay_ms = delay_ms,
        "Configuration loaded"
    );

    // Connect to NATS
    let client = match async_nats::connect(nats_url).await {
        Ok(c) => {
            info!("Connected to NATS");
            c
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to NATS. Running in dry-run mode.");
            return run_dry_mode(count, unseen_rate, delay_ms).await;
        }
    };

    let mut generator = RecordGenerator::new();
    let mut rng = rand::thread_rng();

    info!("Sending {} prediction requests...", count);

    let mut answered = 0u64;
    let mut failed = 0u64;

    for i in 0..count {
        let record = if rng.gen_bool(unseen_rate) {
            generator.generate_with_unseen_category()
        } else {
            generator.generate()
        };

        let payload = serde_json::to_vec(&record)?;

        match client.request(subject.to_string(), payload.into()).await {
            Ok(reply) => {
                answered += 1;
                let body = String::from_utf8_lossy(&reply.payload).to_string();
                info!(request = i + 1, reply = %body, "Received prediction");
            }
            Err(e) => {
                failed += 1;
                warn!(request = i + 1, error = %e, "Request failed");
            }
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    info!(
        "Completed! {} requests answered, {} failed out of {}",
        answered, failed, count
    );

    Ok(())
}

async fn run_dry_mode(count: u64, unseen_rate: f64, delay_ms: u64) -> anyhow::Result<()> {
    info!("Running in dry-run mode (no NATS connection)");

    let mut generator = RecordGenerator::new();
    let mut rng = rand::thread_rng();

    for i in 0..count {
        let record = if rng.gen_bool(unseen_rate) {
            generator.generate_with_unseen_category()
        } else {
            generator.generate()
        };

        let json = serde_json::to_string_pretty(&record)?;

        if (i + 1) % 10 == 0 || i == 0 {
            info!("Sample record {}:\n{}", i + 1, json);
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    Ok(())
}
