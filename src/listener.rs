//! NATS subscriptions for incoming requests

use anyhow::Result;
use async_nats::{Client, Subscriber};
use tracing::info;

/// Listener for a request-reply subject
pub struct RequestListener {
    client: Client,
    subject: String,
}

impl RequestListener {
    /// Create a new request listener
    pub fn new(client: Client, subject: &str) -> Self {
        Self {
            client,
            subject: subject.to_string(),
        }
    }

    /// Subscribe to the request subject
    pub async fn subscribe(&self) -> Result<Subscriber> {
        let subscriber = self.client.subscribe(self.subject.clone()).await?;
        info!(subject = %self.subject, "Subscribed to request subject");
        Ok(subscriber)
    }

    /// Get the subject name
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

#[cfg(test)]
mod tests {
    // Integration tests would require a running NATS server
}
