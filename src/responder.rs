//! Reply publishing for request-reply subjects

use anyhow::Result;
use async_nats::{Client, Subject};
use serde::Serialize;
use tracing::debug;

/// Publisher that answers requests on their reply subject
#[derive(Clone)]
pub struct ReplyPublisher {
    client: Client,
}

impl ReplyPublisher {
    /// Create a new reply publisher
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Serialize a response payload and send it to the reply subject
    pub async fn reply<T: Serialize>(&self, subject: Subject, payload: &T) -> Result<()> {
        let bytes = serde_json::to_vec(payload)?;

        debug!(subject = %subject, "Sending reply");
        self.client.publish(subject, bytes.into()).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    // Integration tests would require a running NATS server
}
