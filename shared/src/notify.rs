//! Notification topic access (publish and email subscription).

use async_trait::async_trait;
use aws_sdk_sns::Client as SnsClient;

use crate::error::{Error, Result};

/// The announcement topic, as seen by the handlers.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Publish a message to the topic.
    async fn publish(&self, subject: &str, message: &str) -> Result<()>;

    /// Subscribe an email endpoint to the topic.
    ///
    /// The subscription stays pending until the recipient confirms through
    /// the notification service's own email flow. Returns the subscription
    /// ARN reported by the service.
    async fn subscribe_email(&self, endpoint: &str) -> Result<String>;
}

/// SNS-backed notifier bound to a single topic.
pub struct SnsNotifier {
    client: SnsClient,
    topic_arn: String,
}

impl SnsNotifier {
    pub fn new(client: SnsClient, topic_arn: impl Into<String>) -> Self {
        Self {
            client,
            topic_arn: topic_arn.into(),
        }
    }
}

#[async_trait]
impl Notifier for SnsNotifier {
    async fn publish(&self, subject: &str, message: &str) -> Result<()> {
        self.client
            .publish()
            .topic_arn(&self.topic_arn)
            .subject(subject)
            .message(message)
            .send()
            .await
            .map_err(|e| Error::Notify(format!("Failed to publish to {}: {}", self.topic_arn, e)))?;

        Ok(())
    }

    async fn subscribe_email(&self, endpoint: &str) -> Result<String> {
        let resp = self
            .client
            .subscribe()
            .topic_arn(&self.topic_arn)
            .protocol("email")
            .endpoint(endpoint)
            .send()
            .await
            .map_err(|e| Error::Notify(e.to_string()))?;

        Ok(resp
            .subscription_arn()
            .unwrap_or("pending confirmation")
            .to_string())
    }
}
