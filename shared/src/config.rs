//! Configuration management for Lambda functions.

use std::env;

use crate::error::{Error, Result};

/// Key of the event collection document within the bucket.
pub const EVENTS_FILE_KEY: &str = "events.json";

/// Configuration for the event submission handler.
#[derive(Debug, Clone)]
pub struct EventsConfig {
    /// Bucket holding the event collection document
    pub bucket_name: String,
    /// Key of the collection document
    pub events_file_key: String,
    /// ARN of the announcement topic
    pub topic_arn: String,
}

impl EventsConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bucket_name: env::var("BUCKET_NAME")
                .map_err(|_| Error::Config("BUCKET_NAME not set".to_string()))?,
            events_file_key: EVENTS_FILE_KEY.to_string(),
            topic_arn: env::var("SNS_TOPIC_ARN")
                .map_err(|_| Error::Config("SNS_TOPIC_ARN not set".to_string()))?,
        })
    }
}

/// Configuration for the subscription handler.
#[derive(Debug, Clone)]
pub struct SubscribeConfig {
    /// ARN of the announcement topic
    pub topic_arn: String,
}

impl SubscribeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            topic_arn: env::var("SNS_TOPIC_ARN")
                .map_err(|_| Error::Config("SNS_TOPIC_ARN not set".to_string()))?,
        })
    }
}
