//! Shared library for the event announcement Lambda functions.
//!
//! This crate provides the configuration, error types, and the storage and
//! notification collaborators used by both Lambda functions.

pub mod config;
pub mod error;
pub mod events;
pub mod http;
pub mod models;
pub mod notify;
pub mod storage;

pub use config::{EventsConfig, SubscribeConfig};
pub use error::{Error, Result};
pub use events::{announcement_message, EventLog, ANNOUNCEMENT_SUBJECT};
pub use models::{ErrorResponse, EventRecord, MessageResponse, SubscribeRequest};
pub use notify::{Notifier, SnsNotifier};
pub use storage::{ObjectStore, S3ObjectStore, StoredObject};
