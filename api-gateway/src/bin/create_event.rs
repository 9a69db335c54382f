//! Event Submission Lambda - Appends a submitted event and announces it.
//!
//! Flow:
//! 1. Parse the request body as an event record
//! 2. Append it to the events.json document in S3 (conditional write)
//! 3. Publish the announcement to the SNS topic
//! 4. Return a fixed confirmation payload
//!
//! Every response carries the permissive CORS headers expected by the
//! browser-facing submission form.

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use shared::config::EventsConfig;
use shared::events::{announcement_message, EventLog, ANNOUNCEMENT_SUBJECT};
use shared::http::cors_response;
use shared::models::{EventRecord, MessageResponse};
use shared::notify::{Notifier, SnsNotifier};
use shared::storage::S3ObjectStore;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Application state
struct AppState {
    events: EventLog,
    notifier: Arc<dyn Notifier>,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let config = EventsConfig::from_env()?;

        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let store = Arc::new(S3ObjectStore::new(
            aws_sdk_s3::Client::new(&aws_config),
            config.bucket_name,
        ));
        let notifier = Arc::new(SnsNotifier::new(
            aws_sdk_sns::Client::new(&aws_config),
            config.topic_arn,
        ));

        Ok(Self {
            events: EventLog::new(store, config.events_file_key),
            notifier,
        })
    }
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    match process(&state, &event).await {
        Ok(()) => cors_response(200, &MessageResponse::new("Event created successfully!")),
        Err(e @ shared::Error::Storage(_)) => {
            error!(error = %e, "Storage failure while processing event");
            cors_response(500, &MessageResponse::new("Error processing the event"))
        }
        Err(e) => {
            error!(error = %e, "Unexpected failure while processing event");
            cors_response(500, &MessageResponse::new("Unexpected error occurred"))
        }
    }
}

async fn process(state: &AppState, event: &Request) -> shared::Result<()> {
    let record: EventRecord = serde_json::from_slice(event.body().as_ref())?;

    let stored = state.events.append(&record).await?;
    info!(title = %record.title, total = stored.len(), "Event appended");

    state
        .notifier
        .publish(ANNOUNCEMENT_SUBJECT, &announcement_message(&record))
        .await?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);
    let state_clone = state.clone();

    run(service_fn(move |event| {
        let state = state_clone.clone();
        async move { handler(state, event).await }
    }))
    .await
}
