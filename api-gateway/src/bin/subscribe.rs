//! Subscription Lambda - Subscribes an email address to the announcement topic.
//!
//! The body is decoded in a single typed step; anything unrecognizable is
//! rejected as an invalid request. A successful call leaves the subscription
//! pending until the recipient confirms through the notification service's
//! own email flow.

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use shared::config::SubscribeConfig;
use shared::http::json_response;
use shared::models::{ErrorResponse, MessageResponse, SubscribeRequest};
use shared::notify::{Notifier, SnsNotifier};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Application state
struct AppState {
    notifier: Arc<dyn Notifier>,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let config = SubscribeConfig::from_env()?;

        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let notifier = Arc::new(SnsNotifier::new(
            aws_sdk_sns::Client::new(&aws_config),
            config.topic_arn,
        ));

        Ok(Self { notifier })
    }
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    info!(
        body_bytes = event.body().as_ref().len(),
        "Subscription request received"
    );

    let body = event.body();
    if body.as_ref().is_empty() {
        return json_response(400, &ErrorResponse::new("Invalid request format."));
    }

    let request: SubscribeRequest = match serde_json::from_slice(body.as_ref()) {
        Ok(parsed) => parsed,
        Err(e) => {
            error!(error = %e, "Unrecognized subscription body");
            return json_response(400, &ErrorResponse::new("Invalid request format."));
        }
    };

    let email = match request.email.filter(|email| !email.is_empty()) {
        Some(email) => email,
        None => return json_response(400, &ErrorResponse::new("Email not provided.")),
    };

    match state.notifier.subscribe_email(&email).await {
        Ok(subscription_arn) => {
            info!(endpoint = %email, subscription_arn = %subscription_arn, "Subscription requested");
            json_response(
                200,
                &MessageResponse::new(
                    "Subscription successful! Please check your email to confirm.",
                ),
            )
        }
        Err(e) => {
            error!(endpoint = %email, error = %e, "Subscribe call failed");
            json_response(500, &ErrorResponse::new(format!("Failed to subscribe: {}", e)))
        }
    }
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
