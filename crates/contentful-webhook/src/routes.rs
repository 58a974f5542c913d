use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use contentful_core::services::MirrorService;
use contentful_core::sync::{Outcome, WebhookAction};
use contentful_core::EntryPayload;
use serde::Serialize;
use subtle::ConstantTimeEq;
use tower_http::trace::TraceLayer;

use crate::error::AppError;

pub const TOPIC_HEADER: &str = "x-contentful-topic";
pub const SECRET_HEADER: &str = "x-webhook-secret";

#[derive(Clone)]
pub struct AppState {
    mirror: MirrorService,
    webhook_secret: Option<Arc<str>>,
}

impl AppState {
    pub fn new(mirror: MirrorService, webhook_secret: Option<String>) -> Self {
        Self {
            mirror,
            webhook_secret: webhook_secret.map(Arc::from),
        }
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/webhooks/contentful", post(receive_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: i64,
    content_types: usize,
}

async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().timestamp(),
        content_types: state.mirror.registry().content_types().len(),
    })
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct WebhookResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    contentful_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    action: Option<String>,
}

impl From<Outcome> for WebhookResponse {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Created {
                table,
                contentful_id,
                ..
            } => Self::written("created", table, contentful_id),
            Outcome::Updated {
                table,
                contentful_id,
                ..
            } => Self::written("updated", table, contentful_id),
            Outcome::Deleted {
                table,
                contentful_id,
                ..
            } => Self::written("deleted", table, contentful_id),
            Outcome::Ignored { action } => Self::ignored(action),
        }
    }
}

impl WebhookResponse {
    const fn written(status: &'static str, table: String, contentful_id: String) -> Self {
        Self {
            status,
            table: Some(table),
            contentful_id: Some(contentful_id),
            action: None,
        }
    }

    const fn ignored(action: String) -> Self {
        Self {
            status: "ignored",
            table: None,
            contentful_id: None,
            action: Some(action),
        }
    }
}

/// Topic of a webhook delivery, e.g. `ContentManagement.Entry.publish`
#[derive(Debug, Clone, PartialEq, Eq)]
enum Topic {
    /// Entry or asset event the mirror handles
    Content(WebhookAction),
    /// Anything else (content type changes, releases, ...)
    Other(String),
}

fn parse_topic(raw: &str) -> Topic {
    let mut parts = raw.trim().splitn(3, '.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("ContentManagement"), Some("Entry" | "Asset"), Some(action)) => {
            Topic::Content(WebhookAction::parse(action))
        }
        _ => Topic::Other(raw.trim().to_string()),
    }
}

fn check_secret(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let Some(expected) = state.webhook_secret.as_deref() else {
        return Ok(());
    };
    let provided = headers
        .get(SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if secrets_match(provided, expected) {
        Ok(())
    } else {
        Err(AppError::unauthorized("invalid webhook secret"))
    }
}

/// Compares without short-circuiting on the first differing byte
fn secrets_match(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}

async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, AppError> {
    check_secret(&state, &headers)?;

    let topic = headers
        .get(TOPIC_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(parse_topic)
        .ok_or_else(|| AppError::bad_request("missing X-Contentful-Topic header"))?;

    let action = match topic {
        Topic::Content(action) => action,
        Topic::Other(topic) => {
            tracing::debug!(topic = %topic, "Ignoring webhook topic");
            return Ok(Json(WebhookResponse::ignored(topic)));
        }
    };

    let payload: EntryPayload = serde_json::from_slice(&body)
        .map_err(|error| AppError::bad_request(format!("invalid payload: {error}")))?;

    let outcome = state.mirror.apply(&action, &payload).await?;
    tracing::info!(action = %action, ?outcome, "Applied webhook");
    Ok(Json(outcome.into()))
}
