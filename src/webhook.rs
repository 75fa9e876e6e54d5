//! Inbound side: the Messenger webhook and a health check.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::responder::Responder;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_HEADER: &str = "x-hub-signature-256";

#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub entry: Vec<WebhookEntry>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookEntry {
    pub id: Option<String>,
    pub time: Option<i64>,
    #[serde(default)]
    pub messaging: Vec<MessagingEvent>,
}

#[derive(Debug, Deserialize)]
pub struct MessagingEvent {
    pub sender: Option<Participant>,
    pub recipient: Option<Participant>,
    pub timestamp: Option<i64>,
    pub message: Option<InboundMessage>,
    pub postback: Option<Postback>,
}

#[derive(Debug, Deserialize)]
pub struct Participant {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct InboundMessage {
    pub mid: Option<String>,
    pub text: Option<String>,
    pub quick_reply: Option<QuickReplyPayload>,
    /// Set on copies of messages the page itself sent.
    #[serde(default)]
    pub is_echo: bool,
}

#[derive(Debug, Deserialize)]
pub struct QuickReplyPayload {
    pub payload: String,
}

#[derive(Debug, Deserialize)]
pub struct Postback {
    pub title: Option<String>,
    pub payload: String,
}

#[derive(Debug, Deserialize)]
struct VerifyParams {
    #[serde(rename = "hub.mode")]
    mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    challenge: Option<String>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

pub struct AppState {
    verify_token: String,
    app_secret: Option<String>,
    responder: Responder,
}

impl AppState {
    pub fn new(config: &Config, responder: Responder) -> Self {
        AppState {
            verify_token: config.verify_token.clone(),
            app_secret: config.app_secret.clone(),
            responder,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/webhook", get(verify_webhook).post(webhook_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

async fn health_check() -> impl IntoResponse {
    let health_response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (StatusCode::OK, Json(health_response))
}

async fn verify_webhook(
    State(state): State<Arc<AppState>>,
    Query(params): Query<VerifyParams>,
) -> impl IntoResponse {
    let mode_ok = params.mode.as_deref() == Some("subscribe");
    let token_ok = params.verify_token.as_deref() == Some(state.verify_token.as_str());

    match params.challenge {
        Some(challenge) if mode_ok && token_ok => {
            info!("Webhook verified");
            (StatusCode::OK, challenge)
        }
        _ => {
            warn!("Webhook verification failed");
            (StatusCode::FORBIDDEN, String::new())
        }
    }
}

async fn webhook_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    if let Some(secret) = &state.app_secret {
        let Some(signature) = headers.get(SIGNATURE_HEADER).and_then(|h| h.to_str().ok()) else {
            error!("Missing {} header", SIGNATURE_HEADER);
            return StatusCode::UNAUTHORIZED;
        };
        if !verify_signature(&body, signature, secret) {
            error!("Invalid webhook signature");
            return StatusCode::UNAUTHORIZED;
        }
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            error!("Failed to parse webhook request: {}", e);
            return StatusCode::BAD_REQUEST;
        }
    };

    if payload.object != "page" {
        debug!("Ignoring webhook for object {:?}", payload.object);
        return StatusCode::OK;
    }

    for entry in &payload.entry {
        for event in &entry.messaging {
            state.responder.handle_event(event).await;
        }
    }

    StatusCode::OK
}

/// Checks a `sha256=<hex>` signature of the raw request body.
fn verify_signature(body: &[u8], signature: &str, app_secret: &str) -> bool {
    let Some(signature) = signature.strip_prefix("sha256=") else {
        return false;
    };
    let Ok(expected) = hex::decode(signature) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(app_secret.as_bytes()) else {
        return false;
    };

    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}
