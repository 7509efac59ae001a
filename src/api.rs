//! HTTP server: WhatsApp webhook, dashboard API, and live event feed.
//!
//! The webhook returns immediately; message processing runs on the gateway's
//! background tasks.

use crate::events::EventBus;
use crate::gateway::Gateway;
use axum::{
    body::Bytes,
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    http::StatusCode,
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use futures_util::{SinkExt, StreamExt};
use relay_channels::whatsapp::{self, WebhookEvent};
use relay_core::message::LiveEvent;
use serde::Deserialize;
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

type ApiError = (StatusCode, Json<Value>);

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    gateway: Arc<Gateway>,
    events: EventBus,
    verify_token: String,
}

impl ApiState {
    pub fn new(gateway: Arc<Gateway>, events: EventBus, verify_token: impl Into<String>) -> Self {
        Self {
            gateway,
            events,
            verify_token: verify_token.into(),
        }
    }
}

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({"error": message.into()})))
}

fn internal(e: impl std::fmt::Display) -> ApiError {
    api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

/// Query parameters of the webhook verification handshake.
#[derive(Debug, Deserialize)]
struct VerifyParams {
    #[serde(rename = "hub.mode")]
    mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    challenge: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SendMessageRequest {
    phone_number: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ToggleRequest {
    phone_number: Option<String>,
    is_active: Option<Value>,
}

/// Accepts `true`/`false` and the integers `1`/`0`.
fn as_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// `GET /` — liveness.
async fn index() -> &'static str {
    "WhatsApp relay is running"
}

/// `GET /webhook` — Meta subscription handshake.
async fn verify_webhook(
    State(state): State<ApiState>,
    Query(params): Query<VerifyParams>,
) -> Result<String, StatusCode> {
    match whatsapp::verify_subscription(
        params.mode.as_deref(),
        params.verify_token.as_deref(),
        params.challenge.as_deref(),
        &state.verify_token,
    ) {
        Some(challenge) => {
            info!("webhook verified");
            Ok(challenge)
        }
        None => {
            warn!("webhook verification rejected");
            Err(StatusCode::FORBIDDEN)
        }
    }
}

/// `POST /webhook` — message notifications. Always acknowledged with 200.
///
/// Observers see the inbound text before the toggle is consulted.
async fn receive_webhook(State(state): State<ApiState>, body: Bytes) -> StatusCode {
    match whatsapp::parse_webhook(&body) {
        WebhookEvent::Message(incoming) => {
            info!("webhook: message from {}", incoming.sender_id);
            state.gateway.announce_inbound(&incoming);
            state.gateway.submit(incoming).await;
        }
        WebhookEvent::Ignored(reason) => debug!("webhook ignored: {reason}"),
    }
    StatusCode::OK
}

/// `POST /api/send-message` — operator message to a contact.
async fn send_message(
    State(state): State<ApiState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let req: SendMessageRequest = serde_json::from_slice(&body)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("invalid JSON: {e}")))?;

    let (Some(phone), Some(message)) = (
        req.phone_number.filter(|p| !p.is_empty()),
        req.message.filter(|m| !m.is_empty()),
    ) else {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "phone_number and message are required",
        ));
    };

    match state.gateway.handle_operator_message(&phone, &message).await {
        Ok(_) => Ok(Json(json!({"success": true}))),
        Err(e) => {
            error!("operator message to {phone} failed: {e}");
            Err(internal(e))
        }
    }
}

/// `GET /api/contacts` — senders ordered by most recent exchange.
async fn contacts(State(state): State<ApiState>) -> Result<Json<Value>, ApiError> {
    let contacts = state.gateway.memory().list_contacts().await.map_err(internal)?;
    Ok(Json(json!(contacts)))
}

/// `GET /api/messages/{phone}` — full transcript, oldest first.
async fn messages(
    State(state): State<ApiState>,
    Path(phone): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let records = state
        .gateway
        .memory()
        .list_by_sender_oldest_first(&phone)
        .await
        .map_err(internal)?;
    Ok(Json(json!(records)))
}

/// `GET /api/bot-status/{phone}`
async fn bot_status(
    State(state): State<ApiState>,
    Path(phone): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let is_active = state
        .gateway
        .memory()
        .get_active(&phone)
        .await
        .map_err(internal)?;
    Ok(Json(json!({"is_active": is_active})))
}

/// `POST /api/toggle-bot` — switch automated replies for one sender.
async fn toggle_bot(
    State(state): State<ApiState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let req: ToggleRequest = serde_json::from_slice(&body)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("invalid JSON: {e}")))?;

    let (Some(phone), Some(is_active)) = (
        req.phone_number.filter(|p| !p.is_empty()),
        req.is_active.as_ref().and_then(as_flag),
    ) else {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "phone_number and is_active are required",
        ));
    };

    state
        .gateway
        .memory()
        .set_active(&phone, is_active)
        .await
        .map_err(internal)?;
    info!("bot for {phone} set to {}", if is_active { "active" } else { "inactive" });
    Ok(Json(json!({"success": true})))
}

/// `GET /api/events` — WebSocket stream of live events.
async fn live_events(ws: WebSocketUpgrade, State(state): State<ApiState>) -> Response {
    let rx = state.events.subscribe();
    ws.on_upgrade(move |socket| stream_events(socket, rx))
}

/// Text frame sent to observers for one event.
fn event_frame(event: &LiveEvent) -> String {
    json!({"event": LiveEvent::NAME, "data": event}).to_string()
}

async fn stream_events(socket: WebSocket, mut rx: broadcast::Receiver<LiveEvent>) {
    let observer = Uuid::new_v4();
    info!("live observer {observer} connected");
    let (mut ws_sender, mut ws_receiver) = socket.split();

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Ok(event) => {
                    if ws_sender.send(Message::Text(event_frame(&event).into())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("live observer {observer} lagged, skipped {n} events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            incoming = ws_receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    info!("live observer {observer} disconnected");
}

/// Build the axum router with shared state.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/webhook", get(verify_webhook).post(receive_webhook))
        .route("/api/send-message", post(send_message))
        .route("/api/contacts", get(contacts))
        .route("/api/messages/{phone}", get(messages))
        .route("/api/bot-status/{phone}", get(bot_status))
        .route("/api/toggle-bot", post(toggle_bot))
        .route("/api/events", get(live_events))
        .layer(axum::extract::DefaultBodyLimit::max(1024 * 1024)) // 1 MB max request body
        .with_state(state)
}

/// Serve the API until `shutdown` resolves.
pub async fn serve<F>(addr: &str, state: ApiState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {addr}: {e}"))?;

    info!("API server listening on {addr}");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
