//! HTTP endpoints Slack calls into.
//!
//! Handlers only authenticate and decode; accepted events are queued for the
//! router and acknowledged with 200 right away, since Slack retries any
//! request that is not answered within three seconds.

use crate::metrics::BotMetrics;
use crate::security::verify_slack_token;
use crate::slack::events::{
    EventEnvelope, InteractionForm, InteractionPayload, SlashCommandForm,
};
use crate::slack::Event;
use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub events: mpsc::Sender<Event>,
    pub verification_token: String,
    pub metrics: Arc<BotMetrics>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/slack/events", post(handle_events))
        .route("/slack/commands", post(handle_command))
        .route("/slack/interactions", post(handle_interaction))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until `shutdown` resolves and in-flight requests have finished.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

async fn handle_events(State(state): State<AppState>, Json(envelope): Json<EventEnvelope>) -> Response {
    if matches!(envelope, EventEnvelope::Unsupported) {
        debug!("Ignoring unsupported envelope type");
        return StatusCode::OK.into_response();
    }
    if !verify_slack_token(&state.verification_token, envelope.token()) {
        warn!("Rejected Events API request with invalid token");
        return StatusCode::UNAUTHORIZED.into_response();
    }

    match envelope {
        EventEnvelope::UrlVerification { challenge, .. } => {
            info!("Answering URL verification challenge");
            challenge.into_response()
        }
        EventEnvelope::EventCallback { event, .. } => match event.into_event() {
            Some(event) => enqueue(&state, event).await,
            None => StatusCode::OK.into_response(),
        },
        EventEnvelope::Unsupported => StatusCode::OK.into_response(),
    }
}

async fn handle_command(State(state): State<AppState>, Form(form): Form<SlashCommandForm>) -> Response {
    if !verify_slack_token(&state.verification_token, Some(&form.token)) {
        warn!("Rejected slash command with invalid token");
        return StatusCode::UNAUTHORIZED.into_response();
    }
    enqueue(&state, form.into_event()).await
}

async fn handle_interaction(
    State(state): State<AppState>,
    Form(form): Form<InteractionForm>,
) -> Response {
    let payload: InteractionPayload = match serde_json::from_str(&form.payload) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Malformed interaction payload: {}", e);
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    if matches!(payload, InteractionPayload::Unsupported) {
        debug!("Ignoring unsupported interaction type");
        return StatusCode::OK.into_response();
    }
    if !verify_slack_token(&state.verification_token, payload.token()) {
        warn!("Rejected interaction with invalid token");
        return StatusCode::UNAUTHORIZED.into_response();
    }

    match payload.into_event() {
        Some(event) => enqueue(&state, event).await,
        None => StatusCode::OK.into_response(),
    }
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "metrics": state.metrics.report(),
    }))
}

async fn enqueue(state: &AppState, event: Event) -> Response {
    state.metrics.record_event_received();
    match state.events.send(event).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(_) => {
            error!("Event router is gone; dropping event");
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slack::blocks::LANGUAGE_SELECT_ACTION_ID;
    use crate::slack::BlockAction;

    const TOKEN: &str = "verification-token";

    struct TestServer {
        base_url: String,
        events: mpsc::Receiver<Event>,
        metrics: Arc<BotMetrics>,
        client: reqwest::Client,
    }

    async fn spawn_server() -> TestServer {
        let (tx, rx) = mpsc::channel(16);
        let metrics = Arc::new(BotMetrics::new());
        let state = AppState {
            events: tx,
            verification_token: TOKEN.to_string(),
            metrics: Arc::clone(&metrics),
        };

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });

        TestServer {
            base_url: format!("http://{}", addr),
            events: rx,
            metrics,
            client: reqwest::Client::new(),
        }
    }

    // ==================== Events API Tests ====================

    #[tokio::test]
    async fn test_url_verification_returns_challenge() {
        let server = spawn_server().await;
        let response = server
            .client
            .post(format!("{}/slack/events", server.base_url))
            .json(&json!({
                "type": "url_verification",
                "token": TOKEN,
                "challenge": "3eZbrw1aBm2rZgRNFdxV2595E9CY3gmdALWMmHkvFXO7tYXAYM8P"
            }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(
            response.text().await.unwrap(),
            "3eZbrw1aBm2rZgRNFdxV2595E9CY3gmdALWMmHkvFXO7tYXAYM8P"
        );
    }

    #[tokio::test]
    async fn test_reaction_event_is_queued() {
        let mut server = spawn_server().await;
        let response = server
            .client
            .post(format!("{}/slack/events", server.base_url))
            .json(&json!({
                "type": "event_callback",
                "token": TOKEN,
                "event": {
                    "type": "reaction_added",
                    "user": "U1",
                    "reaction": "flag-jp",
                    "item": {"type": "message", "channel": "C1", "ts": "1.0"},
                    "event_ts": "2.0"
                }
            }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(
            server.events.recv().await,
            Some(Event::ReactionAdded {
                user: "U1".to_string(),
                reaction: "flag-jp".to_string(),
                channel: "C1".to_string(),
                item_ts: "1.0".to_string(),
            })
        );
        assert_eq!(server.metrics.events_received(), 1);
    }

    #[tokio::test]
    async fn test_invalid_token_is_rejected() {
        let mut server = spawn_server().await;
        let response = server
            .client
            .post(format!("{}/slack/events", server.base_url))
            .json(&json!({
                "type": "event_callback",
                "token": "wrong",
                "event": {
                    "type": "message",
                    "channel": "C1",
                    "user": "U1",
                    "text": "Bonjour",
                    "ts": "1.0"
                }
            }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 401);
        assert!(server.events.try_recv().is_err());
        assert_eq!(server.metrics.events_received(), 0);
    }

    #[tokio::test]
    async fn test_unhandled_event_is_acknowledged() {
        let mut server = spawn_server().await;
        let response = server
            .client
            .post(format!("{}/slack/events", server.base_url))
            .json(&json!({
                "type": "event_callback",
                "token": TOKEN,
                "event": {"type": "channel_created", "channel": {"id": "C9"}}
            }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        assert!(server.events.try_recv().is_err());
    }

    // ==================== Slash Command Tests ====================

    #[tokio::test]
    async fn test_slash_command_is_queued() {
        let mut server = spawn_server().await;
        let response = server
            .client
            .post(format!("{}/slack/commands", server.base_url))
            .form(&[
                ("token", TOKEN),
                ("command", "/translate"),
                ("text", "stop"),
                ("channel_id", "C1"),
                ("user_id", "U1"),
            ])
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(
            server.events.recv().await,
            Some(Event::SlashCommand {
                command: "/translate".to_string(),
                text: "stop".to_string(),
                channel_id: "C1".to_string(),
                user_id: "U1".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_slash_command_without_token_is_rejected() {
        let server = spawn_server().await;
        let response = server
            .client
            .post(format!("{}/slack/commands", server.base_url))
            .form(&[("command", "/help"), ("channel_id", "C1"), ("user_id", "U1")])
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 401);
    }

    // ==================== Interaction Tests ====================

    #[tokio::test]
    async fn test_language_selection_is_queued() {
        let mut server = spawn_server().await;
        let payload = json!({
            "type": "block_actions",
            "token": TOKEN,
            "user": {"id": "U1"},
            "channel": {"id": "C1"},
            "message": {"ts": "5.0"},
            "actions": [{
                "action_id": LANGUAGE_SELECT_ACTION_ID,
                "type": "multi_static_select",
                "selected_options": [
                    {"text": {"type": "plain_text", "text": "English"}, "value": "English"},
                    {"text": {"type": "plain_text", "text": "French"}, "value": "French"}
                ]
            }]
        })
        .to_string();

        let response = server
            .client
            .post(format!("{}/slack/interactions", server.base_url))
            .form(&[("payload", payload.as_str())])
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(
            server.events.recv().await,
            Some(Event::Interaction {
                channel_id: "C1".to_string(),
                user_id: "U1".to_string(),
                message_ts: Some("5.0".to_string()),
                actions: vec![BlockAction {
                    action_id: LANGUAGE_SELECT_ACTION_ID.to_string(),
                    selected: vec!["English".to_string(), "French".to_string()],
                }],
            })
        );
    }

    #[tokio::test]
    async fn test_malformed_interaction_payload() {
        let server = spawn_server().await;
        let response = server
            .client
            .post(format!("{}/slack/interactions", server.base_url))
            .form(&[("payload", "{not json")])
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 400);
    }

    // ==================== Health Tests ====================

    #[tokio::test]
    async fn test_health_reports_metrics() {
        let server = spawn_server().await;
        server.metrics.record_translation_delivered();

        let body: serde_json::Value = server
            .client
            .get(format!("{}/health", server.base_url))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(body["status"], "ok");
        assert_eq!(body["metrics"]["translations_delivered"], 1);
    }

    #[tokio::test]
    async fn test_closed_router_returns_503() {
        let server = spawn_server().await;
        let TestServer {
            base_url,
            events,
            client,
            ..
        } = server;
        drop(events);

        let response = client
            .post(format!("{}/slack/commands", base_url))
            .form(&[
                ("token", TOKEN),
                ("command", "/help"),
                ("channel_id", "C1"),
                ("user_id", "U1"),
            ])
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 503);
    }
}
