//! Relay HTTP server.
//!
//! Routes:
//! - GET /ws      -> websocket; each connection becomes a relay `Subscription`
//! - GET /ping    -> 200 "pong" (extension health check)
//! - OPTIONS /ping -> 204 (CORS preflight)
//! - POST /chatgpt-prompt {"prompt": ..} -> relayed to every subscriber;
//!   400 on a malformed body, 503 when no extension is attached

use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::{HeaderName, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use futures::{SinkExt, StreamExt};
use log::{debug, info, warn};
use serde::Deserialize;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::{ConsumerCount, PromptMessage, Relay};

/// Default port the browser extension connects to.
pub const DEFAULT_PORT: u16 = 32123;

const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

const CORS_HEADERS: [(HeaderName, &str); 3] = [
    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (header::ACCESS_CONTROL_ALLOW_METHODS, "GET, OPTIONS"),
    (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
];

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("failed to bind relay on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

pub fn router(relay: Relay) -> Router {
    Router::new()
        .route("/ws", get(upgrade))
        .route("/ping", get(ping).options(preflight))
        .route("/chatgpt-prompt", post(push_prompt))
        .with_state(relay)
}

async fn ping() -> impl IntoResponse {
    (CORS_HEADERS, "pong")
}

async fn preflight() -> impl IntoResponse {
    (StatusCode::NO_CONTENT, CORS_HEADERS)
}

/// Body accepted by `POST /chatgpt-prompt`.
#[derive(Deserialize)]
struct PushRequest {
    prompt: String,
}

/// Relay a prompt from any local sender, not just the wizard.
async fn push_prompt(State(relay): State<Relay>, body: String) -> impl IntoResponse {
    let Ok(request) = serde_json::from_str::<PushRequest>(&body) else {
        return (StatusCode::BAD_REQUEST, "Invalid JSON");
    };
    let encoded = match PromptMessage::new(request.prompt).encode() {
        Ok(encoded) => encoded,
        Err(e) => {
            warn!("Failed to encode pushed prompt: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Error encoding prompt");
        }
    };
    match relay.broadcast(&encoded) {
        0 => (StatusCode::SERVICE_UNAVAILABLE, "Extension not connected"),
        delivered => {
            info!("Relayed pushed prompt to {} subscriber(s)", delivered);
            (StatusCode::OK, "Sent to extension")
        }
    }
}

async fn upgrade(ws: WebSocketUpgrade, State(relay): State<Relay>) -> Response {
    ws.on_upgrade(move |socket| forward(socket, relay))
}

/// Pump relay messages into one websocket until either side goes away.
async fn forward(socket: WebSocket, relay: Relay) {
    let mut subscription = relay.subscribe();
    let id = subscription.id();
    info!(
        "Extension connected (subscriber {}, {} attached)",
        id,
        relay.connected()
    );

    let (mut outbound, mut inbound) = socket.split();
    loop {
        tokio::select! {
            message = subscription.recv() => {
                let Some(message) = message else { break };
                if let Err(e) = outbound.send(Message::Text(message.into())).await {
                    debug!("Write to subscriber {} failed: {}", id, e);
                    break;
                }
            }
            frame = inbound.next() => match frame {
                Some(Ok(Message::Text(text))) if text.as_str() == "ping" => {
                    if outbound.send(Message::Text("pong".into())).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            }
        }
    }

    drop(subscription);
    info!(
        "Extension disconnected (subscriber {}, {} attached)",
        id,
        relay.connected()
    );
}

/// A running relay server.
pub struct RelayServer {
    local_addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    join: JoinHandle<()>,
}

impl RelayServer {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections and wait briefly for the server to exit.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if tokio::time::timeout(SHUTDOWN_GRACE, &mut self.join)
            .await
            .is_err()
        {
            warn!("Relay did not stop within {:?}, aborting", SHUTDOWN_GRACE);
            self.join.abort();
        }
        info!("Relay on {} stopped", self.local_addr);
    }
}

/// Bind `addr` and serve the relay in a background task.
pub async fn start(relay: Relay, addr: SocketAddr) -> Result<RelayServer, RelayError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| RelayError::Bind { addr, source })?;
    let local_addr = listener
        .local_addr()
        .map_err(|source| RelayError::Bind { addr, source })?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let app = router(relay);
    let join = tokio::spawn(async move {
        let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });
        if let Err(e) = serve.await {
            warn!("Relay server error: {}", e);
        }
    });

    info!("Relay listening on {}", local_addr);
    Ok(RelayServer {
        local_addr,
        shutdown_tx: Some(shutdown_tx),
        join,
    })
}
