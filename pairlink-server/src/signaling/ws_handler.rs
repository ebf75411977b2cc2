use crate::config::RelayConfig;
use crate::room::RoomRegistry;
use crate::signaling::{SignalingRelay, SignalingService};
use axum::Router;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use futures::{SinkExt, StreamExt};
use pairlink_core::{PeerId, SignalMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Shared state handed to every websocket connection.
#[derive(Clone)]
pub struct AppState {
    pub service: SignalingService,
    pub relay: SignalingRelay,
}

impl AppState {
    pub fn new(config: &RelayConfig) -> Self {
        let service = SignalingService::new(config.ice_servers.clone());
        let registry = RoomRegistry::new(config.room_capacity);
        let relay = SignalingRelay::new(registry, Arc::new(service.clone()));

        Self { service, relay }
    }
}

/// Routes: `GET /ws` upgrades to the signaling websocket.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .with_state(state)
}

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let peer_id = PeerId::new();

    ws.on_upgrade(move |socket| handle_socket(socket, peer_id, state))
}

async fn handle_socket(socket: WebSocket, peer_id: PeerId, state: AppState) {
    info!("New WebSocket connection: {}", peer_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    state.service.add_peer(peer_id, tx);
    state
        .service
        .send_signal(peer_id, &SignalMessage::Welcome { peer_id });
    state.service.send_signal(
        peer_id,
        &SignalMessage::IceConfig {
            ice_servers: state.service.get_ice_servers(),
        },
    );

    // mpsc -> sender (websocket sink)
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let relay = state.relay.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => {
                        match serde_json::from_str::<SignalMessage>(text.as_str()) {
                            Ok(signal) => {
                                if let Err(e) = relay.handle(peer_id, signal).await {
                                    debug!("Message from {} not relayed: {}", peer_id, e);
                                }
                            }
                            Err(e) => warn!("Invalid SignalMessage from {}: {}", peer_id, e),
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    // Сначала освобождаем место в комнате, потом убираем исходящую очередь
    state.relay.handle_disconnect(peer_id).await;
    state.service.remove_peer(&peer_id);
    info!("WebSocket disconnected: {}", peer_id);
}
