use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use pairlink_core::SignalMessage;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

/// Websocket link to the relay.
///
/// Outbound messages are queued on `outbound` and written by a dedicated
/// task; inbound frames are parsed and pushed to `inbound` in arrival order.
/// `inbound` closes when the relay goes away.
pub struct RelayConnection {
    pub outbound: mpsc::UnboundedSender<SignalMessage>,
    pub inbound: mpsc::UnboundedReceiver<SignalMessage>,
    tasks: Vec<JoinHandle<()>>,
}

impl RelayConnection {
    pub async fn connect(url: &str) -> Result<Self> {
        let (ws, _) = connect_async(url)
            .await
            .with_context(|| format!("Failed to connect to relay at {}", url))?;
        info!("Connected to relay at {}", url);

        let (mut sink, mut stream) = ws.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<SignalMessage>();
        let (in_tx, in_rx) = mpsc::unbounded_channel();

        let send_task = tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                let json = match serde_json::to_string(&msg) {
                    Ok(json) => json,
                    Err(e) => {
                        warn!("Failed to serialize {}: {}", msg.op(), e);
                        continue;
                    }
                };
                debug!("WS OUT: {}", json);
                if sink.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
            let _ = sink.close().await;
        });

        let recv_task = tokio::spawn(async move {
            while let Some(frame) = stream.next().await {
                let text = match frame {
                    Ok(Message::Text(text)) => text,
                    Ok(Message::Close(_)) => break,
                    Ok(_) => continue,
                    Err(e) => {
                        warn!("Relay connection error: {}", e);
                        break;
                    }
                };

                debug!("WS IN: {}", text.as_str());
                match serde_json::from_str::<SignalMessage>(text.as_str()) {
                    Ok(msg) => {
                        if in_tx.send(msg).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("Invalid SignalMessage from relay: {}", e),
                }
            }
            info!("Relay connection closed");
        });

        Ok(Self {
            outbound: out_tx,
            inbound: in_rx,
            tasks: vec![send_task, recv_task],
        })
    }

    /// Splits into the outbound sender and inbound receiver. The socket
    /// stays open until the sender is dropped or the relay hangs up.
    pub fn into_parts(
        self,
    ) -> (
        mpsc::UnboundedSender<SignalMessage>,
        mpsc::UnboundedReceiver<SignalMessage>,
    ) {
        let Self {
            outbound, inbound, ..
        } = self;
        (outbound, inbound)
    }

    pub fn send(&self, msg: SignalMessage) -> Result<()> {
        self.outbound
            .send(msg)
            .context("Relay connection already closed")
    }

    pub async fn recv(&mut self) -> Option<SignalMessage> {
        self.inbound.recv().await
    }

    /// Drops the socket immediately.
    pub fn abort(&self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}
