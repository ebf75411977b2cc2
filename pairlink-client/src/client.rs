use crate::config::ClientConfig;
use crate::coordinator::{CallCommand, CallEvent, NegotiationCoordinator};
use crate::media::{MediaCapture, StaticMediaCapture};
use crate::relay::RelayConnection;
use crate::transport::{TransportFactory, WebRtcTransportFactory};
use anyhow::{Context, Result};
use pairlink_core::RoomId;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const COMMAND_BUFFER: usize = 32;

/// Handle to a running call client.
///
/// Commands are queued to the coordinator task; outcomes come back on the
/// `CallEvent` receiver returned by `connect`.
pub struct CallClient {
    commands: mpsc::Sender<CallCommand>,
    task: JoinHandle<()>,
}

impl CallClient {
    /// Connects with webrtc-rs transports and track descriptors from
    /// `StaticMediaCapture`.
    pub async fn connect(config: ClientConfig) -> Result<(Self, mpsc::UnboundedReceiver<CallEvent>)> {
        Self::connect_with(
            config,
            Arc::new(WebRtcTransportFactory),
            Arc::new(StaticMediaCapture::new()),
        )
        .await
    }

    pub async fn connect_with(
        config: ClientConfig,
        factory: Arc<dyn TransportFactory>,
        media: Arc<dyn MediaCapture>,
    ) -> Result<(Self, mpsc::UnboundedReceiver<CallEvent>)> {
        let (outbound, inbound) = RelayConnection::connect(&config.relay_url)
            .await?
            .into_parts();

        let (coordinator, events) = NegotiationCoordinator::new(&config, factory, media, outbound);
        let (commands, commands_rx) = mpsc::channel(COMMAND_BUFFER);
        let task = tokio::spawn(coordinator.run(commands_rx, inbound));

        Ok((Self { commands, task }, events))
    }

    pub async fn join(&self, room_id: impl Into<RoomId>) -> Result<()> {
        self.command(CallCommand::Join(room_id.into())).await
    }

    pub async fn start_call(&self) -> Result<()> {
        self.command(CallCommand::StartCall).await
    }

    pub async fn end_call(&self) -> Result<()> {
        self.command(CallCommand::EndCall).await
    }

    /// Ends any call in progress and waits for the coordinator to stop.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.commands);
        self.task.await.context("Coordinator task panicked")?;
        Ok(())
    }

    async fn command(&self, cmd: CallCommand) -> Result<()> {
        self.commands
            .send(cmd)
            .await
            .context("Call client is no longer running")
    }
}
