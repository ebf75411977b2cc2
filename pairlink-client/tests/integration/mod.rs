//! Integration tests for pairlink-client.
//!
//! Tests are organized by functionality:
//! - `session_tests` - single negotiation state machine
//! - `coordinator_tests` - coordinator reactions to commands, signals and transport events
//! - `call_tests` - full calls through a real relay


use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::Level;

use pairlink_client::{
    CallEvent, ClientConfig, MediaCapture, NegotiationCoordinator, PeerSession, SessionId,
};
use pairlink_core::{RoomId, SignalMessage};
use pairlink_server::{AppState, RelayConfig, router};

use crate::utils::{CountingMedia, MockTransport, MockTransportFactory, TransportLog};

/// Timeout for a single expected event (ms).
pub const EVENT_TIMEOUT_MS: u64 = 2000;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Session over a `MockTransport` with one local track attached.
pub async fn create_test_session() -> (PeerSession, TransportLog, Arc<CountingMedia>) {
    let log = TransportLog::default();
    let media = Arc::new(CountingMedia::new());

    let mut session = PeerSession::new(
        SessionId(0),
        Box::new(MockTransport::new(log.clone())),
        media.clone(),
    );
    session
        .attach_local_tracks(media.tracks())
        .await
        .expect("attach tracks");

    (session, log, media)
}

pub struct TestCoordinator {
    pub coordinator: NegotiationCoordinator,
    pub outbound: mpsc::UnboundedReceiver<SignalMessage>,
    pub events: mpsc::UnboundedReceiver<CallEvent>,
    pub factory: MockTransportFactory,
    pub media: Arc<CountingMedia>,
}

impl TestCoordinator {
    /// Coordinator that has already joined `room`.
    pub async fn in_room(room: &str) -> Self {
        let mut test = create_test_coordinator();
        test.coordinator
            .join(RoomId::from(room))
            .await
            .expect("join failed");
        assert!(matches!(
            test.outbound.try_recv(),
            Ok(SignalMessage::Join { .. })
        ));
        test
    }

    pub fn sent(&mut self) -> Vec<SignalMessage> {
        let mut sent = Vec::new();
        while let Ok(msg) = self.outbound.try_recv() {
            sent.push(msg);
        }
        sent
    }

    pub fn emitted(&mut self) -> Vec<CallEvent> {
        let mut emitted = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            emitted.push(event);
        }
        emitted
    }
}

/// Coordinator driven directly by the test, outbound traffic captured.
pub fn create_test_coordinator() -> TestCoordinator {
    let factory = MockTransportFactory::new();
    let media = Arc::new(CountingMedia::new());
    let (outbound_tx, outbound) = mpsc::unbounded_channel();

    let (coordinator, events) = NegotiationCoordinator::new(
        &ClientConfig::default(),
        Arc::new(factory.clone()),
        media.clone() as Arc<dyn MediaCapture>,
        outbound_tx,
    );

    TestCoordinator {
        coordinator,
        outbound,
        events,
        factory,
        media,
    }
}

/// Serves the relay router on an ephemeral port.
pub async fn spawn_test_server() -> SocketAddr {
    let config = RelayConfig {
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        ..RelayConfig::default()
    };

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local addr");
    let app = router(AppState::new(&config));

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    addr
}

/// Waits for the next event matching `pred`, skipping others.
pub async fn wait_for_event<F>(events: &mut mpsc::UnboundedReceiver<CallEvent>, pred: F) -> CallEvent
where
    F: Fn(&CallEvent) -> bool,
{
    let deadline = Duration::from_millis(EVENT_TIMEOUT_MS);

    tokio::time::timeout(deadline, async {
        loop {
            match events.recv().await {
                Some(event) if pred(&event) => return event,
                Some(_) => continue,
                None => panic!("Event channel closed"),
            }
        }
    })
    .await
    .expect("Timeout waiting for call event")
}

/// Polls `cond` until it holds or the event timeout passes.
pub async fn wait_until<F>(cond: F)
where
    F: Fn() -> bool,
{
    let deadline = Duration::from_millis(EVENT_TIMEOUT_MS);

    tokio::time::timeout(deadline, async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("Timeout waiting for condition");
}
