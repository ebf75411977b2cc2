use crate::config::ClientConfig;
use crate::coordinator::{CallCommand, CallEvent};
use crate::error::NegotiationError;
use crate::media::{MediaCapture, MediaConstraints};
use crate::session::{NegotiationState, PeerSession};
use crate::transport::{SessionId, TransportEvent, TransportEventSink, TransportFactory};
use pairlink_core::{ErrorCode, IceServerConfig, PeerId, RoomId, SessionDescription, SignalMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Drives `PeerSession`s from user intent and relay traffic.
///
/// All input is handled on one task, one item at a time, so a session never
/// sees two transitions at once.
pub struct NegotiationCoordinator {
    factory: Arc<dyn TransportFactory>,
    media: Arc<dyn MediaCapture>,
    constraints: MediaConstraints,
    ice_servers: Vec<IceServerConfig>,
    outbound: mpsc::UnboundedSender<SignalMessage>,
    events: mpsc::UnboundedSender<CallEvent>,
    transport_tx: mpsc::UnboundedSender<TransportEvent>,
    transport_rx: mpsc::UnboundedReceiver<TransportEvent>,
    local_peer: Option<PeerId>,
    room_id: Option<RoomId>,
    /// Room we asked to move to; the current room and call stay live until
    /// the relay confirms.
    pending_room: Option<RoomId>,
    session: Option<PeerSession>,
    next_session_id: u64,
}

impl NegotiationCoordinator {
    pub fn new(
        config: &ClientConfig,
        factory: Arc<dyn TransportFactory>,
        media: Arc<dyn MediaCapture>,
        outbound: mpsc::UnboundedSender<SignalMessage>,
    ) -> (Self, mpsc::UnboundedReceiver<CallEvent>) {
        let (events, events_rx) = mpsc::unbounded_channel();
        let (transport_tx, transport_rx) = mpsc::unbounded_channel();

        let coordinator = Self {
            factory,
            media,
            constraints: config.constraints,
            ice_servers: config.ice_servers.clone(),
            outbound,
            events,
            transport_tx,
            transport_rx,
            local_peer: None,
            room_id: None,
            pending_room: None,
            session: None,
            next_session_id: 0,
        };
        (coordinator, events_rx)
    }

    pub fn local_peer(&self) -> Option<PeerId> {
        self.local_peer
    }

    pub fn room_id(&self) -> Option<&RoomId> {
        self.room_id.as_ref()
    }

    pub fn pending_room(&self) -> Option<&RoomId> {
        self.pending_room.as_ref()
    }

    pub fn ice_servers(&self) -> &[IceServerConfig] {
        &self.ice_servers
    }

    /// State of the current session, `None` if there never was one.
    pub fn session_state(&self) -> Option<NegotiationState> {
        self.session.as_ref().map(|s| s.state())
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.id())
    }

    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<CallCommand>,
        mut inbound: mpsc::UnboundedReceiver<SignalMessage>,
    ) {
        info!("Negotiation loop started");

        loop {
            tokio::select! {
                // 1. Команды пользователя (UI -> Coordinator)
                cmd = commands.recv() => {
                    match cmd {
                        Some(c) => {
                            if let Err(e) = self.handle_command(c).await {
                                self.report(e);
                            }
                        }
                        None => {
                            info!("Command channel closed. Ending call.");
                            let _ = self.end_call().await;
                            break;
                        }
                    }
                }

                // 2. Сообщения от релея
                msg = inbound.recv() => {
                    match msg {
                        Some(m) => {
                            if let Err(e) = self.handle_signal(m).await {
                                self.report(e);
                            }
                        }
                        None => {
                            warn!("Relay connection lost");
                            self.relay_lost().await;
                            break;
                        }
                    }
                }

                // 3. События транспорта (PeerConnection -> Coordinator)
                evt = self.transport_rx.recv() => {
                    if let Some(e) = evt {
                        self.handle_transport_event(e).await;
                    }
                }
            }
        }

        info!("Negotiation loop finished");
    }

    pub async fn handle_command(&mut self, cmd: CallCommand) -> Result<(), NegotiationError> {
        match cmd {
            CallCommand::Join(room_id) => self.join(room_id).await,
            CallCommand::StartCall => self.start_call().await,
            CallCommand::EndCall => self.end_call().await,
        }
    }

    pub async fn join(&mut self, room_id: RoomId) -> Result<(), NegotiationError> {
        self.send(SignalMessage::Join {
            room_id: room_id.clone(),
        });

        match &self.room_id {
            Some(current) if current == &room_id && self.pending_room.is_none() => {}
            Some(current) => {
                info!("Asking to move from room '{}' to '{}'", current, room_id);
                self.pending_room = Some(room_id);
            }
            None => {
                info!("Joining room '{}'", room_id);
                self.pending_room = None;
                self.room_id = Some(room_id);
            }
        }
        Ok(())
    }

    pub async fn start_call(&mut self) -> Result<(), NegotiationError> {
        let room_id = self.room_id.clone().ok_or(NegotiationError::NotInRoom)?;

        if let Some(session) = self.active_session() {
            return Err(match session.state() {
                NegotiationState::HaveRemoteOffer => NegotiationError::NegotiationConflict,
                state => NegotiationError::InvalidState {
                    operation: "start call",
                    state,
                },
            });
        }

        let mut session = self.open_session().await?;
        let offer = match session.create_offer().await {
            Ok(offer) => offer,
            Err(e) => {
                session.end().await;
                return Err(e);
            }
        };

        self.session = Some(session);
        info!("Sending offer to room '{}'", room_id);
        self.send(SignalMessage::Offer {
            room_id,
            sdp: offer,
        });
        Ok(())
    }

    /// Local hang-up: tell the room, then forget it.
    pub async fn end_call(&mut self) -> Result<(), NegotiationError> {
        let had_session = self.teardown_session().await;

        let Some(room_id) = self.room_id.take() else {
            return if had_session {
                Ok(())
            } else {
                Err(NegotiationError::NotInRoom)
            };
        };

        info!("Ending call in room '{}'", room_id);
        self.send(SignalMessage::EndCall { room_id });
        self.emit(CallEvent::CallEnded { by_remote: false });
        Ok(())
    }

    pub async fn handle_signal(&mut self, msg: SignalMessage) -> Result<(), NegotiationError> {
        debug!("Received {} from relay", msg.op());

        match msg {
            SignalMessage::Welcome { peer_id } => {
                info!("Relay assigned peer id {}", peer_id);
                self.local_peer = Some(peer_id);
                Ok(())
            }

            SignalMessage::IceConfig { ice_servers } => {
                info!("Received ICE config: {} servers", ice_servers.len());
                self.ice_servers = ice_servers;
                Ok(())
            }

            SignalMessage::Joined { room_id } => {
                if self.pending_room.as_ref() == Some(&room_id) {
                    self.pending_room = None;
                    self.commit_move(room_id.clone()).await;
                }
                if self.room_id.as_ref() == Some(&room_id) {
                    self.emit(CallEvent::Joined(room_id));
                }
                Ok(())
            }

            SignalMessage::Error {
                code,
                room_id,
                message,
            } => {
                if code == ErrorCode::RoomFull && room_id.is_some() {
                    if room_id == self.pending_room {
                        // Relay kept us where we were.
                        if let Some(refused) = self.pending_room.take() {
                            warn!("Move to room '{}' refused", refused);
                        }
                    } else if room_id == self.room_id {
                        self.room_id = None;
                    }
                }
                Err(NegotiationError::Rejected { code, message })
            }

            SignalMessage::Offer { room_id, sdp } => {
                self.ensure_room(&room_id, "offer")?;
                self.accept_offer(room_id, sdp).await
            }

            SignalMessage::Answer { room_id, sdp } => {
                self.ensure_room(&room_id, "answer")?;
                let Some(session) = self.active_session_mut() else {
                    return Err(NegotiationError::UnexpectedMessage("answer"));
                };
                let applied = session.apply_remote_answer(sdp).await;
                match applied {
                    Ok(()) => Ok(()),
                    Err(e) => Err(self.abort_session(e).await),
                }
            }

            SignalMessage::Candidate { room_id, candidate } => {
                self.ensure_room(&room_id, "candidate")?;
                let Some(session) = self.active_session_mut() else {
                    return Err(NegotiationError::UnexpectedMessage("candidate"));
                };
                let added = session.add_remote_candidate(candidate).await;
                match added {
                    Ok(()) => Ok(()),
                    Err(e @ NegotiationError::Transport(_)) => Err(e),
                    Err(e) => Err(self.abort_session(e).await),
                }
            }

            SignalMessage::EndCall { room_id } => {
                self.ensure_room(&room_id, "end call")?;
                info!("Call in room '{}' ended by remote", room_id);
                self.teardown_session().await;
                self.send(SignalMessage::Leave { room_id });
                self.room_id = None;
                self.emit(CallEvent::CallEnded { by_remote: true });
                Ok(())
            }

            other @ (SignalMessage::Join { .. } | SignalMessage::Leave { .. }) => {
                warn!("Relay sent client-only message {}, ignoring", other.op());
                Ok(())
            }
        }
    }

    pub async fn handle_transport_event(&mut self, event: TransportEvent) {
        let Some(session) = self.active_session_mut() else {
            debug!("Dropping transport event for inactive session");
            return;
        };
        if session.id() != event.session_id() {
            debug!("Dropping event from stale {}", event.session_id());
            return;
        }

        match event {
            TransportEvent::CandidateDiscovered(_, candidate) => {
                if let Some(room_id) = self.room_id.clone() {
                    self.send(SignalMessage::Candidate { room_id, candidate });
                }
            }

            TransportEvent::RemoteTrack(_, track) => {
                info!("Remote {:?} track {} ready", track.kind, track.id);
                self.emit(CallEvent::RemoteTrack(track));
            }

            TransportEvent::Connected(_) => {
                if let Err(e) = session.mark_connected() {
                    debug!("Ignoring connected event: {}", e);
                }
            }

            TransportEvent::Failed(id) => {
                warn!("{} transport failed", id);
                self.teardown_session().await;
                self.emit(CallEvent::Fault {
                    code: None,
                    message: "peer connection failed".to_owned(),
                });
            }
        }
    }

    /// Losing the relay ends the call as if the remote had hung up.
    pub async fn relay_lost(&mut self) {
        let had_session = self.teardown_session().await;
        self.room_id = None;
        self.pending_room = None;
        if had_session {
            self.emit(CallEvent::CallEnded { by_remote: true });
        }
    }

    /// The relay has already told the old room the call is over.
    async fn commit_move(&mut self, next: RoomId) {
        if let Some(previous) = self.room_id.replace(next) {
            info!("Moved from room '{}'", previous);
        }
        if self.teardown_session().await {
            self.emit(CallEvent::CallEnded { by_remote: false });
        }
    }

    async fn accept_offer(
        &mut self,
        room_id: RoomId,
        sdp: SessionDescription,
    ) -> Result<(), NegotiationError> {
        if let Some(session) = self.active_session() {
            if session.state() == NegotiationState::HaveLocalOffer {
                warn!("Remote offer collided with our own in '{}'", room_id);
                return Err(self
                    .abort_session(NegotiationError::NegotiationConflict)
                    .await);
            }
            info!("Replacing {} with a fresh session", session.id());
            self.teardown_session().await;
        }

        let mut session = self.open_session().await?;
        let answer = match Self::answer_offer(&mut session, sdp).await {
            Ok(answer) => answer,
            Err(e) => {
                session.end().await;
                return Err(e);
            }
        };

        self.session = Some(session);
        info!("Sending answer to room '{}'", room_id);
        self.send(SignalMessage::Answer {
            room_id,
            sdp: answer,
        });
        Ok(())
    }

    async fn answer_offer(
        session: &mut PeerSession,
        sdp: SessionDescription,
    ) -> Result<SessionDescription, NegotiationError> {
        session.apply_remote_offer(sdp).await?;
        session.create_answer().await
    }

    /// New session with local media attached.
    async fn open_session(&mut self) -> Result<PeerSession, NegotiationError> {
        let id = SessionId(self.next_session_id);
        self.next_session_id += 1;

        let sink = TransportEventSink::new(id, self.transport_tx.clone());
        let transport = self.factory.create(&self.ice_servers, sink).await?;
        let mut session = PeerSession::new(id, transport, self.media.clone());

        let attached = match self.media.acquire(&self.constraints).await {
            Ok(tracks) => session.attach_local_tracks(tracks).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = attached {
            session.end().await;
            return Err(e);
        }

        Ok(session)
    }

    fn active_session(&self) -> Option<&PeerSession> {
        self.session.as_ref().filter(|s| !s.is_ended())
    }

    fn active_session_mut(&mut self) -> Option<&mut PeerSession> {
        self.session.as_mut().filter(|s| !s.is_ended())
    }

    /// Ends the current session. Returns whether one was still running.
    async fn teardown_session(&mut self) -> bool {
        match self.session.as_mut() {
            Some(session) if !session.is_ended() => {
                session.end().await;
                true
            }
            _ => false,
        }
    }

    async fn abort_session(&mut self, err: NegotiationError) -> NegotiationError {
        warn!("Aborting session: {}", err);
        self.teardown_session().await;
        err
    }

    fn ensure_room(&self, room_id: &RoomId, what: &'static str) -> Result<(), NegotiationError> {
        if self.room_id.as_ref() == Some(room_id) {
            Ok(())
        } else {
            warn!("Received {} for room '{}' we are not in", what, room_id);
            Err(NegotiationError::UnexpectedMessage(what))
        }
    }

    fn send(&self, msg: SignalMessage) {
        if self.outbound.send(msg).is_err() {
            warn!("Relay connection closed, dropping outbound message");
        }
    }

    fn emit(&self, event: CallEvent) {
        let _ = self.events.send(event);
    }

    fn report(&self, err: NegotiationError) {
        warn!("Negotiation fault: {}", err);
        self.emit(CallEvent::Fault {
            code: err.code(),
            message: err.to_string(),
        });
    }
}
