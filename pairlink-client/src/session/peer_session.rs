use crate::error::NegotiationError;
use crate::media::{LocalTracks, MediaCapture};
use crate::transport::{PeerTransport, SessionId};
use pairlink_core::{IceCandidate, SessionDescription};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where a single negotiation attempt stands.
///
/// Offerer: `Idle → HaveLocalOffer → Connected`.
/// Answerer: `Idle → HaveRemoteOffer → HaveLocalAnswer → Connected`.
/// `Ended` is terminal and reachable from anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    Idle,
    HaveLocalOffer,
    HaveRemoteOffer,
    HaveLocalAnswer,
    Connected,
    Ended,
}

/// One negotiation attempt over one transport.
///
/// Remote candidates that arrive before the remote description are held
/// back and handed to the transport, in arrival order, right after the
/// description is applied. A session is never reused: once ended, the
/// coordinator builds a new one.
pub struct PeerSession {
    id: SessionId,
    state: NegotiationState,
    transport: Box<dyn PeerTransport>,
    media: Arc<dyn MediaCapture>,
    local_tracks: Option<LocalTracks>,
    local_description: Option<SessionDescription>,
    remote_description: Option<SessionDescription>,
    pending_candidates: VecDeque<IceCandidate>,
}

impl PeerSession {
    pub fn new(id: SessionId, transport: Box<dyn PeerTransport>, media: Arc<dyn MediaCapture>) -> Self {
        Self {
            id,
            state: NegotiationState::Idle,
            transport,
            media,
            local_tracks: None,
            local_description: None,
            remote_description: None,
            pending_candidates: VecDeque::new(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn is_ended(&self) -> bool {
        self.state == NegotiationState::Ended
    }

    pub fn local_description(&self) -> Option<&SessionDescription> {
        self.local_description.as_ref()
    }

    pub fn remote_description(&self) -> Option<&SessionDescription> {
        self.remote_description.as_ref()
    }

    pub fn pending_candidates(&self) -> usize {
        self.pending_candidates.len()
    }

    /// Hands captured tracks to the transport. The session owns them from
    /// here on and releases them in `end`.
    pub async fn attach_local_tracks(&mut self, tracks: LocalTracks) -> Result<(), NegotiationError> {
        if self.state != NegotiationState::Idle || self.local_tracks.is_some() {
            let err = self.invalid("attach local tracks");
            self.media.release(tracks);
            return Err(err);
        }

        let added = self.transport.add_local_tracks(&tracks).await;
        self.local_tracks = Some(tracks);
        added?;
        Ok(())
    }

    pub async fn create_offer(&mut self) -> Result<SessionDescription, NegotiationError> {
        match self.state {
            NegotiationState::Idle => {}
            NegotiationState::HaveRemoteOffer => return Err(NegotiationError::NegotiationConflict),
            _ => return Err(self.invalid("create offer")),
        }

        let offer = self.transport.create_offer().await?;
        self.transport.set_local_description(offer.clone()).await?;
        self.local_description = Some(offer.clone());
        self.transition(NegotiationState::HaveLocalOffer);
        Ok(offer)
    }

    pub async fn apply_remote_offer(&mut self, sdp: SessionDescription) -> Result<(), NegotiationError> {
        match self.state {
            NegotiationState::Idle => {}
            NegotiationState::HaveLocalOffer => return Err(NegotiationError::NegotiationConflict),
            _ => return Err(self.invalid("apply remote offer")),
        }

        self.apply_remote(sdp, NegotiationState::HaveRemoteOffer).await
    }

    pub async fn create_answer(&mut self) -> Result<SessionDescription, NegotiationError> {
        if self.state != NegotiationState::HaveRemoteOffer {
            return Err(self.invalid("create answer"));
        }

        let answer = self.transport.create_answer().await?;
        self.transport.set_local_description(answer.clone()).await?;
        self.local_description = Some(answer.clone());
        self.transition(NegotiationState::HaveLocalAnswer);
        Ok(answer)
    }

    /// Only legal with an offer outstanding. An answer in a session that
    /// never made an offer is `UnexpectedMessage`; a second answer to an
    /// offer already answered, or one after `end`, is `InvalidState`.
    pub async fn apply_remote_answer(&mut self, sdp: SessionDescription) -> Result<(), NegotiationError> {
        match self.state {
            NegotiationState::HaveLocalOffer => {}
            NegotiationState::Idle
            | NegotiationState::HaveRemoteOffer
            | NegotiationState::HaveLocalAnswer => {
                return Err(NegotiationError::UnexpectedMessage("answer"));
            }
            NegotiationState::Connected | NegotiationState::Ended => {
                return Err(self.invalid("apply remote answer"));
            }
        }

        self.apply_remote(sdp, NegotiationState::Connected).await
    }

    pub async fn add_remote_candidate(&mut self, candidate: IceCandidate) -> Result<(), NegotiationError> {
        if self.state == NegotiationState::Ended {
            return Err(self.invalid("add remote candidate"));
        }

        if self.remote_description.is_none() {
            debug!(
                "{} buffering candidate ({} pending)",
                self.id,
                self.pending_candidates.len() + 1
            );
            self.pending_candidates.push_back(candidate);
            return Ok(());
        }

        self.transport.add_candidate(candidate).await?;
        Ok(())
    }

    /// Answering side reached by the transport reporting connectivity.
    pub fn mark_connected(&mut self) -> Result<(), NegotiationError> {
        match self.state {
            NegotiationState::HaveLocalAnswer => {
                self.transition(NegotiationState::Connected);
                Ok(())
            }
            NegotiationState::Connected => Ok(()),
            _ => Err(self.invalid("mark connected")),
        }
    }

    /// Releases the transport and local tracks. Calling it again is a no-op.
    pub async fn end(&mut self) {
        if self.state == NegotiationState::Ended {
            return;
        }

        if let Err(e) = self.transport.close().await {
            warn!("{} failed to close transport: {:?}", self.id, e);
        }
        if let Some(tracks) = self.local_tracks.take() {
            self.media.release(tracks);
        }
        self.pending_candidates.clear();
        self.transition(NegotiationState::Ended);
    }

    async fn apply_remote(
        &mut self,
        sdp: SessionDescription,
        next: NegotiationState,
    ) -> Result<(), NegotiationError> {
        self.transport.set_remote_description(sdp.clone()).await?;
        self.remote_description = Some(sdp);
        self.transition(next);
        self.flush_candidates().await;
        Ok(())
    }

    async fn flush_candidates(&mut self) {
        if self.pending_candidates.is_empty() {
            return;
        }

        debug!(
            "{} flushing {} buffered candidates",
            self.id,
            self.pending_candidates.len()
        );
        while let Some(candidate) = self.pending_candidates.pop_front() {
            if let Err(e) = self.transport.add_candidate(candidate).await {
                warn!("{} rejected buffered candidate: {:?}", self.id, e);
            }
        }
    }

    fn transition(&mut self, next: NegotiationState) {
        info!("{} {:?} -> {:?}", self.id, self.state, next);
        self.state = next;
    }

    fn invalid(&self, operation: &'static str) -> NegotiationError {
        NegotiationError::InvalidState {
            operation,
            state: self.state,
        }
    }
}
