use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Audio,
    Video,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaConstraints {
    pub audio: bool,
    pub video: bool,
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self {
            audio: true,
            video: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTrack {
    pub id: String,
    pub kind: TrackKind,
}

/// Captured local tracks sharing one stream id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalTracks {
    pub stream_id: String,
    pub tracks: Vec<MediaTrack>,
}

/// Local capture device access.
#[async_trait]
pub trait MediaCapture: Send + Sync {
    async fn acquire(&self, constraints: &MediaConstraints) -> Result<LocalTracks>;

    /// Stop every track in the set.
    fn release(&self, tracks: LocalTracks);
}

/// Hands out track descriptors without touching real devices. Samples are
/// written to the negotiated tracks by whoever owns the media pipeline.
#[derive(Debug, Default)]
pub struct StaticMediaCapture {
    active: AtomicUsize,
}

impl StaticMediaCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracks acquired and not yet released.
    pub fn active_tracks(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaCapture for StaticMediaCapture {
    async fn acquire(&self, constraints: &MediaConstraints) -> Result<LocalTracks> {
        let mut tracks = Vec::new();
        if constraints.audio {
            tracks.push(MediaTrack {
                id: format!("audio-{}", Uuid::new_v4()),
                kind: TrackKind::Audio,
            });
        }
        if constraints.video {
            tracks.push(MediaTrack {
                id: format!("video-{}", Uuid::new_v4()),
                kind: TrackKind::Video,
            });
        }

        self.active.fetch_add(tracks.len(), Ordering::SeqCst);
        debug!("Acquired {} local tracks", tracks.len());

        Ok(LocalTracks {
            stream_id: Uuid::new_v4().to_string(),
            tracks,
        })
    }

    fn release(&self, tracks: LocalTracks) {
        self.active.fetch_sub(tracks.tracks.len(), Ordering::SeqCst);
        debug!("Released {} local tracks", tracks.tracks.len());
    }
}
