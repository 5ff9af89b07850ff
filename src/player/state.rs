use crate::cd::time::{FrameCount, TimeCode, TimeFormat, format_position};
use crate::cddb::lookup_track;
use crate::cddb::models::{DiscMetadata, TrackMetadata};
use crate::toc::TableOfContents;
use chrono::{DateTime, Utc};
use std::fmt::Display;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    #[default]
    Stopped,
    Playing {
        track: u8,
    },
    Paused {
        track: u8,
    },
}

impl PlaybackStatus {
    pub fn track(&self) -> Option<u8> {
        match self {
            Self::Stopped => None,
            Self::Playing { track } | Self::Paused { track } => Some(*track),
        }
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }
}

impl Display for PlaybackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stopped => write!(f, "stopped"),
            Self::Playing { track } => write!(f, "playing track {track}"),
            Self::Paused { track } => write!(f, "paused on track {track}"),
        }
    }
}

/// Everything the monitor tracks about the running playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackState {
    pub status: PlaybackStatus,
    pub current_position: Option<FrameCount>,
    /// Position seen by the previous tick, used to skip unchanged reads.
    pub last_position: Option<FrameCount>,
    pub boundary_check_counter: u32,
    /// When `status` last changed.
    pub since: DateTime<Utc>,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            status: PlaybackStatus::Stopped,
            current_position: None,
            last_position: None,
            boundary_check_counter: 0,
            since: Utc::now(),
        }
    }
}

impl PlaybackState {
    pub(crate) fn transition(&mut self, status: PlaybackStatus) {
        self.status = status;
        self.since = Utc::now();
    }

    pub(crate) fn clear_positions(&mut self) {
        self.current_position = None;
        self.last_position = None;
        self.boundary_check_counter = 0;
    }

    pub(crate) fn reset(&mut self) {
        self.clear_positions();
        self.transition(PlaybackStatus::Stopped);
    }
}

/// Read-only view of a session handed out to presentation code.
#[derive(Debug, Clone)]
pub struct PlaybackSnapshot {
    pub state: PlaybackState,
    pub toc: Option<Arc<TableOfContents>>,
    pub metadata: Option<Arc<DiscMetadata>>,
}

/// One row of the track list: number, length and title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackListing {
    pub number: u8,
    pub length: TimeCode,
    pub title: String,
}

impl PlaybackSnapshot {
    pub fn status(&self) -> PlaybackStatus {
        self.state.status
    }

    pub fn position(&self) -> Option<TimeCode> {
        self.state.current_position.map(TimeCode::from_frames)
    }

    pub fn position_text(&self, format: TimeFormat) -> String {
        format_position(self.position(), format)
    }

    pub fn track(&self, number: u8) -> TrackMetadata {
        match &self.metadata {
            Some(metadata) => lookup_track(metadata, number),
            None => TrackMetadata::fallback(number),
        }
    }

    /// The track currently playing or paused, with its title.
    pub fn now_playing(&self) -> Option<TrackMetadata> {
        self.state.status.track().map(|number| self.track(number))
    }

    pub fn track_listing(&self) -> Vec<TrackListing> {
        let Some(toc) = &self.toc else {
            return Vec::new();
        };

        (1..=toc.track_count())
            .map(|number| TrackListing {
                number,
                length: TimeCode::from_frames(toc.track_length(number).unwrap_or_default()),
                title: self.track(number).title,
            })
            .collect()
    }
}
