use crate::player::state::PlaybackStatus;
use crate::transport::error::TransportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error(transparent)]
    TransportError(#[from] TransportError),

    #[error("No disc loaded")]
    NoDisc,

    #[error("Track {track} is not on this disc ({track_count} tracks)")]
    TrackOutOfRange { track: u8, track_count: u8 },

    #[error("Cannot {command} while {status}")]
    InvalidTransition {
        command: &'static str,
        status: PlaybackStatus,
    },
}

pub type MonitorResult<T> = Result<T, MonitorError>;
