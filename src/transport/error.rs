use crate::cd::error::ConversionError;
use crate::transport::cue::error::CueError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    CueError(#[from] CueError),

    #[error("Drive reported an invalid time code: {0}")]
    InvalidTimeCode(#[from] ConversionError),

    #[error("No disc loaded")]
    NoDisc,

    #[error("Drive rejected '{command}': {reason}")]
    CommandRejected { command: String, reason: String },

    #[error("Track {0} does not exist on this disc")]
    InvalidTrack(u8),

    #[error("Drive reported an invalid table of contents: {0}")]
    InvalidToc(String),
}

pub type TransportResult<T> = Result<T, TransportError>;
