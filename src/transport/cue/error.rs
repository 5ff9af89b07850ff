use crate::cd::error::ConversionError;
use crate::transport::cue::models::{FileType, TrackType};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CueError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    ParseIntError(#[from] std::num::ParseIntError),

    #[error("Invalid MSF position: {0}")]
    InvalidMsf(#[from] ConversionError),

    #[error("Unknown file type: {0}")]
    InvalidFileType(String),

    #[error("Unknown track type: {0}")]
    InvalidTrackType(String),

    #[error("Invalid quoted string: {0}")]
    InvalidQuotedString(String),

    #[error("Incomplete {keyword} line: {line}")]
    MissingField { keyword: &'static str, line: String },

    #[error("Track {0} has no INDEX entry")]
    MissingIndex(u8),

    #[error("CUE sheet does not reference any file")]
    NoFileReferenced,

    #[error("CUE sheets spanning several files are not supported ({0} files)")]
    MultipleFilesUnsupported(usize),

    #[error("CUE sheet does not contain any track")]
    NoTracks,

    #[error("Only raw BINARY images can be played, got {0:?}")]
    UnsupportedFileType(FileType),

    #[error("Track {track} is a {track_type:?} data track")]
    DataTrack { track: u8, track_type: TrackType },
}

pub type CueResult<T> = Result<T, CueError>;
