use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Expected MM:SS:FF or TT:MM:SS:FF, got: {0:?}")]
    InvalidFieldCount(String),

    #[error("Invalid time field {field:?} in {text:?}")]
    InvalidField { text: String, field: String },

    #[error("Seconds out of range (0-59): {0}")]
    SecondsOutOfRange(u32),

    #[error("Frames out of range (0-74): {0}")]
    FramesOutOfRange(u32),

    #[error("Track number out of range: {0}")]
    TrackOutOfRange(u32),

    #[error("Time code does not fit into a frame count: {minutes} minutes")]
    Overflow { minutes: u32 },
}

pub type ConversionResult<T> = Result<T, ConversionError>;
