use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error(transparent)]
    RequestError(#[from] reqwest::Error),

    #[error("Invalid metadata server url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Metadata server answered with HTTP status {0}")]
    NoSuccessStatusCode(StatusCode),
}

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error(transparent)]
    NetworkError(#[from] NetworkError),

    #[error("Metadata service returned {code}: {message}")]
    ProtocolError { code: u16, message: String },

    #[error("Malformed metadata reply: {0}")]
    ParseError(String),
}

impl From<reqwest::Error> for MetadataError {
    fn from(err: reqwest::Error) -> Self {
        Self::NetworkError(err.into())
    }
}

pub type MetadataResult<T> = Result<T, MetadataError>;
