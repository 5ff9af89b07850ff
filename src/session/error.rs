use crate::player::error::MonitorError;
use crate::transport::error::TransportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    TransportError(#[from] TransportError),

    #[error(transparent)]
    MonitorError(#[from] MonitorError),

    #[error(transparent)]
    JoinError(#[from] tokio::task::JoinError),
}

pub type SessionResult<T> = Result<T, SessionError>;
