use thiserror::Error;
use crate::actor_framework::FrameworkError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum LogError {
    #[error("Download log rejected the write: {0}")]
    Rejected(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for LogError {
    fn from(err: FrameworkError) -> Self {
        match err {
            e @ (FrameworkError::ActorClosed | FrameworkError::ActorDropped) => {
                LogError::ActorCommunicationError(e.to_string())
            }
            other => LogError::Rejected(other.to_string()),
        }
    }
}
