use thiserror::Error;
use crate::actor_framework::FrameworkError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TicketError {
    #[error("Ticket not found: {0}")]
    NotFound(String),
    #[error("Ticket operation rejected: {0}")]
    Rejected(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for TicketError {
    fn from(err: FrameworkError) -> Self {
        match err {
            FrameworkError::NotFound(id) => TicketError::NotFound(id),
            FrameworkError::AlreadyExists(id) => TicketError::Rejected(format!("duplicate ticket {id}")),
            FrameworkError::Rejected(reason) => TicketError::Rejected(reason),
            e @ (FrameworkError::ActorClosed | FrameworkError::ActorDropped) => {
                TicketError::ActorCommunicationError(e.to_string())
            }
        }
    }
}
