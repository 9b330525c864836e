use thiserror::Error;

use crate::locator::LocatorError;
use crate::receipt::ReceiptError;

#[derive(Debug, Error)]
pub enum SystemError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("actor task failed: {0}")]
    ActorTaskFailed(String),
    #[error("actors did not stop within {0:?}")]
    ShutdownTimeout(std::time::Duration),
}

impl From<LocatorError> for SystemError {
    fn from(err: LocatorError) -> Self {
        SystemError::Config(err.to_string())
    }
}

impl From<ReceiptError> for SystemError {
    fn from(err: ReceiptError) -> Self {
        SystemError::Config(err.to_string())
    }
}
