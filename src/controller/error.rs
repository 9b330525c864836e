use thiserror::Error;

use crate::locator::LocatorError;
use crate::receipt::ReceiptError;
use crate::store::StoreError;

/// Everything a download request can fail with, as seen by the caller.
///
/// The three authorization failures share one message so a non-owner learns
/// nothing about someone else's order; `code` still tells them apart.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DownloadError {
    #[error("Missing required fields: {0}")]
    MissingFields(String),
    #[error("Order not found or not completed")]
    OrderNotFound(String),
    #[error("Order not found or not completed")]
    OrderNotCompleted(String),
    #[error("Order not found or not completed")]
    BuyerMismatch(String),
    #[error("Download ticket not found: {0}")]
    TicketNotFound(String),
    #[error("Product not found: {0}")]
    ProductNotFound(String),
    #[error("Download ticket has expired, please verify your purchase again")]
    Expired,
    #[error("Download limit reached, please verify your purchase again")]
    Exhausted,
    #[error("Settlement receipt is invalid for this transaction")]
    InvalidReceipt,
    #[error("Order store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

impl DownloadError {
    /// Stable machine-readable kind.
    pub fn code(&self) -> &'static str {
        match self {
            DownloadError::MissingFields(_) => "missing_fields",
            DownloadError::OrderNotFound(_) => "order_not_found",
            DownloadError::OrderNotCompleted(_) => "order_not_completed",
            DownloadError::BuyerMismatch(_) => "buyer_mismatch",
            DownloadError::TicketNotFound(_) => "ticket_not_found",
            DownloadError::ProductNotFound(_) => "product_not_found",
            DownloadError::Expired => "expired",
            DownloadError::Exhausted => "exhausted",
            DownloadError::InvalidReceipt => "invalid_receipt",
            DownloadError::StoreUnavailable(_) => "store_unavailable",
            DownloadError::Storage(_) => "storage_error",
        }
    }
}

impl From<StoreError> for DownloadError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(reason) => DownloadError::StoreUnavailable(reason),
            other => DownloadError::Storage(other.to_string()),
        }
    }
}

impl From<LocatorError> for DownloadError {
    fn from(err: LocatorError) -> Self {
        match err {
            LocatorError::ProductNotFound(id) => DownloadError::ProductNotFound(id),
            other => DownloadError::Storage(other.to_string()),
        }
    }
}

impl From<ReceiptError> for DownloadError {
    fn from(err: ReceiptError) -> Self {
        match err {
            ReceiptError::Expired(_) => DownloadError::Expired,
            _ => DownloadError::InvalidReceipt,
        }
    }
}
