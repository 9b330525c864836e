use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use crate::controller::DownloadError;
use crate::locator::RetrievalError;
use crate::product_actor::ProductError;
use crate::purchases::PurchaseError;

pub(crate) type HttpResult<T> = Result<T, HttpError>;

/// A failure rendered as `{ "success": false, "error": .., "code": .. }`.
#[derive(Debug)]
pub(crate) struct HttpError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: &'a str,
    code: &'a str,
}

impl HttpError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self { status, code, message: message.into() }
    }

    pub(crate) fn invalid_body(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text())
    }

    pub(crate) fn invalid_query(rejection: QueryRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_query", rejection.body_text())
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(code = self.code, message = %self.message, "request failed");
        }
        let body = ErrorBody { success: false, error: &self.message, code: self.code };
        (self.status, Json(body)).into_response()
    }
}

impl From<DownloadError> for HttpError {
    fn from(err: DownloadError) -> Self {
        let status = match &err {
            DownloadError::MissingFields(_) => StatusCode::BAD_REQUEST,
            DownloadError::OrderNotFound(_)
            | DownloadError::OrderNotCompleted(_)
            | DownloadError::BuyerMismatch(_)
            | DownloadError::TicketNotFound(_)
            | DownloadError::ProductNotFound(_) => StatusCode::NOT_FOUND,
            DownloadError::Expired | DownloadError::Exhausted => StatusCode::GONE,
            DownloadError::InvalidReceipt => StatusCode::FORBIDDEN,
            DownloadError::StoreUnavailable(_) | DownloadError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err.code(), err.to_string())
    }
}

impl From<PurchaseError> for HttpError {
    fn from(err: PurchaseError) -> Self {
        let status = match &err {
            PurchaseError::MissingFields(_) | PurchaseError::InvalidFilter(_) => StatusCode::BAD_REQUEST,
            PurchaseError::Conflict(_) => StatusCode::CONFLICT,
            PurchaseError::StoreUnavailable(_) | PurchaseError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err.code(), err.to_string())
    }
}

impl From<ProductError> for HttpError {
    fn from(err: ProductError) -> Self {
        let (status, code) = match &err {
            ProductError::NotFound(_) => (StatusCode::NOT_FOUND, "product_not_found"),
            ProductError::AlreadyExists(_) => (StatusCode::CONFLICT, "conflict"),
            ProductError::ValidationError(_) => (StatusCode::BAD_REQUEST, "invalid_product"),
            ProductError::ActorCommunicationError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "store_unavailable")
            }
        };
        Self::new(status, code, err.to_string())
    }
}

impl From<RetrievalError> for HttpError {
    fn from(err: RetrievalError) -> Self {
        let (status, code) = match &err {
            RetrievalError::Expired => (StatusCode::GONE, "expired"),
            RetrievalError::BadSignature => (StatusCode::FORBIDDEN, "bad_signature"),
        };
        Self::new(status, code, err.to_string())
    }
}
