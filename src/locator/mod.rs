//! Resolves catalog products to stored blobs and signs retrieval URLs for them.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;

mod catalog;
mod signer;

pub use catalog::CatalogLocator;
pub use signer::{HmacSha256, RetrievalError, UrlSigner};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum LocatorError {
    #[error("product not found: {0}")]
    ProductNotFound(String),
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
    #[error("failed to sign retrieval url: {0}")]
    Signing(String),
    #[error("invalid locator configuration: {0}")]
    Config(String),
}

/// Where a product's bytes live, plus what the client needs to check them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedBlob {
    pub product_id: String,
    pub title: String,
    pub storage_key: String,
    pub checksum: Option<String>,
}

#[async_trait]
pub trait BlobLocator: Send + Sync {
    async fn resolve_storage_key(&self, product_id: &str) -> Result<ResolvedBlob, LocatorError>;

    /// A retrieval URL for `storage_key` valid for `ttl` from `now`.
    fn sign_retrieval_url(
        &self,
        storage_key: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, LocatorError>;
}
