use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::instrument;

use super::{BlobLocator, LocatorError, ResolvedBlob, UrlSigner};
use crate::clients::ProductClient;
use crate::product_actor::ProductError;

/// [`BlobLocator`] backed by the product catalog actor.
#[derive(Clone)]
pub struct CatalogLocator {
    products: ProductClient,
    signer: UrlSigner,
}

impl CatalogLocator {
    pub fn new(products: ProductClient, signer: UrlSigner) -> Self {
        Self { products, signer }
    }
}

#[async_trait]
impl BlobLocator for CatalogLocator {
    #[instrument(skip(self))]
    async fn resolve_storage_key(&self, product_id: &str) -> Result<ResolvedBlob, LocatorError> {
        let product = self
            .products
            .get_product(product_id.to_string())
            .await
            .map_err(|e| match e {
                ProductError::ActorCommunicationError(reason) => LocatorError::Unavailable(reason),
                other => LocatorError::ProductNotFound(other.to_string()),
            })?
            .ok_or_else(|| LocatorError::ProductNotFound(product_id.to_string()))?;

        Ok(ResolvedBlob {
            product_id: product.product_id,
            title: product.title,
            storage_key: product.storage_key,
            checksum: product.checksum,
        })
    }

    fn sign_retrieval_url(
        &self,
        storage_key: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, LocatorError> {
        self.signer.sign(storage_key, now + ttl)
    }
}
