use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

use super::LocatorError;

pub type HmacSha256 = Hmac<Sha256>;

const RETRIEVAL_PATH: &str = "download/file";

/// Why a retrieval URL was refused.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RetrievalError {
    #[error("download link has expired")]
    Expired,
    #[error("download link signature is invalid")]
    BadSignature,
}

/// Signs and checks tamper-evident retrieval URLs of the form
/// `<base>/download/file?key=..&expires=<unix ms>&sig=<hex hmac>`.
#[derive(Clone)]
pub struct UrlSigner {
    secret: Arc<Vec<u8>>,
    endpoint: Url,
}

impl UrlSigner {
    pub fn new(secret: impl AsRef<[u8]>, public_base_url: &str) -> Result<Self, LocatorError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(LocatorError::Config("url signing secret must not be empty".to_string()));
        }
        let mut base = Url::parse(public_base_url)
            .map_err(|e| LocatorError::Config(format!("invalid public base url {public_base_url}: {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base
            .join(RETRIEVAL_PATH)
            .map_err(|e| LocatorError::Config(e.to_string()))?;
        Ok(Self { secret: Arc::new(secret.to_vec()), endpoint })
    }

    fn mac(&self, storage_key: &str, expires_ms: i64) -> Result<HmacSha256, hmac::digest::InvalidLength> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)?;
        mac.update(storage_key.as_bytes());
        mac.update(b":");
        mac.update(expires_ms.to_string().as_bytes());
        Ok(mac)
    }

    pub fn sign(&self, storage_key: &str, expires_at: DateTime<Utc>) -> Result<String, LocatorError> {
        let expires_ms = expires_at.timestamp_millis();
        let mac = self
            .mac(storage_key, expires_ms)
            .map_err(|e| LocatorError::Signing(e.to_string()))?;
        let signature = hex::encode(mac.finalize().into_bytes());

        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("key", storage_key)
            .append_pair("expires", &expires_ms.to_string())
            .append_pair("sig", &signature);
        Ok(url.to_string())
    }

    /// Constant-time signature check, then expiry.
    pub fn verify(
        &self,
        storage_key: &str,
        expires_ms: i64,
        signature_hex: &str,
        now: DateTime<Utc>,
    ) -> Result<(), RetrievalError> {
        let signature = hex::decode(signature_hex).map_err(|_| RetrievalError::BadSignature)?;
        self.mac(storage_key, expires_ms)
            .map_err(|_| RetrievalError::BadSignature)?
            .verify_slice(&signature)
            .map_err(|_| RetrievalError::BadSignature)?;
        if now.timestamp_millis() >= expires_ms {
            return Err(RetrievalError::Expired);
        }
        Ok(())
    }
}
