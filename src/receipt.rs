//! Settlement receipts: the service's own signed statement that a payment
//! transaction was verified for a buyer and a product.
//!
//! A receipt is what the degraded download path trusts when the order store
//! cannot vouch for a transaction hash. Its expiry is part of the signed
//! content, so a receipt stops opening that path once it lapses.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use hmac::Mac;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::locator::HmacSha256;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReceiptError {
    #[error("receipt secret must not be empty")]
    EmptySecret,
    #[error("receipt signature is invalid")]
    BadSignature,
    #[error("receipt expired at {0}")]
    Expired(DateTime<Utc>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementReceipt {
    pub tx_hash: String,
    pub buyer_address: String,
    pub product_id: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
    /// Hex HMAC-SHA256 over the normalised fields.
    pub signature: String,
}

impl SettlementReceipt {
    pub fn covers(&self, tx_hash: &str, buyer_address: &str) -> bool {
        self.tx_hash.trim().eq_ignore_ascii_case(tx_hash.trim())
            && self.buyer_address.trim().eq_ignore_ascii_case(buyer_address.trim())
    }
}

#[derive(Clone)]
pub struct ReceiptSigner {
    secret: Arc<Vec<u8>>,
    ttl: Duration,
}

impl ReceiptSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, ReceiptError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(ReceiptError::EmptySecret);
        }
        Ok(Self { secret: Arc::new(secret.to_vec()), ttl: Duration::hours(24) })
    }

    /// How long issued receipts stay valid.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    fn mac(
        &self,
        tx_hash: &str,
        buyer_address: &str,
        product_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<HmacSha256, ReceiptError> {
        let mut mac = HmacSha256::new_from_slice(&self.secret).map_err(|_| ReceiptError::EmptySecret)?;
        for field in [
            tx_hash.trim().to_lowercase(),
            buyer_address.trim().to_lowercase(),
            product_id.trim().to_string(),
            expires_at.timestamp().to_string(),
        ] {
            mac.update(field.as_bytes());
            mac.update(b"\n");
        }
        Ok(mac)
    }

    pub fn issue(
        &self,
        tx_hash: &str,
        buyer_address: &str,
        product_id: &str,
        now: DateTime<Utc>,
    ) -> Result<SettlementReceipt, ReceiptError> {
        let expires_at = (now + self.ttl).trunc_subsecs(0);
        let mac = self.mac(tx_hash, buyer_address, product_id, expires_at)?;
        Ok(SettlementReceipt {
            tx_hash: tx_hash.trim().to_string(),
            buyer_address: buyer_address.trim().to_lowercase(),
            product_id: product_id.trim().to_string(),
            expires_at,
            signature: hex::encode(mac.finalize().into_bytes()),
        })
    }

    /// Checks the signature, then the expiry against `now`.
    pub fn verify(&self, receipt: &SettlementReceipt, now: DateTime<Utc>) -> Result<(), ReceiptError> {
        let signature = hex::decode(&receipt.signature).map_err(|_| ReceiptError::BadSignature)?;
        self.mac(&receipt.tx_hash, &receipt.buyer_address, &receipt.product_id, receipt.expires_at)?
            .verify_slice(&signature)
            .map_err(|_| ReceiptError::BadSignature)?;
        if now >= receipt.expires_at {
            return Err(ReceiptError::Expired(receipt.expires_at));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn issued_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn issued_receipt_verifies() {
        let signer = ReceiptSigner::new("receipts").unwrap();
        let receipt = signer.issue("0xDEADBEEF", "0xABC", "dataset-001", issued_at()).unwrap();
        assert_eq!(receipt.buyer_address, "0xabc");
        assert_eq!(receipt.expires_at, issued_at() + Duration::hours(24));
        assert_eq!(signer.verify(&receipt, issued_at()), Ok(()));
        assert!(receipt.covers("0xdeadbeef", "0xAbc"));
        assert!(!receipt.covers("0xdeadbeef", "0xbbb"));
    }

    #[test]
    fn altered_receipt_fails() {
        let signer = ReceiptSigner::new("receipts").unwrap();
        let now = issued_at();
        let mut receipt = signer.issue("0x01", "0xabc", "dataset-001", now).unwrap();
        receipt.product_id = "model-999".into();
        assert_eq!(signer.verify(&receipt, now), Err(ReceiptError::BadSignature));

        let forged = SettlementReceipt { signature: "00".repeat(32), ..signer.issue("0x02", "0xabc", "x", now).unwrap() };
        assert_eq!(signer.verify(&forged, now), Err(ReceiptError::BadSignature));

        let other = ReceiptSigner::new("different").unwrap();
        let receipt = signer.issue("0x01", "0xabc", "dataset-001", now).unwrap();
        assert_eq!(other.verify(&receipt, now), Err(ReceiptError::BadSignature));
    }

    #[test]
    fn receipt_lapses_at_its_expiry() {
        let signer = ReceiptSigner::new("receipts").unwrap().with_ttl(Duration::minutes(30));
        let receipt = signer.issue("0x01", "0xabc", "dataset-001", issued_at()).unwrap();

        let almost = issued_at() + Duration::minutes(30) - Duration::seconds(1);
        assert_eq!(signer.verify(&receipt, almost), Ok(()));
        assert_eq!(
            signer.verify(&receipt, issued_at() + Duration::minutes(30)),
            Err(ReceiptError::Expired(receipt.expires_at))
        );

        let extended = SettlementReceipt { expires_at: receipt.expires_at + Duration::days(365), ..receipt };
        assert_eq!(signer.verify(&extended, issued_at()), Err(ReceiptError::BadSignature));
    }

    #[test]
    fn expiry_travels_as_unix_seconds() {
        let signer = ReceiptSigner::new("receipts").unwrap();
        let receipt = signer.issue("0x01", "0xabc", "dataset-001", issued_at()).unwrap();
        let json = serde_json::to_value(&receipt).unwrap();
        assert_eq!(json["expiresAt"], (issued_at() + Duration::hours(24)).timestamp());

        let parsed: SettlementReceipt = serde_json::from_value(json).unwrap();
        assert_eq!(signer.verify(&parsed, issued_at()), Ok(()));
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert!(matches!(ReceiptSigner::new(""), Err(ReceiptError::EmptySecret)));
    }
}
