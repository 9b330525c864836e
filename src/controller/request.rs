use serde::Deserialize;

use super::DownloadError;
use crate::receipt::SettlementReceipt;

/// Raw `POST /download` body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadBody {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub buyer_address: Option<String>,
    #[serde(default)]
    pub item_type: Option<String>,
    #[serde(default)]
    pub receipt: Option<SettlementReceipt>,
}

/// The proof of purchase a download request rests on.
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadProof {
    Order { order_id: String },
    /// A payment transaction, optionally with the receipt issued when it was verified.
    Transaction {
        tx_hash: String,
        receipt: Option<SettlementReceipt>,
    },
}

/// A validated download request.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadRequest {
    pub buyer_address: String,
    pub proof: DownloadProof,
    pub item_type: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl TryFrom<DownloadBody> for DownloadRequest {
    type Error = DownloadError;

    /// An order id takes precedence over a transaction hash.
    fn try_from(body: DownloadBody) -> Result<Self, Self::Error> {
        let buyer_address = non_empty(body.buyer_address)
            .ok_or_else(|| DownloadError::MissingFields("buyerAddress".to_string()))?;

        let proof = match (non_empty(body.order_id), non_empty(body.tx_hash)) {
            (Some(order_id), _) => DownloadProof::Order { order_id },
            (None, Some(tx_hash)) => DownloadProof::Transaction { tx_hash, receipt: body.receipt },
            (None, None) => return Err(DownloadError::MissingFields("orderId or txHash".to_string())),
        };

        Ok(Self { buyer_address, proof, item_type: non_empty(body.item_type) })
    }
}

/// Who is asking, for the audit log.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientInfo {
    pub ip_address: String,
    pub user_agent: String,
}

impl Default for ClientInfo {
    fn default() -> Self {
        Self { ip_address: "unknown".to_string(), user_agent: "unknown".to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buyer_is_required() {
        let body = DownloadBody { order_id: Some("order-1".into()), buyer_address: Some("  ".into()), ..Default::default() };
        assert_eq!(
            DownloadRequest::try_from(body),
            Err(DownloadError::MissingFields("buyerAddress".into()))
        );
    }

    #[test]
    fn some_proof_is_required() {
        let body = DownloadBody { buyer_address: Some("0xaaa".into()), tx_hash: Some("".into()), ..Default::default() };
        assert!(matches!(DownloadRequest::try_from(body), Err(DownloadError::MissingFields(_))));
    }

    #[test]
    fn order_id_wins_over_tx_hash() {
        let body = DownloadBody {
            order_id: Some("order-1".into()),
            tx_hash: Some("0xdead".into()),
            buyer_address: Some("0xaaa".into()),
            ..Default::default()
        };
        let request = DownloadRequest::try_from(body).unwrap();
        assert_eq!(request.proof, DownloadProof::Order { order_id: "order-1".into() });
    }

    #[test]
    fn tx_hash_alone_is_a_transaction_proof() {
        let body = DownloadBody {
            tx_hash: Some(" 0xdead ".into()),
            buyer_address: Some("0xaaa".into()),
            item_type: Some("dataset".into()),
            ..Default::default()
        };
        let request = DownloadRequest::try_from(body).unwrap();
        assert_eq!(request.proof, DownloadProof::Transaction { tx_hash: "0xdead".into(), receipt: None });
        assert_eq!(request.item_type.as_deref(), Some("dataset"));
    }
}
