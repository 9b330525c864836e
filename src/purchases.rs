//! Purchase verification: records a settled payment as a completed order and
//! hands the buyer a settlement receipt, plus lookups over recorded orders.

use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::clock::Clock;
use crate::domain::{catalog_product_id, Order, OrderCreate, OrderFilter, OrderStatus, DEFAULT_CHAIN_ID};
use crate::locator::{BlobLocator, LocatorError};
use crate::receipt::{ReceiptError, ReceiptSigner, SettlementReceipt};
use crate::store::{OrderStore, StoreError};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PurchaseError {
    #[error("Missing required fields: {0}")]
    MissingFields(String),
    #[error("Transaction {0} is already recorded for a different purchase")]
    Conflict(String),
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
    #[error("Order store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

impl PurchaseError {
    pub fn code(&self) -> &'static str {
        match self {
            PurchaseError::MissingFields(_) => "missing_fields",
            PurchaseError::Conflict(_) => "conflict",
            PurchaseError::InvalidFilter(_) => "invalid_filter",
            PurchaseError::StoreUnavailable(_) => "store_unavailable",
            PurchaseError::Storage(_) => "storage_error",
        }
    }
}

impl From<StoreError> for PurchaseError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(reason) => PurchaseError::StoreUnavailable(reason),
            other => PurchaseError::Storage(other.to_string()),
        }
    }
}

impl From<ReceiptError> for PurchaseError {
    fn from(err: ReceiptError) -> Self {
        PurchaseError::Storage(err.to_string())
    }
}

/// Accepts `7` as well as `"7"` for ids and amounts sent by wallets.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPurchase {
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub buyer_address: Option<String>,
    #[serde(default)]
    pub item_type: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub item_id: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub price: Option<String>,
}

/// `POST /orders` body: a purchase announced before its payment is verified.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub buyer_address: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub amount_wei: Option<String>,
    #[serde(default)]
    pub chain_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseVerification {
    pub message: String,
    pub tx_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<SettlementReceipt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseSummary {
    pub order_id: String,
    pub product_id: String,
    pub product_title: Option<String>,
    pub checksum: Option<String>,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseLookup {
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<PurchaseSummary>,
}

#[derive(Clone)]
pub struct PurchaseService {
    store: Arc<dyn OrderStore>,
    locator: Arc<dyn BlobLocator>,
    receipts: ReceiptSigner,
    clock: Arc<dyn Clock>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl PurchaseService {
    pub fn new(
        store: Arc<dyn OrderStore>,
        locator: Arc<dyn BlobLocator>,
        receipts: ReceiptSigner,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { store, locator, receipts, clock }
    }

    /// Records a verified payment.
    ///
    /// With buyer and item details a completed order is recorded (once per
    /// transaction) and a receipt issued. When the store is down the receipt
    /// is still issued so the buyer can download on the degraded path.
    #[instrument(skip(self, purchase), fields(tx_hash = ?purchase.tx_hash))]
    pub async fn verify_purchase(&self, purchase: VerifyPurchase) -> Result<PurchaseVerification, PurchaseError> {
        let tx_hash = non_empty(purchase.tx_hash)
            .ok_or_else(|| PurchaseError::MissingFields("txHash".to_string()))?;

        let details = (
            non_empty(purchase.buyer_address),
            non_empty(purchase.item_type),
            non_empty(purchase.item_id),
        );
        let (buyer_address, product_id) = match details {
            (Some(buyer), Some(item_type), Some(item_id)) => (buyer, catalog_product_id(&item_type, &item_id)),
            _ => {
                info!("Transaction verified without purchase details");
                return Ok(PurchaseVerification {
                    message: "Transaction verified".to_string(),
                    tx_hash,
                    order_id: None,
                    receipt: None,
                });
            }
        };

        let amount_wei = non_empty(purchase.price).unwrap_or_else(|| "0".to_string());
        let order_id = match self.record_order(&tx_hash, &buyer_address, &product_id, amount_wei).await {
            Ok(order) => Some(order.order_id),
            Err(PurchaseError::StoreUnavailable(reason)) => {
                warn!(%reason, "Order store unavailable, issuing receipt without an order");
                None
            }
            Err(e) => return Err(e),
        };

        let receipt = self.receipts.issue(&tx_hash, &buyer_address, &product_id, self.clock.now())?;
        let message = if order_id.is_some() {
            "Transaction verified and order created"
        } else {
            "Transaction verified"
        };
        Ok(PurchaseVerification {
            message: message.to_string(),
            tx_hash,
            order_id,
            receipt: Some(receipt),
        })
    }

    async fn record_order(
        &self,
        tx_hash: &str,
        buyer_address: &str,
        product_id: &str,
        amount_wei: String,
    ) -> Result<Order, PurchaseError> {
        if let Some(existing) = self.store.find_order_by_tx(tx_hash).await? {
            if existing.is_owned_by(buyer_address) && existing.product_id == product_id {
                info!(order_id = %existing.order_id, "Transaction already recorded");
                return Ok(existing);
            }
            warn!(order_id = %existing.order_id, "Transaction already recorded for another purchase");
            return Err(PurchaseError::Conflict(tx_hash.to_string()));
        }

        let now = self.clock.now();
        let order = self
            .store
            .create_order(OrderCreate {
                order_id: None,
                buyer_address: buyer_address.to_string(),
                product_id: product_id.to_string(),
                tx_hash: tx_hash.to_string(),
                amount_wei,
                chain_id: DEFAULT_CHAIN_ID,
                status: OrderStatus::Completed,
                verified_at: Some(now),
                created_at: now,
            })
            .await?;
        info!(order_id = %order.order_id, product_id = %order.product_id, "Order recorded");
        Ok(order)
    }

    /// Records a `pending` order under the caller's id. Repeating the call for
    /// an id already recorded returns the stored order unchanged.
    #[instrument(skip(self, order), fields(order_id = ?order.order_id))]
    pub async fn create_order(&self, order: NewOrder) -> Result<Order, PurchaseError> {
        let fields = (
            non_empty(order.order_id),
            non_empty(order.buyer_address),
            non_empty(order.product_id),
            non_empty(order.tx_hash),
            non_empty(order.amount_wei),
        );
        let (Some(order_id), Some(buyer_address), Some(product_id), Some(tx_hash), Some(amount_wei)) = fields
        else {
            return Err(PurchaseError::MissingFields(
                "orderId, buyerAddress, productId, txHash, amountWei".to_string(),
            ));
        };

        let now = self.clock.now();
        let created = self
            .store
            .create_order(OrderCreate {
                order_id: Some(order_id.clone()),
                buyer_address,
                product_id,
                tx_hash,
                amount_wei,
                chain_id: order.chain_id.unwrap_or(DEFAULT_CHAIN_ID),
                status: OrderStatus::Pending,
                verified_at: None,
                created_at: now,
            })
            .await;

        match created {
            Ok(order) => {
                info!(status = %order.status, "Order recorded");
                Ok(order)
            }
            Err(StoreError::AlreadyExists(_)) => {
                debug!("Order already recorded");
                self.store
                    .find_order(&order_id)
                    .await?
                    .ok_or_else(|| PurchaseError::Storage(format!("order {order_id} vanished")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Whether a transaction has been recorded, and for what.
    #[instrument(skip(self))]
    pub async fn lookup_purchase(&self, tx_hash: &str) -> Result<PurchaseLookup, PurchaseError> {
        let tx_hash = tx_hash.trim();
        if tx_hash.is_empty() {
            return Err(PurchaseError::MissingFields("tx".to_string()));
        }
        let Some(order) = self.store.find_order_by_tx(tx_hash).await? else {
            return Ok(PurchaseLookup { verified: false, order: None });
        };

        let (product_title, checksum) = match self.locator.resolve_storage_key(&order.product_id).await {
            Ok(blob) => (Some(blob.title), blob.checksum),
            Err(LocatorError::ProductNotFound(_)) => (None, None),
            Err(e) => return Err(PurchaseError::Storage(e.to_string())),
        };

        Ok(PurchaseLookup {
            verified: true,
            order: Some(PurchaseSummary {
                order_id: order.order_id,
                product_id: order.product_id,
                product_title,
                checksum,
                status: order.status,
            }),
        })
    }

    /// Orders filtered by buyer and status, newest first.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        buyer_address: Option<String>,
        status: Option<String>,
    ) -> Result<Vec<Order>, PurchaseError> {
        let status = non_empty(status)
            .map(|s| s.parse::<OrderStatus>())
            .transpose()
            .map_err(PurchaseError::InvalidFilter)?;
        let filter = OrderFilter { tx_hash: None, buyer_address: non_empty(buyer_address), status };
        Ok(self.store.list_orders(filter).await?)
    }
}
