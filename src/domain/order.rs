use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Chain the marketplace settles on unless the purchase says otherwise.
pub const DEFAULT_CHAIN_ID: u64 = 1315;

/// Settlement state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Failed => "failed",
            OrderStatus::Refunded => "refunded",
        };
        f.write_str(s)
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "completed" => Ok(OrderStatus::Completed),
            "failed" => Ok(OrderStatus::Failed),
            "refunded" => Ok(OrderStatus::Refunded),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

/// A recorded purchase of one catalog item by one buyer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: String,
    /// Stored lowercase.
    pub buyer_address: String,
    pub product_id: String,
    pub tx_hash: String,
    pub amount_wei: String,
    pub chain_id: u64,
    pub status: OrderStatus,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn is_owned_by(&self, buyer_address: &str) -> bool {
        self.buyer_address.eq_ignore_ascii_case(buyer_address.trim())
    }

    pub fn is_completed(&self) -> bool {
        self.status == OrderStatus::Completed
    }
}

/// Params for recording a new order.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    /// Caller-chosen id; generated when absent.
    pub order_id: Option<String>,
    pub buyer_address: String,
    pub product_id: String,
    pub tx_hash: String,
    pub amount_wei: String,
    pub chain_id: u64,
    pub status: OrderStatus,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Selects orders by any combination of fields. Empty matches everything.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub tx_hash: Option<String>,
    pub buyer_address: Option<String>,
    pub status: Option<OrderStatus>,
}

impl OrderFilter {
    pub fn by_tx_hash(tx_hash: impl Into<String>) -> Self {
        Self { tx_hash: Some(tx_hash.into()), ..Self::default() }
    }

    pub fn accepts(&self, order: &Order) -> bool {
        let tx_ok = self
            .tx_hash
            .as_deref()
            .map_or(true, |tx| order.tx_hash.eq_ignore_ascii_case(tx));
        let buyer_ok = self
            .buyer_address
            .as_deref()
            .map_or(true, |buyer| order.is_owned_by(buyer));
        let status_ok = self.status.map_or(true, |status| order.status == status);
        tx_ok && buyer_ok && status_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(buyer: &str, status: OrderStatus) -> Order {
        Order {
            order_id: "order-1".into(),
            buyer_address: buyer.to_lowercase(),
            product_id: "model-007".into(),
            tx_hash: "0xBEEF".into(),
            amount_wei: "1000".into(),
            chain_id: DEFAULT_CHAIN_ID,
            status,
            verified_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn buyer_match_ignores_case() {
        let order = order("0xABCdef", OrderStatus::Completed);
        assert!(order.is_owned_by("0xabcDEF"));
        assert!(order.is_owned_by(" 0xABCDEF "));
        assert!(!order.is_owned_by("0xbbb"));
    }

    #[test]
    fn filter_combines_fields() {
        let order = order("0xaaa", OrderStatus::Pending);
        assert!(OrderFilter::default().accepts(&order));
        assert!(OrderFilter::by_tx_hash("0xbeef").accepts(&order));
        let completed_only = OrderFilter { status: Some(OrderStatus::Completed), ..OrderFilter::default() };
        assert!(!completed_only.accepts(&order));
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("Completed".parse::<OrderStatus>(), Ok(OrderStatus::Completed));
        assert!("settled".parse::<OrderStatus>().is_err());
        assert_eq!(OrderStatus::Refunded.to_string(), "refunded");
    }
}
