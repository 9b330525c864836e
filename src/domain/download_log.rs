use chrono::{DateTime, Utc};
use serde::Serialize;

/// One audit row per successful redemption. Never changed after it is written.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadLogEntry {
    pub entry_id: String,
    pub ticket_id: String,
    pub order_id: String,
    pub buyer_address: String,
    pub product_id: String,
    pub ip_address: String,
    pub user_agent: String,
    pub downloaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct DownloadLogCreate {
    pub ticket_id: String,
    pub order_id: String,
    pub buyer_address: String,
    pub product_id: String,
    pub ip_address: String,
    pub user_agent: String,
    pub downloaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    pub order_id: Option<String>,
    pub ticket_id: Option<String>,
}

impl LogFilter {
    pub fn by_order(order_id: impl Into<String>) -> Self {
        Self { order_id: Some(order_id.into()), ticket_id: None }
    }

    pub fn accepts(&self, entry: &DownloadLogEntry) -> bool {
        self.order_id.as_deref().map_or(true, |id| entry.order_id == id)
            && self.ticket_id.as_deref().map_or(true, |id| entry.ticket_id == id)
    }
}
