//! The order/ticket store the download controller depends on.
//!
//! [`OrderStore`] is the seam: the controller only ever talks to this trait,
//! and [`ActorStore`] implements it over the resource actors.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{
    DownloadLogCreate, DownloadLogEntry, DownloadTicket, LogFilter, Order, OrderCreate,
    OrderFilter, Redemption, TicketCreate, TicketIssue,
};

mod actor_store;

pub use actor_store::ActorStore;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    /// The backing store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("record already exists: {0}")]
    AlreadyExists(String),
    #[error("store rejected the write: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn find_order(&self, order_id: &str) -> Result<Option<Order>, StoreError>;

    async fn find_order_by_tx(&self, tx_hash: &str) -> Result<Option<Order>, StoreError>;

    /// Orders matching the filter, newest first.
    async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<Order>, StoreError>;

    async fn create_order(&self, params: OrderCreate) -> Result<Order, StoreError>;

    /// A completed order owned by `buyer_address` (compared case-insensitively).
    async fn find_completed_order(
        &self,
        order_id: &str,
        buyer_address: &str,
    ) -> Result<Option<Order>, StoreError> {
        let order = self.find_order(order_id).await?;
        Ok(order.filter(|order| order.is_completed() && order.is_owned_by(buyer_address)))
    }

    /// Most recently created ticket for the order that is still unexpired at
    /// `now`, exhausted or not.
    async fn find_latest_unexpired_ticket(
        &self,
        order_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<DownloadTicket>, StoreError>;

    /// Most recently created ticket that can still be redeemed at `now`.
    async fn find_active_ticket(
        &self,
        order_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<DownloadTicket>, StoreError> {
        let ticket = self.find_latest_unexpired_ticket(order_id, now).await?;
        Ok(ticket.filter(|ticket| ticket.is_usable(now)))
    }

    async fn create_ticket(&self, params: TicketCreate) -> Result<DownloadTicket, StoreError>;

    /// Atomic lookup-or-mint: the latest ticket for `params.order_id` still
    /// unexpired at `now`, or a new ticket from `params`.
    async fn find_or_create_ticket(
        &self,
        params: TicketCreate,
        now: DateTime<Utc>,
    ) -> Result<TicketIssue, StoreError>;

    /// Conditional increment: counts a use only if the ticket is unexpired and
    /// below its limit at write time.
    async fn increment_ticket_use(
        &self,
        ticket_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Redemption, StoreError>;

    async fn append_download_log(
        &self,
        entry: DownloadLogCreate,
    ) -> Result<DownloadLogEntry, StoreError>;

    async fn download_logs(&self, filter: LogFilter) -> Result<Vec<DownloadLogEntry>, StoreError>;

    async fn count_download_logs(&self, order_id: &str) -> Result<usize, StoreError> {
        Ok(self.download_logs(LogFilter::by_order(order_id)).await?.len())
    }
}
