use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{OrderStore, StoreError};
use crate::clients::{LogClient, OrderClient, TicketClient};
use crate::domain::{
    DownloadLogCreate, DownloadLogEntry, DownloadTicket, LogFilter, Order, OrderCreate,
    OrderFilter, Redemption, TicketCreate, TicketIssue,
};
use crate::log_actor::LogError;
use crate::order_actor::OrderError;
use crate::ticket_actor::TicketError;

/// [`OrderStore`] over the order, ticket and download-log actors.
#[derive(Clone)]
pub struct ActorStore {
    orders: OrderClient,
    tickets: TicketClient,
    logs: LogClient,
}

impl ActorStore {
    pub fn new(orders: OrderClient, tickets: TicketClient, logs: LogClient) -> Self {
        Self { orders, tickets, logs }
    }
}

impl From<OrderError> for StoreError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::NotFound(id) => StoreError::NotFound(id),
            OrderError::AlreadyExists(id) => StoreError::AlreadyExists(id),
            OrderError::ActorCommunicationError(reason) => StoreError::Unavailable(reason),
            other => StoreError::Rejected(other.to_string()),
        }
    }
}

impl From<TicketError> for StoreError {
    fn from(err: TicketError) -> Self {
        match err {
            TicketError::NotFound(id) => StoreError::NotFound(id),
            TicketError::ActorCommunicationError(reason) => StoreError::Unavailable(reason),
            TicketError::Rejected(reason) => StoreError::Rejected(reason),
        }
    }
}

impl From<LogError> for StoreError {
    fn from(err: LogError) -> Self {
        match err {
            LogError::ActorCommunicationError(reason) => StoreError::Unavailable(reason),
            LogError::Rejected(reason) => StoreError::Rejected(reason),
        }
    }
}

#[async_trait]
impl OrderStore for ActorStore {
    async fn find_order(&self, order_id: &str) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.get_order(order_id.to_string()).await?)
    }

    async fn find_order_by_tx(&self, tx_hash: &str) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.find_order_by_tx(tx_hash.to_string()).await?)
    }

    async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<Order>, StoreError> {
        Ok(self.orders.list_orders(filter).await?)
    }

    async fn create_order(&self, params: OrderCreate) -> Result<Order, StoreError> {
        Ok(self.orders.create_order(params).await?)
    }

    async fn find_latest_unexpired_ticket(
        &self,
        order_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<DownloadTicket>, StoreError> {
        Ok(self.tickets.latest_unexpired(order_id.to_string(), now).await?)
    }

    async fn create_ticket(&self, params: TicketCreate) -> Result<DownloadTicket, StoreError> {
        Ok(self.tickets.create_ticket(params).await?)
    }

    async fn find_or_create_ticket(
        &self,
        params: TicketCreate,
        now: DateTime<Utc>,
    ) -> Result<TicketIssue, StoreError> {
        Ok(self.tickets.current_or_mint(params, now).await?)
    }

    async fn increment_ticket_use(
        &self,
        ticket_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Redemption, StoreError> {
        Ok(self.tickets.redeem(ticket_id.to_string(), now).await?)
    }

    async fn append_download_log(
        &self,
        entry: DownloadLogCreate,
    ) -> Result<DownloadLogEntry, StoreError> {
        Ok(self.logs.append(entry).await?)
    }

    async fn download_logs(&self, filter: LogFilter) -> Result<Vec<DownloadLogEntry>, StoreError> {
        Ok(self.logs.find_download_logs(filter).await?)
    }
}
