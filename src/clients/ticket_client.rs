use chrono::{DateTime, Utc};
use tracing::{debug, instrument};
use crate::actor_framework::{Lookup, ResourceClient};
use crate::domain::{DownloadTicket, Redemption, TicketCreate, TicketFilter, TicketIssue};
use crate::ticket_actor::{TicketAction, TicketActionResult, TicketError};

/// Client for interacting with the DownloadTicket actor.
#[derive(Clone)]
pub struct TicketClient {
    inner: ResourceClient<DownloadTicket>,
}

impl_basic_client!(TicketClient, DownloadTicket, TicketError, ticket);

impl TicketClient {
    #[instrument(skip(self), fields(order_id = %params.order_id))]
    pub async fn create_ticket(&self, params: TicketCreate) -> Result<DownloadTicket, TicketError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(TicketError::from)
    }

    /// Most recently created ticket for the order that has not expired at `now`,
    /// whether or not it has uses left.
    #[instrument(skip(self))]
    pub async fn latest_unexpired(
        &self,
        order_id: String,
        now: DateTime<Utc>,
    ) -> Result<Option<DownloadTicket>, TicketError> {
        let filter = TicketFilter { order_id, unexpired_at: Some(now) };
        let tickets = self.find_tickets(filter).await?;
        // Insertion order, so the last of equally old tickets wins.
        Ok(tickets.into_iter().max_by_key(|ticket| ticket.created_at))
    }

    /// The order's latest unexpired ticket, or a new one from `params` when
    /// there is none. Runs as one actor turn, so concurrent callers for the
    /// same order share a ticket.
    #[instrument(skip(self, params), fields(order_id = %params.order_id))]
    pub async fn current_or_mint(
        &self,
        params: TicketCreate,
        now: DateTime<Utc>,
    ) -> Result<TicketIssue, TicketError> {
        debug!("Sending request");
        let filter = TicketFilter { order_id: params.order_id.clone(), unexpired_at: Some(now) };
        match self.inner.find_or_create(filter, params).await? {
            Lookup::Found(ticket) => Ok(TicketIssue::Reused(ticket)),
            Lookup::Created(ticket) => Ok(TicketIssue::Minted(ticket)),
        }
    }

    #[instrument(skip(self))]
    pub async fn redeem(&self, ticket_id: String, now: DateTime<Utc>) -> Result<Redemption, TicketError> {
        debug!("Sending request");
        match self.inner.perform_action(ticket_id, TicketAction::Redeem { now }).await {
            Ok(TicketActionResult::Redeem(redemption)) => Ok(redemption),
            Err(e) => Err(TicketError::from(e)),
        }
    }
}
