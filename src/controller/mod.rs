//! Download Access Controller: turns proof of purchase into a short-lived,
//! use-limited download capability.

use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::clock::Clock;
use crate::domain::{
    DownloadLogCreate, DownloadTicket, Order, Redemption, RedemptionRefusal, TicketCreate,
    TicketIssue,
};
use crate::locator::BlobLocator;
use crate::receipt::{ReceiptSigner, SettlementReceipt};
use crate::store::{OrderStore, StoreError};

mod error;
mod grant;
mod request;

pub use error::DownloadError;
pub use grant::{DownloadGrant, TrustTier};
pub use request::{ClientInfo, DownloadBody, DownloadProof, DownloadRequest};

/// Limits applied to every ticket and grant.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadPolicy {
    /// Lifetime of a ticket and of each signed URL.
    pub ticket_ttl: Duration,
    pub use_limit: u32,
    /// Remaining downloads reported on the receipt-backed path.
    pub fallback_remaining_uses: u32,
}

impl Default for DownloadPolicy {
    fn default() -> Self {
        Self {
            ticket_ttl: Duration::minutes(10),
            use_limit: 3,
            fallback_remaining_uses: 2,
        }
    }
}

#[derive(Clone)]
pub struct DownloadController {
    store: Arc<dyn OrderStore>,
    locator: Arc<dyn BlobLocator>,
    receipts: ReceiptSigner,
    clock: Arc<dyn Clock>,
    policy: DownloadPolicy,
}

impl DownloadController {
    pub fn new(
        store: Arc<dyn OrderStore>,
        locator: Arc<dyn BlobLocator>,
        receipts: ReceiptSigner,
        clock: Arc<dyn Clock>,
        policy: DownloadPolicy,
    ) -> Self {
        Self { store, locator, receipts, clock, policy }
    }

    /// Issues a download grant for a purchase.
    ///
    /// Order proofs always take the verified path. Transaction proofs take it
    /// when the store knows the transaction, and fall back to the receipt when
    /// the store is down or has no order for the hash.
    #[instrument(skip(self, request, client), fields(buyer = %request.buyer_address, item_type = ?request.item_type))]
    pub async fn request_download(
        &self,
        request: DownloadRequest,
        client: ClientInfo,
    ) -> Result<DownloadGrant, DownloadError> {
        match &request.proof {
            DownloadProof::Order { order_id } => {
                let order = self
                    .store
                    .find_order(order_id)
                    .await?
                    .ok_or_else(|| DownloadError::OrderNotFound(order_id.clone()))?;
                self.grant_for_order(order, &request.buyer_address, &client).await
            }
            DownloadProof::Transaction { tx_hash, receipt } => {
                let verified = self.grant_for_transaction(tx_hash, &request.buyer_address, &client).await;
                match (verified, receipt) {
                    (Err(DownloadError::StoreUnavailable(reason)), Some(receipt)) => {
                        warn!(%reason, tx_hash = %tx_hash, "Order store unavailable, falling back to settlement receipt");
                        self.degraded_grant(tx_hash, &request.buyer_address, receipt).await
                    }
                    (Err(DownloadError::OrderNotFound(_)), Some(receipt)) => {
                        debug!(tx_hash = %tx_hash, "No order recorded for transaction, falling back to settlement receipt");
                        self.degraded_grant(tx_hash, &request.buyer_address, receipt).await
                    }
                    (result, _) => result,
                }
            }
        }
    }

    /// Counts one use of a ticket, failing closed unless it is unexpired and
    /// below its limit at the moment of the write.
    #[instrument(skip(self))]
    pub async fn validate_and_consume(&self, ticket_id: &str) -> Result<DownloadTicket, DownloadError> {
        let now = self.clock.now();
        match self.store.increment_ticket_use(ticket_id, now).await {
            Ok(Redemption::Redeemed(ticket)) => {
                debug!(use_count = ticket.use_count, use_limit = ticket.use_limit, "Ticket redeemed");
                Ok(ticket)
            }
            Ok(Redemption::Refused(RedemptionRefusal::Expired)) => {
                info!("Ticket refused: expired");
                Err(DownloadError::Expired)
            }
            Ok(Redemption::Refused(RedemptionRefusal::Exhausted)) => {
                info!("Ticket refused: exhausted");
                Err(DownloadError::Exhausted)
            }
            Err(StoreError::NotFound(_)) => Err(DownloadError::TicketNotFound(ticket_id.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn grant_for_transaction(
        &self,
        tx_hash: &str,
        buyer_address: &str,
        client: &ClientInfo,
    ) -> Result<DownloadGrant, DownloadError> {
        let order = self
            .store
            .find_order_by_tx(tx_hash)
            .await?
            .ok_or_else(|| DownloadError::OrderNotFound(tx_hash.to_string()))?;
        self.grant_for_order(order, buyer_address, client).await
    }

    #[instrument(skip(self, order, client), fields(order_id = %order.order_id, product_id = %order.product_id))]
    async fn grant_for_order(
        &self,
        order: Order,
        buyer_address: &str,
        client: &ClientInfo,
    ) -> Result<DownloadGrant, DownloadError> {
        if !order.is_owned_by(buyer_address) {
            info!("Order belongs to a different buyer");
            return Err(DownloadError::BuyerMismatch(order.order_id));
        }
        if !order.is_completed() {
            info!(status = %order.status, "Order is not completed");
            return Err(DownloadError::OrderNotCompleted(order.order_id));
        }

        let now = self.clock.now();
        let blob = self.locator.resolve_storage_key(&order.product_id).await?;
        let ticket = self.ticket_for(&order, &blob.storage_key).await?;
        let download_url = self
            .locator
            .sign_retrieval_url(&ticket.storage_key, self.policy.ticket_ttl, now)?;

        let ticket = self.validate_and_consume(&ticket.ticket_id).await?;

        self.store
            .append_download_log(DownloadLogCreate {
                ticket_id: ticket.ticket_id.clone(),
                order_id: order.order_id.clone(),
                buyer_address: order.buyer_address.clone(),
                product_id: order.product_id.clone(),
                ip_address: client.ip_address.clone(),
                user_agent: client.user_agent.clone(),
                downloaded_at: self.clock.now(),
            })
            .await?;

        info!(
            ticket_id = %ticket.ticket_id,
            remaining = ticket.remaining_uses(),
            trust = %TrustTier::Verified,
            "Download granted"
        );

        Ok(DownloadGrant {
            download_url,
            expires_in: self.policy.ticket_ttl.num_seconds(),
            remaining_downloads: ticket.remaining_uses(),
            checksum: blob.checksum,
            ticket_id: Some(ticket.ticket_id),
            trust: TrustTier::Verified,
        })
    }

    /// Reuses the latest unexpired ticket for the order, or mints one when
    /// there is none, in one store operation. An unexpired but exhausted
    /// ticket ends the window.
    async fn ticket_for(&self, order: &Order, storage_key: &str) -> Result<DownloadTicket, DownloadError> {
        let now = self.clock.now();
        let params = TicketCreate {
            order_id: order.order_id.clone(),
            storage_key: storage_key.to_string(),
            created_at: now,
            expires_at: now + self.policy.ticket_ttl,
            use_limit: self.policy.use_limit,
        };
        match self.store.find_or_create_ticket(params, now).await? {
            TicketIssue::Minted(ticket) => {
                info!(ticket_id = %ticket.ticket_id, expires_at = %ticket.expires_at, "Minted download ticket");
                Ok(ticket)
            }
            TicketIssue::Reused(ticket) if ticket.is_usable(now) => {
                debug!(ticket_id = %ticket.ticket_id, use_count = ticket.use_count, "Reusing active ticket");
                Ok(ticket)
            }
            TicketIssue::Reused(ticket) => {
                info!(ticket_id = %ticket.ticket_id, "Latest ticket is exhausted");
                Err(DownloadError::Exhausted)
            }
        }
    }

    async fn degraded_grant(
        &self,
        tx_hash: &str,
        buyer_address: &str,
        receipt: &SettlementReceipt,
    ) -> Result<DownloadGrant, DownloadError> {
        let now = self.clock.now();
        self.receipts.verify(receipt, now)?;
        if !receipt.covers(tx_hash, buyer_address) {
            warn!(tx_hash = %tx_hash, "Settlement receipt does not cover this transaction and buyer");
            return Err(DownloadError::InvalidReceipt);
        }

        let blob = self.locator.resolve_storage_key(&receipt.product_id).await?;
        let download_url = self
            .locator
            .sign_retrieval_url(&blob.storage_key, self.policy.ticket_ttl, now)?;

        warn!(
            tx_hash = %tx_hash,
            product_id = %receipt.product_id,
            trust = %TrustTier::Degraded,
            "Download granted on settlement receipt without order verification"
        );

        Ok(DownloadGrant {
            download_url,
            expires_in: self.policy.ticket_ttl.num_seconds(),
            remaining_downloads: self.policy.fallback_remaining_uses,
            checksum: blob.checksum,
            ticket_id: None,
            trust: TrustTier::Degraded,
        })
    }
}
