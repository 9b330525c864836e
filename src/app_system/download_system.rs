use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use uuid::Uuid;

use super::{DownloadSettings, SystemError};
use crate::actor_framework::{Entity, ResourceActor};
use crate::clients::{LogClient, OrderClient, ProductClient, TicketClient};
use crate::clock::{Clock, SystemClock};
use crate::controller::DownloadController;
use crate::domain::{DownloadLogEntry, DownloadTicket, Order, Product};
use crate::http::AppState;
use crate::locator::{CatalogLocator, UrlSigner};
use crate::purchases::PurchaseService;
use crate::receipt::ReceiptSigner;
use crate::store::ActorStore;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Starts one resource actor per record kind and wires the controller,
/// purchase service and HTTP state on top of them.
pub struct DownloadSystem {
    pub order_client: OrderClient,
    pub ticket_client: TicketClient,
    pub product_client: ProductClient,
    pub log_client: LogClient,
    state: AppState,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

fn spawn_actor<T: Entity<Id = String>>(
    mailbox_size: usize,
    prefix: &'static str,
) -> (crate::actor_framework::ResourceClient<T>, tokio::task::JoinHandle<()>) {
    let next_id = move || format!("{prefix}-{}", Uuid::new_v4().simple());
    let (actor, client) = ResourceActor::<T>::new(mailbox_size, next_id);
    (client, tokio::spawn(actor.run()))
}

impl DownloadSystem {
    pub fn new(settings: &DownloadSettings) -> Result<Self, SystemError> {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    pub fn with_clock(settings: &DownloadSettings, clock: Arc<dyn Clock>) -> Result<Self, SystemError> {
        let url_signer = UrlSigner::new(&settings.url_signing_secret, &settings.public_base_url)?;
        let receipts = ReceiptSigner::new(&settings.receipt_secret)?.with_ttl(settings.receipt_ttl);

        let (orders, order_handle) = spawn_actor::<Order>(settings.mailbox_size, "order");
        let (tickets, ticket_handle) = spawn_actor::<DownloadTicket>(settings.mailbox_size, "ticket");
        let (products, product_handle) = spawn_actor::<Product>(settings.mailbox_size, "product");
        let (logs, log_handle) = spawn_actor::<DownloadLogEntry>(settings.mailbox_size, "log");

        let order_client = OrderClient::new(orders);
        let ticket_client = TicketClient::new(tickets);
        let product_client = ProductClient::new(products);
        let log_client = LogClient::new(logs);

        let store = Arc::new(ActorStore::new(
            order_client.clone(),
            ticket_client.clone(),
            log_client.clone(),
        ));
        let locator = Arc::new(CatalogLocator::new(product_client.clone(), url_signer.clone()));

        let controller = DownloadController::new(
            store.clone(),
            locator.clone(),
            receipts.clone(),
            clock.clone(),
            settings.policy.clone(),
        );
        let purchases = PurchaseService::new(store, locator, receipts, clock.clone());

        let state = AppState {
            controller,
            purchases,
            products: product_client.clone(),
            url_signer,
            clock,
        };

        info!(
            ticket_ttl_secs = settings.policy.ticket_ttl.num_seconds(),
            use_limit = settings.policy.use_limit,
            "Download system started"
        );

        Ok(Self {
            order_client,
            ticket_client,
            product_client,
            log_client,
            state,
            handles: vec![order_handle, ticket_handle, product_handle, log_handle],
        })
    }

    /// Shared handler state. Actors keep running while any copy is alive.
    pub fn app_state(&self) -> AppState {
        self.state.clone()
    }

    /// Drops the system's clients and waits for the actors to drain.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down download system");
        let Self { order_client, ticket_client, product_client, log_client, state, handles } = self;
        drop((order_client, ticket_client, product_client, log_client, state));

        let drained = async {
            for handle in handles {
                if let Err(e) = handle.await {
                    error!(error = ?e, "Actor task failed");
                    return Err(SystemError::ActorTaskFailed(e.to_string()));
                }
            }
            Ok(())
        };
        tokio::time::timeout(SHUTDOWN_GRACE, drained)
            .await
            .map_err(|_| SystemError::ShutdownTimeout(SHUTDOWN_GRACE))??;

        info!("Download system stopped");
        Ok(())
    }
}
