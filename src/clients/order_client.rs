use tracing::{debug, instrument};
use crate::actor_framework::ResourceClient;
use crate::domain::{Order, OrderCreate, OrderFilter};
use crate::order_actor::OrderError;

/// Client for interacting with the Order actor.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

impl_basic_client!(OrderClient, Order, OrderError, order);

impl OrderClient {
    #[instrument(skip(self), fields(tx_hash = %params.tx_hash))]
    pub async fn create_order(&self, params: OrderCreate) -> Result<Order, OrderError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(OrderError::from)
    }

    /// Orders matching the filter, newest first.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<Order>, OrderError> {
        let mut orders = self.find_orders(filter).await?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// The most recent order paid for by this transaction.
    #[instrument(skip(self))]
    pub async fn find_order_by_tx(&self, tx_hash: String) -> Result<Option<Order>, OrderError> {
        let orders = self.list_orders(OrderFilter::by_tx_hash(tx_hash)).await?;
        Ok(orders.into_iter().next())
    }
}
