use crate::actor_framework::Entity;
use crate::domain::{Order, OrderCreate, OrderFilter};

impl Entity for Order {
    type Id = String;
    type CreateParams = OrderCreate;
    type Patch = ();
    type Action = ();
    type ActionResult = ();
    type Filter = OrderFilter;

    fn id(&self) -> &String { &self.order_id }

    fn requested_id(params: &OrderCreate) -> Option<String> {
        params
            .order_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
    }

    /// Creates a new Order from creation parameters.
    ///
    /// The buyer address is normalised to lowercase so lookups can compare
    /// it case-insensitively.
    fn from_create_params(id: String, params: OrderCreate) -> Result<Self, String> {
        if params.buyer_address.trim().is_empty() {
            return Err("buyer address is required".to_string());
        }
        if params.tx_hash.trim().is_empty() {
            return Err("transaction hash is required".to_string());
        }
        Ok(Self {
            order_id: id,
            buyer_address: params.buyer_address.trim().to_lowercase(),
            product_id: params.product_id,
            tx_hash: params.tx_hash.trim().to_string(),
            amount_wei: params.amount_wei,
            chain_id: params.chain_id,
            status: params.status,
            verified_at: params.verified_at,
            created_at: params.created_at,
        })
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), String> {
        Err("orders are immutable once recorded".to_string())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), String> {
        Ok(())
    }

    fn matches(&self, filter: &OrderFilter) -> bool {
        filter.accepts(self)
    }
}
